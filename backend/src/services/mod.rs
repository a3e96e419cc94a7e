pub mod dispatch;
pub mod invitation;
pub mod narrative;
pub mod report;
pub mod safety_link;
pub mod token;

pub use invitation::InvitationWorkflow;
pub use safety_link::SafetyLinkWorkflow;
