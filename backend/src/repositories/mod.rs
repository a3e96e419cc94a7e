pub mod client;
pub mod emergency_log;
pub mod entry;
pub mod invitation;
pub mod safety_token;
pub mod shift;
pub mod user;

pub use client::{ClientRepository, ClientRepositoryTrait};
pub use emergency_log::{EmergencyLogRepository, EmergencyLogRepositoryTrait};
pub use invitation::{InvitationRepository, InvitationRepositoryTrait};
pub use safety_token::{SafetyTokenRepository, SafetyTokenRepositoryTrait};
pub use user::{UserRepository, UserRepositoryTrait};
