pub mod client;
pub mod emergency_log;
pub mod entry;
pub mod invitation;
pub mod safety_token;
pub mod shift;
pub mod user;
