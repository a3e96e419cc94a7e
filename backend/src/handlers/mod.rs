pub mod admin;
pub mod auth;
pub mod clients;
pub mod entries;
pub mod invitations;
pub mod reports;
pub mod safety_links;
pub mod shifts;
pub mod sos;
