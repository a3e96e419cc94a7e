//! coachlog backend: field reporting for job coaches.
//!
//! Workers clock in and out with GPS, record field notes, and manage their
//! clients; admins provision accounts through single-use invitations; clients
//! carry an emergency safety link that alerts configured contacts over SMS;
//! billing reports aggregate shifts and notes into a PDF.

pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;
pub mod validation;
