//! Shared validation rules applied to request payloads before any workflow
//! runs.

pub mod rules;
