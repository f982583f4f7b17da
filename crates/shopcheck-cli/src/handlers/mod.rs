//! Command handlers, kept out of main.rs for testability

pub mod evidence;
pub mod templates;
