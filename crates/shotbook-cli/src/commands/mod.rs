//! Command handlers

pub mod config;
pub mod options;
pub mod preset;
pub mod session;
pub mod status;
