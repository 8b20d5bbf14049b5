//! Utility modules for SoundFlow

pub mod auth;
pub mod dates;
pub mod validation;
