//! Command handlers

pub mod config;
pub mod hits;
pub mod meeting;
pub mod status;
pub mod sync;
pub mod user;
