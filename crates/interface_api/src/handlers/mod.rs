//! Request handlers

pub mod health;
pub mod credit;
pub mod cash;
