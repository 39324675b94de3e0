//! Request/response data transfer objects
//!
//! Amounts travel as decimals (JSON strings or numbers); identifiers as bare
//! UUIDs.

pub mod credit;
pub mod cash;
