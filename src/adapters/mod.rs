//! Infrastructure adapters. Implement outbound ports.
//!
//! SQLite storage, CLI. Map errors to DomainError.

pub mod persistence;
pub mod ui;
