//! flock-assign: family-aware, capacity-balanced member-to-group assignment
//! with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
