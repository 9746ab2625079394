//! Integration test utilities for the cinema identity service
//!
//! In-memory implementations of every port (with unique-constraint and
//! failure emulation) plus a [`TestApp`] that wires them into a
//! `ServiceContext`.


pub use fixtures::*;
pub use helpers::*;
