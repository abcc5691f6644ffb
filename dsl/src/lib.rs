//! Provides definitions of objects from a PLC device interface description
//! and the schema validation that every entity runs after parsing.

pub mod common;
pub mod core;
pub mod diagnostic;
pub mod validator;
