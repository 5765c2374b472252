//! Adapter implementations of the account module's ports.

pub mod memory;
pub mod postgres;
