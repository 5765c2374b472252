//! Adapter implementations of the session module's ports.

pub mod memory;

pub use memory::StaticAuthProvider;
