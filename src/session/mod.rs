//! Session context and the auth-provider port.
//!
//! The workflows never consult ambient authentication state; they receive a
//! [`Session`] value established from an [`AuthProvider`] at sign-in and
//! torn down at sign-out.

mod context;
pub mod adapters;
pub mod ports;

pub use adapters::StaticAuthProvider;
pub use context::Session;
pub use ports::{AuthProvider, SessionError};
