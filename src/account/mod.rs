//! Account directory and partner linking for Tandem.
//!
//! This module owns the account records of the two-person household model:
//! registration, the reciprocal partner link, the pending-invitation set,
//! and the linking workflow (propose, list, accept, reject, leave). Pairing
//! touches two records at once, so the directory port exposes atomic
//! operations and the adapters implement them under a single lock or a
//! single transaction. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
