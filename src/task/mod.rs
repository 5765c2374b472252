//! Task lifecycle management for Tandem.
//!
//! This module implements the task board shared by two linked partners:
//! creating tasks on either board, the status state machine with its
//! guarded restart, the orthogonal decline/reactivate flow, editing,
//! deletion, and the derived due-state buckets. The module follows
//! hexagonal architecture:
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
