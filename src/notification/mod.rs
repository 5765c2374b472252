//! Notifications for Tandem.
//!
//! Notifications are produced as side effects of the linking and task
//! workflows (invitation rejected, task declined, task removed by a
//! dissolution) and consumed through a merged, newest-first feed. The read
//! side is a projection folded from store change events rather than an
//! optimistically mutated cache. The module follows hexagonal architecture:
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
