//! Tandem: the domain core of a couples' task-management application.
//!
//! Two linked accounts ("partners") create, assign, and track tasks for
//! each other, exchange partnership invitations, and receive notifications.
//! Persistence and authentication sit behind ports; the workflows carry the
//! invariants.
//!
//! # Architecture
//!
//! Tandem follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, database)
//!
//! # Modules
//!
//! - [`account`]: Account directory, invitations, and partner linking
//! - [`task`]: Task lifecycle, board views, and due-state derivation
//! - [`notification`]: Fan-out side effects and the merged feed
//! - [`session`]: Explicit session context and the auth-provider port

pub mod account;
pub mod db;
pub mod notification;
pub mod session;
pub mod task;
