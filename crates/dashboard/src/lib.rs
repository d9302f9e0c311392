//! Prometeo Dashboard - client-side data layer for the CRM analytics dashboard.
//!
//! Views read typed queries from a shared [`QueryCache`](infrastructure::QueryCache),
//! which fetches in the background and serves stale data while revalidating.
//! Operator changes go through the
//! [`OptimisticMutator`](application::mutations::OptimisticMutator), which
//! updates the cache before the server answers and either invalidates the
//! dependent queries or rolls the change back.

pub mod application;
pub mod infrastructure;
pub mod ports;
pub mod query_types;
pub mod runner;
pub mod state;

pub use runner::Dashboard;
