//! Test-only infrastructure fakes.
//!
//! `mockall` mocks cover most port tests. The fakes here exist where a test
//! needs to control when a call resolves, not just what it returns.

mod fixtures;
mod gated_remote;
mod stub_fetcher;

pub use fixtures::{client, sample_clients, sample_progress, sample_summary};
pub use gated_remote::GatedRemote;
pub use stub_fetcher::StubFetcher;
