// src/fetch/mod.rs
// =============================================================================
// HTTP access for the auditor.
//
// Submodules:
// - client: the Fetcher (page fetches and link probes over one pooled client)
// - error: FetchError, the three-way failure taxonomy
// =============================================================================

mod client;
mod error;

pub use client::Fetcher;
pub use error::FetchError;
