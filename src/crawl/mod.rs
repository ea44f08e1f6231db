// src/crawl/mod.rs
// =============================================================================
// This module handles sitemap crawling.
//
// Features:
// - Single-level crawl: only the target page is fetched
// - Same-host restriction (subdomains and other sites are left out)
// - Deterministic output: sorted, deduplicated URLs
// - Graceful degradation: a failed fetch still yields a sitemap with the
//   target URL
// =============================================================================

mod sitemap;

pub use sitemap::generate_sitemap;
