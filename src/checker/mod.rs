// src/checker/mod.rs
// =============================================================================
// The page checks.
//
// Submodules:
// - seo: title and meta description
// - onpage: headings, image alt text, robots meta, canonical (premium)
// - links: broken link detection
//
// seo and onpage are pure functions over a parsed PageDocument. links has
// a synchronous half (collecting targets from the document) and an async
// half (probing them), so the document never has to live across an await.
// =============================================================================

mod links;
mod onpage;
mod seo;

pub use links::{
    check_links, collect_link_targets, BrokenLink, LinkCheckOptions, LinkCheckResult, LinkStatus,
};
pub use onpage::OnPageCheck;
pub use seo::{check_title_and_meta, SeoSummary, TextMetric};

#[cfg(test)]
pub use onpage::{check_onpage, UPGRADE_REQUIRED_MESSAGE};
