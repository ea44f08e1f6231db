// src/checker/seo.rs
// =============================================================================
// Title and meta description check.
//
// For both elements we report the text and its length. When the element is
// missing we report the placeholder "N/A" and its length (3), not 0. Saved
// reports and CSV exports rely on this shape, so keep it.
// =============================================================================

use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::document::{element_text, static_selector, PageDocument};

/// Placeholder reported when an element or attribute is absent.
pub const NOT_AVAILABLE: &str = "N/A";

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| static_selector("title"));
static META_DESCRIPTION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| static_selector(r#"meta[name="description"]"#));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMetric {
    pub text: String,
    pub length: usize,
}

impl TextMetric {
    fn new(text: String) -> Self {
        let length = text.chars().count();
        Self { text, length }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoSummary {
    pub title: TextMetric,
    pub meta_description: TextMetric,
}

pub fn check_title_and_meta(doc: &PageDocument) -> SeoSummary {
    let title = doc
        .first(&TITLE_SELECTOR)
        .map(element_text)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let meta_description = doc
        .first_attr(&META_DESCRIPTION_SELECTOR, "content")
        .map(|content| content.trim().to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    SeoSummary {
        title: TextMetric::new(title),
        meta_description: TextMetric::new(meta_description),
    }
}
