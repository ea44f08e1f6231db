// src/checker/onpage.rs
// =============================================================================
// On-page SEO audit (premium feature).
//
// Looks at four things:
// 1. Headings h1..h6, text of every heading in document order
// 2. Image alt text, split into missing / empty / present buckets
// 3. The robots meta tag
// 4. The canonical link, and whether it's an absolute http(s) URL
//
// Plans without advanced SEO get a short "upgrade required" message in
// place of the audit. That's a capability gate, not an error.
// =============================================================================

use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::seo::NOT_AVAILABLE;
use crate::document::{element_text, static_selector, PageDocument};
use crate::plan::FeatureCapability;

pub const UPGRADE_REQUIRED_MESSAGE: &str =
    "Upgrade required: advanced on-page SEO checks are available on premium plans.";

static HEADING_SELECTORS: LazyLock<[Selector; 6]> = LazyLock::new(|| {
    [
        static_selector("h1"),
        static_selector("h2"),
        static_selector("h3"),
        static_selector("h4"),
        static_selector("h5"),
        static_selector("h6"),
    ]
});
static IMG_SELECTOR: LazyLock<Selector> = LazyLock::new(|| static_selector("img"));
static ROBOTS_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| static_selector(r#"meta[name="robots"]"#));
static CANONICAL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| static_selector(r#"link[rel~="canonical"][href]"#));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingTags {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
    pub h4: Vec<String>,
    pub h5: Vec<String>,
    pub h6: Vec<String>,
}

impl HeadingTags {
    fn level_mut(&mut self, level: usize) -> &mut Vec<String> {
        match level {
            1 => &mut self.h1,
            2 => &mut self.h2,
            3 => &mut self.h3,
            4 => &mut self.h4,
            5 => &mut self.h5,
            _ => &mut self.h6,
        }
    }
}

// Image sources bucketed by the state of their alt attribute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAltAudit {
    /// No alt attribute at all
    pub missing: Vec<String>,
    /// alt="" or whitespace only
    pub empty: Vec<String>,
    pub present: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotsMeta {
    pub present: bool,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalTag {
    pub present: bool,
    pub href: String,
    pub is_valid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnPageSeoSummary {
    pub h_tags: HeadingTags,
    pub img_alt_tags: ImageAltAudit,
    pub robots_meta: RobotsMeta,
    pub canonical_tag: CanonicalTag,
}

// What ends up in the report under "onpage_seo_check".
// Untagged so the JSON is either the full audit or {"message": "..."}.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OnPageCheck {
    Full(OnPageSeoSummary),
    Restricted { message: String },
}

impl OnPageCheck {
    // Runs the audit only when the plan allows it
    pub fn gated(doc: &PageDocument, capability: &FeatureCapability) -> Self {
        if capability.advanced_seo_and_security {
            OnPageCheck::Full(check_onpage(doc))
        } else {
            OnPageCheck::Restricted {
                message: UPGRADE_REQUIRED_MESSAGE.to_string(),
            }
        }
    }
}

pub fn check_onpage(doc: &PageDocument) -> OnPageSeoSummary {
    OnPageSeoSummary {
        h_tags: collect_headings(doc),
        img_alt_tags: audit_image_alts(doc),
        robots_meta: check_robots_meta(doc),
        canonical_tag: check_canonical(doc),
    }
}

fn collect_headings(doc: &PageDocument) -> HeadingTags {
    let mut headings = HeadingTags::default();
    for (index, selector) in HEADING_SELECTORS.iter().enumerate() {
        let level = headings.level_mut(index + 1);
        level.extend(doc.all(selector).map(element_text));
    }
    headings
}

fn audit_image_alts(doc: &PageDocument) -> ImageAltAudit {
    let mut audit = ImageAltAudit::default();

    for img in doc.all(&IMG_SELECTOR) {
        let src = img.value().attr("src").unwrap_or(NOT_AVAILABLE).to_string();
        match img.value().attr("alt") {
            None => audit.missing.push(src),
            Some(alt) if alt.trim().is_empty() => audit.empty.push(src),
            Some(_) => audit.present.push(src),
        }
    }

    audit
}

fn check_robots_meta(doc: &PageDocument) -> RobotsMeta {
    match doc.first_attr(&ROBOTS_SELECTOR, "content") {
        Some(content) => RobotsMeta {
            present: true,
            content: content.trim().to_string(),
        },
        None => RobotsMeta {
            present: false,
            content: NOT_AVAILABLE.to_string(),
        },
    }
}

// Relative canonicals are flagged invalid on purpose: search engines
// expect an absolute URL here even though browsers would resolve it.
fn check_canonical(doc: &PageDocument) -> CanonicalTag {
    match doc.first_attr(&CANONICAL_SELECTOR, "href") {
        Some(href) => {
            let href = href.trim().to_string();
            let is_valid = href.starts_with("http://") || href.starts_with("https://");
            CanonicalTag {
                present: true,
                href,
                is_valid,
            }
        }
        None => CanonicalTag {
            present: false,
            href: NOT_AVAILABLE.to_string(),
            is_valid: false,
        },
    }
}
