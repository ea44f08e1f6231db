// src/crawl/sitemap.rs
// =============================================================================
// Sitemap generation from a single page.
//
// How it works:
// 1. Start the URL set with the target itself
// 2. Fetch the target page (only that page, this is not a full-site crawl)
// 3. Resolve every <a href> and keep the ones on exactly the same host
//    (subdomains count as other sites)
// 4. Emit a sitemaps.org <urlset>, URLs sorted, each with the same
//    <lastmod> (the time the sitemap was generated)
//
// If the page can't be fetched we log the error and still return a
// sitemap containing just the target URL.
//
// Rust concepts:
// - BTreeSet: a set that keeps its items sorted
// - Url::join: resolving relative links the way a browser does
// - Iterator chains: filter_map/filter/map instead of manual loops
// =============================================================================

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use std::collections::BTreeSet;
use tracing::{error, info};

use crate::document::PageDocument;
use crate::fetch::Fetcher;
use crate::target::{authority_of, AnalysisTarget};

const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

// W3C datetime with a fixed UTC offset, e.g. 2024-05-01T12:30:00+00:00
const LASTMOD_FORMAT: &str = "%Y-%m-%dT%H:%M:%S+00:00";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapDocument {
    /// Sorted, deduplicated
    pub urls: Vec<String>,
    pub lastmod: String,
}

impl SitemapDocument {
    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!("<urlset xmlns=\"{}\">\n", SITEMAP_NAMESPACE));

        for url in &self.urls {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape(url.as_str())));
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", self.lastmod));
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>");
        xml
    }
}

pub async fn generate_sitemap(fetcher: &Fetcher, target: &AnalysisTarget) -> SitemapDocument {
    generate_sitemap_at(fetcher, target, Utc::now()).await
}

pub async fn generate_sitemap_at(
    fetcher: &Fetcher,
    target: &AnalysisTarget,
    generated_at: DateTime<Utc>,
) -> SitemapDocument {
    let mut urls = BTreeSet::new();
    urls.insert(target.url().to_string());

    match fetcher.fetch_page(target.as_str()).await {
        Ok(page) => {
            urls.extend(same_site_links(&page.body, target));
        }
        Err(e) => {
            error!(url = %target, error = %e, "failed to collect links for sitemap");
        }
    }

    info!(url = %target, entries = urls.len(), "sitemap generated");

    SitemapDocument {
        urls: urls.into_iter().collect(),
        lastmod: generated_at.format(LASTMOD_FORMAT).to_string(),
    }
}

// Absolute URLs of every link on the page that shares the target's host
fn same_site_links(html: &str, target: &AnalysisTarget) -> Vec<String> {
    let doc = PageDocument::parse(html);
    let site = target.authority();

    doc.anchor_hrefs()
        .into_iter()
        .filter_map(|href| target.url().join(href).ok())
        .filter(|url| authority_of(url).as_deref() == Some(site.as_str()))
        .map(|url| url.to_string())
        .collect()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why BTreeSet and not HashSet?
//    - Both remove duplicates
//    - A BTreeSet also iterates in sorted order, so the sitemap comes out
//      sorted without a separate sort step
//
// 2. What does filter_map do?
//    - It maps each item to an Option and keeps only the Some values
//    - Here hrefs that can't be joined into a URL are silently dropped
//
// 3. Why escape the <loc> values?
//    - A URL can contain '&', which is special in XML
//    - quick_xml::escape turns it into &amp; so the file stays valid
// -----------------------------------------------------------------------------
