// src/checker/links.rs
// =============================================================================
// Broken link detection.
//
// How it works:
// 1. Collect every <a href> on the page, in document order
// 2. Resolve each href against the page URL (relative -> absolute)
// 3. Skip mailto: links and same-page fragment links (#section)
// 4. Probe every remaining URL with a short-timeout GET
// 5. Report a row for every anchor whose probe returned >= 400 or failed
//
// Probing is concurrent with a fixed pool size, and the whole phase runs
// under a wall-clock budget. Links whose probe hasn't finished when the
// budget runs out are reported as "not checked" instead of stalling the
// analysis.
//
// A URL that appears several times on the page is probed once, but still
// produces one row per anchor, so reports look the same as probing each
// anchor separately.
// =============================================================================

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};
use url::Url;

use crate::config::AuditConfig;
use crate::document::PageDocument;
use crate::fetch::{FetchError, Fetcher};

// A link found on the page, ready to be probed (or not)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// Absolute URL to probe
    Probe(String),
    /// href that could not be resolved to a URL at all
    Invalid { href: String, reason: String },
}

// Either a numeric HTTP status or a description of why the request failed.
// Untagged so it serializes as 404 or "Error: ..." in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkStatus {
    Code(u16),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenLink {
    pub url: String,
    pub status_code: LinkStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCheckResult {
    pub broken_links: Vec<BrokenLink>,
    /// Links skipped because the link-check budget ran out
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub not_checked: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct LinkCheckOptions {
    pub concurrency: usize,
    pub budget: Option<Duration>,
}

impl From<&AuditConfig> for LinkCheckOptions {
    fn from(config: &AuditConfig) -> Self {
        Self {
            concurrency: config.probe_concurrency,
            budget: config.link_budget,
        }
    }
}

// What happened to a single probe
#[derive(Debug, Clone)]
enum ProbeOutcome {
    Status(u16),
    Failed(FetchError),
    NotChecked,
}

pub fn collect_link_targets(doc: &PageDocument, base: &Url) -> Vec<LinkTarget> {
    let mut targets = Vec::new();

    for href in doc.anchor_hrefs() {
        let resolved = match base.join(href) {
            Ok(url) => url.to_string(),
            Err(e) => {
                targets.push(LinkTarget::Invalid {
                    href: href.to_string(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if resolved.starts_with("mailto:") || is_same_page_fragment(&resolved) {
            continue;
        }

        targets.push(LinkTarget::Probe(resolved));
    }

    targets
}

// True when the last path segment (query string removed) carries a '#'.
//
//   https://a.com/page#top      -> true
//   https://a.com/#top          -> true
//   https://a.com/page?x=1#top  -> false (the '#' sits after the query)
fn is_same_page_fragment(url: &str) -> bool {
    let last_segment = url.rsplit('/').next().unwrap_or(url);
    let before_query = last_segment.split('?').next().unwrap_or(last_segment);
    before_query.contains('#')
}

pub async fn check_links(
    fetcher: &Fetcher,
    targets: &[LinkTarget],
    options: LinkCheckOptions,
) -> LinkCheckResult {
    // Unique URLs in first-seen order
    let mut seen = HashSet::new();
    let unique: Vec<String> = targets
        .iter()
        .filter_map(|t| match t {
            LinkTarget::Probe(url) if seen.insert(url.as_str()) => Some(url.clone()),
            _ => None,
        })
        .collect();

    let deadline = options.budget.map(|budget| Instant::now() + budget);
    debug!(links = targets.len(), unique = unique.len(), "probing links");

    let probes = unique.iter().cloned().map(|url| {
        let fetcher = fetcher.clone();
        async move {
            let outcome = probe_within(&fetcher, &url, deadline).await;
            (url, outcome)
        }
    });

    let outcomes: HashMap<String, ProbeOutcome> = stream::iter(probes)
        .buffer_unordered(options.concurrency.max(1))
        .collect()
        .await;

    let mut result = LinkCheckResult::default();

    for target in targets {
        match target {
            LinkTarget::Probe(url) => match outcomes.get(url) {
                Some(ProbeOutcome::Status(code)) if *code >= 400 => {
                    result.broken_links.push(BrokenLink {
                        url: url.clone(),
                        status_code: LinkStatus::Code(*code),
                    });
                }
                Some(ProbeOutcome::Failed(err)) => {
                    result.broken_links.push(BrokenLink {
                        url: url.clone(),
                        status_code: LinkStatus::Error(format!("Error: {}", err)),
                    });
                }
                _ => {}
            },
            LinkTarget::Invalid { href, reason } => {
                result.broken_links.push(BrokenLink {
                    url: href.clone(),
                    status_code: LinkStatus::Error(format!("Error: invalid URL: {}", reason)),
                });
            }
        }
    }

    result.not_checked = unique
        .into_iter()
        .filter(|url| matches!(outcomes.get(url), Some(ProbeOutcome::NotChecked)))
        .collect();

    info!(
        links = targets.len(),
        broken = result.broken_links.len(),
        not_checked = result.not_checked.len(),
        "link check finished"
    );

    result
}

async fn probe_within(fetcher: &Fetcher, url: &str, deadline: Option<Instant>) -> ProbeOutcome {
    let outcome = match deadline {
        Some(deadline) => match tokio::time::timeout_at(deadline, fetcher.probe(url)).await {
            Ok(result) => result,
            Err(_) => return ProbeOutcome::NotChecked,
        },
        None => fetcher.probe(url).await,
    };

    match outcome {
        Ok(status) => ProbeOutcome::Status(status),
        Err(err) => ProbeOutcome::Failed(err),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. buffer_unordered vs buffered
//    - Both run up to N futures at once
//    - buffer_unordered yields results as they finish, which keeps the pool
//      busy even when one link is slow
//    - We don't need completion order: results go into a HashMap and rows
//      are rebuilt by walking `targets` again, so document order survives
//
// 2. Why timeout_at instead of timeout?
//    - timeout(d) gives every probe its own d, so 100 queued probes could
//      still take 100 * d overall
//    - timeout_at(deadline) shares one deadline across all probes, which is
//      what a budget for the whole phase means
//
// 3. Why is the HashSet full of &str instead of String?
//    - The strings already live in `targets`; borrowing them avoids copies
//    - The borrow ends before we need `targets` again
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn options() -> LinkCheckOptions {
        LinkCheckOptions {
            concurrency: 4,
            budget: Some(Duration::from_secs(10)),
        }
    }

    fn fetcher() -> Fetcher {
        let config = AuditConfig {
            probe_timeout: Duration::from_secs(2),
            ..AuditConfig::default()
        };
        Fetcher::new(&config).unwrap()
    }

    #[test]
    fn test_fragment_detection() {
        assert!(is_same_page_fragment("https://a.com/page#top"));
        assert!(is_same_page_fragment("https://a.com/#top"));
        assert!(!is_same_page_fragment("https://a.com/page?x=1#top"));
        assert!(!is_same_page_fragment("https://a.com/docs/"));
    }

    #[test]
    fn test_collect_skips_mailto_and_fragments() {
        let doc = PageDocument::parse(
            r##"<a href="mailto:a@b.com">mail</a>
               <a href="#section">jump</a>
               <a href="/broken">broken</a>
               <a href="https://other.org/x">external</a>"##,
        );
        let base = Url::parse("https://example.com/page").unwrap();
        assert_eq!(
            collect_link_targets(&doc, &base),
            vec![
                LinkTarget::Probe("https://example.com/broken".to_string()),
                LinkTarget::Probe("https://other.org/x".to_string()),
            ]
        );
    }

    #[test]
    fn test_collect_keeps_unresolvable_hrefs() {
        let doc = PageDocument::parse(r#"<a href="http://[::1">bad</a>"#);
        let base = Url::parse("https://example.com/").unwrap();
        let targets = collect_link_targets(&doc, &base);
        assert!(matches!(&targets[..], [LinkTarget::Invalid { href, .. }] if href == "http://[::1"));
    }

    #[tokio::test]
    async fn test_only_broken_link_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let doc = PageDocument::parse(
            r##"<a href="mailto:a@b.com">m</a><a href="#section">s</a>
               <a href="/broken">b</a><a href="/ok">ok</a>"##,
        );
        let base = Url::parse(&format!("{}/", server.uri())).unwrap();
        let targets = collect_link_targets(&doc, &base);

        let result = check_links(&fetcher(), &targets, options()).await;
        assert_eq!(
            result.broken_links,
            vec![BrokenLink {
                url: format!("{}/broken", server.uri()),
                status_code: LinkStatus::Code(404),
            }]
        );
        assert!(result.not_checked.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_links_probe_once_but_report_each_anchor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(410))
            .expect(1)
            .mount(&server)
            .await;

        let gone = format!("{}/gone", server.uri());
        let targets = vec![LinkTarget::Probe(gone.clone()), LinkTarget::Probe(gone.clone())];

        let result = check_links(&fetcher(), &targets, options()).await;
        assert_eq!(result.broken_links.len(), 2);
        assert!(result.broken_links.iter().all(|b| b.url == gone));
    }

    #[tokio::test]
    async fn test_rows_follow_document_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_millis(300)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fast"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let targets = vec![
            LinkTarget::Probe(format!("{}/slow", server.uri())),
            LinkTarget::Probe(format!("{}/fast", server.uri())),
        ];
        let result = check_links(&fetcher(), &targets, options()).await;
        let codes: Vec<_> = result.broken_links.iter().map(|b| b.status_code.clone()).collect();
        assert_eq!(codes, vec![LinkStatus::Code(500), LinkStatus::Code(404)]);
    }

    #[tokio::test]
    async fn test_failed_request_is_recorded_as_error_text() {
        // Nothing listens on port 1
        let dead = "http://127.0.0.1:1/dead".to_string();

        let targets = vec![LinkTarget::Probe(dead.clone())];
        let result = check_links(&fetcher(), &targets, options()).await;
        assert_eq!(result.broken_links.len(), 1);
        assert_eq!(result.broken_links[0].url, dead);
        match &result.broken_links[0].status_code {
            LinkStatus::Error(text) => assert!(text.starts_with("Error: ")),
            other => panic!("expected error text, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_budget_exhaustion_marks_links_not_checked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hang"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let hang = format!("{}/hang", server.uri());
        let targets = vec![LinkTarget::Probe(hang.clone())];
        let options = LinkCheckOptions {
            concurrency: 2,
            budget: Some(Duration::from_millis(200)),
        };

        let result = check_links(&fetcher(), &targets, options).await;
        assert!(result.broken_links.is_empty());
        assert_eq!(result.not_checked, vec![hang]);
    }

    #[test]
    fn test_status_serialization() {
        let rows = vec![
            BrokenLink {
                url: "https://a.com/x".into(),
                status_code: LinkStatus::Code(404),
            },
            BrokenLink {
                url: "https://a.com/y".into(),
                status_code: LinkStatus::Error("Error: request timed out".into()),
            },
        ];
        assert_eq!(
            serde_json::to_value(&rows).unwrap(),
            serde_json::json!([
                {"url": "https://a.com/x", "status_code": 404},
                {"url": "https://a.com/y", "status_code": "Error: request timed out"}
            ])
        );
    }
}
