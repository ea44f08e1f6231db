// src/analyzer.rs
// =============================================================================
// The analysis pipeline.
//
// Stages, in order:
//   fetch page -> title/meta check -> on-page check (plan gated)
//              -> link check -> done
//
// Only the page fetch can fail the analysis. When it does, the result
// carries nothing but an error message, because no check has run yet.
// Once the page is in hand every check runs to completion; a failing link
// probe becomes a row in the broken-link list rather than an error.
//
// analyze() never returns Err. Callers always get an AnalysisResult back.
//
// Rust concepts:
// - Block scopes: to drop a non-Send value before the next .await
// - Option fields + serde attributes: one struct for full and failed reports
// - match on Result: turning an error into data instead of propagating it
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::checker::{
    check_links, check_title_and_meta, collect_link_targets, LinkCheckOptions, LinkCheckResult,
    OnPageCheck, SeoSummary,
};
use crate::config::AuditConfig;
use crate::document::PageDocument;
use crate::fetch::{FetchError, Fetcher};
use crate::plan::FeatureCapability;
use crate::target::AnalysisTarget;

// The full report for one analysis.
// Field names match the JSON format of saved reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_check: Option<SeoSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onpage_seo_check: Option<OnPageCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_check: Option<LinkCheckResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn broken_link_count(&self) -> usize {
        self.link_check
            .as_ref()
            .map(|links| links.broken_links.len())
            .unwrap_or(0)
    }

    pub fn has_broken_links(&self) -> bool {
        self.broken_link_count() > 0
    }
}

pub struct Analyzer {
    fetcher: Fetcher,
    link_options: LinkCheckOptions,
}

impl Analyzer {
    pub fn new(fetcher: Fetcher, config: &AuditConfig) -> Self {
        Self {
            fetcher,
            link_options: LinkCheckOptions::from(config),
        }
    }

    // Normalizes raw user input first. Input that isn't a usable URL is
    // reported like any other connection failure.
    pub async fn analyze_input(&self, input: &str, capability: &FeatureCapability) -> AnalysisResult {
        match AnalysisTarget::parse(input) {
            Ok(target) => self.analyze(&target, capability).await,
            Err(e) => {
                error!(input, error = %e, "rejected analysis target");
                AnalysisResult::failed(FetchError::ConnectionOrHttp(e.to_string()).user_message())
            }
        }
    }

    pub async fn analyze(&self, target: &AnalysisTarget, capability: &FeatureCapability) -> AnalysisResult {
        info!(url = %target, plan = %capability.plan_name, "starting analysis");

        let page = match self.fetcher.fetch_page(target.as_str()).await {
            Ok(page) => page,
            Err(e) => {
                error!(url = %target, plan = %capability.plan_name, error = %e, "analysis failed");
                return AnalysisResult::failed(e.user_message());
            }
        };

        debug!(
            url = %target,
            final_url = %page.final_url,
            status = page.status,
            content_type = ?page.headers.get(reqwest::header::CONTENT_TYPE),
            "page fetched"
        );

        // The parsed document isn't Send, so everything that needs it runs
        // here and only plain data crosses into the async link check.
        let (seo_check, onpage_seo_check, link_targets) = {
            let doc = PageDocument::parse(&page.body);
            (
                check_title_and_meta(&doc),
                OnPageCheck::gated(&doc, capability),
                collect_link_targets(&doc, target.url()),
            )
        };

        if matches!(onpage_seo_check, OnPageCheck::Restricted { .. }) {
            info!(plan = %capability.plan_name, "advanced on-page SEO not included in plan");
        }

        let link_check = check_links(&self.fetcher, &link_targets, self.link_options).await;

        info!(
            url = %target,
            plan = %capability.plan_name,
            broken_links = link_check.broken_links.len(),
            "analysis finished"
        );

        AnalysisResult {
            seo_check: Some(seo_check),
            onpage_seo_check: Some(onpage_seo_check),
            link_check: Some(link_check),
            error: None,
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why doesn't analyze() return Result?
//    - A site being down is an expected outcome, not a bug in our program
//    - The caller always wants a report it can print, save or export
//    - So the error becomes a field of the report instead of an Err
//
// 2. What does skip_serializing_if do?
//    - Fields that are None are left out of the JSON entirely
//    - A failed analysis serializes as just {"error": "..."}
//
// 3. Why is the document parsed inside { ... }?
//    - The block ends before check_links(..).await, so the parsed HTML is
//      already dropped when the future is suspended
//    - Without it the future would hold a non-Send value and couldn't run
//      on tokio's multi-threaded runtime
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{BrokenLink, LinkStatus, UPGRADE_REQUIRED_MESSAGE};
    use crate::plan::PlanTier;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r##"
        <html><head>
          <title>Widgets</title>
          <meta name="description" content="All the widgets">
          <link rel="canonical" href="/home">
        </head><body>
          <h1>Widgets</h1><h1>Widgets</h1>
          <img src="a.png"><img src="b.png" alt=" "><img src="c.png" alt="x">
          <a href="mailto:sales@example.com">Mail</a>
          <a href="#section">Jump</a>
          <a href="/broken">Broken</a>
        </body></html>"##;

    fn analyzer() -> Analyzer {
        let config = AuditConfig {
            page_timeout: Duration::from_millis(500),
            probe_timeout: Duration::from_millis(500),
            ..AuditConfig::default()
        };
        Analyzer::new(Fetcher::new(&config).unwrap(), &config)
    }

    async fn site() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_full_analysis_on_pro_plan() {
        let server = site().await;
        let result = analyzer()
            .analyze_input(&format!("{}/", server.uri()), &PlanTier::Pro.capability())
            .await;

        assert!(!result.is_error());
        let seo = result.seo_check.as_ref().unwrap();
        assert_eq!(seo.title.text, "Widgets");
        assert_eq!(seo.meta_description.length, 15);

        match result.onpage_seo_check.as_ref().unwrap() {
            OnPageCheck::Full(onpage) => {
                assert_eq!(onpage.h_tags.h1, vec!["Widgets", "Widgets"]);
                assert_eq!(onpage.img_alt_tags.missing, vec!["a.png"]);
                assert_eq!(onpage.img_alt_tags.empty, vec!["b.png"]);
                assert_eq!(onpage.img_alt_tags.present, vec!["c.png"]);
                assert!(onpage.canonical_tag.present);
                assert!(!onpage.canonical_tag.is_valid);
            }
            other => panic!("expected full on-page audit, got {:?}", other),
        }

        assert_eq!(
            result.link_check.as_ref().unwrap().broken_links,
            vec![BrokenLink {
                url: format!("{}/broken", server.uri()),
                status_code: LinkStatus::Code(404),
            }]
        );
        assert!(result.has_broken_links());
    }

    #[tokio::test]
    async fn test_free_plan_gets_placeholder() {
        let server = site().await;
        let result = analyzer()
            .analyze_input(&server.uri(), &PlanTier::Free.capability())
            .await;

        assert_eq!(
            result.onpage_seo_check,
            Some(OnPageCheck::Restricted {
                message: UPGRADE_REQUIRED_MESSAGE.to_string()
            })
        );
        // The other checks still run on free plans
        assert!(result.seo_check.is_some());
        assert_eq!(result.broken_link_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_returns_only_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = analyzer()
            .analyze_input(&server.uri(), &PlanTier::Pro.capability())
            .await;

        let json = serde_json::to_value(&result).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["error"]);
        assert!(result
            .error
            .unwrap()
            .starts_with("Connection or HTTP error:"));
    }

    #[tokio::test]
    async fn test_page_timeout_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let result = analyzer()
            .analyze_input(&server.uri(), &PlanTier::Free.capability())
            .await;
        assert_eq!(
            result.error.as_deref(),
            Some("Timed out while connecting to the site.")
        );
        assert!(result.seo_check.is_none());
    }

    #[tokio::test]
    async fn test_invalid_input_is_reported_not_raised() {
        let result = analyzer()
            .analyze_input("http://", &PlanTier::Free.capability())
            .await;
        assert!(result.is_error());
        assert!(!result.has_broken_links());
    }

    #[test]
    fn test_result_round_trips_through_json() {
        let json = serde_json::json!({
            "seo_check": {
                "title": {"text": "N/A", "length": 3},
                "meta_description": {"text": "N/A", "length": 3}
            },
            "onpage_seo_check": {"message": "upgrade"},
            "link_check": {"broken_links": [{"url": "https://a.com/x", "status_code": "Error: boom"}]}
        });
        let result: AnalysisResult = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(result.broken_link_count(), 1);
        assert_eq!(serde_json::to_value(&result).unwrap(), json);
    }
}
