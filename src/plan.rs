// src/plan.rs
// =============================================================================
// Plan-derived feature capabilities.
//
// The analyzer never looks up accounts or subscriptions. Whoever calls it
// hands over a FeatureCapability value describing what the current plan
// allows, and the analyzer only reads it.
//
// The CLI has no account system, so it offers the three built-in plans
// (free, basic, pro) via --plan.
// =============================================================================

use clap::ValueEnum;

// What a plan allows. Only `advanced_seo_and_security` is read by the
// analysis engine itself; the other flags gate CLI features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureCapability {
    pub plan_name: String,
    /// Unlocks the on-page SEO check (headings, alt text, robots, canonical)
    pub advanced_seo_and_security: bool,
    /// Allows exporting a report as CSV
    pub csv_export: bool,
    /// Allows saving reports to the history store
    pub save_reports: bool,
    /// Allows generating a sitemap
    pub sitemap: bool,
    /// None means unlimited
    pub max_analyses_per_month: Option<u32>,
}

// The built-in plans selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlanTier {
    Free,
    Basic,
    Pro,
}

impl PlanTier {
    pub fn capability(self) -> FeatureCapability {
        match self {
            PlanTier::Free => FeatureCapability {
                plan_name: "Free".to_string(),
                advanced_seo_and_security: false,
                csv_export: false,
                save_reports: false,
                sitemap: false,
                max_analyses_per_month: None,
            },
            PlanTier::Basic => FeatureCapability {
                plan_name: "Basic".to_string(),
                advanced_seo_and_security: false,
                csv_export: false,
                save_reports: false,
                sitemap: false,
                max_analyses_per_month: Some(100),
            },
            PlanTier::Pro => FeatureCapability {
                plan_name: "Pro".to_string(),
                advanced_seo_and_security: true,
                csv_export: true,
                save_reports: true,
                sitemap: true,
                max_analyses_per_month: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pro_unlocks_premium_features() {
        for tier in [PlanTier::Free, PlanTier::Basic] {
            let cap = tier.capability();
            assert!(!cap.advanced_seo_and_security);
            assert!(!cap.csv_export);
            assert!(!cap.sitemap);
            assert!(!cap.save_reports);
        }

        let pro = PlanTier::Pro.capability();
        assert!(pro.advanced_seo_and_security && pro.csv_export && pro.sitemap && pro.save_reports);
        assert_eq!(pro.max_analyses_per_month, None);
    }

    #[test]
    fn test_basic_plan_has_monthly_quota() {
        assert_eq!(PlanTier::Basic.capability().max_analyses_per_month, Some(100));
    }
}
