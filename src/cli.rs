// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Subcommands:
// - analyze: audit one page (SEO, on-page SEO, broken links)
// - sitemap: build a sitemap.xml from a page's same-site links
// - history: list previously saved reports for a user
//
// Network tuning flags are shared between analyze and sitemap through the
// NetworkArgs struct, flattened into both.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{
    AuditConfig, DEFAULT_LINK_BUDGET_SECS, DEFAULT_PAGE_TIMEOUT_SECS, DEFAULT_PROBE_CONCURRENCY,
    DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
use crate::plan::PlanTier;

#[derive(Parser, Debug)]
#[command(
    name = "site-auditor",
    version,
    about = "Audit a web page for SEO problems and broken links, and generate sitemaps",
    long_about = "site-auditor fetches a page, checks its title, meta description and (on premium \
                  plans) on-page SEO, probes every link for breakage, and can export the report \
                  as JSON or CSV or build a sitemap.xml from the page's links."
)]
pub struct Cli {
    /// Show debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a page for SEO issues and broken links
    ///
    /// Example: site-auditor analyze example.com --plan pro --csv
    Analyze {
        /// URL to analyze; https:// is assumed when no scheme is given
        url: String,

        /// Plan whose features apply to this analysis
        #[arg(long, value_enum, default_value_t = PlanTier::Free)]
        plan: PlanTier,

        /// Output the report as JSON
        #[arg(long, conflicts_with = "csv")]
        json: bool,

        /// Output the report as CSV (requires a plan with CSV export)
        #[arg(long)]
        csv: bool,

        /// Save the report to the history store (requires a plan with saved reports)
        #[arg(long, requires = "user")]
        save: bool,

        /// User the saved report belongs to
        #[arg(long)]
        user: Option<String>,

        /// Directory holding saved reports
        #[arg(long, default_value = "reports")]
        reports_dir: PathBuf,

        #[command(flatten)]
        network: NetworkArgs,
    },

    /// Generate a sitemap.xml from the same-site links on a page
    ///
    /// Example: site-auditor sitemap example.com --plan pro -o sitemap.xml
    Sitemap {
        /// URL whose links make up the sitemap
        url: String,

        /// Plan whose features apply (sitemaps require a plan that includes them)
        #[arg(long, value_enum, default_value_t = PlanTier::Free)]
        plan: PlanTier,

        /// Write the sitemap to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[command(flatten)]
        network: NetworkArgs,
    },

    /// List saved reports for a user, newest first
    History {
        /// User whose reports to list
        #[arg(long)]
        user: String,

        /// Directory holding saved reports
        #[arg(long, default_value = "reports")]
        reports_dir: PathBuf,

        /// Page number (10 reports per page)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct NetworkArgs {
    /// User agent sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Timeout for fetching the page, in seconds
    #[arg(long, default_value_t = DEFAULT_PAGE_TIMEOUT_SECS)]
    pub page_timeout_secs: u64,

    /// Timeout for each link probe, in seconds
    #[arg(long, default_value_t = DEFAULT_PROBE_TIMEOUT_SECS)]
    pub probe_timeout_secs: u64,

    /// Number of link probes to run at once
    #[arg(long, default_value_t = DEFAULT_PROBE_CONCURRENCY)]
    pub probe_concurrency: usize,

    /// Time budget for the whole link check, in seconds (0 = no budget)
    #[arg(long, default_value_t = DEFAULT_LINK_BUDGET_SECS)]
    pub link_budget_secs: u64,
}

impl NetworkArgs {
    pub fn to_config(&self) -> AuditConfig {
        AuditConfig {
            user_agent: self.user_agent.clone(),
            page_timeout: Duration::from_secs(self.page_timeout_secs),
            probe_timeout: Duration::from_secs(self.probe_timeout_secs),
            probe_concurrency: self.probe_concurrency.max(1),
            link_budget: (self.link_budget_secs > 0)
                .then(|| Duration::from_secs(self.link_budget_secs)),
        }
    }
}
