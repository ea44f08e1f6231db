// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, so stdout stays clean for JSON/CSV/XML)
// 3. Dispatch to the appropriate subcommand handler
// 4. Print results and exit with a proper code
//    (0 = clean, 1 = broken links / analysis error / plan limit, 2 = error)
// =============================================================================

mod analyzer; // src/analyzer.rs - the analysis pipeline
mod checker; // src/checker/ - SEO, on-page and link checks
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - timeouts, user agent, probe pool
mod crawl; // src/crawl/ - sitemap generation
mod document; // src/document.rs - parsed HTML
mod fetch; // src/fetch/ - HTTP client
mod plan; // src/plan.rs - plan feature capabilities
mod report; // src/report/ - CSV export and saved reports
mod target; // src/target.rs - URL normalization

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

use analyzer::{AnalysisResult, Analyzer};
use checker::{LinkStatus, OnPageCheck};
use cli::{Cli, Commands, NetworkArgs};
use fetch::Fetcher;
use plan::{FeatureCapability, PlanTier};
use report::{JsonDirStore, ReportSink, SavedReport, HISTORY_PAGE_SIZE};
use target::{normalize_url, AnalysisTarget};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = exit_code(run(cli).await);
    std::process::exit(exit_code);
}

// Internal failures (bad arguments, I/O) exit with 2; a handler's own
// code is passed through
fn exit_code(outcome: Result<i32>) -> i32 {
    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    }
}

// 1 when the analysis failed or found broken links, 0 when clean
fn analysis_exit_code(result: &AnalysisResult) -> i32 {
    if result.is_error() || result.has_broken_links() {
        1
    } else {
        0
    }
}

// RUST_LOG wins when set; otherwise info, or debug with --verbose
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("site_auditor={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Analyze {
            url,
            plan,
            json,
            csv,
            save,
            user,
            reports_dir,
            network,
        } => {
            let output = if json {
                OutputFormat::Json
            } else if csv {
                OutputFormat::Csv
            } else {
                OutputFormat::Table
            };
            let save_as = if save { user } else { None };
            handle_analyze(&url, plan, output, save_as.as_deref(), &reports_dir, &network).await
        }
        Commands::Sitemap {
            url,
            plan,
            output,
            network,
        } => handle_sitemap(&url, plan, output.as_deref(), &network).await,
        Commands::History {
            user,
            reports_dir,
            page,
            json,
        } => handle_history(&user, &reports_dir, page, json),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

// Handles the 'analyze' subcommand
async fn handle_analyze(
    url: &str,
    plan: PlanTier,
    output: OutputFormat,
    save_as: Option<&str>,
    reports_dir: &Path,
    network: &NetworkArgs,
) -> Result<i32> {
    let capability = plan.capability();

    // Check plan limits before doing any network work
    if output == OutputFormat::Csv && !capability.csv_export {
        return Ok(plan_denied(&capability, "CSV export"));
    }
    if save_as.is_some() && !capability.save_reports {
        return Ok(plan_denied(&capability, "saving reports"));
    }

    let config = network.to_config();
    let fetcher = Fetcher::new(&config).context("Failed to create HTTP client")?;
    let analyzer = Analyzer::new(fetcher, &config);

    let result = analyzer.analyze_input(url, &capability).await;

    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Csv => {
            if let Ok(target) = AnalysisTarget::parse(url) {
                info!(file = %report::export_filename(&target), "suggested CSV file name");
            }
            report::write_csv(&result, io::stdout().lock())?;
        }
        OutputFormat::Table => print_report(&normalize_url(url), &capability, &result),
    }

    if let Some(user) = save_as {
        let store = JsonDirStore::new(reports_dir);
        let saved = SavedReport::new(user, &normalize_url(url), result.clone());
        let path = store.save(&saved).context("Failed to save report")?;
        info!(path = %path.display(), "report saved");
    }

    Ok(analysis_exit_code(&result))
}

// Handles the 'sitemap' subcommand
async fn handle_sitemap(
    url: &str,
    plan: PlanTier,
    output: Option<&Path>,
    network: &NetworkArgs,
) -> Result<i32> {
    let capability = plan.capability();
    if !capability.sitemap {
        return Ok(plan_denied(&capability, "sitemap generation"));
    }

    let target = AnalysisTarget::parse(url)?;
    let fetcher = Fetcher::new(&network.to_config()).context("Failed to create HTTP client")?;

    let sitemap = crawl::generate_sitemap(&fetcher, &target).await;
    let xml = sitemap.to_xml();

    match output {
        Some(path) => {
            std::fs::write(path, &xml)
                .with_context(|| format!("Failed to write sitemap to {}", path.display()))?;
            eprintln!("🗺️  Wrote {} URL(s) to {}", sitemap.urls.len(), path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", xml)?;
        }
    }

    Ok(0)
}

// Handles the 'history' subcommand
fn handle_history(user: &str, reports_dir: &Path, page: usize, json: bool) -> Result<i32> {
    let store = JsonDirStore::new(reports_dir);
    let reports = store.list(user).context("Failed to read report history")?;

    let page = page.max(1);
    let total_pages = report::page_count(reports.len(), HISTORY_PAGE_SIZE);
    let page_items = report::paginate(&reports, page, HISTORY_PAGE_SIZE);

    if json {
        println!("{}", serde_json::to_string_pretty(&page_items)?);
        return Ok(0);
    }

    if page_items.is_empty() {
        println!("📭 No saved reports for {}", user);
        return Ok(0);
    }

    println!("{:<22} {:<50} {:<10} {:<8}", "DATE", "URL", "STATUS", "BROKEN");
    println!("{}", "=".repeat(93));
    for saved in page_items {
        println!(
            "{:<22} {:<50} {:<10} {:<8}",
            saved.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            truncate(&saved.url, 50),
            saved.status.as_str(),
            saved.result.broken_link_count()
        );
    }
    println!();
    println!("📄 Page {} of {} ({} report(s))", page, total_pages, reports.len());

    Ok(0)
}

fn plan_denied(capability: &FeatureCapability, feature: &str) -> i32 {
    eprintln!(
        "🔒 Your plan ({}) doesn't include {}. Upgrade to a plan that does (e.g. --plan pro).",
        capability.plan_name, feature
    );
    1
}

// Prints the report as human-readable sections
fn print_report(url: &str, capability: &FeatureCapability, result: &AnalysisResult) {
    let quota = match capability.max_analyses_per_month {
        Some(limit) => format!("{} analyses/month", limit),
        None => "unlimited analyses".to_string(),
    };
    println!("🔍 Report for {}", url);
    println!("📋 Plan: {} ({})", capability.plan_name, quota);
    println!();

    if let Some(error) = &result.error {
        println!("❌ {}", error);
        return;
    }

    if let Some(seo) = &result.seo_check {
        println!("📝 SEO");
        println!("   Title:            {} ({} chars)", seo.title.text, seo.title.length);
        println!(
            "   Meta description: {} ({} chars)",
            seo.meta_description.text, seo.meta_description.length
        );
        println!();
    }

    match &result.onpage_seo_check {
        Some(OnPageCheck::Full(onpage)) => {
            println!("🏷️  On-page SEO");
            let levels = [
                ("h1", &onpage.h_tags.h1),
                ("h2", &onpage.h_tags.h2),
                ("h3", &onpage.h_tags.h3),
                ("h4", &onpage.h_tags.h4),
                ("h5", &onpage.h_tags.h5),
                ("h6", &onpage.h_tags.h6),
            ];
            for (name, texts) in levels {
                if !texts.is_empty() {
                    println!("   {}: {}", name, texts.join(" | "));
                }
            }
            println!(
                "   Images: {} missing alt, {} empty alt, {} with alt",
                onpage.img_alt_tags.missing.len(),
                onpage.img_alt_tags.empty.len(),
                onpage.img_alt_tags.present.len()
            );
            println!("   Robots meta: {}", onpage.robots_meta.content);
            let validity = if onpage.canonical_tag.is_valid { "✅" } else { "⚠️ " };
            println!("   Canonical:   {} {}", validity, onpage.canonical_tag.href);
            println!();
        }
        Some(OnPageCheck::Restricted { message }) => {
            println!("🔒 {}", message);
            println!();
        }
        None => {}
    }

    if let Some(links) = &result.link_check {
        print_broken_links(&links.broken_links);
        if !links.not_checked.is_empty() {
            println!(
                "⏱️  {} link(s) not checked: the link check ran out of time",
                links.not_checked.len()
            );
        }
    }
}

// Prints broken links as a table
fn print_broken_links(broken: &[checker::BrokenLink]) {
    if broken.is_empty() {
        println!("✅ No broken links found");
        return;
    }

    println!("{:<60} {:<30}", "URL", "STATUS");
    println!("{}", "=".repeat(90));
    for link in broken {
        let status = match &link.status_code {
            LinkStatus::Code(code) => format!("❌ HTTP {}", code),
            LinkStatus::Error(text) => format!("⚠️  {}", text),
        };
        println!("{:<60} {:<30}", truncate(&link.url, 60), status);
    }
    println!();
    println!("📊 Broken links: {}", broken.len());
}

// Shortens long values for table columns, on a character boundary
fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() > width {
        let kept: String = value.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        value.to_string()
    }
}
