// src/report/csv.rs
// =============================================================================
// CSV export of an analysis report.
//
// Three columns: Check, Item, Result. One row per metric, one row per
// broken link. Empty lists are written as "None" so spreadsheet users can
// tell "nothing found" apart from a missing row.
// =============================================================================

use anyhow::{Context, Result};
use csv::Writer;
use std::io::Write;

use crate::analyzer::AnalysisResult;
use crate::checker::{LinkStatus, OnPageCheck, TextMetric};
use crate::target::AnalysisTarget;

const HEADER: [&str; 3] = ["Check", "Item", "Result"];

pub fn write_csv<W: Write>(result: &AnalysisResult, output: W) -> Result<()> {
    let mut writer = Writer::from_writer(output);
    writer.write_record(HEADER)?;

    if let Some(error) = &result.error {
        writer.write_record(["Error", "Analysis", error.as_str()])?;
    }

    if let Some(seo) = &result.seo_check {
        writer.write_record(["SEO", "Title", metric_cell(&seo.title).as_str()])?;
        writer.write_record([
            "SEO",
            "Meta Description",
            metric_cell(&seo.meta_description).as_str(),
        ])?;
    }

    match &result.onpage_seo_check {
        Some(OnPageCheck::Full(onpage)) => {
            writer.write_record([
                "On-Page SEO",
                "H1s",
                list_cell(&onpage.h_tags.h1).as_str(),
            ])?;
            writer.write_record([
                "On-Page SEO",
                "Images Missing Alt",
                list_cell(&onpage.img_alt_tags.missing).as_str(),
            ])?;
            writer.write_record([
                "On-Page SEO",
                "Images With Empty Alt",
                list_cell(&onpage.img_alt_tags.empty).as_str(),
            ])?;

            let robots = if onpage.robots_meta.present {
                onpage.robots_meta.content.as_str()
            } else {
                "Not present"
            };
            writer.write_record(["On-Page SEO", "Robots Meta", robots])?;

            let canonical = if onpage.canonical_tag.present {
                onpage.canonical_tag.href.as_str()
            } else {
                "Not present"
            };
            writer.write_record(["On-Page SEO", "Canonical URL", canonical])?;
        }
        Some(OnPageCheck::Restricted { message }) => {
            writer.write_record(["On-Page SEO", "Restricted Feature", message.as_str()])?;
        }
        None => {}
    }

    if let Some(links) = &result.link_check {
        for broken in &links.broken_links {
            let status = match &broken.status_code {
                LinkStatus::Code(code) => code.to_string(),
                LinkStatus::Error(text) => text.clone(),
            };
            writer.write_record(["Broken Link", broken.url.as_str(), status.as_str()])?;
        }
        for url in &links.not_checked {
            writer.write_record(["Not Checked", url.as_str(), "Link check budget exceeded"])?;
        }
    }

    writer.flush().context("Failed to write CSV output")?;
    Ok(())
}

// Suggested download name, e.g. report_example.com.csv
pub fn export_filename(target: &AnalysisTarget) -> String {
    format!("report_{}.csv", target.host())
}

fn metric_cell(metric: &TextMetric) -> String {
    format!("{} ({})", metric.text, metric.length)
}

fn list_cell(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}
