// src/report/mod.rs
// =============================================================================
// What happens to a finished analysis.
//
// Submodules:
// - csv: export a report as a three-column CSV
// - store: save reports per user and list them back (report history)
// =============================================================================

mod csv;
mod store;

pub use self::csv::{export_filename, write_csv};
pub use store::{page_count, paginate, JsonDirStore, ReportSink, SavedReport, HISTORY_PAGE_SIZE};
