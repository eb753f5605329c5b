//! Host-facing boundary for sheetport
//!
//! Wraps the `sheetport-sheet` core for embedding hosts that communicate
//! through plain return values: every conversion entry point is total,
//! returning `""` or `false` on failure and logging the real error through
//! `tracing`. Also provides Han-to-pinyin transliteration for deriving
//! ASCII identifiers and an environment doctor for startup diagnostics.
//!
//! # Examples
//!
//! ```no_run
//! use sheetport_bridge::{host, init_tracing};
//!
//! init_tracing();
//!
//! if !host::csv_to_excel("name,age\nAlice,30\n", "out.xlsx", "People") {
//!     // details are in the log; the host only sees the boolean
//! }
//! let csv = host::excel_to_csv("out.xlsx");
//! ```

pub mod doctor;
pub mod host;
pub mod translit;

use tracing_subscriber::EnvFilter;

/// Re-export the conversion entry points at the crate root.
pub use host::{
    csv_to_excel, csv_to_excel_with_options, excel_to_csv, excel_to_json, json_to_excel,
    json_to_excel_with_options, to_pinyin,
};
/// Re-export upsert options so hosts need only this crate.
pub use sheetport_sheet::UpsertOptions;

/// Initialize logging for hosts that have no subscriber of their own.
///
/// Respects `RUST_LOG`, defaulting to `info`. Safe to call more than once;
/// later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}
