//! tagprune-core: audit and prune localization tag constants stored in a SQL dump
//!
//! A project keeps its translatable constants (`MSG_SAVE`, `BTN_OK`, ...) as
//! rows of a MySQL-style dump. This library answers which of them the source
//! tree never mentions, which lack a translation for some language, and can
//! rewrite the dump without the unused ones while leaving every other byte
//! of the file alone.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tagprune_core::prelude::*;
//!
//! let session = Tagprune::discover("/path/to/project")?;
//! let audit = session.audit()?;
//! for name in &audit.report.unused_constants {
//!     println!("Unused constant: {}", name);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`dump`]: dump document model, quote-aware lexer, block extract/replace
//! - [`rows`]: tag, translation and language rows
//! - [`scan`]: parallel source tree token scan
//! - [`xref`]: used/unused tags and missing translations
//! - [`report`]: JSON and Markdown audit reports
//! - [`prune`]: block rebuilding and dump pruning
//! - [`builder`]: fluent session API tying it together
//! - [`error`]: typed error handling
//!
//! # Cargo Features
//!
//! - `prune` (default): dump rewriting

pub mod builder;
pub mod config;
pub mod dump;
pub mod error;
pub mod load;
pub mod logging;
pub mod prelude;
pub mod report;
pub mod rows;
pub mod scan;
pub mod xref;

#[cfg(feature = "prune")]
pub mod prune;

// ============================================================================
// Explicit Re-exports
// ============================================================================

// Error types
pub use error::{IoResultExt, TagpruneError, TagpruneResult};

// Builder API
pub use builder::{AuditOutcome, Tagprune};

// Configuration
pub use config::{load_config, load_config_file, ScanConfig, TagpruneConfig, CONFIG_FILE_NAME};

// Dump model
pub use dump::{
    extract_block, insert_marker, leading_id, replace_block, split_fields, DumpDocument,
    InsertBlock, RowId, Segment, SqlValue,
};

// Loading
pub use load::{decode_text, is_write_temp, load_dump, write_dump};

// Logging
pub use logging::{
    init_structured_logging, log_dump_written, log_error, log_info, log_rows_skipped,
    log_scan_skipped, log_table_pruned, log_warn,
};

// Reporting
pub use report::{print_json, print_plain, AuditReport, AuditSummary, ReportPaths};

// Rows
pub use rows::{
    load_tags, parse_languages, parse_tags, parse_translations, DumpTables, Language,
    ParseStats, Parsed, Tag, TranslationLink, LANGUAGES_TABLE, TAGS_TABLE, TRANSLATIONS_TABLE,
};

// Source scanning
pub use scan::{collect_upper_tokens, extract_upper_tokens, gather_source_files, scan_tokens, TokenScan};

// Cross-reference
pub use xref::{cross_reference, keep_set, partition_tags, CrossReference, TagPartition};

// Feature-gated re-exports
#[cfg(feature = "prune")]
pub use builder::PruneOutcome;

#[cfg(feature = "prune")]
pub use prune::{
    dump_digest, format_rows, prune_dump, rebuild_block, PruneResult, RebuiltBlock, TablePrune,
};
