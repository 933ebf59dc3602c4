//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use tagprune_core::prelude::*;
//! ```

// Session API
pub use crate::builder::{AuditOutcome, Tagprune};

// Errors
pub use crate::error::{TagpruneError, TagpruneResult};

// Configuration
pub use crate::config::{load_config, ScanConfig, TagpruneConfig};

// Dump model and rows
pub use crate::dump::{extract_block, replace_block, DumpDocument};
pub use crate::rows::{DumpTables, Language, Tag, TranslationLink};

// Analysis and reporting
pub use crate::report::AuditReport;
pub use crate::scan::scan_tokens;
pub use crate::xref::{cross_reference, keep_set, CrossReference};

// Pruning
#[cfg(feature = "prune")]
pub use crate::builder::PruneOutcome;
#[cfg(feature = "prune")]
pub use crate::prune::{prune_dump, rebuild_block, PruneResult};
