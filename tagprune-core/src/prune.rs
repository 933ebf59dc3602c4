//! Rewriting the dump so it only carries referenced tags.
//!
//! Both the tag table and the translation table are filtered with the same
//! keep-set of tag ids (a translation row's leading column is its tag id).
//! Blocks that lose nothing are left exactly as they were, which makes a
//! second prune over the output a no-op.
//!
//! Rebuilt blocks use one row per line:
//!
//! ```text
//! INSERT INTO `share_lang_tags` VALUES
//! (1,'FOO'),
//! (7,'BAZ');
//! ```

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::dump::{leading_id, split_tuples, DumpDocument, RowId, TERMINATOR};
use crate::error::TagpruneResult;
use crate::logging::log_table_pruned;
use crate::rows::{TAGS_TABLE, TRANSLATIONS_TABLE};

/// Tables rewritten by a prune, in rewrite order.
pub const PRUNED_TABLES: [&str; 2] = [TAGS_TABLE, TRANSLATIONS_TABLE];

/// Output of [`rebuild_block`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuiltBlock {
    /// New row-tuple text, terminator included.
    pub text: String,
    pub kept: usize,
    pub dropped: usize,
    /// Tuples without a readable leading id, plus stray text runs.
    pub skipped: usize,
}

impl RebuiltBlock {
    /// Whether the rebuilt rows differ from the input rows.
    pub fn lost_rows(&self) -> bool {
        self.dropped > 0 || self.skipped > 0
    }
}

/// Formats rows one per line: `,` after each but the last, `;` after the last.
///
/// With no rows only the terminator remains.
pub fn format_rows(rows: &[&str]) -> String {
    let mut out = String::from("\n");
    for (index, row) in rows.iter().enumerate() {
        out.push_str(row.trim_end_matches([',', TERMINATOR]));
        if index + 1 < rows.len() {
            out.push_str(",\n");
        }
    }
    out.push(TERMINATOR);
    out
}

/// Keeps the tuples of `rows_text` whose leading id is in `keep`, in their
/// original order.
pub fn rebuild_block(rows_text: &str, keep: &HashSet<RowId>) -> RebuiltBlock {
    let split = split_tuples(rows_text);
    let mut kept = Vec::with_capacity(split.tuples.len());
    let mut dropped = 0usize;
    let mut skipped = split.stray;

    for tuple in split.tuples {
        match leading_id(tuple) {
            Some(id) if keep.contains(&id) => kept.push(tuple),
            Some(_) => dropped += 1,
            None => skipped += 1,
        }
    }

    RebuiltBlock {
        text: format_rows(&kept),
        kept: kept.len(),
        dropped,
        skipped,
    }
}

/// What happened to one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TablePrune {
    pub table: String,
    /// Insert statements found for the table.
    pub blocks: usize,
    pub kept: usize,
    pub dropped: usize,
    pub skipped: usize,
    pub rewritten: bool,
}

/// Result of pruning a dump in memory.
#[derive(Debug, Clone, Serialize)]
pub struct PruneResult {
    #[serde(skip)]
    pub text: String,
    pub tables: Vec<TablePrune>,
    pub input_sha256: String,
    pub output_sha256: String,
    pub changed: bool,
}

/// SHA-256 of the dump text, lowercase hex.
pub fn dump_digest(text: &str) -> String {
    let mut sha = Sha256::new();
    sha.update(text.as_bytes());
    format!("{:x}", sha.finalize())
}

/// Filters the tag and translation tables of `dump` down to `keep`.
///
/// Both tables must be present; nothing is produced otherwise.
pub fn prune_dump(dump: &str, keep: &HashSet<RowId>) -> TagpruneResult<PruneResult> {
    let mut doc = DumpDocument::parse(dump);
    for table in PRUNED_TABLES {
        doc.require(table)?;
    }

    let mut tables = Vec::with_capacity(PRUNED_TABLES.len());
    for table in PRUNED_TABLES {
        let mut summary = TablePrune {
            table: table.to_string(),
            ..TablePrune::default()
        };
        for block in doc.blocks_mut(table) {
            let rebuilt = rebuild_block(block.rows_text(), keep);
            summary.blocks += 1;
            summary.kept += rebuilt.kept;
            summary.dropped += rebuilt.dropped;
            summary.skipped += rebuilt.skipped;
            if rebuilt.lost_rows() {
                block.replace_body(rebuilt.text);
                summary.rewritten = true;
            }
        }
        log_table_pruned(table, summary.kept, summary.dropped, summary.skipped);
        tables.push(summary);
    }

    let text = if doc.is_rewritten() {
        doc.render()
    } else {
        dump.to_string()
    };
    let input_sha256 = dump_digest(dump);
    let output_sha256 = dump_digest(&text);

    Ok(PruneResult {
        changed: input_sha256 != output_sha256,
        text,
        tables,
        input_sha256,
        output_sha256,
    })
}
