//! Builder pattern API for audit and prune runs.
//!
//! ```rust,ignore
//! use tagprune_core::prelude::*;
//!
//! let session = Tagprune::discover("/path/to/project")?;
//! let audit = session.audit()?;
//! session.write_reports(&audit.report)?;
//!
//! let pruned = session.dry_run(true).prune()?;
//! println!("changed: {}", pruned.result.changed);
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{load_config, load_config_file, TagpruneConfig};
use crate::dump::DumpDocument;
use crate::error::TagpruneResult;
use crate::load::load_dump;
use crate::logging::log_info;
use crate::report::{AuditReport, ReportPaths};
use crate::rows::{DumpTables, ParseStats};
use crate::scan::{scan_tokens, TokenScan};
use crate::xref::{cross_reference, CrossReference};

/// Builder for configuring an audit or prune run.
#[derive(Debug, Clone)]
pub struct Tagprune {
    /// Project root; relative config paths resolve against it
    root: PathBuf,

    /// Dump location, report location and scan rules
    config: TagpruneConfig,

    /// Compute everything but leave the dump untouched
    dry_run: bool,
}

impl Tagprune {
    /// Create a session for `root` with default configuration.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: TagpruneConfig::default(),
            dry_run: false,
        }
    }

    /// Create a session for `root`, reading `tagprune.toml` there if present.
    pub fn discover(root: impl Into<PathBuf>) -> TagpruneResult<Self> {
        let root = root.into();
        let config = load_config(&root)?.unwrap_or_default();
        Ok(Self::new(root).with_config(config))
    }

    /// Create a session for `root` with an explicit config file.
    pub fn with_config_file(root: impl Into<PathBuf>, path: &Path) -> TagpruneResult<Self> {
        let config = load_config_file(path)?;
        Ok(Self::new(root).with_config(config))
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: TagpruneConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the dump location. Relative paths resolve against the root.
    pub fn dump(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.dump = path.into();
        self
    }

    /// Enable dry-run mode (no dump modification).
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    pub fn dump_path(&self) -> PathBuf {
        self.config.dump_path(&self.root)
    }

    fn load_document(&self) -> TagpruneResult<(String, DumpDocument)> {
        let path = self.dump_path();
        let text = load_dump(&path)?;
        debug!(path = %path.display(), bytes = text.len(), "loaded dump");
        let doc = DumpDocument::parse(&text);
        Ok((text, doc))
    }

    fn scan(&self) -> TagpruneResult<TokenScan> {
        let dump_name = self
            .config
            .dump
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        let skip: Vec<&str> = dump_name.as_deref().into_iter().collect();
        let scan = scan_tokens(&self.root, &self.config.scan, &skip)?;
        info!(
            files = scan.files_scanned,
            tokens = scan.tokens.len(),
            "scanned source tree"
        );
        Ok(scan)
    }

    /// Run the audit. Nothing is written.
    pub fn audit(&self) -> TagpruneResult<AuditOutcome> {
        let (_, doc) = self.load_document()?;
        let tables = DumpTables::from_document(&doc)?;
        let scan = self.scan()?;

        let xref = cross_reference(&tables.tags, &tables.links, &tables.languages, &scan.tokens);
        let report = AuditReport::from(&xref);
        info!(
            total = report.summary.total_constants,
            unused = report.summary.unused_constants,
            missing = report.summary.constants_missing_translations,
            "audit complete"
        );

        Ok(AuditOutcome {
            report,
            xref,
            parse_stats: tables.stats,
            files_scanned: scan.files_scanned,
        })
    }

    /// Write both audit reports into the configured report directory.
    pub fn write_reports(&self, report: &AuditReport) -> TagpruneResult<ReportPaths> {
        let paths = report.write_to(&self.config.report_path(&self.root))?;
        log_info(&format!(
            "reports written: {}, {}",
            paths.json.display(),
            paths.markdown.display()
        ));
        Ok(paths)
    }

    /// Rewrite the dump so only used tags and their translations remain.
    ///
    /// The new dump is fully computed before anything is written. Nothing is
    /// written in dry-run mode or when the output equals the input.
    #[cfg(feature = "prune")]
    pub fn prune(&self) -> TagpruneResult<PruneOutcome> {
        let (text, doc) = self.load_document()?;
        let tags = crate::rows::load_tags(&doc)?;
        let scan = self.scan()?;
        let keep = crate::xref::keep_set(&tags.rows, &scan.tokens);

        let result = crate::prune::prune_dump(&text, &keep)?;
        let path = self.dump_path();
        let written = result.changed && !self.dry_run;
        if written {
            crate::load::write_dump(&path, &result.text)?;
            crate::logging::log_dump_written(&path, result.text.len());
        }
        info!(
            path = %path.display(),
            kept = keep.len(),
            changed = result.changed,
            written,
            "prune complete"
        );

        Ok(PruneOutcome {
            dump_path: path,
            used_tags: keep.len(),
            total_tags: tags.rows.len(),
            written,
            dry_run: self.dry_run,
            result,
        })
    }
}

/// Result of [`Tagprune::audit`].
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub report: AuditReport,
    pub xref: CrossReference,
    pub parse_stats: Vec<ParseStats>,
    pub files_scanned: usize,
}

/// Result of [`Tagprune::prune`].
#[cfg(feature = "prune")]
#[derive(Debug, Clone, serde::Serialize)]
pub struct PruneOutcome {
    pub dump_path: PathBuf,
    pub total_tags: usize,
    pub used_tags: usize,
    pub written: bool,
    pub dry_run: bool,
    #[serde(flatten)]
    pub result: crate::prune::PruneResult,
}
