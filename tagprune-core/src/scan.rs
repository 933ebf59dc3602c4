//! Parallel source tree scanning for uppercase constant tokens.
//!
//! Performance characteristics:
//! - Early directory pruning via `WalkDir::filter_entry` (O(1) subtree skip)
//! - Parallel file reading and tokenizing via Rayon
//!
//! A token is any run matching `[A-Z][A-Z0-9_]{2,}`. No word boundaries are
//! applied, so `xFOO_BAR` yields `FOO_BAR`.

use rayon::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::error::{TagpruneError, TagpruneResult};
use crate::load::{decode_text, is_write_temp};
use crate::logging::log_scan_skipped;

fn upper_token_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    // SAFETY: This regex pattern is hardcoded and covered by tests.
    REGEX.get_or_init(|| Regex::new(r"[A-Z][A-Z0-9_]{2,}").expect("Hardcoded regex pattern is valid"))
}

/// Result of scanning a source tree.
#[derive(Debug, Clone, Default)]
pub struct TokenScan {
    pub tokens: HashSet<String>,
    pub files_scanned: usize,
}

/// Compiled include/exclude rules.
struct ScanRules<'a> {
    include_roots: HashSet<&'a str>,
    exclude_dirs: HashSet<&'a str>,
    exclude_files: HashSet<&'a str>,
    binary_suffixes: HashSet<String>,
    /// Files whose interrupted writes must not be scanned either.
    written_files: &'a [&'a str],
}

impl<'a> ScanRules<'a> {
    fn new(cfg: &'a ScanConfig, skip_files: &'a [&'a str]) -> Self {
        Self {
            include_roots: cfg.include_roots.iter().map(String::as_str).collect(),
            exclude_dirs: cfg.exclude_dirs.iter().map(String::as_str).collect(),
            exclude_files: cfg
                .exclude_files
                .iter()
                .map(String::as_str)
                .chain(skip_files.iter().copied())
                .collect(),
            binary_suffixes: cfg
                .binary_suffixes
                .iter()
                .map(|s| s.to_ascii_lowercase())
                .collect(),
            written_files: skip_files,
        }
    }

    /// Whether a directory entry's subtree is walked at all.
    #[inline]
    fn enters_dir(&self, entry: &walkdir::DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }
        let Some(name) = entry.file_name().to_str() else {
            return false;
        };
        if self.exclude_dirs.contains(name) {
            return false;
        }
        // Only the configured top-level roots are descended into.
        entry.depth() > 1 || self.include_roots.contains(name)
    }

    fn accepts_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if self.exclude_files.contains(name)
            || self.written_files.iter().any(|f| is_write_temp(name, f))
        {
            return false;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => !self
                .binary_suffixes
                .contains(&format!(".{}", ext.to_ascii_lowercase())),
            None => true,
        }
    }
}

/// Gathers every scannable file under `root`.
///
/// Files directly in `root` are always candidates; deeper files only when
/// their first path component is an include root. `skip_files` names extra
/// files to ignore anywhere (the dump itself), along with temp files left by
/// an interrupted write to them. Symlinks are followed; entries that cannot
/// be read are logged and skipped.
pub fn gather_source_files(
    root: &Path,
    cfg: &ScanConfig,
    skip_files: &[&str],
) -> TagpruneResult<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(TagpruneError::scan(root, "project root is not a directory"));
    }

    let rules = ScanRules::new(cfg, skip_files);
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| !e.file_type().is_dir() || rules.enters_dir(e))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log_scan_skipped(e.path().unwrap_or(root), &e);
                continue;
            }
        };
        if entry.file_type().is_file() && rules.accepts_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Adds every uppercase token of `text` to `out`.
pub fn extract_upper_tokens(text: &str, out: &mut HashSet<String>) {
    for m in upper_token_regex().find_iter(text) {
        if !out.contains(m.as_str()) {
            out.insert(m.as_str().to_string());
        }
    }
}

/// Reads all files in parallel and unions their tokens.
///
/// Unreadable files are logged and contribute nothing.
pub fn collect_upper_tokens(files: &[PathBuf]) -> HashSet<String> {
    files
        .par_iter()
        .map(|path| {
            let mut tokens = HashSet::new();
            match fs::read(path) {
                Ok(bytes) => extract_upper_tokens(&decode_text(bytes).0, &mut tokens),
                Err(e) => log_scan_skipped(path, &e),
            }
            tokens
        })
        .reduce(HashSet::new, |mut acc, set| {
            if acc.len() < set.len() {
                return set.into_iter().chain(acc).collect();
            }
            acc.extend(set);
            acc
        })
}

/// Gathers and tokenizes a source tree in one step.
pub fn scan_tokens(root: &Path, cfg: &ScanConfig, skip_files: &[&str]) -> TagpruneResult<TokenScan> {
    let files = gather_source_files(root, cfg, skip_files)?;
    let tokens = collect_upper_tokens(&files);
    Ok(TokenScan {
        files_scanned: files.len(),
        tokens,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_temp_dir(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir()
            .join("tagprune_scan_test")
            .join(format!("{}_{}_{}", name, std::process::id(), id));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write(path: &Path, content: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| {
                f.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_extract_upper_tokens() {
        let mut tokens = HashSet::new();
        extract_upper_tokens("echo $this->translate('MSG_SAVE'); AB x9 xFOO_BAR9 Ok", &mut tokens);
        assert!(tokens.contains("MSG_SAVE"));
        assert!(tokens.contains("FOO_BAR9"));
        assert!(!tokens.contains("AB"));
        assert!(!tokens.contains("Ok"));
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_gather_respects_rules() {
        let root = create_temp_dir("rules");
        write(&root.join("index.php"), b"TXT_ROOT");
        write(&root.join("database.sql"), b"TXT_DUMP");
        write(&root.join("engine/core/a.php"), b"TXT_ENGINE");
        write(&root.join("engine/vendor/b.php"), b"TXT_VENDOR");
        write(&root.join("engine/logo.PNG"), b"TXT_BINARY");
        write(&root.join("site/package-lock.json"), b"TXT_LOCK");
        write(&root.join("docs/readme.md"), b"TXT_DOCS");

        let cfg = ScanConfig::default();
        let files = gather_source_files(&root, &cfg, &["database.sql"]).unwrap();
        assert_eq!(relative(&root, &files), vec!["engine/core/a.php", "index.php"]);

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_scan_tokens_handles_invalid_utf8() {
        let root = create_temp_dir("utf8");
        write(&root.join("app/view.tpl"), b"\xff\xfeBTN_OK \xc3 LABEL_NAME");

        let scan = scan_tokens(&root, &ScanConfig::default(), &[]).unwrap();
        assert_eq!(scan.files_scanned, 1);
        assert!(scan.tokens.contains("BTN_OK"));
        assert!(scan.tokens.contains("LABEL_NAME"));

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_custom_include_roots() {
        let root = create_temp_dir("custom");
        write(&root.join("src/main.js"), b"ONLY_HERE");
        write(&root.join("engine/x.php"), b"NOT_HERE");

        let cfg = ScanConfig {
            include_roots: vec!["src".to_string()],
            ..ScanConfig::default()
        };
        let scan = scan_tokens(&root, &cfg, &[]).unwrap();
        assert!(scan.tokens.contains("ONLY_HERE"));
        assert!(!scan.tokens.contains("NOT_HERE"));

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_gather_skips_interrupted_dump_writes() {
        let root = create_temp_dir("write_temp");
        write(&root.join("index.php"), b"TXT_ROOT");
        write(&root.join("database.sql"), b"TXT_DUMP");
        write(&root.join(".database.sql.4242.1700000000.tmp"), b"TXT_STALE");
        write(&root.join(".editor.tmp"), b"TXT_EDITOR");

        let files = gather_source_files(&root, &ScanConfig::default(), &["database.sql"]).unwrap();
        assert_eq!(relative(&root, &files), vec![".editor.tmp", "index.php"]);

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_gather_rejects_missing_root() {
        let root = create_temp_dir("missing_root").join("absent");
        let err = gather_source_files(&root, &ScanConfig::default(), &[]).unwrap_err();
        assert!(matches!(err, TagpruneError::Scan { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_gather_follows_symlinks_and_skips_broken_entries() {
        use std::os::unix::fs::symlink;

        let root = create_temp_dir("symlinks");
        write(&root.join("engine/a.php"), b"TXT_A");
        write(&root.join("shared/lib.php"), b"TXT_LINKED");
        symlink(root.join("shared/lib.php"), root.join("engine/lib.php")).unwrap();
        symlink(root.join("shared/absent.php"), root.join("engine/broken.php")).unwrap();

        let scan = scan_tokens(&root, &ScanConfig::default(), &[]).unwrap();
        assert_eq!(scan.files_scanned, 2);
        assert!(scan.tokens.contains("TXT_A"));
        assert!(scan.tokens.contains("TXT_LINKED"));

        fs::remove_dir_all(&root).ok();
    }
}
