//! Audit report: JSON and Markdown serializations, plus a terminal summary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IoResultExt, TagpruneError, TagpruneResult};
use crate::xref::CrossReference;

pub const JSON_REPORT_NAME: &str = "translation_audit.json";
pub const MARKDOWN_REPORT_NAME: &str = "translation_audit.md";

/// Headline counts of an audit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total_constants: usize,
    pub used_constants: usize,
    pub unused_constants: usize,
    pub constants_missing_translations: usize,
}

impl AuditSummary {
    /// Metric name/value pairs in declaration order.
    pub fn metrics(&self) -> [(&'static str, usize); 4] {
        [
            ("total_constants", self.total_constants),
            ("used_constants", self.used_constants),
            ("unused_constants", self.unused_constants),
            (
                "constants_missing_translations",
                self.constants_missing_translations,
            ),
        ]
    }
}

/// Serializable audit result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub summary: AuditSummary,
    pub unused_constants: Vec<String>,
    pub constants_missing_translations: BTreeMap<String, Vec<String>>,
}

impl From<&CrossReference> for AuditReport {
    fn from(xref: &CrossReference) -> Self {
        Self {
            summary: AuditSummary {
                total_constants: xref.total_constants,
                used_constants: xref.used_constants.len(),
                unused_constants: xref.unused_constants.len(),
                constants_missing_translations: xref.missing_translations.len(),
            },
            unused_constants: xref.unused_constants.clone(),
            constants_missing_translations: xref.missing_translations.clone(),
        }
    }
}

/// `total_constants` → `Total Constants`.
fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl AuditReport {
    /// Pretty-printed JSON. Non-ASCII text is written as-is.
    pub fn to_json(&self) -> TagpruneResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| TagpruneError::report(e.to_string()))
    }

    /// Human-readable Markdown with summary and detail tables.
    pub fn to_markdown(&self) -> String {
        let mut lines: Vec<String> = vec![
            "# Translation audit report".into(),
            String::new(),
            "## Summary".into(),
            String::new(),
            "| Metric | Value |".into(),
            "| --- | ---: |".into(),
        ];
        for (key, value) in self.summary.metrics() {
            lines.push(format!("| {} | {} |", title_case(key), value));
        }
        lines.push(String::new());

        lines.push("## Notes".into());
        lines.push(String::new());
        lines.push("* Only literal uppercase constants are considered when checking code usage; dynamically generated identifiers may be missed.".into());
        lines.push("* Missing translations are calculated against every language defined in `share_languages`.".into());
        lines.push(String::new());

        lines.push("## Unused translation constants".into());
        lines.push(String::new());
        if self.unused_constants.is_empty() {
            lines.push("No unused constants found.".into());
        } else {
            lines.push("```".into());
            lines.extend(self.unused_constants.iter().cloned());
            lines.push("```".into());
        }
        lines.push(String::new());

        lines.push("## Constants missing translations".into());
        lines.push(String::new());
        if self.constants_missing_translations.is_empty() {
            lines.push("All constants have translations for all languages.".into());
        } else {
            lines.push("| Constant | Missing languages |".into());
            lines.push("| --- | --- |".into());
            for (name, codes) in &self.constants_missing_translations {
                lines.push(format!("| {} | {} |", name, codes.join(", ")));
            }
        }
        lines.push(String::new());

        lines.join("\n")
    }

    /// Writes both reports into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> TagpruneResult<ReportPaths> {
        fs::create_dir_all(dir).with_path(dir)?;
        let paths = ReportPaths {
            json: dir.join(JSON_REPORT_NAME),
            markdown: dir.join(MARKDOWN_REPORT_NAME),
        };
        fs::write(&paths.json, self.to_json()?).with_path(&paths.json)?;
        fs::write(&paths.markdown, self.to_markdown()).with_path(&paths.markdown)?;
        Ok(paths)
    }
}

/// Where [`AuditReport::write_to`] put the files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub markdown: PathBuf,
}

/// Prints the audit summary in plain text format.
pub fn print_plain(report: &AuditReport) {
    println!("=== Translation Audit ===\n");
    for (key, value) in report.summary.metrics() {
        println!("{:<32}{}", format!("{}:", title_case(key)), value);
    }

    if !report.unused_constants.is_empty() {
        println!("\nUNUSED CONSTANTS ({}):", report.unused_constants.len());
        for name in &report.unused_constants {
            println!("- {}", name);
        }
    }
}

/// Prints the audit report in JSON format.
///
/// Falls back to a debug rendering if serialization fails.
pub fn print_json(report: &AuditReport) {
    match report.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            println!("{:?}", report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AuditReport {
        AuditReport {
            summary: AuditSummary {
                total_constants: 2,
                used_constants: 1,
                unused_constants: 1,
                constants_missing_translations: 1,
            },
            unused_constants: vec!["BAR".into()],
            constants_missing_translations: BTreeMap::from([(
                "FOO".to_string(),
                vec!["fr".to_string(), "uk".to_string()],
            )]),
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("total_constants"), "Total Constants");
        assert_eq!(
            title_case("constants_missing_translations"),
            "Constants Missing Translations"
        );
    }

    #[test]
    fn test_json_shape() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["total_constants"], 2);
        assert_eq!(value["unused_constants"][0], "BAR");
        assert_eq!(value["constants_missing_translations"]["FOO"][1], "uk");

        // summary comes first, as declared
        assert!(json.find("\"summary\"").unwrap() < json.find("\"unused_constants\": [").unwrap());
    }

    #[test]
    fn test_json_keeps_non_ascii() {
        let mut report = sample();
        report.unused_constants = vec!["ЗАГОЛОВОК".into()];
        assert!(report.to_json().unwrap().contains("ЗАГОЛОВОК"));
    }

    #[test]
    fn test_markdown_sections() {
        let md = sample().to_markdown();
        assert!(md.starts_with("# Translation audit report\n"));
        assert!(md.contains("| Total Constants | 2 |"));
        assert!(md.contains("```\nBAR\n```"));
        assert!(md.contains("| FOO | fr, uk |"));
        assert!(md.ends_with("|\n"));
    }

    #[test]
    fn test_markdown_empty_sections() {
        let md = AuditReport::default().to_markdown();
        assert!(md.contains("No unused constants found."));
        assert!(md.contains("All constants have translations for all languages."));
    }

    #[test]
    fn test_from_cross_reference() {
        let xref = CrossReference {
            total_constants: 3,
            used_constants: vec!["A".into(), "B".into()],
            unused_constants: vec!["C".into()],
            ..CrossReference::default()
        };
        let report = AuditReport::from(&xref);
        assert_eq!(report.summary.used_constants, 2);
        assert_eq!(report.summary.unused_constants, 1);
        assert_eq!(report.summary.constants_missing_translations, 0);
    }

    #[test]
    fn test_write_to_creates_dir() {
        let dir = std::env::temp_dir()
            .join("tagprune_report_test")
            .join(format!("{}", std::process::id()))
            .join("reports");
        let paths = sample().write_to(&dir).unwrap();
        assert!(paths.json.exists());
        assert!(fs::read_to_string(&paths.markdown).unwrap().contains("| FOO | fr, uk |"));
        fs::remove_dir_all(dir.parent().unwrap()).ok();
    }
}
