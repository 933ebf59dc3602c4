//! Document model of a SQL dump.
//!
//! A dump is kept as an ordered list of [`Segment`]s: verbatim text and
//! `INSERT INTO `<table>` VALUES ...;` blocks. Rendering concatenates the
//! segments, so anything that is not explicitly rewritten comes back out
//! byte for byte.
//!
//! ```text
//!  -- schema ...          Segment::Text
//!  INSERT INTO `a` VALUES Segment::Insert { header, body = "\n(1,'X'),\n(2,'Y');" }
//!  /*!40000 ALTER ...*/;  Segment::Text
//! ```

pub mod lexer;
pub mod locate;

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{TagpruneError, TagpruneResult};
use lexer::find_statement_end;

pub use lexer::{leading_id, split_fields, split_tuples, RowId, SqlValue, TupleSplit};
pub use locate::{extract_block, insert_marker, replace_block};

/// Statement terminator closing every insert block.
pub const TERMINATOR: char = ';';

fn insert_header_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    // SAFETY: hardcoded pattern, covered by tests.
    REGEX.get_or_init(|| {
        Regex::new(r"INSERT INTO `([^`]+)` VALUES").expect("Hardcoded regex pattern is valid")
    })
}

/// One `INSERT INTO ... VALUES ...;` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertBlock {
    table: String,
    header: String,
    /// Row tuples followed by the terminator.
    body: String,
    rewritten: bool,
}

impl InsertBlock {
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Row-tuple text between the `VALUES` keyword and the terminator.
    pub fn rows_text(&self) -> &str {
        self.body.strip_suffix(TERMINATOR).unwrap_or(&self.body)
    }

    /// Top-level tuples of this block.
    pub fn tuples(&self) -> TupleSplit<'_> {
        split_tuples(self.rows_text())
    }

    /// Replaces row text and terminator. A missing terminator is appended.
    pub fn replace_body(&mut self, mut body: String) {
        if !body.ends_with(TERMINATOR) {
            body.push(TERMINATOR);
        }
        self.rewritten = self.rewritten || body != self.body;
        self.body = body;
    }

    pub fn is_rewritten(&self) -> bool {
        self.rewritten
    }

    fn render_into(&self, out: &mut String) {
        out.push_str(&self.header);
        out.push_str(&self.body);
    }
}

/// A piece of the dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Insert(InsertBlock),
}

/// A parsed dump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpDocument {
    segments: Vec<Segment>,
    /// Tables whose insert statement never terminated.
    unterminated: Vec<String>,
}

impl DumpDocument {
    /// Splits dump text into segments.
    ///
    /// An insert statement with no terminator is kept as text and remembered,
    /// so only callers that need that table fail.
    pub fn parse(text: &str) -> Self {
        let mut doc = Self::default();
        let mut text_start = 0usize;
        let mut pos = 0usize;

        while let Some(caps) = insert_header_regex().captures_at(text, pos) {
            let (Some(header), Some(table)) = (caps.get(0), caps.get(1)) else {
                break;
            };

            let Some(end) = find_statement_end(text, header.end()) else {
                doc.unterminated.push(table.as_str().to_string());
                break;
            };

            if header.start() > text_start {
                doc.segments
                    .push(Segment::Text(text[text_start..header.start()].to_string()));
            }
            doc.segments.push(Segment::Insert(InsertBlock {
                table: table.as_str().to_string(),
                header: header.as_str().to_string(),
                body: text[header.end()..=end].to_string(),
                rewritten: false,
            }));

            text_start = end + 1;
            pos = end + 1;
        }

        if text_start < text.len() {
            doc.segments.push(Segment::Text(text[text_start..].to_string()));
        }
        doc
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn inserts(&self) -> impl Iterator<Item = &InsertBlock> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Insert(b) => Some(b),
            Segment::Text(_) => None,
        })
    }

    /// All insert blocks for `table`, in document order.
    pub fn blocks<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a InsertBlock> + 'a {
        self.inserts().filter(move |b| b.table == table)
    }

    /// Mutable access to all insert blocks for `table`.
    pub fn blocks_mut<'a>(
        &'a mut self,
        table: &'a str,
    ) -> impl Iterator<Item = &'a mut InsertBlock> + 'a {
        self.segments.iter_mut().filter_map(move |s| match s {
            Segment::Insert(b) if b.table == table => Some(b),
            _ => None,
        })
    }

    /// Fails unless `table` has at least one terminated insert block.
    pub fn require(&self, table: &str) -> TagpruneResult<()> {
        if self.inserts().any(|b| b.table == table) {
            return Ok(());
        }
        if self.unterminated.iter().any(|t| t == table) {
            return Err(TagpruneError::unterminated(table));
        }
        Err(TagpruneError::missing_block(table, insert_marker(table)))
    }

    /// First insert block of a required table.
    pub fn first_block(&self, table: &str) -> TagpruneResult<&InsertBlock> {
        self.require(table)?;
        self.inserts()
            .find(|b| b.table == table)
            .ok_or_else(|| TagpruneError::missing_block(table, insert_marker(table)))
    }

    /// Row tuples across every insert block of a required table.
    pub fn tuples(&self, table: &str) -> TagpruneResult<TupleSplit<'_>> {
        self.require(table)?;
        let mut all = TupleSplit::default();
        for block in self.inserts().filter(|b| b.table == table) {
            let split = block.tuples();
            all.tuples.extend(split.tuples);
            all.stray += split.stray;
        }
        Ok(all)
    }

    pub fn is_rewritten(&self) -> bool {
        self.inserts().any(|b| b.rewritten)
    }

    /// Serializes the document back to text.
    pub fn render(&self) -> String {
        let capacity = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Text(t) => t.len(),
                Segment::Insert(b) => b.header.len() + b.body.len(),
            })
            .sum();
        let mut out = String::with_capacity(capacity);
        for segment in &self.segments {
            match segment {
                Segment::Text(t) => out.push_str(t),
                Segment::Insert(b) => b.render_into(&mut out),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "-- header\n\
CREATE TABLE `share_lang_tags` (`ltag_id` int, `ltag_name` varchar(70));\n\
/*!40000 ALTER TABLE `share_lang_tags` DISABLE KEYS */;\n\
INSERT INTO `share_lang_tags` VALUES\n(1,'FOO'),\n(2,'BAR');\n\
/*!40000 ALTER TABLE `share_lang_tags` ENABLE KEYS */;\n\
INSERT INTO `other` VALUES (1,'semi;colon'),(2,'x');\n\
-- footer\n";

    #[test]
    fn test_render_is_identity() {
        let doc = DumpDocument::parse(DUMP);
        assert_eq!(doc.render(), DUMP);
        assert!(!doc.is_rewritten());
    }

    #[test]
    fn test_segments_layout() {
        let doc = DumpDocument::parse(DUMP);
        let kinds: Vec<&str> = doc
            .segments()
            .iter()
            .map(|s| match s {
                Segment::Text(_) => "text",
                Segment::Insert(b) => b.table(),
            })
            .collect();
        assert_eq!(kinds, vec!["text", "share_lang_tags", "text", "other", "text"]);
    }

    #[test]
    fn test_rows_text_excludes_terminator() {
        let doc = DumpDocument::parse(DUMP);
        let block = doc.first_block("share_lang_tags").unwrap();
        assert_eq!(block.rows_text(), "\n(1,'FOO'),\n(2,'BAR')");
        assert_eq!(block.tuples().tuples, vec!["(1,'FOO')", "(2,'BAR')"]);
    }

    #[test]
    fn test_quoted_terminator_does_not_split_block() {
        let doc = DumpDocument::parse(DUMP);
        let other = doc.first_block("other").unwrap();
        assert_eq!(other.tuples().tuples, vec!["(1,'semi;colon')", "(2,'x')"]);
    }

    #[test]
    fn test_missing_and_unterminated_tables() {
        let doc = DumpDocument::parse("INSERT INTO `a` VALUES (1,'x');\nINSERT INTO `b` VALUES (1,'y')");
        assert!(doc.require("a").is_ok());
        assert!(matches!(
            doc.require("b"),
            Err(TagpruneError::UnterminatedBlock { .. })
        ));
        assert!(matches!(
            doc.require("c"),
            Err(TagpruneError::MissingBlock { .. })
        ));
        assert_eq!(doc.render(), "INSERT INTO `a` VALUES (1,'x');\nINSERT INTO `b` VALUES (1,'y')");
    }

    #[test]
    fn test_tuples_span_multiple_statements() {
        let doc = DumpDocument::parse(
            "INSERT INTO `t` VALUES (1,'A'),(2,'B');\nINSERT INTO `t` VALUES (3,'C');\n",
        );
        assert_eq!(doc.blocks("t").count(), 2);
        assert_eq!(
            doc.tuples("t").unwrap().tuples,
            vec!["(1,'A')", "(2,'B')", "(3,'C')"]
        );
    }

    #[test]
    fn test_replace_body_marks_rewritten() {
        let mut doc = DumpDocument::parse(DUMP);
        for block in doc.blocks_mut("share_lang_tags") {
            block.replace_body("\n(1,'FOO');".to_string());
        }
        assert!(doc.is_rewritten());
        let rendered = doc.render();
        assert!(rendered.contains("INSERT INTO `share_lang_tags` VALUES\n(1,'FOO');\n/*!40000"));
        assert!(rendered.contains("(1,'semi;colon'),(2,'x');"));
    }
}
