//! Text-level block extraction and replacement.
//!
//! Both operations go through [`DumpDocument`], so they agree on where a
//! block starts and ends without sharing any search state.

use super::DumpDocument;
use crate::error::TagpruneResult;

/// Start marker of a table's data block.
pub fn insert_marker(table: &str) -> String {
    format!("INSERT INTO `{}` VALUES", table)
}

/// Returns the row-tuple text of `table`'s first insert block, without the
/// terminator.
pub fn extract_block(dump: &str, table: &str) -> TagpruneResult<String> {
    let doc = DumpDocument::parse(dump);
    Ok(doc.first_block(table)?.rows_text().to_string())
}

/// Replaces the row tuples and terminator of `table`'s first insert block with
/// `new_block`. Every other byte of `dump` is kept.
pub fn replace_block(dump: &str, table: &str, new_block: &str) -> TagpruneResult<String> {
    let mut doc = DumpDocument::parse(dump);
    doc.require(table)?;
    if let Some(block) = doc.blocks_mut(table).next() {
        block.replace_body(new_block.to_string());
    }
    Ok(doc.render())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TagpruneError;

    const DUMP: &str = "SET NAMES utf8;\n\
INSERT INTO `share_lang_tags` VALUES\n(1,'FOO'),\n(2,'BAR');\n\
/*!40000 ALTER TABLE `share_lang_tags` ENABLE KEYS */;\n\
INSERT INTO `share_lang_tags_translation` VALUES\n(1,10,'Foo'),\n(2,10,'Bar');\n\
/*!40000 ALTER TABLE `share_lang_tags_translation` ENABLE KEYS */;\n";

    #[test]
    fn test_marker() {
        assert_eq!(insert_marker("share_languages"), "INSERT INTO `share_languages` VALUES");
    }

    #[test]
    fn test_extract_stops_at_first_terminator() {
        let rows = extract_block(DUMP, "share_lang_tags").unwrap();
        assert_eq!(rows, "\n(1,'FOO'),\n(2,'BAR')");
    }

    #[test]
    fn test_extract_does_not_match_prefix_table() {
        let rows = extract_block(DUMP, "share_lang_tags_translation").unwrap();
        assert!(rows.contains("(1,10,'Foo')"));
        assert!(!rows.contains("'FOO'"));
    }

    #[test]
    fn test_extract_missing_table() {
        let err = extract_block(DUMP, "share_languages").unwrap_err();
        assert!(matches!(err, TagpruneError::MissingBlock { .. }));
    }

    #[test]
    fn test_replace_keeps_surroundings() {
        let out = replace_block(DUMP, "share_lang_tags", "\n(1,'FOO');").unwrap();
        assert_eq!(
            out,
            DUMP.replace("\n(1,'FOO'),\n(2,'BAR');", "\n(1,'FOO');")
        );
    }

    #[test]
    fn test_replace_missing_table_fails() {
        let err = replace_block(DUMP, "share_languages", "\n;").unwrap_err();
        assert!(err.is_dump_structure());
    }
}
