//! Structured rows of the three localization tables.
//!
//! Each table kind reads only the leading fields it needs and ignores the
//! rest. Tuples that do not fit are skipped and counted, never fatal.
//!
//! | table                         | fields read                   |
//! |-------------------------------|-------------------------------|
//! | `share_lang_tags`             | `(id, 'name', ...)`           |
//! | `share_lang_tags_translation` | `(tag_id, language_id, '...`  |
//! | `share_languages`             | `(id, '_', 'code', 'name'...` |

use serde::Serialize;

use crate::dump::{split_fields, split_tuples, DumpDocument, RowId, SqlValue};
use crate::error::TagpruneResult;
use crate::logging::log_rows_skipped;

pub const TAGS_TABLE: &str = "share_lang_tags";
pub const TRANSLATIONS_TABLE: &str = "share_lang_tags_translation";
pub const LANGUAGES_TABLE: &str = "share_languages";

/// A localization constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: RowId,
    pub name: String,
}

/// Asserts a translation exists for `tag_id` in `language_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TranslationLink {
    pub tag_id: RowId,
    pub language_id: RowId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub id: RowId,
    pub code: String,
    pub name: String,
}

/// Row counts for one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub table: String,
    pub parsed: usize,
    pub skipped: usize,
}

/// Rows of one table plus how many tuples were skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<T> {
    pub rows: Vec<T>,
    pub stats: ParseStats,
}

impl<T> Parsed<T> {
    fn empty(table: &str) -> Self {
        Self {
            rows: Vec::new(),
            stats: ParseStats {
                table: table.to_string(),
                ..ParseStats::default()
            },
        }
    }
}

fn tag_from_fields(fields: &[SqlValue]) -> Option<Tag> {
    let id = fields.first()?.as_id()?;
    let name = fields.get(1)?.as_str()?;
    if name.is_empty() {
        return None;
    }
    Some(Tag {
        id,
        name: name.to_string(),
    })
}

fn link_from_fields(fields: &[SqlValue]) -> Option<TranslationLink> {
    let tag_id = fields.first()?.as_id()?;
    let language_id = fields.get(1)?.as_id()?;
    // The third column must be a string for the row to count as a translation.
    fields.get(2)?.as_str()?;
    Some(TranslationLink {
        tag_id,
        language_id,
    })
}

fn language_from_fields(fields: &[SqlValue]) -> Option<Language> {
    let id = fields.first()?.as_id()?;
    fields.get(1)?.as_str()?;
    let code = fields.get(2)?.as_str()?;
    let name = fields.get(3)?.as_str()?;
    Some(Language {
        id,
        code: code.to_string(),
        name: name.to_string(),
    })
}

fn parse_tuples<'a, T>(
    table: &str,
    tuples: impl IntoIterator<Item = &'a str>,
    stray: usize,
    row: impl Fn(&[SqlValue]) -> Option<T>,
) -> Parsed<T> {
    let mut out = Parsed::empty(table);
    out.stats.skipped = stray;
    for tuple in tuples {
        match split_fields(tuple).as_deref().and_then(&row) {
            Some(r) => out.rows.push(r),
            None => out.stats.skipped += 1,
        }
    }
    out.stats.parsed = out.rows.len();
    log_rows_skipped(table, out.stats.skipped);
    out
}

/// Parses the row-tuple text of a `share_lang_tags` block.
pub fn parse_tags(block: &str) -> Parsed<Tag> {
    let split = split_tuples(block);
    parse_tuples(TAGS_TABLE, split.tuples, split.stray, tag_from_fields)
}

/// Parses the row-tuple text of a `share_lang_tags_translation` block.
pub fn parse_translations(block: &str) -> Parsed<TranslationLink> {
    let split = split_tuples(block);
    parse_tuples(TRANSLATIONS_TABLE, split.tuples, split.stray, link_from_fields)
}

/// Parses the row-tuple text of a `share_languages` block.
pub fn parse_languages(block: &str) -> Parsed<Language> {
    let split = split_tuples(block);
    parse_tuples(LANGUAGES_TABLE, split.tuples, split.stray, language_from_fields)
}

/// Every table the audit reads, parsed from one document.
#[derive(Debug, Clone)]
pub struct DumpTables {
    pub tags: Vec<Tag>,
    pub links: Vec<TranslationLink>,
    pub languages: Vec<Language>,
    pub stats: Vec<ParseStats>,
}

impl DumpTables {
    /// Parses all three tables. Any missing table is fatal.
    pub fn from_document(doc: &DumpDocument) -> TagpruneResult<Self> {
        let tags = load_tags(doc)?;
        let links = {
            let split = doc.tuples(TRANSLATIONS_TABLE)?;
            parse_tuples(TRANSLATIONS_TABLE, split.tuples, split.stray, link_from_fields)
        };
        let languages = {
            let split = doc.tuples(LANGUAGES_TABLE)?;
            parse_tuples(LANGUAGES_TABLE, split.tuples, split.stray, language_from_fields)
        };

        Ok(Self {
            stats: vec![tags.stats, links.stats, languages.stats],
            tags: tags.rows,
            links: links.rows,
            languages: languages.rows,
        })
    }
}

/// Parses only the tag table, across all of its insert statements.
pub fn load_tags(doc: &DumpDocument) -> TagpruneResult<Parsed<Tag>> {
    let split = doc.tuples(TAGS_TABLE)?;
    Ok(parse_tuples(TAGS_TABLE, split.tuples, split.stray, tag_from_fields))
}
