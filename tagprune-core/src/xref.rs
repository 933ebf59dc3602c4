//! Cross-referencing tag definitions against scanned tokens and translations.
//!
//! ```text
//!   tags ──┬── names ∩ tokens ──► used / unused
//!          └── ids × languages − links ──► missing translations
//! ```
//!
//! Everything here is a pure function of its inputs; output collections are
//! sorted so repeated runs produce identical reports.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::dump::RowId;
use crate::rows::{Language, Tag, TranslationLink};

/// Tag ids split by whether their name occurs in the token set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPartition {
    pub used_ids: BTreeSet<RowId>,
    pub unused_ids: BTreeSet<RowId>,
}

/// Splits tags into used and unused by exact, case-sensitive name match.
pub fn partition_tags(tags: &[Tag], tokens: &HashSet<String>) -> TagPartition {
    let mut partition = TagPartition::default();
    for tag in tags {
        if tokens.contains(&tag.name) {
            partition.used_ids.insert(tag.id);
        } else {
            partition.unused_ids.insert(tag.id);
        }
    }
    // An id listed twice with different names is kept if any of them is used.
    partition.unused_ids.retain(|id| !partition.used_ids.contains(id));
    partition
}

/// Ids of rows that survive a prune.
pub fn keep_set(tags: &[Tag], tokens: &HashSet<String>) -> HashSet<RowId> {
    partition_tags(tags, tokens).used_ids.into_iter().collect()
}

/// Complete cross-reference of one dump against one source tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossReference {
    pub partition: TagPartition,
    /// Distinct tag names.
    pub total_constants: usize,
    pub used_constants: Vec<String>,
    pub unused_constants: Vec<String>,
    /// Tag name → sorted language codes lacking a translation.
    pub missing_translations: BTreeMap<String, Vec<String>>,
}

fn language_label(lang: &Language) -> String {
    if lang.code.is_empty() {
        lang.id.to_string()
    } else {
        lang.code.clone()
    }
}

/// Computes used/unused constants and per-constant missing languages.
pub fn cross_reference(
    tags: &[Tag],
    links: &[TranslationLink],
    languages: &[Language],
    tokens: &HashSet<String>,
) -> CrossReference {
    let partition = partition_tags(tags, tokens);

    let names: BTreeSet<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    let (used, unused): (Vec<&str>, Vec<&str>) =
        names.iter().copied().partition(|name| tokens.contains(*name));

    // Later rows win on duplicate language ids.
    let language_labels: BTreeMap<RowId, String> = languages
        .iter()
        .map(|l| (l.id, language_label(l)))
        .collect();
    let linked: HashSet<(RowId, RowId)> = links
        .iter()
        .map(|l| (l.tag_id, l.language_id))
        .collect();

    let mut missing: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for tag in tags {
        for (lang_id, label) in &language_labels {
            if !linked.contains(&(tag.id, *lang_id)) {
                missing
                    .entry(tag.name.clone())
                    .or_default()
                    .insert(label.clone());
            }
        }
    }

    CrossReference {
        partition,
        total_constants: names.len(),
        used_constants: used.into_iter().map(str::to_string).collect(),
        unused_constants: unused.into_iter().map(str::to_string).collect(),
        missing_translations: missing
            .into_iter()
            .map(|(name, codes)| (name, codes.into_iter().collect()))
            .collect(),
    }
}
