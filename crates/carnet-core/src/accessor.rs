//! View-level queries over an already-fetched link collection.
//!
//! The collection is loaded once per page and passed in; nothing here touches
//! the store. Links count as relevant to an entry when the entry sits on
//! either end, whatever the link's direction. Every function degrades to an
//! empty result on an empty collection.

use crate::types::{Entry, EntryId, EntryRef, SpiritualLink};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Characters of the other entry's text shown in a link label.
pub const LABEL_EXCERPT_CHARS: usize = 40;

/// Number of links with `entry_id` as source or target. A self-link counts
/// once.
pub fn count_links_for_entry(entry_id: EntryId, links: &[SpiritualLink]) -> usize {
    links.iter().filter(|l| l.touches(entry_id)).count()
}

/// Links with the entry on either end, in input order, each once.
pub fn links_for_entry(entry: EntryRef, links: &[SpiritualLink]) -> Vec<&SpiritualLink> {
    links.iter().filter(|l| l.touches(entry.id)).collect()
}

/// Link count per entry id in a single pass over the links.
pub fn link_counts(links: &[SpiritualLink]) -> HashMap<EntryId, usize> {
    let mut counts = HashMap::new();
    for link in links {
        *counts.entry(link.source_id).or_insert(0) += 1;
        if link.target_id != link.source_id {
            *counts.entry(link.target_id).or_insert(0) += 1;
        }
    }
    counts
}

/// All of a user's entries, indexed by (variant, id). Built once per load
/// and used to resolve the other side of links.
#[derive(Debug, Default)]
pub struct EntryPool<'a> {
    by_ref: HashMap<EntryRef, &'a Entry>,
}

impl<'a> EntryPool<'a> {
    pub fn new(entries: &'a [Entry]) -> Self {
        Self {
            by_ref: entries.iter().map(|e| (e.entry_ref(), e)).collect(),
        }
    }

    pub fn get(&self, entry: EntryRef) -> Option<&'a Entry> {
        self.by_ref.get(&entry).copied()
    }

    pub fn contains(&self, entry: EntryRef) -> bool {
        self.by_ref.contains_key(&entry)
    }

    pub fn len(&self) -> usize {
        self.by_ref.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ref.is_empty()
    }
}

/// Which end of a link the viewing entry is on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LinkSide {
    Source,
    Target,
}

impl LinkSide {
    /// The viewing entry is the source when its id matches the link's
    /// source id; a self-link is seen from the source side.
    pub fn of(entry_id: EntryId, link: &SpiritualLink) -> Self {
        if link.source_id == entry_id {
            LinkSide::Source
        } else {
            LinkSide::Target
        }
    }

    /// The endpoint opposite to this side.
    pub fn other_end(self, link: &SpiritualLink) -> EntryRef {
        match self {
            LinkSide::Source => link.target(),
            LinkSide::Target => link.source(),
        }
    }
}

/// A link seen from one entry, with its other side resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkedEntry {
    pub link: SpiritualLink,
    pub side: LinkSide,
    pub other: Entry,
    /// "A → kind → B" from the source, "kind ← A" from the target.
    pub label: String,
}

/// Resolve every link touching `entry` against the pool. Links whose other
/// side is missing from the pool are skipped one by one; the rest still
/// resolve.
pub fn resolve_links(
    entry: &Entry,
    links: &[SpiritualLink],
    pool: &EntryPool<'_>,
) -> Vec<LinkedEntry> {
    links_for_entry(entry.entry_ref(), links)
        .into_iter()
        .filter_map(|link| {
            let side = LinkSide::of(entry.id, link);
            let other_ref = side.other_end(link);
            let Some(other) = pool.get(other_ref) else {
                log::debug!("Skipping link {}: {} is not loaded", link.id, other_ref);
                return None;
            };
            Some(LinkedEntry {
                label: link_label(entry, link, side, other),
                link: link.clone(),
                side,
                other: other.clone(),
            })
        })
        .collect()
}

fn link_label(entry: &Entry, link: &SpiritualLink, side: LinkSide, other: &Entry) -> String {
    let kind = format!("{} {}", link.kind.icon(), link.kind.label());
    match side {
        LinkSide::Source => format!(
            "{} → {} → {}",
            entry.excerpt(LABEL_EXCERPT_CHARS),
            kind,
            other.excerpt(LABEL_EXCERPT_CHARS)
        ),
        LinkSide::Target => format!("{} ← {}", kind, other.excerpt(LABEL_EXCERPT_CHARS)),
    }
}

/// Links with at least one endpoint missing from the pool.
pub fn dangling_links<'a>(
    links: &'a [SpiritualLink],
    pool: &EntryPool<'_>,
) -> Vec<&'a SpiritualLink> {
    links
        .iter()
        .filter(|l| !pool.contains(l.source()) || !pool.contains(l.target()))
        .collect()
}
