use crate::accessor::{self, dangling_links, link_counts, EntryPool, LinkedEntry};
use crate::error::{CarnetError, Result};
use crate::graph::{Dimensions, GraphEntry, GraphView};
use crate::storage::{EntryFilter, Storage, UserStats};
use crate::types::{
    Entry, EntryBody, EntryRef, EntryVariant, LinkId, LinkKind, SpiritualLink, UserId,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// What deleting an entry does to the links that point at it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DanglingPolicy {
    /// Leave the links; readers skip them.
    #[default]
    Keep,
    /// Delete every link touching the entry along with it.
    Cascade,
}

#[derive(Debug, Clone, Default)]
pub struct JournalConfig {
    pub dangling_policy: DanglingPolicy,
}

/// Where the user came from when opening an entry, decided once by the
/// caller and handed down to the detail view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewOrigin {
    /// The list page of the entry's own variant.
    #[default]
    List,
    /// The relationship graph.
    Graph,
}

impl ViewOrigin {
    pub fn back_path(self, entry: EntryRef) -> String {
        match self {
            ViewOrigin::List => format!("/entries?variant={}", entry.variant),
            ViewOrigin::Graph => "/graph/viz".to_string(),
        }
    }
}

impl FromStr for ViewOrigin {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "list" => Ok(ViewOrigin::List),
            "graph" => Ok(ViewOrigin::Graph),
            other => Err(format!("Unknown view origin '{}'", other)),
        }
    }
}

/// An entry with its resolved links, as shown on a detail page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryDetail {
    pub entry: Entry,
    pub links: Vec<LinkedEntry>,
    pub back: String,
}

/// One row of a list page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntrySummary {
    pub entry: Entry,
    pub short_text: String,
    pub links_count: usize,
}

/// Everything one page load needs: the user's entries across all variants
/// and their links, fetched once.
#[derive(Debug, Clone, Default)]
pub struct JournalSnapshot {
    pub entries: Vec<Entry>,
    pub links: Vec<SpiritualLink>,
}

impl JournalSnapshot {
    pub fn pool(&self) -> EntryPool<'_> {
        EntryPool::new(&self.entries)
    }

    /// Entries tagged with their precomputed link counts.
    pub fn graph_entries(&self) -> Vec<GraphEntry> {
        let counts = link_counts(&self.links);
        self.entries
            .iter()
            .map(|entry| GraphEntry {
                entry: entry.clone(),
                links_count: Some(counts.get(&entry.id).copied().unwrap_or(0)),
            })
            .collect()
    }

    pub fn summaries(&self, variant: Option<EntryVariant>) -> Vec<EntrySummary> {
        let counts = link_counts(&self.links);
        self.entries
            .iter()
            .filter(|e| variant.map_or(true, |v| e.variant() == v))
            .map(|entry| EntrySummary {
                short_text: entry.short_text().to_string(),
                links_count: counts.get(&entry.id).copied().unwrap_or(0),
                entry: entry.clone(),
            })
            .collect()
    }

    pub fn linked_entries(&self, entry: &Entry) -> Vec<LinkedEntry> {
        accessor::resolve_links(entry, &self.links, &self.pool())
    }

    pub fn graph_view(&self, dimensions: Dimensions) -> GraphView {
        GraphView::new(self.graph_entries(), self.links.clone(), dimensions)
    }
}

/// Journal operations over an injected store. Holds no global state; the
/// composition root decides which store backs it.
#[derive(Clone)]
pub struct Journal {
    storage: Arc<dyn Storage>,
    config: JournalConfig,
}

impl Journal {
    pub fn new(storage: Arc<dyn Storage>, config: JournalConfig) -> Self {
        Self { storage, config }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn config(&self) -> &JournalConfig {
        &self.config
    }

    /// Fetch everything the user owns in one go.
    pub fn load(&self, user: UserId) -> Result<JournalSnapshot> {
        Ok(JournalSnapshot {
            entries: self.storage.list_entries(user, EntryFilter::new())?,
            links: self.storage.list_links(user)?,
        })
    }

    pub fn list_entries(&self, user: UserId, filter: EntryFilter) -> Result<Vec<Entry>> {
        self.storage.list_entries(user, filter)
    }

    pub fn create_entry(&self, user: UserId, body: EntryBody) -> Result<Entry> {
        let entry = Entry::new(user, body);
        self.storage.put_entry(&entry)?;
        log::info!("Created {} for user {}", entry.entry_ref(), user);
        Ok(entry)
    }

    /// Replace an entry's content. The variant is fixed at creation.
    pub fn update_entry(&self, user: UserId, entry: EntryRef, body: EntryBody) -> Result<Entry> {
        if body.variant() != entry.variant {
            return Err(CarnetError::Validation(format!(
                "Cannot store a {} body in {}",
                body.variant(),
                entry
            )));
        }
        let mut stored = self
            .storage
            .get_entry(user, entry)?
            .ok_or(CarnetError::EntryNotFound(entry))?;
        stored.body = body;
        self.storage.put_entry(&stored)?;
        Ok(stored)
    }

    pub fn get_entry(&self, user: UserId, entry: EntryRef) -> Result<Entry> {
        self.storage
            .get_entry(user, entry)?
            .ok_or(CarnetError::EntryNotFound(entry))
    }

    /// Delete an entry and, under the cascade policy, its links. Returns the
    /// number of links removed.
    pub fn delete_entry(&self, user: UserId, entry: EntryRef) -> Result<usize> {
        let removed = match self.config.dangling_policy {
            DanglingPolicy::Keep => {
                self.storage.delete_entry(user, entry)?;
                0
            }
            DanglingPolicy::Cascade => self.storage.delete_entry_cascade(user, entry)?,
        };

        log::info!("Deleted {} ({} links removed)", entry, removed);
        Ok(removed)
    }

    pub fn entry_detail(
        &self,
        user: UserId,
        entry: EntryRef,
        origin: ViewOrigin,
    ) -> Result<EntryDetail> {
        let snapshot = self.load(user)?;
        let found = snapshot
            .pool()
            .get(entry)
            .cloned()
            .ok_or(CarnetError::EntryNotFound(entry))?;
        Ok(EntryDetail {
            links: snapshot.linked_entries(&found),
            entry: found,
            back: origin.back_path(entry),
        })
    }

    pub fn linked_entries(&self, user: UserId, entry: EntryRef) -> Result<Vec<LinkedEntry>> {
        Ok(self.entry_detail(user, entry, ViewOrigin::List)?.links)
    }

    pub fn create_link(
        &self,
        user: UserId,
        source: EntryRef,
        target: EntryRef,
        kind: LinkKind,
        description: impl Into<String>,
    ) -> Result<SpiritualLink> {
        let link = SpiritualLink::new(user, source, target, kind, description);
        self.storage.put_link(&link)?;
        log::info!("Linked {} -[{}]-> {}", source, kind, target);
        Ok(link)
    }

    pub fn delete_link(&self, user: UserId, id: LinkId) -> Result<()> {
        self.storage.delete_link(user, id)
    }

    pub fn list_links(&self, user: UserId) -> Result<Vec<SpiritualLink>> {
        self.storage.list_links(user)
    }

    /// Remove the user's links that point at entries which no longer exist.
    pub fn prune_dangling(&self, user: UserId) -> Result<usize> {
        let snapshot = self.load(user)?;
        let pool = snapshot.pool();
        let dangling = dangling_links(&snapshot.links, &pool);
        for link in &dangling {
            self.storage.delete_link(user, link.id)?;
        }
        if !dangling.is_empty() {
            log::info!("Pruned {} dangling links for user {}", dangling.len(), user);
        }
        Ok(dangling.len())
    }

    pub fn user_stats(&self, user: UserId) -> Result<UserStats> {
        let snapshot = self.load(user)?;
        Ok(UserStats {
            user_id: user,
            entry_count: snapshot.entries.len() as u64,
            link_count: snapshot.links.len() as u64,
        })
    }
}
