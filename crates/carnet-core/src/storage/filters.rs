use crate::types::{Entry, EntryVariant, UserId};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Filter criteria for listing a user's entries
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub variants: Option<Vec<EntryVariant>>,
    pub tags: Option<Vec<String>>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl EntryFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by entry variants
    pub fn with_variants(mut self, variants: Vec<EntryVariant>) -> Self {
        self.variants = Some(variants);
        self
    }

    /// Filter by tags (entries must have at least one of these tags)
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Entries dated on or after this day
    pub fn from_date(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    /// Entries dated on or before this day
    pub fn to_date(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    /// Limit number of results
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip first N results
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub(crate) fn matches(&self, entry: &Entry) -> bool {
        if let Some(ref variants) = self.variants {
            if !variants.contains(&entry.variant()) {
                return false;
            }
        }

        if let Some(ref tags) = self.tags {
            if !tags.iter().any(|t| entry.body.tags().contains(t)) {
                return false;
            }
        }

        let date = entry.body.date();
        if let Some(from) = self.date_from {
            if date < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if date > to {
                return false;
            }
        }

        true
    }

    /// Sort newest first (by entry date, then creation time) and apply
    /// offset/limit.
    pub(crate) fn finish(&self, mut entries: Vec<Entry>) -> Vec<Entry> {
        entries.sort_by(|a, b| {
            b.body
                .date()
                .cmp(&a.body.date())
                .then(b.created_at.cmp(&a.created_at))
        });

        let start = self.offset.unwrap_or(0);
        let take = self.limit.unwrap_or(usize::MAX);
        entries.into_iter().skip(start).take(take).collect()
    }
}

/// Storage statistics
#[derive(Debug, Clone, Default)]
pub struct StorageStats {
    pub entry_count: u64,
    pub link_count: u64,
    pub user_count: u64,
    pub entry_counts_by_variant: HashMap<EntryVariant, u64>,
}

/// Per-user statistics
#[derive(Debug, Clone, Default)]
pub struct UserStats {
    pub user_id: UserId,
    pub entry_count: u64,
    pub link_count: u64,
}
