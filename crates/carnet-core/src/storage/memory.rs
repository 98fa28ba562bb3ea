use crate::error::{CarnetError, Result};
use crate::storage::filters::{EntryFilter, StorageStats};
use crate::storage::traits::Storage;
use crate::storage::{check_entry_overwrite, check_link_endpoints};
use crate::types::{Entry, EntryRef, LinkId, SpiritualLink, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-process storage. Keeps links in insertion order; used as the fake
/// store in tests and for throwaway sessions.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<Vec<Entry>>,
    links: RwLock<Vec<SpiritualLink>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
        lock.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
        lock.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn put_entry(&self, entry: &Entry) -> Result<()> {
        let mut entries = Self::write(&self.entries);
        let position = entries.iter().position(|e| e.id == entry.id);
        check_entry_overwrite(entry, position.map(|i| &entries[i]))?;

        match position {
            Some(i) => entries[i] = entry.clone(),
            None => entries.push(entry.clone()),
        }
        Ok(())
    }

    fn get_entry(&self, owner: UserId, entry: EntryRef) -> Result<Option<Entry>> {
        let entries = Self::read(&self.entries);
        Ok(entries
            .iter()
            .find(|e| e.user_id == owner && e.entry_ref() == entry)
            .cloned())
    }

    fn delete_entry(&self, owner: UserId, entry: EntryRef) -> Result<()> {
        let mut entries = Self::write(&self.entries);
        let position = entries
            .iter()
            .position(|e| e.user_id == owner && e.entry_ref() == entry)
            .ok_or(CarnetError::EntryNotFound(entry))?;
        entries.remove(position);
        Ok(())
    }

    fn delete_entry_cascade(&self, owner: UserId, entry: EntryRef) -> Result<usize> {
        let mut entries = Self::write(&self.entries);
        let mut links = Self::write(&self.links);
        let position = entries
            .iter()
            .position(|e| e.user_id == owner && e.entry_ref() == entry)
            .ok_or(CarnetError::EntryNotFound(entry))?;
        entries.remove(position);

        let before = links.len();
        links.retain(|l| !(l.user_id == owner && l.touches_ref(entry)));
        Ok(before - links.len())
    }

    fn list_entries(&self, owner: UserId, filter: EntryFilter) -> Result<Vec<Entry>> {
        let entries = Self::read(&self.entries);
        let matching = entries
            .iter()
            .filter(|e| e.user_id == owner && filter.matches(e))
            .cloned()
            .collect();
        Ok(filter.finish(matching))
    }

    fn put_link(&self, link: &SpiritualLink) -> Result<()> {
        {
            let entries = Self::read(&self.entries);
            check_link_endpoints(link, |endpoint| {
                Ok(entries.iter().find(|e| e.entry_ref() == endpoint).cloned())
            })?;
        }

        let mut links = Self::write(&self.links);
        links.retain(|l| l.id != link.id);
        links.push(link.clone());
        Ok(())
    }

    fn get_link(&self, owner: UserId, id: LinkId) -> Result<Option<SpiritualLink>> {
        let links = Self::read(&self.links);
        Ok(links
            .iter()
            .find(|l| l.id == id && l.user_id == owner)
            .cloned())
    }

    fn delete_link(&self, owner: UserId, id: LinkId) -> Result<()> {
        let mut links = Self::write(&self.links);
        let position = links
            .iter()
            .position(|l| l.id == id && l.user_id == owner)
            .ok_or(CarnetError::LinkNotFound(id))?;
        links.remove(position);
        Ok(())
    }

    fn list_links(&self, owner: UserId) -> Result<Vec<SpiritualLink>> {
        let links = Self::read(&self.links);
        Ok(links.iter().filter(|l| l.user_id == owner).cloned().collect())
    }

    fn links_touching(&self, owner: UserId, entry: EntryRef) -> Result<Vec<SpiritualLink>> {
        let links = Self::read(&self.links);
        Ok(links
            .iter()
            .filter(|l| l.user_id == owner && l.touches_ref(entry))
            .cloned()
            .collect())
    }

    fn stats(&self) -> Result<StorageStats> {
        let entries = Self::read(&self.entries);
        let links = Self::read(&self.links);

        let mut by_variant = HashMap::new();
        for entry in entries.iter() {
            *by_variant.entry(entry.variant()).or_insert(0u64) += 1;
        }
        let users: HashSet<_> = entries.iter().map(|e| e.user_id).collect();

        Ok(StorageStats {
            entry_count: entries.len() as u64,
            link_count: links.len() as u64,
            user_count: users.len() as u64,
            entry_counts_by_variant: by_variant,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntryBody, Grace};
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn test_poisoned_lock_still_serves() {
        let storage = MemoryStorage::new();
        let user = Uuid::now_v7();
        let entry = Entry::new(
            user,
            EntryBody::Grace(Grace {
                date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
                text: "Un ami retrouvé".to_string(),
                location: None,
                tags: vec![],
            }),
        );

        std::thread::scope(|s| {
            let poisoner = s.spawn(|| {
                let _guard = storage.entries.write().unwrap();
                panic!("writer died holding the lock");
            });
            assert!(poisoner.join().is_err());
        });
        assert!(storage.entries.is_poisoned());

        storage.put_entry(&entry).unwrap();
        assert_eq!(storage.get_entry(user, entry.entry_ref()).unwrap(), Some(entry));
    }
}
