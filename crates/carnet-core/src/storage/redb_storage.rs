use crate::error::{CarnetError, Result};
use crate::storage::filters::{EntryFilter, StorageStats};
use crate::storage::traits::Storage;
use crate::storage::{check_entry_overwrite, check_link_endpoints};
use crate::types::{Entry, EntryRef, LinkId, SpiritualLink, UserId};
use redb::{
    Database, MultimapTableDefinition, ReadOnlyTable, ReadableTable, ReadableTableMetadata,
    TableDefinition,
};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

// Table definitions
const ENTRIES: TableDefinition<&[u8; 16], &[u8]> = TableDefinition::new("entries");
const LINKS: TableDefinition<&[u8; 16], &[u8]> = TableDefinition::new("spiritual_links");

// Secondary indexes
const ENTRIES_BY_USER: MultimapTableDefinition<&[u8; 16], &[u8; 16]> =
    MultimapTableDefinition::new("entries_by_user");
const LINKS_BY_USER: MultimapTableDefinition<&[u8; 16], &[u8; 16]> =
    MultimapTableDefinition::new("links_by_user");
/// Entry id -> ids of links having it as source or target.
const LINKS_BY_ENTRY: MultimapTableDefinition<&[u8; 16], &[u8; 16]> =
    MultimapTableDefinition::new("links_by_entry");

// Metadata table
const META: TableDefinition<&str, &[u8]> = TableDefinition::new("meta");

/// Current schema version.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;
const SCHEMA_VERSION_KEY: &str = "schema_version";

/// Redb-based storage implementation
pub struct RedbStorage {
    db: Arc<Database>,
    path: PathBuf,
}

impl RedbStorage {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CarnetError::Validation(format!("Failed to create directory: {}", e))
            })?;
        }

        let is_new = !path.exists();
        let db = Database::create(&path)?;

        if !is_new {
            Self::check_schema_version(&db)?;
        }

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ENTRIES)?;
            let _ = write_txn.open_table(LINKS)?;
            let _ = write_txn.open_multimap_table(ENTRIES_BY_USER)?;
            let _ = write_txn.open_multimap_table(LINKS_BY_USER)?;
            let _ = write_txn.open_multimap_table(LINKS_BY_ENTRY)?;
            let mut meta = write_txn.open_table(META)?;
            if is_new {
                meta.insert(
                    SCHEMA_VERSION_KEY,
                    CURRENT_SCHEMA_VERSION.to_string().as_bytes(),
                )?;
            }
        }
        write_txn.commit()?;

        log::debug!("Opened journal database at {:?} (new: {})", path, is_new);

        Ok(Self {
            db: Arc::new(db),
            path,
        })
    }

    fn check_schema_version(db: &Database) -> Result<()> {
        let read_txn = db.begin_read()?;
        let version = {
            let table = read_txn.open_table(META).ok();
            table
                .and_then(|t| {
                    t.get(SCHEMA_VERSION_KEY).ok().flatten().and_then(|v| {
                        std::str::from_utf8(v.value())
                            .ok()
                            .and_then(|s| s.parse::<u32>().ok())
                    })
                })
                .unwrap_or(CURRENT_SCHEMA_VERSION)
        };

        match version.cmp(&CURRENT_SCHEMA_VERSION) {
            std::cmp::Ordering::Equal => Ok(()),
            std::cmp::Ordering::Less => Err(CarnetError::Validation(format!(
                "Database schema v{} is older than current v{}.",
                version, CURRENT_SCHEMA_VERSION
            ))),
            std::cmp::Ordering::Greater => Err(CarnetError::Validation(format!(
                "Database schema v{} is newer than this binary v{}. Upgrade Carnet.",
                version, CURRENT_SCHEMA_VERSION
            ))),
        }
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn uuid_to_bytes(id: &Uuid) -> [u8; 16] {
        *id.as_bytes()
    }

    fn bytes_to_uuid(bytes: &[u8; 16]) -> Uuid {
        Uuid::from_bytes(*bytes)
    }

    fn serialize_entry(entry: &Entry) -> Result<Vec<u8>> {
        bincode::serialize(entry).map_err(CarnetError::from)
    }

    fn deserialize_entry(bytes: &[u8]) -> Result<Entry> {
        bincode::deserialize(bytes).map_err(CarnetError::from)
    }

    fn serialize_link(link: &SpiritualLink) -> Result<Vec<u8>> {
        bincode::serialize(link).map_err(CarnetError::from)
    }

    fn deserialize_link(bytes: &[u8]) -> Result<SpiritualLink> {
        bincode::deserialize(bytes).map_err(CarnetError::from)
    }

    /// Load links by id from an index lookup, keeping only the owner's.
    fn load_links(
        links_table: &ReadOnlyTable<&'static [u8; 16], &'static [u8]>,
        ids: Vec<LinkId>,
        owner: UserId,
    ) -> Result<Vec<SpiritualLink>> {
        let mut links = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(bytes) = links_table.get(&Self::uuid_to_bytes(&id))? {
                let link = Self::deserialize_link(bytes.value())?;
                if link.user_id == owner {
                    links.push(link);
                }
            }
        }
        links.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(links)
    }
}

impl Storage for RedbStorage {
    fn put_entry(&self, entry: &Entry) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        let id_bytes = Self::uuid_to_bytes(&entry.id);

        let existing = {
            let table = write_txn.open_table(ENTRIES)?;
            let old_bytes = table.get(&id_bytes)?.map(|guard| guard.value().to_vec());
            old_bytes.map(|b| Self::deserialize_entry(&b)).transpose()?
        };
        check_entry_overwrite(entry, existing.as_ref())?;

        let bytes = Self::serialize_entry(entry)?;
        {
            let mut table = write_txn.open_table(ENTRIES)?;
            table.insert(&id_bytes, bytes.as_slice())?;
        }
        {
            let mut by_user = write_txn.open_multimap_table(ENTRIES_BY_USER)?;
            by_user.insert(&Self::uuid_to_bytes(&entry.user_id), &id_bytes)?;
        }

        write_txn.commit()?;
        Ok(())
    }

    fn get_entry(&self, owner: UserId, entry: EntryRef) -> Result<Option<Entry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENTRIES)?;

        match table.get(&Self::uuid_to_bytes(&entry.id))? {
            Some(bytes) => {
                let stored = Self::deserialize_entry(bytes.value())?;
                if stored.user_id == owner && stored.variant() == entry.variant {
                    Ok(Some(stored))
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }

    fn delete_entry(&self, owner: UserId, entry: EntryRef) -> Result<()> {
        self.get_entry(owner, entry)?
            .ok_or(CarnetError::EntryNotFound(entry))?;

        let write_txn = self.db.begin_write()?;
        let id_bytes = Self::uuid_to_bytes(&entry.id);
        {
            let mut table = write_txn.open_table(ENTRIES)?;
            table.remove(&id_bytes)?;
        }
        {
            let mut by_user = write_txn.open_multimap_table(ENTRIES_BY_USER)?;
            by_user.remove(&Self::uuid_to_bytes(&owner), &id_bytes)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn delete_entry_cascade(&self, owner: UserId, entry: EntryRef) -> Result<usize> {
        let write_txn = self.db.begin_write()?;
        let id_bytes = Self::uuid_to_bytes(&entry.id);
        let owner_bytes = Self::uuid_to_bytes(&owner);

        {
            let mut table = write_txn.open_table(ENTRIES)?;
            table
                .get(&id_bytes)?
                .map(|guard| guard.value().to_vec())
                .map(|b| Self::deserialize_entry(&b))
                .transpose()?
                .filter(|e| e.user_id == owner && e.variant() == entry.variant)
                .ok_or(CarnetError::EntryNotFound(entry))?;
            table.remove(&id_bytes)?;
        }
        {
            let mut by_user = write_txn.open_multimap_table(ENTRIES_BY_USER)?;
            by_user.remove(&owner_bytes, &id_bytes)?;
        }

        let mut by_entry = write_txn.open_multimap_table(LINKS_BY_ENTRY)?;
        let link_ids: Vec<LinkId> = by_entry
            .remove_all(&id_bytes)?
            .map(|result| result.map(|guard| Self::bytes_to_uuid(guard.value())))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut links = write_txn.open_table(LINKS)?;
        let mut by_user = write_txn.open_multimap_table(LINKS_BY_USER)?;
        let mut removed = 0;
        for id in link_ids {
            let link_bytes = Self::uuid_to_bytes(&id);
            let link = links
                .get(&link_bytes)?
                .map(|guard| guard.value().to_vec())
                .map(|b| Self::deserialize_link(&b))
                .transpose()?;
            let Some(link) = link else { continue };
            if link.user_id != owner || !link.touches_ref(entry) {
                by_entry.insert(&id_bytes, &link_bytes)?;
                continue;
            }
            by_entry.remove(&Self::uuid_to_bytes(&link.source_id), &link_bytes)?;
            by_entry.remove(&Self::uuid_to_bytes(&link.target_id), &link_bytes)?;
            by_user.remove(&owner_bytes, &link_bytes)?;
            links.remove(&link_bytes)?;
            removed += 1;
        }
        drop(by_user);
        drop(links);
        drop(by_entry);

        write_txn.commit()?;
        Ok(removed)
    }

    fn list_entries(&self, owner: UserId, filter: EntryFilter) -> Result<Vec<Entry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENTRIES)?;
        let by_user = read_txn.open_multimap_table(ENTRIES_BY_USER)?;

        let ids: Vec<Uuid> = by_user
            .get(&Self::uuid_to_bytes(&owner))?
            .map(|result| result.map(|guard| Self::bytes_to_uuid(guard.value())))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut entries = Vec::new();
        for id in ids {
            if let Some(bytes) = table.get(&Self::uuid_to_bytes(&id))? {
                let entry = Self::deserialize_entry(bytes.value())?;
                if entry.user_id == owner && filter.matches(&entry) {
                    entries.push(entry);
                }
            }
        }

        Ok(filter.finish(entries))
    }

    fn put_link(&self, link: &SpiritualLink) -> Result<()> {
        let write_txn = self.db.begin_write()?;

        // Endpoint checks and the write share one transaction
        {
            let entries = write_txn.open_table(ENTRIES)?;
            check_link_endpoints(link, |endpoint| {
                let bytes = entries
                    .get(&Self::uuid_to_bytes(&endpoint.id))?
                    .map(|guard| guard.value().to_vec());
                let entry = bytes.map(|b| Self::deserialize_entry(&b)).transpose()?;
                Ok(entry.filter(|e| e.variant() == endpoint.variant))
            })?;
        }

        let link_bytes = Self::uuid_to_bytes(&link.id);
        let bytes = Self::serialize_link(link)?;
        {
            let mut links = write_txn.open_table(LINKS)?;
            links.insert(&link_bytes, bytes.as_slice())?;
        }
        {
            let mut by_user = write_txn.open_multimap_table(LINKS_BY_USER)?;
            by_user.insert(&Self::uuid_to_bytes(&link.user_id), &link_bytes)?;
        }
        {
            let mut by_entry = write_txn.open_multimap_table(LINKS_BY_ENTRY)?;
            by_entry.insert(&Self::uuid_to_bytes(&link.source_id), &link_bytes)?;
            by_entry.insert(&Self::uuid_to_bytes(&link.target_id), &link_bytes)?;
        }

        write_txn.commit()?;
        Ok(())
    }

    fn get_link(&self, owner: UserId, id: LinkId) -> Result<Option<SpiritualLink>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LINKS)?;

        match table.get(&Self::uuid_to_bytes(&id))? {
            Some(bytes) => {
                let link = Self::deserialize_link(bytes.value())?;
                Ok((link.user_id == owner).then_some(link))
            }
            None => Ok(None),
        }
    }

    fn delete_link(&self, owner: UserId, id: LinkId) -> Result<()> {
        let link = self
            .get_link(owner, id)?
            .ok_or(CarnetError::LinkNotFound(id))?;

        let write_txn = self.db.begin_write()?;
        let link_bytes = Self::uuid_to_bytes(&id);
        {
            let mut by_entry = write_txn.open_multimap_table(LINKS_BY_ENTRY)?;
            by_entry.remove(&Self::uuid_to_bytes(&link.source_id), &link_bytes)?;
            by_entry.remove(&Self::uuid_to_bytes(&link.target_id), &link_bytes)?;
        }
        {
            let mut by_user = write_txn.open_multimap_table(LINKS_BY_USER)?;
            by_user.remove(&Self::uuid_to_bytes(&owner), &link_bytes)?;
        }
        {
            let mut links = write_txn.open_table(LINKS)?;
            links.remove(&link_bytes)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn list_links(&self, owner: UserId) -> Result<Vec<SpiritualLink>> {
        let read_txn = self.db.begin_read()?;
        let links = read_txn.open_table(LINKS)?;
        let by_user = read_txn.open_multimap_table(LINKS_BY_USER)?;

        let ids: Vec<LinkId> = by_user
            .get(&Self::uuid_to_bytes(&owner))?
            .map(|result| result.map(|guard| Self::bytes_to_uuid(guard.value())))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Self::load_links(&links, ids, owner)
    }

    fn links_touching(&self, owner: UserId, entry: EntryRef) -> Result<Vec<SpiritualLink>> {
        let read_txn = self.db.begin_read()?;
        let links = read_txn.open_table(LINKS)?;
        let by_entry = read_txn.open_multimap_table(LINKS_BY_ENTRY)?;

        let ids: Vec<LinkId> = by_entry
            .get(&Self::uuid_to_bytes(&entry.id))?
            .map(|result| result.map(|guard| Self::bytes_to_uuid(guard.value())))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut touching = Self::load_links(&links, ids, owner)?;
        touching.retain(|l| l.touches_ref(entry));
        Ok(touching)
    }

    fn stats(&self) -> Result<StorageStats> {
        let read_txn = self.db.begin_read()?;
        let entries = read_txn.open_table(ENTRIES)?;
        let links = read_txn.open_table(LINKS)?;

        let mut by_variant = HashMap::new();
        let mut users = HashSet::new();
        for item in entries.iter()? {
            let (_, value) = item?;
            let entry = Self::deserialize_entry(value.value())?;
            *by_variant.entry(entry.variant()).or_insert(0u64) += 1;
            users.insert(entry.user_id);
        }

        Ok(StorageStats {
            entry_count: entries.len()?,
            link_count: links.len()?,
            user_count: users.len() as u64,
            entry_counts_by_variant: by_variant,
        })
    }
}
