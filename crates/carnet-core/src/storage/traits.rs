use crate::error::Result;
use crate::storage::filters::{EntryFilter, StorageStats};
use crate::types::{Entry, EntryRef, LinkId, SpiritualLink, UserId};

/// Storage trait for the journal. Every read is scoped to one owning user;
/// another user's rows are invisible, never an error.
pub trait Storage: Send + Sync {
    // === Entry Operations ===

    /// Store an entry (insert or update). Fails if the id is already held
    /// by another user or by another variant.
    fn put_entry(&self, entry: &Entry) -> Result<()>;

    /// Retrieve an entry by variant and id
    fn get_entry(&self, owner: UserId, entry: EntryRef) -> Result<Option<Entry>>;

    /// Hard delete an entry. Links pointing at it are left alone.
    fn delete_entry(&self, owner: UserId, entry: EntryRef) -> Result<()>;

    /// Hard delete an entry together with every link touching it, in one
    /// write. Returns the number of links removed.
    fn delete_entry_cascade(&self, owner: UserId, entry: EntryRef) -> Result<usize>;

    /// List the owner's entries matching the filter, newest first
    fn list_entries(&self, owner: UserId, filter: EntryFilter) -> Result<Vec<Entry>>;

    // === Link Operations ===

    /// Store a new link. Both endpoints must exist and belong to the link's
    /// owner. Duplicates are allowed.
    fn put_link(&self, link: &SpiritualLink) -> Result<()>;

    /// Retrieve a link by ID
    fn get_link(&self, owner: UserId, id: LinkId) -> Result<Option<SpiritualLink>>;

    /// Delete a link (hard delete)
    fn delete_link(&self, owner: UserId, id: LinkId) -> Result<()>;

    /// All of the owner's links, in creation order
    fn list_links(&self, owner: UserId) -> Result<Vec<SpiritualLink>>;

    /// Links with the entry on either end, in creation order
    fn links_touching(&self, owner: UserId, entry: EntryRef) -> Result<Vec<SpiritualLink>>;

    // === Maintenance ===

    /// Get database statistics
    fn stats(&self) -> Result<StorageStats>;
}
