mod filters;
mod memory;
mod redb_storage;
mod traits;

pub use filters::{EntryFilter, StorageStats, UserStats};
pub use memory::MemoryStorage;
pub use redb_storage::{RedbStorage, CURRENT_SCHEMA_VERSION};
pub use traits::Storage;

use crate::error::{CarnetError, Result};
use crate::types::{Entry, EntryRef, SpiritualLink};

/// Check a link against its endpoints before it is written. `lookup`
/// returns the stored entry for an id regardless of owner.
pub(crate) fn check_link_endpoints<F>(link: &SpiritualLink, mut lookup: F) -> Result<()>
where
    F: FnMut(EntryRef) -> Result<Option<Entry>>,
{
    link.validate().map_err(CarnetError::Validation)?;

    for (side, endpoint) in [("Source", link.source()), ("Target", link.target())] {
        let entry = lookup(endpoint)?.ok_or_else(|| CarnetError::InvalidLink {
            reason: format!("{} entry {} does not exist", side, endpoint),
        })?;
        if entry.user_id != link.user_id {
            return Err(CarnetError::InvalidLink {
                reason: format!("{} entry {} belongs to another user", side, endpoint),
            });
        }
    }

    Ok(())
}

/// Check that writing `entry` would not steal an id owned by another user
/// or change an existing entry's variant.
pub(crate) fn check_entry_overwrite(entry: &Entry, existing: Option<&Entry>) -> Result<()> {
    entry.validate().map_err(CarnetError::Validation)?;

    if let Some(old) = existing {
        if old.user_id != entry.user_id {
            return Err(CarnetError::Forbidden(old.entry_ref()));
        }
        if old.variant() != entry.variant() {
            return Err(CarnetError::Validation(format!(
                "Entry {} cannot change variant to {}",
                old.entry_ref(),
                entry.variant()
            )));
        }
    }
    Ok(())
}
