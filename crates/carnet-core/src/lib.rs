pub mod accessor;
pub mod error;
pub mod graph;
pub mod journal;
pub mod storage;
pub mod style;
pub mod types;

pub use accessor::{
    count_links_for_entry, dangling_links, link_counts, links_for_entry, resolve_links, EntryPool,
    LinkSide, LinkedEntry,
};
pub use error::{CarnetError, Result};
pub use graph::{render_svg, Dimensions, GraphEntry, GraphExport, GraphScene, GraphView, Viewport};
pub use journal::{
    DanglingPolicy, EntryDetail, EntrySummary, Journal, JournalConfig, JournalSnapshot, ViewOrigin,
};
pub use storage::{
    EntryFilter, MemoryStorage, RedbStorage, Storage, StorageStats, UserStats,
    CURRENT_SCHEMA_VERSION,
};
pub use style::{DefaultTypeConfig, TypeConfig, TypeConfigProvider};
pub use types::*;

#[cfg(test)]
mod tests;
