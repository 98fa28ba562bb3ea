use crate::*;
use chrono::NaiveDate;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

fn create_test_storage() -> (Arc<RedbStorage>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("journal_test.redb");
    let storage = Arc::new(RedbStorage::open(&db_path).unwrap());
    (storage, temp_dir)
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
}

fn grace_body(text: &str, d: u32) -> EntryBody {
    EntryBody::Grace(Grace {
        date: day(d),
        text: text.to_string(),
        location: None,
        tags: vec!["famille".to_string()],
    })
}

fn prayer_body(subject: &str, d: u32) -> EntryBody {
    EntryBody::Prayer(Prayer {
        date: day(d),
        subject: subject.to_string(),
        intention: "Que la paix revienne".to_string(),
        answered: false,
        tags: vec![],
    })
}

fn encounter_body(person: &str, d: u32) -> EntryBody {
    EntryBody::Encounter(Encounter {
        date: day(d),
        person: person.to_string(),
        content: "Discussion sur le parvis".to_string(),
        location: Some("Lyon".to_string()),
        tags: vec![],
    })
}

/// The same contract must hold for every store.
fn storage_contract(storage: &dyn Storage) {
    let alice = Uuid::now_v7();
    let bob = Uuid::now_v7();

    let g = Entry::new(alice, grace_body("Un coup de fil inespéré", 3));
    let p = Entry::new(alice, prayer_body("Pour Claire", 1));
    let other = Entry::new(bob, encounter_body("Jean", 2));
    storage.put_entry(&g).unwrap();
    storage.put_entry(&p).unwrap();
    storage.put_entry(&other).unwrap();

    // Row-level scoping
    assert_eq!(storage.list_entries(alice, EntryFilter::new()).unwrap().len(), 2);
    assert!(storage.get_entry(alice, other.entry_ref()).unwrap().is_none());
    assert!(storage.get_entry(bob, other.entry_ref()).unwrap().is_some());

    // Variant is part of the identity
    let wrong_variant = EntryRef::new(EntryVariant::Word, g.id);
    assert!(storage.get_entry(alice, wrong_variant).unwrap().is_none());

    // Newest entry date first
    let listed = storage.list_entries(alice, EntryFilter::new()).unwrap();
    assert_eq!(listed[0].id, g.id);
    assert_eq!(listed[1].id, p.id);
    let paged = storage
        .list_entries(alice, EntryFilter::new().with_offset(1).with_limit(1))
        .unwrap();
    assert_eq!(paged.iter().map(|e| e.id).collect::<Vec<_>>(), vec![p.id]);

    let prayers = storage
        .list_entries(alice, EntryFilter::new().with_variants(vec![EntryVariant::Prayer]))
        .unwrap();
    assert_eq!(prayers.len(), 1);
    let tagged = storage
        .list_entries(alice, EntryFilter::new().with_tags(vec!["famille".to_string()]))
        .unwrap();
    assert_eq!(tagged.len(), 1);
    let ranged = storage
        .list_entries(alice, EntryFilter::new().from_date(day(2)).to_date(day(5)))
        .unwrap();
    assert_eq!(ranged.len(), 1);
    assert_eq!(ranged[0].id, g.id);

    // Links: duplicates allowed, listed in creation order
    let first = SpiritualLink::new(alice, g.entry_ref(), p.entry_ref(), LinkKind::Exauce, "");
    let second = SpiritualLink::new(alice, g.entry_ref(), p.entry_ref(), LinkKind::Exauce, "");
    storage.put_link(&first).unwrap();
    storage.put_link(&second).unwrap();
    let links = storage.list_links(alice).unwrap();
    assert_eq!(links.iter().map(|l| l.id).collect::<Vec<_>>(), vec![first.id, second.id]);
    assert!(storage.list_links(bob).unwrap().is_empty());
    assert_eq!(storage.links_touching(alice, p.entry_ref()).unwrap().len(), 2);

    // Cross-user and missing endpoints are rejected
    let cross = SpiritualLink::new(alice, g.entry_ref(), other.entry_ref(), LinkKind::Echo, "");
    assert!(matches!(storage.put_link(&cross), Err(CarnetError::InvalidLink { .. })));
    let ghost = EntryRef::new(EntryVariant::Grace, Uuid::now_v7());
    let missing = SpiritualLink::new(alice, ghost, p.entry_ref(), LinkKind::Echo, "");
    assert!(matches!(storage.put_link(&missing), Err(CarnetError::InvalidLink { .. })));

    // Another user's id cannot be overwritten
    let mut stolen = other.clone();
    stolen.user_id = alice;
    assert!(matches!(storage.put_entry(&stolen), Err(CarnetError::Forbidden(_))));

    // Deleting an entry leaves its links in place
    storage.delete_entry(alice, p.entry_ref()).unwrap();
    assert!(storage.get_entry(alice, p.entry_ref()).unwrap().is_none());
    assert_eq!(storage.list_links(alice).unwrap().len(), 2);
    assert!(matches!(
        storage.delete_entry(alice, p.entry_ref()),
        Err(CarnetError::EntryNotFound(_))
    ));

    storage.delete_link(alice, first.id).unwrap();
    assert!(storage.get_link(alice, first.id).unwrap().is_none());
    assert!(matches!(storage.delete_link(bob, second.id), Err(CarnetError::LinkNotFound(_))));

    let stats = storage.stats().unwrap();
    assert_eq!(stats.entry_count, 2);
    assert_eq!(stats.link_count, 1);
    assert_eq!(stats.user_count, 2);
    assert_eq!(stats.entry_counts_by_variant.get(&EntryVariant::Grace), Some(&1));
}

fn cascade_contract(storage: &dyn Storage) {
    let alice = Uuid::now_v7();
    let bob = Uuid::now_v7();

    let g = Entry::new(alice, grace_body("Réconciliation", 5));
    let p = Entry::new(alice, prayer_body("Pour Marc", 2));
    let e = Entry::new(alice, encounter_body("Frère Luc", 3));
    let other = Entry::new(bob, encounter_body("Jean", 2));
    for entry in [&g, &p, &e, &other] {
        storage.put_entry(entry).unwrap();
    }
    let answered =
        SpiritualLink::new(alice, g.entry_ref(), p.entry_ref(), LinkKind::Exauce, "");
    let own = SpiritualLink::new(alice, p.entry_ref(), p.entry_ref(), LinkKind::Echo, "");
    let kept = SpiritualLink::new(alice, e.entry_ref(), g.entry_ref(), LinkKind::Eclaire, "");
    for link in [&answered, &own, &kept] {
        storage.put_link(link).unwrap();
    }

    // Another user's entry and a wrong variant are both not found, and nothing moves
    assert!(matches!(
        storage.delete_entry_cascade(bob, p.entry_ref()),
        Err(CarnetError::EntryNotFound(_))
    ));
    assert!(matches!(
        storage.delete_entry_cascade(alice, EntryRef::new(EntryVariant::Word, p.id)),
        Err(CarnetError::EntryNotFound(_))
    ));
    assert_eq!(storage.list_links(alice).unwrap().len(), 3);

    assert_eq!(storage.delete_entry_cascade(alice, p.entry_ref()).unwrap(), 2);
    assert!(storage.get_entry(alice, p.entry_ref()).unwrap().is_none());
    assert_eq!(storage.list_links(alice).unwrap(), vec![kept.clone()]);
    assert_eq!(storage.links_touching(alice, g.entry_ref()).unwrap(), vec![kept]);
    assert!(storage.get_link(alice, answered.id).unwrap().is_none());
    assert_eq!(storage.list_entries(alice, EntryFilter::new()).unwrap().len(), 2);
    assert!(storage.get_entry(bob, other.entry_ref()).unwrap().is_some());

    let stats = storage.stats().unwrap();
    assert_eq!((stats.entry_count, stats.link_count), (3, 1));
}

#[test]
fn test_redb_delete_entry_cascade() {
    let (storage, _temp) = create_test_storage();
    cascade_contract(storage.as_ref());
}

#[test]
fn test_memory_delete_entry_cascade() {
    cascade_contract(&MemoryStorage::new());
}

#[test]
fn test_redb_storage_contract() {
    let (storage, _temp) = create_test_storage();
    storage_contract(storage.as_ref());
}

#[test]
fn test_memory_storage_contract() {
    storage_contract(&MemoryStorage::new());
}

#[test]
fn test_redb_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("persist.redb");
    let user = Uuid::now_v7();

    let (entry, link) = {
        let storage = RedbStorage::open(&db_path).unwrap();
        let entry = Entry::new(user, grace_body("Persistance", 1));
        storage.put_entry(&entry).unwrap();
        let link =
            SpiritualLink::new(user, entry.entry_ref(), entry.entry_ref(), LinkKind::Echo, "soi");
        storage.put_link(&link).unwrap();
        (entry, link)
    };

    let storage = RedbStorage::open(&db_path).unwrap();
    let reloaded = storage.get_entry(user, entry.entry_ref()).unwrap().unwrap();
    assert_eq!(reloaded, entry);
    assert_eq!(storage.get_link(user, link.id).unwrap(), Some(link.clone()));
    // A self-link is indexed once
    assert_eq!(storage.links_touching(user, entry.entry_ref()).unwrap(), vec![link]);
}

#[test]
fn test_update_keeps_variant() {
    let (storage, _temp) = create_test_storage();
    let user = Uuid::now_v7();
    let entry = Entry::new(user, grace_body("Avant", 1));
    storage.put_entry(&entry).unwrap();

    let mut changed = entry.clone();
    changed.body = prayer_body("Après", 1);
    assert!(matches!(storage.put_entry(&changed), Err(CarnetError::Validation(_))));
}

fn journal(policy: DanglingPolicy) -> Journal {
    Journal::new(
        Arc::new(MemoryStorage::new()),
        JournalConfig {
            dangling_policy: policy,
        },
    )
}

#[test]
fn test_journal_keep_policy_leaves_dangling_links_invisible() {
    let journal = journal(DanglingPolicy::Keep);
    let user = Uuid::now_v7();
    let g = journal.create_entry(user, grace_body("Guérison", 4)).unwrap();
    let p = journal.create_entry(user, prayer_body("Pour Paul", 1)).unwrap();
    let e = journal.create_entry(user, encounter_body("Sœur Anne", 2)).unwrap();
    journal
        .create_link(user, g.entry_ref(), p.entry_ref(), LinkKind::Exauce, "")
        .unwrap();
    journal
        .create_link(user, e.entry_ref(), g.entry_ref(), LinkKind::Eclaire, "")
        .unwrap();

    assert_eq!(journal.delete_entry(user, p.entry_ref()).unwrap(), 0);
    assert_eq!(journal.list_links(user).unwrap().len(), 2);

    // The detail view and the graph quietly skip the dangling link
    let detail = journal.entry_detail(user, g.entry_ref(), ViewOrigin::Graph).unwrap();
    assert_eq!(detail.links.len(), 1);
    assert_eq!(detail.links[0].other.id, e.id);
    assert_eq!(detail.links[0].side, LinkSide::Target);
    assert_eq!(detail.back, "/graph/viz");

    let view = journal.load(user).unwrap().graph_view(Dimensions::default());
    assert_eq!(view.scene().curves.len(), 1);
    assert_eq!(view.scene().skipped_links, 1);

    assert_eq!(journal.prune_dangling(user).unwrap(), 1);
    assert_eq!(journal.list_links(user).unwrap().len(), 1);
}

#[test]
fn test_journal_cascade_policy_removes_links() {
    let journal = journal(DanglingPolicy::Cascade);
    let user = Uuid::now_v7();
    let g = journal.create_entry(user, grace_body("Guérison", 4)).unwrap();
    let p = journal.create_entry(user, prayer_body("Pour Paul", 1)).unwrap();
    journal
        .create_link(user, g.entry_ref(), p.entry_ref(), LinkKind::Exauce, "")
        .unwrap();
    journal
        .create_link(user, p.entry_ref(), p.entry_ref(), LinkKind::Echo, "")
        .unwrap();

    assert_eq!(journal.delete_entry(user, p.entry_ref()).unwrap(), 2);
    assert!(journal.list_links(user).unwrap().is_empty());
}

#[test]
fn test_journal_default_policy_keeps_links() {
    let journal = Journal::new(Arc::new(MemoryStorage::new()), JournalConfig::default());
    let user = Uuid::now_v7();
    let g = journal.create_entry(user, grace_body("Paix", 4)).unwrap();
    let p = journal.create_entry(user, prayer_body("Pour Hélène", 1)).unwrap();
    journal
        .create_link(user, g.entry_ref(), p.entry_ref(), LinkKind::Exauce, "")
        .unwrap();

    assert_eq!(journal.config().dangling_policy, DanglingPolicy::Keep);
    assert_eq!(journal.delete_entry(user, p.entry_ref()).unwrap(), 0);
    assert_eq!(journal.list_links(user).unwrap().len(), 1);
    assert!(journal.entry_detail(user, g.entry_ref(), ViewOrigin::List).unwrap().links.is_empty());
}

/// Store whose single-link deletes always fail.
struct LinkDeleteFails(MemoryStorage);

impl Storage for LinkDeleteFails {
    fn put_entry(&self, entry: &Entry) -> Result<()> {
        self.0.put_entry(entry)
    }
    fn get_entry(&self, owner: UserId, entry: EntryRef) -> Result<Option<Entry>> {
        self.0.get_entry(owner, entry)
    }
    fn delete_entry(&self, owner: UserId, entry: EntryRef) -> Result<()> {
        self.0.delete_entry(owner, entry)
    }
    fn delete_entry_cascade(&self, owner: UserId, entry: EntryRef) -> Result<usize> {
        self.0.delete_entry_cascade(owner, entry)
    }
    fn list_entries(&self, owner: UserId, filter: EntryFilter) -> Result<Vec<Entry>> {
        self.0.list_entries(owner, filter)
    }
    fn put_link(&self, link: &SpiritualLink) -> Result<()> {
        self.0.put_link(link)
    }
    fn get_link(&self, owner: UserId, id: LinkId) -> Result<Option<SpiritualLink>> {
        self.0.get_link(owner, id)
    }
    fn delete_link(&self, _owner: UserId, id: LinkId) -> Result<()> {
        Err(CarnetError::LinkNotFound(id))
    }
    fn list_links(&self, owner: UserId) -> Result<Vec<SpiritualLink>> {
        self.0.list_links(owner)
    }
    fn links_touching(&self, owner: UserId, entry: EntryRef) -> Result<Vec<SpiritualLink>> {
        self.0.links_touching(owner, entry)
    }
    fn stats(&self) -> Result<StorageStats> {
        self.0.stats()
    }
}

#[test]
fn test_journal_cascade_is_one_store_write() {
    let journal = Journal::new(
        Arc::new(LinkDeleteFails(MemoryStorage::new())),
        JournalConfig {
            dangling_policy: DanglingPolicy::Cascade,
        },
    );
    let user = Uuid::now_v7();
    let a = journal.create_entry(user, grace_body("A", 2)).unwrap();
    let b = journal.create_entry(user, prayer_body("B", 1)).unwrap();
    journal
        .create_link(user, a.entry_ref(), b.entry_ref(), LinkKind::Exauce, "")
        .unwrap();

    assert_eq!(journal.delete_entry(user, b.entry_ref()).unwrap(), 1);
    assert!(journal.storage().get_entry(user, b.entry_ref()).unwrap().is_none());
    assert!(journal.list_links(user).unwrap().is_empty());

    // A failed cascade leaves both the entry and its links in place
    let c = journal.create_entry(user, prayer_body("C", 3)).unwrap();
    journal
        .create_link(user, a.entry_ref(), c.entry_ref(), LinkKind::Echo, "")
        .unwrap();
    let missing = EntryRef::new(EntryVariant::Prayer, Uuid::now_v7());
    assert!(journal.delete_entry(user, missing).is_err());
    assert_eq!(journal.list_links(user).unwrap().len(), 1);
}

#[test]
fn test_journal_summaries_and_update() {
    let journal = journal(DanglingPolicy::Cascade);
    let user = Uuid::now_v7();
    let g = journal.create_entry(user, grace_body("Joie", 4)).unwrap();
    let p = journal.create_entry(user, prayer_body("Pour Léa", 1)).unwrap();
    journal
        .create_link(user, g.entry_ref(), p.entry_ref(), LinkKind::Accomplit, "")
        .unwrap();

    let snapshot = journal.load(user).unwrap();
    let prayers = snapshot.summaries(Some(EntryVariant::Prayer));
    assert_eq!(prayers.len(), 1);
    assert_eq!(prayers[0].links_count, 1);
    assert_eq!(prayers[0].short_text, "Pour Léa");

    let updated = journal
        .update_entry(user, p.entry_ref(), prayer_body("Pour Léa et Tom", 1))
        .unwrap();
    assert_eq!(updated.short_text(), "Pour Léa et Tom");
    assert_eq!(updated.created_at, p.created_at);

    let mismatch = journal.update_entry(user, p.entry_ref(), grace_body("x", 1));
    assert!(matches!(mismatch, Err(CarnetError::Validation(_))));

    let stats = journal.user_stats(user).unwrap();
    assert_eq!((stats.entry_count, stats.link_count), (2, 1));
}
