use carnet_core::*;
use chrono::NaiveDate;
use std::sync::Arc;
use tempfile::tempdir;
use uuid::Uuid;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, d).unwrap()
}

fn open_journal(path: &std::path::Path, policy: DanglingPolicy) -> Journal {
    let storage = RedbStorage::open(path).unwrap();
    Journal::new(
        Arc::new(storage),
        JournalConfig {
            dangling_policy: policy,
        },
    )
}

fn scripture(reference: &str) -> EntryBody {
    EntryBody::Scripture(Scripture {
        date: date(3),
        reference: reference.to_string(),
        passage: "Venez à moi, vous tous qui peinez".to_string(),
        meditation: None,
        tags: vec![],
    })
}

fn word(content: &str) -> EntryBody {
    EntryBody::Word(Word {
        date: date(5),
        content: content.to_string(),
        recipient: Some("Marie".to_string()),
        location: Some("Vézelay".to_string()),
        tags: vec!["retraite".to_string()],
    })
}

fn prayer(subject: &str) -> EntryBody {
    EntryBody::Prayer(Prayer {
        date: date(1),
        subject: subject.to_string(),
        intention: "Trouver le repos".to_string(),
        answered: false,
        tags: vec![],
    })
}

// ── Journal on disk ──────────────────────────────────────────────────────────

#[test]
fn test_journal_survives_reopen() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("carnet.redb");
    let user = Uuid::now_v7();

    let (p, s) = {
        let journal = open_journal(&db_path, DanglingPolicy::Cascade);
        let p = journal.create_entry(user, prayer("Fatigue")).unwrap();
        let s = journal.create_entry(user, scripture("Mt 11,28")).unwrap();
        journal
            .create_link(user, s.entry_ref(), p.entry_ref(), LinkKind::Eclaire, "lu le soir même")
            .unwrap();
        (p, s)
    };

    let journal = open_journal(&db_path, DanglingPolicy::Cascade);
    let detail = journal.entry_detail(user, p.entry_ref(), ViewOrigin::List).unwrap();
    assert_eq!(detail.links.len(), 1);
    assert_eq!(detail.links[0].other.id, s.id);
    assert_eq!(detail.links[0].link.description, "lu le soir même");
    assert!(detail.links[0].label.contains("éclaire"));
    assert_eq!(detail.back, "/entries?variant=priere");
}

// ── Graph from a stored journal ──────────────────────────────────────────────

#[test]
fn test_graph_over_stored_journal() {
    let dir = tempdir().unwrap();
    let journal = open_journal(&dir.path().join("carnet.redb"), DanglingPolicy::Keep);
    let user = Uuid::now_v7();

    let p = journal.create_entry(user, prayer("Fatigue")).unwrap();
    let s = journal.create_entry(user, scripture("Mt 11,28")).unwrap();
    let w = journal.create_entry(user, word("Repose-toi")).unwrap();
    journal
        .create_link(user, s.entry_ref(), p.entry_ref(), LinkKind::Eclaire, "")
        .unwrap();
    journal
        .create_link(user, w.entry_ref(), p.entry_ref(), LinkKind::Accomplit, "")
        .unwrap();

    let snapshot = journal.load(user).unwrap();
    let mut view = snapshot.graph_view(Dimensions::measured(1000.0, 600.0));
    assert_eq!(view.scene().nodes.len(), 3);
    assert_eq!(view.scene().curves.len(), 2);
    assert_eq!(view.scene().radius, 600.0 * 0.35);

    let prayer_node = view.scene().node(p.entry_ref()).unwrap();
    assert_eq!(view.node_style(prayer_node).radius, 30.0);

    assert!(view.pointer_enter(w.entry_ref()));
    let tooltip = view.tooltip(&DefaultTypeConfig).unwrap();
    assert_eq!(tooltip.location.as_deref(), Some("Vézelay"));

    let svg = render_svg(&view, &DefaultTypeConfig);
    assert_eq!(svg.matches("<path class=\"link").count(), 2);
    assert_eq!(svg.matches("stroke-opacity=\"0.8\"").count(), 1);
    assert!(svg.contains("class=\"tooltip\""));

    // Deleting the prayer under the keep policy leaves both links stored
    // but drops their curves from the graph.
    journal.delete_entry(user, p.entry_ref()).unwrap();
    let view = journal.load(user).unwrap().graph_view(Dimensions::default());
    assert_eq!(view.scene().nodes.len(), 2);
    assert!(view.scene().curves.is_empty());
    assert_eq!(view.scene().skipped_links, 2);
    assert_eq!(journal.prune_dangling(user).unwrap(), 2);
}

// ── Users ────────────────────────────────────────────────────────────────────

#[test]
fn test_stats_across_users() {
    let dir = tempdir().unwrap();
    let journal = open_journal(&dir.path().join("carnet.redb"), DanglingPolicy::Cascade);
    let alice = Uuid::now_v7();
    let bob = Uuid::now_v7();

    journal.create_entry(alice, prayer("Pour Bob")).unwrap();
    journal.create_entry(bob, word("Merci")).unwrap();
    journal.create_entry(bob, scripture("Ps 23")).unwrap();

    let stats = journal.storage().stats().unwrap();
    assert_eq!(stats.entry_count, 3);
    assert_eq!(stats.user_count, 2);

    assert_eq!(journal.user_stats(alice).unwrap().entry_count, 1);
    assert_eq!(journal.user_stats(bob).unwrap().entry_count, 2);
    assert!(journal.load(alice).unwrap().summaries(Some(EntryVariant::Word)).is_empty());
}
