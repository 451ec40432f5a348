#![forbid(unsafe_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use noor_engines::roster::{MemberDirectory, StaticRoster};
use noor_kernel_contracts::member::MemberId;
use noor_kernel_contracts::ranking::{RankTier, VisibleWindow};
use noor_kernel_contracts::UnixTimeMs;
use noor_os::{
    ChangeBus, GateOutcome, LeaderboardPipeline, LeaderboardView, MemberGate, ProgressSession,
    PROGRESS_TOPIC,
};
use noor_storage::{FileKvStore, InMemoryKvStore, KeyValueStore};

fn roster() -> Arc<StaticRoster> {
    Arc::new(StaticRoster::seed().unwrap())
}

fn member(dir: &MemberDirectory, id: &str) -> noor_kernel_contracts::member::MemberProfile {
    dir.get(&MemberId::new(id).unwrap()).unwrap().clone()
}

fn ranked_ids(view: &LeaderboardView) -> Vec<(u32, String)> {
    view.projection()
        .entries()
        .map(|e| (e.rank, e.record.member_id.as_str().to_string()))
        .collect()
}

#[test]
fn at_sync_01_write_in_one_surface_reaches_every_live_view() {
    let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryKvStore::new());
    let bus = ChangeBus::new();
    let dir = MemberDirectory::seed().unwrap();
    let amna = member(&dir, "m-amna");

    let board = LeaderboardView::open(
        &bus,
        LeaderboardPipeline::new(store.clone(), roster()),
        VisibleWindow::All,
    );
    let top3 = LeaderboardView::open(
        &bus,
        LeaderboardPipeline::new(store.clone(), roster()).with_viewer(amna.clone()),
        VisibleWindow::Top(3),
    );
    assert_eq!(bus.subscriber_count(PROGRESS_TOPIC), 2);
    assert_eq!(board.projection().total(), 5);
    assert_eq!(ranked_ids(&board)[0], (1, "m-fatima".to_string()));

    let session = ProgressSession::open(amna.clone(), store.clone(), bus.clone());
    session.save_units(30, 114, 6, UnixTimeMs(100)).unwrap();

    for view in [&board, &top3] {
        assert_eq!(view.render_count(), 2);
        let p = view.projection();
        assert_eq!(p.total(), 6);
        let champion = p.champion().unwrap();
        assert_eq!(champion.record.member_id, amna.member_id);
        assert_eq!(champion.tier(), RankTier::Champion);
    }
    assert_eq!(top3.projection().visible_len(), 3);
}

#[test]
fn at_sync_02_lower_update_for_roster_member_replaces_old_value() {
    let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryKvStore::new());
    let bus = ChangeBus::new();
    let dir = MemberDirectory::seed().unwrap();
    let fatima = member(&dir, "m-fatima");
    let view = LeaderboardView::open(
        &bus,
        LeaderboardPipeline::new(store.clone(), roster()),
        VisibleWindow::All,
    );

    ProgressSession::open(fatima.clone(), store, bus)
        .save_units(19, 20, 1, UnixTimeMs(5))
        .unwrap();

    let p = view.projection();
    assert_eq!(p.total(), 5);
    let me = p.position_of(&fatima.member_id).unwrap();
    assert_eq!(me.rank, 4);
    assert_eq!(me.record.position.progress_key(), (19, 20, 1));
    assert_eq!(ranked_ids(&view)[0], (1, "m-ahmed".to_string()));
}

#[test]
fn at_sync_03_exact_tie_with_roster_member_keeps_input_order() {
    let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryKvStore::new());
    let bus = ChangeBus::new();
    let dir = MemberDirectory::seed().unwrap();
    let bilal = member(&dir, "m-bilal");
    let view = LeaderboardView::open(
        &bus,
        LeaderboardPipeline::new(store.clone(), roster()),
        VisibleWindow::All,
    );

    // Same position as the seeded Aisha entry; the local record is merged after the roster.
    ProgressSession::open(bilal, store, bus)
        .save_units(22, 33, 31, UnixTimeMs(5))
        .unwrap();

    let ids = ranked_ids(&view);
    assert_eq!(ids[2], (3, "m-aisha".to_string()));
    assert_eq!(ids[3], (4, "m-bilal".to_string()));
}

#[test]
fn at_sync_04_view_opened_after_write_reads_current_state() {
    let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryKvStore::new());
    let bus = ChangeBus::new();
    let dir = MemberDirectory::seed().unwrap();
    ProgressSession::open(member(&dir, "m-lareb"), store.clone(), bus.clone())
        .save_units(26, 46, 1, UnixTimeMs(5))
        .unwrap();

    let late = LeaderboardView::open(
        &bus,
        LeaderboardPipeline::new(store, roster()),
        VisibleWindow::All,
    );
    assert_eq!(late.render_count(), 1);
    assert_eq!(ranked_ids(&late)[0], (1, "m-fatima".to_string()));
    assert_eq!(ranked_ids(&late)[1], (2, "m-lareb".to_string()));
}

#[test]
fn at_sync_05_separate_store_handles_on_one_file_converge() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(1);
    let base: PathBuf = std::env::temp_dir().join(format!("noor-cross-view-{suffix}"));
    let path = base.join("store.json");
    let writer_store: Arc<dyn KeyValueStore> = Arc::new(FileKvStore::at_path(path.clone()));
    let reader_store: Arc<dyn KeyValueStore> = Arc::new(FileKvStore::at_path(path));
    let bus = ChangeBus::new();
    let dir = MemberDirectory::seed().unwrap();

    let gate = MemberGate::new(dir.clone(), writer_store.clone());
    let amna_id = MemberId::new("m-amna").unwrap();
    let amna = gate.set_pin(&amna_id, "2468", "2468").unwrap();
    assert!(matches!(
        gate.authenticate(&amna_id, "2468").unwrap(),
        GateOutcome::Granted(_)
    ));

    let reader = LeaderboardView::open(
        &bus,
        LeaderboardPipeline::new(reader_store, roster()),
        VisibleWindow::Top(5),
    );
    assert!(reader.projection().position_of(&amna_id).is_none());

    ProgressSession::open(amna, writer_store, bus)
        .save_units(21, 29, 46, UnixTimeMs(9))
        .unwrap();

    let p = reader.projection();
    assert_eq!(p.total(), 6);
    assert_eq!(p.position_of(&amna_id).unwrap().rank, 4);
    assert!(p.is_truncated());
    fs::remove_dir_all(base).unwrap();
}
