#![forbid(unsafe_code)]

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use noor_kernel_contracts::member::{MemberId, MemberProfile};
use noor_kernel_contracts::progress::{PositionRecord, QuranPosition};
use noor_kernel_contracts::UnixTimeMs;
use noor_storage::keys::{progress_key, MY_ENTRY_KEY};
use noor_storage::{
    decode, decode_or_default, encode, FileKvStore, InMemoryKvStore, KeyValueStore,
};

fn profile(id: &str, name: &str) -> MemberProfile {
    MemberProfile::v1(MemberId::new(id).unwrap(), name, None).unwrap()
}

fn record(p: &MemberProfile, part: u8, section: u8, verse: u32, at: u64) -> PositionRecord {
    PositionRecord::for_profile(
        p,
        QuranPosition::new(part, section, verse).unwrap(),
        UnixTimeMs(at),
    )
    .unwrap()
}

fn temp_file_store(name: &str) -> (PathBuf, FileKvStore) {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(1);
    let base = std::env::temp_dir().join(format!("noor-db-wiring-{name}-{suffix}"));
    let store = FileKvStore::at_path(base.join("store.json"));
    (base, store)
}

fn exercise_one_record_per_member(store: &dyn KeyValueStore) {
    let amna = profile("m-amna", "Amna");
    let first = record(&amna, 3, 2, 140, 10);
    let second = record(&amna, 2, 2, 10, 20);

    store.set(&progress_key(&amna.member_id), &encode(&first)).unwrap();
    store.set(&progress_key(&amna.member_id), &encode(&second)).unwrap();

    let raw = store.get(&progress_key(&amna.member_id)).unwrap().unwrap();
    assert_eq!(decode(&raw).unwrap(), second);
}

#[test]
fn at_progress_db_01_in_memory_latest_write_replaces_prior() {
    let store = InMemoryKvStore::new();
    exercise_one_record_per_member(&store);
    assert_eq!(store.len(), 1);
}

#[test]
fn at_progress_db_02_file_latest_write_replaces_prior() {
    let (base, store) = temp_file_store("replace");
    exercise_one_record_per_member(&store);
    fs::remove_dir_all(base).unwrap();
}

#[test]
fn at_progress_db_03_members_do_not_alias_on_shared_display_name() {
    let store = InMemoryKvStore::new();
    let a = profile("m-amna-1", "Amna");
    let b = profile("m-amna-2", "Amna");
    store.set(&progress_key(&a.member_id), &encode(&record(&a, 5, 6, 1, 1))).unwrap();
    store.set(&progress_key(&b.member_id), &encode(&record(&b, 9, 9, 9, 1))).unwrap();

    let ra = decode(&store.get(&progress_key(&a.member_id)).unwrap().unwrap()).unwrap();
    let rb = decode(&store.get(&progress_key(&b.member_id)).unwrap().unwrap()).unwrap();
    assert_eq!(ra.position.progress_key(), (5, 6, 1));
    assert_eq!(rb.position.progress_key(), (9, 9, 9));
}

#[test]
fn at_progress_db_04_garbled_snapshot_degrades_to_starting_record() {
    let (base, store) = temp_file_store("garbled");
    store.set(MY_ENTRY_KEY, "{\"part\": 12, \"section\":").unwrap();
    let amna = profile("m-amna", "Amna");
    let raw = store.get(MY_ENTRY_KEY).unwrap().unwrap();
    let r = decode_or_default(&raw, &amna);
    assert_eq!(r, PositionRecord::starting_for(&amna));
    fs::remove_dir_all(base).unwrap();
}
