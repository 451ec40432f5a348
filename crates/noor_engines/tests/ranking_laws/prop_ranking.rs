use std::cmp::Ordering;

use proptest::prelude::*;

use noor_engines::{compare_progress, merge, project};
use noor_kernel_contracts::member::MemberId;
use noor_kernel_contracts::progress::{PositionRecord, QuranPosition};
use noor_kernel_contracts::ranking::VisibleWindow;
use noor_kernel_contracts::UnixTimeMs;

// Small unit ranges so ties show up often.
fn position() -> impl Strategy<Value = (u8, u8, u32)> {
    (0u8..=3, 1u8..=3, 1u32..=3)
}

fn record(id: usize, (part, section, verse): (u8, u8, u32)) -> PositionRecord {
    PositionRecord::v1(
        MemberId::new(format!("m-{id}")).unwrap(),
        format!("Member {id}"),
        None,
        QuranPosition::new(part, section, verse).unwrap(),
        UnixTimeMs(1),
    )
    .unwrap()
}

fn roster() -> impl Strategy<Value = Vec<PositionRecord>> {
    prop::collection::vec(position(), 0..24).prop_map(|ps| {
        ps.into_iter()
            .enumerate()
            .map(|(i, p)| record(i, p))
            .collect()
    })
}

proptest! {
    #[test]
    fn comparator_is_transitive(a in position(), b in position(), c in position()) {
        let (a, b, c) = (record(0, a), record(1, b), record(2, c));
        if compare_progress(&a, &b) == Ordering::Less && compare_progress(&b, &c) == Ordering::Less {
            prop_assert_eq!(compare_progress(&a, &c), Ordering::Less);
        }
        prop_assert_eq!(compare_progress(&a, &b), compare_progress(&b, &a).reverse());
    }

    #[test]
    fn ranks_are_dense_and_one_based(records in roster()) {
        let n = records.len();
        let p = project(records, VisibleWindow::All);
        let ranks: Vec<u32> = p.entries().map(|e| e.rank).collect();
        let expected: Vec<u32> = (1..=n as u32).collect();
        prop_assert_eq!(ranks, expected);
    }

    #[test]
    fn projection_is_sorted_and_stable(records in roster()) {
        let input = records.clone();
        let entries: Vec<_> = project(records, VisibleWindow::All).entries().collect();
        for pair in entries.windows(2) {
            let ord = compare_progress(&pair[0].record, &pair[1].record);
            prop_assert_ne!(ord, Ordering::Greater);
            if ord == Ordering::Equal {
                let i = input.iter().position(|r| r == &pair[0].record).unwrap();
                let j = input.iter().position(|r| r == &pair[1].record).unwrap();
                prop_assert!(i < j);
            }
        }
    }

    #[test]
    fn merge_cardinality(records in roster(), pick in any::<prop::sample::Index>(), pos in position()) {
        prop_assert_eq!(merge(None, &records), records.clone());

        let outsider = record(10_000, pos);
        prop_assert_eq!(merge(Some(&outsider), &records).len(), records.len() + 1);

        if !records.is_empty() {
            let existing = &records[pick.index(records.len())];
            let mut replacement = record(0, pos);
            replacement.member_id = existing.member_id.clone();
            let merged = merge(Some(&replacement), &records);
            prop_assert_eq!(merged.len(), records.len());
            prop_assert_eq!(
                merged.iter().filter(|r| r.member_id == existing.member_id).count(),
                1
            );
            prop_assert!(merged.contains(&replacement));
        }
    }

    #[test]
    fn window_never_changes_order(records in roster(), k in 0usize..30) {
        let full: Vec<_> = project(records.clone(), VisibleWindow::All).entries().collect();
        let top: Vec<_> = project(records, VisibleWindow::Top(k)).entries().collect();
        prop_assert_eq!(top.len(), k.min(full.len()));
        prop_assert_eq!(&full[..top.len()], &top[..]);
    }
}
