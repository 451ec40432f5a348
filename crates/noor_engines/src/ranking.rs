#![forbid(unsafe_code)]

use std::cmp::Ordering;

use noor_kernel_contracts::progress::PositionRecord;

/// Descending order over `(part, section, verse)`, compared as a nested key.
///
/// `Less` means `a` ranks ahead of `b`. Full ties compare `Equal`; callers keep input order by
/// sorting stably.
pub fn compare_progress(a: &PositionRecord, b: &PositionRecord) -> Ordering {
    b.position.progress_key().cmp(&a.position.progress_key())
}

pub fn sort_by_progress(records: &mut [PositionRecord]) {
    // slice::sort_by is stable
    records.sort_by(compare_progress);
}
