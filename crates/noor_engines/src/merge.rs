#![forbid(unsafe_code)]

use noor_kernel_contracts::progress::PositionRecord;

/// Folds the local member's record into the roster.
///
/// Any roster entry with the same `member_id` is dropped and `local` is appended, so the result
/// holds exactly one record per identity from the local side. Order is not meaningful.
pub fn merge(local: Option<&PositionRecord>, roster: &[PositionRecord]) -> Vec<PositionRecord> {
    let Some(local) = local else {
        return roster.to_vec();
    };
    let mut out: Vec<PositionRecord> = roster
        .iter()
        .filter(|r| r.member_id != local.member_id)
        .cloned()
        .collect();
    out.push(local.clone());
    out
}
