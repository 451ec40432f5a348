#![forbid(unsafe_code)]

use noor_kernel_contracts::member::MemberId;

/// Snapshot of the local member's latest record, read by every leaderboard view.
pub const MY_ENTRY_KEY: &str = "leaderboard/my_entry";
pub const ONBOARDING_SEEN_KEY: &str = "onboarding/seen";
/// Members enrolled on this device, on top of the seed directory.
pub const ENROLLED_MEMBERS_KEY: &str = "directory/enrolled";

/// Member ids never contain '/', so these keys cannot collide.
pub fn progress_key(member_id: &MemberId) -> String {
    format!("progress/{}", member_id.as_str())
}

pub fn pin_key(member_id: &MemberId) -> String {
    format!("pin/{}", member_id.as_str())
}
