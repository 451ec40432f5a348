#![forbid(unsafe_code)]

pub mod leaderboard;
pub mod merge;
pub mod ranking;
pub mod roster;

pub use leaderboard::{project, LeaderboardProjection};
pub use merge::merge;
pub use ranking::{compare_progress, sort_by_progress};
