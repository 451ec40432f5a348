#![forbid(unsafe_code)]

use noor_kernel_contracts::member::MemberId;
use noor_kernel_contracts::progress::PositionRecord;
use noor_kernel_contracts::ranking::{RankEntry, VisibleWindow};

use crate::ranking::sort_by_progress;

/// Sorted, ranked view over one merged candidate set.
///
/// Holds no cursor: every call to [`LeaderboardProjection::entries`] walks the sorted records
/// from the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardProjection {
    sorted: Vec<PositionRecord>,
    window: VisibleWindow,
}

pub fn project(mut merged: Vec<PositionRecord>, window: VisibleWindow) -> LeaderboardProjection {
    sort_by_progress(&mut merged);
    LeaderboardProjection {
        sorted: merged,
        window,
    }
}

impl LeaderboardProjection {
    /// Visible entries with dense 1-based ranks.
    pub fn entries(&self) -> impl Iterator<Item = RankEntry> + '_ {
        self.sorted
            .iter()
            .take(self.window.limit(self.sorted.len()))
            .enumerate()
            .map(|(i, record)| rank_entry(i, record))
    }

    pub fn window(&self) -> VisibleWindow {
        self.window
    }

    /// Same order, different window.
    pub fn with_window(self, window: VisibleWindow) -> Self {
        Self { window, ..self }
    }

    pub fn total(&self) -> usize {
        self.sorted.len()
    }

    pub fn visible_len(&self) -> usize {
        self.window.limit(self.sorted.len())
    }

    pub fn is_truncated(&self) -> bool {
        self.visible_len() < self.total()
    }

    pub fn champion(&self) -> Option<RankEntry> {
        self.sorted.first().map(|r| rank_entry(0, r))
    }

    /// Rank of `member_id` over the full ordering, whether or not the window shows it.
    pub fn position_of(&self, member_id: &MemberId) -> Option<RankEntry> {
        self.sorted
            .iter()
            .position(|r| &r.member_id == member_id)
            .map(|i| rank_entry(i, &self.sorted[i]))
    }
}

fn rank_entry(index: usize, record: &PositionRecord) -> RankEntry {
    RankEntry {
        rank: u32::try_from(index + 1).unwrap_or(u32::MAX),
        record: record.clone(),
    }
}
