#![forbid(unsafe_code)]

use crate::progress::PositionRecord;

/// Display styling bucket. Always derived from a rank, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankTier {
    Champion,
    Podium,
    Standard,
}

impl RankTier {
    pub fn for_rank(rank: u32) -> Self {
        match rank {
            1 => Self::Champion,
            2 | 3 => Self::Podium,
            _ => Self::Standard,
        }
    }
}

/// A record annotated with its 1-based rank in one projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankEntry {
    pub rank: u32,
    pub record: PositionRecord,
}

impl RankEntry {
    pub fn tier(&self) -> RankTier {
        RankTier::for_rank(self.rank)
    }

    pub fn is_champion(&self) -> bool {
        self.rank == 1
    }

    pub fn is_top_three(&self) -> bool {
        (1..=3).contains(&self.rank)
    }
}

/// How much of the ranked sequence a surface shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisibleWindow {
    Top(usize),
    #[default]
    All,
}

impl VisibleWindow {
    pub fn limit(self, total: usize) -> usize {
        match self {
            Self::Top(k) => k.min(total),
            Self::All => total,
        }
    }
}
