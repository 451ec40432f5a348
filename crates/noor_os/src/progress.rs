#![forbid(unsafe_code)]

use std::sync::Arc;

use noor_kernel_contracts::member::MemberProfile;
use noor_kernel_contracts::progress::{PositionRecord, QuranPosition};
use noor_kernel_contracts::{ContractViolation, UnixTimeMs};
use noor_storage::keys::{progress_key, MY_ENTRY_KEY};
use noor_storage::{decode_or_default, encode, KeyValueStore, StoreError};
use tracing::{info, warn};

use crate::notifier::{ChangeBus, PROGRESS_TOPIC};

#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("invalid progress: {0}")]
    Contract(#[from] ContractViolation),
    #[error("progress not saved: {0}")]
    Store(#[from] StoreError),
}

/// The signed-in member's single-writer handle on their own progress.
#[derive(Clone)]
pub struct ProgressSession {
    profile: MemberProfile,
    store: Arc<dyn KeyValueStore>,
    bus: ChangeBus,
}

impl ProgressSession {
    pub fn open(profile: MemberProfile, store: Arc<dyn KeyValueStore>, bus: ChangeBus) -> Self {
        Self {
            profile,
            store,
            bus,
        }
    }

    pub fn profile(&self) -> &MemberProfile {
        &self.profile
    }

    /// Latest stored record, or the starting record when nothing usable is stored.
    pub fn current(&self) -> PositionRecord {
        let key = progress_key(&self.profile.member_id);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return PositionRecord::starting_for(&self.profile),
            Err(err) => {
                warn!(member_id = %self.profile.member_id, error = %err, "progress read failed");
                return PositionRecord::starting_for(&self.profile);
            }
        };
        let record = decode_or_default(&raw, &self.profile);
        if record.member_id != self.profile.member_id {
            warn!(
                member_id = %self.profile.member_id,
                stored_member_id = %record.member_id,
                "stored progress belongs to another member; using starting position"
            );
            return PositionRecord::starting_for(&self.profile);
        }
        record
    }

    /// Persists `position` as this member's record and the device's "my entry" snapshot, then
    /// signals every live leaderboard.
    pub fn save(
        &self,
        position: QuranPosition,
        now: UnixTimeMs,
    ) -> Result<PositionRecord, ProgressError> {
        let record = PositionRecord::for_profile(&self.profile, position, now)?;
        let text = encode(&record);
        self.store.set(&progress_key(&self.profile.member_id), &text)?;
        self.store.set(MY_ENTRY_KEY, &text)?;
        info!(
            member_id = %record.member_id,
            part = position.part.get(),
            section = position.section.get(),
            verse = position.verse.get(),
            "progress saved"
        );
        self.bus.publish(PROGRESS_TOPIC);
        Ok(record)
    }

    /// Validating convenience over [`ProgressSession::save`] for raw unit numbers.
    pub fn save_units(
        &self,
        part: u8,
        section: u8,
        verse: u32,
        now: UnixTimeMs,
    ) -> Result<PositionRecord, ProgressError> {
        let position = QuranPosition::new(part, section, verse)?;
        self.save(position, now)
    }

    pub fn summary(&self) -> String {
        self.current().position.to_string()
    }
}
