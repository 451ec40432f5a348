#![forbid(unsafe_code)]

//! Text codec for [`PositionRecord`] values held in the key-value store.
//!
//! Encoding is JSON. Decoding separates two failure classes: text that is not a record at all
//! (`Malformed`) and a well-formed record whose position lies outside the text's numbering
//! (`OutOfRange`). Callers that render progress use [`decode_or_default`], which degrades both to
//! the starting record.

use serde::{Deserialize, Serialize};

use noor_kernel_contracts::member::{MemberId, MemberProfile};
use noor_kernel_contracts::progress::{
    PositionRecord, QuranPosition, PART_MAX, PART_MIN, PROGRESS_CONTRACT_VERSION, SECTION_MAX,
    SECTION_MIN, VERSE_MIN,
};
use noor_kernel_contracts::{ContractViolation, UnixTimeMs};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed position record: {0}")]
    Malformed(String),
    #[error("position record {field} = {got} outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        got: i64,
    },
}

impl From<ContractViolation> for DecodeError {
    fn from(v: ContractViolation) -> Self {
        match v {
            ContractViolation::InvalidRange {
                field,
                min,
                max,
                got,
            } => DecodeError::OutOfRange {
                field,
                min,
                max,
                got,
            },
            other => DecodeError::Malformed(other.to_string()),
        }
    }
}

// Units are signed on the wire so a negative value reports as out of range rather than as a
// type error.
#[derive(Debug, Serialize, Deserialize)]
struct PositionRecordWire {
    schema_version: u32,
    member_id: String,
    display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    avatar_ref: Option<String>,
    part: i64,
    section: i64,
    verse: i64,
    updated_at: u64,
}

pub fn encode(record: &PositionRecord) -> String {
    let wire = PositionRecordWire {
        schema_version: record.schema_version.0,
        member_id: record.member_id.as_str().to_string(),
        display_name: record.display_name.clone(),
        avatar_ref: record.avatar_ref.clone(),
        part: record.position.part.get() as i64,
        section: record.position.section.get() as i64,
        verse: record.position.verse.get() as i64,
        updated_at: record.updated_at.0,
    };
    // A struct of strings and integers always serializes.
    serde_json::to_string(&wire).unwrap_or_default()
}

pub fn decode(text: &str) -> Result<PositionRecord, DecodeError> {
    let wire: PositionRecordWire =
        serde_json::from_str(text).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    if wire.schema_version != PROGRESS_CONTRACT_VERSION.0 {
        return Err(DecodeError::Malformed(format!(
            "schema_version {} is not supported",
            wire.schema_version
        )));
    }
    let part = check_range("part", wire.part, PART_MIN as i64, PART_MAX as i64)?;
    let section = check_range("section", wire.section, SECTION_MIN as i64, SECTION_MAX as i64)?;
    let verse = check_range("verse", wire.verse, VERSE_MIN as i64, u32::MAX as i64)?;
    let position = QuranPosition::new(part as u8, section as u8, verse as u32)?;
    let record = PositionRecord::v1(
        MemberId::new(wire.member_id)?,
        wire.display_name,
        wire.avatar_ref,
        position,
        UnixTimeMs(wire.updated_at),
    )?;
    Ok(record)
}

/// Decodes `text`, substituting the starting record for `profile` on any failure.
pub fn decode_or_default(text: &str, profile: &MemberProfile) -> PositionRecord {
    match decode(text) {
        Ok(record) => record,
        Err(err) => {
            tracing::warn!(
                member_id = %profile.member_id,
                error = %err,
                "stored progress unreadable; using starting position"
            );
            PositionRecord::starting_for(profile)
        }
    }
}

fn check_range(field: &'static str, got: i64, min: i64, max: i64) -> Result<i64, DecodeError> {
    if got < min || got > max {
        return Err(DecodeError::OutOfRange {
            field,
            min,
            max,
            got,
        });
    }
    Ok(got)
}
