#![forbid(unsafe_code)]

use crate::member::{validate_avatar_ref, validate_display_name, MemberId, MemberProfile};
use crate::{ContractViolation, SchemaVersion, UnixTimeMs, Validate};

pub const PROGRESS_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

pub const PART_MIN: u8 = 0;
pub const PART_MAX: u8 = 30;
pub const SECTION_MIN: u8 = 1;
pub const SECTION_MAX: u8 = 114;
pub const VERSE_MIN: u32 = 1;

/// Juz-equivalent. `0` means no part completed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Part(u8);

impl Part {
    pub fn new(v: u8) -> Result<Self, ContractViolation> {
        if v > PART_MAX {
            return Err(ContractViolation::InvalidRange {
                field: "part",
                min: PART_MIN as i64,
                max: PART_MAX as i64,
                got: v as i64,
            });
        }
        Ok(Self(v))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Surah-equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Section(u8);

impl Section {
    pub fn new(v: u8) -> Result<Self, ContractViolation> {
        if !(SECTION_MIN..=SECTION_MAX).contains(&v) {
            return Err(ContractViolation::InvalidRange {
                field: "section",
                min: SECTION_MIN as i64,
                max: SECTION_MAX as i64,
                got: v as i64,
            });
        }
        Ok(Self(v))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Ayah-equivalent. Section lengths are reference data this crate does not carry, so only the
/// lower bound is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Verse(u32);

impl Verse {
    pub fn new(v: u32) -> Result<Self, ContractViolation> {
        if v < VERSE_MIN {
            return Err(ContractViolation::InvalidRange {
                field: "verse",
                min: VERSE_MIN as i64,
                max: u32::MAX as i64,
                got: v as i64,
            });
        }
        Ok(Self(v))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// A point in the memorization sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuranPosition {
    pub part: Part,
    pub section: Section,
    pub verse: Verse,
}

impl QuranPosition {
    pub fn new(part: u8, section: u8, verse: u32) -> Result<Self, ContractViolation> {
        Ok(Self {
            part: Part::new(part)?,
            section: Section::new(section)?,
            verse: Verse::new(verse)?,
        })
    }

    /// Where every member starts, and what garbled or missing progress degrades to.
    pub const fn starting() -> Self {
        Self {
            part: Part(PART_MIN),
            section: Section(SECTION_MIN),
            verse: Verse(VERSE_MIN),
        }
    }

    /// Nested `(part, section, verse)` key; larger means further along.
    pub fn progress_key(&self) -> (u8, u8, u32) {
        (self.part.get(), self.section.get(), self.verse.get())
    }
}

impl Default for QuranPosition {
    fn default() -> Self {
        Self::starting()
    }
}

impl std::fmt::Display for QuranPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Part {}, Section {}, Verse {}",
            self.part.get(),
            self.section.get(),
            self.verse.get()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionRecord {
    pub schema_version: SchemaVersion,
    pub member_id: MemberId,
    pub display_name: String,
    pub avatar_ref: Option<String>,
    pub position: QuranPosition,
    pub updated_at: UnixTimeMs,
}

impl PositionRecord {
    pub fn v1(
        member_id: MemberId,
        display_name: String,
        avatar_ref: Option<String>,
        position: QuranPosition,
        updated_at: UnixTimeMs,
    ) -> Result<Self, ContractViolation> {
        let r = Self {
            schema_version: PROGRESS_CONTRACT_VERSION,
            member_id,
            display_name,
            avatar_ref,
            position,
            updated_at,
        };
        r.validate()?;
        Ok(r)
    }

    pub fn for_profile(
        profile: &MemberProfile,
        position: QuranPosition,
        updated_at: UnixTimeMs,
    ) -> Result<Self, ContractViolation> {
        Self::v1(
            profile.member_id.clone(),
            profile.display_name.clone(),
            profile.avatar_ref.clone(),
            position,
            updated_at,
        )
    }

    /// Default record: `part=0, section=1, verse=1`, never written.
    pub fn starting_for(profile: &MemberProfile) -> Self {
        Self {
            schema_version: PROGRESS_CONTRACT_VERSION,
            member_id: profile.member_id.clone(),
            display_name: profile.display_name.clone(),
            avatar_ref: profile.avatar_ref.clone(),
            position: QuranPosition::starting(),
            updated_at: UnixTimeMs(0),
        }
    }
}

impl Validate for PositionRecord {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != PROGRESS_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "position_record.schema_version",
                reason: "must match PROGRESS_CONTRACT_VERSION",
            });
        }
        self.member_id.validate()?;
        validate_display_name("position_record.display_name", &self.display_name)?;
        validate_avatar_ref("position_record.avatar_ref", self.avatar_ref.as_deref())
    }
}
