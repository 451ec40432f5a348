#![forbid(unsafe_code)]

use noor_kernel_contracts::member::{MemberId, MemberProfile};
use noor_kernel_contracts::progress::{PositionRecord, QuranPosition};
use noor_kernel_contracts::{ContractViolation, UnixTimeMs};

/// Baseline records of other members. Implementations never hand out records for mutation.
pub trait RosterSource: Send + Sync {
    fn roster(&self) -> Vec<PositionRecord>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticRoster {
    records: Vec<PositionRecord>,
}

impl StaticRoster {
    pub fn new(records: Vec<PositionRecord>) -> Self {
        Self { records }
    }

    /// Fixed family seed standing in for a shared backend.
    pub fn seed() -> Result<Self, ContractViolation> {
        // (id, name, part, section, verse): each at the opening of its part
        const SEED: &[(&str, &str, u8, u8, u32)] = &[
            ("m-fatima", "Fatima", 28, 58, 1),
            ("m-ahmed", "Ahmed", 25, 41, 47),
            ("m-aisha", "Aisha", 22, 33, 31),
            ("m-omar", "Omar", 20, 27, 56),
            ("m-khadija", "Khadija", 18, 23, 1),
        ];
        let records = SEED
            .iter()
            .map(|&(id, name, part, section, verse)| {
                PositionRecord::v1(
                    MemberId::new(id)?,
                    name.to_string(),
                    None,
                    QuranPosition::new(part, section, verse)?,
                    UnixTimeMs(0),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }
}

impl RosterSource for StaticRoster {
    fn roster(&self) -> Vec<PositionRecord> {
        self.records.clone()
    }
}

/// Members who may pass the PIN gate.
#[derive(Debug, Clone, Default)]
pub struct MemberDirectory {
    members: Vec<MemberProfile>,
}

impl MemberDirectory {
    pub fn new(members: Vec<MemberProfile>) -> Self {
        Self { members }
    }

    /// Seed roster members plus family members who have not recorded progress yet.
    pub fn seed() -> Result<Self, ContractViolation> {
        const SEED: &[(&str, &str)] = &[
            ("m-fatima", "Fatima"),
            ("m-ahmed", "Ahmed"),
            ("m-aisha", "Aisha"),
            ("m-omar", "Omar"),
            ("m-khadija", "Khadija"),
            ("m-amna", "Amna"),
            ("m-bilal", "Bilal"),
            ("m-lareb", "Lareb"),
        ];
        let members = SEED
            .iter()
            .map(|&(id, name)| MemberProfile::v1(MemberId::new(id)?, name, None))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { members })
    }

    pub fn members(&self) -> &[MemberProfile] {
        &self.members
    }

    pub fn get(&self, member_id: &MemberId) -> Option<&MemberProfile> {
        self.members.iter().find(|m| &m.member_id == member_id)
    }

    /// Exact id first, then a display name that matches exactly one member
    /// (ASCII case-insensitive).
    pub fn resolve(&self, query: &str) -> Option<&MemberProfile> {
        let query = query.trim();
        if let Some(m) = self.members.iter().find(|m| m.member_id.as_str() == query) {
            return Some(m);
        }
        let mut by_name = self
            .members
            .iter()
            .filter(|m| m.display_name.eq_ignore_ascii_case(query));
        match (by_name.next(), by_name.next()) {
            (Some(m), None) => Some(m),
            _ => None,
        }
    }

    /// Adds a member under a freshly generated id. Names may repeat.
    pub fn enroll(
        &mut self,
        display_name: &str,
        avatar_ref: Option<String>,
    ) -> Result<MemberProfile, ContractViolation> {
        let profile = MemberProfile::v1(MemberId::generate(), display_name.trim(), avatar_ref)?;
        self.members.push(profile.clone());
        Ok(profile)
    }
}
