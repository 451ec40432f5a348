#![forbid(unsafe_code)]

use crate::common::{validate_id, validate_text};
use crate::{ContractViolation, Validate};

pub const MEMBER_ID_MAX_LEN: usize = 64;
pub const DISPLAY_NAME_MAX_LEN: usize = 64;
pub const AVATAR_REF_MAX_LEN: usize = 512;

/// Stable member identity. Display names are not unique and never serve as ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Result<Self, ContractViolation> {
        let v = Self(id.into());
        v.validate()?;
        Ok(v)
    }

    /// Fresh random identifier for a newly enrolled member.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Validate for MemberId {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_id("member_id", &self.0, MEMBER_ID_MAX_LEN)
    }
}

/// Identity handed to the core by the authentication gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberProfile {
    pub member_id: MemberId,
    pub display_name: String,
    pub avatar_ref: Option<String>,
}

impl MemberProfile {
    pub fn v1(
        member_id: MemberId,
        display_name: impl Into<String>,
        avatar_ref: Option<String>,
    ) -> Result<Self, ContractViolation> {
        let p = Self {
            member_id,
            display_name: display_name.into(),
            avatar_ref,
        };
        p.validate()?;
        Ok(p)
    }

    /// Two-letter uppercase fallback shown when no avatar is available.
    pub fn initials(&self) -> String {
        self.display_name
            .chars()
            .filter(|c| !c.is_whitespace())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

impl Validate for MemberProfile {
    fn validate(&self) -> Result<(), ContractViolation> {
        self.member_id.validate()?;
        validate_display_name("member_profile.display_name", &self.display_name)?;
        validate_avatar_ref("member_profile.avatar_ref", self.avatar_ref.as_deref())
    }
}

pub(crate) fn validate_display_name(
    field: &'static str,
    name: &str,
) -> Result<(), ContractViolation> {
    validate_text(field, name, DISPLAY_NAME_MAX_LEN)
}

pub(crate) fn validate_avatar_ref(
    field: &'static str,
    avatar_ref: Option<&str>,
) -> Result<(), ContractViolation> {
    match avatar_ref {
        Some(r) => validate_text(field, r, AVATAR_REF_MAX_LEN),
        None => Ok(()),
    }
}
