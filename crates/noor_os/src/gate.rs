#![forbid(unsafe_code)]

//! Name + PIN gate in front of a member's progress session.
//!
//! This is a convenience lock for a shared family device. PINs are stored as salted SHA-256
//! digests so the raw digits never sit in the store, but nothing here resists an attacker who
//! can read or write the store.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use noor_engines::roster::MemberDirectory;
use noor_kernel_contracts::member::{MemberId, MemberProfile};
use noor_kernel_contracts::ContractViolation;
use noor_storage::keys::{pin_key, ENROLLED_MEMBERS_KEY};
use noor_storage::{KeyValueStore, StoreError};

pub const PIN_MIN_LEN: usize = 4;
pub const PIN_MAX_LEN: usize = 8;

const CREDENTIAL_SCHEMA_VERSION: u8 = 1;
const ENROLLED_SCHEMA_VERSION: u8 = 1;
const SALT_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("unknown family member: {0}")]
    UnknownMember(String),
    #[error("PIN too short: use at least 4 digits")]
    PinTooShort,
    #[error("PIN too long: use at most 8 digits")]
    PinTooLong,
    #[error("PIN must contain digits only")]
    PinNotNumeric,
    #[error("PINs don't match")]
    PinMismatch,
    #[error("a PIN is already set for {0}")]
    PinAlreadySet(String),
    #[error("stored PIN credential is unreadable")]
    CorruptCredential,
    #[error("stored member enrollments are unreadable")]
    CorruptDirectory,
    #[error(transparent)]
    Contract(#[from] ContractViolation),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Granted(MemberProfile),
    /// First visit: the member must choose a PIN before anything else.
    PinSetupRequired(MemberProfile),
    Denied,
}

#[derive(Debug, Serialize, Deserialize)]
struct PinCredential {
    schema_version: u8,
    salt_b64: String,
    digest_b64: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct EnrolledDocument {
    schema_version: u8,
    members: Vec<EnrolledMember>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EnrolledMember {
    member_id: String,
    display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    avatar_ref: Option<String>,
}

pub struct MemberGate {
    directory: MemberDirectory,
    store: Arc<dyn KeyValueStore>,
}

impl MemberGate {
    pub fn new(directory: MemberDirectory, store: Arc<dyn KeyValueStore>) -> Self {
        Self { directory, store }
    }

    /// `seed` plus every member previously enrolled through this store.
    pub fn load(seed: MemberDirectory, store: Arc<dyn KeyValueStore>) -> Result<Self, GateError> {
        let doc = read_enrolled(store.as_ref())?;
        let mut members = seed.members().to_vec();
        for m in doc.members {
            let profile =
                MemberProfile::v1(MemberId::new(m.member_id)?, m.display_name, m.avatar_ref)?;
            if seed.get(&profile.member_id).is_none() {
                members.push(profile);
            }
        }
        Ok(Self::new(MemberDirectory::new(members), store))
    }

    /// Adds a member under a generated id and records them in the store.
    pub fn enroll(
        &mut self,
        display_name: &str,
        avatar_ref: Option<String>,
    ) -> Result<MemberProfile, GateError> {
        let mut directory = self.directory.clone();
        let profile = directory.enroll(display_name, avatar_ref)?;

        let mut doc = read_enrolled(self.store.as_ref())?;
        doc.members.push(EnrolledMember {
            member_id: profile.member_id.as_str().to_string(),
            display_name: profile.display_name.clone(),
            avatar_ref: profile.avatar_ref.clone(),
        });
        let serialized = serde_json::to_string(&doc).map_err(StoreError::from)?;
        self.store.set(ENROLLED_MEMBERS_KEY, &serialized)?;

        self.directory = directory;
        info!(member_id = %profile.member_id, "member enrolled");
        Ok(profile)
    }

    pub fn directory(&self) -> &MemberDirectory {
        &self.directory
    }

    pub fn has_pin(&self, member_id: &MemberId) -> Result<bool, GateError> {
        Ok(self.store.get(&pin_key(member_id))?.is_some())
    }

    pub fn authenticate(&self, member_id: &MemberId, pin: &str) -> Result<GateOutcome, GateError> {
        let profile = self.member(member_id)?;
        let Some(raw) = self.store.get(&pin_key(member_id))? else {
            return Ok(GateOutcome::PinSetupRequired(profile.clone()));
        };
        let credential: PinCredential =
            serde_json::from_str(&raw).map_err(|_| GateError::CorruptCredential)?;
        if credential.schema_version != CREDENTIAL_SCHEMA_VERSION {
            return Err(GateError::CorruptCredential);
        }
        let salt = BASE64
            .decode(credential.salt_b64.as_bytes())
            .map_err(|_| GateError::CorruptCredential)?;
        if digest(&salt, member_id, pin.trim()) == credential.digest_b64 {
            info!(member_id = %member_id, "member authenticated");
            Ok(GateOutcome::Granted(profile.clone()))
        } else {
            warn!(member_id = %member_id, "invalid PIN");
            Ok(GateOutcome::Denied)
        }
    }

    /// First-time PIN setup. On success the member counts as authenticated.
    pub fn set_pin(
        &self,
        member_id: &MemberId,
        pin: &str,
        confirm: &str,
    ) -> Result<MemberProfile, GateError> {
        let profile = self.member(member_id)?;
        let pin = pin.trim();
        check_pin_rules(pin)?;
        if pin != confirm.trim() {
            return Err(GateError::PinMismatch);
        }
        if self.has_pin(member_id)? {
            return Err(GateError::PinAlreadySet(profile.display_name.clone()));
        }

        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let credential = PinCredential {
            schema_version: CREDENTIAL_SCHEMA_VERSION,
            salt_b64: BASE64.encode(salt),
            digest_b64: digest(&salt, member_id, pin),
        };
        let serialized = serde_json::to_string(&credential).map_err(StoreError::from)?;
        self.store.set(&pin_key(member_id), &serialized)?;
        info!(member_id = %member_id, "PIN set");
        Ok(profile.clone())
    }

    fn member(&self, member_id: &MemberId) -> Result<&MemberProfile, GateError> {
        self.directory
            .get(member_id)
            .ok_or_else(|| GateError::UnknownMember(member_id.to_string()))
    }
}

fn read_enrolled(store: &dyn KeyValueStore) -> Result<EnrolledDocument, GateError> {
    let Some(raw) = store.get(ENROLLED_MEMBERS_KEY)? else {
        return Ok(EnrolledDocument {
            schema_version: ENROLLED_SCHEMA_VERSION,
            members: Vec::new(),
        });
    };
    let doc: EnrolledDocument =
        serde_json::from_str(&raw).map_err(|_| GateError::CorruptDirectory)?;
    if doc.schema_version != ENROLLED_SCHEMA_VERSION {
        return Err(GateError::CorruptDirectory);
    }
    Ok(doc)
}

fn check_pin_rules(pin: &str) -> Result<(), GateError> {
    if pin.len() < PIN_MIN_LEN {
        return Err(GateError::PinTooShort);
    }
    if pin.len() > PIN_MAX_LEN {
        return Err(GateError::PinTooLong);
    }
    if !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GateError::PinNotNumeric);
    }
    Ok(())
}

fn digest(salt: &[u8], member_id: &MemberId, pin: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(member_id.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(pin.as_bytes());
    BASE64.encode(hasher.finalize())
}
