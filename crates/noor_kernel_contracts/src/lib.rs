#![forbid(unsafe_code)]

pub mod common;
pub mod member;
pub mod progress;
pub mod ranking;

pub use common::{ContractViolation, SchemaVersion, UnixTimeMs, Validate};
