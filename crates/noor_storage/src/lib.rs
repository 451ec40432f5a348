#![forbid(unsafe_code)]

pub mod codec;
pub mod file_store;
pub mod keys;
pub mod kv;

pub use codec::{decode, decode_or_default, encode, DecodeError};
pub use file_store::FileKvStore;
pub use kv::{InMemoryKvStore, KeyValueStore, StoreError};
