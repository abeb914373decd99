//! # SOS Store
//!
//! Persistence for the saved SOS number.
//!
//! - [`NumberStore`] caches the saved number and validates before writing
//! - [`FileKeyValueStore`] is a JSON-file [`KeyValueStore`](sos_core::KeyValueStore)
//! - [`MemoryKeyValueStore`] is an in-process store with a failure switch

pub mod file;
pub mod memory;
pub mod number;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;
pub use number::NumberStore;
