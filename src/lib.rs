//! raid6 - generalized RAID-6 style erasure-coded object store
//!
//! A flat directory of `d+c` shard files plus a JSON catalog stands in
//! for a RAID-6 array: every stored file is split into `d` equal-length
//! data chunks, `c` parity chunks are computed from them over `GF(2^8)`,
//! and all `d+c` chunks are appended to their respective shard files.
//! Any `c` of the `d+c` shards can be lost and the original file is
//! still recoverable.
//!
//! # Modules
//!
//! - [`ec`] - field arithmetic, matrices, encoding, catalog, and the
//!   `store` / `read` / `recover` operations
//! - [`error`] - the crate's error type

pub mod ec;
pub mod error;

pub use ec::{Catalog, FileDescriptor, Matrix, Store};
pub use error::{Error, Result};
