//! Erasure coding engine
//!
//! ```text
//! gf        GF(2^8) field arithmetic (log/exp tables)
//!   |
//! matrix    dense byte matrices, built on gf
//!   |
//! encoding  systematic (d+c) x d checksum matrix construction
//!   |
//! catalog   persisted file-to-shard-slice index
//!   |
//! store     store / read / recover, composing all of the above
//! ```

pub mod catalog;
pub mod encoding;
pub mod gf;
pub mod matrix;
pub mod store;

pub use catalog::{Catalog, FileDescriptor};
pub use encoding::{checksum_matrix, checksum_matrix_classic, checksum_matrix_with_inv};
pub use matrix::Matrix;
pub use store::Store;
