//! Error types for the RAID-6 erasure-coded object store

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building matrices, encoding/decoding
/// shards, or operating the shard store
#[derive(Error, Debug)]
pub enum Error {
    /// A matrix constructor received a zero dimension
    #[error("matrix dimensions must be non-zero, got {rows}x{cols}")]
    BadDimensions { rows: usize, cols: usize },

    /// Matrix multiplication operands have incompatible shapes
    #[error("shape mismatch: {lhs_rows}x{lhs_cols} cannot multiply {rhs_rows}x{rhs_cols}")]
    ShapeMismatch {
        lhs_rows: usize,
        lhs_cols: usize,
        rhs_rows: usize,
        rhs_cols: usize,
    },

    /// A sub-matrix window fell outside the parent matrix's bounds
    #[error("submatrix window out of bounds: ({r0},{c0})..({r1},{c1}) in a {rows}x{cols} matrix")]
    SubMatrixOutOfBounds {
        r0: usize,
        c0: usize,
        r1: usize,
        c1: usize,
        rows: usize,
        cols: usize,
    },

    /// Gauss-Jordan elimination found no usable pivot
    #[error("matrix is singular, no pivot available at column {col}")]
    SingularMatrix { col: usize },

    /// `classic` was requested with a shape other than (6, 2)
    #[error("classic RAID-6 requires data=6, parity=2, got data={data}, parity={parity}")]
    NotClassicShape { data: u32, parity: u32 },

    /// `store` was called with a name already present in the catalog
    #[error("file already exists in catalog: {0}")]
    AlreadyExists(String),

    /// `read` was called with a name not present in the catalog
    #[error("file not found in catalog: {0}")]
    FileNotFound(String),

    /// `read`/`recover` were invoked with a missing shard directory
    #[error("shard directory does not exist: {0}")]
    NoDirectory(String),

    /// A shard could not be read during `read`
    #[error("error reading shard {index}, consider running recovery")]
    ShardReadError { index: usize },

    /// `read` detected two or more differing parity bytes
    #[error("too many parity mismatches, unrecoverable")]
    UnrecoverableParityMismatch,

    /// `recover` found fewer than `d` surviving shards
    #[error("too many missing shards, unrecoverable: have {available}, need {required}")]
    UnrecoverableTooManyMissing { available: usize, required: usize },

    /// The catalog could not be read, parsed, or written
    #[error("catalog I/O error: {0}")]
    CatalogIo(String),

    /// Reserved for programmer error; unreachable with the constructors
    /// in this crate, kept so internal assertions produce a typed error
    /// rather than panicking.
    #[error("division by zero in GF(2^8)")]
    DivisionByZero,

    /// Any other filesystem I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog (de)serialization failure
    #[error("catalog (de)serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
