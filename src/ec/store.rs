//! Store operations: `store`, `read`, `recover`
//!
//! These are the protocols that compose the field arithmetic, matrix,
//! and catalog layers into the actual encode / verify-and-decode /
//! rebuild behavior of the shard store.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use super::catalog::{Catalog, FileDescriptor};
use super::matrix::Matrix;
use crate::error::{Error, Result};

/// Bundles the encoding matrix and shard directory that every store
/// operation needs. Constructed once per process invocation; the
/// catalog is a separate value loaded and passed in by the caller
/// rather than owned here, so it can be inspected and persisted
/// independently of the encoding configuration.
pub struct Store {
    matrix: Matrix,
    data_shards: usize,
    parity_shards: usize,
    dir: PathBuf,
}

impl Store {
    /// `matrix` must be the `(d+c) x d` systematic encoding matrix built
    /// by [`crate::ec::encoding::checksum_matrix`] or
    /// [`crate::ec::encoding::checksum_matrix_classic`].
    pub fn new(matrix: Matrix, dir: impl Into<PathBuf>) -> Self {
        let data_shards = matrix.cols();
        let parity_shards = matrix.rows() - data_shards;
        Store {
            matrix,
            data_shards,
            parity_shards,
            dir: dir.into(),
        }
    }

    pub fn data_shards(&self) -> usize {
        self.data_shards
    }

    pub fn parity_shards(&self) -> usize {
        self.parity_shards
    }

    pub fn total_shards(&self) -> usize {
        self.data_shards + self.parity_shards
    }

    fn shard_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("shard{index}"))
    }

    fn require_dir(&self) -> Result<()> {
        if self.dir.is_dir() {
            Ok(())
        } else {
            Err(Error::NoDirectory(self.dir.display().to_string()))
        }
    }

    /// Encodes the file at `path` and appends its shard slices to every
    /// `<dir>/shard<i>`, registering a new descriptor in `catalog` and
    /// persisting it. Fails with [`Error::AlreadyExists`] if `name` is
    /// already present in `catalog`; does not touch any shard file in
    /// that case.
    #[instrument(skip(self, catalog), fields(name, data_shards = self.data_shards, parity_shards = self.parity_shards))]
    pub fn store(
        &self,
        catalog: &mut Catalog,
        catalog_path: &Path,
        name: &str,
        path: &Path,
    ) -> Result<()> {
        if catalog.files.contains_key(name) {
            return Err(Error::AlreadyExists(name.to_string()));
        }

        std::fs::create_dir_all(&self.dir)?;

        let mut data = std::fs::read(path)?;
        let size = data.len() as u64;

        let d = self.data_shards as u64;
        let disk_size = size.div_ceil(d);
        let padded_len = (disk_size * d) as usize;
        data.resize(padded_len, 0);

        let chunks: Vec<Vec<u8>> = if disk_size == 0 {
            // `data.chunks(0)` panics; an empty file yields d empty chunks.
            vec![Vec::new(); self.data_shards]
        } else {
            data.chunks(disk_size as usize).map(|c| c.to_vec()).collect()
        };

        let shards = self.matrix.multiply_shards(&chunks)?;

        for (i, shard) in shards.iter().enumerate() {
            let mut f = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.shard_path(i))?;
            f.write_all(shard)?;
        }

        let descriptor = FileDescriptor {
            name: name.to_string(),
            offset: catalog.disk_size,
            disk_size,
            size,
        };
        catalog.insert(descriptor);
        catalog.persist(catalog_path)?;

        info!(name, size, disk_size, "stored file");
        Ok(())
    }

    /// Decodes `src_name` back to `dst_path`, verifying parity as it
    /// goes. A single differing parity byte is logged as an advisory
    /// (the source's heuristic: a lone mismatch is assumed to be parity
    /// corruption, not data corruption) and reading continues; two or
    /// more differing bytes abort with
    /// [`Error::UnrecoverableParityMismatch`].
    #[instrument(skip(self, catalog), fields(src_name))]
    pub fn read(&self, catalog: &Catalog, src_name: &str, dst_path: &Path) -> Result<()> {
        self.require_dir()?;

        let descriptor = catalog
            .files
            .get(src_name)
            .ok_or_else(|| Error::FileNotFound(src_name.to_string()))?;

        let mut shards = Vec::with_capacity(self.total_shards());
        for i in 0..self.total_shards() {
            let mut buf = vec![0u8; descriptor.disk_size as usize];
            let mut f = std::fs::File::open(self.shard_path(i))
                .map_err(|_| Error::ShardReadError { index: i })?;
            f.seek(SeekFrom::Start(descriptor.offset))
                .map_err(|_| Error::ShardReadError { index: i })?;
            f.read_exact(&mut buf)
                .map_err(|_| Error::ShardReadError { index: i })?;
            shards.push(buf);
        }

        let data = &shards[..self.data_shards];
        let parity = &shards[self.data_shards..];

        let parity_rows = self
            .matrix
            .submatrix(self.data_shards, 0, self.total_shards(), self.data_shards)?;
        let restored_parity = parity_rows.multiply_shards(data)?;

        let mut mismatches = 0usize;
        for (restored, actual) in restored_parity.iter().zip(parity.iter()) {
            for (r, a) in restored.iter().zip(actual.iter()) {
                if r != a {
                    mismatches += 1;
                }
            }
        }

        if mismatches > 1 {
            return Err(Error::UnrecoverableParityMismatch);
        } else if mismatches == 1 {
            warn!(src_name, "parity has a single disagreeing byte, consider running recovery");
        }

        let mut raw = Vec::with_capacity(data.len() * descriptor.disk_size as usize);
        for chunk in data {
            raw.extend_from_slice(chunk);
        }
        raw.truncate(descriptor.size as usize);

        std::fs::write(dst_path, &raw)?;
        info!(src_name, size = descriptor.size, "read file");
        Ok(())
    }

    /// Rebuilds any missing shards from the survivors. A no-op if every
    /// shard is present. Rewrites every shard file in full regardless of
    /// which were missing (data shards from the recovered chunks, parity
    /// shards recomputed from them), which is idempotent and — unlike
    /// rewriting only the missing ones — never truncates another
    /// stored file's slice that happens to share a shard file.
    #[instrument(skip(self))]
    pub fn recover(&self) -> Result<()> {
        self.require_dir()?;

        let mut present = Vec::new();
        let mut missing = Vec::new();
        let mut present_shards = Vec::new();

        for i in 0..self.total_shards() {
            match std::fs::read(self.shard_path(i)) {
                Ok(bytes) => {
                    present.push(i);
                    present_shards.push(bytes);
                }
                Err(_) => missing.push(i),
            }
        }

        if present.len() < self.data_shards {
            return Err(Error::UnrecoverableTooManyMissing {
                available: present.len(),
                required: self.data_shards,
            });
        }
        if missing.is_empty() {
            info!("no shards missing, recovery is a no-op");
            return Ok(());
        }

        let chosen = &present[..self.data_shards];
        let chosen_shards = present_shards[..self.data_shards].to_vec();

        let r = self.matrix.select_rows(chosen);
        let r_inv = r.invert()?;
        let data = r_inv.multiply_shards(&chosen_shards)?;

        for (i, chunk) in data.iter().enumerate() {
            std::fs::write(self.shard_path(i), chunk)?;
        }

        let parity_rows = self
            .matrix
            .submatrix(self.data_shards, 0, self.total_shards(), self.data_shards)?;
        let parity = parity_rows.multiply_shards(&data)?;
        for (j, chunk) in parity.iter().enumerate() {
            std::fs::write(self.shard_path(self.data_shards + j), chunk)?;
        }

        info!(missing = ?missing, "recovered missing shards");
        Ok(())
    }
}
