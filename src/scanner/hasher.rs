//! BLAKE3 file hasher with streaming and memory-mapped support.
//!
//! # Overview
//!
//! The [`Hasher`] computes two kinds of digest:
//! - **Quick hash**: BLAKE3 over the first [`QUICK_HASH_SIZE`] bytes, used to
//!   cheaply split same-size candidates.
//! - **Full hash**: BLAKE3 over the whole content. Together with the size this
//!   is the authoritative duplicate test.
//!
//! Hashing is read-only and holds no shared mutable state, so one `Hasher` can
//! be shared between worker threads.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::scanner::Hasher;
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let quick = hasher.quick_hash(Path::new("a.rom")).unwrap();
//! let full = hasher.full_hash(Path::new("a.rom")).unwrap();
//! println!("{} {}", dupesweep::scanner::hash_to_hex(&quick), dupesweep::scanner::hash_to_hex(&full));
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use memmap2::Mmap;

use super::HashError;

/// A 256-bit BLAKE3 digest.
pub type Hash = [u8; 32];

/// Number of leading bytes covered by the quick hash.
pub const QUICK_HASH_SIZE: usize = 8192;

/// Read buffer used when streaming a full hash.
pub const READ_BUFFER_SIZE: usize = 256 * 1024;

/// Files at least this large are hashed from a memory map by default.
pub const DEFAULT_MMAP_THRESHOLD: u64 = 64 * 1024 * 1024;

/// Content hasher for quick and full digests.
#[derive(Debug, Clone)]
pub struct Hasher {
    mmap_threshold: u64,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with default settings (mmap enabled above 64 MiB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
            shutdown_flag: None,
        }
    }

    /// Set the size at which memory-mapped hashing is used.
    ///
    /// `u64::MAX` disables mapping and always streams.
    #[must_use]
    pub fn with_mmap_threshold(mut self, threshold: u64) -> Self {
        self.mmap_threshold = threshold;
        self
    }

    /// Set the shutdown flag polled between read chunks.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Hash at most the first [`QUICK_HASH_SIZE`] bytes of a file.
    ///
    /// Files shorter than that are hashed whole, so for them the quick hash
    /// equals the full hash.
    ///
    /// # Errors
    ///
    /// Returns `HashError` if the file cannot be opened or read.
    pub fn quick_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut buffer = Vec::with_capacity(QUICK_HASH_SIZE);
        file.take(QUICK_HASH_SIZE as u64)
            .read_to_end(&mut buffer)
            .map_err(|e| HashError::from_io(path, e))?;

        Ok(*blake3::hash(&buffer).as_bytes())
    }

    /// Hash the entire content of a file.
    ///
    /// # Errors
    ///
    /// Returns `HashError` if the file cannot be read, or
    /// `HashError::Interrupted` if shutdown was requested mid-file.
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let len = file
            .metadata()
            .map_err(|e| HashError::from_io(path, e))?
            .len();

        if len > 0 && len >= self.mmap_threshold {
            match self.hash_mmap(&file, path) {
                Ok(hash) => return Ok(hash),
                Err(e) => {
                    log::debug!(
                        "Memory map failed for {}, streaming instead: {}",
                        path.display(),
                        e
                    );
                }
            }
        }

        self.hash_stream(file, path)
    }

    fn hash_mmap(&self, file: &File, path: &Path) -> Result<Hash, HashError> {
        if self.is_shutdown_requested() {
            return Err(HashError::Interrupted(path.to_path_buf()));
        }
        // SAFETY: the mapping is read-only and dropped before returning. A
        // concurrent truncation by another process can still fault; that is
        // the accepted cost of mapped reads.
        let mmap = unsafe { Mmap::map(file) }.map_err(|e| HashError::from_io(path, e))?;

        let mut hasher = blake3::Hasher::new();
        for chunk in mmap.chunks(READ_BUFFER_SIZE) {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(path.to_path_buf()));
            }
            hasher.update(chunk);
        }
        Ok(*hasher.finalize().as_bytes())
    }

    fn hash_stream(&self, mut file: File, path: &Path) -> Result<Hash, HashError> {
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(path.to_path_buf()));
            }
            let n = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            };
            hasher.update(&buffer[..n]);
        }

        Ok(*hasher.finalize().as_bytes())
    }
}

/// Render a digest as lowercase hexadecimal.
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}
