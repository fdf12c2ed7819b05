//! # Memory-Mapped File Region
//!
//! `MmapRegion` maps a bag file into the process address space with a
//! shared, writable mapping. Every mutation the allocator makes lands in the
//! OS page cache immediately; `sync()` forces it to disk.
//!
//! ## Growth
//!
//! ```text
//! grow(&mut self, n)
//!   1. flush the current mapping
//!   2. File::set_len(len + n)       new bytes read as zero
//!   3. remap the whole file         old mapping replaced on success
//! ```
//!
//! If the remap fails, the file is truncated back and the region keeps its
//! old mapping and length.
//!
//! `grow()` takes `&mut self`, so no slice into the old mapping can survive
//! the remap.
//!
//! ## Empty Files
//!
//! A zero-length file cannot be mapped on every platform, so an empty file
//! opens with no mapping and a logical length of 0. The first `grow()` sizes
//! the file and creates the mapping. This is how a freshly created bag file
//! reaches `Header::initialize`.
//!
//! ## Error Handling
//!
//! All fallible operations return `eyre::Result` with the file path and the
//! operation that failed.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use memmap2::MmapMut;
use tracing::warn;

use super::Region;

#[derive(Debug)]
pub struct MmapRegion {
    path: PathBuf,
    file: File,
    mmap: Option<MmapMut>,
    len: usize,
}

impl MmapRegion {
    /// Opens `path`, creating an empty file if it does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .wrap_err_with(|| format!("failed to open bag file '{}'", path.display()))?;

        Self::from_file(path, file)
    }

    fn from_file(path: &Path, file: File) -> Result<Self> {
        let metadata = file
            .metadata()
            .wrap_err_with(|| format!("failed to get metadata for '{}'", path.display()))?;

        let len = usize::try_from(metadata.len()).wrap_err_with(|| {
            format!(
                "bag file '{}' is too large to map ({} bytes)",
                path.display(),
                metadata.len()
            )
        })?;

        let mmap = if len == 0 {
            None
        } else {
            Some(map(&file, path)?)
        };

        Ok(Self {
            path: path.to_path_buf(),
            file,
            mmap,
            len,
        })
    }

    /// Swaps in the mapping of the extended file. On failure the file is
    /// cut back to the mapped length and the old mapping stays in place.
    fn install(&mut self, new_len: usize, mapped: Result<MmapMut>) -> Result<()> {
        match mapped {
            Ok(mmap) => {
                self.mmap = Some(mmap);
                self.len = new_len;
                Ok(())
            }
            Err(e) => {
                if let Err(rollback) = self.file.set_len(self.len as u64) {
                    warn!(
                        path = %self.path.display(),
                        len = self.len,
                        error = %rollback,
                        "failed to restore bag file length after remap failure"
                    );
                }
                Err(e.wrap_err("failed to remap file after grow"))
            }
        }
    }
}

fn map(file: &File, path: &Path) -> Result<MmapMut> {
    // SAFETY: MmapMut::map_mut is unsafe because the file may be modified by
    // another process while mapped. Bag files are owned by a single bagdb
    // process at a time (serializing access is the caller's responsibility),
    // the mapping lives no longer than the File it was created from, and all
    // access goes through Region::slice/slice_mut which bounds-check against
    // the logical length.
    unsafe {
        MmapMut::map_mut(file)
            .wrap_err_with(|| format!("failed to memory-map '{}'", path.display()))
    }
}

impl Region for MmapRegion {
    fn len(&self) -> usize {
        self.len
    }

    fn as_bytes(&self) -> &[u8] {
        match &self.mmap {
            Some(mmap) => &mmap[..self.len],
            None => &[],
        }
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        match &mut self.mmap {
            Some(mmap) => &mut mmap[..self.len],
            None => &mut [],
        }
    }

    fn grow(&mut self, additional: usize) -> Result<()> {
        if additional == 0 {
            return Ok(());
        }

        if let Some(mmap) = &self.mmap {
            mmap.flush().wrap_err("failed to flush mmap before grow")?;
        }

        let new_len = self.len + additional;

        self.file.set_len(new_len as u64).wrap_err_with(|| {
            format!(
                "failed to extend '{}' to {} bytes",
                self.path.display(),
                new_len
            )
        })?;

        let mapped = map(&self.file, &self.path);
        self.install(new_len, mapped)
    }

    fn sync(&self) -> Result<()> {
        match &self.mmap {
            Some(mmap) => mmap
                .flush()
                .wrap_err_with(|| format!("failed to sync '{}' to disk", self.path.display())),
            None => Ok(()),
        }
    }
}
