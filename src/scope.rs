//! Scoped file acquisition and read-only memory mapping.
//!
//! A [`ScopedFile`] owns an open descriptor for exactly as long as it is in
//! scope; dropping it (normal exit, `?` early return or unwind) closes the
//! descriptor. [`MappedRegion::map`] uses one only long enough to create the
//! mapping, so views never hold a descriptor open between calls.

use crate::error::{ArrayFileError, Result};
use memmap2::Mmap;
use std::fs::{File, OpenOptions};
use std::io::Read;
use std::ops::{BitOr, Deref};
use std::path::{Path, PathBuf};

/// Flags controlling how [`ScopedFile::acquire`] opens a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFlags(u8);

impl OpenFlags {
    pub const READ: OpenFlags = OpenFlags(0b001);
    pub const WRITE: OpenFlags = OpenFlags(0b010);
    pub const CREATE: OpenFlags = OpenFlags(0b100);

    pub fn contains(self, other: OpenFlags) -> bool {
        self.0 & other.0 == other.0
    }

    fn to_options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options
            .read(self.contains(Self::READ))
            .write(self.contains(Self::WRITE))
            .create(self.contains(Self::CREATE));
        options
    }
}

impl Default for OpenFlags {
    fn default() -> Self {
        Self::READ
    }
}

impl BitOr for OpenFlags {
    type Output = OpenFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        OpenFlags(self.0 | rhs.0)
    }
}

/// An open file handle released when it leaves scope
#[derive(Debug)]
pub struct ScopedFile {
    file: File,
    path: PathBuf,
}

impl ScopedFile {
    /// Open `path` with `flags`
    ///
    /// # Errors
    /// * `FileNotFound` if the path does not exist
    /// * `FileError` for any other open failure
    pub fn acquire(path: impl AsRef<Path>, flags: OpenFlags) -> Result<Self> {
        let path = path.as_ref();
        let file = flags
            .to_options()
            .open(path)
            .map_err(|e| ArrayFileError::from_open(path, e))?;
        log::trace!("acquired handle for {}", path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    /// Raw descriptor of the open handle
    #[cfg(unix)]
    pub fn raw_fd(&self) -> std::os::unix::io::RawFd {
        use std::os::unix::io::AsRawFd;
        self.file.as_raw_fd()
    }
}

impl Read for ScopedFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl Drop for ScopedFile {
    fn drop(&mut self) {
        log::trace!("released handle for {}", self.path.display());
    }
}

/// Run `body` with a handle to `path`, releasing it on every exit path
pub fn with_file<T>(
    path: impl AsRef<Path>,
    flags: OpenFlags,
    body: impl FnOnce(&ScopedFile) -> Result<T>,
) -> Result<T> {
    let handle = ScopedFile::acquire(path, flags)?;
    body(&handle)
}

/// Check that `path` exists and is a regular file
pub fn validate_file_path(path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| ArrayFileError::from_open(path, e))?;
    if !metadata.is_file() {
        return Err(ArrayFileError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Read-only bytes of a file
///
/// Zero-length files cannot be mapped on every platform, so they are
/// represented without a mapping.
#[derive(Debug)]
pub enum MappedRegion {
    Mapped(Mmap),
    Empty,
}

impl MappedRegion {
    /// Map `path` read-only. The descriptor is closed before this returns.
    pub fn map(path: &Path) -> Result<Self> {
        Self::map_with_advice(path, false)
    }

    /// Map `path`, optionally advising the kernel of sequential access
    pub fn map_with_advice(path: &Path, sequential: bool) -> Result<Self> {
        let region = with_file(path, OpenFlags::READ, |handle| {
            let file_size = handle
                .file()
                .metadata()
                .map_err(|e| ArrayFileError::file_error("Failed to get file metadata", e))?
                .len();
            if file_size == 0 {
                return Ok(MappedRegion::Empty);
            }

            // SAFETY: the mapping is read-only; concurrent modification of
            // the file by other processes is outside the supported model.
            let mmap = unsafe { Mmap::map(handle.file()) }.map_err(|e| {
                ArrayFileError::memory_mapping(format!("{}: {}", path.display(), e))
            })?;
            Ok(MappedRegion::Mapped(mmap))
        })?;

        #[cfg(unix)]
        {
            if let (true, MappedRegion::Mapped(mmap)) = (sequential, &region) {
                // Non-fatal
                if let Err(e) = mmap.advise(memmap2::Advice::Sequential) {
                    log::debug!("ignoring mmap advice failure: {}", e);
                }
            }
        }
        #[cfg(not(unix))]
        let _ = sequential;

        log::debug!("mapped {} ({} bytes)", path.display(), region.len());
        Ok(region)
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            MappedRegion::Mapped(mmap) => &mmap[..],
            MappedRegion::Empty => &[],
        }
    }
}

impl Deref for MappedRegion {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}
