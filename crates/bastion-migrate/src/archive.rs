//! Relocation of replay archives into the sharded output tree.
//!
//! # Layout
//!
//! A session id is rendered as 16 lowercase, zero-padded hex digits. The
//! trailing `width` digits name the outermost directory, the `width` digits
//! to their left the next one, and so on for `depth` levels. The file itself
//! is named by all 16 digits. With the default layout (depth 3, width 2):
//!
//! ```text
//! 0x1a2b  ->  <root>/2b/1a/00/0000000000001a2b
//! ```
//!
//! Sharding on the low-order digits spreads consecutive ids across
//! directories; each directory holds at most `16^width` entries.
//!
//! The legacy tree names files by the unpadded hex id under a fixed number
//! of directories whose names carry no meaning.

use std::collections::HashMap;
use std::fs::{DirBuilder, File};
use std::io;
use std::path::{Path, PathBuf};

use bastion_migrate_core::{IdError, SessionId};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::warn;
use walkdir::WalkDir;

use crate::error::{IntegrityError, MigrateError, Result};

/// Shape of the sharded output tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardLayout {
    /// Number of directory levels above each file.
    #[serde(default = "ShardLayout::default_depth")]
    pub depth: usize,
    /// Hex digits consumed per level.
    #[serde(default = "ShardLayout::default_width")]
    pub width: usize,
}

impl ShardLayout {
    const fn default_depth() -> usize {
        3
    }

    const fn default_width() -> usize {
        2
    }

    /// Check that the layout can be carved out of a 16-digit id.
    ///
    /// # Errors
    ///
    /// Returns `MigrateError::Config` if depth or width is zero, or if the
    /// levels need more digits than an id has.
    pub fn validate(&self) -> Result<()> {
        if self.depth == 0 || self.width == 0 {
            return Err(MigrateError::Config(format!(
                "shard depth and width must be positive, got {}x{}",
                self.depth, self.width
            )));
        }
        if self.depth.saturating_mul(self.width) > SessionId::HEX_DIGITS {
            return Err(MigrateError::Config(format!(
                "shard layout {}x{} needs more than {} hex digits",
                self.depth,
                self.width,
                SessionId::HEX_DIGITS
            )));
        }
        Ok(())
    }

    /// Compute the archive path of session `id` under `root`.
    ///
    /// # Panics
    ///
    /// Panics if the layout needs more digits than an id has; check it with
    /// [`ShardLayout::validate`] first.
    #[must_use]
    pub fn path_for(&self, root: &Path, id: SessionId) -> PathBuf {
        let hex = id.to_hex();
        let mut path = root.to_path_buf();
        for level in 0..self.depth {
            let end = SessionId::HEX_DIGITS - level * self.width;
            path.push(&hex[end - self.width..end]);
        }
        path.push(&hex);
        path
    }

    /// Recover the session id from a path produced by [`ShardLayout::path_for`].
    ///
    /// Returns `None` if `path` is not under `root`, has the wrong depth, or
    /// its directories disagree with its file name.
    #[must_use]
    pub fn session_id_for(&self, root: &Path, path: &Path) -> Option<SessionId> {
        let relative = path.strip_prefix(root).ok()?;
        if relative.components().count() != self.depth + 1 {
            return None;
        }
        let id = SessionId::from_hex(relative.file_name()?.to_str()?).ok()?;
        (self.path_for(root, id) == path).then_some(id)
    }
}

impl Default for ShardLayout {
    fn default() -> Self {
        Self {
            depth: Self::default_depth(),
            width: Self::default_width(),
        }
    }
}

/// A replay file found in the legacy tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyArchive {
    /// Location of the file.
    pub path: PathBuf,
    /// Session the file records, parsed from its name.
    pub session_id: SessionId,
}

/// Find every legacy replay file exactly `depth` directories below `root`.
///
/// Symbolic links are followed. Files are returned sorted by path. A missing
/// `root` yields no archives.
///
/// # Errors
///
/// Returns `IntegrityError::NotAFile` for anything at archive depth that is
/// not a regular file, `IntegrityError::InvalidArchiveName` for a file whose
/// name is not a base-16 id, `IntegrityError::DuplicateArchive` if two files
/// name the same session, and `MigrateError::Io` if the tree cannot be
/// walked (including dangling links).
pub fn discover_legacy_archives(root: &Path, depth: usize) -> Result<Vec<LegacyArchive>> {
    if !root.exists() {
        warn!(root = %root.display(), "legacy replay directory does not exist");
        return Ok(Vec::new());
    }

    let mut archives = Vec::new();
    let mut seen: HashMap<SessionId, PathBuf> = HashMap::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .min_depth(depth + 1)
        .max_depth(depth + 1)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            MigrateError::Io {
                path,
                source: e.into(),
            }
        })?;
        let entry_is_file = entry.file_type().is_file();
        let path = entry.into_path();
        if !entry_is_file {
            return Err(IntegrityError::NotAFile { path }.into());
        }

        let session_id = parse_legacy_name(&path)?;
        if let Some(first) = seen.insert(session_id, path.clone()) {
            return Err(IntegrityError::DuplicateArchive {
                session_id,
                first,
                second: path,
            }
            .into());
        }
        archives.push(LegacyArchive { path, session_id });
    }

    Ok(archives)
}

fn parse_legacy_name(path: &Path) -> Result<SessionId> {
    let name = path.file_name().unwrap_or_default();
    name.to_str()
        .ok_or_else(|| IdError::InvalidHex(name.to_string_lossy().into_owned()))
        .and_then(SessionId::from_legacy_name)
        .map_err(|source| {
            IntegrityError::InvalidArchiveName {
                path: path.to_path_buf(),
                source,
            }
            .into()
        })
}

/// Create `dir` and its parents, tolerating ones that already exist.
///
/// New directories are not world-accessible.
///
/// # Errors
///
/// Returns `MigrateError::Io` if a directory cannot be created.
pub fn create_dirs(dir: &Path) -> Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o750);
    }
    builder.create(dir).map_err(MigrateError::io(dir))
}

/// Copy the archive at `source` to `dest`, creating parent directories.
///
/// The bytes go to a temporary file next to `dest`, which is synced and then
/// renamed over `dest`. Until this returns `Ok`, `dest` is either absent or
/// holds a previous complete copy.
///
/// # Errors
///
/// Returns `MigrateError::Io` if the source cannot be read or the
/// destination cannot be fully written.
pub fn copy_archive(source: &Path, dest: &Path) -> Result<u64> {
    let parent = dest.parent().ok_or_else(|| MigrateError::Io {
        path: dest.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "destination has no parent"),
    })?;
    create_dirs(parent)?;

    let mut input = File::open(source).map_err(MigrateError::io(source))?;
    let mut output = NamedTempFile::new_in(parent).map_err(MigrateError::io(parent))?;

    let bytes = io::copy(&mut input, output.as_file_mut()).map_err(MigrateError::io(dest))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        output
            .as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o640))
            .map_err(MigrateError::io(dest))?;
    }
    output.as_file().sync_all().map_err(MigrateError::io(dest))?;
    output
        .persist(dest)
        .map_err(|e| MigrateError::io(dest)(e.error))?;

    Ok(bytes)
}
