// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Native `.tar` / `.tar.gz` unpacking.
//!
//! ```text
//! File --(GzDecoder)--> tar::Archive::entries()   GNU long names and PAX
//!                              |                   records are applied here
//!          +--------+----------+---------+-------------+
//!          v        v          v         v             v
//!         dir     file      symlink   pax global    anything else
//!       mkdir -p  replace   relative   skipped      policy: warn | fail
//!                 dir, chmod  only
//! ```
//!
//! Entry paths are confined to the destination: absolute paths, `..`
//! components and symlinks pointing outside are rejected with `UnsafePath`.
//! Parent directories are resolved on disk before every write, so links
//! created by earlier entries cannot carry a later entry out of the tree.

use flate2::read::GzDecoder;
use std::fs;
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};
use tracing::{debug, trace, warn};

use crate::config::types::UnknownEntryPolicy;
use crate::error::{ArchiveError, SplinesResult};

/// Counts of what an unpack wrote or skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TarSummary {
    pub files: usize,
    pub directories: usize,
    pub symlinks: usize,
    pub skipped: usize,
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ArchiveError + '_ {
    move |source| ArchiveError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Unpacks `archive` into `destination`, creating it if needed.
///
/// # Errors
///
/// Returns an `ArchiveError` if the archive cannot be read, an entry is
/// unsafe, an entry cannot be written, or an unsupported entry is found
/// under [`UnknownEntryPolicy::Fail`].
pub fn unpack(
    archive: &Path,
    gzip: bool,
    destination: &Path,
    policy: UnknownEntryPolicy,
) -> SplinesResult<TarSummary> {
    let file = fs::File::open(archive).map_err(io_error(archive))?;
    let reader: Box<dyn Read> = if gzip {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    fs::create_dir_all(destination).map_err(io_error(destination))?;
    unpack_reader(reader, archive, destination, policy)
}

fn unpack_reader<R: Read>(
    reader: R,
    archive: &Path,
    destination: &Path,
    policy: UnknownEntryPolicy,
) -> SplinesResult<TarSummary> {
    let root = fs::canonicalize(destination).map_err(io_error(destination))?;
    let mut tar = Archive::new(reader);
    let mut summary = TarSummary::default();

    for entry in tar.entries().map_err(io_error(archive))? {
        let mut entry = entry.map_err(io_error(archive))?;
        let name = entry.path().map_err(io_error(archive))?.into_owned();
        let kind = entry.header().entry_type();

        if kind.is_pax_global_extensions() {
            debug!(entry = %name.display(), "skipping pax global header");
            summary.skipped += 1;
            continue;
        }

        let relative = confined_path(&name)?;
        let Some(file_name) = relative.file_name() else {
            continue;
        };
        let parent = prepare_parent(&root, &relative)?;
        let dest = parent.join(file_name);
        let mode = entry.header().mode().ok();
        trace!(entry = %name.display(), kind = ?kind, "unpacking");

        match kind {
            EntryType::Directory => {
                clear_for(&dest, true)?;
                fs::create_dir_all(&dest).map_err(io_error(&dest))?;
                set_mode(&dest, mode.map(|m| m | 0o700))?;
                summary.directories += 1;
            }
            EntryType::Regular | EntryType::Continuous => {
                clear_for(&dest, false)?;
                let mut out = fs::File::create(&dest).map_err(io_error(&dest))?;
                io::copy(&mut entry, &mut out).map_err(io_error(&dest))?;
                drop(out);
                set_mode(&dest, mode)?;
                summary.files += 1;
            }
            EntryType::Symlink => {
                let target = entry
                    .link_name()
                    .map_err(io_error(archive))?
                    .map(std::borrow::Cow::into_owned)
                    .unwrap_or_default();
                let unsafe_link = || ArchiveError::UnsafePath {
                    path: format!("{} -> {}", name.display(), target.display()),
                };
                // Depth is measured from where the link really lands, not
                // from the entry name, which may run through earlier links.
                let placed = parent
                    .strip_prefix(&root)
                    .map_err(|_| unsafe_link())?
                    .join(file_name);
                if link_escapes(&placed, &target) {
                    return Err(unsafe_link().into());
                }
                if create_symlink(&target, &dest)? {
                    if let Ok(resolved) = fs::canonicalize(&dest)
                        && !resolved.starts_with(&root)
                    {
                        fs::remove_file(&dest).map_err(io_error(&dest))?;
                        return Err(unsafe_link().into());
                    }
                    summary.symlinks += 1;
                } else {
                    summary.skipped += 1;
                }
            }
            other => {
                let kind = format!("{other:?}");
                match policy {
                    UnknownEntryPolicy::Warn => {
                        warn!(entry = %name.display(), kind = %kind, "skipping unsupported tar entry");
                        summary.skipped += 1;
                    }
                    UnknownEntryPolicy::Fail => {
                        return Err(ArchiveError::UnsupportedEntry {
                            path: name.display().to_string(),
                            kind,
                        }
                        .into());
                    }
                }
            }
        }
    }

    Ok(summary)
}

/// Strips `.` components and rejects anything that could leave the destination.
fn confined_path(name: &Path) -> Result<PathBuf, ArchiveError> {
    let mut relative = PathBuf::new();
    for component in name.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ArchiveError::UnsafePath {
                    path: name.display().to_string(),
                });
            }
        }
    }
    Ok(relative)
}

/// Creates the directories leading to `relative` under `root` and returns the
/// real parent directory.
///
/// Existing symlinks along the way are followed only when they resolve inside
/// `root`; a regular file in the way is replaced by a directory.
fn prepare_parent(root: &Path, relative: &Path) -> Result<PathBuf, ArchiveError> {
    let mut current = root.to_path_buf();
    let Some(parent) = relative.parent() else {
        return Ok(current);
    };

    for component in parent.components() {
        current.push(component);
        match fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => {
                let resolved = fs::canonicalize(&current).map_err(io_error(&current))?;
                if !resolved.starts_with(root) {
                    return Err(ArchiveError::UnsafePath {
                        path: relative.display().to_string(),
                    });
                }
                current = resolved;
            }
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                fs::remove_file(&current).map_err(io_error(&current))?;
                fs::create_dir(&current).map_err(io_error(&current))?;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::create_dir(&current).map_err(io_error(&current))?;
            }
            Err(e) => return Err(io_error(&current)(e)),
        }
    }
    Ok(current)
}

/// Removes whatever sits at `dest` and would block an entry of the given
/// kind. A symlink is always removed so the write cannot follow it.
fn clear_for(dest: &Path, directory: bool) -> Result<(), ArchiveError> {
    match fs::symlink_metadata(dest) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::remove_file(dest).map_err(io_error(dest))
        }
        Ok(meta) if meta.is_dir() && !directory => {
            fs::remove_dir_all(dest).map_err(io_error(dest))
        }
        Ok(meta) if !meta.is_dir() && directory => {
            fs::remove_file(dest).map_err(io_error(dest))
        }
        _ => Ok(()),
    }
}

/// Whether a symlink at `entry` (relative to the destination) pointing at
/// `target` resolves outside the destination.
fn link_escapes(entry: &Path, target: &Path) -> bool {
    if target.has_root() {
        return true;
    }
    let mut depth = entry.components().count().saturating_sub(1);
    for component in target.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return true;
                }
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return true,
        }
    }
    false
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: Option<u32>) -> Result<(), ArchiveError> {
    use std::os::unix::fs::PermissionsExt;
    if let Some(mode) = mode {
        fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))
            .map_err(io_error(path))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: Option<u32>) -> Result<(), ArchiveError> {
    Ok(())
}

#[cfg(unix)]
fn create_symlink(target: &Path, dest: &Path) -> Result<bool, ArchiveError> {
    match fs::symlink_metadata(dest) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(dest).map_err(io_error(dest))?,
        Ok(_) => fs::remove_file(dest).map_err(io_error(dest))?,
        Err(_) => {}
    }
    std::os::unix::fs::symlink(target, dest).map_err(io_error(dest))?;
    Ok(true)
}

#[cfg(not(unix))]
fn create_symlink(target: &Path, dest: &Path) -> Result<bool, ArchiveError> {
    warn!(
        link = %dest.display(),
        target = %target.display(),
        "symlinks are not unpacked on this platform"
    );
    Ok(false)
}
