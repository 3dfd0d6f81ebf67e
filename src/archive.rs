use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path};

use tracing::{debug, info};
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::{FileOptions, ZipWriter};

use crate::{FrameTraceError, FrameTraceResult};

/// Pack every file below `source_dir` into a deflated zip at `archive_path`.
///
/// Entries are named by their `/`-separated path relative to `source_dir` and
/// written in file-name order at each directory level. An existing archive is
/// overwritten; if it lives inside `source_dir` it is not added to itself.
/// Returns the number of entries written.
pub fn archive(source_dir: &Path, archive_path: &Path) -> FrameTraceResult<usize> {
    if !source_dir.is_dir() {
        return Err(FrameTraceError::file_io(
            source_dir,
            io::Error::new(io::ErrorKind::NotFound, "archive source is not a directory"),
        ));
    }

    let file = File::create(archive_path).map_err(|e| FrameTraceError::file_io(archive_path, e))?;
    let archive_identity = fs::canonicalize(archive_path).ok();
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries = 0;
    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if archive_identity.is_some() && fs::canonicalize(path).ok() == archive_identity {
            continue;
        }

        let name = entry_name(path.strip_prefix(source_dir).unwrap_or(path));
        debug!(entry = %name, "adding archive entry");
        zip.start_file(name, options)?;
        let mut source = File::open(path).map_err(|e| FrameTraceError::file_io(path, e))?;
        io::copy(&mut source, &mut zip).map_err(|e| FrameTraceError::file_io(path, e))?;
        entries += 1;
    }

    let mut file = zip.finish()?;
    file.flush()
        .map_err(|e| FrameTraceError::file_io(archive_path, e))?;
    info!(archive = %archive_path.display(), entries, "archive written");
    Ok(entries)
}

/// Zip entry name for a relative path: normal components joined with `/`.
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
