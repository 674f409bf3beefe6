//! Source and destination resolution.
//!
//! Turns the path strings from the command line into absolute locations,
//! decides what kind of destination was meant, and checks that source and
//! destination fit together before any file is touched.
//!
//! ## Layouts
//!
//! ```text
//! source              destination           outputs
//! ------              -----------           -------
//! dir/ or files       (none)                in place, same path
//! dir/ or files       out/                  out/<file name>
//! one file            out/name.png          out/name.png
//! dir/                out/name.png          error
//! several files       out/name.png          error
//! ```
//!
//! A destination that does not exist yet is a file if it has an extension and
//! a directory otherwise. A trailing `/` always means a directory.

use crate::args::{RunConfig, SourceSpec};
use crate::types::ImageFormat;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Cannot determine the current directory: {0}")]
    CurrentDir(std::io::Error),
    #[error("Source {} does not exist", .0.display())]
    SourceMissing(PathBuf),
    #[error("Source {} is not a supported image type", .0.display())]
    UnsupportedSource(PathBuf),
    #[error("Cannot read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("Destination directory {} does not exist (use --createdirs to create it)", .0.display())]
    DestinationMissing(PathBuf),
    #[error("Cannot create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Source is a directory but destination {} is a file", .0.display())]
    DirectoryToFile(PathBuf),
    #[error("Destination {} is a single file but {count} source files were given", path.display())]
    FileNeedsOneSource { path: PathBuf, count: usize },
}

/// An absolute, normalized path and whether it is an existing directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: PathBuf,
    pub is_directory: bool,
    /// The user wrote a trailing separator, so a directory was meant even
    /// if none exists yet.
    pub names_directory: bool,
}

/// Resolve a user-supplied path against `cwd`.
pub fn resolve(spec: &str, cwd: &Path) -> ResolvedPath {
    let names_directory = spec.ends_with('/') || spec.ends_with(std::path::MAIN_SEPARATOR);
    let path = absolutize(Path::new(spec), cwd);
    let is_directory = path.is_dir();
    ResolvedPath {
        path,
        is_directory,
        names_directory,
    }
}

/// Join a relative path to `cwd` and remove `.` and `..` segments.
///
/// Purely lexical: symlinks are not followed.
pub fn absolutize(spec: &Path, cwd: &Path) -> PathBuf {
    let joined = if spec.is_absolute() {
        spec.to_path_buf()
    } else {
        cwd.join(spec)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Whether a path has one of the image extensions this tool handles.
pub fn is_supported(path: &Path) -> bool {
    ImageFormat::of_path(path).is_some()
}

/// Where outputs go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Each output replaces its source.
    InPlace,
    Directory(PathBuf),
    File(PathBuf),
}

impl Destination {
    /// Output path for one source, before any format change.
    pub fn output_for(&self, source: &Path) -> PathBuf {
        match self {
            Destination::InPlace => source.to_path_buf(),
            Destination::Directory(dir) => match source.file_name() {
                Some(name) => dir.join(name),
                None => dir.clone(),
            },
            Destination::File(file) => file.clone(),
        }
    }
}

/// The validated file layout for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub sources: Vec<PathBuf>,
    /// Set when the source was a directory.
    pub source_dir: Option<PathBuf>,
    pub destination: Destination,
    /// Delete-on-success after the collision rule.
    pub delete_sources: bool,
    /// Dropped list entries.
    pub warnings: Vec<String>,
}

/// Resolve and validate sources and destination.
///
/// Destination directories are only created once the layout is known to be
/// valid.
pub fn plan_layout(config: &RunConfig, cwd: &Path) -> Result<Layout, PathError> {
    let mut warnings = Vec::new();
    let (sources, source_dir) = resolve_sources(&config.source, cwd, &mut warnings)?;

    let (destination, missing_dir) = match (&config.destination, config.info_only) {
        (Some(spec), false) => classify_destination(&resolve(spec, cwd)),
        _ => (Destination::InPlace, None),
    };

    if let Destination::File(file) = &destination {
        if source_dir.is_some() {
            return Err(PathError::DirectoryToFile(file.clone()));
        }
        if sources.len() != 1 {
            return Err(PathError::FileNeedsOneSource {
                path: file.clone(),
                count: sources.len(),
            });
        }
    }

    if let Some(dir) = missing_dir {
        if !config.create_dirs {
            return Err(PathError::DestinationMissing(dir));
        }
        log::debug!("creating {}", dir.display());
        fs::create_dir_all(&dir).map_err(|source| PathError::CreateDir { path: dir, source })?;
    }

    let delete_sources = config.delete_source && deletion_allowed(&sources, &destination);
    if config.delete_source && !delete_sources {
        log::debug!("source deletion suppressed: outputs share a location with sources");
    }

    Ok(Layout {
        sources,
        source_dir,
        destination,
        delete_sources,
        warnings,
    })
}

fn resolve_sources(
    spec: &SourceSpec,
    cwd: &Path,
    warnings: &mut Vec<String>,
) -> Result<(Vec<PathBuf>, Option<PathBuf>), PathError> {
    match spec {
        SourceSpec::Path(spec) => {
            let resolved = resolve(spec, cwd);
            if resolved.is_directory {
                let files = enumerate_directory(&resolved.path)?;
                log::debug!(
                    "{} supported files in {}",
                    files.len(),
                    resolved.path.display()
                );
                Ok((files, Some(resolved.path)))
            } else if !resolved.path.is_file() {
                Err(PathError::SourceMissing(resolved.path))
            } else if !is_supported(&resolved.path) {
                Err(PathError::UnsupportedSource(resolved.path))
            } else {
                Ok((vec![resolved.path], None))
            }
        }
        SourceSpec::Files(list) => {
            let mut files = Vec::new();
            for spec in list {
                let resolved = resolve(spec, cwd);
                let path = resolved.path;
                if resolved.is_directory {
                    warnings.push(format!("{} is a directory -- skipping", path.display()));
                } else if !path.exists() {
                    warnings.push(format!("File {} does not exist -- skipping", path.display()));
                } else if !is_supported(&path) {
                    warnings.push(format!(
                        "{} is not a supported image type -- skipping",
                        path.display()
                    ));
                } else {
                    files.push(path);
                }
            }
            Ok((files, None))
        }
    }
}

/// Immediate, non-hidden, supported files of a directory, sorted by name.
pub fn enumerate_directory(dir: &Path) -> Result<Vec<PathBuf>, PathError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| PathError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !hidden && entry.path().is_file() && is_supported(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Decide what a destination means, and which directory must exist for it.
fn classify_destination(resolved: &ResolvedPath) -> (Destination, Option<PathBuf>) {
    let path = resolved.path.clone();
    if resolved.is_directory {
        return (Destination::Directory(path), None);
    }
    if resolved.names_directory {
        return (Destination::Directory(path.clone()), Some(path));
    }
    if path.exists() || path.extension().is_some() {
        let missing_parent = path.parent().filter(|p| !p.is_dir()).map(Path::to_path_buf);
        return (Destination::File(path), missing_parent);
    }
    (Destination::Directory(path.clone()), Some(path))
}

/// The "don't delete what you just wrote" rule.
///
/// One source sharing a location with the destination disables deletion for
/// the whole batch.
pub fn deletion_allowed(sources: &[PathBuf], destination: &Destination) -> bool {
    match destination {
        Destination::InPlace => false,
        Destination::File(file) => !sources.iter().any(|s| s == file),
        Destination::Directory(dir) => !sources.iter().any(|s| s.parent() == Some(dir.as_path())),
    }
}

/// The process working directory, for the binary.
pub fn current_dir() -> Result<PathBuf, PathError> {
    std::env::current_dir().map_err(PathError::CurrentDir)
}
