//! Source staging
//!
//! Turns what the user pointed at (a directory, an archive, a git URL) into a
//! local directory the classifier can walk.

use crate::command::CommandRunner;
use flate2::read::GzDecoder;
use reqwest::Url;
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const GIT_PROGRAM: &str = "git";
const FALLBACK_IMAGE_NAME: &str = "app";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectSource {
    /// Existing directory, used in place
    Directory(PathBuf),
    /// `.tar`, `.tar.gz`, `.tgz` or `.zip` file
    Archive(PathBuf),
    /// Remote git repository URL
    Repository(String),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Source not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported archive format: {0} (expected .tar, .tar.gz, .tgz or .zip)")]
    UnsupportedArchive(PathBuf),

    #[error("Failed to unpack {path}: {source}")]
    Unpack {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid repository URL: {0}")]
    InvalidRepositoryUrl(String),

    #[error("git clone of {url} failed: {stderr}")]
    CloneFailed { url: String, stderr: String },

    #[error("Could not run git: {0:#}")]
    GitUnavailable(anyhow::Error),

    #[error("Failed to prepare {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveKind {
    Tar,
    TarGz,
    Zip,
}

/// Archive kind plus the name without its extension
fn split_archive_name(path: &Path) -> Option<(ArchiveKind, String)> {
    let name = path.file_name()?.to_str()?;
    let lower = name.to_lowercase();
    let (kind, ext_len) = if lower.ends_with(".tar.gz") {
        (ArchiveKind::TarGz, ".tar.gz".len())
    } else if lower.ends_with(".tgz") {
        (ArchiveKind::TarGz, ".tgz".len())
    } else if lower.ends_with(".tar") {
        (ArchiveKind::Tar, ".tar".len())
    } else if lower.ends_with(".zip") {
        (ArchiveKind::Zip, ".zip".len())
    } else {
        return None;
    };
    let stem = &name[..name.len() - ext_len];
    if stem.is_empty() {
        return None;
    }
    Some((kind, stem.to_string()))
}

/// Unpacks `archive` into `<work_dir>/<archive stem>` and returns that directory
pub fn unpack_archive(archive: &Path, work_dir: &Path) -> Result<PathBuf, SourceError> {
    if !archive.is_file() {
        return Err(SourceError::NotFound(archive.to_path_buf()));
    }
    let (kind, stem) = split_archive_name(archive)
        .ok_or_else(|| SourceError::UnsupportedArchive(archive.to_path_buf()))?;

    let target = work_dir.join(stem);
    std::fs::create_dir_all(&target).map_err(|source| SourceError::Io {
        path: target.clone(),
        source,
    })?;

    let unpack_err = |source| SourceError::Unpack {
        path: archive.to_path_buf(),
        source,
    };
    let file = File::open(archive).map_err(unpack_err)?;
    let reader: Box<dyn Read> = match kind {
        ArchiveKind::Tar => Box::new(file),
        ArchiveKind::TarGz => Box::new(GzDecoder::new(file)),
        ArchiveKind::Zip => {
            unpack_zip(file, &target).map_err(unpack_err)?;
            info!(archive = %archive.display(), target = %target.display(), "Archive unpacked");
            return Ok(target);
        }
    };
    // Entries escaping the target (absolute paths, `..`) are skipped by tar
    tar::Archive::new(reader)
        .unpack(&target)
        .map_err(unpack_err)?;

    info!(archive = %archive.display(), target = %target.display(), "Archive unpacked");
    Ok(target)
}

/// Entries whose names would escape `target` make the whole archive invalid
fn unpack_zip(file: File, target: &Path) -> std::io::Result<()> {
    let invalid = |e: zip::result::ZipError| match e {
        zip::result::ZipError::Io(io) => io,
        other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
    };
    let mut zip = zip::ZipArchive::new(file).map_err(invalid)?;
    debug!(entries = zip.len(), "Unpacking zip archive");
    zip.extract(target).map_err(invalid)
}

/// Last path segment of `url` without a `.git` suffix
pub fn repository_name(url: &str) -> Result<String, SourceError> {
    let invalid = || SourceError::InvalidRepositoryUrl(url.to_string());
    let parsed = Url::parse(url).map_err(|_| invalid())?;
    let last = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .ok_or_else(invalid)?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() || name == "." || name == ".." {
        return Err(invalid());
    }
    Ok(name.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryOwner {
    pub user: String,
    pub avatar_url: String,
}

/// Owner of a GitHub repository URL (`https://github.com/<user>/<repo>`)
pub fn github_owner(url: &str) -> Option<RepositoryOwner> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    if host != "github.com" && !host.ends_with(".github.com") {
        return None;
    }
    let segments: Vec<&str> = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .collect();
    if segments.len() < 2 {
        return None;
    }
    let user = segments[0].to_string();
    Some(RepositoryOwner {
        avatar_url: format!("https://github.com/{}.png", user),
        user,
    })
}

/// Lower-cases `name` and keeps only `[a-z0-9._-]`
pub fn sanitize_image_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
        .collect();
    if cleaned.is_empty() {
        FALLBACK_IMAGE_NAME.to_string()
    } else {
        cleaned
    }
}

/// Shallow-clones `url` into `<work_dir>/<repository name>`, replacing any stale copy
pub async fn clone_repository(
    url: &str,
    work_dir: &Path,
    runner: &dyn CommandRunner,
) -> Result<PathBuf, SourceError> {
    let target = work_dir.join(repository_name(url)?);

    if target.exists() {
        debug!(target = %target.display(), "Removing stale clone");
        std::fs::remove_dir_all(&target).map_err(|source| SourceError::Io {
            path: target.clone(),
            source,
        })?;
    }
    std::fs::create_dir_all(work_dir).map_err(|source| SourceError::Io {
        path: work_dir.to_path_buf(),
        source,
    })?;

    let args = vec![
        "clone".to_string(),
        "--depth=1".to_string(),
        url.to_string(),
        target.display().to_string(),
    ];
    let output = runner
        .run(GIT_PROGRAM, &args, None)
        .await
        .map_err(SourceError::GitUnavailable)?;
    if !output.success {
        return Err(SourceError::CloneFailed {
            url: url.to_string(),
            stderr: output.stderr.trim().to_string(),
        });
    }

    info!(url, target = %target.display(), "Repository cloned");
    Ok(target)
}

/// Produces a local project directory for `source`
pub async fn stage(
    source: &ProjectSource,
    work_dir: &Path,
    runner: &dyn CommandRunner,
) -> Result<PathBuf, SourceError> {
    match source {
        ProjectSource::Directory(dir) => {
            if dir.is_dir() {
                Ok(dir.clone())
            } else {
                Err(SourceError::NotFound(dir.clone()))
            }
        }
        ProjectSource::Archive(archive) => unpack_archive(archive, work_dir),
        ProjectSource::Repository(url) => clone_repository(url, work_dir, runner).await,
    }
}
