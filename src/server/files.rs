//! Mapping request URIs onto files under the served root.

use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::http::BODY_LENGTH;

const INDEX_FILE: &str = "index.html";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A file read for a response.
#[derive(Debug)]
pub struct StaticFile {
    pub path: PathBuf,
    /// At most the body capacity; longer files are cut short.
    pub contents: Vec<u8>,
    /// Size of the file on disk.
    pub len: u64,
}

impl StaticFile {
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    pub fn truncated(&self) -> bool {
        self.len > self.contents.len() as u64
    }
}

/// Joins the path part of `uri` onto `root`.
///
/// Query and fragment are dropped. Returns `None` for URIs that would leave
/// the root (`..`, absolute prefixes).
pub fn resolve_path(root: &Path, uri: &str) -> Option<PathBuf> {
    let path = uri.split(['?', '#']).next().unwrap_or_default();
    let relative = path.trim_start_matches('/');

    let mut resolved = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(resolved)
}

/// Opens and reads the file `uri` names under `root`.
///
/// A directory resolves to its `index.html`.
pub async fn read_resource(root: &Path, uri: &str) -> Result<StaticFile, ResolveError> {
    let not_found = || ResolveError::NotFound(uri.to_string());

    let mut path = resolve_path(root, uri).ok_or_else(not_found)?;
    let mut meta = tokio::fs::metadata(&path).await.map_err(|_| not_found())?;
    if meta.is_dir() {
        path.push(INDEX_FILE);
        meta = tokio::fs::metadata(&path).await.map_err(|_| not_found())?;
    }
    if !meta.is_file() {
        return Err(not_found());
    }

    let io_err = |source| ResolveError::Io {
        path: path.clone(),
        source,
    };
    let file = File::open(&path).await.map_err(io_err)?;
    let mut contents = Vec::with_capacity((meta.len() as usize).min(BODY_LENGTH));
    file.take(BODY_LENGTH as u64)
        .read_to_end(&mut contents)
        .await
        .map_err(io_err)?;

    Ok(StaticFile {
        path,
        contents,
        len: meta.len(),
    })
}
