//! MIME type detection based on file extensions.
//!
//! Suffixes are stored in a prefix tree over `a`..=`z`. Anything outside
//! that alphabet is rejected on both insert and lookup, so `HTML`, `mp4`
//! and `tar.gz` never match.
//!
//! The index is built once at startup and only read afterwards; workers
//! share it through an `Arc` with no locking.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error)]
pub enum MimeError {
    #[error("failed to read MIME definitions from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Default)]
struct Node {
    children: [Option<Box<Node>>; 26],
    mime: Option<String>,
}

/// Suffix → MIME type prefix tree.
#[derive(Debug, Default)]
pub struct MimeIndex {
    root: Node,
    len: usize,
}

impl MimeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff every byte of `suffix` is a lowercase ASCII letter.
    /// The empty suffix is valid.
    pub fn is_valid_suffix(suffix: &str) -> bool {
        suffix.bytes().all(|b| b.is_ascii_lowercase())
    }

    /// Maps `suffix` to `mime`, replacing any earlier mapping.
    ///
    /// Returns false, leaving the index untouched, if the suffix is invalid.
    pub fn add(&mut self, suffix: &str, mime: &str) -> bool {
        if !Self::is_valid_suffix(suffix) {
            return false;
        }

        let mut node = &mut self.root;
        for b in suffix.bytes() {
            node = &mut **node.children[usize::from(b - b'a')].get_or_insert_with(Box::default);
        }
        if node.mime.replace(mime.to_string()).is_none() {
            self.len += 1;
        }
        true
    }

    /// Returns the type for `suffix` only when that exact suffix was added;
    /// a prefix of a longer suffix is not a hit.
    pub fn lookup(&self, suffix: &str) -> Option<&str> {
        if !Self::is_valid_suffix(suffix) {
            return None;
        }

        let mut node = &self.root;
        for b in suffix.bytes() {
            node = node.children[usize::from(b - b'a')].as_deref()?;
        }
        node.mime.as_deref()
    }

    pub fn contains(&self, suffix: &str) -> bool {
        self.lookup(suffix).is_some()
    }

    /// Number of suffixes with a type.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// MIME type for the suffix of `uri`, if it has one and it is known.
    pub fn uri_mime(&self, uri: &str) -> Option<&str> {
        uri_suffix(uri).and_then(|s| self.lookup(s))
    }

    /// Reads `<suffix> <type>` lines into the index.
    ///
    /// The line is split at its first space; the type is everything after
    /// it up to the line ending. Lines with no space or an invalid suffix
    /// are skipped.
    pub fn load<R: BufRead>(&mut self, reader: R) -> std::io::Result<usize> {
        let mut added = 0;
        for line in reader.lines() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            let Some((suffix, mime)) = line.split_once(' ') else {
                trace!(line = %line, "skipping MIME line without a space");
                continue;
            };
            if self.add(suffix, mime) {
                added += 1;
            } else {
                trace!(suffix = %suffix, "skipping invalid MIME suffix");
            }
        }
        Ok(added)
    }

    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<usize, MimeError> {
        let path = path.as_ref();
        let io_err = |source| MimeError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_err)?;
        let added = self.load(BufReader::new(file)).map_err(io_err)?;
        debug!(path = %path.display(), added, "loaded MIME definitions");
        Ok(added)
    }

    /// Builds an index from a definitions file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MimeError> {
        let mut index = Self::new();
        index.load_from_file(path)?;
        Ok(index)
    }
}

/// Everything after the last `.` in `uri`, or `None` if there is no dot.
///
/// ```
/// # use chttpd::http::mime::uri_suffix;
/// assert_eq!(uri_suffix("/a/b.tar.gz"), Some("gz"));
/// assert_eq!(uri_suffix("/a/b"), None);
/// ```
pub fn uri_suffix(uri: &str) -> Option<&str> {
    uri.rfind('.').map(|i| &uri[i + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_suffix_is_valid_and_storable() {
        let mut index = MimeIndex::new();
        assert!(MimeIndex::is_valid_suffix(""));
        assert!(index.add("", "application/x-empty"));
        assert_eq!(index.lookup(""), Some("application/x-empty"));
    }

    #[test]
    fn re_adding_replaces_without_growing() {
        let mut index = MimeIndex::new();
        index.add("txt", "text/plain");
        index.add("txt", "text/x-plain");
        assert_eq!(index.len(), 1);
        assert_eq!(index.lookup("txt"), Some("text/x-plain"));
    }
}
