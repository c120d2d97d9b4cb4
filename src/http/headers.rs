//! Ordered header storage for requests and responses.
//!
//! Keys are compared byte-for-byte, so `Content-Type` and `content-type` are
//! different headers. Duplicate keys are kept; lookups return the first one
//! inserted. Nothing is ever removed for the life of a message.

use crate::http::{truncate_str, HEADER_KEY_LENGTH, HEADER_VALUE_LENGTH};

/// A single header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub key: String,
    pub value: String,
}

/// An ordered, growable set of header/value pairs.
///
/// Storage starts with room for one header and doubles whenever it is full,
/// so after `n` inserts [`HeaderSet::capacity`] is the smallest power of two
/// that is at least `n`. Growing may move every entry; borrow through
/// [`HeaderSet::get`] again after an [`HeaderSet::add`] rather than holding
/// on to references across it (the borrow checker enforces this anyway).
#[derive(Debug, Clone)]
pub struct HeaderSet {
    entries: Vec<Header>,
    size: usize,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(1),
            size: 1,
        }
    }

    /// Appends a header. Keys longer than 64 bytes and values longer than
    /// 4096 bytes are truncated to fit; this never fails.
    pub fn add(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) {
        self.grow_if_full();
        self.entries.push(Header {
            key: truncate_str(key.as_ref(), HEADER_KEY_LENGTH).to_string(),
            value: truncate_str(value.as_ref(), HEADER_VALUE_LENGTH).to_string(),
        });
    }

    /// Appends a header whose key and value were already bounded in wire
    /// bytes by the parser. Lossy decoding can make them longer than the
    /// string bounds, and that must not cut them again.
    pub(crate) fn add_unbounded(&mut self, key: String, value: String) {
        self.grow_if_full();
        self.entries.push(Header { key, value });
    }

    fn grow_if_full(&mut self) {
        if self.entries.len() >= self.size {
            self.size *= 2;
            self.entries.reserve_exact(self.size - self.entries.len());
        }
    }

    /// Returns the value of the first header whose key matches exactly.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|h| h.key == key)
            .map(|h| h.value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of slots currently reserved.
    pub fn capacity(&self) -> usize {
        self.size
    }

    /// Iterates headers in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Header> {
        self.entries.iter()
    }
}

impl Default for HeaderSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for HeaderSet {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for HeaderSet {}

impl<'a> IntoIterator for &'a HeaderSet {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for HeaderSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = HeaderSet::new();
        for (k, v) in iter {
            set.add(k, v);
        }
        set
    }
}
