//! Per-stop, per-field validation error lookup.

use std::collections::HashMap;

/// Validation errors reported by a failed commit, bound to stop positions and
/// field paths for inline display.
///
/// The transport reports a flat map keyed `stops.{index}.{path}` (e.g.
/// `stops.1.facility.name`). Keys are split into `(index, path)` once at
/// construction; [`error_for`](FieldErrors::error_for) is then an exact
/// lookup, with no prefix or wildcard matching. Each commit attempt replaces
/// the whole set; nothing accumulates across attempts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: HashMap<(usize, String), String>,
}

impl FieldErrors {
    /// An empty error set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Bind a flat `stops.{index}.{path}` error map.
    ///
    /// Keys that do not match that shape are ignored: they belong to other
    /// parts of the request and have nowhere to surface here.
    pub fn from_flat(flat: &HashMap<String, String>) -> Self {
        let entries = flat
            .iter()
            .filter_map(|(key, message)| {
                let (index, path) = parse_key(key)?;
                Some(((index, path), message.clone()))
            })
            .collect();
        Self { entries }
    }

    /// Build an error set from explicit `(index, path, message)` entries.
    pub fn from_entries<P, M>(entries: impl IntoIterator<Item = (usize, P, M)>) -> Self
    where
        P: Into<String>,
        M: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(index, path, message)| ((index, path.into()), message.into()))
                .collect(),
        }
    }

    /// Look up the message for a stop index and exact field path.
    pub fn error_for(&self, index: usize, path: &str) -> Option<&str> {
        self.entries
            .get(&(index, path.to_string()))
            .map(String::as_str)
    }

    /// All messages bound to one stop, as `path → message`.
    pub fn for_stop(&self, index: usize) -> HashMap<&str, &str> {
        self.entries
            .iter()
            .filter(|((i, _), _)| *i == index)
            .map(|((_, path), message)| (path.as_str(), message.as_str()))
            .collect()
    }

    /// Whether any errors are bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of bound errors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drop all bound errors.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Split `stops.{index}.{path}` into its parts.
fn parse_key(key: &str) -> Option<(usize, String)> {
    let rest = key.strip_prefix("stops.")?;
    let (index, path) = rest.split_once('.')?;
    if path.is_empty() {
        return None;
    }
    Some((index.parse().ok()?, path.to_string()))
}
