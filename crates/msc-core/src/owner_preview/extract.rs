use std::collections::HashSet;

use crate::ids::OwnerId;

/// Separators accepted in addition to whitespace.
pub const DEFAULT_SEPARATORS: &[char] = &[',', ';'];

/// Ordered, duplicate-free list of owner identifiers.
///
/// Order follows first occurrence in the raw input. Built only by
/// [`IdentifierExtractor::extract`] (or [`IdentifierList::from_iter`] in tests and
/// callers that already hold clean ids, which still deduplicates).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierList(Vec<OwnerId>);

impl IdentifierList {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OwnerId> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[OwnerId] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<OwnerId> {
        self.0
    }
}

impl<S: Into<OwnerId>> FromIterator<S> for IdentifierList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for id in iter {
            let id = id.into();
            if id.as_str().trim().is_empty() {
                continue;
            }
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }
        Self(ids)
    }
}

impl<'a> IntoIterator for &'a IdentifierList {
    type Item = &'a OwnerId;
    type IntoIter = std::slice::Iter<'a, OwnerId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Splits free-form operator input into owner identifiers.
///
/// Tokens are separated by any whitespace (newlines included) and by the
/// configured separator characters. Extraction never fails: malformed input just
/// yields fewer identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierExtractor {
    separators: Vec<char>,
}

impl IdentifierExtractor {
    pub fn new(separators: impl IntoIterator<Item = char>) -> Self {
        Self {
            separators: separators.into_iter().collect(),
        }
    }

    pub fn separators(&self) -> &[char] {
        &self.separators
    }

    pub fn extract(&self, raw: &str) -> IdentifierList {
        raw.split(|c: char| c.is_whitespace() || self.separators.contains(&c))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect()
    }
}

impl Default for IdentifierExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATORS.iter().copied())
    }
}

/// Extract owner ids using the default separators.
pub fn extract_owner_ids(raw: &str) -> IdentifierList {
    IdentifierExtractor::default().extract(raw)
}
