//! Identifier implementations.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// A freshly allocated record identifier (32 lowercase hex characters, no hyphens).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RecordId(Uuid);

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordId {
    /// Generates a new random (v4) identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Source of fresh medication-row identifiers.
///
/// Implementations must never hand out the same value twice for the lifetime of the generator.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random canonical UUIDs. The production generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> String {
        RecordId::new().to_string()
    }
}

/// Predictable `<prefix>-<n>` identifiers, counting from 1.
///
/// Useful wherever output has to be reproducible, such as tests and CLI demos.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_renders_canonical_form() {
        let canonical = RecordId::new().to_string();

        assert_eq!(canonical.len(), 32);
        assert!(canonical
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
    }

    #[test]
    fn test_sequential_ids_count_from_one() {
        let ids = SequentialIds::new("med");
        assert_eq!(ids.next_id(), "med-1");
        assert_eq!(ids.next_id(), "med-2");
        assert_eq!(ids.next_id(), "med-3");
    }

    #[test]
    fn test_random_ids_do_not_repeat() {
        let ids = RandomIds;
        let seen: HashSet<String> = (0..100).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 100);
    }
}
