use crate::kind::ErrorKind;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deduplication key for operator alerts: distinct (kind, message) pairs get
/// distinct fingerprints. Never persisted, never compared across restarts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn of(kind: ErrorKind, message: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        kind.as_str().hash(&mut hasher);
        message.hash(&mut hasher);
        Fingerprint(hasher.finish())
    }
}
