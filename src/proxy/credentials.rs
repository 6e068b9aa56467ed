//! Round-robin credential rotation
//!
//! The pool and its cursor live behind one mutex so `next` and `reset` are
//! atomic with respect to each other: a reset can never leave a cursor that
//! points past the end of a shorter pool.

use sha2::{Digest, Sha256};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Rotation {
    pool: Vec<String>,
    cursor: usize,
}

/// Hands out pooled credentials in round-robin order
#[derive(Debug, Default)]
pub struct CredentialRotator {
    state: Mutex<Rotation>,
}

impl CredentialRotator {
    pub fn new(pool: Vec<String>) -> Self {
        Self {
            state: Mutex::new(Rotation { pool, cursor: 0 }),
        }
    }

    // The critical sections never panic, so a poisoned lock still holds a
    // consistent rotation.
    fn lock(&self) -> MutexGuard<'_, Rotation> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Next credential, or `None` when the pool is empty
    pub fn next(&self) -> Option<String> {
        let mut state = self.lock();
        let credential = state.pool.get(state.cursor).cloned()?;
        state.cursor = (state.cursor + 1) % state.pool.len();
        Some(credential)
    }

    /// Replace the pool and restart from its first credential
    pub fn reset(&self, pool: Vec<String>) {
        *self.lock() = Rotation { pool, cursor: 0 };
    }

    pub fn len(&self) -> usize {
        self.lock().pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Short, non-reversible identifier for logging a credential
pub fn fingerprint(credential: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(credential.as_bytes());
    let hash = hasher.finalize();
    format!("{:x}", hash)[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn pool(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_full_cycle_in_pool_order_then_wraps() {
        let rotator = CredentialRotator::new(pool(&["a", "b", "c"]));
        let first_cycle: Vec<_> = (0..3).filter_map(|_| rotator.next()).collect();
        assert_eq!(first_cycle, vec!["a", "b", "c"]);
        assert_eq!(rotator.next().as_deref(), Some("a"));
    }

    #[test]
    fn test_single_credential_repeats() {
        let rotator = CredentialRotator::new(pool(&["only"]));
        assert_eq!(rotator.next().as_deref(), Some("only"));
        assert_eq!(rotator.next().as_deref(), Some("only"));
    }

    #[test]
    fn test_empty_pool_yields_none() {
        let rotator = CredentialRotator::new(Vec::new());
        assert!(rotator.is_empty());
        assert_eq!(rotator.next(), None);
        assert_eq!(rotator.next(), None);
    }

    #[test]
    fn test_reset_replaces_pool_and_cursor() {
        let rotator = CredentialRotator::new(pool(&["a", "b", "c"]));
        rotator.next();
        rotator.next();

        rotator.reset(pool(&["x", "y"]));
        assert_eq!(rotator.len(), 2);
        assert_eq!(rotator.next().as_deref(), Some("x"));
        assert_eq!(rotator.next().as_deref(), Some("y"));
        assert_eq!(rotator.next().as_deref(), Some("x"));

        rotator.reset(Vec::new());
        assert_eq!(rotator.next(), None);
    }

    #[test]
    fn test_reset_to_shorter_pool_mid_cycle() {
        let rotator = CredentialRotator::new(pool(&["a", "b", "c", "d"]));
        for _ in 0..3 {
            rotator.next();
        }
        rotator.reset(pool(&["z"]));
        assert_eq!(rotator.next().as_deref(), Some("z"));
    }

    #[test]
    fn test_concurrent_callers_share_the_cycle_evenly() {
        let rotator = Arc::new(CredentialRotator::new(pool(&["a", "b", "c", "d"])));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let rotator = Arc::clone(&rotator);
                std::thread::spawn(move || {
                    (0..100).filter_map(|_| rotator.next()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut counts: HashMap<String, usize> = HashMap::new();
        for handle in handles {
            for key in handle.join().unwrap() {
                *counts.entry(key).or_default() += 1;
            }
        }
        // 800 calls over 4 keys: no index handed out twice in a step
        assert_eq!(counts.len(), 4);
        assert!(counts.values().all(|&n| n == 200), "{counts:?}");
    }

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        assert_eq!(fingerprint("sk-a"), fingerprint("sk-a"));
        assert_ne!(fingerprint("sk-a"), fingerprint("sk-b"));
        assert_eq!(fingerprint("sk-a").len(), 12);
    }
}
