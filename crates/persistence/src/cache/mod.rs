//! Short-lived cache for challenge lookups
//!
//! Challenge records change rarely (participant counts move on join/leave),
//! so reads go through a small TTL cache. The backend stays authoritative:
//! entries expire quickly and joins/leaves invalidate eagerly.

use habitleague_core::Challenge;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

const DEFAULT_TTL: Duration = Duration::from_secs(30);
const DEFAULT_CAPACITY: usize = 500;

struct Entry {
    challenge: Challenge,
    expires_at: Instant,
}

/// Thread-safe TTL cache keyed by challenge id
pub struct ChallengeCache {
    entries: RwLock<HashMap<i64, Entry>>,
    ttl: Duration,
    capacity: usize,
}

impl ChallengeCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    /// Return a live copy of the cached challenge, or `None` if it is
    /// absent or expired
    pub fn get(&self, id: i64) -> Option<Challenge> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(&id)?;
        (entry.expires_at > Instant::now()).then(|| entry.challenge.clone())
    }

    /// Insert or refresh a challenge.
    ///
    /// At capacity, expired entries are purged first; if the map is still
    /// full, the entry closest to expiry is evicted.
    pub fn insert(&self, challenge: Challenge) {
        let Ok(mut entries) = self.entries.write() else {
            return;
        };

        let now = Instant::now();
        if entries.len() >= self.capacity {
            entries.retain(|_, entry| entry.expires_at > now);
        }
        if entries.len() >= self.capacity {
            let next_to_expire = entries
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(id, _)| *id);
            if let Some(id) = next_to_expire {
                entries.remove(&id);
            }
        }

        entries.insert(
            challenge.id,
            Entry {
                challenge,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Drop one entry early, e.g. after joining changes its participant count
    pub fn invalidate(&self, id: i64) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(&id);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ChallengeCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use habitleague_core::{ChallengeCategory, ChallengeStatus};

    fn sample_challenge(id: i64) -> Challenge {
        Challenge {
            id,
            name: format!("Challenge {}", id),
            description: String::new(),
            category: ChallengeCategory::Fitness,
            image_url: None,
            rules: String::new(),
            duration_days: 21,
            entry_fee: 25.0,
            featured: false,
            participant_count: 0,
            start_date: None,
            end_date: None,
            status: ChallengeStatus::Ongoing,
            creator_name: None,
            creator_email: None,
            location: None,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let cache = ChallengeCache::default();
        cache.insert(sample_challenge(1));

        assert_eq!(cache.get(1).unwrap().name, "Challenge 1");
        assert!(cache.get(2).is_none());
    }

    #[test]
    fn test_expired_entry_is_not_returned() {
        let cache = ChallengeCache::new(Duration::from_millis(0));
        cache.insert(sample_challenge(1));

        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get(1).is_none());
    }

    #[test]
    fn test_invalidate_drops_the_entry() {
        let cache = ChallengeCache::default();
        cache.insert(sample_challenge(1));
        cache.invalidate(1);
        assert!(cache.get(1).is_none());
    }

    #[test]
    fn test_at_capacity_the_entry_closest_to_expiry_is_evicted() {
        let cache = ChallengeCache::with_capacity(Duration::from_secs(60), 2);
        cache.insert(sample_challenge(1));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert(sample_challenge(2));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert(sample_challenge(3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(1).is_none());
        assert!(cache.get(3).is_some());
    }
}
