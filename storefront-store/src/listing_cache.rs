//! Time-boxed cache of the home page listings.
//!
//! One generation of listings shares one fetch timestamp and is valid for
//! [`LISTING_TTL`] after it. Once a generation expires, every slot reads as
//! absent until a complete new generation has been written.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use storefront_core::{HomeListings, ListingPayload, ListingSlot};
use tracing::{debug, info};

use crate::kv::{KeyValueStore, keys};
use crate::persistent::{Persisted, PersistentStore};

/// How long a generation stays valid.
pub const LISTING_TTL: Duration = Duration::minutes(5);

/// One persisted cache generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSnapshot {
    slots: BTreeMap<ListingSlot, ListingPayload>,
    fetched_at: Option<DateTime<Utc>>,
    started_at: Option<DateTime<Utc>>,
}

impl ListingSnapshot {
    /// When the current generation was completed.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Returns true if a complete generation exists and is younger than
    /// the TTL at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.fetched_at.is_some_and(|at| within_ttl(at, now))
    }

    /// Slot contents, honoring validity at `now`.
    pub fn slot_at(&self, slot: ListingSlot, now: DateTime<Utc>) -> Option<&ListingPayload> {
        if self.is_valid_at(now) {
            self.slots.get(&slot)
        } else {
            None
        }
    }

    /// Writes one slot.
    ///
    /// Writing into an expired generation discards it first, as does
    /// writing into a partial generation whose first slot is older than the
    /// TTL. Once every slot is present the generation is stamped with the
    /// time of its first write, so no slot is ever served past the TTL.
    pub fn set_slot_at(&mut self, slot: ListingSlot, payload: ListingPayload, now: DateTime<Utc>) {
        let expired = match (self.fetched_at, self.started_at) {
            (Some(_), _) => !self.is_valid_at(now),
            (None, Some(started)) => !within_ttl(started, now),
            (None, None) => false,
        };
        if expired {
            debug!("Listing generation expired, starting a new one");
            self.slots.clear();
            self.fetched_at = None;
            self.started_at = None;
        }

        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
        self.slots.insert(slot, payload);

        if self.fetched_at.is_none() && ListingSlot::all().iter().all(|s| self.slots.contains_key(s)) {
            self.fetched_at = self.started_at;
        }
    }

    /// Writes a complete generation stamped at `now`.
    pub fn store_all_at(&mut self, listings: &HomeListings, now: DateTime<Utc>) {
        self.slots = ListingSlot::all()
            .iter()
            .map(|slot| (*slot, listings.get(*slot)))
            .collect();
        self.fetched_at = Some(now);
        self.started_at = Some(now);
    }

    /// Every slot regardless of validity, empty where absent.
    pub fn listings(&self) -> HomeListings {
        let mut listings = HomeListings::default();
        for (slot, payload) in &self.slots {
            listings.set(*slot, payload.clone());
        }
        listings
    }

    fn payload_kinds_match(&self) -> bool {
        self.slots.iter().all(|(slot, payload)| {
            std::mem::discriminant(payload) == std::mem::discriminant(&slot.empty_payload())
        })
    }
}

fn within_ttl(at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let age = now - at;
    age >= Duration::zero() && age < LISTING_TTL
}

impl Persisted for ListingSnapshot {
    fn is_well_formed(&self) -> bool {
        self.payload_kinds_match()
    }
}

/// Home listing cache.
#[derive(Debug)]
pub struct ListingCache {
    state: PersistentStore<ListingSnapshot>,
}

impl ListingCache {
    /// Opens the cache persisted in `kv`.
    pub fn open(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            state: PersistentStore::open(kv, keys::HOME_CACHE),
        }
    }

    /// Slot contents if the cache is valid.
    pub fn get_slot(&self, slot: ListingSlot) -> Option<ListingPayload> {
        let now = Utc::now();
        self.state.read(|s| s.slot_at(slot, now).cloned())
    }

    /// Writes one slot of the current generation.
    pub fn set_slot(&self, slot: ListingSlot, payload: ListingPayload) {
        self.set_slot_at(slot, payload, Utc::now());
    }

    /// Writes one slot as of `now`.
    pub fn set_slot_at(&self, slot: ListingSlot, payload: ListingPayload, now: DateTime<Utc>) {
        let rows = payload.len();
        self.state.update(|s| {
            s.set_slot_at(slot, payload, now);
            true
        });
        debug!(slot = %slot, rows, "Cached listing slot");
    }

    /// Replaces the cache with a complete, freshly fetched generation.
    pub fn store_all(&self, listings: &HomeListings) {
        let now = Utc::now();
        self.state.update(|s| {
            s.store_all_at(listings, now);
            true
        });
        info!("Cached home listings");
    }

    /// Returns true if the cache holds a generation younger than the TTL.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Validity at an arbitrary instant.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.state.read(|s| s.is_valid_at(now))
    }

    /// Age of the current generation.
    pub fn age(&self) -> Option<Duration> {
        self.state.read(|s| s.fetched_at.map(|at| Utc::now() - at))
    }

    /// All four listings if the cache is valid.
    pub fn listings(&self) -> Option<HomeListings> {
        let now = Utc::now();
        self.state
            .read(|s| s.is_valid_at(now).then(|| s.listings()))
    }

    /// Whatever was cached last, even if expired.
    pub fn last_known(&self) -> HomeListings {
        self.state.read(ListingSnapshot::listings)
    }

    /// Discards the cache so the next read misses.
    pub fn invalidate(&self) {
        self.state.reset();
        info!("Listing cache invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;

    fn empty_generation(at: DateTime<Utc>) -> ListingSnapshot {
        let mut snapshot = ListingSnapshot::default();
        for slot in ListingSlot::all() {
            snapshot.set_slot_at(*slot, slot.empty_payload(), at);
        }
        snapshot
    }

    #[test]
    fn test_partial_generation_is_not_valid() {
        let now = Utc::now();
        let mut snapshot = ListingSnapshot::default();
        snapshot.set_slot_at(ListingSlot::Banners, ListingPayload::Banners(Vec::new()), now);

        assert!(!snapshot.is_valid_at(now));
        assert_eq!(snapshot.fetched_at(), None);
    }

    #[test]
    fn test_generation_is_stamped_with_its_oldest_slot() {
        let start = Utc::now();
        let mut snapshot = ListingSnapshot::default();
        snapshot.set_slot_at(ListingSlot::Banners, ListingPayload::Banners(Vec::new()), start);

        let later = start + Duration::minutes(3);
        for slot in &ListingSlot::all()[1..] {
            snapshot.set_slot_at(*slot, slot.empty_payload(), later);
        }

        assert_eq!(snapshot.fetched_at(), Some(start));
        assert!(snapshot.is_valid_at(later));
        assert!(!snapshot.is_valid_at(start + LISTING_TTL));
        assert!(snapshot.slot_at(ListingSlot::Banners, start + LISTING_TTL).is_none());
    }

    #[test]
    fn test_stale_partial_generation_is_discarded() {
        let now = Utc::now();
        let mut snapshot = ListingSnapshot::default();
        snapshot.set_slot_at(
            ListingSlot::Banners,
            ListingPayload::Banners(Vec::new()),
            now - Duration::hours(2),
        );

        for slot in &ListingSlot::all()[1..] {
            snapshot.set_slot_at(*slot, slot.empty_payload(), now);
        }

        assert!(!snapshot.is_valid_at(now));
        assert_eq!(snapshot.fetched_at(), None);
        assert!(snapshot.slot_at(ListingSlot::Banners, now).is_none());
        assert!(!snapshot.slots.contains_key(&ListingSlot::Banners));
        assert_eq!(snapshot.slots.len(), 3);
    }

    #[test]
    fn test_complete_generation_expires_after_ttl() {
        let start = Utc::now();
        let snapshot = empty_generation(start);

        assert!(snapshot.is_valid_at(start));
        assert!(snapshot.is_valid_at(start + Duration::minutes(4)));
        assert!(!snapshot.is_valid_at(start + LISTING_TTL));
        assert!(snapshot.slot_at(ListingSlot::Unisex, start + LISTING_TTL).is_none());
    }

    #[test]
    fn test_write_into_expired_generation_starts_over() {
        let start = Utc::now();
        let mut snapshot = empty_generation(start);
        let later = start + Duration::minutes(10);

        snapshot.set_slot_at(ListingSlot::Unisex, ListingPayload::Products(Vec::new()), later);

        assert_eq!(snapshot.fetched_at(), None);
        assert!(snapshot.slot_at(ListingSlot::Unisex, later).is_none());
        assert_eq!(snapshot.slots.len(), 1);
    }

    #[test]
    fn test_refresh_within_ttl_keeps_timestamp() {
        let start = Utc::now();
        let mut snapshot = empty_generation(start);

        snapshot.set_slot_at(ListingSlot::Banners, ListingPayload::Banners(Vec::new()), start + Duration::minutes(1));
        assert_eq!(snapshot.fetched_at(), Some(start));
    }

    #[test]
    fn test_mismatched_payload_is_malformed() {
        let mut snapshot = ListingSnapshot::default();
        snapshot.slots.insert(ListingSlot::Banners, ListingPayload::Products(Vec::new()));
        assert!(!snapshot.is_well_formed());
    }

    #[test]
    fn test_invalidate_then_get_slot() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let cache = ListingCache::open(kv.clone());
        cache.store_all(&HomeListings::default());
        assert!(cache.is_valid());
        assert!(cache.get_slot(ListingSlot::BestSellers).is_some());

        cache.invalidate();

        assert!(!cache.is_valid());
        assert!(cache.get_slot(ListingSlot::BestSellers).is_none());
        assert!(cache.age().is_none());
        assert_eq!(kv.get(keys::HOME_CACHE).unwrap(), None);
    }

    #[test]
    fn test_generation_survives_reopen() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        ListingCache::open(kv.clone()).store_all(&HomeListings::default());

        let reopened = ListingCache::open(kv);
        assert!(reopened.is_valid());
        assert!(reopened.listings().is_some());
    }
}
