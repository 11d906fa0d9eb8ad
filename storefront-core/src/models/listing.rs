//! Home-page listing slots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::product::{Banner, ProductSummary};
use crate::error::CoreError;

/// The fixed set of home-page listing slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingSlot {
    /// Hero banners.
    Banners,
    /// Best-selling products.
    BestSellers,
    /// Recently added products.
    NewArrivals,
    /// Unisex collection.
    Unisex,
}

impl ListingSlot {
    /// All slots, in display order.
    pub fn all() -> &'static [ListingSlot] {
        &[
            ListingSlot::Banners,
            ListingSlot::BestSellers,
            ListingSlot::NewArrivals,
            ListingSlot::Unisex,
        ]
    }

    /// Stable slot name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Banners => "banners",
            Self::BestSellers => "best_sellers",
            Self::NewArrivals => "new_arrivals",
            Self::Unisex => "unisex",
        }
    }

    /// Human-readable heading.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Banners => "Banners",
            Self::BestSellers => "Best Sellers",
            Self::NewArrivals => "New Arrivals",
            Self::Unisex => "Unisex",
        }
    }

    /// Returns an empty payload of the right kind for this slot.
    pub fn empty_payload(&self) -> ListingPayload {
        match self {
            Self::Banners => ListingPayload::Banners(Vec::new()),
            _ => ListingPayload::Products(Vec::new()),
        }
    }
}

impl fmt::Display for ListingSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingSlot {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|slot| slot.as_str() == wanted)
            .ok_or_else(|| CoreError::UnknownSlot(s.to_string()))
    }
}

/// The data held in one listing slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum ListingPayload {
    /// Banner rows.
    Banners(Vec<Banner>),
    /// Product rows.
    Products(Vec<ProductSummary>),
}

impl ListingPayload {
    /// Number of rows in the payload.
    pub fn len(&self) -> usize {
        match self {
            Self::Banners(b) => b.len(),
            Self::Products(p) => p.len(),
        }
    }

    /// Returns true if the payload has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the product rows, or an empty slice for banner payloads.
    pub fn products(&self) -> &[ProductSummary] {
        match self {
            Self::Products(p) => p,
            Self::Banners(_) => &[],
        }
    }

    /// Returns the banner rows, or an empty slice for product payloads.
    pub fn banners(&self) -> &[Banner] {
        match self {
            Self::Banners(b) => b,
            Self::Products(_) => &[],
        }
    }
}

/// Everything the home page renders, one field per slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeListings {
    /// Hero banners.
    pub banners: Vec<Banner>,
    /// Best sellers.
    pub best_sellers: Vec<ProductSummary>,
    /// New arrivals.
    pub new_arrivals: Vec<ProductSummary>,
    /// Unisex collection.
    pub unisex: Vec<ProductSummary>,
}

impl HomeListings {
    /// Places a slot payload into the matching field.
    ///
    /// A payload of the wrong kind for the slot leaves the field empty.
    pub fn set(&mut self, slot: ListingSlot, payload: ListingPayload) {
        match slot {
            ListingSlot::Banners => self.banners = payload.banners().to_vec(),
            ListingSlot::BestSellers => self.best_sellers = payload.products().to_vec(),
            ListingSlot::NewArrivals => self.new_arrivals = payload.products().to_vec(),
            ListingSlot::Unisex => self.unisex = payload.products().to_vec(),
        }
    }

    /// Returns the payload for one slot.
    pub fn get(&self, slot: ListingSlot) -> ListingPayload {
        match slot {
            ListingSlot::Banners => ListingPayload::Banners(self.banners.clone()),
            ListingSlot::BestSellers => ListingPayload::Products(self.best_sellers.clone()),
            ListingSlot::NewArrivals => ListingPayload::Products(self.new_arrivals.clone()),
            ListingSlot::Unisex => ListingPayload::Products(self.unisex.clone()),
        }
    }

    /// Returns true if every slot is empty.
    pub fn is_empty(&self) -> bool {
        ListingSlot::all().iter().all(|s| self.get(*s).is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_parsing() {
        assert_eq!("best-sellers".parse::<ListingSlot>().unwrap(), ListingSlot::BestSellers);
        assert_eq!("UNISEX".parse::<ListingSlot>().unwrap(), ListingSlot::Unisex);
        assert!("featured".parse::<ListingSlot>().is_err());
    }

    #[test]
    fn test_home_listings_slot_access() {
        let mut home = HomeListings::default();
        assert!(home.is_empty());

        let banner = Banner {
            id: 1,
            title: "Sale".to_string(),
            image: "https://cdn/b.jpg".to_string(),
            link: None,
        };
        home.set(ListingSlot::Banners, ListingPayload::Banners(vec![banner]));
        assert_eq!(home.get(ListingSlot::Banners).len(), 1);
        assert!(!home.is_empty());

        // Wrong payload kind for the slot.
        home.set(ListingSlot::Banners, ListingPayload::Products(vec![]));
        assert!(home.banners.is_empty());
    }
}
