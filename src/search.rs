use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::{Listing, PropertyType};

/// Listing search filters. Every field is optional and all present ones are ANDed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingFilters {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Minimum bedroom count
    pub bedrooms: Option<u32>,
    /// Minimum bathroom count
    pub bathrooms: Option<f32>,
    pub property_type: Option<PropertyType>,
    pub community_id: Option<String>,
}

impl ListingFilters {
    pub fn matches(&self, listing: &Listing) -> bool {
        self.min_price.map_or(true, |min| listing.price >= min)
            && self.max_price.map_or(true, |max| listing.price <= max)
            && self.bedrooms.map_or(true, |min| listing.bedrooms >= min)
            && self.bathrooms.map_or(true, |min| listing.bathrooms >= min)
            && self
                .property_type
                .map_or(true, |kind| listing.property_type == kind)
            && match self.community_id.as_deref() {
                None | Some("") => true,
                Some(id) => listing.community_id.as_deref() == Some(id),
            }
    }
}

/// Case-insensitive substring match over title, address and description.
/// A blank query matches everything.
pub fn matches_query(listing: &Listing, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    [&listing.title, &listing.address, &listing.description]
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
}

/// Listings matching both the free-text query and the filters, in input order
pub fn search_listings(listings: &[Listing], query: &str, filters: &ListingFilters) -> Vec<Listing> {
    listings
        .iter()
        .filter(|l| matches_query(l, query) && filters.matches(l))
        .cloned()
        .collect()
}

/// Named listing orderings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    SqftAsc,
    SqftDesc,
    BedroomsAsc,
    BedroomsDesc,
    Newest,
    Oldest,
}

impl SortKey {
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "price-asc" => SortKey::PriceAsc,
            "price-desc" => SortKey::PriceDesc,
            "sqft-asc" => SortKey::SqftAsc,
            "sqft-desc" => SortKey::SqftDesc,
            "bedrooms-asc" => SortKey::BedroomsAsc,
            "bedrooms-desc" => SortKey::BedroomsDesc,
            "newest" => SortKey::Newest,
            "oldest" => SortKey::Oldest,
            _ => return None,
        };
        Some(key)
    }

    pub fn name(self) -> &'static str {
        match self {
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::SqftAsc => "sqft-asc",
            SortKey::SqftDesc => "sqft-desc",
            SortKey::BedroomsAsc => "bedrooms-asc",
            SortKey::BedroomsDesc => "bedrooms-desc",
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
        }
    }

    fn compare(self, a: &Listing, b: &Listing) -> Ordering {
        match self {
            SortKey::PriceAsc => a.price.total_cmp(&b.price),
            SortKey::PriceDesc => b.price.total_cmp(&a.price),
            SortKey::SqftAsc => a.sqft.cmp(&b.sqft),
            SortKey::SqftDesc => b.sqft.cmp(&a.sqft),
            SortKey::BedroomsAsc => a.bedrooms.cmp(&b.bedrooms),
            SortKey::BedroomsDesc => b.bedrooms.cmp(&a.bedrooms),
            // undated listings sort after dated ones
            SortKey::Newest => b.created_at.cmp(&a.created_at),
            SortKey::Oldest => match (a.created_at, b.created_at) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

/// Stable sort by a named key. Unknown keys leave the order unchanged.
pub fn sort_listings(mut listings: Vec<Listing>, key: &str) -> Vec<Listing> {
    if let Some(key) = SortKey::from_name(key) {
        listings.sort_by(|a, b| key.compare(a, b));
    }
    listings
}
