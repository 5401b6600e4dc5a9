use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

mod admin;

pub use admin::{AdminUser, Capability, LoginResponse, NewAdminUser, Role};

/// Binds an entity family to its REST endpoint and local storage key
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Admin-scoped collection path, e.g. `/communities`
    const ENDPOINT: &'static str;
    /// Unauthenticated read-only mirror, when the API exposes one
    const PUBLIC_ENDPOINT: Option<&'static str>;
    /// Key of the JSON array in the local persistent store
    const STORAGE_KEY: &'static str;
    /// Human-readable family name used in logs
    const LABEL: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn set_created_at(&mut self, at: DateTime<Utc>);

    /// Identifier to use when a record is saved locally without one
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Checked before every write. The error text is shown to the caller.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Read an explicit JSON `null` the same way as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn check_price(price: f64) -> Result<(), String> {
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(format!("price must be a positive number, got {price}"))
    }
}

/// Kind of home a listing or property is
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    #[default]
    #[serde(alias = "house")]
    House,
    #[serde(alias = "townhome")]
    Townhome,
    #[serde(alias = "condo")]
    Condo,
    #[serde(alias = "apartment")]
    Apartment,
}

/// Sales status of a listing or property
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    #[default]
    #[serde(alias = "available")]
    Available,
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "sold")]
    Sold,
}

/// A home builder active in a community
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Builder {
    pub name: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub website: Option<String>,
}

/// A floor plan offered in a community
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct HomeModel {
    pub name: String,
    pub price: Option<String>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f32>,
    pub sqft: Option<u32>,
    pub image: Option<String>,
}

/// Per-community styling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Theme {
    pub primary_color: String,
    pub button_radius: String,
    pub card_radius: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_color: "#2563eb".to_string(),
            button_radius: "8px".to_string(),
            card_radius: "12px".to_string(),
        }
    }
}

/// Visibility and copy for one section of a community page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Section {
    pub visible: bool,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub content: Option<String>,
}

impl Default for Section {
    fn default() -> Self {
        Self {
            visible: true,
            title: None,
            subtitle: None,
            content: None,
        }
    }
}

/// Page sections keyed by name (`hero`, `amenities`, `builders`, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Sections(pub BTreeMap<String, Section>);

impl Sections {
    /// Sections without an entry are shown
    pub fn is_visible(&self, name: &str) -> bool {
        self.0.get(name).map(|s| s.visible).unwrap_or(true)
    }

    pub fn get(&self, name: &str) -> Option<&Section> {
        self.0.get(name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct School {
    pub name: String,
    #[serde(rename = "type")]
    pub level: Option<String>,
    pub distance: Option<String>,
    pub rating: Option<f32>,
}

/// A master-planned community and everything embedded in it
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Community {
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub price_range: String,
    #[serde(deserialize_with = "null_as_default")]
    pub amenities: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub builders: Vec<Builder>,
    #[serde(deserialize_with = "null_as_default")]
    pub homes: Vec<HomeModel>,
    #[serde(deserialize_with = "null_as_default")]
    pub theme: Theme,
    #[serde(deserialize_with = "null_as_default")]
    pub sections: Sections,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schools: Option<Vec<School>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Community {
    const ENDPOINT: &'static str = "/communities";
    const PUBLIC_ENDPOINT: Option<&'static str> = Some("/public/communities");
    const STORAGE_KEY: &'static str = "communities";
    const LABEL: &'static str = "community";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = Some(at);
    }

    /// Communities are addressed by a slug of their name
    fn generate_id(&self) -> String {
        let slug = slugify(&self.name);
        if slug.is_empty() {
            uuid::Uuid::new_v4().to_string()
        } else {
            slug
        }
    }
}

/// A home for sale, optionally inside a community
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Listing {
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub price: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bedrooms: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub bathrooms: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub sqft: u32,
    pub community_id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub property_type: PropertyType,
    #[serde(deserialize_with = "null_as_default")]
    pub status: ListingStatus,
    #[serde(deserialize_with = "null_as_default")]
    pub features: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Listing {
    const ENDPOINT: &'static str = "/listings";
    const PUBLIC_ENDPOINT: Option<&'static str> = Some("/public/listings");
    const STORAGE_KEY: &'static str = "listings";
    const LABEL: &'static str = "listing";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = Some(at);
    }

    fn validate(&self) -> Result<(), String> {
        check_price(self.price)
    }
}

/// Standalone property record managed from the admin panel
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Property {
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    pub city: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub price: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub bedrooms: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub bathrooms: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub sqft: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub property_type: PropertyType,
    #[serde(deserialize_with = "null_as_default")]
    pub status: ListingStatus,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub features: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Property {
    const ENDPOINT: &'static str = "/properties";
    const PUBLIC_ENDPOINT: Option<&'static str> = None;
    const STORAGE_KEY: &'static str = "properties";
    const LABEL: &'static str = "property";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = Some(at);
    }

    fn validate(&self) -> Result<(), String> {
        check_price(self.price)
    }
}

/// Contact form submission
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub listing_id: Option<String>,
    pub community_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Contact {
    const ENDPOINT: &'static str = "/contacts";
    // submissions go to /public/contacts, but reads are admin-only
    const PUBLIC_ENDPOINT: Option<&'static str> = None;
    const STORAGE_KEY: &'static str = "contacts";
    const LABEL: &'static str = "contact";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = Some(at);
    }
}

/// Lower-case, dash-separated identifier derived from a display name
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enums_accept_both_casings_and_write_upper_case() {
        let listing: Listing = serde_json::from_value(json!({
            "id": "l1",
            "propertyType": "condo",
            "status": "PENDING",
        }))
        .unwrap();
        assert_eq!(listing.property_type, PropertyType::Condo);
        assert_eq!(listing.status, ListingStatus::Pending);

        let value = serde_json::to_value(&listing).unwrap();
        assert_eq!(value["propertyType"], "CONDO");
        assert_eq!(value["status"], "PENDING");
    }

    #[test]
    fn unassigned_listing_has_no_community() {
        let listing: Listing = serde_json::from_value(json!({
            "id": "l2",
            "title": "Lot 4",
            "price": 250000,
            "communityId": null,
        }))
        .unwrap();
        assert!(listing.community_id.is_none());
        assert_eq!(listing.property_type, PropertyType::House);
    }

    #[test]
    fn community_parses_embedded_records() {
        let community: Community = serde_json::from_value(json!({
            "id": "riverstone",
            "name": "Riverstone",
            "priceRange": "$400K - $800K",
            "builders": [{ "name": "Perry Homes" }],
            "homes": [{ "name": "The Aspen", "bedrooms": 4 }],
            "theme": { "primaryColor": "#0f766e", "buttonRadius": "4px", "cardRadius": "16px" },
            "sections": { "schools": { "visible": false, "title": "Schools" } },
        }))
        .unwrap();
        assert_eq!(community.builders.len(), 1);
        assert_eq!(community.homes[0].bedrooms, Some(4));
        assert_eq!(community.theme.primary_color, "#0f766e");
        assert!(!community.sections.is_visible("schools"));
        assert!(community.sections.is_visible("hero"));
    }

    #[test]
    fn community_ids_are_slugs() {
        assert_eq!(slugify("Riverstone Ranch"), "riverstone-ranch");
        assert_eq!(slugify("  The Woodlands, TX "), "the-woodlands-tx");
        let community = Community {
            name: "Cinco Ranch".to_string(),
            ..Default::default()
        };
        assert_eq!(community.generate_id(), "cinco-ranch");
    }

    #[test]
    fn nullable_columns_read_as_defaults() {
        let community: Community = serde_json::from_value(json!({
            "id": "riverstone",
            "name": "Riverstone",
            "location": null,
            "description": null,
            "priceRange": null,
            "amenities": null,
            "theme": null,
            "sections": null,
            "schools": null,
        }))
        .unwrap();
        assert_eq!(community.description, "");
        assert_eq!(community.theme, Theme::default());
        assert!(community.sections.is_visible("hero"));

        let listing: Listing = serde_json::from_value(json!({
            "id": "l3",
            "title": "Model home",
            "price": 399999.99,
            "address": null,
            "sqft": null,
            "images": null,
        }))
        .unwrap();
        assert_eq!(listing.price, 399_999.99);
        assert_eq!(listing.sqft, 0);
        assert!(listing.images.is_empty());
    }

    #[test]
    fn prices_must_be_positive() {
        let mut listing = Listing {
            price: 485_000.0,
            ..Default::default()
        };
        assert!(listing.validate().is_ok());

        for bad in [0.0, -1.0, f64::NAN] {
            listing.price = bad;
            assert!(listing.validate().is_err(), "{bad} accepted");
        }
        assert!(Property::default().validate().is_err());
        assert!(Community::default().validate().is_ok());
    }
}
