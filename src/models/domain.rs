use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Guest count assumed when the request names none
pub const DEFAULT_GUEST_COUNT: u32 = 1;

/// Maximum number of features shown on a venue card
pub const MAX_DISPLAY_FEATURES: usize = 8;

/// Resolved venue search filters
///
/// Unknown or empty values are omitted rather than stored empty, so a
/// serialized `Filters` only carries the constraints that were understood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default = "default_guest_count")]
    pub guest_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_guest_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub features: BTreeSet<String>,
}

fn default_guest_count() -> u32 { DEFAULT_GUEST_COUNT }

impl Default for Filters {
    fn default() -> Self {
        Self {
            city: None,
            district: None,
            date: None,
            guest_count: DEFAULT_GUEST_COUNT,
            price_per_guest_max: None,
            cuisine: None,
            features: BTreeSet::new(),
        }
    }
}

impl Filters {
    /// Guest count as a matching constraint; the default count is not one
    ///
    /// A count of 1 cannot be told apart from the default, so an explicit
    /// "1 guest" also adds no capacity band, cross-check or ranking distance.
    pub fn requested_guests(&self) -> Option<u32> {
        (self.guest_count > DEFAULT_GUEST_COUNT).then_some(self.guest_count)
    }
}

/// Filters produced by a single extractor before merging
///
/// Every field is optional; `FilterResolver` decides which source wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialFilters {
    pub city: Option<String>,
    pub district: Option<String>,
    pub date: Option<String>,
    pub guest_count: Option<u32>,
    pub price_per_guest_max: Option<f64>,
    pub cuisine: Option<String>,
    pub features: BTreeSet<String>,
}

/// Photo and media block of a venue document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VenueMedia {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub photos: Vec<Value>,
}

/// Venue document as stored in the venues collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VenueRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "$id", default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default, deserialize_with = "whole_count")]
    pub capacity_min: Option<u32>,
    #[serde(default, deserialize_with = "whole_count")]
    pub capacity_max: Option<u32>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cuisine: Vec<String>,
    #[serde(default)]
    pub price_per_person_azn_from: Option<f64>,
    #[serde(default)]
    pub price_per_person_azn_to: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub facilities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub services: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub media: Option<VenueMedia>,
    #[serde(default)]
    pub base_rental_fee_azn: Option<f64>,
}

/// Missing and `null` arrays both decode as empty
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Capacity counts may arrive as integral floats (`40.0`)
fn whole_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<f64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(v) if v.is_finite() && v.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&v) => {
            Ok(Some(v as u32))
        }
        Some(v) => Err(D::Error::custom(format!("not a whole count: {}", v))),
    }
}

impl VenueRecord {
    /// Union of facilities, services and tags
    pub fn feature_union(&self) -> BTreeSet<&str> {
        self.facilities
            .iter()
            .chain(&self.services)
            .chain(&self.tags)
            .map(String::as_str)
            .collect()
    }

    /// Derive the read-only display venue from this document
    pub fn into_venue(self) -> Venue {
        let features = self
            .feature_union()
            .into_iter()
            .take(MAX_DISPLAY_FEATURES)
            .map(str::to_string)
            .collect();

        let cover = self
            .media
            .and_then(|m| m.photos.into_iter().next());

        Venue {
            id: self.id.or(self.document_id).unwrap_or_default(),
            name: self.name,
            district: self.district,
            capacity: [self.capacity_min, self.capacity_max],
            price_per_guest: [self.price_per_person_azn_from, self.price_per_person_azn_to],
            features,
            cuisine: self.cuisine,
            cover,
            base_rental_fee_azn: self.base_rental_fee_azn,
        }
    }
}

/// Venue card returned in a shortlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: String,
    pub name: Option<String>,
    pub district: Option<String>,
    pub capacity: [Option<u32>; 2],
    pub price_per_guest: [Option<f64>; 2],
    pub features: Vec<String>,
    pub cuisine: Vec<String>,
    pub cover: Option<Value>,
    pub base_rental_fee_azn: Option<f64>,
}

/// Intent classes understood by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    VenueSearch,
    VendorQuestion,
    BookingPayment,
    PricingMenu,
    PolicyRules,
    Logistics,
    AboutService,
    SmalltalkInScope,
    OffTopic,
}

impl IntentKind {
    pub const ALL: [IntentKind; 9] = [
        IntentKind::VenueSearch,
        IntentKind::VendorQuestion,
        IntentKind::BookingPayment,
        IntentKind::PricingMenu,
        IntentKind::PolicyRules,
        IntentKind::Logistics,
        IntentKind::AboutService,
        IntentKind::SmalltalkInScope,
        IntentKind::OffTopic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IntentKind::VenueSearch => "venue_search",
            IntentKind::VendorQuestion => "vendor_question",
            IntentKind::BookingPayment => "booking_payment",
            IntentKind::PricingMenu => "pricing_menu",
            IntentKind::PolicyRules => "policy_rules",
            IntentKind::Logistics => "logistics",
            IntentKind::AboutService => "about_service",
            IntentKind::SmalltalkInScope => "smalltalk_in_scope",
            IntentKind::OffTopic => "off_topic",
        }
    }
}

/// Classified intent with confidence in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(rename = "intent")]
    pub kind: IntentKind,
    pub confidence: f64,
}

impl Intent {
    /// Fail-closed default used whenever classification is unavailable
    pub fn off_topic() -> Self {
        Self {
            kind: IntentKind::OffTopic,
            confidence: 1.0,
        }
    }
}
