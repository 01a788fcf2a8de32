use serde::{Deserialize, Serialize};
use std::fmt;

/// Source platform of a listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Platform {
    Funda,
    Pararius,
    Jaap,
}

impl Platform {
    /// Every platform with an adapter, in scrape order
    pub const ALL: [Platform; 3] = [Platform::Funda, Platform::Pararius, Platform::Jaap];

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Funda => "Funda",
            Platform::Pararius => "Pararius",
            Platform::Jaap => "Jaap",
        }
    }

    /// Case-insensitive lookup by platform name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One normalized listing.
///
/// `url` is always an absolute http(s) URL. Every other text field is an
/// empty string when the source page did not provide it, so exports always
/// carry the full column set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingRecord {
    pub title: String,
    pub price: String,
    pub address: String,
    pub postcode: String,
    pub city: String,
    pub area: String,
    pub rooms: String,
    pub url: String,
    #[serde(with = "platform_name")]
    pub platform: Platform,
}

impl ListingRecord {
    /// Column headers of the tabular export, in field order
    pub const COLUMNS: [&'static str; 9] = [
        "Title", "Price", "Address", "Postcode", "City", "Area", "Rooms", "URL", "Platform",
    ];

    /// Field values in column order
    pub fn row(&self) -> [&str; 9] {
        [
            self.title.as_str(),
            self.price.as_str(),
            self.address.as_str(),
            self.postcode.as_str(),
            self.city.as_str(),
            self.area.as_str(),
            self.rooms.as_str(),
            self.url.as_str(),
            self.platform.name(),
        ]
    }
}

mod platform_name {
    use super::Platform;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(platform: &Platform, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(platform.name())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Platform, D::Error> {
        let name = String::deserialize(d)?;
        Platform::from_name(&name)
            .ok_or_else(|| de::Error::custom(format!("unknown platform '{}'", name)))
    }
}
