//! Catalog response types for `GET /gtins/{gtin}.json`.
//!
//! ## Observed shape
//!
//! The body is a single product object. Every field we use is optional in
//! practice: small brands often have no `brand`, no `gpc` classification, and
//! no image. `description` carries the product's display name; some records
//! only have `title`. `images` has been seen both as an array of URL strings
//! and as an array of `{ "url": ... }` objects.
//!
//! ```json
//! {
//!   "gtin": 7891000315507,
//!   "description": "LEITE EM PO NINHO INTEGRAL 400G",
//!   "brand": { "name": "NINHO", "picture": "https://..." },
//!   "thumbnail": "https://cdn-cosmos.bluesoft.com.br/products/7891000315507",
//!   "gpc": { "code": "10000025", "description": "Leite em Pó" },
//!   "ncm": { "code": "04022110", "full_description": "Leite em pó integral" }
//! }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use shelfscan_core::{ProductRecord, ProductSource};

/// Raw product object returned by the catalog.
///
/// Optional fields of an unexpected shape read as `None` instead of failing
/// the whole body.
#[derive(Debug, Default, Deserialize)]
pub struct CosmosProduct {
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub brand: Option<CosmosBrand>,

    #[serde(default, deserialize_with = "lenient")]
    pub thumbnail: Option<String>,

    /// `null` and absent are both treated as "no images". Entries are kept
    /// raw; see [`image_entry_url`].
    #[serde(default, deserialize_with = "lenient")]
    pub images: Option<Vec<serde_json::Value>>,

    /// GS1 Global Product Classification.
    #[serde(default, deserialize_with = "lenient")]
    pub gpc: Option<CosmosClassification>,

    /// Mercosur tariff classification; carries the long-form description.
    #[serde(default, deserialize_with = "lenient")]
    pub ncm: Option<CosmosNcm>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CosmosBrand {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CosmosClassification {
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CosmosNcm {
    #[serde(default, deserialize_with = "lenient")]
    pub full_description: Option<String>,
}

/// URL carried by one `images` entry: either a bare string or an object
/// with a string `url`.
#[must_use]
pub fn image_entry_url(entry: &serde_json::Value) -> Option<&str> {
    match entry {
        serde_json::Value::String(url) => Some(url.as_str()),
        serde_json::Value::Object(fields) => fields.get("url").and_then(serde_json::Value::as_str),
        _ => None,
    }
}

/// Reads any JSON value, keeping it only if it converts to `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// A catalog hit normalized for storage and display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogProduct {
    /// The identifier the lookup was made with.
    pub identifier: String,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    /// Full response body as received.
    pub raw: serde_json::Value,
    /// `true` when the client had no credential and fabricated this result
    /// without calling the catalog. Placeholder products must not be stored.
    pub placeholder: bool,
}

impl CatalogProduct {
    /// Degraded-mode stand-in for a product, used when no catalog token is
    /// configured.
    #[must_use]
    pub fn placeholder(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_owned(),
            name: Some(format!("Product {identifier}")),
            brand: None,
            image_url: None,
            category: None,
            description: None,
            raw: serde_json::json!({ "placeholder": true, "gtin": identifier }),
            placeholder: true,
        }
    }

    /// The record shape shared with the local store; always `source = api`.
    #[must_use]
    pub fn to_record(&self) -> ProductRecord {
        ProductRecord {
            identifier: self.identifier.clone(),
            name: self.name.clone(),
            brand: self.brand.clone(),
            image_url: self.image_url.clone(),
            category: self.category.clone(),
            description: self.description.clone(),
            source: ProductSource::Api,
        }
    }
}
