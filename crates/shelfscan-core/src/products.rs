use serde::{Deserialize, Serialize};

/// Where a [`ProductRecord`] was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductSource {
    /// Read back from the local `products` table.
    Local,
    /// Fetched from the remote product catalog.
    Api,
}

impl ProductSource {
    /// The value stored in the `products.source` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProductSource::Local => "local",
            ProductSource::Api => "api",
        }
    }

    /// Parses a stored `source` column value. Unknown values map to `Local`,
    /// since anything already in the table is, by definition, local.
    #[must_use]
    pub fn from_column(value: &str) -> Self {
        match value {
            "api" => ProductSource::Api,
            _ => ProductSource::Local,
        }
    }
}

impl std::fmt::Display for ProductSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product resolved from a scanned barcode, normalized across the local
/// store and the remote catalog.
///
/// `identifier` is the normalized digit string the product was found under
/// and never changes once the record is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub identifier: String,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub source: ProductSource,
}

impl ProductRecord {
    /// Returns the display name, falling back to the identifier when the
    /// catalog did not supply one.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.identifier)
    }

    /// Returns a copy of this record re-tagged with a different source.
    #[must_use]
    pub fn with_source(mut self, source: ProductSource) -> Self {
        self.source = source;
        self
    }
}
