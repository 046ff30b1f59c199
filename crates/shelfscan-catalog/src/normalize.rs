//! Normalization from the raw catalog response to [`CatalogProduct`].

use crate::types::{image_entry_url, CatalogProduct, CosmosProduct};

/// Normalizes a raw [`CosmosProduct`] looked up under `identifier`.
///
/// * `name`: `description`, else `title`.
/// * `brand`: `brand.name`.
/// * `image_url`: `thumbnail`, else the first usable `images` entry.
/// * `category`: `gpc.description`.
/// * `description`: `ncm.full_description`.
///
/// Blank strings are treated as absent.
#[must_use]
pub fn normalize_product(
    identifier: &str,
    product: CosmosProduct,
    raw: serde_json::Value,
) -> CatalogProduct {
    let name = non_blank(product.description).or_else(|| non_blank(product.title));
    let brand = product.brand.and_then(|b| non_blank(b.name));
    let image_url = non_blank(product.thumbnail).or_else(|| {
        product
            .images
            .iter()
            .flatten()
            .find_map(|entry| image_entry_url(entry).map(str::trim).filter(|u| !u.is_empty()))
            .map(str::to_owned)
    });
    let category = product.gpc.and_then(|g| non_blank(g.description));
    let description = product.ncm.and_then(|n| non_blank(n.full_description));

    CatalogProduct {
        identifier: identifier.to_owned(),
        name,
        brand,
        image_url,
        category,
        description,
        raw,
        placeholder: false,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
