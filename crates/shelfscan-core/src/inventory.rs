//! Validation for adding a resolved product to a user's inventory.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid expiration date \"{value}\": expected YYYY-MM-DD")]
    InvalidExpirationDate { value: String },
}

/// A request to add `quantity` units of a stored product to a user's
/// inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInventoryItem {
    pub user_id: Uuid,
    /// Internal `products.id` of the stored product.
    pub product_id: i64,
    /// Requested quantity; `None` means one unit.
    pub quantity: Option<i64>,
    pub expiration_date: Option<NaiveDate>,
}

impl NewInventoryItem {
    /// Checks that both the user and the product are set.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::MissingField`] for a nil `user_id` or a
    /// non-positive `product_id`.
    pub fn validate(&self) -> Result<(), InventoryError> {
        if self.user_id.is_nil() {
            return Err(InventoryError::MissingField("user_id"));
        }
        if self.product_id <= 0 {
            return Err(InventoryError::MissingField("product_id"));
        }
        Ok(())
    }

    /// Quantity to store: defaults to 1 and never drops below 1.
    #[must_use]
    pub fn normalized_quantity(&self) -> i32 {
        let requested = self.quantity.unwrap_or(1).max(1);
        i32::try_from(requested).unwrap_or(i32::MAX)
    }
}

/// Parses an optional `YYYY-MM-DD` expiration date. Blank input is `None`.
///
/// # Errors
///
/// Returns [`InventoryError::InvalidExpirationDate`] if the value is not a
/// calendar date in `YYYY-MM-DD` form.
pub fn parse_expiration_date(value: Option<&str>) -> Result<Option<NaiveDate>, InventoryError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| InventoryError::InvalidExpirationDate {
            value: value.to_owned(),
        })
}
