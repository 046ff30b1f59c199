//! Short, user-facing text for resolution outcomes.
//!
//! Transport failures never include raw error text; at most the HTTP status
//! code is shown.

use crate::resolver::{NotFoundReason, Provenance, Resolution};

/// A dialog-style message: a short title plus a one-sentence body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    pub title: String,
    pub body: String,
}

impl UserMessage {
    fn new(title: &str, body: impl Into<String>) -> Self {
        Self {
            title: title.to_owned(),
            body: body.into(),
        }
    }
}

impl Resolution {
    /// The message to show for this outcome. A plain successful find has
    /// nothing to say beyond the product itself and returns `None`.
    #[must_use]
    pub fn user_message(&self) -> Option<UserMessage> {
        let message = match self {
            Resolution::Found { provenance, .. } => match provenance {
                Provenance::CatalogUnsaved => UserMessage::new(
                    "Product found",
                    "The product could not be saved and will be looked up again next time.",
                ),
                Provenance::Placeholder => UserMessage::new(
                    "Catalog not configured",
                    "Showing placeholder details because no catalog token is set.",
                ),
                _ => return None,
            },
            Resolution::NotFound {
                reason: NotFoundReason::NoCode,
            } => UserMessage::new("Scan failed", "Could not extract a code from the scanner."),
            Resolution::NotFound {
                reason: NotFoundReason::NoMatch { candidates },
            } => {
                let code = candidates.first().map_or("", String::as_str);
                UserMessage::new(
                    "Product not found",
                    format!("No product matches code {code}."),
                )
            }
            Resolution::AuthFailure { .. } => UserMessage::new(
                "Catalog unavailable",
                "The product catalog rejected our credentials.",
            ),
            Resolution::RateLimited {
                retry_after_secs: Some(secs),
            } => UserMessage::new(
                "Too many lookups",
                format!("The product catalog is busy. Try again in {secs} seconds."),
            ),
            Resolution::RateLimited {
                retry_after_secs: None,
            } => UserMessage::new(
                "Too many lookups",
                "The product catalog is busy. Try again shortly.",
            ),
            Resolution::TransportError {
                status: Some(status),
                ..
            } => UserMessage::new(
                "Lookup failed",
                format!("The product catalog returned HTTP {status}."),
            ),
            Resolution::TransportError { status: None, .. } => UserMessage::new(
                "Lookup failed",
                "Could not reach the product catalog.",
            ),
            Resolution::Cancelled => {
                UserMessage::new("Lookup cancelled", "The lookup was cancelled.")
            }
        };
        Some(message)
    }
}
