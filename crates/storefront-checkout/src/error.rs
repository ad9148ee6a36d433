use std::fmt;

use thiserror::Error;

use crate::workflow::CheckoutStep;

/// Notice shown for every submission failure that is not a stock problem.
pub const TOO_MANY_ORDERS_NOTICE: &str =
    "Too many orders: Please wait 1 minute before placing another order.";

/// Which uploaded document a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    RenterId,
    Receipt,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::RenterId => write!(f, "ID"),
            DocumentKind::Receipt => write!(f, "Receipt"),
        }
    }
}

/// Missing or inconsistent renter input. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("Your bag is empty.")]
    EmptyCart,
    #[error("Please enter the renter's full name.")]
    MissingName,
    #[error("Please enter a contact number.")]
    MissingContactNumber,
    #[error("Please enter a delivery address.")]
    MissingAddress,
    #[error("Please upload a valid government-issued ID.")]
    MissingRenterId,
    #[error("Please choose a payment method.")]
    MissingPaymentMethod,
}

/// Failure reported by the order/stock backend. `message` is the backend's
/// own text and is what submission failures get classified on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub message: String,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct UploadError {
    pub reason: String,
}

impl UploadError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("{document} upload failed: {reason}")]
    UploadFailed {
        document: DocumentKind,
        reason: String,
    },

    /// Found by the pre-submission stock check; no order was created.
    #[error("Insufficient stock for {item_name}")]
    InsufficientStock { item_name: String },

    /// The backend itself refused the order for lack of stock.
    #[error("{0}")]
    StockRejected(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("missing identifiers: {0}")]
    MissingIdentifiers(String),

    #[error("order submission failed: {0}")]
    SubmissionFailed(String),

    #[error("checkout cannot do that while {0}")]
    InvalidStep(CheckoutStep),
}

impl CheckoutError {
    /// The single user-visible string for this failure.
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            CheckoutError::Validation(failure) => failure.to_string(),
            CheckoutError::UploadFailed { document, reason } => {
                format!("{document} upload failed: {reason}.")
            }
            CheckoutError::InsufficientStock { .. } => self.to_string(),
            CheckoutError::StockRejected(message) => message.clone(),
            CheckoutError::RateLimited(_)
            | CheckoutError::MissingIdentifiers(_)
            | CheckoutError::SubmissionFailed(_) => TOO_MANY_ORDERS_NOTICE.to_string(),
            CheckoutError::InvalidStep(_) => self.to_string(),
        }
    }
}

impl From<GatewayError> for CheckoutError {
    fn from(err: GatewayError) -> Self {
        classify_backend_message(&err.message)
    }
}

/// Maps a backend error message onto a failure class by case-insensitive
/// substring: `"insufficient stock"`, `"rate limit"`, `"missing identifiers"`,
/// anything else.
#[must_use]
pub fn classify_backend_message(message: &str) -> CheckoutError {
    let lowered = message.to_lowercase();
    if lowered.contains("insufficient stock") {
        CheckoutError::StockRejected(message.to_string())
    } else if lowered.contains("rate limit") {
        CheckoutError::RateLimited(message.to_string())
    } else if lowered.contains("missing identifiers") {
        CheckoutError::MissingIdentifiers(message.to_string())
    } else {
        CheckoutError::SubmissionFailed(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_message_is_shown_verbatim() {
        let err = classify_backend_message("Insufficient STOCK for Dome Tent");
        assert_eq!(
            err,
            CheckoutError::StockRejected("Insufficient STOCK for Dome Tent".to_string())
        );
        assert_eq!(err.notice(), "Insufficient STOCK for Dome Tent");
    }

    #[test]
    fn rate_limit_maps_to_too_many_orders() {
        let err = classify_backend_message("Rate limit exceeded for 203.0.113.9");
        assert!(matches!(err, CheckoutError::RateLimited(_)));
        assert_eq!(err.notice(), TOO_MANY_ORDERS_NOTICE);
    }

    #[test]
    fn missing_identifiers_maps_to_too_many_orders() {
        let err = classify_backend_message("order rejected: missing identifiers");
        assert!(matches!(err, CheckoutError::MissingIdentifiers(_)));
        assert_eq!(err.notice(), TOO_MANY_ORDERS_NOTICE);
    }

    #[test]
    fn unknown_messages_collapse_to_generic_notice() {
        let err = classify_backend_message("duplicate key value violates unique constraint");
        assert!(matches!(err, CheckoutError::SubmissionFailed(_)));
        assert_eq!(err.notice(), TOO_MANY_ORDERS_NOTICE);
    }

    #[test]
    fn gateway_error_converts_through_classifier() {
        let err: CheckoutError = GatewayError::new("rate limit").into();
        assert!(matches!(err, CheckoutError::RateLimited(_)));
    }

    #[test]
    fn upload_notices_name_the_document() {
        let id = CheckoutError::UploadFailed {
            document: DocumentKind::RenterId,
            reason: "file too large".to_string(),
        };
        assert_eq!(id.notice(), "ID upload failed: file too large.");

        let receipt = CheckoutError::UploadFailed {
            document: DocumentKind::Receipt,
            reason: "timeout".to_string(),
        };
        assert_eq!(receipt.notice(), "Receipt upload failed: timeout.");
    }

    #[test]
    fn local_stock_failure_names_item() {
        let err = CheckoutError::InsufficientStock {
            item_name: "Dome Tent".to_string(),
        };
        assert_eq!(err.notice(), "Insufficient stock for Dome Tent");
    }

    #[test]
    fn validation_notice_is_the_failure_text() {
        let err = CheckoutError::from(ValidationFailure::MissingAddress);
        assert_eq!(err.notice(), "Please enter a delivery address.");
    }
}
