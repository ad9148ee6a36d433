//! Checkout workflow: renter details, document uploads, stock check, order
//! persistence, and the hand-off to the messaging channel.

pub mod error;
pub mod ports;
pub mod summary;
pub mod workflow;

pub use error::{
    classify_backend_message, CheckoutError, DocumentKind, GatewayError, UploadError,
    ValidationFailure, TOO_MANY_ORDERS_NOTICE,
};
pub use ports::{CheckoutServices, DocumentUploader, Handoff, ImagePayload, OrderGateway};
pub use summary::{
    compose_summary, encode_uri_component, messenger_link, HandoffSettings, SummaryInput,
};
pub use workflow::{Checkout, CheckoutStep, DocumentSlot, PaymentChoice, Redirect, RenterDetails};
