pub mod app_config;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod orders;
pub mod pricing;

pub use app_config::{AppConfig, Environment, UploadConfig};
pub use cart::{resolve_add_ons, Cart, CartActions, CartError, CartLine, CartLineId};
pub use catalog::{AddOn, CatalogItem, StockLevel, Variation};
pub use config::load_app_config_from_env;
pub use orders::{
    order_code, AddOnSnapshot, NewOrder, NewOrderItem, OrderItemRecord, OrderRecord,
    OrderWithItems, ServiceType, StockAdjustment, StockRow, VariationSnapshot,
};
pub use pricing::{
    discount_badge, discount_percentage, display_amount, effective_price, plain_amount,
    unit_price, DiscountBadge,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
