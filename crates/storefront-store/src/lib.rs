//! Clients for the hosted backend: the REST data API, the image upload
//! service, and the public IP lookup. Also the realtime refetch loop.

pub mod client;
pub mod error;
pub mod gateway;
pub mod ip;
pub mod realtime;
pub mod upload;

pub use client::StoreClient;
pub use error::StoreError;
pub use ip::lookup_client_ip;
pub use realtime::{run_refetch_loop, ChangeEvent, OrderSource, WATCHED_TABLES};
pub use upload::UploadClient;
