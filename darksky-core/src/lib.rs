//! Client library for the Dark Sky forecast API.
//!
//! This crate defines:
//! - Request construction (`request`)
//! - Response and header mapping (`response`, `model`)
//! - The transport seam and its `reqwest` implementation (`transport`)
//! - The `DarkSkyService` facade and on-disk configuration
//!
//! It is used by `darksky-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod request;
pub mod response;
pub mod service;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use model::{Alert, DataBlock, DataPoint, Flags, ForecastResponse, ForecastResult};
pub use request::{Block, DEFAULT_BASE_URL, ForecastOptions, ForecastQuery, Units};
pub use response::{RawResponse, ResponseHeaders, map_response};
pub use service::DarkSkyService;
pub use transport::{HttpClient, ReqwestClient};
