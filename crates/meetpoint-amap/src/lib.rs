//! Client for the AMap (高德) web service API: nearby search, routing,
//! geocoding and reverse geocoding.

pub mod client;
pub mod error;
pub(crate) mod provider;
pub(crate) mod retry;
pub mod types;

pub use client::AmapClient;
pub use error::AmapError;
pub use types::Route;
