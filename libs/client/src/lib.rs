//! Storefront client
//!
//! [`ApiClient`] speaks to the auth and API services; [`Storefront`] runs
//! the user-facing flows on top of it and keeps the local [`shop::Store`]
//! in step.
//!
//! ```no_run
//! use client::{ClientConfig, Storefront};
//!
//! # async fn run() -> Result<(), client::ClientError> {
//! let config = ClientConfig::from_env()?;
//! let mut storefront = Storefront::open(&config)?;
//! storefront.login("admin@gmail.com", "secret").await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod client;
pub mod config;
pub mod error;

pub use app::{ProductView, Storefront, ViewState};
pub use client::{ApiClient, UserProfile};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
