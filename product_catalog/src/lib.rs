//! # Product Catalog
//!
//! Client library for a product-catalog REST API with bearer-token sessions.
//!
//! ## Architecture
//!
//! Requests flow through a fixed set of layers:
//!
//! - **Token store**: durable storage of the current token and user profile
//! - **Token validator**: reads the token payload and checks its expiry
//! - **Dispatcher**: attaches the bearer header and ends the session on
//!   expiry or a 401, for every authorized call
//! - **Session controller**: login, registration, logout, restore
//! - **Product API**: typed CRUD and search over the dispatcher
//!
//! ## Core Modules
//!
//! - [`auth`]: Token store, validator, session, and session controller
//! - [`api`]: Dispatcher, transport, and the product resource client
//! - [`config`]: Environment-driven configuration
//!
//! ## Example
//!
//! ```no_run
//! use product_catalog::{CatalogClient, ClientConfig, NewProduct};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env(None, None)?;
//!     let client = CatalogClient::from_config(&config)?;
//!
//!     if !client.auth().is_authenticated() {
//!         client.auth().login("alice", "Secret123").await?;
//!     }
//!
//!     let page = client.products().list(1, config.default_page_size).await?;
//!     println!("{} products in total", page.total_items);
//!
//!     client.products().create(&NewProduct::new("Widget").price(9.99)).await?;
//!     Ok(())
//! }
//! ```

/// REST access: dispatcher, transport, and product client.
pub mod api;
pub use api::{NewProduct, Product, ProductApi, ProductId, ProductPage, ProductUpdate};

/// Token storage, validation, and session state.
pub mod auth;
pub use auth::{SessionController, SessionEvent, SessionState, User};

pub mod client;
pub use client::CatalogClient;

pub mod config;
pub use config::{ClientConfig, ConfigError};

pub mod errors;
pub use errors::{ClientError, ClientResult};
