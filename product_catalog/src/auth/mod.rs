//! Authentication module: token storage, token validation, and the session.
//!
//! This module implements:
//! - Durable storage of one bearer token plus the cached user profile
//! - Expiry checks on the token payload (signatures are the server's job)
//! - A shared, observable session with Anonymous / Authenticated states
//! - Login, registration, logout, and password reset requests
//!
//! ## Example
//!
//! ```no_run
//! use product_catalog::auth::{FileStorage, Session, SessionController, TokenStore, TokenValidator};
//! use product_catalog::api::{Dispatcher, ReqwestTransport};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = TokenStore::new(Arc::new(FileStorage::new("session.json")));
//!     let session = Arc::new(Session::new(store, TokenValidator::new()));
//!     let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(30))?);
//!     let dispatcher = Dispatcher::new("http://localhost:5000", session, transport);
//!
//!     let auth = SessionController::new(dispatcher)?;
//!     let user = auth.login("alice", "Secret123").await?;
//!     println!("Logged in as {}", user.username);
//!     Ok(())
//! }
//! ```

pub mod controller;
pub mod models;
pub mod session;
pub mod store;
pub mod validation;
pub mod validator;

pub use controller::SessionController;
pub use models::{
    AuthResponse, EndReason, LoginRequest, PasswordResetRequest, RegisterRequest, SessionEvent,
    SessionState, SessionStatus, TokenClaims, User, UserId,
};
pub use session::Session;
pub use store::{FileStorage, MemoryStorage, StoredSession, TokenStorage, TokenStore};
pub use validator::TokenValidator;
