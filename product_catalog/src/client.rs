//! Wiring of the session, dispatcher, and resource clients.

use crate::api::{Dispatcher, HttpTransport, ProductApi, ReqwestTransport};
use crate::auth::{FileStorage, Session, SessionController, TokenStore, TokenValidator};
use crate::config::ClientConfig;
use crate::errors::ClientResult;
use std::sync::Arc;

/// Everything a front end needs, sharing one session
#[derive(Clone)]
pub struct CatalogClient {
    auth: SessionController,
    products: ProductApi,
}

impl CatalogClient {
    /// Build a client from configuration: file-backed session, `reqwest` transport
    ///
    /// The persisted session, if any, is restored before this returns.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let store = TokenStore::new(Arc::new(FileStorage::new(&config.session_file)));
        let transport = Arc::new(ReqwestTransport::new(config.timeout())?);
        Self::with_parts(&config.base_url, store, transport, TokenValidator::new())
    }

    /// Build a client from explicit parts
    pub fn with_parts(
        base_url: &str,
        store: TokenStore,
        transport: Arc<dyn HttpTransport>,
        validator: TokenValidator,
    ) -> ClientResult<Self> {
        let session = Arc::new(Session::new(store, validator));
        let dispatcher = Dispatcher::new(base_url, session, transport);
        let auth = SessionController::new(dispatcher.clone())?;
        let products = ProductApi::new(dispatcher);
        Ok(Self { auth, products })
    }

    pub fn auth(&self) -> &SessionController {
        &self.auth
    }

    pub fn products(&self) -> &ProductApi {
        &self.products
    }

    pub fn session(&self) -> &Arc<Session> {
        self.auth.session()
    }
}
