//! Login, registration, logout, and password reset.

use super::{
    models::{
        AuthResponse, EndReason, LoginRequest, PasswordResetRequest, RegisterRequest,
        SessionState, User,
    },
    session::Session,
    validation,
};
use crate::api::dispatcher::{ApiRequest, Dispatcher};
use crate::errors::{ClientError, ClientResult};
use std::sync::Arc;

/// Drives the Anonymous / Authenticated session state machine
#[derive(Clone)]
pub struct SessionController {
    dispatcher: Dispatcher,
}

impl SessionController {
    /// Create a controller and restore any persisted session
    ///
    /// # Errors
    ///
    /// * `ClientError::Storage` - The token store could not be read or purged
    pub fn new(dispatcher: Dispatcher) -> ClientResult<Self> {
        dispatcher.session().restore()?;
        Ok(Self { dispatcher })
    }

    pub fn session(&self) -> &Arc<Session> {
        self.dispatcher.session()
    }

    pub fn state(&self) -> SessionState {
        self.session().state()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.session().user()
    }

    /// Log in with username and password
    ///
    /// On failure the existing session, if any, is left as it was.
    ///
    /// # Errors
    ///
    /// * `ClientError::Validation` - A field is missing; nothing was sent
    /// * `ClientError::RequestFailed` - The server refused; carries its message
    /// * `ClientError::InvalidResponse` - The server returned an unusable token
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<User> {
        validation::validate_login(username, password)?;

        let request = ApiRequest::post(["auth", "login"]).json(&LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        })?;

        self.authenticate(request).await
    }

    /// Create an account and log into it
    ///
    /// # Errors
    ///
    /// * `ClientError::Validation` - Missing field, weak password, bad email,
    ///   or mismatched confirmation; nothing was sent
    /// * `ClientError::RequestFailed` - The server refused; carries its message
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> ClientResult<User> {
        validation::validate_registration(username, email, password, confirm_password)?;

        let request = ApiRequest::post(["auth", "register"]).json(&RegisterRequest {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
            confirm_password: confirm_password.to_string(),
        })?;

        self.authenticate(request).await
    }

    /// End the session locally; no request is made
    pub fn logout(&self) {
        self.session().end(EndReason::Logout);
    }

    /// Ask the server to send password reset instructions
    ///
    /// Success says nothing about whether the address has an account.
    pub async fn forgot_password(&self, email: &str) -> ClientResult<()> {
        validation::validate_email(email)?;

        let request = ApiRequest::post(["auth", "forgot-password"]).json(&PasswordResetRequest {
            email: email.trim().to_string(),
        })?;

        self.dispatcher.send_public(request).await?;
        Ok(())
    }

    async fn authenticate(&self, request: ApiRequest) -> ClientResult<User> {
        let path = request.path();
        let body = self.dispatcher.send_public(request).await.inspect_err(|e| {
            tracing::info!(http_path = %path, error = %e, "Authentication rejected");
        })?;

        let response: AuthResponse = serde_json::from_value(body)
            .map_err(|e| ClientError::InvalidResponse(format!("Malformed auth response: {e}")))?;

        let validator = self.session().validator();
        let claims = validator
            .decode(&response.token)
            .map_err(|_| ClientError::InvalidResponse("Server issued a malformed token".to_string()))?;
        if !validator.is_unexpired(&claims) {
            return Err(ClientError::InvalidResponse(
                "Server issued an expired token".to_string(),
            ));
        }

        let user = response.user.or_else(|| claims.user()).ok_or_else(|| {
            ClientError::InvalidResponse("Auth response carries no user profile".to_string())
        })?;

        self.session().establish(&response.token, user.clone())?;
        Ok(user)
    }
}
