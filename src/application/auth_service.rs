use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{
    AuthenticatedUser, CreateUser, LoginRequest, LoginResponse, NewUser, UserProfile,
};
use crate::infrastructure::security::{TokenService, hash_password, verify_password};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    tokens: TokenService,
}

/// Extracts the token from an `Authorization` header value.
///
/// The header needs at least two whitespace-separated fields and a `Bearer`
/// scheme; any trailing fields are ignored.
pub fn bearer_token(header: &str) -> Option<&str> {
    let mut fields = header.split_whitespace();
    let scheme = fields.next()?;
    let token = fields.next()?;
    scheme.eq_ignore_ascii_case("bearer").then_some(token)
}

// Argon2 is CPU-bound; keep it off the async workers.
async fn run_blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T, argon2::password_hash::Error> + Send + 'static,
    T: Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| DomainError::Internal(format!("Password task failed: {e}")))?;
    outcome.map_err(|e| {
        error!(error = %e, "Password hashing failed");
        anyhow::Error::from(DomainError::Internal(format!("Password hashing failed: {e}")))
    })
}

impl AuthService {
    pub fn new(user_repository: Arc<dyn UserRepository>, tokens: TokenService) -> Self {
        Self {
            user_repository,
            tokens,
        }
    }

    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn register_user(&self, req: CreateUser) -> Result<UserProfile> {
        trace!("Starting user registration");

        if req.username.trim().is_empty() {
            return Err(DomainError::Validation("username is required".to_string()).into());
        }
        if req.password.is_empty() {
            return Err(DomainError::Validation("password is required".to_string()).into());
        }

        if self
            .user_repository
            .find_user_by_username(&req.username)
            .await?
            .is_some()
        {
            warn!("Username already taken");
            return Err(DomainError::Validation(format!(
                "username {} is already taken",
                req.username
            ))
            .into());
        }

        let password = req.password;
        let password_hash = run_blocking(move || hash_password(&password)).await?;

        let user = self
            .user_repository
            .create_user(NewUser {
                username: req.username,
                password_hash,
            })
            .await?;

        info!(user_id = user.id, "User registered successfully");
        Ok(user.into())
    }

    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse> {
        trace!("Starting login");

        let user = self
            .user_repository
            .find_user_by_username(&req.username)
            .await?
            .ok_or_else(|| {
                warn!("User not found during login");
                DomainError::Unauthorized(INVALID_CREDENTIALS.to_string())
            })?;

        let password = req.password;
        let stored_hash = user.password_hash.clone();
        let is_valid = run_blocking(move || verify_password(&password, &stored_hash)).await?;

        if !is_valid {
            warn!(user_id = user.id, "Invalid password during login");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()).into());
        }

        let token = self.tokens.issue(&user.username).map_err(|e| {
            error!(error = %e, "Failed to issue token");
            DomainError::Internal(e.to_string())
        })?;

        info!(user_id = user.id, "Login successful");
        Ok(LoginResponse {
            user_id: user.id,
            username: user.username,
            token,
        })
    }

    /// Resolves an `Authorization` header to the user it was issued for.
    ///
    /// Every failure, including a failed user lookup, collapses into
    /// `Unauthorized`.
    pub async fn authorize(&self, header: Option<&str>) -> Result<AuthenticatedUser, DomainError> {
        let token = header
            .and_then(bearer_token)
            .ok_or_else(|| DomainError::Unauthorized("missing bearer token".to_string()))?;

        let username = self.tokens.validate(token).map_err(|e| {
            debug!(error = %e, "Token rejected");
            DomainError::Unauthorized(e.to_string())
        })?;

        match self.user_repository.find_user_by_username(&username).await {
            Ok(Some(user)) => Ok(AuthenticatedUser {
                user_id: user.id,
                username: user.username,
            }),
            Ok(None) => {
                debug!(username = %username, "Token refers to unknown user");
                Err(DomainError::Unauthorized("unknown user".to_string()))
            }
            Err(e) => {
                warn!(error = %e, "User lookup failed during authorization");
                Err(DomainError::Unauthorized("unknown user".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_username(&self, username: &str) -> Result<UserProfile> {
        self.user_repository
            .find_user_by_username(username)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| DomainError::NotFound(format!("User {username} not found")).into())
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_id(&self, id: i64) -> Result<UserProfile> {
        self.user_repository
            .find_user_by_id(id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| DomainError::NotFound(format!("User {id} not found")).into())
    }
}
