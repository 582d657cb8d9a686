use crate::application::account_service::AccountService;
use crate::application::auth_service::AuthService;
use crate::application::category_service::CategoryService;
use crate::data::memory::InMemoryLedgerRepository;
use crate::data::sqlite::SqliteRepository;
use crate::data::user_repository::InMemoryUserRepository;
use crate::domain::error::DomainError;
use crate::domain::repository::{AccountRepository, CategoryRepository, UserRepository};
use crate::domain::user::AuthenticatedUser;
use crate::infrastructure::security::TokenService;
use crate::presentation::middleware::AuthRejection;
use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError};
use chrono::Utc;
use serde::Serialize;
use std::future::{Ready, ready};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

// AppState holding the services
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub category_service: CategoryService,
    pub account_service: AccountService,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        categories: Arc<dyn CategoryRepository>,
        accounts: Arc<dyn AccountRepository>,
        tokens: TokenService,
    ) -> Self {
        Self {
            auth_service: Arc::new(AuthService::new(users, tokens)),
            category_service: CategoryService::new(categories.clone()),
            account_service: AccountService::new(accounts, categories),
        }
    }

    pub fn with_sqlite(repository: SqliteRepository, tokens: TokenService) -> Self {
        let repository = Arc::new(repository);
        Self::new(repository.clone(), repository.clone(), repository, tokens)
    }

    pub fn in_memory(tokens: TokenService) -> Self {
        let ledger = Arc::new(InMemoryLedgerRepository::new());
        Self::new(
            Arc::new(InMemoryUserRepository::new()),
            ledger.clone(),
            ledger,
            tokens,
        )
    }
}

// Uniform error response format
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("{0}")]
    TypeMismatch(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Not found: {0}")]
    NotFound(String),
    // Server-side details are logged, never sent to the client.
    #[error("Internal error")]
    Database(String),
    #[error("Internal error")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            ApiError::Validation(_) | ApiError::TypeMismatch(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        // Log error based on severity
        if status.is_server_error() {
            error!(error = ?self, status = %status, "Request failed");
        } else {
            warn!(error = %error_msg, status = %status, "Request rejected");
        }

        HttpResponse::build(status).json(ErrorResponse { error: error_msg })
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            e @ DomainError::TypeMismatch { .. } => ApiError::TypeMismatch(e.to_string()),
            DomainError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<DomainError>() {
            Ok(domain) => domain.into(),
            Err(other) => ApiError::Database(other.to_string()),
        }
    }
}

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(err.to_string()).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(err.to_string()).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(err.to_string()).into()
}

// AuthenticatedUser extractor; identity is attached by JwtAuthMiddleware
impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let extensions = req.extensions();
        let result = match extensions.get::<AuthenticatedUser>() {
            Some(user) => Ok(user.clone()),
            None => {
                let reason = extensions
                    .get::<AuthRejection>()
                    .map(|r| r.0.clone())
                    .unwrap_or_else(|| "User not authenticated".to_string());
                Err(ApiError::Unauthorized(reason))
            }
        };
        ready(result)
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    info!("Health check requested");
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}
