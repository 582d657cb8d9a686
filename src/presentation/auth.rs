use crate::domain::user::{AuthenticatedUser, CreateUser, LoginRequest};
use crate::presentation::handlers::{ApiError, AppState};
use actix_web::{HttpResponse, web};
use tracing::{error, info, instrument};

#[instrument(skip(state, req), fields(username = %req.username))]
pub async fn create_user(
    state: web::Data<AppState>,
    req: web::Json<CreateUser>,
) -> Result<HttpResponse, ApiError> {
    info!("Registration request received");

    let user = state
        .auth_service
        .register_user(req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to register user");
            ApiError::from(e)
        })?;

    info!(user_id = user.id, "User registered successfully");
    Ok(HttpResponse::Ok().json(user))
}

#[instrument(skip(state, req), fields(username = %req.username))]
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    let response = state
        .auth_service
        .login(req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to login");
            ApiError::from(e)
        })?;

    info!(user_id = response.user_id, "Login successful");
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(state, _user))]
pub async fn get_user(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user = state
        .auth_service
        .get_user_by_username(&path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(user))
}

#[instrument(skip(state, _user))]
pub async fn get_user_by_id(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let user = state.auth_service.get_user_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}
