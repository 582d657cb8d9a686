use crate::domain::requests::{AccountQuery, CreateAccount, TypeQuery, UpdateAccount};
use crate::domain::user::AuthenticatedUser;
use crate::presentation::handlers::{ApiError, AppState};
use actix_web::{HttpResponse, web};
use tracing::{Span, error, info, instrument};

#[instrument(skip(state, user, req), fields(user_id = user.user_id, category_id = req.category_id, account_id))]
pub async fn create_account(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<CreateAccount>,
) -> Result<HttpResponse, ApiError> {
    info!(kind = %req.kind, value = req.value, "Creating account");
    let account = state
        .account_service
        .create_account(user.user_id, req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create account");
            ApiError::from(e)
        })?;
    Span::current().record("account_id", account.id);
    Ok(HttpResponse::Ok().json(account))
}

#[instrument(skip(state, user), fields(user_id = user.user_id, account_id = %*path))]
pub async fn get_account(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let account = state
        .account_service
        .get_account(user.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(account))
}

#[instrument(skip(state, user, query), fields(user_id = user.user_id))]
pub async fn list_accounts(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<AccountQuery>,
) -> Result<HttpResponse, ApiError> {
    let accounts = state
        .account_service
        .list_accounts(user.user_id, query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(accounts))
}

#[instrument(skip(state, user, req), fields(user_id = user.user_id, account_id = %*path))]
pub async fn update_account(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    req: web::Json<UpdateAccount>,
) -> Result<HttpResponse, ApiError> {
    let account = state
        .account_service
        .update_account(user.user_id, path.into_inner(), req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to update account");
            ApiError::from(e)
        })?;
    Ok(HttpResponse::Ok().json(account))
}

#[instrument(skip(state, user), fields(user_id = user.user_id, account_id = %*path))]
pub async fn delete_account(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    state
        .account_service
        .delete_account(user.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(true))
}

async fn graph(
    state: &AppState,
    user: &AuthenticatedUser,
    query: TypeQuery,
) -> Result<HttpResponse, ApiError> {
    let buckets = state
        .account_service
        .account_graph(user.user_id, query)
        .await?;
    Ok(HttpResponse::Ok().json(buckets))
}

async fn report(
    state: &AppState,
    user: &AuthenticatedUser,
    query: TypeQuery,
) -> Result<HttpResponse, ApiError> {
    let report = state
        .account_service
        .account_report(user.user_id, query)
        .await?;
    Ok(HttpResponse::Ok().json(report))
}

#[instrument(skip(state, user), fields(user_id = user.user_id))]
pub async fn account_graph(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<TypeQuery>,
) -> Result<HttpResponse, ApiError> {
    graph(&state, &user, query.into_inner()).await
}

#[instrument(skip(state, user), fields(user_id = user.user_id))]
pub async fn account_graph_json(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<TypeQuery>,
) -> Result<HttpResponse, ApiError> {
    graph(&state, &user, req.into_inner()).await
}

#[instrument(skip(state, user), fields(user_id = user.user_id))]
pub async fn account_report(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<TypeQuery>,
) -> Result<HttpResponse, ApiError> {
    report(&state, &user, query.into_inner()).await
}

#[instrument(skip(state, user), fields(user_id = user.user_id))]
pub async fn account_report_json(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<TypeQuery>,
) -> Result<HttpResponse, ApiError> {
    report(&state, &user, req.into_inner()).await
}
