use crate::domain::requests::{CategoryQuery, CreateCategory, UpdateCategory};
use crate::domain::user::AuthenticatedUser;
use crate::presentation::handlers::{ApiError, AppState};
use actix_web::{HttpResponse, web};
use tracing::{Span, error, info, instrument};

#[instrument(skip(state, user, req), fields(user_id = user.user_id, category_id))]
pub async fn create_category(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<CreateCategory>,
) -> Result<HttpResponse, ApiError> {
    info!(title = %req.title, kind = %req.kind, "Creating category");
    let category = state
        .category_service
        .create_category(user.user_id, req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create category");
            ApiError::from(e)
        })?;
    Span::current().record("category_id", category.id);
    Ok(HttpResponse::Ok().json(category))
}

#[instrument(skip(state, user), fields(user_id = user.user_id, category_id = %*path))]
pub async fn get_category(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let category = state
        .category_service
        .get_category(user.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(category))
}

#[instrument(skip(state, user, query), fields(user_id = user.user_id))]
pub async fn list_categories(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<CategoryQuery>,
) -> Result<HttpResponse, ApiError> {
    let categories = state
        .category_service
        .list_categories(user.user_id, query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(categories))
}

#[instrument(skip(state, user, req), fields(user_id = user.user_id, category_id = %*path))]
pub async fn update_category(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    req: web::Json<UpdateCategory>,
) -> Result<HttpResponse, ApiError> {
    let category = state
        .category_service
        .update_category(user.user_id, path.into_inner(), req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to update category");
            ApiError::from(e)
        })?;
    Ok(HttpResponse::Ok().json(category))
}

#[instrument(skip(state, user), fields(user_id = user.user_id, category_id = %*path))]
pub async fn delete_category(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    state
        .category_service
        .delete_category(user.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(true))
}
