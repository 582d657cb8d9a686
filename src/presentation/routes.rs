use crate::presentation::accounts::{
    account_graph, account_graph_json, account_report, account_report_json, create_account,
    delete_account, get_account, list_accounts, update_account,
};
use crate::presentation::auth::{create_user, get_user, get_user_by_id, login};
use crate::presentation::categories::{
    create_category, delete_category, get_category, list_categories, update_category,
};
use crate::presentation::handlers::{
    health_check, json_error_handler, path_error_handler, query_error_handler,
};
use actix_web::web;

/// Registers every endpoint plus the binding-error handlers.
///
/// The `/account/graph` and `/account/reports` resources are registered
/// before `/account/{id}` so they are matched first.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .route("/health", web::get().to(health_check))
        .route("/user", web::post().to(create_user))
        .route("/login", web::post().to(login))
        .route("/user/id/{id}", web::get().to(get_user_by_id))
        .route("/user/{username}", web::get().to(get_user))
        .route("/category", web::post().to(create_category))
        .route("/categories", web::get().to(list_categories))
        .service(
            web::resource("/category/{id}")
                .route(web::get().to(get_category))
                .route(web::put().to(update_category))
                .route(web::delete().to(delete_category)),
        )
        .route("/account", web::post().to(create_account))
        .route("/accounts", web::get().to(list_accounts))
        .service(
            web::resource("/account/graph")
                .route(web::get().to(account_graph))
                .route(web::post().to(account_graph_json)),
        )
        .service(
            web::resource("/account/reports")
                .route(web::get().to(account_report))
                .route(web::post().to(account_report_json)),
        )
        .service(
            web::resource("/account/{id}")
                .route(web::get().to(get_account))
                .route(web::put().to(update_account))
                .route(web::delete().to(delete_account)),
        );
}
