use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use finance_ledger_api::infrastructure::security::TokenService;
use finance_ledger_api::presentation::handlers::AppState;
use finance_ledger_api::presentation::middleware::JwtAuthMiddleware;
use finance_ledger_api::presentation::routes::configure;
use serde_json::{Value, json};

macro_rules! setup_account_test {
    () => {{
        let state = web::Data::new(AppState::in_memory(TokenService::new(
            "test-secret-key-for-account-tests",
        )));

        test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(configure)
                .wrap(JwtAuthMiddleware::new(state.auth_service.clone())),
        )
        .await
    }};
}

macro_rules! login_user {
    ($app:expr) => {{
        let username = format!("user_{}", fastrand::u32(..));
        let credentials = json!({ "username": username, "password": "password123" });

        let req = test::TestRequest::post()
            .uri("/user")
            .set_json(&credentials)
            .to_request();
        test::call_service(&$app, req).await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(&credentials)
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        format!("Bearer {}", body["token"].as_str().unwrap())
    }};
}

macro_rules! post_json {
    ($app:expr, $auth:expr, $uri:expr, $body:expr) => {{
        let req = test::TestRequest::post()
            .uri($uri)
            .insert_header(("Authorization", $auth.clone()))
            .set_json($body)
            .to_request();
        test::call_service(&$app, req).await
    }};
}

macro_rules! get_json {
    ($app:expr, $auth:expr, $uri:expr) => {{
        let req = test::TestRequest::get()
            .uri($uri)
            .insert_header(("Authorization", $auth.clone()))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {}", $uri);
        let body: Value = test::read_body_json(resp).await;
        body
    }};
}

macro_rules! create_category {
    ($app:expr, $auth:expr, $title:expr, $kind:expr) => {{
        let resp = post_json!(
            $app,
            $auth,
            "/category",
            json!({ "title": $title, "type": $kind, "description": "" })
        );
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        body["id"].as_i64().unwrap()
    }};
}

macro_rules! create_account {
    ($app:expr, $auth:expr, $category_id:expr, $title:expr, $kind:expr, $value:expr, $date:expr) => {{
        let resp = post_json!(
            $app,
            $auth,
            "/account",
            json!({
                "title": $title,
                "type": $kind,
                "description": format!("{} entry", $title),
                "category_id": $category_id,
                "date": $date,
                "value": $value,
            })
        );
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        body
    }};
}

#[actix_web::test]
async fn test_create_and_get_account() {
    let app = setup_account_test!();
    let auth = login_user!(app);
    let category_id = create_category!(app, auth, "Groceries", "debit");

    let created = create_account!(app, auth, category_id, "Milk", "debit", -250, "2024-03-05");
    assert_eq!(created["title"], "Milk");
    assert_eq!(created["type"], "debit");
    assert_eq!(created["category_id"], category_id);
    assert_eq!(created["value"], -250);
    assert_eq!(created["date"], "2024-03-05");
    let id = created["id"].as_i64().unwrap();

    let fetched = get_json!(app, auth, &format!("/account/{id}"));
    assert_eq!(fetched, created);
}

#[actix_web::test]
async fn test_account_type_must_match_category() {
    let app = setup_account_test!();
    let auth = login_user!(app);
    let category_id = create_category!(app, auth, "Salary", "credit");

    let resp = post_json!(
        app,
        auth,
        "/account",
        json!({
            "title": "Bonus",
            "type": "debit",
            "description": "",
            "category_id": category_id,
            "date": "2024-01-31",
            "value": 1000,
        })
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["error"],
        "Account type debit is different from category type credit"
    );
}

#[actix_web::test]
async fn test_create_account_rejects_bad_input() {
    let app = setup_account_test!();
    let auth = login_user!(app);
    let category_id = create_category!(app, auth, "Groceries", "debit");

    let bad_bodies = [
        json!({ "title": "Milk", "type": "debit", "description": "", "category_id": category_id, "date": "05/03/2024", "value": 1 }),
        json!({ "title": "Milk", "type": "debit", "description": "", "category_id": category_id, "date": "2024-03-05", "value": "lots" }),
        json!({ "title": "", "type": "debit", "description": "", "category_id": category_id, "date": "2024-03-05", "value": 1 }),
        json!({ "title": "Milk", "type": "debit", "description": "", "category_id": 0, "date": "2024-03-05", "value": 1 }),
    ];

    for body in bad_bodies {
        let resp = post_json!(app, auth, "/account", &body);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {body}");
    }

    // Unknown category
    let resp = post_json!(
        app,
        auth,
        "/account",
        json!({ "title": "Milk", "type": "debit", "description": "", "category_id": 99999, "date": "2024-03-05", "value": 1 })
    );
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_cannot_file_account_under_foreign_category() {
    let app = setup_account_test!();
    let alice = login_user!(app);
    let bob = login_user!(app);
    let category_id = create_category!(app, alice, "Groceries", "debit");

    let resp = post_json!(
        app,
        bob,
        "/account",
        json!({ "title": "Sneaky", "type": "debit", "description": "", "category_id": category_id, "date": "2024-03-05", "value": -1 })
    );
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_list_accounts_filters() {
    let app = setup_account_test!();
    let auth = login_user!(app);
    let groceries = create_category!(app, auth, "Groceries", "debit");
    let transport = create_category!(app, auth, "Transport", "debit");
    let salary = create_category!(app, auth, "Salary", "credit");

    create_account!(app, auth, groceries, "Milk", "debit", -250, "2024-03-05");
    create_account!(app, auth, groceries, "Bread", "debit", -120, "2024-03-06");
    create_account!(app, auth, transport, "Bus ticket", "debit", -90, "2024-03-05");
    create_account!(app, auth, salary, "March pay", "credit", 300000, "2024-03-31");

    let body = get_json!(app, auth, "/accounts?type=debit");
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["title"], "Milk");
    assert_eq!(items[0]["category_title"], "Groceries");
    assert_eq!(items[2]["category_title"], "Transport");

    let body = get_json!(app, auth, &format!("/accounts?type=debit&category_id={groceries}"));
    assert_eq!(body.as_array().unwrap().len(), 2);

    let body = get_json!(app, auth, "/accounts?type=debit&date=2024-03-05");
    assert_eq!(body.as_array().unwrap().len(), 2);

    let body = get_json!(app, auth, "/accounts?type=debit&title=Bus");
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["value"], -90);

    let body = get_json!(app, auth, "/accounts?type=credit&description=pay");
    assert_eq!(body.as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri("/accounts?type=debit&date=yesterday")
        .insert_header(("Authorization", auth.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_update_account_is_partial() {
    let app = setup_account_test!();
    let auth = login_user!(app);
    let category_id = create_category!(app, auth, "Groceries", "debit");
    let created = create_account!(app, auth, category_id, "Milk", "debit", -250, "2024-03-05");
    let id = created["id"].as_i64().unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/account/{id}"))
        .insert_header(("Authorization", auth.clone()))
        .set_json(json!({ "value": -300 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["value"], -300);
    assert_eq!(updated["title"], "Milk");
    assert_eq!(updated["description"], created["description"]);
    assert_eq!(updated["date"], "2024-03-05");

    let req = test::TestRequest::put()
        .uri(&format!("/account/{id}"))
        .insert_header(("Authorization", auth.clone()))
        .set_json(json!({ "title": "Oat milk", "description": "Switched" }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["title"], "Oat milk");
    assert_eq!(updated["description"], "Switched");
    assert_eq!(updated["value"], -300);

    let req = test::TestRequest::put()
        .uri("/account/99999")
        .insert_header(("Authorization", auth.clone()))
        .set_json(json!({ "value": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_delete_account_and_foreign_access() {
    let app = setup_account_test!();
    let alice = login_user!(app);
    let bob = login_user!(app);
    let category_id = create_category!(app, alice, "Groceries", "debit");
    let created = create_account!(app, alice, category_id, "Milk", "debit", -250, "2024-03-05");
    let id = created["id"].as_i64().unwrap();

    for req in [
        test::TestRequest::get().uri(&format!("/account/{id}")),
        test::TestRequest::delete().uri(&format!("/account/{id}")),
    ] {
        let req = req.insert_header(("Authorization", bob.clone())).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    let req = test::TestRequest::delete()
        .uri(&format!("/account/{id}"))
        .insert_header(("Authorization", alice.clone()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!(true));

    let req = test::TestRequest::get()
        .uri(&format!("/account/{id}"))
        .insert_header(("Authorization", alice.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_deleting_category_removes_its_accounts() {
    let app = setup_account_test!();
    let auth = login_user!(app);
    let groceries = create_category!(app, auth, "Groceries", "debit");
    let transport = create_category!(app, auth, "Transport", "debit");
    let milk = create_account!(app, auth, groceries, "Milk", "debit", -250, "2024-03-05");
    create_account!(app, auth, transport, "Bus ticket", "debit", -90, "2024-03-05");

    let req = test::TestRequest::delete()
        .uri(&format!("/category/{groceries}"))
        .insert_header(("Authorization", auth.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/account/{}", milk["id"]))
        .insert_header(("Authorization", auth.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = get_json!(app, auth, "/accounts?type=debit");
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Bus ticket");
}

#[actix_web::test]
async fn test_account_graph_and_report() {
    let app = setup_account_test!();
    let auth = login_user!(app);
    let groceries = create_category!(app, auth, "Groceries", "debit");
    let salary = create_category!(app, auth, "Salary", "credit");

    create_account!(app, auth, groceries, "Milk", "debit", -250, "2024-02-10");
    create_account!(app, auth, groceries, "Bread", "debit", -120, "2024-03-01");
    create_account!(app, auth, groceries, "Cheese", "debit", -400, "2024-03-20");
    create_account!(app, auth, salary, "March pay", "credit", 300000, "2024-03-31");

    let expected_graph = json!([
        { "period": "2024-02", "total": -250, "count": 1 },
        { "period": "2024-03", "total": -520, "count": 2 },
    ]);

    let body = get_json!(app, auth, "/account/graph?type=debit");
    assert_eq!(body, expected_graph);

    let resp = post_json!(app, auth, "/account/graph", json!({ "type": "debit" }));
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, expected_graph);

    let body = get_json!(app, auth, "/account/reports?type=debit");
    assert_eq!(body, json!({ "type": "debit", "total": -770, "count": 3 }));

    let resp = post_json!(app, auth, "/account/reports", json!({ "type": "credit" }));
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "type": "credit", "total": 300000, "count": 1 }));
}

#[actix_web::test]
async fn test_aggregates_for_empty_ledger() {
    let app = setup_account_test!();
    let auth = login_user!(app);

    let body = get_json!(app, auth, "/account/graph?type=credit");
    assert_eq!(body, json!([]));

    let body = get_json!(app, auth, "/account/reports?type=credit");
    assert_eq!(body, json!({ "type": "credit", "total": 0, "count": 0 }));

    let req = test::TestRequest::get()
        .uri("/account/reports")
        .insert_header(("Authorization", auth.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_aggregates_survive_extreme_values() {
    let app = setup_account_test!();
    let auth = login_user!(app);
    let salary = create_category!(app, auth, "Salary", "credit");

    create_account!(app, auth, salary, "Jackpot", "credit", i32::MAX, "2024-03-01");
    create_account!(app, auth, salary, "Jackpot again", "credit", i32::MAX, "2024-03-02");

    let expected_total = 2 * i64::from(i32::MAX);

    let body = get_json!(app, auth, "/account/reports?type=credit");
    assert_eq!(body["total"], expected_total);
    assert_eq!(body["count"], 2);

    let body = get_json!(app, auth, "/account/graph?type=credit");
    assert_eq!(body, json!([{ "period": "2024-03", "total": expected_total, "count": 2 }]));

    // Out of range amounts never reach the store
    let resp = post_json!(
        app,
        auth,
        "/account",
        json!({ "title": "Too much", "type": "credit", "description": "", "category_id": salary, "date": "2024-03-03", "value": i64::MAX })
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri("/account/1")
        .insert_header(("Authorization", auth.clone()))
        .set_json(json!({ "value": i64::from(i32::MAX) + 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_blank_and_zero_list_filters_are_ignored() {
    let app = setup_account_test!();
    let auth = login_user!(app);
    let salary = create_category!(app, auth, "Salary", "credit");
    create_account!(app, auth, salary, "March pay", "credit", 300000, "2024-03-31");
    create_account!(app, auth, salary, "April pay", "credit", 300000, "2024-04-30");

    for uri in [
        "/accounts?type=credit&category_id=",
        "/accounts?type=credit&category_id=0",
        "/accounts?type=credit&category_id=-3",
        "/accounts?type=credit&date=",
        "/accounts?type=credit&title=",
        "/accounts?type=credit&category_id=&date=&title=&description=",
    ] {
        let body = get_json!(app, auth, uri);
        assert_eq!(body.as_array().unwrap().len(), 2, "uri: {uri}");
    }

    let req = test::TestRequest::get()
        .uri("/accounts?type=credit&category_id=abc")
        .insert_header(("Authorization", auth.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
