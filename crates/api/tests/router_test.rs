//! End-to-end router tests over the in-memory backend.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::AUTHORIZATION},
};
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use fintrack_api::{AppState, create_router};
use fintrack_db::Storage;
use fintrack_shared::{JwtConfig, JwtService};

fn app() -> Router {
    let jwt = JwtService::new(JwtConfig {
        secret: "router-test-secret".to_string(),
        access_token_expires_secs: 3600,
    });
    create_router(AppState::new(&Storage::in_memory(), jwt))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Registers a fresh user and returns their token.
async fn register(app: &Router) -> String {
    let email: String = SafeEmail().fake();
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "name": "Ana Lima", "email": email, "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn create(app: &Router, token: &str, body: Value) -> Value {
    let (status, response) =
        send(app, Method::POST, "/transactions", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{response}");
    response["data"].clone()
}

fn tx(date: &str, kind: &str, category: &str, description: &str, amount: f64) -> Value {
    json!({
        "date": date,
        "type": kind,
        "category": category,
        "description": description,
        "amount": amount,
    })
}

fn field_names(body: &Value) -> Vec<&str> {
    body["errors"]
        .as_array()
        .map(|errors| errors.iter().filter_map(|e| e["field"].as_str()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_health_reports_memory_backend() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/transactions", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, Method::GET, "/transactions/stats", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = app();
    let credentials = json!({ "name": "Bo", "email": "Bo@Example.com", "password": "secret1" });

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(credentials.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["user"]["email"], "bo@example.com");
    assert!(body["data"]["user"].get("passwordHash").is_none());

    let (status, body) = send(&app, Method::POST, "/auth/register", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "bo@example.com", "password": "wrong-one" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, unknown) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown["message"], body["message"]);

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "BO@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Bo");
}

#[tokio::test]
async fn test_register_validates_every_field() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "name": "", "email": "nope", "password": "123" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = field_names(&body);
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

#[tokio::test]
async fn test_stats_for_income_and_expense() {
    let app = app();
    let token = register(&app).await;
    create(&app, &token, tx("2024-01-05", "income", "Salary", "January pay", 100.0)).await;
    create(&app, &token, tx("2024-01-10", "expense", "Food", "Groceries", 40.0)).await;

    let (status, body) = send(&app, Method::GET, "/transactions/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let summary = &body["data"];
    assert_eq!(summary["totalIncome"], json!(100.0));
    assert_eq!(summary["totalExpense"], json!(40.0));
    assert_eq!(summary["netAmount"], json!(60.0));
    assert_eq!(summary["totalTransactions"], 2);

    let (_, body) = send(
        &app,
        Method::GET,
        "/transactions/stats/categories?type=expense",
        Some(&token),
        None,
    )
    .await;
    let categories = body["data"].as_array().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["category"], "Food");
    assert_eq!(categories[0]["type"], "expense");

    let (_, body) = send(
        &app,
        Method::GET,
        "/transactions/stats/monthly?year=2024",
        Some(&token),
        None,
    )
    .await;
    let months = body["data"].as_array().unwrap();
    assert_eq!(months.len(), 1);
    assert_eq!(months[0]["month"], 1);
    assert_eq!(months[0]["net"], json!(60.0));
}

#[tokio::test]
async fn test_stats_respect_date_range() {
    let app = app();
    let token = register(&app).await;
    create(&app, &token, tx("2024-01-05", "income", "Salary", "January pay", 100.0)).await;
    create(&app, &token, tx("2024-01-10", "expense", "Food", "Groceries", 40.0)).await;
    create(&app, &token, tx("2024-02-10", "expense", "Rent", "February rent", 500.0)).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/transactions/stats?startDate=2024-01-01&endDate=2024-01-31",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let summary = &body["data"];
    assert_eq!(summary["totalIncome"], json!(100.0));
    assert_eq!(summary["totalExpense"], json!(40.0));
    assert_eq!(summary["netAmount"], json!(60.0));
    assert_eq!(summary["totalTransactions"], 2);
}

#[tokio::test]
async fn test_monthly_for_empty_year_is_empty_list() {
    let app = app();
    let token = register(&app).await;
    create(&app, &token, tx("2024-03-01", "expense", "Rent", "March rent", 900.0)).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/transactions/stats/monthly?year=1999",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_records_of_other_users_are_not_found() {
    let app = app();
    let owner = register(&app).await;
    let intruder = register(&app).await;
    let created = create(&app, &owner, tx("2024-02-01", "expense", "Food", "Lunch", 12.5)).await;
    let uri = format!("/transactions/{}", created["id"].as_str().unwrap());

    let (status, foreign) = send(&app, Method::GET, &uri, Some(&intruder), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(&intruder),
        Some(json!({ "amount": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&intruder), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let missing = "/transactions/01890a5d-ac96-774b-bcce-b302099a8057";
    let (status, absent) = send(&app, Method::GET, missing, Some(&owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(absent, foreign);

    let (status, body) = send(&app, Method::GET, &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["amount"], json!(12.5));
}

#[tokio::test]
async fn test_malformed_id_is_not_found() {
    let app = app();
    let token = register(&app).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/transactions/64b7f0c2e1a5",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Transaction not found");
}

#[tokio::test]
async fn test_list_rejects_bad_parameters() {
    let app = app();
    let token = register(&app).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/transactions?limit=0&type=transfer&sortBy=colour",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = field_names(&body);
    assert!(fields.contains(&"limit"));
    assert!(fields.contains(&"type"));
    assert!(fields.contains(&"sortBy"));
}

#[tokio::test]
async fn test_list_paginates_and_sorts() {
    let app = app();
    let token = register(&app).await;
    for day in 1..=12 {
        let date = format!("2024-05-{day:02}");
        create(&app, &token, tx(&date, "expense", "Food", "Meal", f64::from(day))).await;
    }

    let (status, body) = send(
        &app,
        Method::GET,
        "/transactions?page=2&limit=5&sortBy=amount&sortOrder=asc",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    let amounts: Vec<f64> = data["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["amount"].as_f64().unwrap())
        .collect();
    assert_eq!(amounts, vec![6.0, 7.0, 8.0, 9.0, 10.0]);

    let pagination = &data["pagination"];
    assert_eq!(pagination["currentPage"], 2);
    assert_eq!(pagination["totalPages"], 3);
    assert_eq!(pagination["totalTransactions"], 12);
    assert_eq!(pagination["hasNextPage"], true);
    assert_eq!(pagination["hasPrevPage"], true);

    let (_, body) = send(&app, Method::GET, "/transactions?page=9", Some(&token), None).await;
    assert_eq!(body["data"]["transactions"], json!([]));
    assert_eq!(body["data"]["pagination"]["hasNextPage"], false);
}

#[tokio::test]
async fn test_text_filters_are_literal() {
    let app = app();
    let token = register(&app).await;
    create(&app, &token, tx("2024-06-01", "expense", "Food", "Coffee 50% off", 3.0)).await;
    create(&app, &token, tx("2024-06-02", "expense", "Food", "Coffee beans", 9.0)).await;
    create(&app, &token, tx("2024-06-03", "expense", "Travel", "Train", 20.0)).await;

    let (_, body) = send(
        &app,
        Method::GET,
        "/transactions?description=50%25",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"]["pagination"]["totalTransactions"], 1);

    let (_, body) = send(
        &app,
        Method::GET,
        "/transactions?description=.*",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"]["pagination"]["totalTransactions"], 0);

    let (_, body) = send(&app, Method::GET, "/transactions?category=FOO", Some(&token), None).await;
    assert_eq!(body["data"]["pagination"]["totalTransactions"], 2);
}

#[tokio::test]
async fn test_create_reports_every_invalid_field() {
    let app = app();
    let token = register(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/transactions",
        Some(&token),
        Some(json!({ "amount": 0, "type": "transfer", "paymentMethod": "cheque" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = field_names(&body);
    for field in ["date", "description", "amount", "category", "type", "paymentMethod"] {
        assert!(fields.contains(&field), "missing {field} in {body}");
    }
}

#[tokio::test]
async fn test_malformed_json_is_a_validation_error() {
    let app = app();
    let token = register(&app).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/transactions")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .body(Body::from("{\"amount\": "))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(field_names(&body), vec!["body"]);
}

#[tokio::test]
async fn test_patch_updates_and_clears_fields() {
    let app = app();
    let token = register(&app).await;
    let mut body = tx("2024-07-01", "expense", "Bills", "Phone", 30.0);
    body["notes"] = json!("paid late");
    body["paymentMethod"] = json!("credit_card");
    let created = create(&app, &token, body).await;
    let uri = format!("/transactions/{}", created["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(&token),
        Some(json!({ "isRecurring": true })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(field_names(&body).contains(&"recurringFrequency"));

    let (status, body) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(&token),
        Some(json!({ "notes": null, "amount": 35.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated = &body["data"];
    assert_eq!(updated["notes"], Value::Null);
    assert_eq!(updated["amount"], json!(35.5));
    assert_eq!(updated["paymentMethod"], "credit_card");
    assert_eq!(updated["description"], "Phone");
    assert_eq!(updated["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn test_delete_returns_prior_state() {
    let app = app();
    let token = register(&app).await;
    let created = create(&app, &token, tx("2024-08-01", "income", "Gift", "Birthday", 50.0)).await;
    let uri = format!("/transactions/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], created["id"]);
    assert_eq!(body["data"]["description"], "Birthday");

    let (status, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
