//! Integration tests for the customer endpoints and health endpoints.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use bank_demo_api::api::create_router;
use bank_demo_api::domain::{
    CreatedCustomer, CustomerDto, Envelope, ErrorResponse, HealthResponse, HealthStatus,
    ValidationErrorResponse,
};
use bank_demo_api::test_utils::{
    MockStore, bearer, customer_request, seed_customer, state_with_store,
};

fn create_test_app() -> (Arc<MockStore>, Router) {
    let store = Arc::new(MockStore::new());
    let router = create_router(state_with_store(Arc::clone(&store)));
    (store, router)
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_list_customers_empty_is_not_found() {
    let (_, router) = create_test_app();

    let response = router.oneshot(get("/api/customers")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: ErrorResponse = body_json(response).await;
    assert_eq!(body.error_message, "Error not found: Customers not found");
    assert_eq!(body.code, 404);
}

#[tokio::test]
async fn test_list_customers_pagination() {
    let (store, router) = create_test_app();
    let seeded: Vec<_> = (0..4).map(|_| seed_customer(&store)).collect();

    let response = router
        .oneshot(get("/api/customers?limit=2&offset=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Envelope<Vec<CustomerDto>> = body_json(response).await;
    assert_eq!(body.status, 200);
    let page = body.data.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, seeded[1].id);
    assert_eq!(page[1].id, seeded[2].id);
}

#[tokio::test]
async fn test_list_customers_never_exposes_tokens() {
    let (store, router) = create_test_app();
    let customer = seed_customer(&store);

    let response = router.oneshot(get("/api/customers")).await.unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(!text.contains(&customer.token));
    assert!(!text.contains("\"token\""));
}

#[tokio::test]
async fn test_list_customers_rejects_bad_parameters() {
    let (_, router) = create_test_app();

    for uri in [
        "/api/customers?limit=abc",
        "/api/customers?limit=0",
        "/api/customers?offset=-1",
    ] {
        let response = router.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body: ErrorResponse = body_json(response).await;
        assert!(
            body.error_message.starts_with("Failed to parse parameters"),
            "{uri}: {}",
            body.error_message
        );
    }
}

#[tokio::test]
async fn test_create_customer_success() {
    let (store, router) = create_test_app();
    let payload = serde_json::to_value(customer_request()).unwrap();

    let response = router
        .oneshot(json_request("POST", "/api/customers", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let body: Envelope<CreatedCustomer> = body_json(response).await;
    assert_eq!(body.status, 201);
    let created = body.data.unwrap();
    assert_eq!(location, format!("/api/customers/{}", created.id));
    assert_eq!(created.token.len(), 40);

    let stored = store.find_customer(created.id).unwrap();
    assert_eq!(stored.token, created.token);
    assert_eq!(stored.email, "john.doe@example.com");
}

#[tokio::test]
async fn test_create_customer_accepts_pascal_case_fields() {
    let (store, router) = create_test_app();
    let payload = json!({
        "FirstName": "Jane",
        "LastName": "Roe",
        "Birthday": "1985-06-15T00:00:00Z",
        "Email": "jane.roe@example.com",
        "Phone": "+420605401051",
        "State": "Slovakia",
        "Address": "1 Side St"
    });

    let response = router
        .oneshot(json_request("POST", "/api/customers", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let customers = store.customers();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].first_name, "Jane");
    assert_eq!(customers[0].state, "Slovakia");
}

#[tokio::test]
async fn test_create_customer_reports_violations_in_field_order() {
    let (store, router) = create_test_app();
    let payload = json!({
        "first_name": "John",
        "email": "not-an-email",
        "phone": "+420605401050"
    });

    let response = router
        .oneshot(json_request("POST", "/api/customers", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: ValidationErrorResponse = body_json(response).await;
    assert_eq!(body.message, "Failed to validate request");
    assert_eq!(body.status, 400);
    assert_eq!(
        body.errors,
        vec![
            "last name is required",
            "birthday is required",
            "email is invalid",
            "state is required",
            "address is required",
        ]
    );
    assert!(store.customers().is_empty());
}

#[tokio::test]
async fn test_create_customer_malformed_json() {
    let (_, router) = create_test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/customers")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = body_json(response).await;
    assert!(body.error_message.starts_with("Failed to parse the body"));
}

#[tokio::test]
async fn test_get_customer_by_id_and_alias_route() {
    let (store, router) = create_test_app();
    let customer = seed_customer(&store);

    for uri in [
        format!("/api/customers/{}", customer.id),
        format!("/api/customer/{}", customer.id),
    ] {
        let response = router.clone().oneshot(get(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let body: Envelope<CustomerDto> = body_json(response).await;
        assert_eq!(body.data.unwrap().id, customer.id);
    }
}

#[tokio::test]
async fn test_get_customer_malformed_uuid() {
    let (_, router) = create_test_app();

    let response = router.oneshot(get("/api/customers/not-a-uuid")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = body_json(response).await;
    assert!(body.error_message.starts_with("Failed to parse UUID"));
}

#[tokio::test]
async fn test_update_customer_keeps_identity() {
    let (store, router) = create_test_app();
    let customer = seed_customer(&store);

    let mut update = customer_request();
    update.address = Some("742 Evergreen Terrace".to_string());
    let mut request = json_request(
        "PUT",
        &format!("/api/customer/{}", customer.id),
        &serde_json::to_value(update).unwrap(),
    );
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, bearer(&customer.token).parse().unwrap());

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Envelope<CustomerDto> = body_json(response).await;
    let updated = body.data.unwrap();
    assert_eq!(updated.id, customer.id);
    assert_eq!(updated.created_at, customer.created_at);
    assert_eq!(updated.address, "742 Evergreen Terrace");

    let stored = store.find_customer(customer.id).unwrap();
    assert_eq!(stored.token, customer.token);
}

#[tokio::test]
async fn test_update_customer_requires_matching_token() {
    let (store, router) = create_test_app();
    let customer = seed_customer(&store);
    let other = seed_customer(&store);

    let mut request = json_request(
        "PUT",
        &format!("/api/customer/{}", customer.id),
        &serde_json::to_value(customer_request()).unwrap(),
    );
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, bearer(&other.token).parse().unwrap());

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: ErrorResponse = body_json(response).await;
    assert_eq!(body.error_message, "Not authorized! Bad credentials");
}

#[tokio::test]
async fn test_delete_customer_then_get_is_not_found() {
    let (store, router) = create_test_app();
    let customer = seed_customer(&store);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/customer/{}", customer.id))
        .header(header::AUTHORIZATION, bearer(&customer.token))
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Envelope<Value> = body_json(response).await;
    assert_eq!(body.message, "Customer deleted");
    assert!(body.data.is_none());

    let response = router
        .oneshot(get(&format!("/api/customers/{}", customer.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_database_failure_is_internal_error() {
    let store = Arc::new(MockStore::failing("connection reset"));
    let router = create_router(state_with_store(store));

    let response = router.oneshot(get("/api/customers")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: ErrorResponse = body_json(response).await;
    assert_eq!(body.code, 500);
}

#[tokio::test]
async fn test_health_check_healthy() {
    let (_, router) = create_test_app();

    let response = router.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health: HealthResponse = body_json(response).await;
    assert_eq!(health.status, HealthStatus::Healthy);
}

#[tokio::test]
async fn test_health_check_unhealthy_database() {
    let (store, router) = create_test_app();
    store.set_healthy(false);

    let response = router.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health: HealthResponse = body_json(response).await;
    assert_eq!(health.status, HealthStatus::Unhealthy);
}
