//! API integration tests
//!
//! Run against a live server with a fresh database:
//! `cargo test -- --ignored`

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Create a book with the given stock and fee, returning its id
async fn create_book(client: &Client, isbn: &str, stock: i32, rent_fee: &str) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "The Trial",
            "author": "Franz Kafka",
            "isbn": isbn,
            "publication_year": 1925,
            "stock": stock,
            "rent_fee": rent_fee
        }))
        .send()
        .await
        .expect("Failed to create book");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse book");
    body["id"].as_i64().expect("No book id")
}

/// Register a member, returning their id
async fn register_member(client: &Client, email: &str) -> i64 {
    let response = client
        .post(format!("{}/members", BASE_URL))
        .json(&json!({
            "first_name": "Josef",
            "last_name": "K",
            "email": email,
            "phone_number": "0123456789",
            "balance": "0"
        }))
        .send()
        .await
        .expect("Failed to register member");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse member");
    body["id"].as_i64().expect("No member id")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_issue_and_return_flow() {
    let client = Client::new();
    let book_id = create_book(&client, "9780000000101", 1, "5.00").await;
    let member_id = register_member(&client, "issue-return@example.org").await;

    // Issue
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({ "member_id": member_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to issue book");
    assert_eq!(response.status(), 201);

    let loan: Value = response.json().await.expect("Failed to parse loan");
    assert_eq!(loan["status"], "Issued");
    assert_eq!(loan["fee"], "5.00");
    let loan_id = loan["id"].as_i64().expect("No loan id");

    // Stock is now 0
    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to get book")
        .json()
        .await
        .expect("Failed to parse book");
    assert_eq!(book["stock"], 0);

    // Return
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .send()
        .await
        .expect("Failed to return book");
    assert_eq!(response.status(), 200);

    let returned: Value = response.json().await.expect("Failed to parse loan");
    assert_eq!(returned["status"], "Returned");
    assert!(!returned["return_date"].is_null());

    // Fee deducted from the member balance
    let balance: Value = client
        .get(format!("{}/members/{}/balance", BASE_URL, member_id))
        .send()
        .await
        .expect("Failed to get balance")
        .json()
        .await
        .expect("Failed to parse balance");
    assert_eq!(balance["balance"], "-5.00");
}

#[tokio::test]
#[ignore]
async fn test_issue_out_of_stock() {
    let client = Client::new();
    let book_id = create_book(&client, "9780000000102", 1, "5.00").await;
    let member_a = register_member(&client, "stock-a@example.org").await;
    let member_b = register_member(&client, "stock-b@example.org").await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({ "member_id": member_a, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to issue book");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({ "member_id": member_b, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], "OutOfStock");
}

#[tokio::test]
#[ignore]
async fn test_double_return_rejected() {
    let client = Client::new();
    let book_id = create_book(&client, "9780000000103", 1, "2.50").await;
    let member_id = register_member(&client, "double-return@example.org").await;

    let loan: Value = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({ "member_id": member_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to issue book")
        .json()
        .await
        .expect("Failed to parse loan");
    let loan_id = loan["id"].as_i64().expect("No loan id");

    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .send()
        .await
        .expect("Failed to return book");
    assert_eq!(response.status(), 200);

    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], "AlreadyReturned");
}

#[tokio::test]
#[ignore]
async fn test_cancel_membership_with_loan_history() {
    let client = Client::new();
    let book_id = create_book(&client, "9780000000104", 1, "1.00").await;
    let member_id = register_member(&client, "cancel-history@example.org").await;

    // Build up some settled loan history
    let loan: Value = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({ "member_id": member_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to issue book")
        .json()
        .await
        .expect("Failed to parse loan");
    let loan_id = loan["id"].as_i64().expect("No loan id");

    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .send()
        .await
        .expect("Failed to return book");
    assert_eq!(response.status(), 200);

    // Returned loans must not block cancellation
    let response = client
        .delete(format!("{}/members/{}", BASE_URL, member_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/members/{}", BASE_URL, member_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_cancel_membership_not_found() {
    let client = Client::new();

    let response = client
        .delete(format!("{}/members/999999", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], "NotFound");
}
