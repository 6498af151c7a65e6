//! API integration tests
//!
//! These run against a live server with a migrated database and an
//! admin/admin staff account. Run with: cargo test -- --ignored

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated staff token
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response
        .json()
        .await
        .expect("Failed to parse login response");
    body["token"]
        .as_str()
        .expect("No token in response")
        .to_string()
}

/// Create a book and return its id
async fn create_book(client: &Client, token: &str, title: &str, copies: i32) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": title,
            "author": "Test Author",
            "total_copies": copies
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse book");
    body["id"].as_i64().expect("No book id")
}

/// Create a member and return their id
async fn create_member(client: &Client, token: &str, email: &str) -> i64 {
    let response = client
        .post(format!("{}/members", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "first_name": "Test",
            "last_name": "Member",
            "email": email,
            "password": "testpass"
        }))
        .send()
        .await
        .expect("Failed to create member");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse member");
    body["id"].as_i64().expect("No member id")
}

async fn issue_loan(client: &Client, token: &str, book_id: i64, member_id: i64) -> Value {
    issue_loan_with(client, token, &json!({ "book_id": book_id, "member_id": member_id })).await
}

async fn issue_loan_with(client: &Client, token: &str, payload: &Value) -> Value {
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(payload)
        .send()
        .await
        .expect("Failed to issue loan");
    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse loan")
}

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Utc::now().timestamp_nanos_opt().unwrap_or(0))
}

#[tokio::test]
#[ignore]
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
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_requests_without_token_are_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_isbn_is_a_conflict() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let isbn = unique("978");
    let payload = json!({
        "title": "First Edition",
        "author": "Test Author",
        "isbn": isbn,
        "total_copies": 1
    });

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_issue_decrements_available_copies() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, &unique("Issue Test"), 2).await;
    let member_id = create_member(&client, &token, &format!("{}@test.org", unique("issue"))).await;

    let loan = issue_loan(&client, &token, book_id, member_id).await;
    assert_eq!(loan["status"], "BORROWED");

    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to fetch book")
        .json()
        .await
        .expect("Failed to parse book");
    assert_eq!(book["available_copies"], 1);
    assert_eq!(book["borrowed_count"], 1);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_loan_is_a_conflict() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, &unique("Dup Test"), 3).await;
    let member_id = create_member(&client, &token, &format!("{}@test.org", unique("dup"))).await;

    issue_loan(&client, &token, book_id, member_id).await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id, "member_id": member_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_exhausted_copies_block_issue() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, &unique("Single Copy"), 1).await;
    let first = create_member(&client, &token, &format!("{}@test.org", unique("first"))).await;
    let second = create_member(&client, &token, &format!("{}@test.org", unique("second"))).await;

    issue_loan(&client, &token, book_id, first).await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id, "member_id": second }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_inactive_member_cannot_borrow() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, &unique("Inactive Test"), 1).await;
    let member_id =
        create_member(&client, &token, &format!("{}@test.org", unique("inactive"))).await;

    let response = client
        .put(format!("{}/members/{}", BASE_URL, member_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "status": "INACTIVE" }))
        .send()
        .await
        .expect("Failed to update member");
    assert!(response.status().is_success());

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id, "member_id": member_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_on_time_return_creates_no_fine() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, &unique("On Time"), 1).await;
    let member_id = create_member(&client, &token, &format!("{}@test.org", unique("ontime"))).await;

    let loan = issue_loan(&client, &token, book_id, member_id).await;
    let loan_id = loan["id"].as_i64().expect("No loan id");

    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to return loan");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse outcome");
    assert_eq!(body["loan"]["status"], "RETURNED");
    assert_eq!(body["days_overdue"], 0);
    assert_eq!(body["fine_amount"], "0");

    // The copy is back on the shelf
    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to fetch book")
        .json()
        .await
        .expect("Failed to parse book");
    assert_eq!(book["available_copies"], 1);
    assert_eq!(book["borrowed_count"], 0);
}

#[tokio::test]
#[ignore]
async fn test_overdue_return_records_fine() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, &unique("Overdue"), 1).await;
    let member_id =
        create_member(&client, &token, &format!("{}@test.org", unique("overdue"))).await;

    // Issue with a due date three days in the past
    let due = (Utc::now() - Duration::days(3)).to_rfc3339();
    let loan = issue_loan_with(
        &client,
        &token,
        &json!({ "book_id": book_id, "member_id": member_id, "due_date": due }),
    )
    .await;
    let loan_id = loan["id"].as_i64().expect("No loan id");

    // While open, the loan reads as OVERDUE with an accrued fine
    let details: Value = client
        .get(format!("{}/loans/{}", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to fetch loan")
        .json()
        .await
        .expect("Failed to parse loan");
    assert_eq!(details["current_state"], "OVERDUE");

    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to return loan");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse outcome");
    // Any fraction of a day counts, so three days plus handling time is four
    let days = body["days_overdue"].as_i64().expect("No days_overdue");
    assert_eq!(days, 4);
    assert_eq!(body["fine_amount"], "4.00");

    // The fine shows up as PENDING for the member
    let fines: Value = client
        .get(format!("{}/fines?member_id={}&status=PENDING", BASE_URL, member_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to list fines")
        .json()
        .await
        .expect("Failed to parse fines");
    assert_eq!(fines["total"], 1);
    assert_eq!(fines["items"][0]["reason"], format!("Overdue fine for {} days", days));
}

#[tokio::test]
#[ignore]
async fn test_second_return_is_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, &unique("Double Return"), 1).await;
    let member_id =
        create_member(&client, &token, &format!("{}@test.org", unique("double"))).await;

    let loan = issue_loan(&client, &token, book_id, member_id).await;
    let loan_id = loan["id"].as_i64().expect("No loan id");

    let url = format!("{}/loans/{}/return", BASE_URL, loan_id);
    let auth = format!("Bearer {}", token);

    let first = client.post(&url).header("Authorization", &auth).send().await;
    assert!(first.expect("Failed first return").status().is_success());

    let second = client.post(&url).header("Authorization", &auth).send().await;
    assert_eq!(second.expect("Failed second return").status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_fine_resolution_is_one_way() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, &unique("Fine Flow"), 1).await;
    let member_id = create_member(&client, &token, &format!("{}@test.org", unique("fine"))).await;

    let due = (Utc::now() - Duration::days(1)).to_rfc3339();
    let loan = issue_loan_with(
        &client,
        &token,
        &json!({ "book_id": book_id, "member_id": member_id, "due_date": due }),
    )
    .await;
    let loan_id = loan["id"].as_i64().expect("No loan id");

    client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to return loan");

    let fines: Value = client
        .get(format!("{}/fines?member_id={}", BASE_URL, member_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to list fines")
        .json()
        .await
        .expect("Failed to parse fines");
    let fine_id = fines["items"][0]["id"].as_i64().expect("No fine id");

    let response = client
        .put(format!("{}/fines/{}/status", BASE_URL, fine_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "status": "PAID" }))
        .send()
        .await
        .expect("Failed to resolve fine");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse fine");
    assert_eq!(body["status"], "PAID");
    assert!(!body["paid_date"].is_null());

    // A second transition is rejected
    let response = client
        .put(format!("{}/fines/{}/status", BASE_URL, fine_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "status": "WAIVED" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_waived_fine_has_no_paid_date() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, &unique("Waive Flow"), 1).await;
    let member_id = create_member(&client, &token, &format!("{}@test.org", unique("waive"))).await;

    let due = (Utc::now() - Duration::days(1)).to_rfc3339();
    let loan = issue_loan_with(
        &client,
        &token,
        &json!({ "book_id": book_id, "member_id": member_id, "due_date": due }),
    )
    .await;
    let loan_id = loan["id"].as_i64().expect("No loan id");

    client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to return loan");

    let fines: Value = client
        .get(format!("{}/fines?member_id={}", BASE_URL, member_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to list fines")
        .json()
        .await
        .expect("Failed to parse fines");
    let fine_id = fines["items"][0]["id"].as_i64().expect("No fine id");

    let response = client
        .put(format!("{}/fines/{}/status", BASE_URL, fine_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "status": "WAIVED" }))
        .send()
        .await
        .expect("Failed to waive fine");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse fine");
    assert_eq!(body["status"], "WAIVED");
    // Waiving is not a payment
    assert!(body["paid_date"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_member_sees_only_own_loans() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let email = format!("{}@test.org", unique("selfview"));
    let member_id = create_member(&client, &token, &email).await;
    let book_id = create_book(&client, &token, &unique("Self View"), 1).await;
    issue_loan(&client, &token, book_id, member_id).await;

    let login: Value = client
        .post(format!("{}/auth/member/login", BASE_URL))
        .json(&json!({ "email": email, "password": "testpass" }))
        .send()
        .await
        .expect("Failed to login member")
        .json()
        .await
        .expect("Failed to parse login");
    let member_token = login["token"].as_str().expect("No member token");

    let loans: Value = client
        .get(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", member_token))
        .send()
        .await
        .expect("Failed to list loans")
        .json()
        .await
        .expect("Failed to parse loans");
    for loan in loans["items"].as_array().expect("No items") {
        assert_eq!(loan["member_id"].as_i64(), Some(member_id));
    }

    // Members cannot issue loans
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", member_token))
        .json(&json!({ "book_id": book_id, "member_id": member_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_deactivation_blocked_while_books_out() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, &unique("Deactivate"), 1).await;
    let member_id =
        create_member(&client, &token, &format!("{}@test.org", unique("deact"))).await;
    issue_loan(&client, &token, book_id, member_id).await;

    let response = client
        .delete(format!("{}/members/{}", BASE_URL, member_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}
