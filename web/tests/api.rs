//! End-to-end tests for the HTTP API.
//!
//! Runs the production router over the in-memory backend with a manual
//! clock, so rate windows and orderings are deterministic. Everything goes
//! through real HTTP requests; the store handle is only consulted to check
//! what was persisted.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::{TestResponse, TestServer};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rifa_core::clock::ManualClock;
use rifa_core::memory::MemoryStore;
use rifa_core::store::TicketStore;
use rifa_core::{CampaignId, RatePolicy};
use rifa_web::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

// ============================================================================
// Test Fixtures
// ============================================================================

struct TestApp {
    server: TestServer,
    store: MemoryStore,
    clock: Arc<ManualClock>,
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().unwrap()
}

fn spawn_app() -> TestApp {
    let store = MemoryStore::new();
    let clock = Arc::new(ManualClock::new(start()));
    let state = AppState::new(store.clone(), RatePolicy::default(), clock.clone());
    let server = TestServer::new(build_router(state)).expect("router must build");
    TestApp {
        server,
        store,
        clock,
    }
}

/// Create a campaign through the API, drawing in 30 days. Returns its id.
async fn create_campaign(app: &TestApp, title: &str) -> String {
    create_campaign_drawing_at(app, title, "2025-07-01T12:00:00Z").await
}

async fn create_campaign_drawing_at(app: &TestApp, title: &str, draw_date: &str) -> String {
    let response = app
        .server
        .post("/api/campaigns")
        .json(&json!({
            "title": title,
            "description": "Win a motorbike",
            "price": 10.0,
            "drawDate": draw_date,
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json::<Value>()["id"].as_str().unwrap().to_string()
}

/// Submit a participation from the given client IP (via `X-Forwarded-For`).
async fn participate(app: &TestApp, campaign_id: &str, email: &str, ip: &str) -> TestResponse {
    app.server
        .post("/api/participate")
        .add_header(
            HeaderName::from_static("x-forwarded-for"),
            HeaderValue::from_str(ip).unwrap(),
        )
        .json(&participation_body(campaign_id, email))
        .await
}

fn participation_body(campaign_id: &str, email: &str) -> Value {
    json!({
        "campaignId": campaign_id,
        "name": "Ana Lima",
        "email": email,
        "phone": "11999990000",
        "state": "SP",
    })
}

fn campaign_uuid(id: &str) -> CampaignId {
    CampaignId::from_uuid(Uuid::parse_str(id).unwrap())
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_reports_healthy_and_the_crate_version() {
    let app = spawn_app();

    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

// ============================================================================
// Participation
// ============================================================================

#[tokio::test]
async fn test_participation_allocates_a_six_digit_ticket() {
    let app = spawn_app();
    let campaign_id = create_campaign(&app, "Motorbike raffle").await;

    let response = participate(&app, &campaign_id, "ana@example.com", "203.0.113.7").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);

    let number = body["ticket"]["number"].as_str().unwrap();
    assert_eq!(number.len(), 6);
    let value: u32 = number.parse().unwrap();
    assert!((100_000..=999_999).contains(&value));

    assert_eq!(body["ticket"]["campaignId"].as_str().unwrap(), campaign_id);
    assert_eq!(body["ticket"]["status"], "SOLD");
    let message = body["message"].as_str().unwrap();
    assert_eq!(
        message,
        format!("Participation confirmed! Your number is {number}.")
    );

    // The ticket in the response is the one that was persisted
    let stored = app
        .store
        .get_ticket_by_number(campaign_uuid(&campaign_id), number)
        .await
        .unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn test_participation_rejects_unknown_and_completed_campaigns() {
    let app = spawn_app();

    // Unknown id
    let ghost = CampaignId::new().to_string();
    let response = participate(&app, &ghost, "ana@example.com", "203.0.113.7").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["message"], "Campaign not found");

    // Malformed id reads the same as a missing one
    let response = participate(&app, "not-a-campaign", "ana@example.com", "203.0.113.7").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    // Completed campaign
    let campaign_id = create_campaign(&app, "Motorbike raffle").await;
    participate(&app, &campaign_id, "ana@example.com", "203.0.113.7").await;
    let drawn = app
        .server
        .post(&format!("/api/campaigns/{campaign_id}/draw-auto"))
        .await;
    assert_eq!(drawn.status_code(), StatusCode::OK);

    let response = participate(&app, &campaign_id, "bia@example.com", "203.0.113.8").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["message"], "Campaign not found or inactive");
}

#[tokio::test]
async fn test_participation_validates_the_payload() {
    let app = spawn_app();
    let campaign_id = create_campaign(&app, "Motorbike raffle").await;

    // Missing name
    let response = app
        .server
        .post("/api/participate")
        .json(&json!({
            "campaignId": campaign_id,
            "email": "ana@example.com",
            "phone": "11999990000",
            "state": "SP",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "name is required");

    // Malformed email
    let response = participate(&app, &campaign_id, "not-an-email", "203.0.113.7").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "a valid email address is required");

    // Missing campaign id
    let response = app
        .server
        .post("/api/participate")
        .json(&json!({
            "name": "Ana Lima",
            "email": "ana@example.com",
            "phone": "11999990000",
            "state": "SP",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "campaignId is required");
}

#[tokio::test]
async fn test_repeat_email_reuses_the_participant() {
    let app = spawn_app();
    let campaign_id = create_campaign(&app, "Motorbike raffle").await;

    let first = participate(&app, &campaign_id, "ana@example.com", "203.0.113.7").await;
    app.clock.advance(Duration::seconds(1));
    let second = participate(&app, &campaign_id, "ana@example.com", "203.0.113.7").await;

    assert_eq!(first.status_code(), StatusCode::OK);
    assert_eq!(second.status_code(), StatusCode::OK);
    let first: Value = first.json();
    let second: Value = second.json();
    assert_eq!(
        first["ticket"]["participantId"],
        second["ticket"]["participantId"]
    );
    assert_ne!(first["ticket"]["number"], second["ticket"]["number"]);
}

// ============================================================================
// Rate Limiting
// ============================================================================

#[tokio::test]
async fn test_fourth_attempt_from_one_ip_is_limited_until_the_window_elapses() {
    let app = spawn_app();
    let campaign_id = create_campaign(&app, "Motorbike raffle").await;

    for i in 0..3 {
        let response = participate(
            &app,
            &campaign_id,
            &format!("user{i}@example.com"),
            "203.0.113.7",
        )
        .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let denied = participate(&app, &campaign_id, "user3@example.com", "203.0.113.7").await;
    assert_eq!(denied.status_code(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = denied.json();
    assert_eq!(body["code"], "RATE_LIMITED");
    // Frozen clock: the whole window remains
    assert_eq!(
        body["message"],
        "Too many attempts. Please wait 60 seconds before trying again."
    );

    app.clock.advance(Duration::seconds(61));

    let admitted = participate(&app, &campaign_id, "user4@example.com", "203.0.113.7").await;
    assert_eq!(admitted.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_email_budget_spans_client_ips() {
    let app = spawn_app();
    let campaign_id = create_campaign(&app, "Motorbike raffle").await;

    for ip in ["203.0.113.1", "203.0.113.2", "203.0.113.3"] {
        let response = participate(&app, &campaign_id, "ana@example.com", ip).await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let denied = participate(&app, &campaign_id, "ana@example.com", "203.0.113.4").await;
    assert_eq!(denied.status_code(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = denied.json();
    assert_eq!(
        body["message"],
        "This email was used too many times. Please wait 60 seconds before trying again."
    );
}

#[tokio::test]
async fn test_limiter_keys_on_the_first_forwarded_for_entry() {
    let app = spawn_app();
    let campaign_id = create_campaign(&app, "Motorbike raffle").await;

    // Three admissions for client 203.0.113.50 through one proxy chain
    for i in 0..3 {
        let response = app
            .server
            .post("/api/participate")
            .add_header(
                HeaderName::from_static("x-forwarded-for"),
                HeaderValue::from_static("203.0.113.50, 10.0.0.1"),
            )
            .json(&participation_body(
                &campaign_id,
                &format!("user{i}@example.com"),
            ))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    // Same client behind a different chain tail: still the same budget
    let denied = app
        .server
        .post("/api/participate")
        .add_header(
            HeaderName::from_static("x-forwarded-for"),
            HeaderValue::from_static("203.0.113.50, 99.9.9.9"),
        )
        .json(&participation_body(&campaign_id, "user3@example.com"))
        .await;
    assert_eq!(denied.status_code(), StatusCode::TOO_MANY_REQUESTS);

    // A different client identified by X-Real-IP has its own budget
    let admitted = app
        .server
        .post("/api/participate")
        .add_header(
            HeaderName::from_static("x-real-ip"),
            HeaderValue::from_static("198.51.100.2"),
        )
        .json(&participation_body(&campaign_id, "user3@example.com"))
        .await;
    assert_eq!(admitted.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_headerless_clients_share_one_budget() {
    let app = spawn_app();
    let campaign_id = create_campaign(&app, "Motorbike raffle").await;

    for i in 0..3 {
        let response = app
            .server
            .post("/api/participate")
            .json(&participation_body(
                &campaign_id,
                &format!("user{i}@example.com"),
            ))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    // No identifying header, fresh email: the shared bucket is exhausted
    let denied = app
        .server
        .post("/api/participate")
        .json(&participation_body(&campaign_id, "user3@example.com"))
        .await;
    assert_eq!(denied.status_code(), StatusCode::TOO_MANY_REQUESTS);
}

// ============================================================================
// Draws
// ============================================================================

#[tokio::test]
async fn test_automatic_draw_completes_the_campaign_once() {
    let app = spawn_app();
    let campaign_id = create_campaign(&app, "Motorbike raffle").await;
    let ticket: Value = participate(&app, &campaign_id, "ana@example.com", "203.0.113.7")
        .await
        .json();
    let number = ticket["ticket"]["number"].as_str().unwrap().to_string();

    let response = app
        .server
        .post(&format!("/api/campaigns/{campaign_id}/draw-auto"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["winnerNumber"].as_str().unwrap(), number);
    assert_eq!(body["campaign"]["status"], "COMPLETED");
    assert_eq!(body["campaign"]["winnerNumber"].as_str().unwrap(), number);

    // Terminal: a second draw conflicts
    let again = app
        .server
        .post(&format!("/api/campaigns/{campaign_id}/draw-auto"))
        .await;
    assert_eq!(again.status_code(), StatusCode::CONFLICT);
    let body: Value = again.json();
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["message"], "This campaign has already been drawn");
}

#[tokio::test]
async fn test_automatic_draw_needs_tickets_and_a_real_campaign() {
    let app = spawn_app();

    let ghost = CampaignId::new().to_string();
    let response = app
        .server
        .post(&format!("/api/campaigns/{ghost}/draw-auto"))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let campaign_id = create_campaign(&app, "Motorbike raffle").await;
    let response = app
        .server
        .post(&format!("/api/campaigns/{campaign_id}/draw-auto"))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "No tickets have been sold for this campaign");
}

#[tokio::test]
async fn test_manual_draw_crowns_the_chosen_ticket() {
    let app = spawn_app();
    let campaign_id = create_campaign(&app, "Motorbike raffle").await;
    let ticket: Value = participate(&app, &campaign_id, "ana@example.com", "203.0.113.7")
        .await
        .json();
    let number = ticket["ticket"]["number"].as_str().unwrap().to_string();

    // Blank number
    let response = app
        .server
        .post(&format!("/api/campaigns/{campaign_id}/draw-manual"))
        .json(&json!({ "winnerNumber": "   " }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "winnerNumber is required");

    // Number that was never issued
    let response = app
        .server
        .post(&format!("/api/campaigns/{campaign_id}/draw-manual"))
        .json(&json!({ "winnerNumber": "000001" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["message"], "Ticket number not found in this campaign");

    // The issued one
    let response = app
        .server
        .post(&format!("/api/campaigns/{campaign_id}/draw-manual"))
        .json(&json!({ "winnerNumber": number }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["winnerNumber"].as_str().unwrap(), number);
    assert_eq!(body["campaign"]["status"], "COMPLETED");

    // Terminal for manual draws too
    let response = app
        .server
        .post(&format!("/api/campaigns/{campaign_id}/draw-manual"))
        .json(&json!({ "winnerNumber": number }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

// ============================================================================
// Campaign Management
// ============================================================================

#[tokio::test]
async fn test_campaign_crud_lifecycle() {
    let app = spawn_app();

    // Create
    let response = app
        .server
        .post("/api/campaigns")
        .json(&json!({
            "title": "Motorbike raffle",
            "description": "Win a motorbike",
            "imageUrl": "https://cdn.example.com/bike.jpg",
            "price": 25.5,
            "drawDate": "2025-07-01T12:00:00Z",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["title"], "Motorbike raffle");
    assert_eq!(created["status"], "ACTIVE");
    assert_eq!(created["price"], 25.5);
    assert_eq!(created["imageUrl"], "https://cdn.example.com/bike.jpg");
    assert!(created["winnerNumber"].is_null());
    let campaign_id = created["id"].as_str().unwrap().to_string();

    // Listed newest first
    app.clock.advance(Duration::seconds(1));
    create_campaign(&app, "Second raffle").await;
    let list: Value = app.server.get("/api/campaigns").await.json();
    let titles: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Second raffle", "Motorbike raffle"]);

    // Update
    let response = app
        .server
        .put(&format!("/api/campaigns/{campaign_id}"))
        .json(&json!({
            "title": "Motorbike raffle (extended)",
            "description": "Win a motorbike",
            "price": 30.0,
            "drawDate": "2025-07-15T12:00:00Z",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["title"], "Motorbike raffle (extended)");
    assert_eq!(updated["price"], 30.0);

    // Detail carries tickets with their holders
    participate(&app, &campaign_id, "ana@example.com", "203.0.113.7").await;
    let detail: Value = app
        .server
        .get(&format!("/api/campaigns/{campaign_id}"))
        .await
        .json();
    assert_eq!(detail["title"], "Motorbike raffle (extended)");
    let tickets = detail["tickets"].as_array().unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["participant"]["email"], "ana@example.com");
    assert_eq!(tickets[0]["participant"]["name"], "Ana Lima");

    // Delete cascades the tickets
    let response = app
        .server
        .delete(&format!("/api/campaigns/{campaign_id}"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);

    let response = app
        .server
        .get(&format!("/api/campaigns/{campaign_id}"))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert!(app
        .store
        .list_campaign_tickets(campaign_uuid(&campaign_id))
        .await
        .unwrap()
        .is_empty());

    // Deleting again: already gone
    let response = app
        .server
        .delete(&format!("/api/campaigns/{campaign_id}"))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_campaign_validates_the_payload() {
    let app = spawn_app();

    let response = app
        .server
        .post("/api/campaigns")
        .json(&json!({
            "title": "   ",
            "description": "Win a motorbike",
            "price": 10.0,
            "drawDate": "2025-07-01T12:00:00Z",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "title is required");

    let response = app
        .server
        .post("/api/campaigns")
        .json(&json!({
            "title": "Motorbike raffle",
            "description": "Win a motorbike",
            "price": -1.0,
            "drawDate": "2025-07-01T12:00:00Z",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "price must be a non-negative number");

    let response = app
        .server
        .post("/api/campaigns")
        .json(&json!({
            "title": "Motorbike raffle",
            "description": "Win a motorbike",
            "price": 10.0,
            "drawDate": "next friday",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "drawDate must be an RFC 3339 date-time");
}

#[tokio::test]
async fn test_completed_campaigns_leave_the_listing_but_stay_readable() {
    let app = spawn_app();
    let campaign_id = create_campaign(&app, "Motorbike raffle").await;
    let ticket: Value = participate(&app, &campaign_id, "ana@example.com", "203.0.113.7")
        .await
        .json();
    let number = ticket["ticket"]["number"].as_str().unwrap().to_string();

    app.server
        .post(&format!("/api/campaigns/{campaign_id}/draw-manual"))
        .json(&json!({ "winnerNumber": number }))
        .await;

    let list: Value = app.server.get("/api/campaigns").await.json();
    assert!(list.as_array().unwrap().is_empty());

    // The record stays auditable by id
    let detail: Value = app
        .server
        .get(&format!("/api/campaigns/{campaign_id}"))
        .await
        .json();
    assert_eq!(detail["status"], "COMPLETED");
    assert_eq!(detail["winnerNumber"].as_str().unwrap(), number);
}

#[tokio::test]
async fn test_update_is_rejected_after_the_draw() {
    let app = spawn_app();
    let campaign_id = create_campaign(&app, "Motorbike raffle").await;
    participate(&app, &campaign_id, "ana@example.com", "203.0.113.7").await;
    app.server
        .post(&format!("/api/campaigns/{campaign_id}/draw-auto"))
        .await;

    let response = app
        .server
        .put(&format!("/api/campaigns/{campaign_id}"))
        .json(&json!({
            "title": "Rewritten history",
            "description": "Win a motorbike",
            "price": 10.0,
            "drawDate": "2025-07-01T12:00:00Z",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["message"], "This campaign has already been drawn");
}

// ============================================================================
// Stats
// ============================================================================

#[tokio::test]
async fn test_stats_count_active_ending_soon_and_participants() {
    let app = spawn_app();

    // Draws in 30 days: active, not ending soon
    let far = create_campaign_drawing_at(&app, "Far raffle", "2025-07-01T12:00:00Z").await;
    // Draws in 3 days: active and ending soon
    create_campaign_drawing_at(&app, "Near raffle", "2025-06-04T12:00:00Z").await;
    // Will be drawn: completed campaigns count nowhere
    let done = create_campaign_drawing_at(&app, "Done raffle", "2025-06-03T12:00:00Z").await;

    participate(&app, &far, "ana@example.com", "203.0.113.7").await;
    participate(&app, &done, "bia@example.com", "203.0.113.8").await;
    app.server
        .post(&format!("/api/campaigns/{done}/draw-auto"))
        .await;

    let stats: Value = app.server.get("/api/stats").await.json();
    assert_eq!(stats["totalCampaigns"], 2);
    assert_eq!(stats["endingSoon"], 1);
    assert_eq!(stats["totalParticipants"], 2);
}

#[tokio::test]
async fn test_ending_soon_tracks_the_clock() {
    let app = spawn_app();
    create_campaign_drawing_at(&app, "Mid-June raffle", "2025-06-15T12:00:00Z").await;

    let stats: Value = app.server.get("/api/stats").await.json();
    assert_eq!(stats["endingSoon"], 0);

    // Two weeks later the draw date falls inside the 7-day horizon
    app.clock.advance(Duration::days(12));
    let stats: Value = app.server.get("/api/stats").await.json();
    assert_eq!(stats["endingSoon"], 1);
}
