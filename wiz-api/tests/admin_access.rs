mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use wiz_api::auth::provision_operator;
use wiz_core::{ClientId, FlagKey, FlagStore, ProfileRepository, Role};

use common::{call, harness, CLIENT};

async fn register(app: &axum::Router, email: &str) -> serde_json::Value {
    let reply = call(Method::POST, "/v1/auth/register")
        .json(json!({ "email": email, "password": "secret123", "display_name": "Test User" }))
        .send(app)
        .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text);
    reply.body
}

#[tokio::test]
async fn test_anonymous_visitor_is_sent_to_rooms() {
    let h = harness();
    let reply = call(Method::GET, "/v1/admin").client(CLIENT).send(&h.app).await;

    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location(), Some("/rooms"));
}

#[tokio::test]
async fn test_override_flag_alone_opens_admin() {
    let h = harness();
    let client = ClientId::parse(CLIENT).unwrap();
    h.flags.set_flag(&client, FlagKey::AdminSession, "true").await.unwrap();

    let reply = call(Method::GET, "/v1/admin").client(CLIENT).send(&h.app).await;

    assert_eq!(reply.status, StatusCode::OK, "{}", reply.text);
    assert_eq!(reply.body["session"]["state"], "privileged");
    assert_eq!(reply.body["session"]["via_override"], true);
    assert_eq!(reply.body["total_units"], 2);

    // Another browser is unaffected
    let other = call(Method::GET, "/v1/admin").client("browser-other").send(&h.app).await;
    assert_eq!(other.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_operator_email_is_elevated_on_registration() {
    let h = harness();
    let operator = register(&h.app, "wizhomes1@gmail.com").await;
    assert_eq!(operator["role"], "Operator");

    let token = operator["token"].as_str().unwrap();
    let reply = call(Method::GET, "/v1/admin/dashboard").bearer(token).send(&h.app).await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.text);

    let guest = register(&h.app, "guest@example.com").await;
    assert_eq!(guest["role"], "Guest");
    let reply = call(Method::GET, "/v1/admin/dashboard")
        .bearer(guest["token"].as_str().unwrap())
        .send(&h.app)
        .await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let h = harness();
    let reply = call(Method::GET, "/v1/session").bearer("not-a-jwt").send(&h.app).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_manual_booking_entry_is_restricted() {
    let h = harness();
    let client = ClientId::parse(CLIENT).unwrap();
    h.flags.set_flag(&client, FlagKey::AdminSession, "true").await.unwrap();

    let reply = call(Method::POST, "/v1/admin/bookings")
        .client(CLIENT)
        .json(json!({ "guest_name": "Walk In" }))
        .send(&h.app)
        .await;

    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.body["error"], "Manual booking entry is restricted.");
}

#[tokio::test]
async fn test_override_is_granted_by_privileged_session_and_cleared_by_client() {
    let h = harness();
    let operator = register(&h.app, "wizhomes1@gmail.com").await;
    let token = operator["token"].as_str().unwrap();

    let denied = call(Method::PUT, "/v1/admin/session/override").client(CLIENT).send(&h.app).await;
    assert_eq!(denied.status, StatusCode::SEE_OTHER);

    let granted = call(Method::PUT, "/v1/admin/session/override")
        .client(CLIENT)
        .bearer(token)
        .send(&h.app)
        .await;
    assert_eq!(granted.status, StatusCode::NO_CONTENT);

    // Signed out, the browser stays privileged
    let reply = call(Method::GET, "/v1/admin").client(CLIENT).send(&h.app).await;
    assert_eq!(reply.status, StatusCode::OK);

    let cleared = call(Method::DELETE, "/v1/session/override").client(CLIENT).send(&h.app).await;
    assert_eq!(cleared.status, StatusCode::NO_CONTENT);
    let reply = call(Method::GET, "/v1/admin").client(CLIENT).send(&h.app).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_local_inventory_edits() {
    let h = harness();
    let client = ClientId::parse(CLIENT).unwrap();
    h.flags.set_flag(&client, FlagKey::AdminSession, "true").await.unwrap();

    let created = call(Method::POST, "/v1/admin/rooms").client(CLIENT).send(&h.app).await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.text);
    assert_eq!(created.body["name"], "New Luxury Unit");
    assert_eq!(created.body["rate"]["price_pesewas"], 10_000);
    assert_eq!(created.body["location"], "TBD");

    let mut unit = created.body.clone();
    unit["name"] = json!("Garden Suite");
    let id = unit["id"].as_str().unwrap().to_string();
    let updated = call(Method::PUT, &format!("/v1/admin/rooms/{}", id))
        .client(CLIENT)
        .json(unit)
        .send(&h.app)
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{}", updated.text);

    let rooms = call(Method::GET, "/v1/admin/rooms").client(CLIENT).send(&h.app).await;
    let rooms = rooms.body.as_array().unwrap().clone();
    assert_eq!(rooms.len(), 3);
    assert!(rooms.iter().any(|r| r["name"] == "Garden Suite"));

    // Guests still see the catalog
    let public = call(Method::GET, "/v1/rooms").send(&h.app).await;
    assert_eq!(public.body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_theme_defaults_dark_and_toggles() {
    let h = harness();

    let session = call(Method::GET, "/v1/session").client(CLIENT).send(&h.app).await;
    assert_eq!(session.body["theme"], "dark");
    assert_eq!(session.body["session"]["state"], "guest");

    let toggled = call(Method::PUT, "/v1/session/theme").client(CLIENT).send(&h.app).await;
    assert_eq!(toggled.body["theme"], "light");

    let explicit = call(Method::PUT, "/v1/session/theme")
        .client(CLIENT)
        .json(json!({ "theme": "light" }))
        .send(&h.app)
        .await;
    assert_eq!(explicit.body["theme"], "light");

    let session = call(Method::GET, "/v1/session").client(CLIENT).send(&h.app).await;
    assert_eq!(session.body["theme"], "light");
}

#[tokio::test]
async fn test_profile_lists_own_bookings() {
    let h = harness();
    let guest = register(&h.app, "kofi@example.com").await;
    let token = guest["token"].as_str().unwrap();

    let draft = call(Method::POST, "/v1/reservations")
        .json(json!({ "room_id": "wiz-apt-02", "check_in": "2027-01-01", "check_out": "2027-02-01", "guests": 1 }))
        .send(&h.app)
        .await;
    let draft_id = draft.body["draft"]["id"].as_str().unwrap().to_string();

    let payment = call(Method::POST, &format!("/v1/checkout/{}/payment", draft_id))
        .bearer(token)
        .json(json!({ "full_name": "Kofi Mensah", "email": "kofi@example.com", "phone": "0240000000" }))
        .send(&h.app)
        .await;
    let reference = payment.body["ref"].as_str().unwrap().to_string();
    h.gateway.settle(&reference, 400_000).await;

    let done = call(Method::POST, &format!("/v1/checkout/{}/callback", draft_id))
        .json(json!({ "reference": reference, "outcome": "success" }))
        .send(&h.app)
        .await;
    assert_eq!(done.status, StatusCode::CREATED, "{}", done.text);

    let mine = call(Method::GET, "/v1/profile/bookings").bearer(token).send(&h.app).await;
    assert_eq!(mine.status, StatusCode::OK);
    assert_eq!(mine.body.as_array().unwrap().len(), 1);

    let anonymous = call(Method::GET, "/v1/profile/bookings").send(&h.app).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_and_password_reset() {
    let h = harness();
    register(&h.app, "ama@example.com").await;

    let bad = call(Method::POST, "/v1/auth/login")
        .json(json!({ "email": "ama@example.com", "password": "wrong-one" }))
        .send(&h.app)
        .await;
    assert_eq!(bad.status, StatusCode::UNAUTHORIZED);
    assert_eq!(bad.body["error"], "Invalid email or password. Please check your credentials.");

    let good = call(Method::POST, "/v1/auth/login")
        .json(json!({ "email": "ama@example.com", "password": "secret123" }))
        .send(&h.app)
        .await;
    assert_eq!(good.status, StatusCode::OK);

    let duplicate = call(Method::POST, "/v1/auth/register")
        .json(json!({ "email": "ama@example.com", "password": "secret123" }))
        .send(&h.app)
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let reset = call(Method::POST, "/v1/auth/password-reset")
        .json(json!({ "email": "ama@example.com" }))
        .send(&h.app)
        .await;
    assert_eq!(reset.status, StatusCode::ACCEPTED);
    assert_eq!(h.identity.reset_requests().await, vec!["ama@example.com".to_string()]);
}

#[tokio::test]
async fn test_provision_operator_reuses_existing_account() {
    let h = harness();
    let first = provision_operator(
        h.identity.as_ref(),
        h.profiles.as_ref(),
        "ops@wizhomes.com",
        "secret123",
        "Ops",
        Role::Operator,
    )
    .await
    .unwrap();

    let second = provision_operator(
        h.identity.as_ref(),
        h.profiles.as_ref(),
        "ops@wizhomes.com",
        "secret123",
        "Ops Lead",
        Role::Admin,
    )
    .await
    .unwrap();

    assert_eq!(first.uid, second.uid);
    assert_eq!(second.joined_at, first.joined_at);
    let stored = h.profiles.get_profile(&first.uid).await.unwrap().unwrap();
    assert_eq!(stored.role, Role::Admin);
    assert_eq!(stored.display_name, "Ops Lead");
}
