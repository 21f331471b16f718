mod common;

use axum::http::StatusCode;
use serde_json::json;
use support_console::{models::user::Role, services::line_client::OutboundMessage};

use common::{
    delivery, get_request, json_request, setup_app, text_event, RecordingLine, CHANNEL_TOKEN,
};

const CUSTOMER: &str = "U1234567890abcde";

async fn customer_id(t: &common::TestApp) -> i64 {
    let (id,): (i64,) = sqlx::query_as("SELECT id FROM users WHERE line_user_id = ?")
        .bind(CUSTOMER)
        .fetch_one(&t.pool)
        .await
        .unwrap();
    id
}

#[tokio::test]
async fn staff_api_requires_a_valid_bearer_token() {
    let t = setup_app(RecordingLine::default()).await;

    let (status, body) = t.send(get_request("/api/conversations", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = t
        .send(get_request("/api/conversations", Some("not-a-token")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = t
        .send(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "username": "ghost", "password": "password123" }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn administration_is_limited_to_owner_and_admin() {
    let t = setup_app(RecordingLine::default()).await;
    t.create_staff("boss", Role::Owner).await;
    t.create_staff("agent", Role::Staff).await;
    let agent = t.login("agent").await;
    let boss = t.login("boss").await;

    let (status, _) = t.send(get_request("/api/channels", Some(&agent))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, channel) = t
        .send(json_request(
            "POST",
            "/api/channels",
            Some(&boss),
            json!({
                "name": "Second shop",
                "channel_id": "C2",
                "channel_secret": "c2-secret",
                "access_token": "token-c2"
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(channel["channel_id"], "C2");
    assert!(channel.get("access_token").is_none());
    assert!(channel.get("channel_secret").is_none());

    let (status, created) = t
        .send(json_request(
            "POST",
            "/api/staff",
            Some(&boss),
            json!({ "username": "helper", "password": "password123", "role": "admin" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"], "admin");
    assert!(created.get("password_hash").is_none());

    let (status, _) = t
        .send(json_request(
            "POST",
            "/api/staff",
            Some(&boss),
            json!({ "username": "sneaky", "password": "password123", "role": "guest" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, staff) = t.send(get_request("/api/staff", Some(&boss))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(staff.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn viewing_a_conversation_clears_only_the_callers_unread_badge() {
    let t = setup_app(RecordingLine::default().with_profile(CUSTOMER, "Bob")).await;
    t.seed_channel().await;
    t.create_staff("owner", Role::Owner).await;
    t.create_staff("agent", Role::Staff).await;
    let owner = t.login("owner").await;
    let agent = t.login("agent").await;

    t.deliver(delivery(vec![
        text_event(CUSTOMER, "first"),
        text_event(CUSTOMER, "second"),
    ]))
    .await;
    let customer = customer_id(&t).await;

    let (status, list) = t.send(get_request("/api/conversations", Some(&owner))).await;
    assert_eq!(status, StatusCode::OK);
    let entry = &list.as_array().unwrap()[0];
    assert_eq!(entry["customer_id"], customer);
    assert_eq!(entry["display_name"], "Bob");
    assert_eq!(entry["unread_count"], 2);
    assert_eq!(entry["last_message"]["text"], "second");

    let uri = format!("/api/conversations/{}/messages", customer);
    let (status, history) = t.send(get_request(&uri, Some(&owner))).await;
    assert_eq!(status, StatusCode::OK);
    let texts: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["first", "second"]);

    let (_, list) = t.send(get_request("/api/conversations", Some(&owner))).await;
    assert_eq!(list[0]["unread_count"], 0);
    let (_, list) = t.send(get_request("/api/conversations", Some(&agent))).await;
    assert_eq!(list[0]["unread_count"], 2);

    let (status, _) = t
        .send(get_request("/api/conversations/9999/messages", Some(&owner)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reply_is_pushed_on_the_last_inbound_channel() {
    let t = setup_app(RecordingLine::default()).await;
    let channel = t.seed_channel().await;
    let staff = t.create_staff("agent", Role::Staff).await;
    let token = t.login("agent").await;

    t.deliver(delivery(vec![text_event(CUSTOMER, "Hello")])).await;
    let customer = customer_id(&t).await;

    let (status, message) = t
        .send(json_request(
            "POST",
            "/api/messages/reply",
            Some(&token),
            json!({ "user_id": customer, "message": "Hi, how can we help?" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", message);
    assert_eq!(message["type"], "text");
    assert_eq!(message["is_read"], true);
    assert_eq!(message["sender_id"], staff.id);
    assert_eq!(message["recipient_id"], customer);
    assert_eq!(message["channel_account_id"], channel);

    let pushes = t.line.pushes();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].access_token, CHANNEL_TOKEN);
    assert_eq!(pushes[0].to, CUSTOMER);
    assert_eq!(
        pushes[0].messages,
        vec![OutboundMessage::Text {
            text: "Hi, how can we help?".into()
        }]
    );

    let outbound = t
        .count("SELECT COUNT(*) FROM messages WHERE recipient_id = (SELECT id FROM users WHERE line_user_id = 'U1234567890abcde') AND is_read = 1")
        .await;
    assert_eq!(outbound, 1);
}

#[tokio::test]
async fn sticker_marker_is_sent_as_sticker() {
    let t = setup_app(RecordingLine::default()).await;
    t.seed_channel().await;
    t.create_staff("agent", Role::Staff).await;
    let token = t.login("agent").await;
    t.deliver(delivery(vec![text_event(CUSTOMER, "Hello")])).await;
    let customer = customer_id(&t).await;

    let (status, message) = t
        .send(json_request(
            "POST",
            "/api/messages/reply",
            Some(&token),
            json!({ "user_id": customer, "message": "[sticker:446:1988]" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["type"], "sticker");
    assert_eq!(
        t.line.pushes()[0].messages,
        vec![OutboundMessage::Sticker {
            package_id: "446".into(),
            sticker_id: "1988".into()
        }]
    );
}

#[tokio::test]
async fn reply_without_channel_context_sends_and_stores_nothing() {
    let t = setup_app(RecordingLine::default()).await;
    t.seed_channel().await;
    t.create_staff("agent", Role::Staff).await;
    let token = t.login("agent").await;

    let (customer,): (i64,) = sqlx::query_as(
        "INSERT INTO users (username, role, line_user_id, created_at) VALUES ('Carol', 'guest', ?, ?) RETURNING id",
    )
    .bind(CUSTOMER)
    .bind(chrono::Utc::now())
    .fetch_one(&t.pool)
    .await
    .unwrap();

    let (status, body) = t
        .send(json_request(
            "POST",
            "/api/messages/reply",
            Some(&token),
            json!({ "user_id": customer, "message": "Hello?" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "no channel configured");
    assert!(t.line.pushes().is_empty());
    assert_eq!(t.count("SELECT COUNT(*) FROM messages").await, 0);
}

#[tokio::test]
async fn failed_push_surfaces_as_bad_gateway() {
    let t = setup_app(RecordingLine::default().failing_pushes()).await;
    t.seed_channel().await;
    let staff = t.create_staff("agent", Role::Staff).await;
    let token = t.login("agent").await;
    t.deliver(delivery(vec![text_event(CUSTOMER, "Hello")])).await;
    let customer = customer_id(&t).await;

    let (status, _) = t
        .send(json_request(
            "POST",
            "/api/messages/reply",
            Some(&token),
            json!({ "user_id": customer, "message": "Hi" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let sent: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE sender_id = ?")
        .bind(staff.id)
        .fetch_one(&t.pool)
        .await
        .unwrap();
    assert_eq!(sent.0, 0);
}

#[tokio::test]
async fn customer_details_and_quick_replies_are_editable() {
    let t = setup_app(RecordingLine::default()).await;
    t.seed_channel().await;
    t.create_staff("agent", Role::Staff).await;
    let token = t.login("agent").await;
    t.deliver(delivery(vec![text_event(CUSTOMER, "Hello")])).await;
    let customer = customer_id(&t).await;

    let (status, updated) = t
        .send(json_request(
            "PATCH",
            &format!("/api/customers/{}", customer),
            Some(&token),
            json!({ "phone": "+66 81 234 5678", "note": "VIP" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["phone"], "+66 81 234 5678");
    assert_eq!(updated["note"], "VIP");

    let (status, created) = t
        .send(json_request(
            "POST",
            "/api/quick-replies",
            Some(&token),
            json!({ "title": "Greeting", "body": "Thanks for reaching out!" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (_, items) = t.send(get_request("/api/quick-replies", Some(&token))).await;
    assert_eq!(items.as_array().unwrap().len(), 1);

    let delete = axum::http::Request::builder()
        .method("DELETE")
        .uri(format!("/api/quick-replies/{}", id))
        .header("authorization", format!("Bearer {}", token))
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, _) = t.send(delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, items) = t.send(get_request("/api/quick-replies", Some(&token))).await;
    assert!(items.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn health_reports_database_status() {
    let t = setup_app(RecordingLine::default()).await;
    let (status, body) = t.send(get_request("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
