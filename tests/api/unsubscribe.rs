use serde_json::Value;
use wiremock::matchers::any;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::ResponseTemplate;

use crate::helpers::spawn_app;

const EMAIL: &str = "tohru@kobayashi.jp";

#[tokio::test]
async fn unsubscribe_ok() {
    let app = spawn_app().await;
    app.create_subscriber(EMAIL).await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let resp = app.post_unsubscribe(EMAIL).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Successfully unsubscribed");

    let goodbye = app.sent_emails().await.pop().unwrap();
    assert_eq!(goodbye["To"], EMAIL);
    assert_eq!(goodbye["Subject"], "Sorry to see you go!");

    let body: Value = app.get_status().await.json().await.unwrap();
    assert_eq!(body["subscribers"], 0);
}

#[tokio::test]
async fn unsubscribe_not_subscribed() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let resp = app.post_unsubscribe(EMAIL).await;
    assert_eq!(resp.status().as_u16(), 404);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Email is not subscribed");
}

/// A pending (unverified) code does not make an email a subscriber
#[tokio::test]
async fn unsubscribe_pending_only() {
    let app = spawn_app().await;
    app.request_otp(EMAIL).await;

    let resp = app.post_unsubscribe(EMAIL).await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn unsubscribe_invalid_email() {
    let app = spawn_app().await;

    let resp = app.post_unsubscribe("tohru").await;
    assert_eq!(resp.status().as_u16(), 400);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Please enter a valid email");
}

#[tokio::test]
async fn unsubscribe_goodbye_email_failure() {
    let app = spawn_app().await;
    app.create_subscriber(EMAIL).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let resp = app.post_unsubscribe(EMAIL).await;
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app.post_unsubscribe(EMAIL).await;
    assert_eq!(resp.status().as_u16(), 404);
}

/// An unsubscribed email goes through the full flow again, and is welcomed
/// again
#[tokio::test]
async fn resubscribe_after_unsubscribe() {
    let app = spawn_app().await;
    app.create_subscriber(EMAIL).await;

    let goodbye = Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .mount_as_scoped(&app.email_server)
        .await;
    app.post_unsubscribe(EMAIL).await.error_for_status().unwrap();
    drop(goodbye);

    // no longer short-circuits as already verified
    let otp = app.request_otp(EMAIL).await;
    let resp = app.post_verify_otp(EMAIL, &otp).await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Email verified successfully");
}
