use serde_json::Value;

use crate::helpers::spawn_app;

#[tokio::test]
async fn status_empty() {
    let app = spawn_app().await;

    let resp = app.get_status().await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "active");
    assert_eq!(body["subscribers"], 0);
    assert_eq!(
        body["topMangaTitles"],
        serde_json::json!([
            "Naruto",
            "Fullmetal Alchemist",
            "One Piece",
            "Kino's Journey",
            "Miss Kobayashi's Dragon Maid",
        ])
    );
}

#[tokio::test]
async fn status_counts_verified_subscribers_only() {
    let app = spawn_app().await;

    app.create_subscriber("goku@capsule.corp").await;
    app.create_subscriber("vegeta@capsule.corp").await;
    // pending, not verified
    app.request_otp("bulma@capsule.corp").await;
    // already verified: no second subscriber, no new code
    let body: Value = app
        .post_send_otp("goku@capsule.corp")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["verified"], true);

    let body: Value = app.get_status().await.json().await.unwrap();
    assert_eq!(body["subscribers"], 2);
}
