use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn created_announcements_are_listed_newest_first() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let first = app
        .post_with_token(routes::ANNOUNCEMENTS, &json!({"message": "Dues are due"}), &token)
        .await;
    assert_eq!(first.status, 201, "Create failed: {}", first.text);
    assert_eq!(first.body["message"], "Dues are due");

    let second = app
        .post_with_token(routes::ANNOUNCEMENTS, &json!({"msg": "Room changed to B12"}), &token)
        .await;
    assert_eq!(second.status, 201, "Create failed: {}", second.text);

    let res = app.get_with_token(routes::ANNOUNCEMENTS, &token).await;

    assert_eq!(res.status, 200);
    let messages: Vec<&str> = res.body["announcements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["message"].as_str().unwrap())
        .collect();
    assert_eq!(messages, vec!["Room changed to B12", "Dues are due"]);
}

#[tokio::test]
async fn blank_message_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let res = app
        .post_with_token(routes::ANNOUNCEMENTS, &json!({"message": "   "}), &token)
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn delete_removes_the_announcement() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let id = app
        .post_with_token(routes::ANNOUNCEMENTS, &json!({"message": "Temporary"}), &token)
        .await
        .id();

    let res = app.delete_with_token(&routes::announcement(id), &token).await;
    assert_eq!(res.status, 204);

    let again = app.delete_with_token(&routes::announcement(id), &token).await;
    assert_eq!(again.status, 404);
    assert_eq!(again.body["code"], "NOT_FOUND");

    let list = app.get_with_token(routes::ANNOUNCEMENTS, &token).await;
    assert_eq!(list.body["announcements"], json!([]));
}

#[tokio::test]
async fn requires_a_token() {
    let app = TestApp::spawn().await;

    let list = app.get_without_token(routes::ANNOUNCEMENTS).await;
    assert_eq!(list.status, 401);

    let create = app
        .post_without_token(routes::ANNOUNCEMENTS, &json!({"message": "hi"}))
        .await;
    assert_eq!(create.status, 401);
    assert_eq!(create.body["code"], "TOKEN_MISSING");
}
