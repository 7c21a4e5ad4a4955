use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn members_are_listed_by_priority() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    for (name, position, priority) in [
        ("Linus", "Member", 5),
        ("Ada", "President", 0),
        ("Grace", "Treasurer", 2),
    ] {
        let res = app
            .post_with_token(
                routes::MEMBERS,
                &json!({"name": name, "position": position, "priority": priority}),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "Create failed: {}", res.text);
    }

    let res = app.get_with_token(routes::MEMBERS, &token).await;

    assert_eq!(res.status, 200);
    let names: Vec<&str> = res.body["members"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Ada", "Grace", "Linus"]);
}

#[tokio::test]
async fn accepts_the_member_name_alias() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let res = app
        .post_with_token(
            routes::MEMBERS,
            &json!({"memberName": " Alan ", "position": "Secretary", "priority": 1}),
            &token,
        )
        .await;

    assert_eq!(res.status, 201, "Create failed: {}", res.text);
    assert_eq!(res.body["name"], "Alan");
    assert_eq!(res.body["priority"], 1);
}

#[tokio::test]
async fn negative_priority_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let res = app
        .post_with_token(
            routes::MEMBERS,
            &json!({"name": "Eve", "position": "Member", "priority": -1}),
            &token,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn delete_removes_the_member() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let id = app
        .post_with_token(
            routes::MEMBERS,
            &json!({"name": "Eve", "position": "Member", "priority": 3}),
            &token,
        )
        .await
        .id();

    let res = app.delete_with_token(&routes::member(id), &token).await;
    assert_eq!(res.status, 204);

    let again = app.delete_with_token(&routes::member(id), &token).await;
    assert_eq!(again.status, 404);
}

#[tokio::test]
async fn requires_a_token() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::MEMBERS).await;

    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_MISSING");
}
