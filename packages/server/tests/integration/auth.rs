use serde_json::json;

use crate::common::{ADMIN_PASSWORD, ADMIN_USERNAME, TestApp, routes};

mod login {
    use super::*;

    #[tokio::test]
    async fn bootstrap_admin_can_log_in() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": ADMIN_USERNAME, "password": ADMIN_PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 200);
        assert!(res.body["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(res.body["username"], ADMIN_USERNAME);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": ADMIN_USERNAME, "password": "not-the-password"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn unknown_user_gets_the_same_error_as_a_wrong_password() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "nobody", "password": ADMIN_PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn empty_username_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::LOGIN, &json!({"username": "  ", "password": "x"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod me {
    use super::*;

    #[tokio::test]
    async fn returns_the_authenticated_admin() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["username"], ADMIN_USERNAME);
        assert!(res.body["id"].is_number());
    }

    #[tokio::test]
    async fn requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn rejects_a_forged_token() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not.a.jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}

mod admins {
    use super::*;

    fn treasurer() -> serde_json::Value {
        json!({
            "username": "treasurer",
            "email": "Treasurer@Club.example",
            "password": "counting-coins",
        })
    }

    #[tokio::test]
    async fn admin_can_create_another_admin_who_can_log_in() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app.post_with_token(routes::ADMINS, &treasurer(), &token).await;

        assert_eq!(res.status, 201, "Create admin failed: {}", res.text);
        assert_eq!(res.body["username"], "treasurer");
        assert_eq!(res.body["email"], "treasurer@club.example");
        assert!(res.body.get("password").is_none());

        app.login("treasurer", "counting-coins").await;
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let first = app.post_with_token(routes::ADMINS, &treasurer(), &token).await;
        assert_eq!(first.status, 201, "First create failed: {}", first.text);

        let res = app.post_with_token(routes::ADMINS, &treasurer(), &token).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app
            .post_with_token(
                routes::ADMINS,
                &json!({"username": "scribe", "email": "scribe@club.example", "password": "short"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.post_without_token(routes::ADMINS, &treasurer()).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }
}
