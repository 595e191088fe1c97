use reqwest::Method;

use crate::error::Result;
use crate::models::{ChangePassword, Credentials, RegisterUser, UpdateProfile, User, UserId};
use crate::transport::{RequestOptions, Transport};

const USERS_PATH: &str = "/v1/users";

/// Client for `/v1/users`
#[derive(Clone)]
pub struct UsersClient {
    transport: Transport,
}

impl UsersClient {
    pub const fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub async fn register(&self, account: &RegisterUser) -> Result<User> {
        self.transport
            .request_json(
                Method::POST,
                &format!("{USERS_PATH}/register"),
                RequestOptions::json(account)?,
            )
            .await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User> {
        self.transport
            .request_json(
                Method::POST,
                &format!("{USERS_PATH}/login"),
                RequestOptions::json(credentials)?,
            )
            .await
    }

    pub async fn logout(&self) -> Result<()> {
        self.transport
            .request_unit(
                Method::POST,
                &format!("{USERS_PATH}/logout"),
                RequestOptions::new(),
            )
            .await
    }

    pub async fn get(&self, id: UserId) -> Result<User> {
        self.transport
            .request_json(Method::GET, &user_path(id), RequestOptions::new())
            .await
    }

    pub async fn update_profile(&self, id: UserId, changes: &UpdateProfile) -> Result<User> {
        self.transport
            .request_json(Method::PUT, &user_path(id), RequestOptions::json(changes)?)
            .await
    }

    pub async fn change_password(&self, id: UserId, change: &ChangePassword) -> Result<()> {
        self.transport
            .request_unit(
                Method::PUT,
                &format!("{}/password", user_path(id)),
                RequestOptions::json(change)?,
            )
            .await
    }
}

fn user_path(id: UserId) -> String {
    format!("{USERS_PATH}/{id}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::error::Error;
    use crate::test_support::{json_response, response, TestHarness};

    fn user_json() -> serde_json::Value {
        json!({
            "id": 5,
            "username": "ada",
            "email": "ada@example.com",
            "status": 1,
            "is_admin": 0,
            "created_at": "2025-01-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn login_posts_credentials() {
        let harness = TestHarness::new();
        harness.backend.push(json_response(200, &user_json()));

        let user = UsersClient::new(harness.transport.clone())
            .login(&Credentials::new("ada@example.com", "pw"))
            .await
            .unwrap();

        assert_eq!(user.id, UserId(5));
        let sent = harness.backend.last_request();
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.url, "https://notes.example.com/api/v1/users/login");
        assert_eq!(
            harness.backend.last_json_body(),
            json!({"email": "ada@example.com", "password": "pw"})
        );
    }

    #[tokio::test]
    async fn register_and_profile_calls() {
        let harness = TestHarness::new();
        harness.backend.push(json_response(201, &user_json()));
        harness.backend.push(json_response(200, &user_json()));
        harness.backend.push(json_response(200, &user_json()));
        harness.backend.push(response(200, None, ""));

        let users = UsersClient::new(harness.transport.clone());
        users
            .register(&RegisterUser {
                username: "ada".to_string(),
                password: "pw".to_string(),
                email: "ada@example.com".to_string(),
            })
            .await
            .unwrap();
        users.get(UserId(5)).await.unwrap();
        users
            .update_profile(
                UserId(5),
                &UpdateProfile {
                    username: Some("ada2".to_string()),
                    ..UpdateProfile::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(harness.backend.last_json_body(), json!({"username": "ada2"}));
        users
            .change_password(
                UserId(5),
                &ChangePassword {
                    new_password: "next".to_string(),
                },
            )
            .await
            .unwrap();

        let sent: Vec<(Method, String)> = harness
            .backend
            .requests()
            .into_iter()
            .map(|request| (request.method, request.url))
            .collect();
        let base = "https://notes.example.com/api/v1/users";
        assert_eq!(
            sent,
            vec![
                (Method::POST, format!("{base}/register")),
                (Method::GET, format!("{base}/5")),
                (Method::PUT, format!("{base}/5")),
                (Method::PUT, format!("{base}/5/password")),
            ]
        );
        assert_eq!(harness.backend.last_json_body(), json!({"new_password": "next"}));
    }

    #[tokio::test]
    async fn logout_accepts_empty_success() {
        let harness = TestHarness::new();
        harness.backend.push(response(200, Some("application/json; charset=utf-8"), "{}"));

        UsersClient::new(harness.transport.clone())
            .logout()
            .await
            .unwrap();

        assert_eq!(
            harness.backend.last_request().url,
            "https://notes.example.com/api/v1/users/logout"
        );
    }

    #[tokio::test]
    async fn login_failure_is_returned() {
        let harness = TestHarness::new();
        harness.backend.push(response(400, Some("application/json"), r#"{"error":"bad"}"#));

        let error = UsersClient::new(harness.transport.clone())
            .login(&Credentials::new("ada@example.com", "wrong"))
            .await
            .unwrap_err();

        assert!(matches!(error, Error::Http { .. }));
    }
}
