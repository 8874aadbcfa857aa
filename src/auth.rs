//! Exchanges admin and member credentials for bearer tokens.

use crate::client::{RedcatClient, log_server_body};
use crate::error::Result;
use crate::models::{BearerToken, Credentials, LoginRequest};

/// Bearer tokens for both principals of a run.
#[derive(Debug)]
pub struct SessionTokens {
    /// Administrator token, used to create and assign the coupon.
    pub admin: BearerToken,
    /// Member token, used to list store coupons.
    pub member: BearerToken,
}

/// Logs in as the administrator, then as the member.
///
/// The member login is not attempted if the admin login fails.
///
/// # Errors
///
/// Returns an error if either login fails at the HTTP level, the server
/// rejects it, or a response carries no token. The server's response body
/// is logged in every case.
#[tracing::instrument(skip_all, fields(client = %client_label))]
pub async fn authenticate(
    client: &RedcatClient,
    client_label: &str,
    admin: &Credentials,
    member: &Credentials,
) -> Result<SessionTokens> {
    let tokens = login_both(client, admin, member)
        .await
        .inspect_err(|err| tracing::error!("Error during login: {err}"))?;
    tracing::info!("Login successful for client: {client_label} (Admin and Member)");
    Ok(tokens)
}

/// Runs the two logins in order.
async fn login_both(
    client: &RedcatClient,
    admin: &Credentials,
    member: &Credentials,
) -> Result<SessionTokens> {
    let admin_token = login(client, &LoginRequest::admin(admin)).await?;
    let member_token = login(client, &LoginRequest::member(member)).await?;
    Ok(SessionTokens {
        admin: admin_token,
        member: member_token,
    })
}

/// Performs one login and extracts its token.
async fn login(client: &RedcatClient, request: &LoginRequest<'_>) -> Result<BearerToken> {
    let response = client.login(request).await?;
    if response.token.as_deref().is_none_or(str::is_empty) {
        log_server_body(serde_json::to_value(&response).ok().as_ref());
    }
    response.into_token()
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::CouponError;
    use crate::test_support::CapturedLogs;

    async fn mount_login(server: &MockServer, auth_type: &str, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/api/v1/login"))
            .and(body_partial_json(serde_json::json!({"auth_type": auth_type})))
            .respond_with(response)
            .mount(server)
            .await;
    }

    fn client_for(server: &MockServer) -> RedcatClient {
        RedcatClient::builder()
            .base_url(server.uri())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn valid_credentials_yield_both_tokens() {
        let server = MockServer::start().await;
        mount_login(
            &server,
            "U",
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "admin-tok"})),
        )
        .await;
        mount_login(
            &server,
            "M",
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "member-tok"})),
        )
        .await;

        let (logs, _guard) = CapturedLogs::install();
        let tokens = authenticate(
            &client_for(&server),
            "acme",
            &Credentials::new("admin", "pw"),
            &Credentials::new("member", "pw"),
        )
        .await
        .unwrap();

        assert_eq!(tokens.admin.header_value(), "Bearer admin-tok");
        assert_eq!(tokens.member.header_value(), "Bearer member-tok");
        assert!(
            logs.contents()
                .contains("Login successful for client: acme (Admin and Member)")
        );
    }

    #[tokio::test]
    async fn rejected_admin_login_is_error_and_logged() {
        let server = MockServer::start().await;
        mount_login(
            &server,
            "U",
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"error": "invalid credentials"})),
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/login"))
            .and(body_partial_json(serde_json::json!({"auth_type": "M"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (logs, _guard) = CapturedLogs::install();
        let result = authenticate(
            &client_for(&server),
            "acme",
            &Credentials::new("admin", "wrong"),
            &Credentials::new("member", "pw"),
        )
        .await;

        assert!(matches!(result, Err(CouponError::Api { status: 401, .. })));
        let errors = logs.lines_at("ERROR");
        assert!(errors.iter().any(|line| line.contains("invalid credentials")));
        assert!(errors.iter().any(|line| line.contains("Error during login")));
    }

    #[tokio::test]
    async fn missing_member_token_is_error_and_body_logged() {
        let server = MockServer::start().await;
        mount_login(
            &server,
            "U",
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "admin-tok"})),
        )
        .await;
        mount_login(
            &server,
            "M",
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"message": "two-factor required"})),
        )
        .await;

        let (logs, _guard) = CapturedLogs::install();
        let result = authenticate(
            &client_for(&server),
            "acme",
            &Credentials::new("admin", "pw"),
            &Credentials::new("member", "pw"),
        )
        .await;

        assert!(matches!(result, Err(CouponError::MissingField("token"))));
        assert!(logs.contents().contains("two-factor required"));
        assert!(!logs.contents().contains("Login successful"));
    }
}
