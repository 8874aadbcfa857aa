//! Login request/response models and credential types.

use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{CouponError, Result};

/// Username and password for one principal.
///
/// The password is kept in a [`SecretString`] so it never shows up in
/// `Debug` output or logs.
#[derive(Debug)]
pub struct Credentials {
    /// Login name.
    pub username: String,
    /// Login password.
    pub password: SecretString,
}

impl Credentials {
    /// Creates credentials from a username and a plain password.
    #[inline]
    #[must_use]
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Principal kind understood by the login endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthType {
    /// Back-office user (administrator).
    #[serde(rename = "U")]
    User,
    /// Loyalty member.
    #[serde(rename = "M")]
    Member,
}

/// Request body for the login endpoint.
///
/// Admin and member logins share the endpoint but not the payload shape:
/// a member login also carries the two-factor placeholders and session
/// flags the web front end sends.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LoginRequest<'cred> {
    /// Administrator login.
    Admin {
        /// Login name.
        username: &'cred str,
        /// Password, exposed only while serializing.
        #[serde(serialize_with = "serialize_secret")]
        psw: &'cred SecretString,
        /// Always [`AuthType::User`].
        auth_type: AuthType,
    },
    /// Member login.
    Member {
        /// Login name.
        username: &'cred str,
        /// Password, exposed only while serializing.
        #[serde(serialize_with = "serialize_secret")]
        psw: &'cred SecretString,
        /// Two-factor PIN placeholder (always empty).
        tfa_pin: &'static str,
        /// Two-factor token placeholder (always `null`).
        tfa_token: Option<&'static str>,
        /// Always [`AuthType::Member`].
        auth_type: AuthType,
        /// Session persistence flag (`"1"`).
        save_session: &'static str,
        /// Redirect target after login (`"/"`).
        next: &'static str,
    },
}

impl<'cred> LoginRequest<'cred> {
    /// Builds an administrator login payload.
    #[inline]
    #[must_use]
    pub fn admin(credentials: &'cred Credentials) -> Self {
        Self::Admin {
            username: &credentials.username,
            psw: &credentials.password,
            auth_type: AuthType::User,
        }
    }

    /// Builds a member login payload.
    #[inline]
    #[must_use]
    pub fn member(credentials: &'cred Credentials) -> Self {
        Self::Member {
            username: &credentials.username,
            psw: &credentials.password,
            tfa_pin: "",
            tfa_token: None,
            auth_type: AuthType::Member,
            save_session: "1",
            next: "/",
        }
    }
}

/// Serializes a secret by exposing it to the serializer only.
fn serialize_secret<S: Serializer>(
    secret: &&SecretString,
    serializer: S,
) -> core::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Response body of the login endpoint.
///
/// `Debug` output redacts the token.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token; absent when the login was rejected.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    /// Remaining response fields, kept for diagnostics.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl core::fmt::Debug for LoginResponse {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("extra", &self.extra)
            .finish()
    }
}

impl LoginResponse {
    /// Extracts the bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::MissingField`] if the token is absent or empty.
    #[inline]
    pub fn into_token(self) -> Result<BearerToken> {
        self.token
            .filter(|token| !token.is_empty())
            .map(BearerToken::new)
            .ok_or(CouponError::MissingField("token"))
    }
}

/// Opaque bearer token presented in the `Authorization` header.
#[derive(Debug)]
pub struct BearerToken(SecretString);

impl BearerToken {
    /// Wraps a raw token string.
    #[inline]
    #[must_use]
    pub fn new<T: Into<String>>(token: T) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Returns the `Authorization` header value for this token.
    #[inline]
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0.expose_secret())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_login_payload_shape() {
        let creds = Credentials::new("admin", "hunter2");
        let json = serde_json::to_value(LoginRequest::admin(&creds)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "username": "admin",
                "psw": "hunter2",
                "auth_type": "U"
            })
        );
    }

    #[test]
    fn member_login_payload_shape() {
        let creds = Credentials::new("member@example.com", "secret");
        let json = serde_json::to_value(LoginRequest::member(&creds)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "username": "member@example.com",
                "psw": "secret",
                "tfa_pin": "",
                "tfa_token": null,
                "auth_type": "M",
                "save_session": "1",
                "next": "/"
            })
        );
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("admin", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn login_response_yields_token() {
        let resp: LoginResponse = serde_json::from_str(r#"{"token": "abc"}"#).unwrap();
        assert!(!format!("{resp:?}").contains("abc"));
        let token = resp.into_token().unwrap();
        assert_eq!(token.header_value(), "Bearer abc");
        assert!(!format!("{token:?}").contains("abc"));
    }

    #[test]
    fn login_response_without_token_is_error() {
        let resp: LoginResponse = serde_json::from_str(r#"{"error": "nope"}"#).unwrap();
        assert!(matches!(
            resp.into_token(),
            Err(CouponError::MissingField("token"))
        ));
    }

    #[test]
    fn login_response_serializes_without_token() {
        let resp: LoginResponse =
            serde_json::from_str(r#"{"token": "abc", "message": "ok"}"#).unwrap();
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, serde_json::json!({"message": "ok"}));
    }

    #[test]
    fn login_response_with_empty_token_is_error() {
        let resp: LoginResponse = serde_json::from_str(r#"{"token": ""}"#).unwrap();
        assert!(resp.into_token().is_err());
    }
}
