//! HTTP client for the loyalty API.
//!
//! Every call sends JSON, authenticates with a bearer token where the
//! endpoint requires one, and logs the server's error body when a call
//! fails.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use url::Url;

use crate::error::{CouponError, Result};
use crate::models::{
    BearerToken, CouponId, CreateCouponRequest, CreateCouponResponse, LoginRequest,
    LoginResponse, ScheduleRequest, StoreCouponList, StoreId,
};

/// Placeholder replaced with the coupon identifier in endpoint paths.
const COUPON_ID_PLACEHOLDER: &str = "{coupon_id}";

/// Placeholder replaced with the store identifier in endpoint paths.
const STORE_ID_PLACEHOLDER: &str = "{store_id}";

/// Media type sent and accepted on every call.
const APPLICATION_JSON: &str = "application/json";

/// Endpoint paths, relative to the client's base URL.
///
/// `schedule_coupon` may contain `{coupon_id}` and `store_coupons` may
/// contain `{store_id}`; both are substituted per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Login endpoint shared by admins and members.
    pub login: String,
    /// Coupon-creation endpoint.
    pub create_coupon: String,
    /// Coupon-assignment endpoint.
    pub schedule_coupon: String,
    /// Per-store coupon listing endpoint.
    pub store_coupons: String,
}

impl Default for Endpoints {
    #[inline]
    fn default() -> Self {
        Self {
            login: "api/v1/login".to_owned(),
            create_coupon: "api/v1/admin/coupons".to_owned(),
            schedule_coupon: "api/v1/admin/coupons/{coupon_id}/schedule".to_owned(),
            store_coupons: "api/v1/stores/{store_id}/coupons".to_owned(),
        }
    }
}

/// Builder for constructing a [`RedcatClient`].
#[derive(Debug, Default)]
pub struct RedcatClientBuilder {
    /// API base URL.
    base_url: Option<String>,
    /// Endpoint paths.
    endpoints: Endpoints,
    /// `User-Agent` override.
    user_agent: Option<String>,
}

impl RedcatClientBuilder {
    /// Sets the API base URL (for example `https://tenant.example.com/`).
    #[inline]
    #[must_use]
    pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Overrides the endpoint paths.
    #[inline]
    #[must_use]
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Overrides the `User-Agent` header.
    #[inline]
    #[must_use]
    pub fn user_agent<T: Into<String>>(mut self, agent: T) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::Config`] if no base URL was provided.
    /// Returns [`CouponError::InvalidUrl`] if the base URL does not parse.
    /// Returns [`CouponError::Http`] if the HTTP client fails to build.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub fn build(self) -> Result<RedcatClient> {
        let raw = self
            .base_url
            .ok_or_else(|| CouponError::Config("base URL is required".to_owned()))?;
        let base_url = parse_base_url(&raw)?;
        tracing::debug!(base_url = %base_url, "building client");

        let agent = self.user_agent.unwrap_or_else(|| {
            format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
        });
        let http = reqwest::Client::builder().user_agent(agent).build()?;

        Ok(RedcatClient {
            http,
            base_url,
            endpoints: self.endpoints,
        })
    }
}

/// Parses a base URL, adding the trailing slash [`Url::join`] needs to
/// keep the last path segment.
fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        Ok(Url::parse(trimmed)?)
    } else {
        Ok(Url::parse(&format!("{trimmed}/"))?)
    }
}

/// Async client for the loyalty API.
///
/// Use [`RedcatClient::builder()`] to construct an instance. The client
/// is cheap to share behind an `Arc` across polling tasks.
#[derive(Debug)]
pub struct RedcatClient {
    /// Underlying HTTP client.
    http: reqwest::Client,
    /// API base URL (always ends with `/`).
    base_url: Url,
    /// Endpoint paths.
    endpoints: Endpoints,
}

impl RedcatClient {
    /// Creates a new builder for configuring the client.
    #[inline]
    #[must_use]
    pub fn builder() -> RedcatClientBuilder {
        RedcatClientBuilder::default()
    }

    /// Returns the base URL requests are resolved against.
    #[inline]
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Exchanges credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the server returns a
    /// non-success status, or the response cannot be deserialized.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub async fn login(&self, request: &LoginRequest<'_>) -> Result<LoginResponse> {
        tracing::debug!("calling login endpoint");
        let url = self.endpoint_url(&self.endpoints.login)?;
        let builder = self.post(url).json(request);
        Self::decode(&Self::execute(builder).await?)
    }

    /// Creates a coupon program.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the server returns a
    /// non-success status, or the response cannot be deserialized.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub async fn create_coupon(
        &self,
        token: &BearerToken,
        request: &CreateCouponRequest,
    ) -> Result<CreateCouponResponse> {
        tracing::debug!(program_name = %request.program_name, "calling coupon-create endpoint");
        let url = self.endpoint_url(&self.endpoints.create_coupon)?;
        let builder = self
            .post(url)
            .header(AUTHORIZATION, token.header_value())
            .json(request);
        Self::decode(&Self::execute(builder).await?)
    }

    /// Assigns a coupon program to members.
    ///
    /// The response body is not inspected beyond the status code.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails or the server returns a
    /// non-success status.
    #[inline]
    #[tracing::instrument(skip_all, fields(coupon_id = %coupon))]
    pub async fn schedule_coupon(
        &self,
        token: &BearerToken,
        coupon: &CouponId,
        request: &ScheduleRequest,
    ) -> Result<()> {
        tracing::debug!("calling coupon-assign endpoint");
        let path = self
            .endpoints
            .schedule_coupon
            .replace(COUPON_ID_PLACEHOLDER, coupon.as_inner());
        let url = self.endpoint_url(&path)?;
        let builder = self
            .post(url)
            .header(AUTHORIZATION, token.header_value())
            .json(request);
        let body = Self::execute(builder).await?;
        tracing::trace!(body_len = body.len(), "ignoring assignment response body");
        Ok(())
    }

    /// Lists the coupons a member can see at one store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the server returns a
    /// non-success status, or the response cannot be deserialized.
    #[inline]
    #[tracing::instrument(skip_all, fields(store_id = %store))]
    pub async fn store_coupons(
        &self,
        token: &BearerToken,
        store: StoreId,
    ) -> Result<StoreCouponList> {
        let path = self
            .endpoints
            .store_coupons
            .replace(STORE_ID_PLACEHOLDER, &store.to_string());
        let url = self.endpoint_url(&path)?;
        let builder = self
            .http
            .get(url)
            .header(AUTHORIZATION, token.header_value());
        Self::decode(&Self::execute(builder).await?)
    }

    /// Starts a JSON POST request.
    ///
    /// The content type is set up front so `RequestBuilder::json` does
    /// not add a second one.
    fn post(&self, url: Url) -> reqwest::RequestBuilder {
        self.http.post(url).header(CONTENT_TYPE, APPLICATION_JSON)
    }

    /// Resolves an endpoint path against the base URL.
    fn endpoint_url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Sends a request and returns the body of a successful response.
    ///
    /// Non-success responses are logged with their JSON body (or a note
    /// that it could not be decoded) and turned into
    /// [`CouponError::Api`].
    async fn execute(builder: reqwest::RequestBuilder) -> Result<String> {
        let response = builder.header(ACCEPT, APPLICATION_JSON).send().await?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");
        if status.is_success() {
            let body = response.text().await?;
            tracing::trace!(body_len = body.len(), "read response body");
            return Ok(body);
        }

        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<serde_json::Value>(&text).ok();
        log_server_body(body.as_ref());
        Err(CouponError::Api {
            status: status.as_u16(),
            body,
        })
    }

    /// Deserializes a successful response body.
    ///
    /// A body that is JSON but not of the expected shape is logged as
    /// received.
    fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T> {
        let value: serde_json::Value =
            serde_json::from_str(body).inspect_err(|_| log_server_body(None))?;
        T::deserialize(&value).map_err(|err| {
            log_server_body(Some(&value));
            CouponError::from(err)
        })
    }
}

/// Logs a server response body at ERROR level.
///
/// `None` means the body was not valid JSON.
pub(crate) fn log_server_body(body: Option<&serde_json::Value>) {
    match body {
        Some(json) => tracing::error!("server error response: {json}"),
        None => tracing::error!("failed to decode server error response"),
    }
}
