//! The single HTTP client every backend call goes through.
//!
//! Requests are shaped in one place ([`ApiGateway::request`]): fixed base URL,
//! JSON content type, the cookie jar and a fresh `x-request-id`. Responses are
//! shaped in one place ([`ApiGateway::dispatch`]): a 401 from any endpoint
//! clears the persistent role and publishes [`SessionEvent::Expired`] before the
//! caller sees [`ApiError::Unauthenticated`].

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use trafficdesk_auth::{Credentials, LoginResponse, SessionEvent};
use trafficdesk_core::{
    NewPersonnel, PasswordChange, Personnel, Profile, ProfileUpdate, RecordDraft, RecordId,
    RecordPatch, Rule, RuleDraft, RuleId, ViolationRecord,
};
use trafficdesk_events::{EventBus, InMemoryEventBus};

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::store::SessionStore;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Bus carrying session announcements between the gateway, the session
/// manager and the coordinator.
pub type SessionBus = InMemoryEventBus<SessionEvent>;

#[derive(Debug, Clone)]
pub struct ApiGateway {
    http: reqwest::Client,
    base: Url,
    store: Arc<dyn SessionStore>,
    events: Arc<SessionBus>,
}

impl ApiGateway {
    pub fn new(
        base_url: &str,
        store: Arc<dyn SessionStore>,
        events: Arc<SessionBus>,
    ) -> ApiResult<Self> {
        let mut base =
            Url::parse(base_url).map_err(|e| ApiError::RequestSetup(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::RequestSetup(format!("{base_url}: not a base URL")));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::RequestSetup(e.to_string()))?;

        Ok(Self {
            http,
            base,
            store,
            events,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    // ---------------------------------------------------------------------
    // Auth & personnel
    // ---------------------------------------------------------------------

    pub async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        let req = self.request(Method::POST, &["user", "login"])?.json(credentials);
        self.dispatch("user/login", req).await
    }

    pub async fn logout(&self) -> ApiResult<()> {
        let req = self.request(Method::POST, &["user", "logout"])?;
        self.dispatch_ack("user/logout", req).await
    }

    pub async fn register_personnel(&self, registration: &NewPersonnel) -> ApiResult<()> {
        let req = self
            .request(Method::POST, &["api", "admin", "register"])?
            .json(registration);
        self.dispatch_ack("api/admin/register", req).await
    }

    pub async fn list_personnel(&self) -> ApiResult<Vec<Personnel>> {
        let req = self.request(Method::GET, &["api", "admin", "getAllUser"])?;
        self.dispatch("api/admin/getAllUser", req).await
    }

    pub async fn change_password(&self, change: &PasswordChange) -> ApiResult<()> {
        let req = self
            .request(Method::PUT, &["user", "profile", "password"])?
            .json(change);
        self.dispatch_ack("user/profile/password", req).await
    }

    // ---------------------------------------------------------------------
    // Rules
    // ---------------------------------------------------------------------

    pub async fn list_rules(&self) -> ApiResult<Vec<Rule>> {
        let req = self.request(Method::GET, &["api", "admin", "allrules"])?;
        self.dispatch("api/admin/allrules", req).await
    }

    pub async fn create_rule(&self, draft: &RuleDraft) -> ApiResult<()> {
        let req = self.request(Method::POST, &["api", "admin", "rules"])?.json(draft);
        self.dispatch_ack("api/admin/rules", req).await
    }

    pub async fn update_rule(&self, id: &RuleId, draft: &RuleDraft) -> ApiResult<()> {
        let req = self
            .request(Method::PUT, &["api", "admin", "rules", id.as_str()])?
            .json(draft);
        self.dispatch_ack("api/admin/rules/{id}", req).await
    }

    pub async fn delete_rule(&self, id: &RuleId) -> ApiResult<()> {
        let req = self.request(Method::DELETE, &["api", "admin", "rules", id.as_str()])?;
        self.dispatch_ack("api/admin/rules/{id}", req).await
    }

    // ---------------------------------------------------------------------
    // Violation records
    // ---------------------------------------------------------------------

    pub async fn list_records(&self) -> ApiResult<Vec<ViolationRecord>> {
        let req = self.request(Method::GET, &["pedrecord", "getAllPedRecord"])?;
        self.dispatch("pedrecord/getAllPedRecord", req).await
    }

    /// Create a record as multipart form data; the photo, if any, goes in the
    /// `image` part.
    pub async fn create_record(&self, draft: &RecordDraft) -> ApiResult<()> {
        let violations = draft
            .violations_json()
            .map_err(|e| ApiError::RequestSetup(e.to_string()))?;

        let mut form = Form::new();
        for (name, value) in draft.scalar_fields() {
            form = form.text(name, value);
        }
        form = form.text("violationRecords", violations);

        if let Some(image) = &draft.image {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)
                .map_err(|e| ApiError::RequestSetup(format!("image content type: {e}")))?;
            form = form.part("image", part);
        }

        let req = self.request(Method::POST, &["pedrecord"])?.multipart(form);
        self.dispatch_ack("pedrecord", req).await
    }

    pub async fn update_record(&self, id: &RecordId, patch: &RecordPatch) -> ApiResult<()> {
        let req = self
            .request(Method::PATCH, &["pedrecord", id.as_str()])?
            .json(patch);
        self.dispatch_ack("pedrecord/{id}", req).await
    }

    pub async fn delete_record(&self, id: &RecordId) -> ApiResult<()> {
        let req = self.request(Method::DELETE, &["pedrecord", id.as_str()])?;
        self.dispatch_ack("pedrecord/{id}", req).await
    }

    /// Point lookup by licence number. `None` means no match.
    pub async fn search_record(&self, license_number: &str) -> ApiResult<Option<ViolationRecord>> {
        let req = self.request(
            Method::GET,
            &["searchRecords", "search", license_number.trim()],
        )?;
        let body: serde_json::Value = self.dispatch("searchRecords/search/{licenseNumber}", req).await?;
        decode_lookup(body)
    }

    // ---------------------------------------------------------------------
    // Own profile
    // ---------------------------------------------------------------------

    pub async fn get_profile(&self) -> ApiResult<Profile> {
        let req = self.request(Method::GET, &["user", "profile"])?;
        self.dispatch("user/profile", req).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<()> {
        let req = self.request(Method::PUT, &["user", "profile"])?.json(update);
        self.dispatch_ack("user/profile", req).await
    }

    // ---------------------------------------------------------------------
    // Shaping
    // ---------------------------------------------------------------------

    /// Request-shaping stage shared by every call.
    fn request(&self, method: Method, segments: &[&str]) -> ApiResult<RequestBuilder> {
        if segments.iter().any(|s| s.is_empty()) {
            return Err(ApiError::RequestSetup("empty path segment".to_string()));
        }

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::RequestSetup("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);

        let request_id = uuid::Uuid::now_v7().to_string();
        tracing::debug!(%method, %url, %request_id, "outbound request");

        Ok(self
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id))
    }

    /// Response-shaping stage shared by every call.
    async fn dispatch<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        builder: RequestBuilder,
    ) -> ApiResult<T> {
        let request = builder
            .build()
            .map_err(|e| ApiError::RequestSetup(e.to_string()))?;

        let response = self.http.execute(request).await.map_err(|e| {
            tracing::warn!(endpoint, error = %e, "no response from server");
            ApiError::Unreachable(e.to_string())
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.expire_session(endpoint).await;
            return Err(ApiError::Unauthenticated);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.trim().is_empty());
            tracing::debug!(endpoint, status = status.as_u16(), "request failed");
            return Err(ApiError::from_status(status.as_u16(), message));
        }

        let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &body
        };

        serde_json::from_slice(body).map_err(|e| ApiError::Unexpected {
            status: Some(status.as_u16()),
            message: format!("undecodable response from {endpoint}: {e}"),
            server_message: None,
        })
    }

    /// Dispatch a call whose success body carries nothing the client reads.
    async fn dispatch_ack(&self, endpoint: &'static str, builder: RequestBuilder) -> ApiResult<()> {
        self.dispatch::<IgnoredAny>(endpoint, builder).await.map(|_| ())
    }

    /// Global recovery for a rejected session cookie. Runs before the 401
    /// reaches the caller.
    async fn expire_session(&self, endpoint: &str) {
        tracing::info!(endpoint, "session rejected by server");

        if let Err(err) = self.store.clear().await {
            tracing::warn!(error = %err, "failed to clear persisted role after 401");
        }

        if let Err(err) = self.events.publish(SessionEvent::Expired {
            endpoint: endpoint.to_string(),
        }) {
            tracing::error!(error = ?err, "failed to publish session expiry");
        }
    }
}

/// `null`, `""`, `{}` and `[]` all mean "no match".
fn decode_lookup<T: DeserializeOwned>(body: serde_json::Value) -> ApiResult<Option<T>> {
    let empty = match &body {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        _ => false,
    };
    if empty {
        return Ok(None);
    }

    serde_json::from_value(body)
        .map(Some)
        .map_err(|e| ApiError::Unexpected {
            status: None,
            message: format!("undecodable search result: {e}"),
            server_message: None,
        })
}
