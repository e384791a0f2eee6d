//! Stateless HTTP request builder and response parser for the branch API.
//!
//! # Design
//! `ApiClient` holds only the base URL and the optional bearer token and
//! carries no mutable state between calls. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. `get_json` / `put_json` glue the two
//! halves around a caller-supplied `Transport` for one round trip: no retry,
//! no timeout, no caching.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::http::{find_header, HttpMethod, HttpRequest, HttpResponse, RequestBody, Transport};
use crate::types::{Branch, BranchForm, BranchPage, ReservationStatusUpdate};

/// Branch listing with sections and their tables eagerly included.
pub const LIST_BRANCHES_PATH: &str = "/branches?include[0]=sections&include[1]=sections.tables";

/// Extra per-request settings.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    /// Deserialize a JSON body into `T`. A text body is a decode error.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            ResponseBody::Json(value) => {
                serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
            }
            ResponseBody::Text(_) => Err(ApiError::Decode(
                "expected a JSON response, got text".to_string(),
            )),
        }
    }
}

/// Synchronous, stateless client for the branch API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            token: config.token.clone().filter(|t| !t.is_empty()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs pass through; anything else is joined to the base with
    /// exactly one `/` between them.
    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn build_get(&self, path: &str, options: RequestOptions) -> HttpRequest {
        self.build(HttpMethod::Get, path, None, options)
    }

    pub fn build_put(&self, path: &str, body: RequestBody, options: RequestOptions) -> HttpRequest {
        self.build(HttpMethod::Put, path, Some(body), options)
    }

    fn build(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
        options: RequestOptions,
    ) -> HttpRequest {
        let mut headers = options.headers;
        set_header(&mut headers, "accept", "application/json");
        if let Some(token) = &self.token {
            set_header(&mut headers, "authorization", &format!("Bearer {token}"));
        }
        if find_header(&headers, "content-type").is_none() {
            match &body {
                Some(RequestBody::Json(_)) => {
                    headers.push(("content-type".to_string(), "application/json".to_string()));
                }
                Some(RequestBody::Multipart(form)) => {
                    headers.push(("content-type".to_string(), form.content_type()));
                }
                None => {}
            }
        }
        HttpRequest {
            method,
            url: self.resolve_url(path),
            headers,
            body,
        }
    }

    /// Fail on non-2xx, then decode JSON-declared bodies and pass everything
    /// else through as text.
    pub fn parse_response(&self, response: HttpResponse) -> Result<ResponseBody, ApiError> {
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                status_text: response.status_text,
            });
        }
        let is_json = response
            .header("content-type")
            .is_some_and(|ct| ct.contains("application/json"));
        if is_json {
            serde_json::from_str(&response.body)
                .map(ResponseBody::Json)
                .map_err(|e| ApiError::Decode(e.to_string()))
        } else {
            Ok(ResponseBody::Text(response.body))
        }
    }

    /// Execute `request` and decode the response body without imposing a shape.
    pub fn send<T: Transport + ?Sized>(
        &self,
        transport: &T,
        request: &HttpRequest,
    ) -> Result<ResponseBody, ApiError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = transport.execute(request)?;
        debug!(status = response.status, url = %request.url, "received response");
        self.parse_response(response)
    }

    pub fn get_json<T, R>(&self, transport: &R, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        R: Transport + ?Sized,
    {
        let request = self.build_get(path, RequestOptions::default());
        self.send(transport, &request)?.into_json()
    }

    /// PUT `body` as given: JSON is sent as encoded, a multipart form passes
    /// through unmodified. `None` sends `{}`.
    pub fn put_json<T, R>(&self, transport: &R, path: &str, body: Option<RequestBody>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        R: Transport + ?Sized,
    {
        let body = body.unwrap_or_else(RequestBody::empty_json);
        let request = self.build_put(path, body, RequestOptions::default());
        self.send(transport, &request)?.into_json()
    }

    // ---------------------------------------------------------------------
    // Branch operations
    // ---------------------------------------------------------------------

    pub fn build_list_branches(&self) -> HttpRequest {
        self.build_get(LIST_BRANCHES_PATH, RequestOptions::default())
    }

    pub fn parse_list_branches(&self, response: HttpResponse) -> Result<BranchPage, ApiError> {
        self.parse_response(response)?.into_json()
    }

    pub fn build_update_reservation_status(
        &self,
        branch_id: &str,
        accepts: bool,
    ) -> Result<HttpRequest, ApiError> {
        let body = RequestBody::json(&ReservationStatusUpdate {
            accepts_reservations: accepts,
        })?;
        Ok(self.build_put(&branch_path(branch_id), body, RequestOptions::default()))
    }

    pub fn build_update_branch(&self, branch_id: &str, form: &BranchForm) -> Result<HttpRequest, ApiError> {
        let body = RequestBody::json(form)?;
        Ok(self.build_put(&branch_path(branch_id), body, RequestOptions::default()))
    }

    pub fn parse_update_branch(&self, response: HttpResponse) -> Result<Branch, ApiError> {
        self.parse_response(response)?.into_json()
    }
}

pub fn branch_path(branch_id: &str) -> String {
    format!("/branches/{branch_id}")
}

/// Replace any existing header with the same name, else append.
fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value.to_string()));
}
