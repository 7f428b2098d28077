// ABOUTME: reqwest-based implementation of the Platform trait.
// ABOUTME: Handles bearer auth, the OAuth challenge login, and REST verbs.

use super::error::PlatformError;
use super::kind::ResourceKind;
use super::pods::PodList;
use super::traits::Platform;
use crate::manifest::Manifest;
use crate::types::NamespaceName;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, LOCATION};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};

const USER_AGENT: &str = concat!("deployprobe/", env!("CARGO_PKG_VERSION"));
const MERGE_PATCH: &str = "application/strategic-merge-patch+json";
const OAUTH_AUTHORIZE: &str =
    "/oauth/authorize?client_id=openshift-challenging-client&response_type=token";

/// Client for the platform REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_url: String,
}

impl ApiClient {
    /// Build a client that authenticates with a bearer token.
    pub fn with_token(api_url: &str, token: &str, tls_verify: bool) -> Result<Self, PlatformError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, */*"));
        let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| PlatformError::Client(format!("token is not a valid header: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(!tls_verify)
            .build()
            .map_err(|e| PlatformError::Client(e.to_string()))?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Exchange username and password for a token, then build a client.
    pub async fn login(
        api_url: &str,
        username: &str,
        password: &str,
        tls_verify: bool,
    ) -> Result<Self, PlatformError> {
        let token = request_token(api_url, username, password, tls_verify).await?;
        Self::with_token(api_url, &token, tls_verify)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.api_url, path))
    }

    /// Send a request, turning non-success statuses into `PlatformError::Http`.
    async fn execute(
        &self,
        method: &'static str,
        path: String,
        request: RequestBuilder,
    ) -> Result<Response, PlatformError> {
        let response = request.send().await.map_err(|e| PlatformError::Transport {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        tracing::debug!(method, %path, %status, "platform request");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(PlatformError::Http {
            method,
            path,
            status,
            body,
        })
    }

    async fn json(path: &str, response: Response) -> Result<Value, PlatformError> {
        response.json().await.map_err(|e| PlatformError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl Platform for ApiClient {
    async fn namespace_exists(&self, namespace: &NamespaceName) -> Result<bool, PlatformError> {
        let path = ResourceKind::Namespace.item_path(namespace, namespace.as_str());
        let response = self
            .request(Method::GET, &path)
            .send()
            .await
            .map_err(|e| PlatformError::Transport {
                path: path.clone(),
                message: e.to_string(),
            })?;

        match response.status() {
            status if status.is_success() => Ok(true),
            // A 403 may mean the project exists but belongs to someone else;
            // the probe cannot tell, so it treats both as absent.
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN => Ok(false),
            status => Err(PlatformError::Http {
                method: "GET",
                path,
                status,
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn create_resource(
        &self,
        namespace: &NamespaceName,
        manifest: &Manifest,
    ) -> Result<(), PlatformError> {
        let path = manifest.kind().collection_path(namespace);
        let request = self.request(Method::POST, &path).json(manifest.body());
        self.execute("POST", path, request).await.map(drop)
    }

    async fn get_resource(
        &self,
        kind: ResourceKind,
        namespace: &NamespaceName,
        name: &str,
    ) -> Result<Value, PlatformError> {
        let path = kind.item_path(namespace, name);
        let request = self.request(Method::GET, &path);
        let response = self.execute("GET", path.clone(), request).await?;
        Self::json(&path, response).await
    }

    async fn replace_resource(
        &self,
        kind: ResourceKind,
        namespace: &NamespaceName,
        name: &str,
        body: &Value,
    ) -> Result<(), PlatformError> {
        let path = kind.item_path(namespace, name);
        let request = self.request(Method::PUT, &path).json(body);
        self.execute("PUT", path, request).await.map(drop)
    }

    async fn patch_resource(
        &self,
        kind: ResourceKind,
        namespace: &NamespaceName,
        name: &str,
        patch: &Value,
    ) -> Result<(), PlatformError> {
        let path = kind.item_path(namespace, name);
        let request = self
            .request(Method::PATCH, &path)
            .header(CONTENT_TYPE, MERGE_PATCH)
            .body(patch.to_string());
        self.execute("PATCH", path, request).await.map(drop)
    }

    async fn delete_resource(
        &self,
        kind: ResourceKind,
        namespace: &NamespaceName,
        name: &str,
    ) -> Result<(), PlatformError> {
        let path = kind.item_path(namespace, name);
        let request = self
            .request(Method::DELETE, &path)
            .json(&json!({"propagationPolicy": "Background"}));
        self.execute("DELETE", path, request).await.map(drop)
    }

    async fn instantiate(
        &self,
        namespace: &NamespaceName,
        request: &Manifest,
    ) -> Result<(), PlatformError> {
        let path = format!(
            "{}/instantiate",
            request.kind().item_path(namespace, request.name())
        );
        let builder = self.request(Method::POST, &path).json(request.body());
        self.execute("POST", path, builder).await.map(drop)
    }

    async fn list_pods(&self, namespace: &NamespaceName) -> Result<PodList, PlatformError> {
        let path = ResourceKind::Pod.collection_path(namespace);
        let request = self.request(Method::GET, &path);
        let response = self.execute("GET", path.clone(), request).await?;
        let document = Self::json(&path, response).await?;
        PodList::from_api(&document).map_err(|message| PlatformError::Decode { path, message })
    }
}

/// Run the OAuth challenge flow and return the issued access token.
async fn request_token(
    api_url: &str,
    username: &str,
    password: &str,
    tls_verify: bool,
) -> Result<String, PlatformError> {
    let http = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .user_agent(USER_AGENT)
        .danger_accept_invalid_certs(!tls_verify)
        .build()
        .map_err(|e| PlatformError::Client(e.to_string()))?;

    let url = format!("{}{}", api_url.trim_end_matches('/'), OAUTH_AUTHORIZE);
    let response = http
        .get(&url)
        .basic_auth(username, Some(password))
        .header("X-CSRF-Token", "1")
        .send()
        .await
        .map_err(|e| PlatformError::Transport {
            path: OAUTH_AUTHORIZE.to_string(),
            message: e.to_string(),
        })?;

    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            PlatformError::Auth(format!(
                "OAuth server answered {} without a redirect",
                response.status()
            ))
        })?;

    parse_access_token(location)
        .ok_or_else(|| PlatformError::Auth("redirect did not carry an access token".to_string()))
}

/// Extract `access_token` from the fragment of an OAuth redirect location.
pub fn parse_access_token(location: &str) -> Option<String> {
    let (_, fragment) = location.split_once('#')?;
    fragment
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "access_token")
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|token| token.into_owned())
        .filter(|token| !token.is_empty())
}
