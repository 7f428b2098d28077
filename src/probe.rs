// ABOUTME: Plain-HTTP reachability probe for the deployed application.
// ABOUTME: Issues a single GET over a raw hyper HTTP/1 connection.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper_util::rt::TokioIo;
use std::time::Duration;
use tokio::net::TcpStream;

/// Fetches the status code of `GET http://<host>/`.
#[async_trait]
pub trait AppProbe: Send + Sync {
    async fn get(&self, host: &str) -> Result<u16, ProbeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("invalid application host: {0:?}")]
    InvalidHost(String),

    #[error("connection to {host} failed: {message}")]
    Connect { host: String, message: String },

    #[error("HTTP exchange with {host} failed: {message}")]
    Http { host: String, message: String },

    #[error("request to {host} timed out after {timeout:?}")]
    Timeout { host: String, timeout: Duration },
}

/// Probe over plain TCP, port 80 unless the host names one.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    timeout: Duration,
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

impl HttpProbe {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn exchange(&self, host: &str, authority: &str) -> Result<u16, ProbeError> {
        let stream = TcpStream::connect(authority)
            .await
            .map_err(|e| ProbeError::Connect {
                host: host.to_string(),
                message: e.to_string(),
            })?;

        let http_err = |e: &dyn std::fmt::Display| ProbeError::Http {
            host: host.to_string(),
            message: e.to_string(),
        };

        let io = TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| http_err(&e))?;

        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!("probe connection error: {}", e);
            }
        });

        let req = hyper::Request::builder()
            .method("GET")
            .uri("/")
            .header("Host", host)
            .header("User-Agent", concat!("deployprobe/", env!("CARGO_PKG_VERSION")))
            .body(Empty::<Bytes>::new())
            .map_err(|e| http_err(&e))?;

        let resp = sender.send_request(req).await.map_err(|e| http_err(&e))?;
        let status = resp.status().as_u16();

        // Drain the body so the server sees a complete exchange.
        if let Err(e) = resp.into_body().collect().await {
            tracing::debug!("failed to read probe response body: {}", e);
        }

        Ok(status)
    }
}

#[async_trait]
impl AppProbe for HttpProbe {
    async fn get(&self, host: &str) -> Result<u16, ProbeError> {
        let host = normalize_host(host)?;
        let authority = if host.contains(':') {
            host.to_string()
        } else {
            format!("{host}:80")
        };

        tokio::time::timeout(self.timeout, self.exchange(host, &authority))
            .await
            .map_err(|_| ProbeError::Timeout {
                host: host.to_string(),
                timeout: self.timeout,
            })?
    }
}

/// Strip an optional `http://` scheme and trailing path separator.
pub fn normalize_host(host: &str) -> Result<&str, ProbeError> {
    let trimmed = host.trim();
    let trimmed = trimmed.strip_prefix("http://").unwrap_or(trimmed);
    let trimmed = trimmed.trim_end_matches('/');
    if trimmed.is_empty() || trimmed.contains('/') || trimmed.contains(char::is_whitespace) {
        return Err(ProbeError::InvalidHost(host.to_string()));
    }
    Ok(trimmed)
}
