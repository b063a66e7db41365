use super::*;

/// Failures talking to a remote service. Cloneable so that concurrent waiters
/// on one in-flight request can all observe the same outcome.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("Could not reach backend at {url}.")]
    Unreachable { url: String, detail: String },

    #[error("Request to {url} timed out.")]
    TimedOut { url: String },

    /// Non-2xx status or an `{ "error": ... }` payload. The message is shown verbatim.
    #[error("{0}")]
    Backend(String),

    #[error("unexpected response from {url}: {detail}")]
    Protocol { url: String, detail: String },
}

impl RemoteError {
    pub(super) fn transport(base: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return RemoteError::TimedOut {
                url: base.to_string(),
            };
        }
        if err.is_decode() {
            return RemoteError::Protocol {
                url: base.to_string(),
                detail: err.to_string(),
            };
        }
        RemoteError::Unreachable {
            url: base.to_string(),
            detail: err.to_string(),
        }
    }

    /// True when the request never got an answer from the service.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            RemoteError::Unreachable { .. } | RemoteError::TimedOut { .. }
        )
    }
}

pub(super) fn error_field(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    v.get("error")
        .and_then(|e| e.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl RemoteClient {
    pub(super) fn session_url(&self, path: &str) -> String {
        format!("{}{}", self.session_base, path)
    }

    pub(super) fn voice_url(&self, path: &str) -> String {
        format!("{}{}", self.voice_base, path)
    }

    /// Passes 2xx responses through; otherwise turns the body's `error` field
    /// (or `fallback`) into [`RemoteError::Backend`].
    pub(super) async fn ensure_ok(
        &self,
        resp: reqwest::Response,
        fallback: &str,
    ) -> Result<reqwest::Response, RemoteError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let msg = error_field(&body).unwrap_or_else(|| format!("{} ({})", fallback, status));
        tracing::debug!(%status, %msg, "remote call failed");
        Err(RemoteError::Backend(msg))
    }

    pub(super) async fn parse_json<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
        base: &str,
    ) -> Result<T, RemoteError> {
        let body = resp
            .text()
            .await
            .map_err(|e| RemoteError::transport(base, e))?;
        serde_json::from_str(&body).map_err(|e| RemoteError::Protocol {
            url: base.to_string(),
            detail: e.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "../tests/remote/http_client_tests.rs"]
mod tests;
