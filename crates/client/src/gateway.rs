use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::errors::ClientError;

/// Outcome of an authenticated call: the decoded payload, or notice that
/// the backend rejected the token (HTTP 401/403).
///
/// The original client logged the user out as a side effect buried inside
/// its fetch helper; here expiry is an explicit value and the caller owns
/// the session wipe and navigation.
#[derive(Debug)]
pub enum ApiResponse<T> {
    Ok(T),
    AuthExpired,
}

impl<T> ApiResponse<T> {
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ApiResponse::AuthExpired)
    }
}

/// HTTP request builder for the portal API.
///
/// All paths are relative to one fixed base URL. A bearer header is
/// attached only when a token is supplied; no token means no header at
/// all, never an empty one. No retries: transport failures propagate for
/// the caller to handle.
pub struct Gateway {
    http: reqwest::Client,
    base_url: String,
}

impl Gateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Common tail: attach the token, send, and classify the status.
    async fn send(
        &self,
        builder: RequestBuilder,
        token: Option<&str>,
    ) -> Result<ApiResponse<Response>, ClientError> {
        let builder = match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };
        let resp = builder.send().await.map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(status = status.as_u16(), "session expired or unauthorized access");
            return Ok(ApiResponse::AuthExpired);
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api { status: status.as_u16(), message });
        }
        Ok(ApiResponse::Ok(resp))
    }

    async fn decode<T: DeserializeOwned>(
        resp: ApiResponse<Response>,
    ) -> Result<ApiResponse<T>, ClientError> {
        match resp {
            ApiResponse::AuthExpired => Ok(ApiResponse::AuthExpired),
            ApiResponse::Ok(resp) => {
                let value = resp.json().await.map_err(|e| ClientError::Decode(e.to_string()))?;
                Ok(ApiResponse::Ok(value))
            }
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<ApiResponse<T>, ClientError> {
        let resp = self.send(self.http.get(self.url(path)), token).await?;
        Self::decode(resp).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<ApiResponse<T>, ClientError> {
        let resp = self.send(self.http.post(self.url(path)).json(body), token).await?;
        Self::decode(resp).await
    }

    /// POST with a JSON body where only the status matters (the backend
    /// answers these with plain text).
    pub async fn post_json_status<B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<ApiResponse<()>, ClientError> {
        let resp = self.send(self.http.post(self.url(path)).json(body), token).await?;
        Ok(match resp {
            ApiResponse::AuthExpired => ApiResponse::AuthExpired,
            ApiResponse::Ok(_) => ApiResponse::Ok(()),
        })
    }

    /// PUT with a JSON body where only the status matters (the backend
    /// answers these with plain text).
    pub async fn put_json_status<B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<ApiResponse<()>, ClientError> {
        let resp = self.send(self.http.put(self.url(path)).json(body), token).await?;
        Ok(match resp {
            ApiResponse::AuthExpired => ApiResponse::AuthExpired,
            ApiResponse::Ok(_) => ApiResponse::Ok(()),
        })
    }

    /// Body-less PUT (e.g. the status-update endpoint drives everything
    /// through path and query).
    pub async fn put_empty(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<ApiResponse<()>, ClientError> {
        let resp = self.send(self.http.put(self.url(path)), token).await?;
        Ok(match resp {
            ApiResponse::AuthExpired => ApiResponse::AuthExpired,
            ApiResponse::Ok(_) => ApiResponse::Ok(()),
        })
    }

    pub async fn delete(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<ApiResponse<()>, ClientError> {
        let resp = self.send(self.http.delete(self.url(path)), token).await?;
        Ok(match resp {
            ApiResponse::AuthExpired => ApiResponse::AuthExpired,
            ApiResponse::Ok(_) => ApiResponse::Ok(()),
        })
    }

    /// Unauthenticated POST for the login endpoint. A 401 here means bad
    /// credentials, not an expired session, so the expiry mapping does not
    /// apply; every non-2xx becomes an `Api` error carrying the backend's
    /// message text.
    pub async fn post_public<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api { status: status.as_u16(), message });
        }
        resp.json().await.map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Percent-encode a free-text value for use as a single path segment
/// (event names can contain spaces and punctuation).
pub(crate) fn encode_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => {
                out.push('%');
                out.push_str(&format!("{b:02X}"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_path_segments() {
        assert_eq!(encode_segment("Robotics Demo"), "Robotics%20Demo");
        assert_eq!(encode_segment("plain-name_1.0~x"), "plain-name_1.0~x");
        assert_eq!(encode_segment("a/b?c"), "a%2Fb%3Fc");
    }

    #[test]
    fn trims_trailing_slash_from_base() {
        let gw = Gateway::new("http://localhost:8080/api/v1/", Duration::from_secs(5)).unwrap();
        assert_eq!(gw.base_url(), "http://localhost:8080/api/v1");
        assert_eq!(gw.url("/student/register"), "http://localhost:8080/api/v1/student/register");
    }
}
