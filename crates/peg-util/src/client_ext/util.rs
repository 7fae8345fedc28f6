use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::future::Future;
use tracing::trace;

/// A fully buffered HTTP response: status, declared content type and raw body.
///
/// The body is kept as bytes so the caller decides between the JSON and the
/// binary decoders after looking at [`Payload::is_json()`].
#[derive(Debug, Clone)]
pub struct Payload {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Deserialize)]
struct Detail {
    detail: String,
}

impl Payload {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// `true` when the server declared a JSON body (`application/json`, or any
    /// `+json` suffix type).
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| {
                let mime = ct.split(';').next().unwrap_or("").trim();
                mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
            })
            .unwrap_or(false)
    }

    /// The `{"detail": "..."}` message REST error bodies carry, if any.
    pub fn detail(&self) -> Option<String> {
        if !self.is_json() {
            return None;
        }
        serde_json::from_slice::<Detail>(&self.body)
            .ok()
            .map(|d| d.detail)
    }
}

pub trait ClientUtilExt {
    fn fetch_payload(&self, url: &str) -> impl Future<Output = reqwest::Result<Payload>> + Send;

    fn post_json_payload<T>(
        &self,
        url: &str,
        body: &T,
    ) -> impl Future<Output = reqwest::Result<Payload>> + Send
    where
        T: serde::Serialize + Sync;

    fn probe(&self, url: &str) -> impl Future<Output = Option<StatusCode>> + Send;
}

impl ClientUtilExt for Client {
    /// GET `url` and buffer the whole body.
    async fn fetch_payload(&self, url: &str) -> reqwest::Result<Payload> {
        trace!("GET {url}");
        let response = self.get(url).send().await?;
        into_payload(response).await
    }

    /// POST `body` as JSON to `url` and buffer the whole response body.
    async fn post_json_payload<T>(&self, url: &str, body: &T) -> reqwest::Result<Payload>
    where
        T: serde::Serialize + Sync,
    {
        trace!("POST {url}");
        let response = self.post(url).json(body).send().await?;
        into_payload(response).await
    }

    /// Single readiness probe: the status code, or `None` if the connection
    /// itself failed.
    async fn probe(&self, url: &str) -> Option<StatusCode> {
        match self.get(url).send().await {
            Ok(response) => Some(response.status()),
            Err(e) => {
                trace!("probe {url} failed: {e}");
                None
            }
        }
    }
}

async fn into_payload(response: reqwest::Response) -> reqwest::Result<Payload> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .map(str::to_string);
    let body = response.bytes().await?.to_vec();
    trace!("{status} with {} bytes ({content_type:?})", body.len());
    Ok(Payload {
        status,
        content_type,
        body,
    })
}
