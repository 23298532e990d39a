mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result, anyhow};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Sends a JSON `GET` and decodes the response body as `T`.
pub async fn get_json<C: HttpClient, T: DeserializeOwned>(client: &C, url: &str) -> Result<T> {
    let req = json_request(Method::GET, url, None)?;
    decode(client, req, url).await
}

/// Sends `body` as a JSON `POST` and decodes the response body as `T`.
pub async fn post_json<C, B, T>(client: &C, url: &str, body: &B) -> Result<T>
where
    C: HttpClient,
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let payload = serde_json::to_vec(body)?;
    let req = json_request(Method::POST, url, Some(payload))?;
    decode(client, req, url).await
}

fn json_request(method: Method, url: &str, body: Option<Vec<u8>>) -> Result<Request> {
    let mut req = Request::new(method, url.parse().with_context(|| format!("bad url '{url}'"))?);
    req.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(body) = body {
        *req.body_mut() = Some(body.into());
    }
    Ok(req)
}

async fn decode<C: HttpClient, T: DeserializeOwned>(client: &C, req: Request, url: &str) -> Result<T> {
    let resp = client
        .execute(req)
        .await
        .with_context(|| format!("request to {url} failed"))?;
    let resp = checked(resp).await?;
    let bytes = resp.bytes().await?;

    serde_json::from_slice(&bytes).with_context(|| format!("failed to decode response from {url}"))
}

/// Turns a non-2xx response into an error carrying the body text, or
/// `API Error: <status>` when the body is empty.
async fn checked(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    if body.trim().is_empty() {
        Err(anyhow!("API Error: {}", status.as_u16()))
    } else {
        Err(anyhow!(body))
    }
}
