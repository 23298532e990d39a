use async_trait::async_trait;
use reqwest::{Request, Response};

/// Transport seam for every backend call, so tests can answer requests in memory.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
