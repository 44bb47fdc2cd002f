// src/bbmp/client.rs
use crate::utils::error::FetchError;
use reqwest::header;
use std::time::Duration;

/// Default location of the BBMP covid bed status page.
pub const DEFAULT_STATUS_URL: &str = "https://apps.bbmpgov.in/covidbedstatus/";

const USER_AGENT: &str = "bedstatus_extractor/0.1 (bed availability monitor)";
// The page sits behind a small government host; keep a polite delay
// between requests so repeated runs don't hammer it.
const REQUEST_DELAY_MS: u64 = 250;

/// Creates a reqwest client configured for the status page.
fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
}

/// Downloads the bed status page and returns its HTML body.
pub async fn fetch_status_page(url: &str) -> Result<String, FetchError> {
    let client = build_client()?;

    tracing::info!("Downloading bed status page from: {}", url);
    tokio::time::sleep(Duration::from_millis(REQUEST_DELAY_MS)).await;

    let response = client
        .get(url)
        .header(header::ACCEPT, "text/html,text/plain,*/*")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        tracing::error!("HTTP error status: {} for URL: {}", status, url);
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::PageNotFound(url.to_string()));
        }
        return Err(FetchError::Http(status));
    }

    let body = response.text().await?;
    tracing::debug!("Successfully downloaded {} bytes from {}", body.len(), url);

    Ok(body)
}
