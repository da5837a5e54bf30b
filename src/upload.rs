//! Artifact uploader (AU).
//!
//! Bounded-retry HTTP PUT of a local file to a signed URL. This deliberately
//! does not reach for a retry middleware crate: the contract calls for a
//! fixed 2-second sleep between attempts and a hard attempt ceiling, not an
//! exponential backoff policy, so the loop is written out directly against
//! a plain `reqwest::Client`.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;

/// Uploads `file_path` to `url` via HTTP PUT, retrying up to `max_retries`
/// times with a 2-second pause between failed attempts. Returns `true` iff
/// some attempt received a 2xx response.
pub async fn upload(
    url: &str,
    file_path: &Path,
    connect_timeout: Duration,
    total_timeout: Duration,
    max_retries: u32,
) -> bool {
    let client = match Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(total_timeout)
        .http1_only()
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            tracing::error!(%err, "failed to build upload client");
            return false;
        }
    };

    for attempt in 1..=max_retries {
        match try_once(&client, url, file_path).await {
            Ok(true) => return true,
            Ok(false) => {
                tracing::warn!(attempt, max_retries, url, "upload returned non-2xx status");
            }
            Err(err) => {
                tracing::warn!(attempt, max_retries, url, %err, "upload attempt failed");
            }
        }
        if attempt < max_retries {
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
    }
    false
}

async fn try_once(client: &Client, url: &str, file_path: &Path) -> anyhow::Result<bool> {
    let bytes = tokio::fs::read(file_path).await?;
    let response = client
        .put(url)
        .header(reqwest::header::CONTENT_LENGTH, bytes.len() as u64)
        .body(bytes)
        .send()
        .await?;
    Ok(response.status().is_success())
}
