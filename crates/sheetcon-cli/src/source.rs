//! The data source: a JSON array of flat objects, fetched over HTTP or read
//! from disk.

use std::{path::Path, time::Duration};

use anyhow::{Context, Result, anyhow};
use sheetcon_core::record::{Record, parse_batch};
use tracing::debug;

use crate::settings::expand_tilde;

fn is_url(source: &str) -> bool {
  source.starts_with("http://") || source.starts_with("https://")
}

async fn download(url: &str) -> Result<Vec<u8>> {
  let client = reqwest::Client::builder()
    .timeout(Duration::from_secs(60))
    .build()
    .context("failed to build HTTP client")?;
  let resp = client
    .get(url)
    .send()
    .await
    .with_context(|| format!("GET {url} failed"))?;

  if !resp.status().is_success() {
    return Err(anyhow!("GET {url} → {}", resp.status()));
  }
  let bytes = resp.bytes().await.context("reading response body")?;
  Ok(bytes.to_vec())
}

/// Fetch and parse the batch at `source`.
pub async fn load_records(source: &str) -> Result<Vec<Record>> {
  let bytes = if is_url(source) {
    download(source).await?
  } else {
    let path = expand_tilde(Path::new(source));
    tokio::fs::read(&path)
      .await
      .with_context(|| format!("reading {}", path.display()))?
  };
  debug!(source, bytes = bytes.len(), "fetched source");

  parse_batch(&bytes).with_context(|| format!("parsing {source}"))
}
