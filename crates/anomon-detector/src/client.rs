use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::envelope::{decode_data, Envelope};
use crate::error::Result;

/// Shared connection to one detector instance.
///
/// Cheap to clone; every clone reuses the same connection pool.
#[derive(Debug, Clone)]
pub struct DetectorClient {
    client: reqwest::Client,
    base_url: String,
}

impl DetectorClient {
    /// Builds a client for `http://{host}:{port}` whose requests give up
    /// after `timeout`.
    pub fn new(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: format!("http://{host}:{port}"),
        })
    }

    /// GETs `path` and decodes the response envelope without looking at its
    /// status.
    pub(crate) async fn get_envelope(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Envelope> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, params = query.len(), "Calling detector");
        let resp = self.client.get(&url).query(query).send().await?;
        let body = resp.bytes().await?;
        Envelope::parse(path, &body)
    }

    /// GETs `path` and decodes the success payload into `T`.
    pub(crate) async fn get_data<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let data = self.get_envelope(path, query).await?.into_success(path)?;
        decode_data(path, data)
    }
}
