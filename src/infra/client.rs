//! HTTP implementation of the content-source contract.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::application::repos::{ContentSource, ListQuery, SourceError};

/// Header carrying the service API key.
const API_KEY_HEADER: &str = "X-MICROCMS-API-KEY";

/// Client for the remote list-query API.
///
/// One GET per list call: the collection name is joined onto the base URL
/// (which therefore must end with a slash) and the query is appended as
/// canonical pairs.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base: Url,
    key: String,
}

impl ApiClient {
    pub fn new(base: Url, key: String, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()
            .map_err(SourceError::request)?;
        Ok(Self { client, base, key })
    }

    pub fn user_agent() -> &'static str {
        concat!("onepage/", env!("CARGO_PKG_VERSION"))
    }

    fn url(&self, collection: &str, query: &ListQuery) -> Result<Url, SourceError> {
        let mut url = self.base.join(collection).map_err(SourceError::url)?;
        let pairs = query.to_pairs();
        if !pairs.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in &pairs {
                query_pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl ContentSource for ApiClient {
    async fn list_raw(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> Result<serde_json::Value, SourceError> {
        let url = self.url(collection, query)?;

        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.key)
            .send()
            .await
            .map_err(SourceError::request)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(SourceError::request)?;
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        serde_json::from_slice(&bytes).map_err(SourceError::decode)
    }
}
