//! HTTP tracker client.
//!
//! It sends raw requests to a tracker and leaves the interpretation of the
//! response to the caller. Client sessions decode the body with
//! [`responses::decode_announce`], integration tests usually assert on the
//! raw [`Response`].
pub mod requests;
pub mod responses;

use std::time::Duration;

use reqwest::{Client as ReqwestClient, Response, Url};
use thiserror::Error;

/// Error returned by the HTTP tracker client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to build the http client: {source}")]
    UnableToBuildClient { source: reqwest::Error },

    #[error("invalid tracker url {url}: {source}")]
    InvalidUrl { url: String, source: url::ParseError },

    #[error("the request to {url} failed: {source}")]
    RequestFailed { url: String, source: reqwest::Error },
}

/// HTTP Tracker Client
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    reqwest: ReqwestClient,
}

/// URL components in this context:
///
/// ```text
/// http://127.0.0.1:62304/announce?info_hash=%9C8B%22%13%E3%0B%FF%21%2B0%C3%60%D2o%9A%02%13d%22
/// \_____________________/\______/ \__________________________________________________________/
///            |               |                                    |
///         base url          path                                query
/// ```
///
/// The base url may also be the full announce url of the tracker. Paths are
/// resolved against it, so `http://127.0.0.1:7070/announce` and
/// `http://127.0.0.1:7070/` reach the same endpoints.
impl Client {
    /// # Errors
    ///
    /// Will return an error if the underlying `reqwest` client can't be built.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, Error> {
        let reqwest = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| Error::UnableToBuildClient { source })?;

        Ok(Self { base_url, reqwest })
    }

    /// # Errors
    ///
    /// Will return an error if the request can't be sent or times out.
    pub async fn announce(&self, query: &requests::Announce) -> Result<Response, Error> {
        self.get(&format!("announce?{query}")).await
    }

    /// # Errors
    ///
    /// Will return an error if the request can't be sent or times out.
    pub async fn health_check(&self) -> Result<Response, Error> {
        self.get("health_check").await
    }

    /// # Errors
    ///
    /// Will return an error if the url is not valid, or the request can't be
    /// sent or times out.
    pub async fn get(&self, path: &str) -> Result<Response, Error> {
        let url = self.build_url(path)?;

        self.reqwest
            .get(url.clone())
            .send()
            .await
            .map_err(|source| Error::RequestFailed { url, source })
    }

    fn build_url(&self, path: &str) -> Result<String, Error> {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };

        let url = self.base_url.join(path).map_err(|source| Error::InvalidUrl {
            url: format!("{}{path}", self.base_url),
            source,
        })?;

        // The query is already percent-encoded. `Url` would encode it again.
        Ok(match query {
            Some(query) => format!("{url}?{query}"),
            None => url.to_string(),
        })
    }
}
