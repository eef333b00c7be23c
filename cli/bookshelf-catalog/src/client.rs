//! Catalog client for the search and work-lookup endpoints.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use enum_dispatch::enum_dispatch;
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap};
use tracing::{debug, instrument};
use url::Url;

use crate::config::CatalogClientConfig;
use crate::error::{CatalogError, NetworkError, ValidationError};
use crate::types::{RawSearchPage, RawWork, SearchPage, WorkDetails};

/// Results per page. The catalog serves pages of this size and page math on
/// the consumer side divides by it.
pub const DEFAULT_PAGE_SIZE: NonZeroU32 = NonZeroU32::new(10).unwrap();

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Either a client for the actual catalog service,
/// or a mock client for testing.
#[derive(Debug)]
#[enum_dispatch(ClientTrait)]
pub enum Client {
    Catalog(CatalogClient),
    Mock(MockClient),
}

/// The complete catalog API interface.
///
/// This trait enables alternate implementations:
/// - **HTTP**: REST calls to the catalog via [`CatalogClient`]
/// - **Mock**: canned responses without HTTP via [`MockClient`]
#[enum_dispatch]
#[allow(async_fn_in_trait)]
pub trait ClientTrait {
    /// Fetch one page of works matching a search term.
    ///
    /// Fails with [ValidationError::EmptyQuery] before issuing a request when
    /// the query is blank.
    async fn search(
        &self,
        query: impl AsRef<str> + Send + Sync,
        page: u32,
        limit: NonZeroU32,
    ) -> Result<SearchPage, CatalogError>;

    /// Fetch the full record for a single work.
    ///
    /// Resolves to `None` when the catalog has no such work; that outcome is
    /// not an error.
    async fn work_details(
        &self,
        id: impl AsRef<str> + Send + Sync,
    ) -> Result<Option<WorkDetails>, CatalogError>;
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// A client for the catalog service.
///
/// Wraps a [reqwest::Client] configured once at construction with timeouts,
/// user agent, and any extra headers. Each operation issues exactly one
/// outbound request; there are no retries and no caching.
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: Url,
}

impl Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog client from configuration.
    pub fn new(config: CatalogClientConfig) -> Result<Self, CatalogError> {
        let base_url = Url::parse(&config.base_url).map_err(|err| {
            CatalogError::Config(format!("invalid catalog URL '{}': {err}", config.base_url))
        })?;
        let client = build_http_client(&config)?;
        Ok(Self { client, base_url })
    }

    /// Get the configured catalog URL.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        self.base_url
            .join(path)
            .map_err(|err| CatalogError::Config(format!("invalid endpoint path '{path}': {err}")))
    }
}

impl ClientTrait for CatalogClient {
    #[instrument(skip_all, fields(query = %query.as_ref(), page = page, limit = limit.get()))]
    async fn search(
        &self,
        query: impl AsRef<str> + Send + Sync,
        page: u32,
        limit: NonZeroU32,
    ) -> Result<SearchPage, CatalogError> {
        let query = query.as_ref();
        if query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery.into());
        }

        debug!("sending search request");
        let response = self
            .client
            .get(self.endpoint("search.json")?)
            .query(&[
                ("q", query.to_string()),
                ("page", page.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(NetworkError::Transport)?;
        let response = check_status(response)?;

        let raw: RawSearchPage = response.json().await.map_err(NetworkError::Decode)?;
        let search_page = SearchPage::from(raw);
        debug!(
            docs = search_page.docs.len(),
            num_found = search_page.num_found,
            "received search page"
        );
        Ok(search_page)
    }

    #[instrument(skip_all, fields(id = %id.as_ref()))]
    async fn work_details(
        &self,
        id: impl AsRef<str> + Send + Sync,
    ) -> Result<Option<WorkDetails>, CatalogError> {
        let id = id.as_ref();
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyId.into());
        }

        debug!("sending work lookup request");
        let response = self
            .client
            .get(self.endpoint(&format!("works/{id}.json"))?)
            .send()
            .await
            .map_err(NetworkError::Transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("work not found");
            return Ok(None);
        }
        let response = check_status(response)?;

        let raw: RawWork = response.json().await.map_err(NetworkError::Decode)?;
        Ok(Some(raw.normalize(id)))
    }
}

/// Maps any non-2xx response to a [NetworkError] carrying the status code.
fn check_status(response: reqwest::Response) -> Result<reqwest::Response, NetworkError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(NetworkError::Status(status))
    }
}

/// Build the HTTP client with timeouts and headers from the configuration.
fn build_http_client(config: &CatalogClientConfig) -> Result<reqwest::Client, CatalogError> {
    let mut headers = HeaderMap::new();
    for (key, value) in &config.extra_headers {
        headers.insert(
            header::HeaderName::from_str(key)
                .map_err(|err| CatalogError::Config(err.to_string()))?,
            header::HeaderValue::from_str(value)
                .map_err(|err| CatalogError::Config(err.to_string()))?,
        );
    }

    debug!(
        base_url = %config.base_url,
        extra_headers = config.extra_headers.len(),
        "building catalog HTTP client"
    );

    let client_builder = reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT);

    let client_builder = if let Some(ref user_agent) = config.user_agent {
        client_builder.user_agent(user_agent)
    } else {
        client_builder
    };

    client_builder
        .build()
        .map_err(|err| CatalogError::Config(err.to_string()))
}

// ---------------------------------------------------------------------------
// Mock client
// ---------------------------------------------------------------------------

// Arc allows pushing responses into the client after it has been handed off,
// Mutex shares the queue across the async runtime's threads.
type MockField<T> = Arc<Mutex<T>>;

/// A canned response for [MockClient].
#[derive(Debug, Clone)]
pub enum Response {
    Search(SearchPage),
    Work(Option<WorkDetails>),
    Error(u16),
}

/// A catalog client that replays seeded responses in order.
///
/// Input validation behaves exactly like the HTTP client, so blank queries
/// and ids fail without consuming a queued response.
#[derive(Debug, Default)]
pub struct MockClient {
    pub mock_responses: MockField<VecDeque<Response>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new response into the list of mock responses
    pub fn push_search_response(&mut self, page: SearchPage) {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .push_back(Response::Search(page));
    }

    /// Push a new response into the list of mock responses
    pub fn push_work_response(&mut self, work: Option<WorkDetails>) {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .push_back(Response::Work(work));
    }

    /// Push an error status into the list of mock responses
    pub fn push_error_response(&mut self, status_code: u16) {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .push_back(Response::Error(status_code));
    }

    fn pop_response(&self) -> Response {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .pop_front()
            .expect("no mock responses queued")
    }

    fn error_from_status(status_code: u16) -> CatalogError {
        let status = StatusCode::from_u16(status_code).expect("invalid mock status code");
        NetworkError::Status(status).into()
    }
}

impl ClientTrait for MockClient {
    async fn search(
        &self,
        query: impl AsRef<str> + Send + Sync,
        _page: u32,
        _limit: NonZeroU32,
    ) -> Result<SearchPage, CatalogError> {
        if query.as_ref().trim().is_empty() {
            return Err(ValidationError::EmptyQuery.into());
        }
        match self.pop_response() {
            Response::Search(page) => Ok(page),
            Response::Error(status) => Err(Self::error_from_status(status)),
            other => panic!("expected a search response, found: {other:?}"),
        }
    }

    async fn work_details(
        &self,
        id: impl AsRef<str> + Send + Sync,
    ) -> Result<Option<WorkDetails>, CatalogError> {
        if id.as_ref().trim().is_empty() {
            return Err(ValidationError::EmptyId.into());
        }
        match self.pop_response() {
            Response::Work(work) => Ok(work),
            Response::Error(status) => Err(Self::error_from_status(status)),
            other => panic!("expected a work response, found: {other:?}"),
        }
    }
}

#[cfg(test)]
pub mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::types::CoverSize;

    fn client_config(url: &str) -> CatalogClientConfig {
        CatalogClientConfig {
            base_url: url.to_string(),
            extra_headers: Default::default(),
            user_agent: None,
        }
    }

    fn client_for(server: &MockServer) -> CatalogClient {
        CatalogClient::new(client_config(&server.base_url())).unwrap()
    }

    #[tokio::test]
    async fn search_maps_docs_and_num_found() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/search.json")
                .query_param("q", "dune")
                .query_param("page", "1")
                .query_param("limit", "10");
            then.status(200).json_body(json!({
                "numFound": 25,
                "docs": [
                    {
                        "key": "/works/OL893415W",
                        "title": "Dune",
                        "author_name": ["Frank Herbert"],
                        "first_publish_year": 1965,
                        "cover_i": 11481354,
                        "subject": ["Science fiction", "Deserts", "Politics"],
                    },
                    {
                        "cover_edition_key": "OL7353617M",
                        "title": "Dune Messiah",
                        "subtitle": "the sequel",
                    },
                ],
            }));
        });

        let client = client_for(&server);
        let page = client.search("dune", 1, DEFAULT_PAGE_SIZE).await.unwrap();
        mock.assert();

        assert_eq!(page.num_found, 25);
        assert_eq!(page.total_pages(DEFAULT_PAGE_SIZE), 3);
        assert_eq!(page.docs.len(), 2);

        let first = &page.docs[0];
        assert_eq!(first.id.as_deref(), Some("OL893415W"));
        assert_eq!(first.author_name, "Frank Herbert");
        assert_eq!(first.first_publish_year, Some(1965));
        assert_eq!(first.short_desc, "Science fiction, Deserts, Politics");

        let second = &page.docs[1];
        assert_eq!(second.id.as_deref(), Some("OL7353617M"));
        assert_eq!(second.short_desc, "the sequel");
    }

    #[tokio::test]
    async fn search_blank_query_issues_no_request() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|_when, then| {
            then.status(200).json_body(json!({"docs": [], "numFound": 0}));
        });

        let client = client_for(&server);
        let result = client.search("   ", 1, DEFAULT_PAGE_SIZE).await;
        assert!(matches!(
            result,
            Err(CatalogError::Validation(ValidationError::EmptyQuery))
        ));
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn search_error_message_includes_status() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|_when, then| {
            then.status(503);
        });

        let client = client_for(&server);
        let err = client
            .search("dune", 1, DEFAULT_PAGE_SIZE)
            .await
            .unwrap_err();
        mock.assert();
        assert!(
            matches!(
                err,
                CatalogError::Network(NetworkError::Status(StatusCode::SERVICE_UNAVAILABLE))
            ),
            "expected a status error, found: {err:?}"
        );
        assert!(err.to_string().contains("503"), "message was: {err}");
    }

    #[tokio::test]
    async fn search_passes_pagination_params() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/search.json")
                .query_param("page", "3")
                .query_param("limit", "10");
            then.status(200).json_body(json!({"docs": [], "numFound": 0}));
        });

        let client = client_for(&server);
        let page = client.search("dune", 3, DEFAULT_PAGE_SIZE).await.unwrap();
        mock.assert();
        assert!(page.docs.is_empty());
        assert_eq!(page.total_pages(DEFAULT_PAGE_SIZE), 1);
    }

    #[tokio::test]
    async fn work_details_maps_the_record() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/works/OL893415W.json");
            then.status(200).json_body(json!({
                "key": "/works/OL893415W",
                "title": "Dune",
                "description": {"type": "/type/text", "value": "A desert planet."},
                "subjects": ["Science fiction", "Deserts"],
                "covers": [11481354],
                "links": [{"title": "Official site", "url": "https://dunenovels.com"}],
                "created": {"type": "/type/datetime", "value": "2009-12-11T01:57:19"},
                "first_publish_date": "1965",
            }));
        });

        let client = client_for(&server);
        let work = client
            .work_details("OL893415W")
            .await
            .unwrap()
            .expect("work should exist");
        mock.assert();

        assert_eq!(work.id, "OL893415W");
        assert_eq!(work.description, "A desert planet.");
        assert_eq!(work.links.len(), 1);
        assert_eq!(work.created.as_deref(), Some("2009-12-11T01:57:19"));
        assert_eq!(
            work.cover_url(CoverSize::Large).as_deref(),
            Some("https://covers.openlibrary.org/b/id/11481354-L.jpg")
        );
    }

    #[tokio::test]
    async fn work_details_resolves_not_found_to_none() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/works/OLnopeW.json");
            then.status(404)
                .json_body(json!({"error": "notfound", "key": "/works/OLnopeW"}));
        });

        let client = client_for(&server);
        let work = client.work_details("OLnopeW").await.unwrap();
        mock.assert();
        assert_eq!(work, None);
    }

    #[tokio::test]
    async fn work_details_blank_id_issues_no_request() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|_when, then| {
            then.status(200).json_body(json!({}));
        });

        let client = client_for(&server);
        let result = client.work_details("").await;
        assert!(matches!(
            result,
            Err(CatalogError::Validation(ValidationError::EmptyId))
        ));
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn work_details_other_statuses_are_errors() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|_when, then| {
            then.status(500);
        });

        let client = client_for(&server);
        let err = client.work_details("OL893415W").await.unwrap_err();
        mock.assert();
        assert!(
            matches!(err, CatalogError::Network(NetworkError::Status(_))),
            "expected a status error, found: {err:?}"
        );
    }

    #[tokio::test]
    async fn extra_headers_set_on_all_requests() {
        let mut extra_headers = std::collections::BTreeMap::new();
        extra_headers.insert("bookshelf-test".to_string(), "test-value".to_string());

        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.header("bookshelf-test", "test-value");
            then.status(200).json_body(json!({"docs": [], "numFound": 0}));
        });

        let config = CatalogClientConfig {
            extra_headers,
            ..client_config(&server.base_url())
        };
        let client = CatalogClient::new(config).unwrap();
        let _ = client.search("dune", 1, DEFAULT_PAGE_SIZE).await;
        mock.assert();
    }

    #[tokio::test]
    async fn user_agent_set_on_all_requests() {
        let expected_agent = "bookshelf-cli/test";

        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.header("user-agent", expected_agent);
            then.status(200).json_body(json!({"docs": [], "numFound": 0}));
        });

        let config = CatalogClientConfig {
            user_agent: Some(expected_agent.to_owned()),
            ..client_config(&server.base_url())
        };
        let client = CatalogClient::new(config).unwrap();
        let _ = client.search("dune", 1, DEFAULT_PAGE_SIZE).await;
        mock.assert();
    }

    #[tokio::test]
    async fn mock_client_replays_responses_in_order() {
        let mut mock = MockClient::new();
        mock.push_search_response(SearchPage {
            docs: vec![],
            num_found: 42,
        });
        mock.push_error_response(500);

        let client = Client::from(mock);
        let page = client.search("dune", 1, DEFAULT_PAGE_SIZE).await.unwrap();
        assert_eq!(page.num_found, 42);

        let err = client
            .search("dune", 2, DEFAULT_PAGE_SIZE)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn rejects_invalid_base_url() {
        let result = CatalogClient::new(client_config("not a url"));
        assert!(matches!(result, Err(CatalogError::Config(_))));
    }
}
