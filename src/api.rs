use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use crate::book::{Book, BookId, FileType, NewBook};
use crate::config::AppConfig;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid API base URI: {0}")]
    InvalidBaseUri(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned {status} for {url}")]
    Status { status: StatusCode, url: String },
    #[error("Malformed response: {0}")]
    Decode(String),
}

/// The remote book collection.
#[async_trait]
pub trait BooksApi: Send + Sync {
    fn base_url(&self) -> &Url;

    /// `GET /books`
    async fn list_books(&self) -> Result<Vec<Book>, ApiError>;

    /// `POST /books`; the response body is ignored
    async fn create_book(&self, book: &NewBook) -> Result<(), ApiError>;

    /// `DELETE /books/{id}`
    async fn delete_book(&self, id: &BookId) -> Result<(), ApiError>;

    /// `{base}/books/download/{id}?fileType={file_type}`, meant to be opened in a browser
    /// rather than fetched by the client.
    fn download_url(&self, id: &BookId, file_type: FileType) -> Result<Url, ApiError> {
        let mut url = endpoint(self.base_url(), &["books", "download", id.as_str()])?;
        url.query_pairs_mut()
            .append_pair("fileType", file_type.as_str());
        Ok(url)
    }
}

/// Append path segments to `base`, percent-encoding each one.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.set_query(None);
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidBaseUri(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub struct RestBooksApi {
    base_url: Url,
    http: reqwest::Client,
}

impl RestBooksApi {
    pub fn new(base_url: Url, http: reqwest::Client) -> Result<Self, ApiError> {
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUri(base_url.to_string()));
        }
        Ok(Self { base_url, http })
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let base_url = config.api_base_url()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        log::info!("Using books API at {}", base_url);
        Ok(Self::new(base_url, http)?)
    }

    fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            Err(ApiError::Status {
                status,
                url: resp.url().to_string(),
            })
        }
    }
}

#[async_trait]
impl BooksApi for RestBooksApi {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn list_books(&self) -> Result<Vec<Book>, ApiError> {
        let url = endpoint(&self.base_url, &["books"])?;
        log::info!("Fetching books from {}", url);

        let resp = Self::check(self.http.get(url).send().await?)?;
        let body = resp.text().await?;
        let books: Vec<Book> =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;

        log::info!("Fetched {} books", books.len());
        Ok(books)
    }

    async fn create_book(&self, book: &NewBook) -> Result<(), ApiError> {
        let url = endpoint(&self.base_url, &["books"])?;
        log::info!("Creating book '{}'", book.title);

        Self::check(self.http.post(url).json(book).send().await?)?;
        Ok(())
    }

    async fn delete_book(&self, id: &BookId) -> Result<(), ApiError> {
        let url = endpoint(&self.base_url, &["books", id.as_str()])?;
        log::info!("Deleting book {}", id);

        Self::check(self.http.delete(url).send().await?)?;
        Ok(())
    }
}
