use url::Url;

#[derive(Debug, thiserror::Error)]
#[error("Failed to open {url}: {source}")]
pub struct OpenError {
    pub url: String,
    #[source]
    pub source: std::io::Error,
}

/// Opens a URL outside the app window. Downloads are handed to it instead of
/// being fetched by the client.
pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &Url) -> Result<(), OpenError>;
}

/// Hands URLs to the desktop's default browser
pub struct SystemBrowser;

impl LinkOpener for SystemBrowser {
    fn open(&self, url: &Url) -> Result<(), OpenError> {
        log::info!("Opening {} in the system browser", url);
        open::that(url.as_str()).map_err(|source| OpenError {
            url: url.to_string(),
            source,
        })
    }
}
