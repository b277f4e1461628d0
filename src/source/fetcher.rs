use crate::model::SourceError;
use crate::source::traits::CatalogSource;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// Catalog stored on the local filesystem.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl CatalogSource for FileSource {
    async fn load(&self) -> Result<String, SourceError> {
        debug!("Reading catalog file {}", self.path.display());
        let text = tokio::fs::read_to_string(&self.path).await?;
        Ok(text)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Catalog served over HTTP(S).
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(concat!("autoinput-resolver/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl CatalogSource for HttpSource {
    async fn load(&self) -> Result<String, SourceError> {
        debug!("Downloading catalog from {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Catalog server responded [{}] for {}", status, self.url);
            return Err(SourceError::InvalidResponse(status.as_u16()));
        }

        Ok(response.text().await?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned HTTP response and returns the base URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{}", addr)
    }

    fn local_source(url: String) -> HttpSource {
        // keep test traffic away from any proxy set in the environment
        let client = Client::builder().no_proxy().build().unwrap();
        HttpSource::with_client(client, url)
    }

    #[tokio::test]
    async fn file_source_reads_text() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[Xbox 360 Controller]\nplugged = True\n").unwrap();

        let source = FileSource::new(file.path());
        let text = source.load().await.unwrap();
        assert!(text.starts_with("[Xbox 360 Controller]"));
        assert_eq!(source.describe(), file.path().display().to_string());
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let source = FileSource::new("/nonexistent/InputAutoCfg.ini");
        assert!(matches!(source.load().await, Err(SourceError::Io(_))));
    }

    #[tokio::test]
    async fn http_source_downloads_body() {
        let base = serve_once("200 OK", "[Pad]\nplugged = True\n").await;
        let source = local_source(format!("{base}/InputAutoCfg.ini"));
        assert_eq!(source.load().await.unwrap(), "[Pad]\nplugged = True\n");
        assert!(source.describe().ends_with("/InputAutoCfg.ini"));
    }

    #[tokio::test]
    async fn http_error_status_is_rejected() {
        let base = serve_once("404 Not Found", "missing").await;
        let source = local_source(format!("{base}/InputAutoCfg.ini"));
        assert!(matches!(source.load().await, Err(SourceError::InvalidResponse(404))));
    }
}
