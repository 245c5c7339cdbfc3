use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

use fsc_sdk::{
    ChildEntry, DirectoryRef, Page, ShareEntry, ShareRef, StorageClient, StorageError,
    StorageResult,
};

fn to_storage_error(err: reqwest::Error) -> StorageError {
    if err.is_timeout() {
        StorageError::Timeout
    } else if err.is_decode() {
        StorageError::Serialization(err.to_string())
    } else {
        StorageError::Connection(err.to_string())
    }
}

/// HTTP client for a share-based storage endpoint.
#[derive(Debug)]
pub struct FscClient {
    client: Client,
    base_url: String,
}

impl FscClient {
    pub fn new(base_url: &str) -> StorageResult<Self> {
        Self::builder(base_url).build()
    }

    pub fn builder(base_url: &str) -> FscClientBuilder {
        FscClientBuilder::new(base_url)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn dir_query(dir: &DirectoryRef) -> [(&'static str, String); 2] {
        [
            ("share", dir.share().to_string()),
            ("path", dir.path().to_string()),
        ]
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> StorageResult<T> {
        if !resp.status().is_success() {
            return Err(self.extract_error(resp).await);
        }
        resp.json().await.map_err(to_storage_error)
    }

    async fn handle_empty_response(&self, resp: reqwest::Response) -> StorageResult<()> {
        if !resp.status().is_success() {
            return Err(self.extract_error(resp).await);
        }
        Ok(())
    }

    async fn extract_error(&self, resp: reqwest::Response) -> StorageError {
        let status = resp.status().as_u16();
        let message = match resp.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => "unknown error".to_string(),
        };
        tracing::debug!(status, %message, "request failed");
        match status {
            404 => StorageError::NotFound(message),
            400 => StorageError::InvalidArgument(message),
            409 => StorageError::DirectoryNotEmpty(message),
            504 => StorageError::Timeout,
            _ => StorageError::Request { status, message },
        }
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

#[async_trait]
impl StorageClient for FscClient {
    fn base_uri(&self) -> String {
        self.base_url.clone()
    }

    fn share_ref(&self, name: &str) -> ShareRef {
        ShareRef::new(name, format!("{}/{name}", self.base_url))
    }

    async fn share_exists(&self, share: &ShareRef) -> StorageResult<bool> {
        let resp = self
            .client
            .get(self.url(&format!("/api/v1/share/{}", share.name())))
            .send()
            .await
            .map_err(to_storage_error)?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            _ => Err(self.extract_error(resp).await),
        }
    }

    async fn list_shares(&self, token: Option<&str>) -> StorageResult<Page<ShareEntry>> {
        let mut req = self.client.get(self.url("/api/v1/shares"));
        if let Some(token) = token {
            req = req.query(&[("token", token)]);
        }
        let resp = req.send().await.map_err(to_storage_error)?;
        self.handle_response(resp).await
    }

    async fn directory_exists(&self, dir: &DirectoryRef) -> StorageResult<bool> {
        let resp = self
            .client
            .get(self.url("/api/v1/dir"))
            .query(&Self::dir_query(dir))
            .send()
            .await
            .map_err(to_storage_error)?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            _ => Err(self.extract_error(resp).await),
        }
    }

    async fn create_directory_if_not_exists(&self, dir: &DirectoryRef) -> StorageResult<()> {
        #[derive(Serialize)]
        struct CreateDirRequest<'a> {
            share: &'a str,
            path: &'a str,
        }

        let resp = self
            .client
            .put(self.url("/api/v1/dir"))
            .json(&CreateDirRequest {
                share: dir.share(),
                path: dir.path(),
            })
            .send()
            .await
            .map_err(to_storage_error)?;

        // 409 means the directory is already there, which is the point.
        if resp.status() == StatusCode::CONFLICT {
            return Ok(());
        }
        self.handle_empty_response(resp).await
    }

    async fn list_children(
        &self,
        dir: &DirectoryRef,
        token: Option<&str>,
    ) -> StorageResult<Page<ChildEntry>> {
        let mut req = self
            .client
            .get(self.url("/api/v1/list"))
            .query(&Self::dir_query(dir));
        if let Some(token) = token {
            req = req.query(&[("token", token)]);
        }
        let resp = req.send().await.map_err(to_storage_error)?;
        self.handle_response(resp).await
    }

    async fn upload_file(
        &self,
        dir: &DirectoryRef,
        name: &str,
        local: &Path,
    ) -> StorageResult<()> {
        let file = tokio::fs::File::open(local)
            .await
            .map_err(|e| StorageError::internal(format!("open {}: {e}", local.display())))?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let mut query = Self::dir_query(dir).to_vec();
        query.push(("name", name.to_string()));

        let resp = self
            .client
            .put(self.url("/api/v1/upload"))
            .query(&query)
            .body(body)
            .send()
            .await
            .map_err(to_storage_error)?;

        self.handle_empty_response(resp).await?;
        tracing::debug!(share = dir.share(), path = dir.path(), name, "uploaded file");
        Ok(())
    }

    async fn delete_file_if_exists(&self, dir: &DirectoryRef, name: &str) -> StorageResult<bool> {
        let mut query = Self::dir_query(dir).to_vec();
        query.push(("name", name.to_string()));

        let resp = self
            .client
            .delete(self.url("/api/v1/file"))
            .query(&query)
            .send()
            .await
            .map_err(to_storage_error)?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            _ => Err(self.extract_error(resp).await),
        }
    }

    async fn delete_directory(&self, dir: &DirectoryRef) -> StorageResult<()> {
        let resp = self
            .client
            .delete(self.url("/api/v1/dir"))
            .query(&Self::dir_query(dir))
            .send()
            .await
            .map_err(to_storage_error)?;

        self.handle_empty_response(resp).await
    }
}

pub struct FscClientBuilder {
    base_url: String,
    timeout: Duration,
    shared_key: Option<(String, String)>,
    sas_token: Option<String>,
}

impl FscClientBuilder {
    fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
            shared_key: None,
            sas_token: None,
        }
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn shared_key(mut self, account: impl Into<String>, key: impl Into<String>) -> Self {
        self.shared_key = Some((account.into(), key.into()));
        self
    }

    #[must_use]
    pub fn sas_token(mut self, token: impl Into<String>) -> Self {
        self.sas_token = Some(token.into());
        self
    }

    pub fn build(self) -> StorageResult<FscClient> {
        let mut headers = reqwest::header::HeaderMap::new();

        match (&self.shared_key, &self.sas_token) {
            (Some(_), Some(_)) => {
                return Err(StorageError::invalid_argument(
                    "use either a shared key or a SAS token, not both",
                ));
            }
            (Some((account, key)), None) => {
                headers.insert(
                    reqwest::header::AUTHORIZATION,
                    format!("SharedKey {account}:{key}")
                        .parse()
                        .map_err(|_| StorageError::invalid_argument("invalid account key"))?,
                );
            }
            (None, Some(token)) => {
                headers.insert(
                    "x-fsc-sas",
                    token
                        .parse()
                        .map_err(|_| StorageError::invalid_argument("invalid SAS token"))?,
                );
            }
            (None, None) => {}
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(FscClient {
            client,
            base_url: self.base_url,
        })
    }
}
