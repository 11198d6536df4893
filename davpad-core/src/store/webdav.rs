//! WebDAV implementation of [`RemoteStore`] on top of reqwest.
//!
//! Listing and stat use `PROPFIND`, reads use `GET`, writes use `PUT`.
//! Every request carries basic auth; the handle keeps the credentials in
//! memory for as long as the session lives.

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response, StatusCode};
use shared_types::{basename, normalize_path, Entry, EntryKind};
use std::sync::Arc;
use url::Url;

use super::{
    ensure_absolute, Credentials, FileContents, ReadMode, RemoteStore, SharedStore,
    StoreConnector,
};
use crate::error::{StoreError, StoreResult};

const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:">
  <d:prop>
    <d:displayname/>
    <d:resourcetype/>
    <d:getcontentlength/>
    <d:getlastmodified/>
    <d:getcontenttype/>
  </d:prop>
</d:propfind>"#;

pub struct WebDavStore {
    client: Client,
    base: Url,
    credentials: Credentials,
}

impl WebDavStore {
    pub fn new(base_url: &str, credentials: Credentials) -> StoreResult<Self> {
        Self::with_client(Client::new(), base_url, credentials)
    }

    pub fn with_client(
        client: Client,
        base_url: &str,
        credentials: Credentials,
    ) -> StoreResult<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| StoreError::InvalidPath(format!("invalid base URL {base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::InvalidPath(format!(
                "base URL cannot hold paths: {base_url}"
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client,
            base,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Absolute URL for a store path; directories get a trailing slash.
    fn url_for(&self, path: &str, directory: bool) -> StoreResult<Url> {
        let path = ensure_absolute(path)?;
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::InvalidPath(self.base.to_string()))?;
            segments.pop_if_empty();
            for segment in path.split('/').filter(|s| !s.is_empty()) {
                segments.push(segment);
            }
            if directory {
                segments.push("");
            }
        }
        Ok(url)
    }

    /// Map an href from a multistatus response back to a store path.
    fn store_path(&self, href: &str) -> Option<String> {
        let raw_path = if href.starts_with("http://") || href.starts_with("https://") {
            Url::parse(href).ok()?.path().to_string()
        } else {
            href.to_string()
        };
        let decoded = percent_decode_str(&raw_path).decode_utf8_lossy();
        let base_path = percent_decode_str(self.base.path()).decode_utf8_lossy();

        if let Some(rest) = decoded.strip_prefix(base_path.as_ref()) {
            return Some(normalize_path(rest));
        }
        // The collection itself may be reported without its trailing slash.
        if decoded.as_ref() == base_path.trim_end_matches('/') {
            return Some("/".to_string());
        }
        None
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
    }

    async fn propfind(&self, path: &str, depth: u8) -> StoreResult<Vec<Entry>> {
        let path = ensure_absolute(path)?;
        let url = self.url_for(&path, depth > 0 || path == "/")?;
        let method = Method::from_bytes(b"PROPFIND")
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        tracing::debug!(url = %url, depth, "PROPFIND");

        let response = self
            .request(method, url)
            .header("Depth", depth.to_string())
            .header(CONTENT_TYPE, "application/xml; charset=utf-8")
            .body(PROPFIND_BODY)
            .send()
            .await?;
        let body = check_status(response, &path)?.text().await?;

        let entries = parse_multistatus(&body)?
            .into_iter()
            .filter_map(|resource| {
                let store_path = self.store_path(&resource.href)?;
                Some(resource.into_entry(store_path))
            })
            .collect();
        Ok(entries)
    }
}

fn check_status(response: Response, path: &str) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized,
        StatusCode::NOT_FOUND => StoreError::NotFound(path.to_string()),
        StatusCode::CONFLICT => StoreError::Conflict(path.to_string()),
        other => StoreError::Http {
            status: other.as_u16(),
            path: path.to_string(),
        },
    })
}

#[async_trait(?Send)]
impl RemoteStore for WebDavStore {
    async fn stat(&self, path: &str) -> StoreResult<Entry> {
        let path = ensure_absolute(path)?;
        let mut entries = self.propfind(&path, 0).await?;
        match entries.iter().position(|entry| entry.path == path) {
            Some(idx) => Ok(entries.swap_remove(idx)),
            None => entries.into_iter().next().ok_or_else(|| {
                StoreError::InvalidResponse(format!("no properties returned for {path}"))
            }),
        }
    }

    async fn list_directory(&self, path: &str) -> StoreResult<Vec<Entry>> {
        let path = ensure_absolute(path)?;
        let entries = self
            .propfind(&path, 1)
            .await?
            .into_iter()
            .filter(|entry| entry.path != path)
            .collect::<Vec<_>>();
        tracing::debug!(path = %path, count = entries.len(), "Listed directory");
        Ok(entries)
    }

    async fn read_file(&self, path: &str, mode: ReadMode) -> StoreResult<FileContents> {
        let path = ensure_absolute(path)?;
        let url = self.url_for(&path, false)?;
        tracing::debug!(url = %url, ?mode, "GET");

        let response = check_status(self.request(Method::GET, url).send().await?, &path)?;
        Ok(match mode {
            ReadMode::Text => FileContents::Text(response.text().await?),
            ReadMode::Binary => FileContents::Binary(response.bytes().await?.to_vec()),
        })
    }

    async fn write_file(&self, path: &str, contents: &[u8]) -> StoreResult<()> {
        let path = ensure_absolute(path)?;
        let url = self.url_for(&path, false)?;
        tracing::debug!(url = %url, bytes = contents.len(), "PUT");

        let response = self
            .request(Method::PUT, url)
            .body(contents.to_vec())
            .send()
            .await?;
        check_status(response, &path)?;
        Ok(())
    }
}

/// Creates [`WebDavStore`] handles sharing one HTTP client.
#[derive(Debug, Clone, Default)]
pub struct WebDavConnector {
    client: Client,
}

impl WebDavConnector {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl StoreConnector for WebDavConnector {
    fn connect(&self, base_url: &str, credentials: Credentials) -> StoreResult<SharedStore> {
        let store = WebDavStore::with_client(self.client.clone(), base_url, credentials)?;
        Ok(Arc::new(store))
    }
}

// ============================================================================
// Multistatus parsing
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq)]
struct DavResource {
    href: String,
    is_collection: bool,
    content_length: Option<u64>,
    last_modified: Option<String>,
    content_type: Option<String>,
}

impl DavResource {
    fn into_entry(self, path: String) -> Entry {
        let kind = if self.is_collection {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        Entry {
            basename: basename(&path).to_string(),
            path,
            kind,
            size: match kind {
                EntryKind::File => Some(self.content_length.unwrap_or(0)),
                EntryKind::Directory => None,
            },
            last_modified: self.last_modified,
            content_type: self.content_type,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Href,
    ContentLength,
    LastModified,
    ContentType,
}

fn parse_multistatus(body: &str) -> StoreResult<Vec<DavResource>> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut resources = Vec::new();
    let mut current: Option<DavResource> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event()? {
            Event::Start(element) => match element.local_name().as_ref() {
                b"response" => current = Some(DavResource::default()),
                b"href" => field = Some(Field::Href),
                b"getcontentlength" => field = Some(Field::ContentLength),
                b"getlastmodified" => field = Some(Field::LastModified),
                b"getcontenttype" => field = Some(Field::ContentType),
                b"collection" => {
                    if let Some(resource) = current.as_mut() {
                        resource.is_collection = true;
                    }
                }
                _ => field = None,
            },
            Event::Empty(element) => {
                if element.local_name().as_ref() == b"collection" {
                    if let Some(resource) = current.as_mut() {
                        resource.is_collection = true;
                    }
                }
            }
            Event::Text(text) => {
                if let (Some(field), Some(resource)) = (field, current.as_mut()) {
                    let value = text.unescape()?.into_owned();
                    match field {
                        Field::Href => resource.href = value,
                        Field::ContentLength => resource.content_length = value.parse().ok(),
                        Field::LastModified => resource.last_modified = Some(value),
                        Field::ContentType => resource.content_type = Some(value),
                    }
                }
            }
            Event::End(element) => {
                field = None;
                if element.local_name().as_ref() == b"response" {
                    if let Some(resource) = current.take() {
                        if !resource.href.is_empty() {
                            resources.push(resource);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(resources)
}
