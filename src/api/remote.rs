//! Purpose: Provide an HTTP client for the swatchbook catalog API.
//! Exports: `RemoteCatalog`.
//! Role: Mirrors local catalog operations over the REST surface for `--remote` use.
//! Invariants: The base URL is scheme-checked and path-free; every response either
//! Invariants: decodes into the wire types or maps onto an `ErrorKind` by status.
#![allow(clippy::result_large_err)]

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::catalog::{Page, TagCount};
use crate::core::error::{Error, ErrorKind};
use crate::core::palette::{Palette, PaletteDraft};
use crate::core::query::ListParams;

type ApiResult<T> = Result<T, Error>;

#[derive(Clone)]
pub struct RemoteCatalog {
    inner: Arc<RemoteCatalogInner>,
}

struct RemoteCatalogInner {
    base_url: Url,
    agent: ureq::Agent,
}

#[derive(Serialize)]
struct CreateRequest<'a> {
    colors: &'a [String],
    tags: &'a [String],
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl RemoteCatalog {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        let agent = ureq::AgentBuilder::new().build();
        Ok(Self {
            inner: Arc::new(RemoteCatalogInner { base_url, agent }),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub fn list(&self, params: &ListParams) -> ApiResult<Page> {
        let mut url = build_url(&self.inner.base_url, &["api", "palettes"])?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(page) = &params.page {
                pairs.append_pair("page", page);
            }
            if let Some(limit) = &params.limit {
                pairs.append_pair("limit", limit);
            }
            if let Some(tags) = &params.tags {
                pairs.append_pair("tags", tags);
            }
            if let Some(search) = &params.search {
                pairs.append_pair("search", search);
            }
        }
        self.request_json::<(), _>("GET", &url, &())
    }

    pub fn distinct_tags(&self) -> ApiResult<Vec<String>> {
        let url = build_url(&self.inner.base_url, &["api", "tags"])?;
        self.request_json::<(), _>("GET", &url, &())
    }

    pub fn popular_tags(&self, limit: usize) -> ApiResult<Vec<TagCount>> {
        let mut url = build_url(&self.inner.base_url, &["api", "tags", "popular"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        self.request_json::<(), _>("GET", &url, &())
    }

    /// Validates locally before sending, so a bad draft fails fast with the
    /// same message the server would produce.
    pub fn create(&self, draft: &PaletteDraft) -> ApiResult<Palette> {
        let (colors, tags) = draft.validate()?;
        let colors: Vec<String> = colors.iter().map(|color| color.to_string()).collect();
        let tags: Vec<String> = tags.iter().map(str::to_string).collect();
        let payload = CreateRequest {
            colors: &colors,
            tags: &tags,
        };
        let url = build_url(&self.inner.base_url, &["api", "palettes"])?;
        self.request_json("POST", &url, &payload)
    }

    fn request_json<T, R>(&self, method: &str, url: &Url, body: &T) -> ApiResult<R>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let request = self
            .inner
            .agent
            .request(method, url.as_str())
            .set("Accept", "application/json");
        let response = if method == "GET" {
            request.call()
        } else {
            let payload = serde_json::to_string(body).map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message("failed to encode request json")
                    .with_source(err)
            })?;
            request
                .set("Content-Type", "application/json")
                .send_string(&payload)
        };

        match response {
            Ok(resp) => read_json_response(resp),
            Err(ureq::Error::Status(code, resp)) => Err(parse_error_response(code, resp)),
            Err(ureq::Error::Transport(err)) => Err(Error::new(ErrorKind::Io)
                .with_message("request failed")
                .with_source(err)),
        }
    }
}

fn normalize_base_url(raw: String) -> ApiResult<Url> {
    let mut url = Url::parse(&raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid remote base url")
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("remote base url must use http or https scheme"));
    }
    if url.path() != "/" && !url.path().is_empty() {
        return Err(
            Error::new(ErrorKind::Usage).with_message("remote base url must not include a path")
        );
    }
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn build_url(base_url: &Url, segments: &[&str]) -> ApiResult<Url> {
    let mut url = base_url.clone();
    {
        let mut path = url.path_segments_mut().map_err(|_| {
            Error::new(ErrorKind::Usage).with_message("remote base url cannot be a base")
        })?;
        path.clear();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

fn read_json_response<R>(response: ureq::Response) -> ApiResult<R>
where
    R: DeserializeOwned,
{
    let body = response.into_string().map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read response body")
            .with_source(err)
    })?;
    serde_json::from_str(&body).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("invalid response json")
            .with_source(err)
    })
}

fn parse_error_response(status: u16, response: ureq::Response) -> Error {
    let kind = error_kind_from_status(status);
    let body = response.into_string().unwrap_or_default();
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(&body) {
        return Error::new(kind).with_message(parsed.message);
    }
    Error::new(kind).with_message(format!("remote error status {status}"))
}

fn error_kind_from_status(status: u16) -> ErrorKind {
    match status {
        400 => ErrorKind::Validation,
        401 | 403 => ErrorKind::Permission,
        404 => ErrorKind::NotFound,
        413 => ErrorKind::Usage,
        500..=599 => ErrorKind::Internal,
        _ => ErrorKind::Io,
    }
}
