//! Offset-based pagination over `GET /recordings`
//!
//! The server caps every page at [`MAX_PAGE_SIZE`] records. [`list_recordings`]
//! keeps asking for the next offset until a short page arrives, or until the
//! offset reaches the reported total. The second condition guards against a
//! server that keeps returning full pages past its own total.
//!
//! The total is assumed to be stable across pages. A total that changes while
//! paging (concurrent writes on the server) is not reconciled.

use crate::error::{ExportError, ExportResult};
use crate::recording::{RecordingPage, RecordingSet};
use crate::session::ApiSession;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, instrument};

/// Server-side maximum number of records per listing request
pub const MAX_PAGE_SIZE: usize = 1000;

/// Sort direction of a listing query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query parameters of `GET /recordings`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordingQuery {
    pub offset: usize,
    pub sort: String,
    pub order: SortOrder,
    /// Lower time bound, epoch seconds
    #[serde(rename = "fromtime", skip_serializing_if = "Option::is_none")]
    pub from_time: Option<i64>,
    /// Upper time bound, epoch seconds
    #[serde(rename = "totime", skip_serializing_if = "Option::is_none")]
    pub to_time: Option<i64>,
}

impl Default for RecordingQuery {
    fn default() -> Self {
        Self {
            offset: 0,
            sort: "name".to_string(),
            order: SortOrder::Asc,
            from_time: None,
            to_time: None,
        }
    }
}

impl RecordingQuery {
    /// Restrict the query to `[from, to]` in epoch seconds
    pub fn between(mut self, from: i64, to: i64) -> Self {
        self.from_time = Some(from);
        self.to_time = Some(to);
        self
    }

    /// Copy of this query starting at `offset`
    pub fn at_offset(&self, offset: usize) -> Self {
        Self {
            offset,
            ..self.clone()
        }
    }
}

/// Unfiltered listing of every recording, sorted by name
pub fn query_all() -> RecordingQuery {
    RecordingQuery::default()
}

/// Anything that can serve one page of recordings
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordingSource: Send + Sync {
    /// Fetch the page described by `query` (its `offset` included)
    async fn fetch_page(&self, query: &RecordingQuery) -> ExportResult<RecordingPage>;
}

#[async_trait]
impl RecordingSource for ApiSession {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_page(&self, query: &RecordingQuery) -> ExportResult<RecordingPage> {
        let url = self.url("/recordings");

        let response = self
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ExportError::transport(&url, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ExportError::transport(&url, e))?;

        if !status.is_success() {
            return Err(ExportError::protocol(
                &url,
                Some(status.as_u16()),
                String::from_utf8_lossy(&body).trim().to_string(),
            ));
        }

        serde_json::from_slice(&body).map_err(|e| {
            ExportError::protocol(&url, Some(status.as_u16()), format!("malformed listing: {}", e))
        })
    }
}

/// Retrieve every recording matching `query`, page by page
///
/// The caller's `offset` is ignored; paging always starts at zero. Any page
/// failure aborts the whole listing and reports the offset it happened at.
pub async fn list_recordings<S>(source: &S, query: &RecordingQuery) -> ExportResult<RecordingSet>
where
    S: RecordingSource + ?Sized,
{
    info!(
        sort = %query.sort,
        from_time = ?query.from_time,
        to_time = ?query.to_time,
        "retrieving recordings"
    );

    let mut set = RecordingSet::new();
    let mut offset = 0;

    loop {
        let page = source
            .fetch_page(&query.at_offset(offset))
            .await
            .map_err(|e| e.at_offset(offset))?;

        let page_len = page.recordings.len();
        info!(offset, count = page_len, total = page.total, "retrieved page of recordings");
        set.extend_page(page);

        if page_len < MAX_PAGE_SIZE {
            break;
        }

        offset += MAX_PAGE_SIZE;

        if offset >= set.total {
            debug!(offset, total = set.total, "offset reached reported total, stopping");
            break;
        }
    }

    Ok(set)
}
