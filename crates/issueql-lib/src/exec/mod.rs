//! Query execution: paginated fetching, aggregation, run lifecycle.
//!
//! The search backend is abstracted behind [`SearchClient`] so the whole
//! pipeline runs against an in-memory fake in tests. A compiled query unit
//! may hold several sub-queries (one per query line); each is fetched page
//! by page up to a cap, then the batches are merged and deduplicated by
//! [`aggregate`].

mod aggregate;
mod cancel;
mod runner;

#[cfg(test)]
mod runner_tests;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::compile::{CompiledQuery, SortOrder};

pub use aggregate::{Aggregated, SubQueryBatch, aggregate, status_line};
pub use cancel::CancelToken;
pub use runner::{CellRun, CellRunner, RunStatus, run_all};

/// Results fetched per page. The search API serves at most this many.
pub const PAGE_SIZE: u32 = 100;

/// Per-sub-query fetch cap. Results beyond this are reported as truncation,
/// never fetched.
pub const FETCH_CAP: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    Open,
    Closed,
}

/// One search result: an issue or pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Canonical URL, also the identity used for deduplication.
    pub url: String,
    /// `owner/name` slug of the repository the item lives in.
    pub repository: String,
    pub number: u64,
    pub title: String,
    pub state: ItemState,
    pub author: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub comments: u64,
    pub reactions: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_pull_request: bool,
}

impl Item {
    /// Total engagement, the `interactions` sort key.
    pub fn interactions(&self) -> u64 {
        self.comments + self.reactions
    }
}

/// One page request against the search API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest<'a> {
    pub q: &'a str,
    pub sort: Option<&'a str>,
    pub order: SortOrder,
    /// 1-based page index.
    pub page: u32,
    pub per_page: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    pub items: Vec<Item>,
    /// Server-side total match count, independent of pagination.
    pub total_count: u64,
}

/// Failure reported by the search backend.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct SearchError {
    message: String,
}

impl SearchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("search request failed: {0}")]
    Search(#[from] SearchError),
    #[error("run cancelled")]
    Cancelled,
}

/// Search backend abstraction. The production implementation talks to the
/// issue search HTTP API; tests substitute an in-memory fake.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(
        &self,
        request: SearchRequest<'_>,
        cancel: &CancelToken,
    ) -> Result<SearchPage, SearchError>;
}

/// Fetches one sub-query to completion: page after page until the result set
/// or the fetch cap is exhausted. Checks for cancellation between pages.
pub async fn fetch_sub_query(
    client: &dyn SearchClient,
    compiled: &CompiledQuery,
    cancel: &CancelToken,
) -> Result<SubQueryBatch, ExecError> {
    let mut items = Vec::new();
    let mut total_count = 0u64;
    let mut page = 1u32;

    loop {
        let request = SearchRequest {
            q: &compiled.q,
            sort: compiled.sort.as_deref(),
            order: compiled.order,
            page,
            per_page: PAGE_SIZE,
        };

        let result = tokio::select! {
            _ = cancel.cancelled() => return Err(ExecError::Cancelled),
            result = client.search(request, cancel) => result?,
        };

        total_count = result.total_count;
        let fetched = result.items.len();
        items.extend(result.items);
        tracing::debug!(q = %compiled.q, page, fetched, total_count, "fetched page");

        let target = total_count.min(FETCH_CAP);
        if fetched == 0 || items.len() as u64 >= target {
            break;
        }
        page += 1;
    }

    Ok(SubQueryBatch {
        items,
        total_count,
        sort: compiled.sort.clone(),
        order: compiled.order,
    })
}

/// Fetches all sub-queries of one unit concurrently and aggregates the
/// batches. Fails fast: the first error or cancellation aborts the unit.
pub async fn execute_unit(
    client: &dyn SearchClient,
    queries: &[CompiledQuery],
    cancel: &CancelToken,
) -> Result<Aggregated, ExecError> {
    let batches = futures::future::try_join_all(
        queries
            .iter()
            .map(|compiled| fetch_sub_query(client, compiled, cancel)),
    )
    .await?;
    Ok(aggregate(batches))
}
