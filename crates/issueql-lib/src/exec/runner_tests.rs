use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;

use super::{
    CancelToken, CellRunner, ExecError, FETCH_CAP, Item, ItemState, PAGE_SIZE, RunStatus,
    SearchClient, SearchError, SearchPage, SearchRequest, execute_unit, fetch_sub_query, run_all,
};
use crate::compile::{CompiledQuery, SortOrder};

fn item(url: &str, comments: u64) -> Item {
    let timestamp: DateTime<Utc> = "2023-01-01T00:00:00Z".parse().unwrap();
    Item {
        url: url.to_string(),
        repository: "octo/repo".to_string(),
        number: 1,
        title: url.to_string(),
        state: ItemState::Open,
        author: "octocat".to_string(),
        labels: Vec::new(),
        assignees: Vec::new(),
        comments,
        reactions: 0,
        created_at: timestamp,
        updated_at: timestamp,
        is_pull_request: false,
    }
}

fn items(prefix: &str, count: usize) -> Vec<Item> {
    (0..count).map(|i| item(&format!("{prefix}/{i}"), 0)).collect()
}

fn query(q: &str, sort: Option<&str>) -> CompiledQuery {
    CompiledQuery {
        q: q.to_string(),
        sort: sort.map(String::from),
        order: SortOrder::Desc,
    }
}

/// In-memory search backend: fixture items per query string, served in
/// `per_page` slices. Unknown query strings fail the request.
#[derive(Default)]
struct FakeClient {
    fixtures: HashMap<String, Vec<Item>>,
    /// Reported total; defaults to the fixture length.
    total_override: Option<u64>,
    /// When set, every request parks until cancelled.
    hang: bool,
    calls: AtomicUsize,
}

impl FakeClient {
    fn with(q: &str, items: Vec<Item>) -> Self {
        let mut client = Self::default();
        client.fixtures.insert(q.to_string(), items);
        client
    }

    fn add(mut self, q: &str, items: Vec<Item>) -> Self {
        self.fixtures.insert(q.to_string(), items);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchClient for FakeClient {
    async fn search(
        &self,
        request: SearchRequest<'_>,
        _cancel: &CancelToken,
    ) -> Result<SearchPage, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            // Parks forever; only the caller's cancellation can end it.
            std::future::pending::<()>().await;
        }
        let all = self
            .fixtures
            .get(request.q)
            .ok_or_else(|| SearchError::new(format!("no results for `{}`", request.q)))?;
        let start = (request.page as usize - 1) * request.per_page as usize;
        let end = (start + request.per_page as usize).min(all.len());
        let page_items = if start >= all.len() {
            Vec::new()
        } else {
            all[start..end].to_vec()
        };
        Ok(SearchPage {
            items: page_items,
            total_count: self.total_override.unwrap_or(all.len() as u64),
        })
    }
}

#[tokio::test]
async fn fetches_every_page() {
    let client = FakeClient::with("is:open", items("a", 250));
    let batch = fetch_sub_query(&client, &query("is:open", None), &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(batch.items.len(), 250);
    assert_eq!(batch.total_count, 250);
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn single_short_page_needs_one_request() {
    let client = FakeClient::with("is:open", items("a", 7));
    let batch = fetch_sub_query(&client, &query("is:open", None), &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(batch.items.len(), 7);
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn stops_at_the_fetch_cap() {
    let mut client = FakeClient::with("popular", items("p", FETCH_CAP as usize));
    client.total_override = Some(FETCH_CAP + 500);

    let batch = fetch_sub_query(&client, &query("popular", None), &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(batch.items.len() as u64, FETCH_CAP);
    assert_eq!(batch.total_count, FETCH_CAP + 500);
    assert_eq!(client.calls() as u64, FETCH_CAP / PAGE_SIZE as u64);
}

#[tokio::test]
async fn empty_page_ends_the_loop() {
    // Server claims more results than it serves; the empty page breaks out.
    let mut client = FakeClient::with("flaky", items("f", 30));
    client.total_override = Some(500);

    let batch = fetch_sub_query(&client, &query("flaky", None), &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(batch.items.len(), 30);
    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn execute_unit_merges_and_dedupes() {
    let shared = item("both/1", 50);
    let client = FakeClient::with("first", vec![item("a", 30), shared.clone()])
        .add("second", vec![shared, item("b", 10)]);
    let queries = [
        query("first", Some("comments")),
        query("second", Some("comments")),
    ];

    let aggregated = execute_unit(&client, &queries, &CancelToken::new())
        .await
        .unwrap();
    let urls: Vec<&str> = aggregated.items.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(urls, ["both/1", "a", "b"]);
}

#[tokio::test]
async fn execute_unit_fails_fast() {
    let client = FakeClient::with("good", items("g", 1));
    let queries = [query("good", None), query("missing", None)];

    let error = execute_unit(&client, &queries, &CancelToken::new())
        .await
        .unwrap_err();
    assert!(matches!(error, ExecError::Search(_)));
}

#[tokio::test]
async fn pre_cancelled_token_aborts() {
    let client = FakeClient::with("is:open", items("a", 5));
    let cancel = CancelToken::new();
    cancel.cancel();

    let error = fetch_sub_query(&client, &query("is:open", None), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(error, ExecError::Cancelled));
}

#[tokio::test]
async fn successful_run_commits_results_and_status() {
    let client = FakeClient::with("is:open", items("a", 3));
    let runner = CellRunner::new();
    assert_eq!(runner.status(), RunStatus::Idle);

    let run = runner.run(&client, &[query("is:open", None)]).await.unwrap();
    assert_eq!(run.items.len(), 3);
    assert_eq!(run.summary, "3 results");
    assert_eq!(
        runner.status(),
        RunStatus::Done {
            count: 3,
            truncated: false
        }
    );
}

#[tokio::test]
async fn failed_run_records_the_error() {
    let client = FakeClient::default();
    let runner = CellRunner::new();

    let run = runner.run(&client, &[query("nothing", None)]).await;
    assert!(run.is_none());
    assert!(matches!(runner.status(), RunStatus::Failed(_)));
}

#[tokio::test]
async fn cancelled_run_restores_previous_status() {
    let fast = FakeClient::with("is:open", items("a", 3));
    let runner = Arc::new(CellRunner::new());
    runner.run(&fast, &[query("is:open", None)]).await.unwrap();
    let settled = runner.status();

    let hung = Arc::new(FakeClient {
        hang: true,
        ..FakeClient::default()
    });
    let handle = tokio::spawn({
        let runner = Arc::clone(&runner);
        let hung = Arc::clone(&hung);
        async move { runner.run(hung.as_ref(), &[query("slow", None)]).await }
    });

    while runner.status() != RunStatus::Running {
        tokio::task::yield_now().await;
    }
    runner.cancel();

    assert_eq!(handle.await.unwrap(), None);
    assert_eq!(runner.status(), settled);
}

#[tokio::test]
async fn newer_run_supersedes_the_older_one() {
    let runner = Arc::new(CellRunner::new());
    let hung = Arc::new(FakeClient {
        hang: true,
        ..FakeClient::default()
    });

    let old = tokio::spawn({
        let runner = Arc::clone(&runner);
        let hung = Arc::clone(&hung);
        async move { runner.run(hung.as_ref(), &[query("slow", None)]).await }
    });
    while runner.status() != RunStatus::Running {
        tokio::task::yield_now().await;
    }

    let fast = FakeClient::with("is:open", items("a", 2));
    let new = runner.run(&fast, &[query("is:open", None)]).await;
    assert!(new.is_some());

    // The superseded run never commits, and the newest result stands.
    assert_eq!(old.await.unwrap(), None);
    assert_eq!(
        runner.status(),
        RunStatus::Done {
            count: 2,
            truncated: false
        }
    );
}

#[tokio::test]
async fn run_all_executes_cells_in_order() {
    let client = FakeClient::with("first", items("a", 1)).add("second", items("b", 2));
    let first = CellRunner::new();
    let second = CellRunner::new();
    let first_queries = [query("first", None)];
    let second_queries = [query("second", None)];

    run_all(
        &client,
        [
            (&first, first_queries.as_slice()),
            (&second, second_queries.as_slice()),
        ],
        &CancelToken::new(),
    )
    .await;

    assert!(matches!(first.status(), RunStatus::Done { count: 1, .. }));
    assert!(matches!(second.status(), RunStatus::Done { count: 2, .. }));
}

#[tokio::test]
async fn run_all_stops_scheduling_once_cancelled() {
    let client = FakeClient::with("first", items("a", 1));
    let first = CellRunner::new();
    let second = CellRunner::new();
    let first_queries = [query("first", None)];
    let second_queries = [query("second", None)];

    let cancel = CancelToken::new();
    cancel.cancel();
    run_all(
        &client,
        [
            (&first, first_queries.as_slice()),
            (&second, second_queries.as_slice()),
        ],
        &cancel,
    )
    .await;

    assert_eq!(first.status(), RunStatus::Idle);
    assert_eq!(second.status(), RunStatus::Idle);
}
