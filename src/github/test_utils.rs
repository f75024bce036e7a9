//! Shared test transports for the `github` module and its callers.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;

use super::transport::{GraphqlTransport, QueryRequest};

/// Transport with a pre-programmed queue of responses.
///
/// Responses are returned in FIFO order regardless of the query. When the
/// queue is exhausted, further calls fail with "no more scripted responses".
pub(crate) struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Result<Value>>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTransport {
    pub(crate) fn new(responses: Vec<Result<Value>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a handle for reading the queries sent so far.
    pub(crate) fn query_handle(&self) -> QueryRecordHandle {
        QueryRecordHandle {
            queries: self.queries.clone(),
        }
    }
}

/// Shared handle to the queries a test transport received.
pub(crate) struct QueryRecordHandle {
    queries: Arc<Mutex<Vec<String>>>,
}

impl QueryRecordHandle {
    /// Returns every query text, in the order it was sent.
    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl GraphqlTransport for ScriptedTransport {
    fn execute<'a>(
        &'a self,
        request: &'a QueryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>> {
        Box::pin(async move {
            self.queries.lock().unwrap().push(request.query.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no more scripted responses")))
        })
    }
}

/// Transport answering by query content, after a per-route delay.
///
/// The first route whose needle occurs in the query wins. Delays let tests
/// make earlier requests finish later than their siblings.
pub(crate) struct RoutedTransport {
    routes: Vec<(String, Duration, Value)>,
    completed: Arc<Mutex<Vec<String>>>,
}

impl RoutedTransport {
    pub(crate) fn new() -> Self {
        Self {
            routes: Vec::new(),
            completed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answers queries containing `needle` with `data` after `delay_ms`.
    pub(crate) fn route(mut self, needle: &str, delay_ms: u64, data: Value) -> Self {
        self.routes
            .push((needle.to_string(), Duration::from_millis(delay_ms), data));
        self
    }

    /// Needles of the routes served so far, in completion order.
    pub(crate) fn completion_order(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

impl GraphqlTransport for RoutedTransport {
    fn execute<'a>(
        &'a self,
        request: &'a QueryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>> {
        Box::pin(async move {
            let (needle, delay, data) = self
                .routes
                .iter()
                .find(|(needle, _, _)| request.query.contains(needle.as_str()))
                .ok_or_else(|| anyhow::anyhow!("no route for query: {}", request.query))?;
            tokio::time::sleep(*delay).await;
            self.completed.lock().unwrap().push(needle.clone());
            Ok(data.clone())
        })
    }
}
