//! # Mock Routes
//!
//! Utilities for testing dispatch in isolation.
//!
//! A [`MockHandler`] stands in for a real route implementation. Queue the
//! responses it should give with [`MockHandler::expect_call`], register a
//! clone in a [`RouteTable`](crate::framework::RouteTable), drive a call,
//! then inspect [`MockHandler::calls`] and finish with [`MockHandler::verify`].

use crate::framework::{ApiError, DispatchContext, Method, RouteArgs, RouteHandler};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// What the handler observed when it was invoked.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub path: String,
    pub method: Method,
    pub args: Vec<String>,
    pub data_keys: Vec<String>,
    pub depth: usize,
}

#[derive(Default)]
struct MockState {
    expectations: VecDeque<Result<Value, ApiError>>,
    calls: Vec<RecordedCall>,
}

/// A route handler with scripted responses.
///
/// # Example
/// ```ignore
/// let mock = MockHandler::new();
/// mock.expect_call().return_ok(json!({ "items": [] }));
///
/// let mut routes = RouteTable::new();
/// routes.register(Route::get("items", mock.clone())?);
/// // ... dispatch into the table ...
/// mock.verify();
/// ```
#[derive(Clone, Default)]
pub struct MockHandler {
    state: Arc<Mutex<MockState>>,
}

impl MockHandler {
    /// Creates a new mock handler with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects one more invocation.
    pub fn expect_call(&self) -> CallExpectationBuilder {
        CallExpectationBuilder {
            state: self.state.clone(),
        }
    }

    /// Every invocation seen so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let state = self.state.lock().unwrap();
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }
}

/// Builder for call expectations.
pub struct CallExpectationBuilder {
    state: Arc<Mutex<MockState>>,
}

impl CallExpectationBuilder {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: Value) {
        self.state.lock().unwrap().expectations.push_back(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: ApiError) {
        self.state.lock().unwrap().expectations.push_back(Err(error));
    }
}

#[async_trait]
impl<S: Send + Sync + 'static> RouteHandler<S> for MockHandler {
    async fn handle(
        &self,
        _service: &S,
        ctx: &DispatchContext<'_, S>,
        args: &RouteArgs,
    ) -> Result<Value, ApiError> {
        let expectation = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(RecordedCall {
                path: ctx.path().to_string(),
                method: ctx.method(),
                args: args.as_slice().to_vec(),
                data_keys: ctx.data().keys().map(str::to_string).collect(),
                depth: ctx.depth(),
            });
            state.expectations.pop_front()
        };
        match expectation {
            Some(response) => response,
            None => panic!("Unexpected call to mock handler at {}", ctx.path()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{route_call, RequestContext, Route, RouteTable};
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_handler_with_expectations() {
        let mock = MockHandler::new();
        mock.expect_call().return_ok(json!({ "ok": true }));
        mock.expect_call().return_err(ApiError::Handler("boom".into()));

        let mut table: RouteTable<()> = RouteTable::new();
        table.register(Route::any("things/(:num)", mock.clone()).unwrap());

        let request = RequestContext::new("things/7", Method::Post);
        let ctx = DispatchContext::root(&request, &table);

        let first = route_call(&(), &ctx).await.unwrap();
        assert_eq!(first, json!({ "ok": true }));

        let second = route_call(&(), &ctx).await;
        assert_eq!(second, Err(ApiError::Handler("boom".into())));

        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].args, vec!["7".to_string()]);
        assert_eq!(calls[0].method, Method::Post);

        mock.verify();
    }
}
