use axum_test::{TestResponse, TestServer};
use serde_json::Value;

use crate::{AppState, build_router};

/// Serve the full router over `state`.
pub(crate) fn build_test_server(state: AppState) -> TestServer {
    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}

/// Check that the JSON body of `response` has the expected `message`.
#[track_caller]
pub(crate) fn assert_message(response: &TestResponse, message: &str) {
    let body = response.json::<Value>();

    assert_eq!(body["message"], message, "unexpected body: {body}");
}
