use axum_test::{TestResponse, TestServer};

use crate::{
    AppState, build_router, pagination::PaginationConfig, transaction::InMemoryTransactionStore,
};

/// Serve the app from `store`, reloading from `dataset_url`.
pub(crate) fn test_server_with(store: InMemoryTransactionStore, dataset_url: &str) -> TestServer {
    let state = AppState::new(
        store,
        PaginationConfig::default(),
        dataset_url,
        reqwest::Client::new(),
    );

    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}

#[track_caller]
pub(crate) fn assert_content_type(response: &TestResponse, content_type: &str) {
    let content_type_header = response
        .maybe_header("content-type")
        .expect("content-type header missing");
    assert_eq!(content_type_header, content_type);
}
