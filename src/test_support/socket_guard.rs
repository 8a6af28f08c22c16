//! Localhost socket helpers for unit tests that talk to a local server.

use wiremock::MockServer;

/// Starts a wiremock server, or returns `None` when localhost cannot be bound.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    match std::net::TcpListener::bind("127.0.0.1:0") {
        Ok(_) => Some(MockServer::start().await),
        Err(e) => {
            eprintln!("[socket-bound-test] cannot bind localhost socket ({e}); skipping test");
            None
        }
    }
}

/// Binds a raw listener for hand-written HTTP responses, or `None` when
/// localhost cannot be bound.
pub async fn bind_local_listener_or_skip() -> Option<tokio::net::TcpListener> {
    match tokio::net::TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => Some(listener),
        Err(e) => {
            eprintln!("[socket-bound-test] cannot bind localhost socket ({e}); skipping test");
            None
        }
    }
}
