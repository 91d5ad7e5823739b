use axum::Router;
use taskdeck_db::Db;
use taskdeck_service::LocalService;
use tokio::net::TcpListener;

/// Build a test router over an in-memory SQLite store. The `Db` handle is
/// returned alongside so tests can seed rows the REST surface has no
/// mutation for (comments, attachments, assignment links).
pub fn test_router() -> (Router, Db) {
    let db = Db::open_in_memory().unwrap();
    let service = LocalService::new(db.clone());
    (crate::routes::build_router(service), db)
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    pub db: Db,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spawn an axum test server on a random port. Returns the TestServer
/// with the `base_url` (e.g. "http://127.0.0.1:12345").
pub async fn spawn_test_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let (app, db) = test_router();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        db,
        _handle: handle,
    }
}
