use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use bracket_client::{BracketClient, CONNECT_FAILURE};
use bracket_proto::{GenerateBracketRequest, GenerateBracketResponse};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use url::Url;

type TestResult = Result<(), Box<dyn std::error::Error>>;

struct TestServer {
    base_url: String,
    _shutdown: oneshot::Sender<()>,
}

async fn serve(router: Router) -> Result<TestServer, Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
    });
    Ok(TestServer {
        base_url: format!("http://{addr}"),
        _shutdown: shutdown_tx,
    })
}

#[derive(Clone, Default)]
struct Recorded {
    calls: Arc<AtomicUsize>,
    last_ids: Arc<std::sync::Mutex<Vec<i64>>>,
}

fn generating_router(recorded: Recorded) -> Router {
    Router::new()
        .route(
            "/api/generate-bracket",
            post(
                |State(recorded): State<Recorded>, Json(body): Json<GenerateBracketRequest>| async move {
                    recorded.calls.fetch_add(1, Ordering::SeqCst);
                    *recorded.last_ids.lock().unwrap() = body.team_ids();
                    Json(GenerateBracketResponse::generated(
                        "/tournament_bracket.html",
                        Some("Team 5".into()),
                        Some("Bracket complete".into()),
                    ))
                },
            ),
        )
        .with_state(recorded)
}

#[tokio::test]
async fn success_yields_fresh_absolute_urls() -> TestResult {
    let recorded = Recorded::default();
    let server = serve(generating_router(recorded.clone())).await?;
    let client = BracketClient::new(&server.base_url)?;

    let first = client.request_bracket(&[5, 12]).await;
    let second = client.request_bracket(&[5, 12]).await;

    assert!(first.success, "{first:?}");
    assert!(second.success, "{second:?}");
    assert_eq!(first.champion.as_deref(), Some("Team 5"));
    assert_eq!(first.message.as_deref(), Some("Bracket complete"));
    let first_url = Url::parse(first.bracket_url.as_deref().ok_or("missing url")?)?;
    assert!(first_url.as_str().starts_with(&format!(
        "{}/tournament_bracket.html?t=",
        server.base_url
    )));
    assert_ne!(first.bracket_url, second.bracket_url);
    assert_eq!(*recorded.last_ids.lock().unwrap(), vec![5, 12]);
    assert_eq!(recorded.calls.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn server_error_message_is_passed_through() -> TestResult {
    let router = Router::new().route(
        "/api/generate-bracket",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(GenerateBracketResponse::failed(
                    "Failed to generate bracket: generator exited with exit code 1: boom",
                )),
            )
        }),
    );
    let server = serve(router).await?;
    let client = BracketClient::new(&server.base_url)?;

    let result = client.request_bracket(&[1]).await;

    assert!(!result.success);
    assert!(result.bracket_url.is_none());
    assert_eq!(
        result.error.as_deref(),
        Some("Failed to generate bracket: generator exited with exit code 1: boom")
    );
    Ok(())
}

#[tokio::test]
async fn non_json_response_is_a_transport_failure() -> TestResult {
    let router = Router::new().route(
        "/api/generate-bracket",
        post(|| async { "<html>proxy error</html>" }),
    );
    let server = serve(router).await?;
    let client = BracketClient::new(&server.base_url)?;

    let result = client.request_bracket(&[1]).await;

    assert!(!result.success);
    let error = result.error.ok_or("missing error")?;
    assert!(error.starts_with("http request failed"), "{error}");
    assert_ne!(error, CONNECT_FAILURE);
    Ok(())
}

#[tokio::test]
async fn unreachable_server_is_reported_not_thrown() -> TestResult {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    let client = BracketClient::new(&format!("http://{addr}"))?;

    let result = client.request_bracket(&[1, 2, 3]).await;

    assert!(!result.success);
    assert!(result.bracket_url.is_none());
    assert_eq!(result.error.as_deref(), Some(CONNECT_FAILURE));
    Ok(())
}
