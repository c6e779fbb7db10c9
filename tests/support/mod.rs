// Shared primitives for one-time server bootstrapping across integration
// tests, plus small WebSocket client helpers.

use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// Global base URL used by all tests after the server publishes its bound address.
static SERVER_URL: OnceLock<String> = OnceLock::new();
// One-time guard that ensures the server bootstrap path runs only once.
static SERVER_READY: OnceLock<()> = OnceLock::new();

// Ensure the test server is running and return the shared base URL.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_url = Arc::new(OnceLock::<String>::new());
        let published_url_thread = Arc::clone(&published_url);
        // An OS thread so the server outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Ephemeral port to avoid collisions with local services.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("http://{}", addr));
                arena_server::run(listener).await.expect("server failed");
            });
        });
        wait_for_server_url_and_readiness(published_url);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

fn wait_for_server_url_and_readiness(published_url: Arc<OnceLock<String>>) {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let _ = SERVER_URL.set(base_url.clone());

    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");

    // Retry briefly to avoid racing server bind/accept.
    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}

/// Opens a game socket; `query` is appended verbatim (e.g. "?playerKey=k").
#[allow(dead_code)]
pub async fn ws_connect(base_url: &str, query: &str) -> WsStream {
    let ws_url = format!("{}/ws{}", base_url.replacen("http", "ws", 1), query);
    let (stream, _response) = connect_async(ws_url).await.expect("websocket connect");
    stream
}

#[allow(dead_code)]
pub async fn send_event(ws: &mut WsStream, event: serde_json::Value) {
    ws.send(Message::Text(event.to_string()))
        .await
        .expect("websocket send");
}

/// Reads frames until an event with the given name arrives. Other events are
/// skipped; five seconds without a match fails the test.
#[allow(dead_code)]
pub async fn next_event(ws: &mut WsStream, name: &str) -> serde_json::Value {
    let deadline = Duration::from_secs(5);
    loop {
        let frame = tokio::time::timeout(deadline, ws.next())
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {name}"))
            .unwrap_or_else(|| panic!("stream ended waiting for {name}"))
            .expect("websocket error");
        if let Message::Text(text) = frame {
            let value: serde_json::Value = serde_json::from_str(&text).expect("valid event json");
            if value["event"] == name {
                return value;
            }
        }
    }
}
