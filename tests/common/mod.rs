//! Shared utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

use translite::adapter::{BackendFailure, TranslationAdapter};
use translite::language::Lang;
use translite::registry::{Backend, Registry};
use translite::resilience::timeouts::bounded;
use translite::resilience::BackoffPolicy;

/// A request received by a mock backend.
#[derive(Debug, Clone, Default)]
pub struct CapturedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Handle to a running mock HTTP backend.
pub struct MockBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockBackend {
    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{}", self.addr, path)).unwrap()
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` receives each parsed request and returns the status and body to send.
pub async fn start_programmable_backend<F, Fut>(f: F) -> MockBackend
where
    F: Fn(CapturedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let captured = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let captured = captured.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        captured.lock().unwrap().push(request.clone());

                        let (status, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            403 => "403 Forbidden",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockBackend { addr, requests }
}

/// Start a mock backend that always answers with `status` and `body`.
pub async fn start_mock_backend(status: u16, body: &'static str) -> MockBackend {
    start_programmable_backend(move |_| async move { (status, body.to_string()) }).await
}

async fn read_request(socket: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    Some(CapturedRequest {
        method,
        target,
        headers,
        body,
    })
}

/// What a [`ScriptedAdapter`] does on one call.
#[derive(Debug, Clone)]
pub enum Behavior {
    Reply(String),
    Fail(BackendFailure),
    /// Answer after a delay (tokio time, so paused clocks apply).
    Slow(Duration, String),
    /// Never answer; only the adapter's timeout ends the call.
    Hang,
}

/// In-process adapter with a scripted sequence of behaviors.
///
/// Once the script runs out, the fallback behavior repeats.
#[derive(Debug)]
pub struct ScriptedAdapter {
    script: Mutex<VecDeque<Behavior>>,
    fallback: Behavior,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    directions: Mutex<Vec<(Lang, Lang)>>,
}

impl ScriptedAdapter {
    pub fn always(behavior: Behavior) -> Arc<Self> {
        Self::script(Vec::new(), behavior)
    }

    pub fn script(steps: Vec<Behavior>, fallback: Behavior) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.into()),
            fallback,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            directions: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn directions(&self) -> Vec<(Lang, Lang)> {
        self.directions.lock().unwrap().clone()
    }

    fn next_behavior(&self) -> Behavior {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TranslationAdapter for ScriptedAdapter {
    fn protocol(&self) -> &'static str {
        "scripted"
    }

    async fn send(
        &self,
        _text: &str,
        source: Lang,
        target: Lang,
        timeout: Duration,
    ) -> Result<String, BackendFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.directions.lock().unwrap().push((source, target));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let behavior = self.next_behavior();
        bounded(timeout, async move {
            match behavior {
                Behavior::Reply(text) => Ok(text),
                Behavior::Fail(failure) => Err(failure),
                Behavior::Slow(delay, text) => {
                    tokio::time::sleep(delay).await;
                    Ok(text)
                }
                Behavior::Hang => std::future::pending().await,
            }
        })
        .await
    }
}

/// Backend named `id` driven by `adapter`.
pub fn scripted_backend(
    id: &str,
    priority: u32,
    timeout: Duration,
    adapter: &Arc<ScriptedAdapter>,
) -> Backend {
    Backend::new(
        id,
        Url::parse(&format!("http://{}.test/translate", id)).unwrap(),
        priority,
        timeout,
        adapter.clone(),
    )
}

/// Registry with the default 2s..300s cool-down curve.
pub fn registry(backends: Vec<Backend>, failure_threshold: u32) -> Arc<Registry> {
    Arc::new(
        Registry::new(
            backends,
            failure_threshold,
            BackoffPolicy::new(Duration::from_secs(2), Duration::from_secs(300)),
        )
        .unwrap(),
    )
}

pub fn network_error() -> Behavior {
    Behavior::Fail(BackendFailure::Network("connection refused".into()))
}
