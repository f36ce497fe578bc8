//! Bridging real `ApiClient` calls into a frame loop.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use api_core::{ApiClient, CallOptions, CallResult, HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use host_bridge::{Settle, SettleSet};
use serde_json::Value;

struct Immediate;

#[async_trait]
impl Transport for Immediate {
    async fn send(&self, request: HttpRequest) -> HttpResponse {
        HttpResponse::success(200, format!(r#"{{"url":"{}"}}"#, request.url))
    }
}

#[test]
fn call_on_in_memory_transport_settles_in_one_frame() {
    let client = ApiClient::from_shared(Arc::new(Immediate));
    let seen: Rc<RefCell<Option<CallResult<Value>>>> = Rc::new(RefCell::new(None));
    let sink = seen.clone();

    let call = async move { client.get::<Value>("http://api/frame", &CallOptions::anonymous()).await };
    let mut settle = Settle::new(call, move |result| *sink.borrow_mut() = Some(result));

    assert!(settle.tick());
    let result = seen.borrow_mut().take().unwrap();
    assert!(result.is_success());
    assert_eq!(result.data().unwrap()["url"], "http://api/frame");
}

#[test]
fn spawned_http_calls_settle_through_join_handles() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let base = runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(mock_server::run(listener));
        format!("http://{addr}")
    });

    let client = ApiClient::default();
    let results: Rc<RefCell<Vec<bool>>> = Rc::new(RefCell::new(Vec::new()));
    let mut frames = SettleSet::new();

    for path in ["/posts", "/posts/77"] {
        let client = client.clone();
        let url = format!("{base}{path}");
        let handle = runtime.spawn(async move {
            client.get::<Value>(&url, &CallOptions::anonymous()).await
        });
        let sink = results.clone();
        frames.push(handle, move |joined| {
            sink.borrow_mut().push(joined.map(|r| r.is_success()).unwrap_or(false));
        });
    }

    let deadline = Instant::now() + Duration::from_secs(10);
    while frames.tick() > 0 {
        assert!(Instant::now() < deadline, "calls did not settle");
        std::thread::sleep(Duration::from_millis(5));
    }

    let mut outcomes = results.borrow().clone();
    outcomes.sort();
    assert_eq!(outcomes, [false, true]);
}
