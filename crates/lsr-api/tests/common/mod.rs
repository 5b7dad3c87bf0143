use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use lsr_api::{ReviewTracker, router, state::ApiState};
use lsr_db::MemoryStore;
use serde::Deserialize;
use serde_json::{Value, json};
use tower::ServiceExt;

/// The moment every test runs at, unless a test picks its own clock.
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 9, 30, 0).unwrap()
}

/// Two weeks after [`test_now`].
pub fn two_weeks_later() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 24, 9, 30, 0).unwrap()
}

/// Test state builder over the in-memory store
pub struct TestStateBuilder {
    store: MemoryStore,
    clock: fn() -> DateTime<Utc>,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            clock: test_now,
        }
    }

    /// Share an existing store, e.g. to look at it from another moment
    pub fn with_store(mut self, store: MemoryStore) -> Self {
        self.store = store;
        self
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> MemoryStore {
        self.store.clone()
    }

    pub fn build(self) -> ApiState {
        let tracker = ReviewTracker::new(self.store).with_clock(self.clock);
        ApiState::new(tracker)
    }

    /// Build the state and wrap the full router in a client
    pub fn client(self) -> TestClient {
        TestClient::new(router::router().with_state(self.build()))
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A solved event body as the extension sends it
pub fn solved_event(url: &str, title: &str, difficulty: &str) -> Value {
    json!({
        "url": url,
        "title": title,
        "difficulty": difficulty,
        "timeSpent": 600000,
        "submittedAt": test_now().timestamp_millis()
    })
}

/// Percent-encode a record key for use as a path segment
pub fn encode_key(key: &str) -> String {
    key.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}

/// Helper to make requests to the test app
#[derive(Clone)]
pub struct TestClient {
    router: Router,
}

impl TestClient {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Send a request and get the response
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        TestResponse {
            status,
            body: body_bytes.to_vec(),
            headers,
        }
    }

    async fn empty(&self, method: &str, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");

        self.request(request).await
    }

    async fn with_json<T: serde::Serialize>(
        &self,
        method: &str,
        uri: &str,
        body: &T,
    ) -> TestResponse {
        let json_body = serde_json::to_string(body).expect("Failed to serialize body");

        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json_body))
            .expect("Failed to build request");

        self.request(request).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.empty("GET", uri).await
    }

    /// Send a POST request with no body
    pub async fn post(&self, uri: &str) -> TestResponse {
        self.empty("POST", uri).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.empty("DELETE", uri).await
    }

    pub async fn post_json<T: serde::Serialize>(&self, uri: &str, body: &T) -> TestResponse {
        self.with_json("POST", uri, body).await
    }

    pub async fn put_json<T: serde::Serialize>(&self, uri: &str, body: &T) -> TestResponse {
        self.with_json("PUT", uri, body).await
    }
}

/// Test response wrapper
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub headers: axum::http::HeaderMap,
}

impl TestResponse {
    /// Get response body as string
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Response body is not valid UTF-8")
    }

    /// Parse response body as JSON
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Assert status code
    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
    }
}
