//! Common test utilities for in-process API testing.
//!
//! The fixture wires the real SQLite stores (in a temp directory) and a
//! canned roster sheet into the router, so requests go through the same
//! code path as the binary without binding a socket.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use scorer_core::{
    create_audit_system, AuditFilter, AuditStore, Config, DatabaseConfig, MatchStore,
    RosterSource, RosterStore, SheetError, SqliteAuditStore, SqliteMatchStore,
    SqliteRosterStore,
};

/// Roster source that serves fixed CSV text and records what was asked for.
#[derive(Default)]
pub struct StaticSheet {
    csv: Mutex<Option<String>>,
    requests: Mutex<Vec<(String, String)>>,
}

impl StaticSheet {
    pub fn set_csv(&self, csv: &str) {
        *self.csv.lock().unwrap() = Some(csv.to_string());
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RosterSource for StaticSheet {
    async fn fetch_csv(&self, sheet_url: &str, sheet_name: &str) -> Result<String, SheetError> {
        self.requests
            .lock()
            .unwrap()
            .push((sheet_url.to_string(), sheet_name.to_string()));
        self.csv.lock().unwrap().clone().ok_or(SheetError::Status(404))
    }
}

/// In-process server over temp-dir SQLite stores.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_create_player() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/players", json!({
///         "name": "Asha", "role": "Bowler"
///     })).await;
///
///     assert_eq!(response.status, StatusCode::CREATED);
/// }
/// ```
pub struct TestFixture {
    pub router: Router,
    pub audit_store: Arc<dyn AuditStore>,
    pub sheet: Arc<StaticSheet>,
    /// Keeps the database alive for the fixture's lifetime
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    pub async fn new() -> Self {
        Self::with_undo_depth(100).await
    }

    pub async fn with_undo_depth(undo_depth: usize) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let mut config = Config {
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            ..Default::default()
        };
        config.scoring.undo_depth = undo_depth;

        let audit_store: Arc<dyn AuditStore> = Arc::new(
            SqliteAuditStore::new(&db_path).expect("Failed to create audit store"),
        );
        let roster: Arc<dyn RosterStore> = Arc::new(
            SqliteRosterStore::new(&db_path).expect("Failed to create roster store"),
        );
        let matches: Arc<dyn MatchStore> = Arc::new(
            SqliteMatchStore::new(&db_path).expect("Failed to create match store"),
        );
        let sheet = Arc::new(StaticSheet::default());

        let (audit_handle, audit_writer) = create_audit_system(Arc::clone(&audit_store), 100);
        tokio::spawn(audit_writer.run());

        let state = Arc::new(scorer_server::state::AppState::new(
            config,
            audit_handle,
            Arc::clone(&audit_store),
            roster,
            matches,
            Arc::clone(&sheet) as Arc<dyn RosterSource>,
        ));
        let router = scorer_server::api::create_router(state);

        Self {
            router,
            audit_store,
            sheet,
            temp_dir,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// POST a raw body (CSV text, uploaded files, malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str, content_type: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// GET returning the body as text (for /metrics).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    /// Poll the audit store until `count` events of `event_type` are written.
    pub async fn wait_for_audit(&self, event_type: &str, count: i64) -> bool {
        let filter = AuditFilter::new().with_event_type(event_type);
        for _ in 0..50 {
            if self.audit_store.count(&filter).unwrap_or(0) >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }

    // ------------------------------------------------------------------------
    // Domain helpers
    // ------------------------------------------------------------------------

    /// Create `n` players and return their ids.
    pub async fn create_players(&self, prefix: &str, n: usize) -> Vec<String> {
        let mut ids = Vec::with_capacity(n);
        for i in 1..=n {
            let response = self
                .post(
                    "/api/v1/players",
                    json!({ "name": format!("{} {}", prefix, i), "role": "All-Rounder" }),
                )
                .await;
            assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
            ids.push(response.body["id"].as_str().unwrap().to_string());
        }
        ids
    }

    pub async fn create_team(&self, name: &str, player_ids: &[String]) -> String {
        let response = self
            .post(
                "/api/v1/teams",
                json!({ "name": name, "playerIds": player_ids }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["id"].as_str().unwrap().to_string()
    }

    /// Two teams of `n`, a match between them (first team bats) and its id.
    pub async fn setup_match(&self, overs: u32, n: usize) -> SetupMatch {
        let home = self.create_players("Lion", n).await;
        let away = self.create_players("Tiger", n).await;
        let home_team = self.create_team("Lions", &home).await;
        let away_team = self.create_team("Tigers", &away).await;

        let response = self
            .post(
                "/api/v1/matches",
                json!({
                    "teamAId": home_team,
                    "teamBId": away_team,
                    "teamAPlayers": home,
                    "teamBPlayers": away,
                    "overs": overs,
                    "playersPerTeam": n,
                    "tossWinnerTeamId": home_team,
                    "decision": "Bat",
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        SetupMatch {
            match_id: response.body["id"].as_str().unwrap().to_string(),
            home_team,
            away_team,
            home,
            away,
        }
    }
}

pub struct SetupMatch {
    pub match_id: String,
    pub home_team: String,
    pub away_team: String,
    pub home: Vec<String>,
    pub away: Vec<String>,
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
