//! In-process stand-in for the traffic backend.
//!
//! Cookie-based sessions like the real service: `POST /user/login` sets
//! `sid`, every other endpoint answers 401 without it, once `expired` is
//! flipped, or when its path was passed to [`Backend::expire_endpoint`].

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use trafficdesk_client::store::InMemorySessionStore;
use trafficdesk_client::{App, ClientConfig, config};

pub const PASSWORD: &str = "secret";
pub const ADMIN_BADGE: &str = "1001";
pub const OFFICER_BADGE: &str = "2002";
const SESSION_COOKIE: &str = "sid=valid";

#[derive(Default)]
pub struct Backend {
    /// When set, every protected endpoint answers 401.
    pub expired: AtomicBool,
    /// Paths that answer 401 while everything else keeps working.
    pub expired_paths: Mutex<HashSet<String>>,
    /// When set, writes fail with 500.
    pub fail_writes: AtomicBool,
    pub logouts: AtomicUsize,
    pub request_ids: Mutex<Vec<String>>,
    pub content_types: Mutex<Vec<String>>,
    pub users: Mutex<Vec<Value>>,
    pub rules: Mutex<Vec<Value>>,
    pub records: Mutex<Vec<Value>>,
    pub profile: Mutex<Value>,
    /// Fields of the last multipart upload; files appear as `name:len`.
    pub last_upload: Mutex<Option<HashMap<String, String>>>,
    next_id: AtomicUsize,
}

impl Backend {
    fn seeded() -> Self {
        let backend = Self::default();
        *backend.users.lock().unwrap() = vec![
            json!({"_id": "u1", "name": "Asha", "badgeNumber": 1001, "role": "admin", "mobile": "98", "address": "HQ"}),
            json!({"_id": "u2", "name": "Ravi", "badgeNumber": "2002", "role": "officer", "mobile": 97, "address": "Ward 4"}),
        ];
        *backend.rules.lock().unwrap() = vec![
            json!({"_id": "r1", "title": "Jaywalking", "fine": 200}),
            json!({"_id": "r2", "title": "Crossing on red", "fine": "750"}),
        ];
        *backend.records.lock().unwrap() = vec![json!({
            "_id": "rec1",
            "licenseNum": "L-100",
            "name": "Mina",
            "sex": "Female",
            "age": 34,
            "dob": "1990-02-01",
            "address": "Lakeside",
            "violationRecords": [{"title": "Jaywalking", "fine": 200}, {"title": "", "fine": ""}],
            "image": null
        })];
        *backend.profile.lock().unwrap() = json!({
            "name": "Asha", "badgeNumber": 1001, "mobile": "98", "address": "HQ", "role": "admin"
        });
        backend
    }

    /// Reject the session on `path` only.
    pub fn expire_endpoint(&self, path: &str) {
        self.expired_paths.lock().unwrap().insert(path.to_string());
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 100)
    }

    fn observe(&self, headers: &HeaderMap) {
        if let Some(id) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
            self.request_ids.lock().unwrap().push(id.to_string());
        }
        if let Some(ct) = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
            self.content_types.lock().unwrap().push(ct.to_string());
        }
    }

    /// Reject requests without a live session cookie.
    fn guard(&self, headers: &HeaderMap) -> Result<(), Response> {
        self.observe(headers);
        let has_cookie = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.split(';').any(|c| c.trim() == SESSION_COOKIE));

        if !has_cookie || self.expired.load(Ordering::SeqCst) {
            return Err(message(StatusCode::UNAUTHORIZED, "Unauthorized"));
        }
        Ok(())
    }

    fn write_guard(&self, headers: &HeaderMap) -> Result<(), Response> {
        self.guard(headers)?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StatusCode::INTERNAL_SERVER_ERROR.into_response());
        }
        Ok(())
    }
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

fn ack(text: &str) -> Response {
    message(StatusCode::OK, text)
}

type Shared = State<Arc<Backend>>;

async fn reject_expired_paths(State(b): Shared, request: Request, next: Next) -> Response {
    if b.expired_paths.lock().unwrap().contains(request.uri().path()) {
        return message(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    next.run(request).await
}

async fn login(State(b): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.observe(&headers);
    let role = match body["badgeNumber"].as_str().unwrap_or_default() {
        ADMIN_BADGE => "admin",
        OFFICER_BADGE => "officer",
        _ => return message(StatusCode::UNAUTHORIZED, "Unknown badge"),
    };
    if body["password"] != PASSWORD {
        return message(StatusCode::BAD_REQUEST, "Invalid credentials");
    }
    (
        [(header::SET_COOKIE, format!("{SESSION_COOKIE}; Path=/; HttpOnly"))],
        Json(json!({ "role": role, "message": "Login successful" })),
    )
        .into_response()
}

async fn logout(State(b): Shared, headers: HeaderMap) -> Response {
    b.observe(&headers);
    b.logouts.fetch_add(1, Ordering::SeqCst);
    (
        [(header::SET_COOKIE, "sid=; Path=/; Max-Age=0".to_string())],
        Json(json!({ "message": "Logged out" })),
    )
        .into_response()
}

async fn list_users(State(b): Shared, headers: HeaderMap) -> Response {
    if let Err(r) = b.guard(&headers) {
        return r;
    }
    Json(b.users.lock().unwrap().clone()).into_response()
}

async fn register(State(b): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = b.write_guard(&headers) {
        return r;
    }
    let mut users = b.users.lock().unwrap();
    if users
        .iter()
        .any(|u| u["badgeNumber"].to_string().trim_matches('"') == body["badgeNumber"].as_str().unwrap_or_default())
    {
        return message(StatusCode::CONFLICT, "Badge number already exists");
    }
    let mut user = body.clone();
    user["_id"] = json!(b.next_id("u"));
    user["role"] = json!("officer");
    if let Some(obj) = user.as_object_mut() {
        obj.remove("password");
    }
    users.push(user);
    (StatusCode::CREATED, Json(json!({ "message": "User registered" }))).into_response()
}

async fn change_password(State(b): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = b.write_guard(&headers) {
        return r;
    }
    if body["currentPassword"] != PASSWORD {
        return message(StatusCode::BAD_REQUEST, "Current password is incorrect");
    }
    ack("Password changed")
}

async fn list_rules(State(b): Shared, headers: HeaderMap) -> Response {
    if let Err(r) = b.guard(&headers) {
        return r;
    }
    Json(b.rules.lock().unwrap().clone()).into_response()
}

async fn create_rule(State(b): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = b.write_guard(&headers) {
        return r;
    }
    let mut rule = body;
    rule["_id"] = json!(b.next_id("r"));
    b.rules.lock().unwrap().push(rule.clone());
    (StatusCode::CREATED, Json(rule)).into_response()
}

async fn update_rule(
    State(b): Shared,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = b.write_guard(&headers) {
        return r;
    }
    let mut rules = b.rules.lock().unwrap();
    match rules.iter_mut().find(|r| r["_id"] == id) {
        Some(rule) => {
            rule["title"] = body["title"].clone();
            rule["fine"] = body["fine"].clone();
            Json(rule.clone()).into_response()
        }
        None => message(StatusCode::NOT_FOUND, "Rule not found"),
    }
}

async fn delete_rule(State(b): Shared, Path(id): Path<String>, headers: HeaderMap) -> Response {
    if let Err(r) = b.write_guard(&headers) {
        return r;
    }
    b.rules.lock().unwrap().retain(|r| r["_id"] != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn list_records(State(b): Shared, headers: HeaderMap) -> Response {
    if let Err(r) = b.guard(&headers) {
        return r;
    }
    Json(b.records.lock().unwrap().clone()).into_response()
}

async fn create_record(State(b): Shared, headers: HeaderMap, mut multipart: Multipart) -> Response {
    if let Err(r) = b.write_guard(&headers) {
        return r;
    }

    let mut fields = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let len = field.bytes().await.map(|b| b.len()).unwrap_or_default();
                fields.insert(name, format!("{file_name}:{len}"));
            }
            None => {
                fields.insert(name, field.text().await.unwrap_or_default());
            }
        }
    }

    let violations: Value = fields
        .get("violationRecords")
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_else(|| json!([]));
    let record = json!({
        "_id": b.next_id("rec"),
        "licenseNum": fields.get("licenseNum"),
        "name": fields.get("name"),
        "sex": fields.get("sex"),
        "age": fields.get("age"),
        "dob": fields.get("dob"),
        "address": fields.get("address"),
        "violationRecords": violations,
        "image": fields.get("image").map(|f| format!("/uploads/{f}")),
    });
    b.records.lock().unwrap().push(record.clone());
    *b.last_upload.lock().unwrap() = Some(fields);
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn update_record(
    State(b): Shared,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = b.write_guard(&headers) {
        return r;
    }
    let mut records = b.records.lock().unwrap();
    let Some(record) = records.iter_mut().find(|r| r["_id"] == id) else {
        return message(StatusCode::NOT_FOUND, "Record not found");
    };
    if let (Some(target), Some(patch)) = (record.as_object_mut(), body.as_object()) {
        for (k, v) in patch {
            target.insert(k.clone(), v.clone());
        }
    }
    Json(record.clone()).into_response()
}

async fn delete_record(State(b): Shared, Path(id): Path<String>, headers: HeaderMap) -> Response {
    if let Err(r) = b.write_guard(&headers) {
        return r;
    }
    b.records.lock().unwrap().retain(|r| r["_id"] != id);
    ack("Record deleted")
}

async fn search_record(
    State(b): Shared,
    Path(license): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(r) = b.guard(&headers) {
        return r;
    }
    let found = b
        .records
        .lock()
        .unwrap()
        .iter()
        .find(|r| r["licenseNum"] == license)
        .cloned();
    Json(found.unwrap_or(Value::Null)).into_response()
}

async fn get_profile(State(b): Shared, headers: HeaderMap) -> Response {
    if let Err(r) = b.guard(&headers) {
        return r;
    }
    Json(b.profile.lock().unwrap().clone()).into_response()
}

async fn update_profile(State(b): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = b.write_guard(&headers) {
        return r;
    }
    let mut profile = b.profile.lock().unwrap();
    for key in ["name", "mobile", "address"] {
        profile[key] = body[key].clone();
    }
    Json(profile.clone()).into_response()
}

fn router(backend: Arc<Backend>) -> Router {
    Router::new()
        .route("/user/login", post(login))
        .route("/user/logout", post(logout))
        .route("/user/profile", get(get_profile).put(update_profile))
        .route("/user/profile/password", put(change_password))
        .route("/api/admin/register", post(register))
        .route("/api/admin/getAllUser", get(list_users))
        .route("/api/admin/allrules", get(list_rules))
        .route("/api/admin/rules", post(create_rule))
        .route("/api/admin/rules/:id", put(update_rule).delete(delete_rule))
        .route("/pedrecord", post(create_record))
        .route("/pedrecord/getAllPedRecord", get(list_records))
        .route("/pedrecord/:id", axum::routing::patch(update_record).delete(delete_record))
        .route("/searchRecords/search/:license", get(search_record))
        .layer(middleware::from_fn_with_state(backend.clone(), reject_expired_paths))
        .with_state(backend)
}

pub struct TestServer {
    pub base_url: String,
    pub backend: Arc<Backend>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let backend = Arc::new(Backend::seeded());
        let app = router(backend.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            backend,
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A fresh, empty directory under the system temp dir.
pub fn temp_data_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("trafficdesk-it-{}", uuid::Uuid::now_v7()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn config(base_url: &str, data_dir: PathBuf) -> ClientConfig {
    ClientConfig::from_lookup(|key| match key {
        config::API_URL_ENV => Some(base_url.to_string()),
        config::DATA_DIR_ENV => Some(data_dir.display().to_string()),
        _ => None,
    })
    .unwrap()
}

/// Client on an in-memory store, optionally pre-seeded with a role.
pub async fn memory_app(base_url: &str, store: InMemorySessionStore) -> App {
    App::with_store(config(base_url, temp_data_dir()), Arc::new(store))
        .await
        .unwrap()
}

/// Address on which nothing is listening.
pub async fn dead_address() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
