//! Integration tests for the seller dashboard.
//!
//! [`MockBackend`] is an in-process `axum` server speaking the marketplace
//! backend's seller/product API on an ephemeral port. Tests drive the real
//! dashboard client against it and inspect what reached the wire.
//!
//! # Routes
//!
//! ```text
//! POST   /auth/login      - Check credentials, set the `sid` cookie
//! POST   /auth/logout     - Drop the session
//! GET    /seller/{id}     - Seller record
//! POST   /seller          - Register (open)
//! PUT    /seller          - Update profile or password (session)
//! GET    /product/seller  - Products of the session's seller (session)
//! POST   /product         - Create (session)
//! PUT    /product         - Update (session)
//! DELETE /product/{id}    - Delete (session)
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path as UrlPath, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use seller_dashboard::{Dashboard, DashboardConfig, MemoryStore};

const SESSION_COOKIE: &str = "sid";

/// Knobs for making the backend misbehave.
#[derive(Debug, Clone, Default)]
pub struct Behavior {
    /// Every route answers 503.
    pub unavailable: bool,
    /// `GET /product/seller` answers 500.
    pub fail_product_list: bool,
    /// Product create/update/delete answer 500.
    pub fail_product_mutations: bool,
    /// `POST /auth/logout` answers 500.
    pub fail_logout: bool,
    /// `GET /seller/{id}` answers 401.
    pub reject_seller_lookup: bool,
    /// `GET /seller/{id}` returns the record without its `id`.
    pub omit_seller_id: bool,
    /// `POST /product` answers with an empty body.
    pub omit_created_product_id: bool,
    /// `POST /seller` answers 400 with this issue message.
    pub signup_issue: Option<String>,
    /// Every route sleeps this long before answering.
    pub delay: Option<Duration>,
}

/// A complete seller record for seeding, without id.
#[must_use]
pub fn seller_fixture(full_name: &str, email: &str) -> Value {
    json!({
        "full_name": full_name,
        "email": email,
        "phone": "11999990000",
        "street": "Rua das Flores",
        "number": "120",
        "neighborhood": "Centro",
        "city": "São Paulo",
        "state": "SP",
        "zip_code": "01000-000",
        "opening_hours": { "start": 8.0, "end": 18.0 }
    })
}

/// A request as it reached the backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Value,
}

#[derive(Debug, Default)]
struct Store {
    /// Seller records by id, without password.
    sellers: HashMap<String, Value>,
    passwords: HashMap<String, String>,
    /// `(seller id, product)` in insertion order.
    products: Vec<(String, Value)>,
    /// Session token -> seller id.
    sessions: HashMap<String, String>,
    next_id: u64,
    behavior: Behavior,
    requests: Vec<RecordedRequest>,
}

impl Store {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }
}

/// Shared backend state.
#[derive(Debug, Clone, Default)]
pub struct BackendState {
    store: Arc<Mutex<Store>>,
}

impl BackendState {
    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, method: Method, path: impl Into<String>, body: Value) {
        self.lock().requests.push(RecordedRequest {
            method,
            path: path.into(),
            body,
        });
    }

    /// Apply the configured delay, then fail if the backend is down.
    async fn gate(&self) -> Result<(), Response> {
        let delay = self.lock().behavior.delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.lock().behavior.unavailable {
            return Err(StatusCode::SERVICE_UNAVAILABLE.into_response());
        }
        Ok(())
    }

    /// Seller id bound to the request's session cookie.
    fn session_seller(&self, headers: &HeaderMap) -> Result<String, Response> {
        let token = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, value)| value.to_owned());

        token
            .and_then(|t| self.lock().sessions.get(&t).cloned())
            .ok_or_else(|| StatusCode::UNAUTHORIZED.into_response())
    }
}

/// In-process marketplace backend.
///
/// The server task is aborted when the value is dropped.
#[derive(Debug)]
pub struct MockBackend {
    addr: SocketAddr,
    state: BackendState,
    task: JoinHandle<()>,
}

impl MockBackend {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = BackendState::default();
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "mock backend stopped");
            }
        });

        Ok(Self { addr, state, task })
    }

    /// Root URL of the backend.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Dashboard configuration pointing at this backend.
    ///
    /// # Errors
    ///
    /// Never fails for a bound address; the `Result` mirrors
    /// [`DashboardConfig::new`].
    pub fn config(
        &self,
        state_dir: &Path,
    ) -> Result<DashboardConfig, seller_dashboard::ConfigError> {
        DashboardConfig::new(&self.base_url(), state_dir)
    }

    /// A dashboard with in-memory slots talking to this backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the dashboard cannot be built.
    pub fn dashboard(&self) -> Result<Dashboard, Box<dyn std::error::Error>> {
        let config = self.config(Path::new("unused"))?;
        Ok(Dashboard::with_storage(config, Arc::new(MemoryStore::new()))?)
    }

    /// Change how the backend behaves from now on.
    pub fn configure(&self, change: impl FnOnce(&mut Behavior)) {
        change(&mut self.state.lock().behavior);
    }

    /// Register a seller directly. Returns its id.
    pub fn seed_seller(&self, mut record: Value, password: &str) -> String {
        let mut store = self.state.lock();
        let id = store.next_id("s");
        record["id"] = json!(id);
        store.sellers.insert(id.clone(), record);
        store.passwords.insert(id.clone(), password.to_owned());
        id
    }

    /// Add a product for a seller directly. Returns its id.
    pub fn seed_product(&self, seller_id: &str, name: &str, price: f64) -> String {
        let mut store = self.state.lock();
        let id = store.next_id("p");
        let product = json!({ "id": id, "name": name, "price": price, "description": "" });
        store.products.push((seller_id.to_owned(), product));
        id
    }

    /// Stored record of a seller.
    #[must_use]
    pub fn seller(&self, id: &str) -> Option<Value> {
        self.state.lock().sellers.get(id).cloned()
    }

    /// Stored password of a seller.
    #[must_use]
    pub fn password_of(&self, id: &str) -> Option<String> {
        self.state.lock().passwords.get(id).cloned()
    }

    /// Stored products of a seller.
    #[must_use]
    pub fn products_of(&self, seller_id: &str) -> Vec<Value> {
        self.state
            .lock()
            .products
            .iter()
            .filter(|(owner, _)| owner == seller_id)
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.state.lock().sessions.len()
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    /// Requests received for one method and path.
    #[must_use]
    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| &r.method == method && r.path == path)
            .collect()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn router(state: BackendState) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/seller", post(create_seller).put(update_seller))
        .route("/seller/{id}", get(get_seller))
        .route("/product", post(create_product).put(update_product))
        .route("/product/seller", get(list_products))
        .route("/product/{id}", delete(delete_product))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Auth
// =============================================================================

async fn login(State(state): State<BackendState>, Json(body): Json<Value>) -> Response {
    state.record(Method::POST, "/auth/login", body.clone());
    if let Err(r) = state.gate().await {
        return r;
    }

    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let mut store = state.lock();
    let found = store
        .sellers
        .iter()
        .find(|(id, s)| {
            s["email"] == email && store.passwords.get(*id).is_some_and(|p| p == password)
        })
        .map(|(id, _)| id.clone());

    let Some(id) = found else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "invalid credentials" })),
        )
            .into_response();
    };

    let token = store.next_id("tok");
    store.sessions.insert(token.clone(), id.clone());

    let mut response = Json(json!({ "user": { "id": id } })).into_response();
    if let Ok(cookie) = HeaderValue::from_str(&format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly"))
    {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

async fn logout(State(state): State<BackendState>, headers: HeaderMap) -> Response {
    state.record(Method::POST, "/auth/logout", Value::Null);
    if let Err(r) = state.gate().await {
        return r;
    }
    if state.lock().behavior.fail_logout {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    if let Ok(seller) = state.session_seller(&headers) {
        state.lock().sessions.retain(|_, owner| *owner != seller);
    }
    Json(json!({})).into_response()
}

// =============================================================================
// Sellers
// =============================================================================

async fn get_seller(State(state): State<BackendState>, UrlPath(id): UrlPath<String>) -> Response {
    state.record(Method::GET, format!("/seller/{id}"), Value::Null);
    if let Err(r) = state.gate().await {
        return r;
    }

    let store = state.lock();
    if store.behavior.reject_seller_lookup {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let Some(mut record) = store.sellers.get(&id).cloned() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if store.behavior.omit_seller_id
        && let Some(fields) = record.as_object_mut()
    {
        fields.remove("id");
    }
    Json(record).into_response()
}

async fn create_seller(State(state): State<BackendState>, Json(body): Json<Value>) -> Response {
    state.record(Method::POST, "/seller", body.clone());
    if let Err(r) = state.gate().await {
        return r;
    }

    let mut store = state.lock();
    if let Some(message) = store.behavior.signup_issue.clone() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "issues": [{ "message": message, "path": ["email"] }] })),
        )
            .into_response();
    }

    let mut record = body;
    let password = record
        .as_object_mut()
        .and_then(|fields| fields.remove("password"))
        .and_then(|p| p.as_str().map(str::to_owned))
        .unwrap_or_default();

    let id = store.next_id("s");
    record["id"] = json!(id);
    store.sellers.insert(id.clone(), record.clone());
    store.passwords.insert(id, password);
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn update_seller(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(Method::PUT, "/seller", body.clone());
    if let Err(r) = state.gate().await {
        return r;
    }
    let seller = match state.session_seller(&headers) {
        Ok(seller) => seller,
        Err(r) => return r,
    };
    if body["id"] != seller.as_str() {
        return StatusCode::FORBIDDEN.into_response();
    }

    let mut store = state.lock();
    if let Some(password) = body["password"].as_str() {
        store.passwords.insert(seller.clone(), password.to_owned());
        return Json(json!({ "id": seller })).into_response();
    }

    // Fields absent from the body keep their stored value.
    let record = store.sellers.entry(seller).or_insert_with(|| json!({}));
    if let (Some(stored), Some(fields)) = (record.as_object_mut(), body.as_object()) {
        for (key, value) in fields {
            stored.insert(key.clone(), value.clone());
        }
    }
    Json(record.clone()).into_response()
}

// =============================================================================
// Products
// =============================================================================

async fn list_products(State(state): State<BackendState>, headers: HeaderMap) -> Response {
    state.record(Method::GET, "/product/seller", Value::Null);
    if let Err(r) = state.gate().await {
        return r;
    }
    let seller = match state.session_seller(&headers) {
        Ok(seller) => seller,
        Err(r) => return r,
    };

    let store = state.lock();
    if store.behavior.fail_product_list {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let products: Vec<Value> = store
        .products
        .iter()
        .filter(|(owner, _)| *owner == seller)
        .map(|(_, p)| p.clone())
        .collect();
    Json(products).into_response()
}

async fn create_product(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(Method::POST, "/product", body.clone());
    if let Err(r) = state.gate().await {
        return r;
    }
    let seller = match state.session_seller(&headers) {
        Ok(seller) => seller,
        Err(r) => return r,
    };

    let mut store = state.lock();
    if store.behavior.fail_product_mutations {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let id = store.next_id("p");
    let mut product = body;
    product["id"] = json!(id);
    store.products.push((seller, product));

    if store.behavior.omit_created_product_id {
        StatusCode::CREATED.into_response()
    } else {
        (StatusCode::CREATED, Json(json!({ "id": id }))).into_response()
    }
}

async fn update_product(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(Method::PUT, "/product", body.clone());
    if let Err(r) = state.gate().await {
        return r;
    }
    let seller = match state.session_seller(&headers) {
        Ok(seller) => seller,
        Err(r) => return r,
    };

    let mut store = state.lock();
    if store.behavior.fail_product_mutations {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let Some((_, product)) = store
        .products
        .iter_mut()
        .find(|(owner, p)| *owner == seller && p["id"] == body["id"])
    else {
        return StatusCode::NOT_FOUND.into_response();
    };
    *product = body;
    StatusCode::OK.into_response()
}

async fn delete_product(
    State(state): State<BackendState>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<String>,
) -> Response {
    state.record(Method::DELETE, format!("/product/{id}"), Value::Null);
    if let Err(r) = state.gate().await {
        return r;
    }
    let seller = match state.session_seller(&headers) {
        Ok(seller) => seller,
        Err(r) => return r,
    };

    let mut store = state.lock();
    if store.behavior.fail_product_mutations {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let before = store.products.len();
    store
        .products
        .retain(|(owner, p)| !(*owner == seller && p["id"] == id.as_str()));
    if store.products.len() == before {
        return StatusCode::NOT_FOUND.into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}
