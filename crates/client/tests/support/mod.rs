//! In-process stand-in for the carpool REST API, bound to an ephemeral port.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path, Query, Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use carpool_client::{ApiClient, App, Confirm, Context, Notifier, Session, Severity};
use carpool_core::{Role, SessionIdentity, UserId};

pub struct TestServer {
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    /// Base address the client is configured with.
    pub fn api_url(&self) -> String {
        format!("{}/api", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Default)]
struct Db {
    next_id: i64,
    users: Vec<Value>,
    passwords: HashMap<String, String>,
    rides: Vec<Value>,
    bookings: Vec<Value>,
    requests: Vec<String>,
    failures: HashMap<String, (StatusCode, Value)>,
    delays: HashMap<String, Duration>,
}

impl Db {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, id: i64) -> Option<&Value> {
        self.users.iter().find(|u| u["id"] == id)
    }

    fn ride_mut(&mut self, id: i64) -> Option<&mut Value> {
        self.rides.iter_mut().find(|r| r["id"] == id)
    }

    fn booking_mut(&mut self, id: i64) -> Option<&mut Value> {
        self.bookings.iter_mut().find(|b| b["id"] == id)
    }

    /// Return a booking's seats to its ride.
    fn release_seats(&mut self, ride: i64, seats: i64) {
        if let Some(ride) = self.ride_mut(ride) {
            let available = ride["seats_available"].as_i64().unwrap_or(0);
            ride["seats_available"] = json!(available + seats);
        }
    }
}

/// Shared state of the fake API. Clones see the same data.
#[derive(Clone, Default)]
pub struct FakeApi {
    db: Arc<Mutex<Db>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Db> {
        self.db.lock().unwrap()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/users/signup/", post(signup))
            .route("/api/users/login/", post(login))
            .route("/api/users/", get(list_users))
            .route("/api/users/:id/", get(get_user))
            .route("/api/users/:id/delete/", delete(delete_user))
            .route("/api/rides/", get(list_rides))
            .route("/api/rides/create/", post(create_ride))
            .route("/api/rides/:id/", get(get_ride).patch(patch_ride))
            .route("/api/rides/:id/delete/", delete(delete_ride))
            .route("/api/bookings/", get(list_bookings).post(create_booking))
            .route("/api/bookings/:id/", get(get_booking).patch(patch_booking))
            .route("/api/bookings/:id/cancel/", patch(cancel_booking))
            .route("/api/summary/", get(summary))
            .layer(middleware::from_fn_with_state(self.clone(), record))
            .with_state(self.clone())
    }

    pub async fn serve(&self) -> TestServer {
        TestServer::spawn(self.router()).await
    }

    // ---- seeding ----

    pub fn user(&self, name: &str, email: &str, password: &str, role: Role) -> i64 {
        let mut db = self.lock();
        let id = db.id();
        db.users.push(json!({
            "id": id,
            "username": email,
            "email": email,
            "first_name": name,
            "role": role.as_str(),
            "phone_number": "9000000000",
        }));
        db.passwords.insert(email.to_string(), password.to_string());
        id
    }

    /// An open ride with no vehicle details, priced at 250.
    pub fn ride(&self, driver: i64, origin: &str, dest: &str, depart: &str, seats: i64) -> i64 {
        let mut db = self.lock();
        let id = db.id();
        let name = db
            .user(driver)
            .map(|u| u["first_name"].clone())
            .unwrap_or(json!(""));
        db.rides.push(json!({
            "id": id,
            "driver": {"id": driver, "name": name},
            "origin_name": origin,
            "dest_name": dest,
            "depart_time": depart,
            "total_seats": seats,
            "seats_available": seats,
            "price_per_seat": "250.00",
            "vehicle_company": null,
            "vehicle_model": null,
            "vehicle_safety_rating": "0.0",
            "status": "open",
            "preferences": "",
            "created_at": "2026-01-01T00:00:00Z",
        }));
        id
    }

    pub fn set_ride(&self, id: i64, key: &str, value: Value) {
        if let Some(ride) = self.lock().ride_mut(id) {
            ride[key] = value;
        }
    }

    pub fn booking(&self, ride: i64, passenger: i64, seats: i64, status: &str) -> i64 {
        let mut db = self.lock();
        let id = db.id();
        let booking = new_booking(&db, id, ride, passenger, seats, status);
        db.bookings.push(booking);
        id
    }

    pub fn set_booking(&self, id: i64, key: &str, value: Value) {
        if let Some(booking) = self.lock().booking_mut(id) {
            booking[key] = value;
        }
    }

    /// Rate a booking with the same score on every sub-rating.
    pub fn rate(&self, id: i64, score: i64, description: &str) {
        if let Some(b) = self.lock().booking_mut(id) {
            for key in [
                "legroom_rating",
                "cleanliness_rating",
                "driving_smoothness_rating",
                "temperature_comfort_rating",
            ] {
                b[key] = json!(score);
            }
            b["description"] = json!(description);
            b["status"] = json!("rated");
        }
    }

    /// Answer the next `METHOD path` request with `status` and `body`.
    pub fn fail_next(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.lock()
            .failures
            .insert(format!("{method} {path}"), (status, body));
    }

    /// Hold every `METHOD path` request for `delay` before answering.
    pub fn delay(&self, method: Method, path: &str, delay: Duration) {
        self.lock().delays.insert(format!("{method} {path}"), delay);
    }

    // ---- inspection ----

    /// `METHOD path[?query]` of every request received so far.
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    pub fn ride_json(&self, id: i64) -> Value {
        self.lock().ride_mut(id).cloned().unwrap_or(Value::Null)
    }

    pub fn booking_json(&self, id: i64) -> Value {
        self.lock().booking_mut(id).cloned().unwrap_or(Value::Null)
    }

    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    pub fn ride_count(&self) -> usize {
        self.lock().rides.len()
    }
}

fn new_booking(db: &Db, id: i64, ride: i64, passenger: i64, seats: i64, status: &str) -> Value {
    let passenger = db
        .user(passenger)
        .map(|u| {
            json!({
                "id": u["id"],
                "name": u["first_name"],
                "email": u["email"],
                "phone_number": u["phone_number"],
            })
        })
        .unwrap_or(json!({"id": passenger}));
    json!({
        "id": id,
        "ride": ride,
        "passenger": passenger,
        "seats_booked": seats,
        "payment_mode": "offline",
        "status": status,
        "legroom_rating": null,
        "cleanliness_rating": null,
        "driving_smoothness_rating": null,
        "temperature_comfort_rating": null,
        "description": "",
        "created_at": "2026-01-02T00:00:00Z",
    })
}

async fn record(State(api): State<FakeApi>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let line = match req.uri().query() {
        Some(q) => format!("{} {}?{}", req.method(), path, q),
        None => format!("{} {}", req.method(), path),
    };
    let key = format!("{} {}", req.method(), path);
    let (injected, delay) = {
        let mut db = api.lock();
        db.requests.push(line);
        (db.failures.remove(&key), db.delays.get(&key).copied())
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if let Some((status, body)) = injected {
        return (status, Json(body)).into_response();
    }
    next.run(req).await
}

fn error(status: StatusCode, key: &str, message: &str) -> Response {
    (status, Json(json!({ key: message }))).into_response()
}

fn not_found() -> Response {
    error(StatusCode::NOT_FOUND, "detail", "Not found.")
}

fn auth_body(user: &Value, message: &str) -> Value {
    json!({
        "message": message,
        "id": user["id"],
        "first_name": user["first_name"],
        "email": user["email"],
        "role": user["role"],
    })
}

async fn signup(State(api): State<FakeApi>, Json(body): Json<Value>) -> Response {
    let mut db = api.lock();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if db.users.iter().any(|u| u["email"] == email.as_str()) {
        return error(StatusCode::BAD_REQUEST, "error", "Email already exists");
    }
    let id = db.id();
    let user = json!({
        "id": id,
        "username": email,
        "email": email,
        "first_name": body["name"],
        "role": body["role"],
        "phone_number": body["phone_number"],
    });
    let password = body["password"].as_str().unwrap_or_default().to_string();
    db.passwords.insert(email, password);
    db.users.push(user.clone());
    (
        StatusCode::CREATED,
        Json(auth_body(&user, "User created successfully")),
    )
        .into_response()
}

async fn login(State(api): State<FakeApi>, Json(body): Json<Value>) -> Response {
    let db = api.lock();
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let matches = db.passwords.get(email).is_some_and(|p| p == password);
    match db.users.iter().find(|u| u["email"] == email) {
        Some(user) if matches => Json(auth_body(user, "Login successful")).into_response(),
        _ => error(StatusCode::UNAUTHORIZED, "error", "Invalid credentials"),
    }
}

async fn list_users(State(api): State<FakeApi>) -> Response {
    Json(api.lock().users.clone()).into_response()
}

async fn get_user(State(api): State<FakeApi>, Path(id): Path<i64>) -> Response {
    match api.lock().user(id) {
        Some(user) => Json(user.clone()).into_response(),
        None => not_found(),
    }
}

async fn delete_user(State(api): State<FakeApi>, Path(id): Path<i64>) -> Response {
    let mut db = api.lock();
    if db.user(id).is_none() {
        return not_found();
    }
    db.users.retain(|u| u["id"] != id);
    let driven: Vec<Value> = db
        .rides
        .iter()
        .filter(|r| r["driver"]["id"] == id)
        .map(|r| r["id"].clone())
        .collect();
    db.rides.retain(|r| r["driver"]["id"] != id);
    db.bookings
        .retain(|b| b["passenger"]["id"] != id && !driven.contains(&b["ride"]));
    StatusCode::NO_CONTENT.into_response()
}

fn contains_ci(haystack: &Value, needle: &str) -> bool {
    haystack
        .as_str()
        .unwrap_or_default()
        .to_lowercase()
        .contains(&needle.to_lowercase())
}

async fn list_rides(
    State(api): State<FakeApi>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let db = api.lock();
    let rides: Vec<Value> = db
        .rides
        .iter()
        .filter(|r| {
            q.get("driver_id")
                .is_none_or(|d| r["driver"]["id"].to_string() == *d)
        })
        .filter(|r| {
            q.get("status")
                .is_none_or(|s| s == "all" || r["status"] == s.as_str())
        })
        .filter(|r| q.get("origin").is_none_or(|o| contains_ci(&r["origin_name"], o)))
        .filter(|r| q.get("dest").is_none_or(|d| contains_ci(&r["dest_name"], d)))
        .cloned()
        .collect();
    Json(rides).into_response()
}

fn number(value: &Value) -> f64 {
    match value {
        Value::String(s) => s.parse().unwrap_or(0.0),
        other => other.as_f64().unwrap_or(0.0),
    }
}

async fn create_ride(State(api): State<FakeApi>, Json(body): Json<Value>) -> Response {
    let mut db = api.lock();
    let driver = body["driver_id"].as_i64().unwrap_or_default();
    let Some(name) = db.user(driver).map(|u| u["first_name"].clone()) else {
        return error(StatusCode::BAD_REQUEST, "error", "Driver not found");
    };

    let mut depart = body["depart_time"].as_str().unwrap_or_default().to_string();
    if depart.len() == 16 {
        depart.push_str(":00");
    }
    if !depart.ends_with('Z') {
        depart.push('Z');
    }

    let id = db.id();
    db.rides.push(json!({
        "id": id,
        "driver": {"id": driver, "name": name},
        "origin_name": body["origin_name"],
        "dest_name": body["dest_name"],
        "depart_time": depart,
        "total_seats": body["total_seats"],
        "seats_available": body["seats_available"],
        "price_per_seat": format!("{:.2}", number(&body["price_per_seat"])),
        "vehicle_company": body["vehicle_company"],
        "vehicle_model": body["vehicle_model"],
        "vehicle_safety_rating": format!("{:.1}", number(&body["vehicle_safety_rating"])),
        "status": "open",
        "preferences": body["preferences"],
        "created_at": "2026-01-01T00:00:00Z",
    }));
    (
        StatusCode::CREATED,
        Json(json!({"message": "Ride created successfully", "ride_id": id})),
    )
        .into_response()
}

async fn get_ride(State(api): State<FakeApi>, Path(id): Path<i64>) -> Response {
    match api.lock().ride_mut(id) {
        Some(ride) => Json(ride.clone()).into_response(),
        None => not_found(),
    }
}

async fn patch_ride(
    State(api): State<FakeApi>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut db = api.lock();
    let status = body["status"].as_str().unwrap_or_default().to_string();
    let Some(ride) = db.ride_mut(id) else {
        return not_found();
    };
    ride["status"] = json!(status);

    let mut released = 0;
    for b in db.bookings.iter_mut().filter(|b| b["ride"] == id) {
        if b["status"] != "confirmed" {
            continue;
        }
        match status.as_str() {
            "cancelled" => {
                b["status"] = json!("cancelled");
                released += b["seats_booked"].as_i64().unwrap_or(0);
            }
            "completed" => b["status"] = json!("awaiting_rating"),
            _ => {}
        }
    }
    db.release_seats(id, released);

    let ride = db.ride_mut(id).cloned().unwrap_or(Value::Null);
    Json(ride).into_response()
}

async fn delete_ride(State(api): State<FakeApi>, Path(id): Path<i64>) -> Response {
    let mut db = api.lock();
    if db.ride_mut(id).is_none() {
        return not_found();
    }
    db.rides.retain(|r| r["id"] != id);
    db.bookings.retain(|b| b["ride"] != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn list_bookings(
    State(api): State<FakeApi>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let db = api.lock();
    let bookings: Vec<Value> = db
        .bookings
        .iter()
        .filter(|b| q.get("ride_id").is_none_or(|r| b["ride"].to_string() == *r))
        .filter(|b| q.get("status").is_none_or(|s| b["status"] == s.as_str()))
        .filter(|b| {
            q.get("passenger_id")
                .is_none_or(|p| b["passenger"]["id"].to_string() == *p)
        })
        .cloned()
        .collect();
    Json(bookings).into_response()
}

async fn create_booking(State(api): State<FakeApi>, Json(body): Json<Value>) -> Response {
    let mut db = api.lock();
    let ride = body["ride_id"].as_i64().unwrap_or_default();
    let passenger = body["passenger_id"].as_i64().unwrap_or_default();
    let seats = body["seats_booked"].as_i64().unwrap_or_default();

    let Some(available) = db.ride_mut(ride).map(|r| r["seats_available"].as_i64().unwrap_or(0))
    else {
        return not_found();
    };
    if seats > available {
        return error(StatusCode::BAD_REQUEST, "error", "Not enough seats available");
    }
    db.release_seats(ride, -seats);

    let id = db.id();
    let status = body["status"].as_str().unwrap_or("confirmed").to_string();
    let booking = new_booking(&db, id, ride, passenger, seats, &status);
    db.bookings.push(booking);
    (
        StatusCode::CREATED,
        Json(json!({"message": "Booking created successfully", "booking_id": id})),
    )
        .into_response()
}

async fn get_booking(State(api): State<FakeApi>, Path(id): Path<i64>) -> Response {
    match api.lock().booking_mut(id) {
        Some(b) => Json(b.clone()).into_response(),
        None => not_found(),
    }
}

async fn patch_booking(
    State(api): State<FakeApi>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut db = api.lock();
    let Some(booking) = db.booking_mut(id) else {
        return not_found();
    };
    if let Value::Object(fields) = body {
        for (key, value) in fields {
            booking[key.as_str()] = value;
        }
    }
    Json(booking.clone()).into_response()
}

async fn cancel_booking(State(api): State<FakeApi>, Path(id): Path<i64>) -> Response {
    let mut db = api.lock();
    let Some(booking) = db.booking_mut(id) else {
        return not_found();
    };
    if booking["status"] != "confirmed" {
        return error(StatusCode::BAD_REQUEST, "error", "Only confirmed bookings can be cancelled");
    }
    booking["status"] = json!("cancelled");
    let ride = booking["ride"].as_i64().unwrap_or_default();
    let seats = booking["seats_booked"].as_i64().unwrap_or_default();
    db.release_seats(ride, seats);
    Json(json!({"message": "Booking cancelled"})).into_response()
}

async fn summary(State(api): State<FakeApi>) -> Response {
    let db = api.lock();
    Json(json!({
        "total_users": db.users.len(),
        "total_rides": db.rides.len(),
        "total_bookings": db.bookings.len(),
    }))
    .into_response()
}

// ---- client side ----

/// Confirmation stub with a fixed answer that remembers what it was asked.
#[derive(Default)]
pub struct ScriptedConfirm {
    pub answer: bool,
    pub asked: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            asked: Mutex::default(),
        })
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&self, message: &str) -> bool {
        self.asked.lock().unwrap().push(message.to_string());
        self.answer
    }
}

pub fn context(server: &TestServer, confirm: Arc<dyn Confirm>) -> Context {
    Context::new(
        ApiClient::new(server.api_url()),
        Session::in_memory(),
        Notifier::new(),
        confirm,
    )
}

/// App whose confirmations are all accepted.
pub fn app(server: &TestServer) -> App {
    App::new(context(server, ScriptedConfirm::answering(true)))
}

/// Store an identity as if the user had logged in.
pub fn log_in(ctx: &Context, id: i64, name: &str, role: Role) {
    ctx.session
        .persist(&SessionIdentity {
            id: UserId::new(id),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role,
        })
        .unwrap();
}

/// `(severity, message)` of every visible notice.
pub fn notices(ctx: &Context) -> Vec<(Severity, String)> {
    ctx.notifier
        .active()
        .into_iter()
        .map(|n| (n.severity, n.message))
        .collect()
}
