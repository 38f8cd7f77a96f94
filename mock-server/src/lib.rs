use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get, post, MethodRouter},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const USERNAME: &str = "per";
pub const PASSWORD: &str = "secret";
pub const ALLOWED_METHODS: &str = "GET, HEAD, POST, PUT, DELETE, TRACE, OPTIONS";
/// Number assigned to every company created through POST.
pub const ASSIGNED_NUMBER: i64 = 191919;
/// PNG signature followed by a few bytes that are not valid UTF-8.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0xFF, 0x00, 0xFE];
/// Size of the `/large` body, above ureq's default 10 MiB read limit.
pub const LARGE_BODY_LEN: usize = 11 * 1024 * 1024;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub number: i64,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// What `/echo` saw: method, headers (lower-cased names, repeated values
/// joined with ", ") and raw body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// Bearer tokens handed out by `/jwt/login`.
pub type Tokens = Arc<RwLock<HashSet<String>>>;

pub fn app() -> Router {
    let tokens: Tokens = Arc::new(RwLock::new(HashSet::new()));
    Router::new()
        .merge(company_routes("/simple"))
        .merge(company_routes("/basic").route_layer(middleware::from_fn(require_basic)))
        .merge(
            company_routes("/jwt")
                .route_layer(middleware::from_fn_with_state(tokens.clone(), require_bearer)),
        )
        .route("/jwt/login", post(login))
        .route("/complex", get(complex))
        .route("/image", get(image))
        .route("/large", get(large))
        .route("/error", get(failure))
        .route("/echo", any(echo))
        .with_state(tokens)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn company_routes(prefix: &str) -> Router<Tokens> {
    Router::new()
        .route(prefix, company_methods())
        .route(&format!("{prefix}/{{*rest}}"), company_methods())
}

fn company_methods() -> MethodRouter<Tokens> {
    get(get_company)
        .post(create_company)
        .put(update_company)
        .delete(delete_company)
        .options(allow)
}

async fn get_company(uri: Uri) -> Json<Company> {
    debug!(path = uri.path(), "get company");
    Json(Company {
        name: "ABC".to_string(),
        number: 123,
    })
}

async fn create_company(Json(mut company): Json<Company>) -> Json<Company> {
    company.number = ASSIGNED_NUMBER;
    Json(company)
}

async fn update_company(Json(company): Json<Company>) -> Json<Company> {
    Json(company)
}

async fn delete_company(uri: Uri) -> StatusCode {
    debug!(path = uri.path(), "delete company");
    if uri.path().ends_with("/company/123") {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn allow() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ALLOW, ALLOWED_METHODS),
            (header::CONTENT_TYPE, "application/json"),
        ],
    )
}

async fn login(State(tokens): State<Tokens>, Json(credentials): Json<Credentials>) -> Response {
    if credentials.username != USERNAME || credentials.password != PASSWORD {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let token = Uuid::new_v4().to_string();
    tokens.write().await.insert(token.clone());
    (StatusCode::OK, token).into_response()
}

async fn require_basic(request: Request, next: Next) -> Response {
    let expected = format!("Basic {}", STANDARD.encode(format!("{USERNAME}:{PASSWORD}")));
    if authorization(request.headers()) == Some(expected.as_str()) {
        return next.run(request).await;
    }
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"myrealm\"")],
    )
        .into_response()
}

async fn require_bearer(State(tokens): State<Tokens>, request: Request, next: Next) -> Response {
    let token = authorization(request.headers())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned);
    let known = match token {
        Some(token) => tokens.read().await.contains(&token),
        None => false,
    };
    if known {
        next.run(request).await
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

async fn complex() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "one": ["foo"],
        "two": ["foo", "bar"],
    }))
}

async fn image() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], PNG_BYTES)
}

async fn failure() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "  internal failure \n")
}

async fn large() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "x".repeat(LARGE_BODY_LEN))
}

async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Echo> {
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers.iter() {
        let value = String::from_utf8_lossy(value.as_bytes());
        seen.entry(name.as_str().to_string())
            .and_modify(|joined| {
                joined.push_str(", ");
                joined.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    Json(Echo {
        method: method.to_string(),
        headers: seen,
        body,
    })
}
