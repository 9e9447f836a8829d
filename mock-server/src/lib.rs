use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_APP_ID: &str = "abc123";
pub const DEFAULT_API_KEY: &str = "super-secret-key";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: Uuid,
    pub email: Option<String>,
    pub user_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub email: Option<String>,
    pub user_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct UserLookup {
    pub email: Option<String>,
    pub user_id: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, User>>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    credentials: Arc<str>,
}

/// Router accepting the default test credentials.
pub fn app() -> Router {
    app_with_credentials(DEFAULT_APP_ID, DEFAULT_API_KEY)
}

pub fn app_with_credentials(app_id: &str, api_key: &str) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(HashMap::new())),
        credentials: format!("{app_id}:{api_key}").into(),
    };
    Router::new()
        .route("/users", get(find_user).post(create_user))
        .route("/users/{id}", get(get_user).delete(delete_user))
        .route("/errors/{status}/{code}", get(echo_error))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_basic_auth))
        .with_state(state)
}

pub async fn run(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

/// An Intercom-style `error.list` response.
pub fn error_list(status: StatusCode, code: &str, message: &str) -> Response {
    let body = json!({
        "type": "error.list",
        "errors": [{ "code": code, "message": message }],
    });
    (status, Json(body)).into_response()
}

async fn require_basic_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
        .and_then(|encoded| STANDARD.decode(encoded).ok())
        .and_then(|decoded| String::from_utf8(decoded).ok())
        .is_some_and(|credentials| credentials.as_str() == &*state.credentials);
    if !authorized {
        tracing::debug!("rejected request with bad credentials");
        return error_list(StatusCode::UNAUTHORIZED, "unauthorized", "Access Token Invalid");
    }
    next.run(request).await
}

async fn create_user(State(state): State<AppState>, Json(input): Json<CreateUser>) -> Response {
    if input.email.is_none() && input.user_id.is_none() {
        return error_list(
            StatusCode::BAD_REQUEST,
            "parameter_not_found",
            "Either email or user_id must be specified",
        );
    }
    let user = User {
        kind: "user".to_string(),
        id: Uuid::new_v4(),
        email: input.email,
        user_id: input.user_id,
        name: input.name,
    };
    state.db.write().await.insert(user.id, user.clone());
    (StatusCode::OK, Json(user)).into_response()
}

async fn find_user(State(state): State<AppState>, Query(lookup): Query<UserLookup>) -> Response {
    let users = state.db.read().await;
    let matches: Vec<&User> = match (&lookup.user_id, &lookup.email) {
        (Some(user_id), _) => users
            .values()
            .filter(|u| u.user_id.as_ref() == Some(user_id))
            .collect(),
        (None, Some(email)) => users
            .values()
            .filter(|u| u.email.as_ref() == Some(email))
            .collect(),
        (None, None) => {
            return error_list(
                StatusCode::BAD_REQUEST,
                "parameter_not_found",
                "Either email or user_id must be specified",
            )
        }
    };
    match matches.as_slice() {
        [] => error_list(StatusCode::NOT_FOUND, "not_found", "User Not Found"),
        [user] => Json((*user).clone()).into_response(),
        _ => error_list(
            StatusCode::BAD_REQUEST,
            "conflict",
            "Multiple existing users match this email address - must be more specific using user_id",
        ),
    }
}

async fn get_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let users = state.db.read().await;
    match users.get(&id) {
        Some(user) => Json(user.clone()).into_response(),
        None => error_list(StatusCode::NOT_FOUND, "not_found", "User Not Found"),
    }
}

async fn delete_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let mut users = state.db.write().await;
    match users.remove(&id) {
        Some(user) => Json(user).into_response(),
        None => error_list(StatusCode::NOT_FOUND, "not_found", "User Not Found"),
    }
}

/// Reply with an `error.list` carrying the requested status and code.
///
/// Only 4xx/5xx statuses are echoed; anything else is a 400
/// `parameter_invalid` naming the rejected status.
async fn echo_error(Path((status, code)): Path<(u16, String)>) -> Response {
    match StatusCode::from_u16(status) {
        Ok(status) if status.is_client_error() || status.is_server_error() => {
            error_list(status, &code, &format!("simulated {code}"))
        }
        _ => error_list(
            StatusCode::BAD_REQUEST,
            "parameter_invalid",
            &format!("status {status} is not between 400 and 599"),
        ),
    }
}
