//! AWS Lambda handler for the planner's HTTP surface
//!
//! - `POST /api/calculate` runs one calculator request and returns the result
//! - `POST /api/calculate/batch` runs an array of requests in parallel
//! - `POST /api/session` verifies a token and sets the session cookie
//! - `POST /api/verify` resolves a token to its user (or null)
//! - every other path goes through the access gate and gets either a redirect
//!   or an allow response
//!
//! Supports Lambda Function URLs for direct HTTP access.

use lambda_http::http::{header, Method, StatusCode};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use log::warn;
use retirement_planner::access::{establish_session, resolve_principal, AccessGate, Decision, StaticTokenVerifier};
use retirement_planner::scenario::{run_batch, BatchOutcome};
use retirement_planner::{AppConfig, CalculatorRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;

struct AppState {
    config: AppConfig,
    gate: AccessGate<StaticTokenVerifier>,
}

/// Body of `/api/session` and `/api/verify`
#[derive(Debug, Default, Deserialize)]
struct TokenRequest {
    #[serde(default)]
    token: String,
}

fn body_text(event: &Request) -> String {
    match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => "{}".to_string(),
    }
}

fn cors(builder: lambda_http::http::response::Builder) -> lambda_http::http::response::Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<Response<Body>, Error> {
    Ok(cors(Response::builder())
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::Text(serde_json::to_string(body)?))?)
}

fn error_response(status: StatusCode, message: &str) -> Result<Response<Body>, Error> {
    json_response(status, &json!({ "error": message }))
}

fn redirect(location: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::TEMPORARY_REDIRECT)
        .header(header::LOCATION, location)
        .body(Body::Empty)?)
}

fn calculate(event: &Request) -> Result<Response<Body>, Error> {
    let request: CalculatorRequest = match serde_json::from_str(&body_text(event)) {
        Ok(r) => r,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &format!("Invalid JSON: {}", e)),
    };

    match request.run() {
        Ok(response) => json_response(StatusCode::OK, &response),
        Err(e) => error_response(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string()),
    }
}

fn calculate_batch(event: &Request) -> Result<Response<Body>, Error> {
    let requests: Vec<CalculatorRequest> = match serde_json::from_str(&body_text(event)) {
        Ok(r) => r,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &format!("Invalid JSON: {}", e)),
    };

    let outcomes: Vec<BatchOutcome> = run_batch(&requests).into_iter().map(BatchOutcome::from).collect();
    json_response(StatusCode::OK, &outcomes)
}

fn session(state: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    let request: TokenRequest = serde_json::from_str(&body_text(event)).unwrap_or_default();

    match establish_session(state.gate.verifier(), &request.token, state.config.secure_cookies) {
        Ok(cookie) => Ok(cors(Response::builder())
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::SET_COOKIE, cookie)
            .body(Body::Text(json!({ "success": true }).to_string()))?),
        Err(e) => {
            warn!("Invalid token: {}", e);
            error_response(StatusCode::UNAUTHORIZED, "Unauthorized")
        }
    }
}

fn verify(state: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    let request: TokenRequest = serde_json::from_str(&body_text(event)).unwrap_or_default();
    let user = resolve_principal(state.gate.verifier(), Some(request.token.as_str()));
    json_response(StatusCode::OK, &json!({ "success": true, "user": user }))
}

fn gate(state: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    let path = event.uri().path();
    let cookie = event.headers().get(header::COOKIE).and_then(|v| v.to_str().ok());

    let decision = state.gate.check(path, cookie);
    match decision.redirect_target(state.gate.policy()) {
        Some(target) => redirect(target),
        None => json_response(StatusCode::OK, &json!({ "path": path, "access": Decision::Allow })),
    }
}

fn route(state: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    // Handle CORS preflight
    if event.method() == Method::OPTIONS {
        return Ok(cors(Response::builder()).status(StatusCode::OK).body(Body::Empty)?);
    }

    let is_post = event.method() == Method::POST;
    match event.uri().path() {
        "/api/calculate" if is_post => calculate(event),
        "/api/calculate/batch" if is_post => calculate_batch(event),
        "/api/session" if is_post => session(state, event),
        "/api/verify" if is_post => verify(state, event),
        path if state.gate.policy().is_bypassed(path) => error_response(StatusCode::NOT_FOUND, "Not found"),
        _ => gate(state, event),
    }
}

/// Lambda handler function
async fn handler(state: &AppState, event: Request) -> Result<Response<Body>, Error> {
    route(state, &event)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let config = AppConfig::load();
    if config.uses_default_tokens() {
        warn!(
            "Using the development token table {}; set PLANNER_TOKENS_PATH for a deployment",
            config.tokens_path.display()
        );
    }
    let verifier = config.verifier()?;
    let state = AppState {
        gate: AccessGate::new(config.access.clone(), verifier),
        config,
    };

    let state = &state;
    run(service_fn(move |event: Request| async move { handler(state, event).await })).await
}
