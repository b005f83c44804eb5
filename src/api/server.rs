//! API Server Module
//!
//! This module implements a JSON-RPC server in front of the ticket validator.
//! It provides an HTTP endpoint that validates wallet addresses, serves the
//! contract details, and drives per-session presentation state.

use crate::{
    config::Config,
    session::{SessionEvent, SessionRegistry, SessionStore},
    validation::TicketValidator,
    ContractInfo,
};
use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const PARSE_ERROR: i32 = -32700;
const INVALID_REQUEST: i32 = -32600;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;

/// Shared application state that is accessible across all request handlers
///
/// - `validator`: Runs the contract checks
/// - `sessions`: Presentation state per client session
/// - `contract_info`: Static content of the contract details overlay
#[derive(Clone)]
pub struct AppState {
    validator: Arc<TicketValidator>,
    sessions: Arc<SessionRegistry>,
    contract_info: Arc<ContractInfo>,
}

impl AppState {
    pub fn new(
        validator: Arc<TicketValidator>,
        contract_info: ContractInfo,
        sessions: SessionRegistry,
    ) -> Self {
        Self {
            validator,
            sessions: Arc::new(sessions),
            contract_info: Arc::new(contract_info),
        }
    }
}

/// The main API server struct
///
/// Encapsulates the bind address and application state.
pub struct Server {
    config: Config,
    state: AppState,
}

impl Server {
    /// Creates a new API server instance
    ///
    /// # Arguments
    /// * `config` - Service configuration (bind address, contract details)
    /// * `validator` - The validator shared by all requests
    pub fn new(config: Config, validator: Arc<TicketValidator>) -> Self {
        // Session registry bounded by the configured size and idle timeout
        let sessions = SessionRegistry::new(
            config.api.max_sessions,
            Duration::from_secs(config.api.session_ttl_secs),
        );

        // Overlay content is fixed for the life of the process
        let contract_info = ContractInfo::from(&config);

        let state = AppState::new(validator, contract_info, sessions);
        Self { config, state }
    }

    /// Starts the API server and begins listening for incoming requests
    ///
    /// # Returns
    /// `Ok(())` when the server shuts down, or an error if binding fails
    pub async fn start(self) -> anyhow::Result<()> {
        // Create the router with a single POST endpoint that handles JSON-RPC requests
        let app = router(self.state);

        // Format the listening address from config
        let addr = format!("{}:{}", self.config.api.host, self.config.api.port);
        info!("API server listening on {}", addr);

        // Bind to the TCP address and start serving
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Router with a single POST endpoint at "/" handling JSON-RPC requests
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(handle_rpc))
        .with_state(state)
}

/// JSON-RPC 2.0 request structure
///
/// `jsonrpc` and `id` default to empty so a malformed envelope still reaches
/// the version check and gets a JSON-RPC error back instead of an HTTP one.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[serde(default)]
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: Value,
    #[serde(default)]
    id: Value,
}

/// JSON-RPC 2.0 response structure
///
/// Either `result` or `error` will be populated, but not both.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
    id: Value,
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Debug, Deserialize)]
struct AddressParams {
    address: String,
}

#[derive(Debug, Deserialize)]
struct SessionParams {
    session: String,
}

#[derive(Debug, Deserialize)]
struct SessionInputParams {
    session: String,
    address: String,
}

type RpcResult = Result<Value, JsonRpcError>;

/// Main RPC request handler
///
/// Decodes the envelope itself so every failure, including a body that is not
/// JSON, is answered with a JSON-RPC error object. Then routes the request to
/// the appropriate handler based on the method name.
async fn handle_rpc(State(state): State<AppState>, body: Bytes) -> Json<JsonRpcResponse> {
    // Decode the envelope; parse failures are answered right away
    let request = match decode_request(&body) {
        Ok(request) => request,
        Err(response) => return Json(response),
    };
    info!("Received RPC request: {}", request.method);

    // Only JSON-RPC 2.0 is served
    if request.jsonrpc != "2.0" {
        return Json(respond(
            request.id,
            Err(JsonRpcError {
                code: INVALID_REQUEST,
                message: "Invalid request: jsonrpc must be \"2.0\"".to_string(),
            }),
        ));
    }

    // Dispatch to the method handler
    let result = match request.method.as_str() {
        // Stateless check of a single address
        "validateTicket" => validate_ticket(&state, request.params).await,
        "contractInfo" => to_result(state.contract_info.as_ref()),
        // Session methods drive the per-client presentation state
        "session_open" => {
            let session = state.sessions.open().await;
            Ok(json!({ "session": session }))
        }
        "session_input" => session_input(&state, request.params).await,
        "session_validate" => session_validate(&state, request.params).await,
        "session_reset" => session_event(&state, request.params, SessionEvent::Reset).await,
        "session_toggleOverlay" => {
            session_event(&state, request.params, SessionEvent::OverlayToggled).await
        }
        "session_get" => session_get(&state, request.params).await,
        "session_close" => session_close(&state, request.params).await,
        // Unknown method
        _ => Err(JsonRpcError {
            code: METHOD_NOT_FOUND,
            message: "Method not found".to_string(),
        }),
    };

    // Wrap the result or error into a JSON-RPC response, echoing the id
    Json(respond(request.id, result))
}

/// Parse the raw body into a request envelope
///
/// - not JSON: `-32700`, id `null`
/// - JSON but not a request object: `-32600`, echoing `id` when present
fn decode_request(body: &[u8]) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        warn!("Unparsable RPC body: {}", e);
        respond(
            Value::Null,
            Err(JsonRpcError {
                code: PARSE_ERROR,
                message: format!("Parse error: {}", e),
            }),
        )
    })?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| {
        warn!("Malformed RPC request: {}", e);
        respond(
            id,
            Err(JsonRpcError {
                code: INVALID_REQUEST,
                message: format!("Invalid request: {}", e),
            }),
        )
    })
}

/// Handles the "validateTicket" RPC method
///
/// A failed check is still a successful call: the outcome itself carries the
/// diagnostic shown to the user.
async fn validate_ticket(state: &AppState, params: Value) -> RpcResult {
    let params: AddressParams = parse_params(params)?;
    let outcome = state.validator.validate(&params.address).await;
    to_result(&outcome)
}

async fn session_input(state: &AppState, params: Value) -> RpcResult {
    let (store, params) = session_store::<SessionInputParams>(state, params).await?;
    to_result(&store.dispatch(SessionEvent::InputChanged(params.address)).await)
}

async fn session_validate(state: &AppState, params: Value) -> RpcResult {
    let (store, _) = session_store::<SessionParams>(state, params).await?;
    to_result(&store.validate_current(&state.validator).await)
}

async fn session_get(state: &AppState, params: Value) -> RpcResult {
    let (store, _) = session_store::<SessionParams>(state, params).await?;
    to_result(&store.snapshot().await)
}

async fn session_close(state: &AppState, params: Value) -> RpcResult {
    let params: SessionParams = parse_params(params)?;
    let closed = state.sessions.close(&params.session).await;
    Ok(json!({ "closed": closed }))
}

async fn session_event(state: &AppState, params: Value, event: SessionEvent) -> RpcResult {
    let (store, _) = session_store::<SessionParams>(state, params).await?;
    to_result(&store.dispatch(event).await)
}

trait HasSession {
    fn session(&self) -> &str;
}

impl HasSession for SessionParams {
    fn session(&self) -> &str {
        &self.session
    }
}

impl HasSession for SessionInputParams {
    fn session(&self) -> &str {
        &self.session
    }
}

/// Parse session-scoped params and look the session up
async fn session_store<P>(state: &AppState, params: Value) -> Result<(SessionStore, P), JsonRpcError>
where
    P: DeserializeOwned + HasSession,
{
    let params: P = parse_params(params)?;
    match state.sessions.get(params.session()).await {
        Some(store) => Ok((store, params)),
        None => {
            warn!("Unknown session {}", params.session());
            Err(JsonRpcError {
                code: INVALID_PARAMS,
                message: format!("Unknown session: {}", params.session()),
            })
        }
    }
}

fn parse_params<P: DeserializeOwned>(params: Value) -> Result<P, JsonRpcError> {
    serde_json::from_value(params).map_err(|e| JsonRpcError {
        code: INVALID_PARAMS,
        message: format!("Invalid params: {}", e),
    })
}

fn to_result<T: Serialize>(value: &T) -> RpcResult {
    serde_json::to_value(value).map_err(|e| {
        error!("Failed to serialize result: {}", e);
        JsonRpcError {
            code: INTERNAL_ERROR,
            message: "Internal error".to_string(),
        }
    })
}

fn respond(id: Value, result: RpcResult) -> JsonRpcResponse {
    match result {
        Ok(value) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(value),
            error: None,
            id,
        },
        Err(error) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::TicketConfig, testing::StaticLock};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn app() -> Router {
        let lock = Arc::new(StaticLock::new().has_valid_key(Ok(true)));
        let validator = Arc::new(TicketValidator::new(lock, &TicketConfig::default()));
        let info = ContractInfo {
            contract_address: "0x0f9ab1d4feaede6b8e5bb7a9d7a10e3e5c1b5d2a".to_string(),
            rpc_url: "https://rpc.gnosischain.com".to_string(),
            network: "Gnosis Chain".to_string(),
            support_email: "support@dappcon.io".to_string(),
        };
        let sessions = SessionRegistry::new(8, Duration::from_secs(60));
        router(AppState::new(validator, info, sessions))
    }

    async fn post_raw(app: &Router, body: String) -> (StatusCode, Value) {
        let request = Request::post("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn call(app: &Router, method: &str, params: Value) -> Value {
        let body = json!({ "jsonrpc": "2.0", "method": method, "params": params, "id": 1 });
        let (status, response) = post_raw(app, body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        response
    }

    #[tokio::test]
    async fn test_validate_ticket() {
        let app = app();

        let response = call(
            &app,
            "validateTicket",
            json!({ "address": "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed" }),
        )
        .await;

        assert_eq!(response["id"], json!(1));
        assert_eq!(response["result"]["status"], json!("valid"));
        assert_eq!(response["result"]["details"]["eventName"], json!("DappCon 2025"));
    }

    #[tokio::test]
    async fn test_validate_ticket_bad_address_is_not_an_rpc_error() {
        let response = call(&app(), "validateTicket", json!({ "address": "nope" })).await;

        assert!(response.get("error").is_none());
        assert_eq!(response["result"]["status"], json!("unknown"));
        assert_eq!(response["result"]["diagnostic"], json!("Invalid wallet address format"));
    }

    #[tokio::test]
    async fn test_missing_params() {
        let response = call(&app(), "validateTicket", json!({})).await;
        assert_eq!(response["error"]["code"], json!(INVALID_PARAMS));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = call(&app(), "eth_sendTransaction", Value::Null).await;
        assert_eq!(response["error"]["code"], json!(METHOD_NOT_FOUND));
        assert!(response.get("result").is_none());
    }

    #[tokio::test]
    async fn test_wrong_protocol_version() {
        let body = json!({ "jsonrpc": "1.0", "method": "contractInfo", "id": 9 });
        let (status, response) = post_raw(&app(), body.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["error"]["code"], json!(INVALID_REQUEST));
        assert_eq!(response["id"], json!(9));
    }

    #[tokio::test]
    async fn test_missing_protocol_version() {
        let (status, response) =
            post_raw(&app(), r#"{"method":"contractInfo","id":1}"#.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["jsonrpc"], json!("2.0"));
        assert_eq!(response["error"]["code"], json!(INVALID_REQUEST));
        assert_eq!(response["id"], json!(1));
    }

    #[tokio::test]
    async fn test_missing_id_still_answered() {
        let (status, response) =
            post_raw(&app(), r#"{"jsonrpc":"2.0","method":"contractInfo"}"#.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["id"], Value::Null);
        assert_eq!(response["result"]["network"], json!("Gnosis Chain"));
    }

    #[tokio::test]
    async fn test_missing_method_is_invalid_request() {
        let (status, response) = post_raw(&app(), r#"{"jsonrpc":"2.0","id":3}"#.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["error"]["code"], json!(INVALID_REQUEST));
        assert_eq!(response["id"], json!(3));
    }

    #[tokio::test]
    async fn test_body_that_is_not_json() {
        let (status, response) = post_raw(&app(), "{not json".to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["error"]["code"], json!(PARSE_ERROR));
        assert_eq!(response["id"], Value::Null);
        assert!(response.get("result").is_none());
    }

    #[tokio::test]
    async fn test_contract_info() {
        let response = call(&app(), "contractInfo", Value::Null).await;
        assert_eq!(response["result"]["network"], json!("Gnosis Chain"));
        assert_eq!(response["result"]["supportEmail"], json!("support@dappcon.io"));
    }

    #[tokio::test]
    async fn test_session_flow() {
        let app = app();

        let opened = call(&app, "session_open", Value::Null).await;
        let session = opened["result"]["session"].as_str().unwrap().to_string();

        let state = call(
            &app,
            "session_input",
            json!({ "session": session, "address": "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed" }),
        )
        .await;
        assert_eq!(state["result"]["outcome"], Value::Null);

        let state = call(&app, "session_validate", json!({ "session": session })).await;
        assert_eq!(state["result"]["loading"], json!(false));
        assert_eq!(state["result"]["outcome"]["status"], json!("valid"));

        let state = call(&app, "session_toggleOverlay", json!({ "session": session })).await;
        assert_eq!(state["result"]["overlayOpen"], json!(true));

        let state = call(&app, "session_reset", json!({ "session": session })).await;
        assert_eq!(state["result"]["address"], json!(""));
        assert_eq!(state["result"]["overlayOpen"], json!(false));

        let state = call(&app, "session_get", json!({ "session": session })).await;
        assert_eq!(state["result"]["outcome"], Value::Null);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let response = call(&app(), "session_get", json!({ "session": "missing" })).await;
        assert_eq!(response["error"]["code"], json!(INVALID_PARAMS));
    }

    #[tokio::test]
    async fn test_session_close() {
        let app = app();

        let opened = call(&app, "session_open", Value::Null).await;
        let session = opened["result"]["session"].as_str().unwrap().to_string();

        let closed = call(&app, "session_close", json!({ "session": session })).await;
        assert_eq!(closed["result"]["closed"], json!(true));

        let response = call(&app, "session_get", json!({ "session": session })).await;
        assert_eq!(response["error"]["code"], json!(INVALID_PARAMS));

        let closed = call(&app, "session_close", json!({ "session": session })).await;
        assert_eq!(closed["result"]["closed"], json!(false));
    }

    #[tokio::test]
    async fn test_open_sessions_stay_bounded() {
        let app = app();

        for _ in 0..50 {
            call(&app, "session_open", Value::Null).await;
        }

        let opened = call(&app, "session_open", Value::Null).await;
        let newest = opened["result"]["session"].as_str().unwrap().to_string();
        let response = call(&app, "session_get", json!({ "session": newest })).await;
        assert!(response.get("error").is_none());
        // the very first session was evicted to stay within 8 live sessions
        let response = call(&app, "session_get", json!({ "session": "session-1" })).await;
        assert_eq!(response["error"]["code"], json!(INVALID_PARAMS));
    }
}
