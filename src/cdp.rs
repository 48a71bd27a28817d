//! CEF remote debugging client for the Steam client.
//!
//! The patcher needs exactly one capability here: run a script string in the
//! already-open library page. Targets are discovered over the DevTools HTTP
//! endpoint, then a WebSocket session sends a single `Runtime.evaluate`
//! command and waits for the correlated response.

use std::fmt;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info};

/// Title of the Steam library context among the DevTools targets.
const LIBRARY_TARGET_TITLE: &str = "SP";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum CdpError {
    /// Target list could not be fetched or parsed.
    Discovery(String),
    /// No target matching the library context was listed.
    NoLibraryTarget,
    /// WebSocket connection to the target failed.
    Connect(String),
    /// The evaluate command failed or the session dropped mid-exchange.
    Execute(String),
}

impl fmt::Display for CdpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery(e) => write!(f, "Failed to list debug targets: {e}"),
            Self::NoLibraryTarget => {
                write!(f, "No '{LIBRARY_TARGET_TITLE}' library target found")
            }
            Self::Connect(e) => write!(f, "Failed to connect to debug target: {e}"),
            Self::Execute(e) => write!(f, "Failed to execute script: {e}"),
        }
    }
}

impl std::error::Error for CdpError {}

// ---------------------------------------------------------------------------
// Target discovery
// ---------------------------------------------------------------------------

/// One entry from the DevTools `/json` target list.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetInfo {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "webSocketDebuggerUrl", default)]
    pub web_socket_debugger_url: Option<String>,
}

/// Fetch the target list from a DevTools `/json` endpoint.
pub async fn discover_targets(json_url: &str) -> Result<Vec<TargetInfo>, CdpError> {
    let response = reqwest::get(json_url)
        .await
        .map_err(|e| CdpError::Discovery(e.to_string()))?
        .error_for_status()
        .map_err(|e| CdpError::Discovery(e.to_string()))?;

    response
        .json::<Vec<TargetInfo>>()
        .await
        .map_err(|e| CdpError::Discovery(format!("invalid target list: {e}")))
}

/// Pick the library context out of the target list.
fn library_target(targets: &[TargetInfo]) -> Option<&TargetInfo> {
    targets
        .iter()
        .find(|t| t.title == LIBRARY_TARGET_TITLE && t.web_socket_debugger_url.is_some())
}

/// Build a `Runtime.evaluate` command with a correlated id.
fn evaluate_command(id: u64, script: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "method": "Runtime.evaluate",
        "params": { "expression": script },
    })
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A WebSocket session against the Steam library page.
pub struct SteamClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_id: u64,
}

impl SteamClient {
    /// Discover the library target on the given debug port and connect.
    pub async fn connect(debug_port: u16) -> Result<Self, CdpError> {
        let json_url = format!("http://localhost:{debug_port}/json");
        let targets = discover_targets(&json_url).await?;
        debug!("Found {} debug targets", targets.len());

        let target = library_target(&targets).ok_or(CdpError::NoLibraryTarget)?;
        let ws_url = target
            .web_socket_debugger_url
            .as_deref()
            .ok_or(CdpError::NoLibraryTarget)?;

        let (ws, _response) = connect_async(ws_url)
            .await
            .map_err(|e| CdpError::Connect(e.to_string()))?;

        Ok(Self { ws, next_id: 1 })
    }

    /// Run a script string in the library page and wait for the matching
    /// response. Event notifications arriving in between are skipped.
    pub async fn run_script_in_library(&mut self, script: &str) -> Result<(), CdpError> {
        let id = self.next_id;
        self.next_id += 1;

        let command = evaluate_command(id, script);
        self.ws
            .send(Message::Text(command.to_string().into()))
            .await
            .map_err(|e| CdpError::Execute(e.to_string()))?;

        while let Some(message) = self.ws.next().await {
            let message = message.map_err(|e| CdpError::Execute(e.to_string()))?;
            if !message.is_text() {
                continue;
            }
            let text = message
                .to_text()
                .map_err(|e| CdpError::Execute(e.to_string()))?;
            let value: serde_json::Value = match serde_json::from_str(text) {
                Ok(v) => v,
                Err(_) => continue,
            };
            if value["id"].as_u64() != Some(id) {
                continue;
            }
            if let Some(error) = value.get("error") {
                return Err(CdpError::Execute(error.to_string()));
            }
            return Ok(());
        }

        Err(CdpError::Execute(
            "connection closed before response".to_string(),
        ))
    }

    /// Release the underlying connection. Close errors are ignored; the
    /// session is done either way.
    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}

/// Reload the library page so it picks up the patched script.
///
/// Scoped acquisition: connect, execute, always release — including on
/// execute failure.
pub async fn reload_client(debug_port: u16) -> Result<(), CdpError> {
    info!("Reloading Steam client on debug port {debug_port}");

    let mut client = SteamClient::connect(debug_port).await?;
    let result = client.run_script_in_library("window.location.reload()").await;
    client.close().await;

    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn target(title: &str, url: Option<&str>) -> TargetInfo {
        TargetInfo {
            title: title.to_string(),
            web_socket_debugger_url: url.map(str::to_owned),
        }
    }

    // -- library_target --

    #[test]
    fn picks_the_sp_target() {
        let targets = vec![
            target("Steam", Some("ws://localhost:8080/devtools/page/1")),
            target("SP", Some("ws://localhost:8080/devtools/page/2")),
        ];
        let found = library_target(&targets).expect("target");
        assert_eq!(
            found.web_socket_debugger_url.as_deref(),
            Some("ws://localhost:8080/devtools/page/2")
        );
    }

    #[test]
    fn skips_sp_target_without_debugger_url() {
        let targets = vec![
            target("SP", None),
            target("SP", Some("ws://localhost:8080/devtools/page/3")),
        ];
        let found = library_target(&targets).expect("target");
        assert_eq!(
            found.web_socket_debugger_url.as_deref(),
            Some("ws://localhost:8080/devtools/page/3")
        );
    }

    #[test]
    fn no_sp_target_is_none() {
        let targets = vec![target("Steam", Some("ws://x"))];
        assert!(library_target(&targets).is_none());
    }

    // -- evaluate_command --

    #[test]
    fn evaluate_command_shape() {
        let cmd = evaluate_command(7, "window.location.reload()");
        assert_eq!(cmd["id"], 7);
        assert_eq!(cmd["method"], "Runtime.evaluate");
        assert_eq!(cmd["params"]["expression"], "window.location.reload()");
    }

    // -- discover_targets --

    #[tokio::test]
    async fn discover_parses_target_list() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"title": "SP", "webSocketDebuggerUrl": "ws://localhost:8080/devtools/page/2"},
                    {"title": "Steam"}
                ]"#,
            )
            .create_async()
            .await;

        let targets = discover_targets(&format!("{}/json", server.url()))
            .await
            .expect("discover");
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].title, "SP");
        assert!(targets[1].web_socket_debugger_url.is_none());
    }

    #[tokio::test]
    async fn discover_rejects_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/json")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let result = discover_targets(&format!("{}/json", server.url())).await;
        match result {
            Err(CdpError::Discovery(msg)) => assert!(msg.contains("invalid target list")),
            other => panic!("Expected Discovery error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn discover_rejects_http_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/json")
            .with_status(500)
            .create_async()
            .await;

        let result = discover_targets(&format!("{}/json", server.url())).await;
        assert!(matches!(result, Err(CdpError::Discovery(_))));
    }

    #[tokio::test]
    async fn discover_reports_connection_refused() {
        // Port 1 is essentially never listening
        let result = discover_targets("http://127.0.0.1:1/json").await;
        assert!(matches!(result, Err(CdpError::Discovery(_))));
    }

    #[test]
    fn error_display_is_readable() {
        assert_eq!(
            CdpError::NoLibraryTarget.to_string(),
            "No 'SP' library target found"
        );
        assert!(
            CdpError::Execute("closed".to_string())
                .to_string()
                .contains("closed")
        );
    }
}
