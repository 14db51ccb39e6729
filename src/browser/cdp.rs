use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

type WsSink = futures::stream::SplitSink<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
    WsMessage,
>;

type PendingReplies = Arc<Mutex<HashMap<u32, oneshot::Sender<serde_json::Value>>>>;

/// How long a single CDP command may take to answer
const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// CDP client over a raw WebSocket to one page target
pub struct CDPClient {
    /// WebSocket sender
    ws_tx: Option<Arc<Mutex<WsSink>>>,
    /// Replies awaited by id
    responses: PendingReplies,
    /// Message ID counter
    msg_id: Arc<Mutex<u32>>,
    /// Socket reader task
    reader: Option<JoinHandle<()>>,
}

impl CDPClient {
    /// Connect to a target's `webSocketDebuggerUrl` and enable the domains we use.
    pub async fn connect(ws_url: &str) -> Result<Self, String> {
        tracing::debug!("Connecting to page target WebSocket: {}", ws_url);

        let (ws_stream, _) = connect_async(ws_url)
            .await
            .map_err(|e| format!("Failed to connect WebSocket: {}", e))?;
        let (tx, mut rx) = StreamExt::split(ws_stream);

        let responses: PendingReplies = Arc::new(Mutex::new(HashMap::new()));
        let routed = responses.clone();

        // Route replies to their waiting senders; events are ignored
        let reader = tokio::spawn(async move {
            while let Some(msg) = rx.next().await {
                match msg {
                    Ok(WsMessage::Text(text)) => {
                        let Ok(json) = serde_json::from_str::<serde_json::Value>(&text) else {
                            continue;
                        };
                        if let Some(id) = json.get("id").and_then(|i| i.as_u64()) {
                            if let Some(sender) = routed.lock().await.remove(&(id as u32)) {
                                let _ = sender.send(json);
                            }
                        }
                    }
                    Ok(WsMessage::Close(_)) => {
                        tracing::debug!("WebSocket closed");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!("WebSocket error: {:?}", e);
                        break;
                    }
                    _ => {}
                }
            }
            // Fail any command still waiting
            routed.lock().await.clear();
        });

        let client = Self {
            ws_tx: Some(Arc::new(Mutex::new(tx))),
            responses,
            msg_id: Arc::new(Mutex::new(1)),
            reader: Some(reader),
        };

        client.send_command("Page.enable", json!({})).await?;
        client.send_command("Runtime.enable", json!({})).await?;
        tracing::debug!("CDP domains enabled");

        Ok(client)
    }

    pub fn is_connected(&self) -> bool {
        self.ws_tx.is_some() && self.reader.as_ref().is_some_and(|r| !r.is_finished())
    }

    /// Send a CDP command and return its `result` object
    pub async fn send_command(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, String> {
        let tx = self.ws_tx.as_ref().ok_or("WebSocket not connected")?;

        let (id, rx) = {
            let mut msg_id = self.msg_id.lock().await;
            let id = *msg_id;
            *msg_id += 1;

            let (tx, rx) = oneshot::channel();
            self.responses.lock().await.insert(id, tx);
            (id, rx)
        };

        let command = json!({
            "id": id,
            "method": method,
            "params": params
        });

        tx.lock()
            .await
            .send(WsMessage::Text(command.to_string()))
            .await
            .map_err(|e| format!("Failed to send {}: {}", method, e))?;

        let response = match tokio::time::timeout(COMMAND_TIMEOUT, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => return Err(format!("{}: response channel closed", method)),
            Err(_) => {
                self.responses.lock().await.remove(&id);
                return Err(format!("{}: command timeout", method));
            }
        };

        if let Some(error) = response.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error");
            return Err(format!("{}: {}", method, message));
        }

        Ok(response.get("result").cloned().unwrap_or(serde_json::Value::Null))
    }

    /// Evaluate an expression in the page and return its value
    pub async fn evaluate(&self, expression: &str) -> Result<serde_json::Value, String> {
        let result = self
            .send_command(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": true
                }),
            )
            .await?;

        if let Some(details) = result.get("exceptionDetails") {
            let text = details
                .get("exception")
                .and_then(|e| e.get("description"))
                .or_else(|| details.get("text"))
                .and_then(|t| t.as_str())
                .unwrap_or("uncaught exception");
            return Err(format!("Script error: {}", text));
        }

        Ok(result
            .get("result")
            .and_then(|r| r.get("value"))
            .cloned()
            .unwrap_or(serde_json::Value::Null))
    }

    /// Start navigation; fails when the browser reports a network error
    pub async fn navigate(&self, url: &str) -> Result<(), String> {
        let result = self
            .send_command("Page.navigate", json!({ "url": url }))
            .await?;

        if let Some(error) = result
            .get("errorText")
            .and_then(|e| e.as_str())
            .filter(|e| !e.is_empty())
        {
            return Err(format!("Navigation to {} failed: {}", url, error));
        }
        Ok(())
    }

    pub async fn close(&mut self) {
        if let Some(tx) = self.ws_tx.take() {
            let _ = tx.lock().await.close().await;
        }
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

impl Drop for CDPClient {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

/// Execution contexts are torn down on every navigation; a script that lands
/// in between fails with one of these.
pub fn is_context_lost(error: &str) -> bool {
    error.contains("Execution context was destroyed")
        || error.contains("Cannot find context with specified id")
        || error.contains("Inspected target navigated or closed")
}

/// Ask the debugging endpoint for the first `page` target's WebSocket URL
pub async fn find_page_target(cdp_port: u16) -> Result<String, String> {
    let list_url = format!("http://127.0.0.1:{}/json/list", cdp_port);

    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

    let response = client
        .get(&list_url)
        .send()
        .await
        .map_err(|e| format!("Connection error: {}", e))?;
    if !response.status().is_success() {
        return Err(format!("HTTP error: {}", response.status()));
    }

    let targets: serde_json::Value = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse targets response: {}", e))?;

    page_target_ws_url(&targets).ok_or_else(|| "No page target found".to_string())
}

fn page_target_ws_url(targets: &serde_json::Value) -> Option<String> {
    targets
        .as_array()?
        .iter()
        .filter(|t| t.get("type").and_then(|v| v.as_str()) == Some("page"))
        .find_map(|t| t.get("webSocketDebuggerUrl").and_then(|v| v.as_str()))
        .map(str::to_string)
}
