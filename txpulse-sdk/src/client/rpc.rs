//! JSON-RPC 2.0 over a single WebSocket connection.
//!
//! One writer task drains outgoing frames; one reader task routes responses
//! to the waiting caller by request id and subscription notifications to the
//! subscriber by subscription id.

use super::ClientError;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

enum Pending {
    Call(oneshot::Sender<Result<Value, ClientError>>),
    Subscribe {
        reply: oneshot::Sender<Result<String, ClientError>>,
        notifications: mpsc::UnboundedSender<Value>,
    },
}

impl Pending {
    fn fail(self, err: ClientError) {
        match self {
            Pending::Call(reply) => {
                let _ = reply.send(Err(err));
            }
            Pending::Subscribe { reply, .. } => {
                let _ = reply.send(Err(err));
            }
        }
    }
}

#[derive(Default)]
struct Router {
    pending: HashMap<u64, Pending>,
    // Unbounded: the reader must never wait on a subscriber that may itself
    // be waiting for a response the reader has yet to route.
    subscriptions: HashMap<String, mpsc::UnboundedSender<Value>>,
    /// Set once the reader has stopped; nothing registered after this
    /// would ever be answered.
    closed: bool,
}

#[derive(Debug, Deserialize)]
struct IncomingFrame {
    id: Option<u64>,
    result: Option<Value>,
    error: Option<RpcErrorObject>,
    params: Option<NotificationParams>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct NotificationParams {
    subscription: Value,
    result: Value,
}

/// A live subscription. Dropping it stops delivery locally; the node keeps
/// the subscription until the connection closes.
#[derive(Debug)]
pub struct Subscription {
    pub id: String,
    rx: mpsc::UnboundedReceiver<Value>,
}

impl Subscription {
    /// Wait for the next notification. `None` once the connection is gone.
    pub async fn next<T: DeserializeOwned>(&mut self) -> Option<Result<T, ClientError>> {
        let value = self.rx.recv().await?;
        Some(serde_json::from_value(value).map_err(ClientError::Json))
    }
}

/// JSON-RPC client multiplexing calls and subscriptions over one WebSocket.
pub struct WsRpcClient {
    outgoing: mpsc::UnboundedSender<Message>,
    router: Arc<Mutex<Router>>,
    next_id: AtomicU64,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl WsRpcClient {
    /// Open the connection and start the reader and writer tasks.
    pub async fn connect(url: &Url) -> Result<Self, ClientError> {
        let (ws, _) = tokio_tungstenite::connect_async(url.as_str()).await?;
        info!(%url, "Connected to ledger node");

        let (sink, stream) = ws.split();
        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        let router = Arc::new(Mutex::new(Router::default()));

        let writer = tokio::spawn(write_loop(sink, outgoing_rx));
        let reader = tokio::spawn(read_loop(stream, router.clone()));

        Ok(Self {
            outgoing,
            router,
            next_id: AtomicU64::new(1),
            reader,
            writer,
        })
    }

    /// Call `method` and deserialize its result.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, ClientError> {
        let (reply, rx) = oneshot::channel();
        let id = self.register(Pending::Call(reply)).await?;
        self.send(id, method, params).await?;

        let value = rx.await.map_err(|_| ClientError::Closed)??;
        serde_json::from_value(value).map_err(ClientError::Json)
    }

    /// Call a subscribing `method`; notifications flow into the returned
    /// [`Subscription`].
    pub async fn subscribe(&self, method: &str, params: Value) -> Result<Subscription, ClientError> {
        let (reply, rx) = oneshot::channel();
        let (notifications, notifications_rx) = mpsc::unbounded_channel();
        let id = self
            .register(Pending::Subscribe {
                reply,
                notifications,
            })
            .await?;
        self.send(id, method, params).await?;

        let subscription_id = rx.await.map_err(|_| ClientError::Closed)??;
        debug!(method, subscription = %subscription_id, "Subscription established");
        Ok(Subscription {
            id: subscription_id,
            rx: notifications_rx,
        })
    }

    async fn register(&self, pending: Pending) -> Result<u64, ClientError> {
        let mut router = self.router.lock().await;
        if router.closed {
            return Err(ClientError::Closed);
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        router.pending.insert(id, pending);
        Ok(id)
    }

    async fn send(&self, id: u64, method: &str, params: Value) -> Result<(), ClientError> {
        let frame = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        if self.outgoing.send(Message::Text(frame.to_string())).is_err() {
            self.router.lock().await.pending.remove(&id);
            return Err(ClientError::Closed);
        }
        Ok(())
    }
}

impl Drop for WsRpcClient {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

async fn write_loop(
    mut sink: SplitSink<WsStream, Message>,
    mut outgoing: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(message) = outgoing.recv().await {
        if let Err(e) = sink.send(message).await {
            error!(error = %e, "Failed to write to ledger node");
            break;
        }
    }
    let _ = sink.close().await;
}

async fn read_loop(mut stream: SplitStream<WsStream>, router: Arc<Mutex<Router>>) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => route(&router, &text).await,
            Ok(Message::Close(close)) => {
                info!(?close, "Ledger node closed the connection");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "Failed to read from ledger node");
                break;
            }
        }
    }

    let mut router = router.lock().await;
    router.closed = true;
    for (_, pending) in router.pending.drain() {
        pending.fail(ClientError::Closed);
    }
    router.subscriptions.clear();
}

async fn route(router: &Mutex<Router>, text: &str) {
    let frame: IncomingFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, "Ignoring malformed frame from ledger node");
            return;
        }
    };

    let mut router = router.lock().await;

    if let Some(id) = frame.id {
        let Some(pending) = router.pending.remove(&id) else {
            warn!(id, "Response for unknown request id");
            return;
        };
        if let Some(err) = frame.error {
            pending.fail(ClientError::Rpc {
                code: err.code,
                message: err.message,
            });
            return;
        }
        let result = frame.result.unwrap_or(Value::Null);
        match pending {
            Pending::Call(reply) => {
                let _ = reply.send(Ok(result));
            }
            Pending::Subscribe {
                reply,
                notifications,
            } => {
                let key = subscription_key(&result);
                router.subscriptions.insert(key.clone(), notifications);
                let _ = reply.send(Ok(key));
            }
        }
        return;
    }

    if let Some(params) = frame.params {
        let key = subscription_key(&params.subscription);
        match router.subscriptions.get(&key) {
            Some(tx) => {
                if tx.send(params.result).is_err() {
                    debug!(subscription = %key, "Subscriber dropped, discarding");
                    router.subscriptions.remove(&key);
                }
            }
            None => warn!(subscription = %key, "Notification for unknown subscription"),
        }
    }
}

fn subscription_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::TcpListener;

    fn router_with_call(id: u64) -> (Mutex<Router>, oneshot::Receiver<Result<Value, ClientError>>) {
        let (tx, rx) = oneshot::channel();
        let mut router = Router::default();
        router.pending.insert(id, Pending::Call(tx));
        (Mutex::new(router), rx)
    }

    #[tokio::test]
    async fn test_route_response_to_caller() {
        let (router, rx) = router_with_call(4);
        route(&router, r#"{"jsonrpc":"2.0","id":4,"result":{"number":"0x10"}}"#).await;
        let value = rx.await.unwrap().unwrap();
        assert_eq!(value, json!({"number": "0x10"}));
        assert!(router.lock().await.pending.is_empty());
    }

    #[tokio::test]
    async fn test_route_null_result() {
        let (router, rx) = router_with_call(1);
        route(&router, r#"{"jsonrpc":"2.0","id":1,"result":null}"#).await;
        assert_eq!(rx.await.unwrap().unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_route_rpc_error() {
        let (router, rx) = router_with_call(2);
        route(
            &router,
            r#"{"jsonrpc":"2.0","id":2,"error":{"code":1010,"message":"Invalid Transaction"}}"#,
        )
        .await;
        let err = rx.await.unwrap().unwrap_err();
        assert!(matches!(err, ClientError::Rpc { code: 1010, .. }));
    }

    #[tokio::test]
    async fn test_route_subscription_notifications() {
        let (reply, reply_rx) = oneshot::channel();
        let (notifications, mut notifications_rx) = mpsc::unbounded_channel();
        let mut router = Router::default();
        router.pending.insert(
            9,
            Pending::Subscribe {
                reply,
                notifications,
            },
        );
        let router = Mutex::new(router);

        route(&router, r#"{"jsonrpc":"2.0","id":9,"result":"abc"}"#).await;
        assert_eq!(reply_rx.await.unwrap().unwrap(), "abc");

        route(
            &router,
            r#"{"jsonrpc":"2.0","method":"events_batch","params":{"subscription":"abc","result":[1,2]}}"#,
        )
        .await;
        assert_eq!(notifications_rx.recv().await.unwrap(), json!([1, 2]));
    }

    #[tokio::test]
    async fn test_route_ignores_garbage() {
        let (router, _rx) = router_with_call(1);
        route(&router, "not json").await;
        route(&router, r#"{"jsonrpc":"2.0","id":77,"result":1}"#).await;
        assert_eq!(router.lock().await.pending.len(), 1);
    }

    /// Accepts one WebSocket client and closes the connection right away.
    async fn closing_server() -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            let _ = ws.close(None).await;
            while let Some(Ok(_)) = ws.next().await {}
        });
        Url::parse(&format!("ws://{addr}")).unwrap()
    }

    #[tokio::test]
    async fn test_request_after_close_fails_fast() {
        let client = WsRpcClient::connect(&closing_server().await).await.unwrap();

        tokio::time::timeout(Duration::from_secs(3), async {
            while !client.router.lock().await.closed {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        let result = tokio::time::timeout(
            Duration::from_secs(3),
            client.request::<Value>("chain_getHeader", json!([])),
        )
        .await
        .unwrap();
        assert!(matches!(result, Err(ClientError::Closed)));

        let subscription = tokio::time::timeout(
            Duration::from_secs(3),
            client.subscribe("events_subscribe", json!([])),
        )
        .await
        .unwrap();
        assert!(matches!(subscription, Err(ClientError::Closed)));
    }

    #[tokio::test]
    async fn test_closed_router_rejects_registration() {
        let (outgoing, _outgoing_rx) = mpsc::unbounded_channel();
        let router = Router {
            closed: true,
            ..Router::default()
        };
        let client = WsRpcClient {
            outgoing,
            router: Arc::new(Mutex::new(router)),
            next_id: AtomicU64::new(1),
            reader: tokio::spawn(async {}),
            writer: tokio::spawn(async {}),
        };

        let (reply, _rx) = oneshot::channel();
        assert!(matches!(
            client.register(Pending::Call(reply)).await,
            Err(ClientError::Closed)
        ));
        assert!(client.router.lock().await.pending.is_empty());
    }
}
