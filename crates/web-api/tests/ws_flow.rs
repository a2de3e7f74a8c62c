mod support;

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::oneshot, time::timeout};
use tokio_tungstenite::{
    connect_async, tungstenite::Message as TungsteniteMessage, MaybeTlsStream, WebSocketStream,
};

use application::NotificationPayload;
use domain::{NewNotification, NotificationKind, NotificationRepository, UserId};

use support::build_app;

type WsClient = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

async fn start_server(router: axum::Router) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
    });

    (addr, shutdown_tx)
}

async fn connect(addr: SocketAddr) -> WsClient {
    let (ws, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("ws connect");
    ws
}

async fn send_json(ws: &mut WsClient, value: Value) {
    ws.send(TungsteniteMessage::Text(value.to_string().into()))
        .await
        .expect("send frame");
}

/// 读取下一条文本帧并解析为 JSON，心跳帧跳过
async fn recv_json(ws: &mut WsClient) -> Value {
    loop {
        let message = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timeout waiting for frame")
            .expect("stream ended")
            .expect("ws error");
        match message {
            TungsteniteMessage::Text(payload) => {
                return serde_json::from_str(&payload).expect("json")
            }
            TungsteniteMessage::Ping(_) | TungsteniteMessage::Pong(_) => continue,
            other => panic!("unexpected message {other:?}"),
        }
    }
}

async fn authenticate(ws: &mut WsClient, user_id: i64) {
    send_json(ws, json!({"type": "auth", "userId": user_id})).await;
    assert_eq!(
        recv_json(ws).await,
        json!({"type": "auth", "success": true})
    );
}

#[tokio::test]
async fn websocket_auth_flow() {
    let app = build_app().await;
    let registry = app.registry.clone();
    let (addr, shutdown_tx) = start_server(app.router).await;

    let mut ws = connect(addr).await;
    authenticate(&mut ws, 1).await;

    assert!(registry
        .lookup(UserId::new(1).unwrap())
        .await
        .is_some());
    assert!(registry
        .lookup(UserId::new(2).unwrap())
        .await
        .is_none());

    let _ = shutdown_tx.send(());
}

#[tokio::test]
async fn websocket_direct_message_flow() {
    let app = build_app().await;
    let store = app.store.clone();
    let (addr, shutdown_tx) = start_server(app.router).await;

    let mut alice = connect(addr).await;
    let mut bob = connect(addr).await;
    authenticate(&mut alice, 1).await;
    authenticate(&mut bob, 2).await;

    send_json(
        &mut alice,
        json!({"type": "message", "receiverId": 2, "content": "hello"}),
    )
    .await;

    // 发送者收到回显
    let echo = recv_json(&mut alice).await;
    assert_eq!(echo["type"], "message");
    assert_eq!(echo["message"]["content"], "hello");
    assert_eq!(echo["message"]["senderId"], 1);
    assert_eq!(echo["message"]["receiverId"], 2);
    assert_eq!(echo["message"]["sender"]["username"], "alice");

    // 在线的接收者收到同样的推送
    let push = recv_json(&mut bob).await;
    assert_eq!(push, echo);

    // 消息与伴随通知都已落库
    let messages = store.messages().await;
    assert_eq!(messages.len(), 1);
    assert!(!messages[0].read);
    let notifications = store.notifications().await;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].message_id, Some(messages[0].id));

    let _ = shutdown_tx.send(());
}

#[tokio::test]
async fn websocket_offline_receiver_still_persists() {
    let app = build_app().await;
    let store = app.store.clone();
    let (addr, shutdown_tx) = start_server(app.router).await;

    let mut alice = connect(addr).await;
    authenticate(&mut alice, 1).await;

    // 用户 9 不在线，也从未认证过
    send_json(
        &mut alice,
        json!({"type": "message", "receiverId": 9, "content": "anyone?"}),
    )
    .await;

    let echo = recv_json(&mut alice).await;
    assert_eq!(echo["type"], "message");
    assert_eq!(store.messages().await.len(), 1);

    // 紧随其后的帧正常应答，说明离线投递没有产生错误帧
    send_json(&mut alice, json!({"type": "markMessagesRead", "senderId": 9})).await;
    assert_eq!(
        recv_json(&mut alice).await,
        json!({"type": "messagesMarkedRead", "senderId": 9})
    );

    let _ = shutdown_tx.send(());
}

#[tokio::test]
async fn websocket_rejects_frames_before_auth() {
    let app = build_app().await;
    let store = app.store.clone();
    let (addr, shutdown_tx) = start_server(app.router).await;

    let mut ws = connect(addr).await;

    send_json(
        &mut ws,
        json!({"type": "message", "receiverId": 2, "content": "hi"}),
    )
    .await;
    assert_eq!(
        recv_json(&mut ws).await,
        json!({"type": "error", "message": "Authentication required"})
    );

    ws.send(TungsteniteMessage::Text("not json".into()))
        .await
        .expect("send garbage");
    assert_eq!(
        recv_json(&mut ws).await,
        json!({"type": "error", "message": "Invalid message format"})
    );

    // 连接保持打开，认证仍然可用
    authenticate(&mut ws, 1).await;
    assert!(store.messages().await.is_empty());

    let _ = shutdown_tx.send(());
}

#[tokio::test]
async fn websocket_ping_pong_flow() {
    let app = build_app().await;
    let (addr, shutdown_tx) = start_server(app.router).await;

    let mut ws = connect(addr).await;

    let ping_data = b"heartbeat probe";
    ws.send(TungsteniteMessage::Ping(ping_data.to_vec().into()))
        .await
        .expect("send ping");

    let reply = timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timeout waiting for pong")
        .expect("stream ended")
        .expect("ws error");
    match reply {
        TungsteniteMessage::Pong(data) => assert_eq!(data.as_ref(), ping_data),
        other => panic!("expected pong, got {other:?}"),
    }

    let _ = shutdown_tx.send(());
}

#[tokio::test]
async fn websocket_server_side_notification_push() {
    let app = build_app().await;
    let store = app.store.clone();
    let dispatcher = app.dispatcher.clone();
    let (addr, shutdown_tx) = start_server(app.router).await;

    let mut bob = connect(addr).await;
    authenticate(&mut bob, 2).await;

    // 帖子交互处理器会走同样的入口推送点赞通知
    let notification = store
        .create(NewNotification {
            user_id: UserId::new(2).unwrap(),
            kind: NotificationKind::Like,
            actor_id: UserId::new(1).unwrap(),
            post_id: Some(42),
            message_id: None,
        })
        .await
        .expect("create notification");
    dispatcher
        .dispatch_notification(UserId::new(2).unwrap(), NotificationPayload::from(&notification))
        .await;

    let frame = recv_json(&mut bob).await;
    assert_eq!(frame["type"], "notification");
    assert_eq!(frame["notification"]["type"], "like");
    assert_eq!(frame["notification"]["userId"], 2);
    assert_eq!(frame["notification"]["postId"], 42);
    assert_eq!(frame["notification"]["read"], false);

    let _ = shutdown_tx.send(());
}
