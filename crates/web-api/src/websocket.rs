//! WebSocket 连接处理
//!
//! 每条连接拆成两半：发送任务串行消费命令通道，统一所有对
//! socket sender 的写操作；接收循环把文本帧交给协议会话，
//! 把 Pong 记到存活标志上。

use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures_util::{SinkExt, StreamExt};

use application::{ConnectionHandle, Session, SocketCommand};

use crate::state::AppState;

pub async fn handle_socket(socket: WebSocket, state: AppState) {
    let (handle, mut commands) = ConnectionHandle::new();
    state.registry.track(handle.clone()).await;
    tracing::info!(connection = %handle.id(), "WebSocket 连接已建立");

    let mut session = Session::new(
        handle.clone(),
        state.registry.clone(),
        state.dispatcher.clone(),
        state.persistence.clone(),
    );

    let (mut sender, mut incoming) = socket.split();

    // 发送任务：命令通道是 socket sender 的唯一写入方
    let send_task = tokio::spawn(async move {
        while let Some(command) = commands.recv().await {
            match command {
                SocketCommand::Frame(frame) => {
                    let payload = match serde_json::to_string(&frame) {
                        Ok(json) => json,
                        Err(err) => {
                            tracing::warn!(error = %err, "出站帧序列化失败");
                            continue;
                        }
                    };
                    if sender.send(WsMessage::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                SocketCommand::Ping => {
                    if sender.send(WsMessage::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
                SocketCommand::Pong(data) => {
                    if sender.send(WsMessage::Pong(data.into())).await.is_err() {
                        break;
                    }
                }
                SocketCommand::Close => {
                    let _ = sender.send(WsMessage::Close(None)).await;
                    break;
                }
            }
        }
        tracing::debug!("WebSocket发送任务结束");
    });

    // 接收循环：协议帧按到达顺序串行处理
    while let Some(Ok(message)) = incoming.next().await {
        match message {
            WsMessage::Text(text) => session.handle_text(text.as_str()).await,
            WsMessage::Pong(_) => handle.mark_alive(),
            WsMessage::Ping(data) => {
                handle.pong(data.to_vec());
            }
            WsMessage::Close(_) => break,
            WsMessage::Binary(_) => {
                tracing::debug!(connection = %handle.id(), "忽略二进制帧");
            }
        }
    }

    // 清理注册表条目并关闭发送任务
    session.close().await;
    handle.close();
    let _ = send_task.await;
    tracing::info!(connection = %handle.id(), "WebSocket 连接已断开");
}
