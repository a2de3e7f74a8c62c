//! 连接注册表
//!
//! 进程内唯一的共享可变结构：维护"用户ID -> 唯一在线连接"的映射，
//! 以及所有打开的连接（含未认证）供心跳监控遍历。
//! 注册表在启动时构造一次、由组件显式持有，绝不做环境全局变量。

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;
use domain::UserId;

use crate::protocol::ServerFrame;

/// 发往单个连接写任务的命令
///
/// 所有对底层 socket 的写操作都经由命令通道串行化（教科书式的
/// 单写者模式），协议层不直接接触 socket。
#[derive(Debug, Clone, PartialEq)]
pub enum SocketCommand {
    /// 发送一个 JSON 文本帧
    Frame(ServerFrame),
    /// 发送心跳探测
    Ping,
    /// 回应客户端的 Ping
    Pong(Vec<u8>),
    /// 强制关闭连接
    Close,
}

/// 单个连接的轻量句柄
///
/// 克隆共享同一条命令通道和同一组标志位。连接从未认证到已认证
/// 恰好转移一次；`user` 原子槽位只在注册时写入，用于关闭路径上的
/// 比较删除，协议状态本身由 Session 持有。
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: Uuid,
    sender: mpsc::UnboundedSender<SocketCommand>,
    alive: Arc<AtomicBool>,
    user: Arc<AtomicI64>,
}

impl ConnectionHandle {
    /// 创建句柄及其命令接收端（接收端交给 socket 写任务）
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SocketCommand>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = Self {
            id: Uuid::new_v4(),
            sender,
            alive: Arc::new(AtomicBool::new(true)),
            user: Arc::new(AtomicI64::new(0)),
        };
        (handle, receiver)
    }

    /// 连接的临时标识，区分同一用户先后建立的两条连接
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 底层通道是否仍然打开
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// 尽力发送一帧，通道已关闭时返回 false
    pub fn send(&self, frame: ServerFrame) -> bool {
        self.sender.send(SocketCommand::Frame(frame)).is_ok()
    }

    /// 发送心跳探测
    pub fn ping(&self) -> bool {
        self.sender.send(SocketCommand::Ping).is_ok()
    }

    /// 回应客户端 Ping
    pub fn pong(&self, payload: Vec<u8>) -> bool {
        self.sender.send(SocketCommand::Pong(payload)).is_ok()
    }

    /// 强制关闭连接，由写任务发出 Close 帧后退出
    pub fn close(&self) {
        let _ = self.sender.send(SocketCommand::Close);
    }

    /// 探测应答到达，恢复存活标志
    pub fn mark_alive(&self) {
        self.alive.store(true, Ordering::Relaxed);
    }

    /// 清除存活标志，返回清除前的值
    pub fn clear_alive(&self) -> bool {
        self.alive.swap(false, Ordering::Relaxed)
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// 认证后的用户ID（未认证返回 None）
    pub fn user_id(&self) -> Option<UserId> {
        UserId::new(self.user.load(Ordering::Relaxed)).ok()
    }

    fn bind_user(&self, user_id: UserId) {
        self.user.store(user_id.get(), Ordering::Relaxed);
    }
}

#[derive(Default)]
struct RegistryInner {
    /// 所有打开的连接，键为连接ID
    open: HashMap<Uuid, ConnectionHandle>,
    /// 已认证用户到其唯一在线连接的映射
    by_user: HashMap<UserId, ConnectionHandle>,
}

/// 连接注册表
///
/// 任一时刻一个用户ID至多映射到一条连接；同一用户的新认证
/// 直接替换旧条目（旧 socket 不会被强制关闭，只是不再可达）。
/// 所有变更都在同一把锁内完成，注册/注销的比较删除是原子的。
#[derive(Default)]
pub struct ConnectionRegistry {
    inner: RwLock<RegistryInner>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 连接建立时登记，供心跳监控遍历
    pub async fn track(&self, handle: ConnectionHandle) {
        let mut inner = self.inner.write().await;
        inner.open.insert(handle.id(), handle);
    }

    /// 认证成功后建立用户映射，替换同一用户的既有条目
    pub async fn register(&self, user_id: UserId, handle: ConnectionHandle) {
        handle.bind_user(user_id);
        let mut inner = self.inner.write().await;
        if let Some(previous) = inner.by_user.insert(user_id, handle.clone()) {
            if previous.id() != handle.id() {
                tracing::info!(
                    user_id = %user_id,
                    old_connection = %previous.id(),
                    "用户重新认证，旧连接不再接收推送"
                );
            }
        }
    }

    /// 查询用户当前的在线连接
    pub async fn lookup(&self, user_id: UserId) -> Option<ConnectionHandle> {
        let inner = self.inner.read().await;
        inner.by_user.get(&user_id).cloned()
    }

    /// 连接关闭时注销
    ///
    /// 用户映射只在仍指向这条连接时删除，防止迟到的关闭回调
    /// 误删替换它的新连接。
    pub async fn unregister(&self, handle: &ConnectionHandle) {
        let mut inner = self.inner.write().await;
        inner.open.remove(&handle.id());
        if let Some(user_id) = handle.user_id() {
            let still_current = inner
                .by_user
                .get(&user_id)
                .map(|current| current.id() == handle.id())
                .unwrap_or(false);
            if still_current {
                inner.by_user.remove(&user_id);
            }
        }
    }

    /// 当前所有打开的连接快照，供心跳遍历
    pub async fn open_connections(&self) -> Vec<ConnectionHandle> {
        let inner = self.inner.read().await;
        inner.open.values().cloned().collect()
    }
}
