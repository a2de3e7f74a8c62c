//! 心跳监控
//!
//! 交替式心跳：每个周期先检查上一轮的探测是否得到应答，
//! 没有应答的连接被强制终止；有应答的清掉存活标志再发下一个探测。
//! 不维护漏拍计数，连续两个周期没有应答即被判定失联。

use std::sync::Arc;
use std::time::Duration;

use crate::registry::ConnectionRegistry;

/// 心跳监控器
pub struct HeartbeatMonitor {
    registry: Arc<ConnectionRegistry>,
    interval: Duration,
}

impl HeartbeatMonitor {
    pub fn new(registry: Arc<ConnectionRegistry>, interval: Duration) -> Self {
        Self { registry, interval }
    }

    /// 周期性扫描所有打开的连接，直到进程退出
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        // 第一次 tick 立即返回，跳过以免刚建立的连接没机会应答
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = self.sweep().await;
            if evicted > 0 {
                tracing::info!(evicted, "心跳扫描移除了失联连接");
            }
        }
    }

    /// 单轮扫描，返回被终止的连接数
    ///
    /// 失联连接除了发 Close 命令外还立即从注册表比较删除：
    /// 对端 socket 可能已经死透，不能指望它的关闭路径来清理。
    pub async fn sweep(&self) -> usize {
        let mut evicted = 0;
        for handle in self.registry.open_connections().await {
            if !handle.is_alive() {
                tracing::warn!(connection = %handle.id(), "连接未应答心跳探测，强制终止");
                handle.close();
                self.registry.unregister(&handle).await;
                evicted += 1;
                continue;
            }

            handle.clear_alive();
            handle.ping();
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ConnectionHandle, SocketCommand};
    use domain::UserId;

    fn monitor(registry: &Arc<ConnectionRegistry>) -> HeartbeatMonitor {
        HeartbeatMonitor::new(registry.clone(), Duration::from_secs(30))
    }

    #[tokio::test]
    async fn test_unresponsive_connection_is_evicted_after_two_sweeps() {
        let registry = Arc::new(ConnectionRegistry::new());
        let monitor = monitor(&registry);
        let (handle, mut rx) = ConnectionHandle::new();
        let user = UserId::new(1).unwrap();
        registry.track(handle.clone()).await;
        registry.register(user, handle.clone()).await;

        // 第一轮：存活标志还在，只清除并发出探测
        assert_eq!(monitor.sweep().await, 0);
        assert_eq!(rx.recv().await, Some(SocketCommand::Ping));

        // 客户端不应答，第二轮被终止并从注册表移除
        assert_eq!(monitor.sweep().await, 1);
        assert_eq!(rx.recv().await, Some(SocketCommand::Close));
        assert!(registry.lookup(user).await.is_none());
        assert!(registry.open_connections().await.is_empty());
    }

    #[tokio::test]
    async fn test_responsive_connection_is_never_evicted() {
        let registry = Arc::new(ConnectionRegistry::new());
        let monitor = monitor(&registry);
        let (handle, mut rx) = ConnectionHandle::new();
        let user = UserId::new(2).unwrap();
        registry.track(handle.clone()).await;
        registry.register(user, handle.clone()).await;

        for _ in 0..5 {
            assert_eq!(monitor.sweep().await, 0);
            assert_eq!(rx.recv().await, Some(SocketCommand::Ping));
            // 模拟客户端的探测应答
            handle.mark_alive();
        }

        assert!(registry.lookup(user).await.is_some());
    }

    #[tokio::test]
    async fn test_sweep_only_touches_tracked_connections() {
        let registry = Arc::new(ConnectionRegistry::new());
        let monitor = monitor(&registry);
        assert_eq!(monitor.sweep().await, 0);
    }
}
