//! 主应用程序入口
//!
//! 启动实时投递服务：WebSocket 网关、心跳监控和 PostgreSQL 持久化。

use std::sync::Arc;

use application::{ConnectionRegistry, DeliveryDispatcher, HeartbeatMonitor, Persistence};
use config::AppConfig;
use infrastructure::{
    create_pg_pool, PostgresMessageRepository, PostgresNotificationRepository,
    PostgresUserRepository,
};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 读取环境变量配置
    let config = AppConfig::from_env_with_defaults();
    config.validate()?;

    tracing::info!(
        "连接数据库: {}",
        config.database.url.split('@').next_back().unwrap_or("unknown")
    );

    // 创建 PostgreSQL 连接池
    let pg_pool = Arc::new(
        create_pg_pool(&config.database.url, config.database.max_connections).await?,
    );

    // 运行迁移
    sqlx::migrate!("../../migrations").run(&*pg_pool).await?;

    // 持久化协作方
    let persistence = Persistence {
        messages: Arc::new(PostgresMessageRepository::new(pg_pool.clone())),
        notifications: Arc::new(PostgresNotificationRepository::new(pg_pool.clone())),
        users: Arc::new(PostgresUserRepository::new(pg_pool)),
    };

    // 连接注册表与投递组件
    let registry = Arc::new(ConnectionRegistry::new());
    let dispatcher = DeliveryDispatcher::new(registry.clone());

    // 心跳监控后台任务
    let monitor = HeartbeatMonitor::new(registry.clone(), config.heartbeat.interval());
    tokio::spawn(monitor.run());

    // 启动 Web 服务器
    let state = AppState::new(registry, dispatcher, persistence);
    let app = router(state);
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("实时投递服务启动在 http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
