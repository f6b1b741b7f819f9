use fieldstock_server::{
    Server, ServerState, init_logger_with_file, print_banner, setup_environment,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境与配置 (.env → Config)
    let config = setup_environment();
    config.ensure_work_dir_structure()?;

    // 2. 日志 (guard 需存活到进程结束)
    let _log_guard = init_logger_with_file(Some(&config.log_level), Some(&config.log_dir));

    print_banner();
    tracing::info!(environment = %config.environment, "Fieldstock server starting...");

    config.validate()?;

    // 3. 初始化服务器状态 (数据库、迁移、super-admin 种子)
    let state = ServerState::initialize(&config).await?;

    // 4. 启动 HTTP 服务器
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
