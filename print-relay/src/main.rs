use anyhow::Context;
use crab_printer::DeviceProfile;
use print_relay::api::{AppState, build_app};
use print_relay::{Config, logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (.env) and logging
    dotenv::dotenv().ok();
    let config = Config::from_env();
    logger::init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    tracing::info!("Print relay starting...");

    // 2. Fail fast on a profile the driver does not know
    DeviceProfile::by_name(&config.printer_profile)?;

    // 3. Server state and routes
    let addr = config.http_addr();
    tracing::info!(
        printer = %format!("{}:{}", config.printer_ip, config.printer_port),
        profile = %config.printer_profile,
        "Default printer"
    );
    let state = AppState::new(config)?;
    let app = build_app(state);

    // 4. Serve
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Cannot bind {}", addr))?;
    tracing::info!("Listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
