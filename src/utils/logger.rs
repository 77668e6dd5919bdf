use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// RUST_LOG 優先，未設定時使用預設指令
fn env_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

pub fn init_cli_logger(verbose: bool) {
    let filter = if verbose {
        env_filter("ba_docgen=debug,info")
    } else {
        env_filter("ba_docgen=info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// 代理伺服器：JSON 一行一筆，tower_http 的 TraceLayer 在 debug 層級記錄每個請求
pub fn init_server_logger() {
    let filter = env_filter("ba_docgen=info,docgen_proxy=info,tower_http=debug");

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_span_list(false),
        )
        .init();
}
