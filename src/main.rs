use std::env;

use tracing::error;

#[tokio::main]
async fn main() {
    kratos_sim::telemetry::init_logging();

    let raw_args: Vec<String> = env::args().collect();
    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        let port = raw_args
            .get(2)
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        if let Err(e) = kratos_sim::api::run_http_server(port).await {
            error!(error = %e, "server error");
            std::process::exit(1);
        }
        return;
    }

    if let Err(msg) = kratos_sim::api::run_cli(raw_args) {
        error!("{msg}");
        std::process::exit(2);
    }
}
