use erp_engine::api::{AppState, create_router};
use erp_engine::config::{ConfigLoader, ServerSettings};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    init_logging();

    let settings = match ServerSettings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "settings error");
            std::process::exit(1);
        }
    };

    let config = match ConfigLoader::load(&settings.config_dir) {
        Ok(c) => c,
        Err(e) => {
            error!(
                error = %e,
                config_dir = %settings.config_dir.display(),
                "config error"
            );
            std::process::exit(1);
        }
    };

    let bind_addr = settings.bind_addr();
    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(error = %e, bind_addr = %bind_addr, "server bind error");
            std::process::exit(1);
        }
    };

    info!(
        institution = %config.institution().code,
        academic_year = %config.institution().academic_year,
        policies = config.policies().len(),
        host = %settings.api_host,
        port = settings.api_port,
        "erp-engine started"
    );

    let app = create_router(AppState::new(config));
    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server runtime error");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
