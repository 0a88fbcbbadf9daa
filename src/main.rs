use click_sam::{app::App, config::Config};

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(err) = run() {
        tracing::error!(%err, "fatal");
        std::process::exit(1);
    }
}

fn run() -> click_sam::error::Result<()> {
    let config = Config::load()?;
    App::new(config).run()
}
