//! Slow Roads launcher
//!
//! With the `web` feature this is the launcher page. Natively it is the shell
//! exporter: `slow-roads-launcher export` writes the offline shell files,
//! `slow-roads-launcher check` preflights them.

#[cfg(not(any(feature = "export", feature = "web")))]
compile_error!("enable the `export` or `web` feature");

#[cfg(all(feature = "export", not(feature = "web")))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use slow_roads_launcher::{config, export};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slow_roads_launcher=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Slow Roads launcher v{} ({})",
        slow_roads_launcher::VERSION,
        slow_roads_launcher::GIT_SHA
    );

    let config = config::load_config()?;
    tracing::info!("Configuration loaded, output: {}", config.out_dir.display());

    let command = std::env::args().nth(1).unwrap_or_else(|| "export".to_string());
    match command.as_str() {
        "export" => {
            let report = export::export(&config).await?;
            println!("{}", report.cache_name);
        }
        "check" => {
            let report = export::check(&config).await?;
            println!(
                "{}: {} assets cached, {} stale caches removed",
                report.cache_name,
                report.cached,
                report.deleted.len()
            );
        }
        other => {
            anyhow::bail!("unknown command {:?} (expected export or check)", other);
        }
    }

    Ok(())
}

#[cfg(feature = "web")]
fn main() {
    dioxus::launch(slow_roads_launcher::app::App);
}
