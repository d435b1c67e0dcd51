//! Parley CLI and REST API entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, initializes tracing and application state,
//! then dispatches to the serve loop, the interactive chat, or shell
//! completion generation.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use parley_types::persona::Persona;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need state or logging
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "parley", &mut std::io::stdout());
        return Ok(());
    }

    // Verbosity flags feed the default filter; RUST_LOG still wins.
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn,parley=info",
        1 => "info,parley=debug",
        _ => "trace",
    };
    if std::env::var(EnvFilter::DEFAULT_ENV).is_err() {
        // SAFETY: set before any threads beyond the runtime are spawned
        // and never modified again.
        unsafe { std::env::set_var(EnvFilter::DEFAULT_ENV, filter) };
    }

    let enable_otel = matches!(&cli.command, Commands::Serve { otel: true, .. });
    parley_observe::tracing_setup::init_tracing(enable_otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Initialize application state; a missing credential or persona
    // template aborts here, before any traffic is served.
    let state = AppState::init(&cli.config).await?;

    match cli.command {
        Commands::Serve { host, port, .. } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Parley listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            parley_observe::tracing_setup::shutdown_tracing();
            println!("\n  Server stopped.");
        }

        Commands::Chat { name, gender, age } => {
            let persona = Persona {
                user_age: age,
                bot_gender: gender,
                bot_name: name,
            };
            cli::chat::run_chat_loop(&state, persona).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
