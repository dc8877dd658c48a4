//! aishe: interactive console for the AISHE question-answering server.
//! Checks server health, then reads questions from stdin and prints answers
//! with their sources until `quit`, end of input, or Ctrl+C.

use aishe_client::{config, Client, Session};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolves on Ctrl+C. If the handler cannot be installed, never resolves.
async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

fn main() -> ExitCode {
    init_tracing();

    let cfg = match config::resolve_config_path() {
        Some(path) => match config::load_or_default(&path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: failed to load config from {}: {}", path.display(), e);
                return ExitCode::from(1);
            }
        },
        None => config::Config::default(),
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create runtime: {}", e);
            return ExitCode::from(1);
        }
    };

    let code = rt.block_on(async {
        let mut client = match Client::new(cfg.endpoint()) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        };

        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let exit = Session::new(&client, std::io::stdout())
            .run(stdin, interrupt())
            .await;
        client.close();
        tracing::debug!(?exit, "session ended");
        exit.code()
    });

    // A pending stdin read cannot be cancelled; don't wait for it.
    rt.shutdown_timeout(Duration::from_millis(100));
    ExitCode::from(code)
}
