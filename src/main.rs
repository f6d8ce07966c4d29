use std::io::Write;
use std::process::ExitCode;

use ads_oauth::{FlowConfig, PromptCredentialSource, RefreshTokenFlow, SystemBrowser};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Google OAuth refresh token generator for the Ads and Sheets APIs.
///
/// Opens the consent screen in a browser, captures the redirect on
/// http://localhost:8080 and prints a refresh token for your .env file.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// OAuth client ID (prompted for when not set)
    #[arg(long, env = "GOOGLE_ADS_CLIENT_ID", hide_env_values = true)]
    client_id: Option<String>,

    /// OAuth client secret (prompted for when not set)
    #[arg(long, env = "GOOGLE_ADS_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Print the authorization URL without launching a browser
    #[arg(long)]
    no_browser: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false),
        )
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let config = FlowConfig {
        open_browser: !args.no_browser,
        ..FlowConfig::default()
    };
    let credentials = PromptCredentialSource::terminal(args.client_id, args.client_secret);
    let mut flow = RefreshTokenFlow::new(config, credentials, SystemBrowser);

    let result = flow.run(&mut std::io::stdout(), &mut std::io::stderr()).await;
    exit_status(result, &mut std::io::stderr())
}

/// Report a failed run on `stderr`; every error is terminal and exits 1.
fn exit_status<W: Write>(result: ads_oauth::Result<String>, stderr: &mut W) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "refresh token flow failed");
            let _ = writeln!(stderr, "\nError: {}", e);
            ExitCode::FAILURE
        }
    }
}
