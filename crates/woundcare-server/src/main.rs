use std::process::ExitCode;

use woundcare_server::ServerBuilder;
use woundcare_server::config::loader::{DEFAULT_CONFIG_FILE, load_config};
use woundcare_server::observability;

/// Exit status for configuration and start-up failures.
const EXIT_BAD_CONFIG: u8 = 2;

const CONFIG_ENV: &str = "WOUNDCARE_CONFIG";

/// Where the config file path came from.
#[derive(Debug, PartialEq, Eq)]
enum ConfigSource {
    Flag(String),
    Env(String),
    Default,
}

impl ConfigSource {
    /// `--config <path>` or `--config=<path>` wins over the environment,
    /// which wins over `woundcare.toml`.
    fn resolve(args: impl IntoIterator<Item = String>, env_path: Option<String>) -> Self {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if let Some(path) = arg.strip_prefix("--config=") {
                return Self::Flag(path.to_string());
            }
            if arg == "--config" {
                if let Some(path) = args.next() {
                    return Self::Flag(path);
                }
            }
        }
        match env_path.filter(|p| !p.is_empty()) {
            Some(path) => Self::Env(path),
            None => Self::Default,
        }
    }

    fn path(&self) -> &str {
        match self {
            Self::Flag(path) | Self::Env(path) => path,
            Self::Default => DEFAULT_CONFIG_FILE,
        }
    }

    fn origin(&self) -> &'static str {
        match self {
            Self::Flag(_) => "--config",
            Self::Env(_) => CONFIG_ENV,
            Self::Default => "default",
        }
    }
}

fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => eprintln!("Ignoring unreadable .env file: {e}"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    load_dotenv();
    observability::init_tracing();

    let source = ConfigSource::resolve(std::env::args().skip(1), std::env::var(CONFIG_ENV).ok());
    let cfg = match load_config(Some(source.path())) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Invalid configuration in {}: {e}", source.path());
            return ExitCode::from(EXIT_BAD_CONFIG);
        }
    };
    tracing::info!(path = source.path(), from = source.origin(), "Configuration loaded");

    observability::apply_logging_level(&cfg.logging.level);

    let server = match ServerBuilder::new().with_config(cfg).build() {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Woundcare server failed to start: {e:#}");
            return ExitCode::from(EXIT_BAD_CONFIG);
        }
    };

    match server.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server stopped with an error");
            ExitCode::FAILURE
        }
    }
}
