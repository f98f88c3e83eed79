//! the `serve` subcommand - runs the rule management server.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;
use color_eyre::eyre::{Context, Result};
use rampart_db::RampartDb;
use rampart_types::Config;
use tokio::net::TcpListener;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

use super::parse_database_url;

/// default config file search paths (in order of priority).
const CONFIG_SEARCH_PATHS: &[&str] = &[
    "/etc/rampart/config.toml",
    "~/.config/rampart/config.toml",
    "./config.toml",
];

/// run the rampart rule management server
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// path to config file (toml format)
    #[arg(short, long, env = "RAMPART_CONFIG")]
    config: Option<PathBuf>,

    /// database url (sqlite:// or postgres://)
    #[arg(long, env = "RAMPART_DATABASE_URL")]
    database_url: Option<String>,

    /// address to listen on
    #[arg(long, env = "RAMPART_LISTEN_ADDR")]
    listen_addr: Option<String>,

    /// log level
    #[arg(long, env = "RAMPART_LOG_LEVEL")]
    log_level: Option<String>,
}

impl ServeCommand {
    /// find and load config file, returning none if no config file is found.
    fn load_config_file(config_path: Option<&PathBuf>) -> Result<Option<Config>> {
        // if explicit path provided, it must exist
        if let Some(path) = config_path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file: {:?}", path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("failed to parse config file: {:?}", path))?;
            return Ok(Some(config));
        }

        // search default paths
        for path_str in CONFIG_SEARCH_PATHS {
            let path = expand_tilde(path_str);
            if path.exists() {
                debug!("Found config file at {:?}", path);
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config file: {:?}", path))?;
                let config: Config = toml::from_str(&content)
                    .with_context(|| format!("failed to parse config file: {:?}", path))?;
                return Ok(Some(config));
            }
        }

        Ok(None)
    }

    /// convert cli arguments into a config struct, merging with config file if present.
    ///
    /// priority order: defaults -> config file -> cli flags
    fn into_config(self) -> Result<Config> {
        // start with defaults, then overlay config file if found
        let mut config = match Self::load_config_file(self.config.as_ref())? {
            Some(file_config) => {
                info!("Loaded configuration from file");
                file_config
            }
            None => {
                debug!("No config file found, using defaults");
                Config::default()
            }
        };

        // cli overrides (only if explicitly set)
        if let Some(db_url) = self.database_url {
            config.database = parse_database_url(&db_url)?;
        }
        if let Some(listen_addr) = self.listen_addr {
            config.listen_addr = listen_addr;
        }

        Ok(config)
    }

    /// run the serve command
    pub async fn run(self) -> Result<()> {
        // initialize logging (use CLI override or default to info)
        let log_level_str = self.log_level.clone().unwrap_or_else(|| "info".to_string());
        let log_level = match log_level_str.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
        tracing::subscriber::set_global_default(subscriber)?;

        info!("Starting rampart...");

        // load configuration
        let config = self.into_config()?;
        info!("Database: {}", config.database.connection_string);
        info!("Listen address: {}", config.listen_addr);

        // ensure parent directory exists for sqlite databases
        if config.database.db_type == "sqlite" {
            let db_path = std::path::Path::new(&config.database.connection_string);
            if let Some(parent) = db_path.parent()
                && !parent.exists()
            {
                info!("Creating database directory: {:?}", parent);
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create database directory: {:?}", parent)
                })?;
            }
        }

        // initialize database (runs migrations on connect)
        let db = RampartDb::new(&config)
            .await
            .context("failed to initialize database")?;

        info!("Database initialized successfully");

        let app = crate::create_app(db, config.clone());

        // parse listen address
        let addr: SocketAddr = config
            .listen_addr
            .parse()
            .context("invalid listen address")?;

        info!("Starting HTTP server on {}", addr);

        // start server
        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")?;

        info!("Shutdown complete");

        Ok(())
    }
}

/// resolve when SIGTERM or ctrl-c is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to register ctrl-c handler: {}", e);
            // never resolve; resolving here would shut the server down
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                let _ = sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to register SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl-c, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

/// expand a leading `~/` to the user's home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_toml_file() {
        let toml_content = r#"
listen_addr = "0.0.0.0:9090"

[database]
db_type = "sqlite"
connection_string = "/var/lib/rampart/db.sqlite"

[database.sqlite]
write_ahead_log = false
"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();
        file.flush().unwrap();

        let config = ServeCommand::load_config_file(Some(&file.path().to_path_buf()))
            .unwrap()
            .expect("config should be loaded");

        assert_eq!(config.listen_addr, "0.0.0.0:9090");
        assert_eq!(config.database.db_type, "sqlite");
        assert_eq!(
            config.database.connection_string,
            "/var/lib/rampart/db.sqlite"
        );
        assert!(!config.database.sqlite.write_ahead_log);
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let toml_content = r#"
listen_addr = "0.0.0.0:443"

[database]
db_type = "sqlite"
connection_string = "/var/lib/rampart/db.sqlite"
"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();
        file.flush().unwrap();

        // create command with CLI overrides
        let cmd = ServeCommand {
            config: Some(file.path().to_path_buf()),
            database_url: Some("sqlite:///tmp/override.db".to_string()),
            listen_addr: Some("127.0.0.1:8080".to_string()),
            log_level: None,
        };

        let config = cmd.into_config().unwrap();

        // cli overrides should win
        assert_eq!(config.database.connection_string, "/tmp/override.db");
        assert_eq!(config.listen_addr, "127.0.0.1:8080");

        // config file values should be preserved when not overridden
        assert!(config.database.sqlite.write_ahead_log);
    }

    #[test]
    fn test_no_config_file_uses_defaults() {
        // when no config file, into_config should use defaults
        let cmd = ServeCommand {
            config: None,
            database_url: None,
            listen_addr: None,
            log_level: None,
        };

        let config = cmd.into_config().unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.database.db_type, "sqlite");
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/etc/rampart/config.toml"), PathBuf::from("/etc/rampart/config.toml"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_tilde("~/.config/rampart/config.toml"),
                home.join(".config/rampart/config.toml")
            );
        }
    }
}
