use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

const DEFAULT_PORT: u16 = 3000;

#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(about = "Runs the bookshelf service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
    #[arg(short = 'p', long = "port", env = "PORT")]
    pub port: Option<u16>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bookshelf")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Clone)]
pub struct App {
    #[serde(default)]
    database: String,
    #[serde(default)]
    auth_token: Option<String>,
    #[serde(default = "default_port")]
    port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl App {
    pub fn get_database(&self) -> &str {
        self.database.trim()
    }

    /// Empty tokens come from `${DB_AUTH_TOKEN:-}` placeholders and count as unset.
    pub fn get_auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: App,
}

impl Config {
    pub fn new(path: &Path) -> Result<Self, ConfigError> {
        let yaml_str = fs::read_to_string(path)?;
        let yaml_with_env = substitute_env_vars(&yaml_str, |name| env::var(name).ok())?;
        Ok(serde_yaml::from_str(&yaml_with_env)?)
    }

    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Config {
            app: App {
                database: env::var("DB").unwrap_or_default(),
                auth_token: env::var("DB_AUTH_TOKEN").ok(),
                port,
            },
        }
    }

    pub fn with_database(database: &str) -> Self {
        Config {
            app: App {
                database: database.to_string(),
                auth_token: None,
                port: DEFAULT_PORT,
            },
        }
    }

    /// Resolves the config source: an explicit file, then the default file if
    /// one exists, then plain environment variables. CLI flags win last.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut cfg = match &cli.config_path {
            Some(path) => Config::new(Path::new(path))?,
            None => {
                let path = default_config_path();
                if path.is_file() {
                    Config::new(&path)?
                } else {
                    Config::from_env()
                }
            }
        };

        if let Some(port) = cli.port {
            cfg.app.port = port;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app.get_database().is_empty() {
            return Err(ConfigError::MissingConnectionString);
        }
        Ok(())
    }
}

/// Expands `${VAR}` and `${VAR:-default}` placeholders using `lookup`.
/// Unset variables without a default expand to an empty string.
pub fn substitute_env_vars<F>(input: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    let mut consumed = 0;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let body = &rest[start + 2..];
        let end = body
            .find('}')
            .ok_or(ConfigError::UnterminatedPlaceholder(consumed + start))?;
        let expr = &body[..end];

        let value = match expr.split_once(":-") {
            Some((name, default)) => lookup(name).unwrap_or_else(|| default.to_string()),
            None => lookup(expr).unwrap_or_else(|| {
                tracing::warn!(variable = expr, "environment variable not found");
                String::new()
            }),
        };
        out.push_str(&value);

        let advance = start + 2 + end + 1;
        consumed += advance;
        rest = &rest[advance..];
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "DB" => Some("file:books.db".to_string()),
            "PORT" => Some("8080".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_substitute_env_vars() {
        let out = substitute_env_vars("db: ${DB}\nport: ${PORT}", lookup).unwrap();
        assert_eq!(out, "db: file:books.db\nport: 8080");
    }

    #[test]
    fn test_substitute_env_vars_default_and_missing() {
        let out = substitute_env_vars("a: ${NOPE:-fallback} b: ${NOPE} c: ${DB:-x}", lookup).unwrap();
        assert_eq!(out, "a: fallback b:  c: file:books.db");
    }

    #[test]
    fn test_substitute_env_vars_unterminated() {
        let err = substitute_env_vars("ok: ${DB} bad: ${OOPS", lookup).unwrap_err();
        assert!(matches!(err, ConfigError::UnterminatedPlaceholder(15)));
    }

    #[test]
    fn test_parse_yaml_config() {
        let yaml = substitute_env_vars(
            "app:\n  database: ${DB}\n  auth_token: ${DB_AUTH_TOKEN:-}\n",
            lookup,
        )
        .unwrap();
        let cfg: Config = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(cfg.app.get_database(), "file:books.db");
        assert_eq!(cfg.app.get_auth_token(), None);
        assert_eq!(cfg.app.get_port(), 3000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_database() {
        let cfg = Config::with_database("   ");
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::MissingConnectionString)
        ));
    }
}
