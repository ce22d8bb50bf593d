//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use crate::proposal::BudgetLimits;
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse {key}: '{value}'")]
    ParseError { key: String, value: String },
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0),
            port: 3000,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3001".to_string()],
        }
    }
}

/// Workflow and compliance configuration
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Fiscal year new proposals default to
    pub fiscal_year: i32,
    pub limits: BudgetLimits,
    /// Optional JSON file with additional or replacement rulesets
    pub rulesets_path: Option<PathBuf>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            fiscal_year: 2026,
            limits: BudgetLimits::default(),
            rulesets_path: None,
        }
    }
}

/// Complete application settings
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub workflow: WorkflowConfig,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server = ServerConfig {
            host: parse_or(get("HOST"), "HOST", defaults.server.host)?,
            port: parse_or(get("PORT"), "PORT", defaults.server.port)?,
        };

        let cors = CorsConfig {
            allowed_origins: get("ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors.allowed_origins),
        };

        let fiscal_year = parse_or(
            get("RKAT_FISCAL_YEAR"),
            "RKAT_FISCAL_YEAR",
            defaults.workflow.fiscal_year,
        )?;
        if !(2000..=2100).contains(&fiscal_year) {
            return Err(ConfigError::InvalidValue {
                key: "RKAT_FISCAL_YEAR".to_string(),
                message: "must be between 2000 and 2100".to_string(),
            });
        }

        let previous_year_benefit_value = get("PREVIOUS_YEAR_BENEFIT_VALUE")
            .map(|v| parse::<f64>(&v, "PREVIOUS_YEAR_BENEFIT_VALUE"))
            .transpose()?;
        if previous_year_benefit_value.is_some_and(|v| !v.is_finite() || v < 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "PREVIOUS_YEAR_BENEFIT_VALUE".to_string(),
                message: "must be a finite, non-negative amount".to_string(),
            });
        }

        let max_operational_ratio = parse_or(
            get("MAX_OPERATIONAL_RATIO"),
            "MAX_OPERATIONAL_RATIO",
            defaults.workflow.limits.max_operational_ratio,
        )?;
        if !(max_operational_ratio > 0.0 && max_operational_ratio <= 1.0) {
            return Err(ConfigError::InvalidValue {
                key: "MAX_OPERATIONAL_RATIO".to_string(),
                message: "must be in (0, 1]".to_string(),
            });
        }

        let workflow = WorkflowConfig {
            fiscal_year,
            limits: BudgetLimits {
                previous_year_benefit_value,
                max_operational_ratio,
            },
            rulesets_path: get("RULESETS_PATH").map(PathBuf::from),
        };

        Ok(Self {
            server,
            cors,
            workflow,
        })
    }

    /// Get the server address string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse<T: FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::ParseError {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T, ConfigError> {
    match value {
        Some(v) => parse(&v, key),
        None => Ok(default),
    }
}
