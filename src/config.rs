//! Runtime configuration from the environment (and `.env` via dotenvy).

use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::{anyhow, Context};
use rust_decimal::Decimal;

use crate::booking::FeePolicy;

/// How checkout settles payment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMode {
    /// No processor configured: checkout confirms bookings immediately
    Simulation,
    /// Checkout returns a quote; the client pays the external processor and
    /// then calls the confirm endpoint with its payment reference
    External,
}

impl FromStr for PaymentMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulation" => Ok(PaymentMode::Simulation),
            "external" => Ok(PaymentMode::External),
            other => Err(anyhow!("unknown payment mode '{}'", other)),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub fees: FeePolicy,
    pub payment_mode: PaymentMode,
    pub cors_allow_any: bool,
}

impl Config {
    /// Load configuration from process environment, reading `.env` first
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = get("DATABASE_URL").context("DATABASE_URL must be set")?;

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("BIND_ADDR must be a socket address")?;

        let max_connections = get("DATABASE_MAX_CONNECTIONS")
            .map(|v| v.parse::<u32>())
            .transpose()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?
            .unwrap_or(10);

        let fee_rate = get("PLATFORM_FEE_RATE")
            .map(|v| v.trim().parse::<Decimal>())
            .transpose()
            .context("PLATFORM_FEE_RATE must be a decimal such as 0.12")?
            .unwrap_or(FeePolicy::DEFAULT_RATE);
        let fees = FeePolicy::new(fee_rate)?;

        let payment_mode = get("PAYMENT_MODE")
            .map(|v| v.parse::<PaymentMode>())
            .transpose()?
            .unwrap_or(PaymentMode::Simulation);

        let cors_allow_any = get("CORS_ALLOW_ANY")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
            fees,
            payment_mode,
            cors_allow_any,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/nestora")]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.fees.rate(), dec!(0.12));
        assert_eq!(config.payment_mode, PaymentMode::Simulation);
        assert!(!config.cors_allow_any);
    }

    #[test]
    fn test_database_url_is_required() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://db/nestora"),
            ("BIND_ADDR", "127.0.0.1:3000"),
            ("DATABASE_MAX_CONNECTIONS", "25"),
            ("PLATFORM_FEE_RATE", "0.15"),
            ("PAYMENT_MODE", "External"),
            ("CORS_ALLOW_ANY", "true"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.max_connections, 25);
        assert_eq!(config.fees.rate(), dec!(0.15));
        assert_eq!(config.payment_mode, PaymentMode::External);
        assert!(config.cors_allow_any);
    }

    #[test]
    fn test_fee_rate_out_of_range_fails() {
        let result = load(&[("DATABASE_URL", "x"), ("PLATFORM_FEE_RATE", "1.5")]);
        assert!(result.is_err());
        let result = load(&[("DATABASE_URL", "x"), ("PLATFORM_FEE_RATE", "twelve")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_payment_mode_fails() {
        let result = load(&[("DATABASE_URL", "x"), ("PAYMENT_MODE", "stripe")]);
        assert!(result.is_err());
    }
}
