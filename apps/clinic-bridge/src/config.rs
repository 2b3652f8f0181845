//! Configuração do serviço via variáveis de ambiente

use std::net::SocketAddr;

use anyhow::{bail, Context, Result};
use clinic_analytics::AnalyticsConfig;

/// Formato dos logs emitidos pelo serviço
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Texto legível para desenvolvimento
    Pretty,
    /// Uma linha JSON por evento, para coleta centralizada
    Json,
}

/// Configuração do clinic-bridge
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Endereço HTTP de escuta
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
    /// Requisições processadas simultaneamente
    pub max_concurrent_requests: usize,
    /// Padrões usados quando a requisição não informa o parâmetro
    pub analytics: AnalyticsConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_format: LogFormat::Pretty,
            max_concurrent_requests: 64,
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Carrega a configuração das variáveis de ambiente do processo
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Carrega a configuração a partir de uma função de consulta de variáveis
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup("BRIDGE_ADDR") {
            config.bind_addr = raw
                .trim()
                .parse()
                .with_context(|| format!("BRIDGE_ADDR inválido: {}", raw))?;
        }

        if let Some(raw) = lookup("LOG_FORMAT") {
            config.log_format = match raw.trim().to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" | "text" => LogFormat::Pretty,
                other => bail!("LOG_FORMAT inválido: {} (use json ou pretty)", other),
            };
        }

        if let Some(raw) = lookup("MAX_CONCURRENT_REQUESTS") {
            config.max_concurrent_requests = raw
                .trim()
                .parse()
                .with_context(|| format!("MAX_CONCURRENT_REQUESTS inválido: {}", raw))?;
            if config.max_concurrent_requests == 0 {
                bail!("MAX_CONCURRENT_REQUESTS deve ser maior que zero");
            }
        }

        if let Some(raw) = lookup("DEFAULT_DAY_CAPACITY") {
            config.analytics.day_capacity = raw
                .trim()
                .parse()
                .with_context(|| format!("DEFAULT_DAY_CAPACITY inválido: {}", raw))?;
        }

        if let Some(raw) = lookup("DEFAULT_CONFIDENCE_LEVEL") {
            config.analytics.confidence_level = raw
                .trim()
                .parse()
                .with_context(|| format!("DEFAULT_CONFIDENCE_LEVEL inválido: {}", raw))?;
        }

        config
            .analytics
            .validate()
            .context("Parâmetros de análise inválidos")?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = BridgeConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.analytics, AnalyticsConfig::default());
    }

    #[test]
    fn test_variables_override_defaults() {
        let config = BridgeConfig::from_lookup(lookup_from(&[
            ("BRIDGE_ADDR", "127.0.0.1:9000"),
            ("LOG_FORMAT", "JSON"),
            ("MAX_CONCURRENT_REQUESTS", "8"),
            ("DEFAULT_DAY_CAPACITY", "32"),
            ("DEFAULT_CONFIDENCE_LEVEL", "0.99"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.max_concurrent_requests, 8);
        assert_eq!(config.analytics.day_capacity, 32);
        assert_eq!(config.analytics.confidence_level, 0.99);
    }

    #[test]
    fn test_invalid_values_fail_startup() {
        assert!(BridgeConfig::from_lookup(lookup_from(&[("BRIDGE_ADDR", "porta")])).is_err());
        assert!(BridgeConfig::from_lookup(lookup_from(&[("LOG_FORMAT", "xml")])).is_err());
        assert!(
            BridgeConfig::from_lookup(lookup_from(&[("DEFAULT_CONFIDENCE_LEVEL", "0.5")])).is_err()
        );
        assert!(BridgeConfig::from_lookup(lookup_from(&[("DEFAULT_DAY_CAPACITY", "0")])).is_err());
    }
}
