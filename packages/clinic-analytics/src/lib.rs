//! Clinic Analytics - Biblioteca compartilhada de análise de agendamentos
//!
//! Esta biblioteca fornece:
//! - Primitivas estatísticas (normal acumulada, z-scores, intervalos)
//! - Análise de testes A/B de templates de mensagem de confirmação
//! - Análise de carga diária e mensal da agenda
//! - Otimização de horários e balanceamento entre cadeiras
//!
//! Todas as operações são funções puras sobre registros fornecidos pela
//! camada de dados: não fazem I/O e não guardam estado.

pub mod day_load;
pub mod error;
pub mod models;
pub mod monthly;
pub mod optimizer;
pub mod statistics;

#[cfg(any(test, feature = "test-utils"))]
pub mod fixtures;

pub use ab_test::{analyze as analyze_ab_test, conversion_funnel, sample_size_needed};
pub use day_load::analyze_day;
pub use error::{AnalyticsError, AnalyticsResult};
pub use models::*;
pub use monthly::analyze_month;
pub use optimizer::{analyze_load_balancing, optimize_chair_allocation, suggest_optimal_times};

use serde::{Deserialize, Serialize};
use statistics::{z_beta_for, z_score_for};

/// Parâmetros padrão das análises
///
/// Os analisadores recebem estes valores explicitamente em cada chamada; esta
/// estrutura apenas agrupa os padrões usados pelos serviços da clínica.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Atendimentos comportados por dia
    pub day_capacity: u32,
    /// Nível de confiança dos testes A/B (0.90, 0.95 ou 0.99)
    pub confidence_level: f64,
    /// Poder estatístico para cálculo de amostra (0.80, 0.90 ou 0.95)
    pub statistical_power: f64,
    /// Quantidade de horários sugeridos
    pub suggestion_limit: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            day_capacity: day_load::DEFAULT_DAY_CAPACITY,
            confidence_level: 0.95,
            statistical_power: 0.80,
            suggestion_limit: optimizer::DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

impl AnalyticsConfig {
    /// Verifica se os parâmetros são suportados pelos analisadores
    pub fn validate(&self) -> AnalyticsResult<()> {
        if self.day_capacity == 0 {
            return Err(AnalyticsError::InvalidConfiguration(
                "a capacidade diária deve ser maior que zero".to_string(),
            ));
        }
        if self.suggestion_limit == 0 {
            return Err(AnalyticsError::InvalidConfiguration(
                "o limite de sugestões deve ser maior que zero".to_string(),
            ));
        }
        z_score_for(self.confidence_level)?;
        z_beta_for(self.statistical_power)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalyticsConfig::default();

        assert_eq!(config.day_capacity, 40);
        assert!((config.confidence_level - 0.95).abs() < f64::EPSILON);
        assert_eq!(config.suggestion_limit, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let config = AnalyticsConfig {
            confidence_level: 0.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AnalyticsError::InvalidConfidenceLevel(_))
        ));

        let config = AnalyticsConfig {
            day_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AnalyticsError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_reports_serialize_with_plain_json() {
        let record: AppointmentRecord = serde_json::from_str(
            r#"{"date":"2024-02-29","time":"09:30","status":"no_show","chair":"c1","specialty":"implante"}"#,
        )
        .unwrap();
        assert_eq!(record.status, AppointmentStatus::NoShow);
        assert_eq!(record.hour(), 9);

        let analysis = analyze_day(record.date, &[record.clone()], 40);
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["load_level"], "low");
        assert_eq!(json["day_of_week"], "Thu");
        assert_eq!(json["chair_distribution"]["c1"], 1);

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["time"], "09:30");
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("canceled".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Cancelled));
        assert_eq!("no_show".parse::<AppointmentStatus>(), Ok(AppointmentStatus::NoShow));
        assert_eq!(
            "unknown".parse::<AppointmentStatus>(),
            Err(AnalyticsError::UnknownStatus("unknown".to_string()))
        );
        assert_eq!(AppointmentStatus::Pending.to_string(), "pending");
    }
}
