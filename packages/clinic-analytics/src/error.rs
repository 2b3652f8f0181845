//! Definições de erro para a biblioteca clinic-analytics
//!
//! Este módulo define os tipos de erro usados pelos analisadores. Condições
//! recuperáveis (divisão por zero, conjunto vazio) não viram erro: os
//! analisadores devolvem um relatório neutro. Os erros abaixo indicam entrada
//! estruturalmente inválida, ou seja, bug do chamador.

use thiserror::Error;

/// Erros específicos das análises de agenda e testes A/B
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Dados inválidos no template: {0}")]
    InvalidArmData(String),

    #[error("Nível de confiança não suportado: {0} (use 0.90, 0.95 ou 0.99)")]
    InvalidConfidenceLevel(f64),

    #[error("Poder estatístico não suportado: {0} (use 0.80, 0.90 ou 0.95)")]
    InvalidPowerLevel(f64),

    #[error("Efeito mínimo detectável inválido: {0}")]
    InvalidEffectSize(String),

    #[error("Período inválido: mês {month} de {year}")]
    InvalidPeriod { month: u32, year: i32 },

    #[error("Status de agendamento desconhecido: {0}")]
    UnknownStatus(String),

    #[error("Configuração inválida: {0}")]
    InvalidConfiguration(String),

    #[error("Conjunto de entrada vazio: {0}")]
    EmptyInputSet(String),
}

/// Resultado padrão das operações da biblioteca
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AnalyticsError::InvalidConfidenceLevel(0.42);
        assert!(err.to_string().contains("0.42"));

        let err = AnalyticsError::InvalidPeriod { month: 13, year: 2024 };
        assert_eq!(err.to_string(), "Período inválido: mês 13 de 2024");

        let err = AnalyticsError::UnknownStatus("remarcado".to_string());
        assert_eq!(err.to_string(), "Status de agendamento desconhecido: remarcado");
    }
}
