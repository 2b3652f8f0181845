//! Primitivas estatísticas
//!
//! Distribuição normal, tabelas fixas de z-score e fórmulas de desvio padrão
//! e intervalo de confiança usadas pelo analisador de testes A/B e pelo
//! otimizador de agenda.

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::ConfidenceInterval;

/// Níveis de confiança suportados e seus z-scores bicaudais
const CONFIDENCE_Z_SCORES: [(f64, f64); 3] = [(0.90, 1.645), (0.95, 1.96), (0.99, 2.576)];

/// Poder estatístico suportado e o z_beta correspondente
const POWER_Z_SCORES: [(f64, f64); 3] = [(0.80, 0.84), (0.90, 1.28), (0.95, 1.645)];

/// Tolerância para comparar níveis informados pelo chamador
const LEVEL_TOLERANCE: f64 = 1e-9;

/// Função de distribuição acumulada da normal padrão
///
/// Usa a aproximação racional de Abramowitz-Stegun (7.1.26) para a função
/// erro. Erro absoluto abaixo de 1e-7; simétrica em torno de zero.
pub fn normal_cdf(z: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if z < 0.0 { -1.0 } else { 1.0 };
    let x = z.abs() / std::f64::consts::SQRT_2;

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();

    0.5 * (1.0 + sign * y)
}

/// z-score bicaudal para o nível de confiança (0.90, 0.95 ou 0.99)
pub fn z_score_for(confidence_level: f64) -> AnalyticsResult<f64> {
    lookup(&CONFIDENCE_Z_SCORES, confidence_level)
        .ok_or(AnalyticsError::InvalidConfidenceLevel(confidence_level))
}

/// z_beta para o poder estatístico desejado (0.80, 0.90 ou 0.95)
pub fn z_beta_for(power: f64) -> AnalyticsResult<f64> {
    lookup(&POWER_Z_SCORES, power).ok_or(AnalyticsError::InvalidPowerLevel(power))
}

fn lookup(table: &[(f64, f64)], level: f64) -> Option<f64> {
    table
        .iter()
        .find(|(known, _)| (known - level).abs() < LEVEL_TOLERANCE)
        .map(|(_, z)| *z)
}

/// Desvio padrão de uma taxa (em %), em pontos percentuais
///
/// `sqrt(p(1−p)/n) × 100` com `p = rate/100`. Zero quando `n = 0`.
pub fn standard_deviation(rate: f64, n: u64) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = clamp_rate(rate) / 100.0;
    (p * (1.0 - p) / n as f64).sqrt() * 100.0
}

/// Intervalo de confiança de uma taxa (em %), limitado a [0, 100]
pub fn confidence_interval(
    rate: f64,
    n: u64,
    confidence_level: f64,
) -> AnalyticsResult<ConfidenceInterval> {
    let z = z_score_for(confidence_level)?;
    let rate = clamp_rate(rate);
    let margin = z * standard_deviation(rate, n);

    Ok(ConfidenceInterval {
        lower: clamp_rate(rate - margin),
        upper: clamp_rate(rate + margin),
    })
}

/// Desvio padrão populacional; zero para conjunto vazio
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Limita uma taxa a [0, 100]; NaN vira 0
pub fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        return 0.0;
    }
    rate.clamp(0.0, 100.0)
}

/// `numerator / denominator × 100`, ou 0 quando o denominador é zero
pub fn percentage(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        return 0.0;
    }
    numerator / denominator * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_cdf_at_zero() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-7);
    }

    #[test]
    fn test_normal_cdf_known_values() {
        // Valores de referência da tabela da normal padrão
        let cases = [
            (1.0, 0.841344746),
            (1.96, 0.975002105),
            (-1.645, 0.049984905),
            (2.576, 0.995002467),
            (3.0, 0.998650102),
            (-2.5, 0.006209665),
            (4.0, 0.999968329),
            (6.0, 0.999999999),
            (-6.0, 0.000000001),
        ];
        for (z, expected) in cases {
            assert!(
                (normal_cdf(z) - expected).abs() < 1e-7,
                "normal_cdf({}) = {}, esperado {}",
                z,
                normal_cdf(z),
                expected
            );
        }
    }

    #[test]
    fn test_normal_cdf_symmetry_and_monotonicity() {
        let mut previous = 0.0;
        let mut z = -6.0;
        while z <= 6.0 {
            let value = normal_cdf(z);
            assert!((0.0..=1.0).contains(&value));
            assert!((normal_cdf(-z) - (1.0 - value)).abs() < 1e-12);
            assert!(value >= previous);
            previous = value;
            z += 0.25;
        }
    }

    #[test]
    fn test_z_score_lookup() {
        assert_eq!(z_score_for(0.90), Ok(1.645));
        assert_eq!(z_score_for(0.95), Ok(1.96));
        assert_eq!(z_score_for(0.99), Ok(2.576));
        assert_eq!(
            z_score_for(0.85),
            Err(AnalyticsError::InvalidConfidenceLevel(0.85))
        );
    }

    #[test]
    fn test_z_beta_lookup() {
        assert_eq!(z_beta_for(0.80), Ok(0.84));
        assert_eq!(z_beta_for(0.90), Ok(1.28));
        assert_eq!(z_beta_for(0.95), Ok(1.645));
        assert!(matches!(
            z_beta_for(0.5),
            Err(AnalyticsError::InvalidPowerLevel(_))
        ));
    }

    #[test]
    fn test_standard_deviation() {
        // p = 0.5, n = 100 -> sqrt(0.0025) * 100 = 5
        assert!((standard_deviation(50.0, 100) - 5.0).abs() < 1e-9);
        assert_eq!(standard_deviation(50.0, 0), 0.0);
        assert_eq!(standard_deviation(0.0, 10), 0.0);
    }

    #[test]
    fn test_confidence_interval_is_clamped() {
        let ci = confidence_interval(50.0, 100, 0.95).unwrap();
        assert!((ci.lower - 40.2).abs() < 1e-9);
        assert!((ci.upper - 59.8).abs() < 1e-9);

        let ci = confidence_interval(99.0, 5, 0.99).unwrap();
        assert!(ci.upper <= 100.0);
        assert!(ci.lower >= 0.0);

        let ci = confidence_interval(30.0, 0, 0.95).unwrap();
        assert_eq!(ci, ConfidenceInterval { lower: 30.0, upper: 30.0 });

        assert!(confidence_interval(50.0, 100, 0.8).is_err());
    }

    #[test]
    fn test_population_std_dev() {
        assert_eq!(population_std_dev(&[]), 0.0);
        assert_eq!(population_std_dev(&[8.0, 8.0, 8.0]), 0.0);
        // {10, 10, 4}: média 8, variância (4 + 4 + 16) / 3 = 8
        assert!((population_std_dev(&[10.0, 10.0, 4.0]) - 8.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_percentage_guards_zero_denominator() {
        assert_eq!(percentage(5.0, 0.0), 0.0);
        assert_eq!(percentage(1.0, 4.0), 25.0);
        assert_eq!(clamp_rate(f64::NAN), 0.0);
        assert_eq!(clamp_rate(140.0), 100.0);
    }
}
