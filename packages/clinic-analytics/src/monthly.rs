//! Análise mensal da agenda
//!
//! Agrega a análise diária para todos os dias do mês, identifica dias de pico
//! e de baixa e gera recomendações baseadas em regras fixas.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, info};

use crate::day_load::analyze_day_records;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::{AppointmentRecord, DayLoadAnalysis, LoadLevel, MonthAnalysis};

/// Quantidade máxima de dias listados como pico ou baixa
pub const HIGHLIGHT_DAYS_LIMIT: usize = 5;

/// Ocupação média (%) acima da qual a capacidade deve ser revista
pub const HIGH_AVERAGE_UTILIZATION: f64 = 80.0;

/// Ocupação média (%) abaixo da qual a agenda está ociosa
pub const LOW_AVERAGE_UTILIZATION: f64 = 50.0;

/// Diferença máxima aceitável de agendamentos entre cadeiras no mês
pub const CHAIR_IMBALANCE_TOLERANCE: usize = 5;

/// Dias do mês informado, em ordem
pub fn days_of_month(month: u32, year: i32) -> AnalyticsResult<Vec<NaiveDate>> {
    let invalid = || AnalyticsError::InvalidPeriod { month, year };
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;

    let count = (next - first).num_days();
    Ok((0..count).map(|offset| first + Duration::days(offset)).collect())
}

/// Analisa a ocupação de todos os dias de um mês
pub fn analyze_month(
    month: u32,
    year: i32,
    appointments: &[AppointmentRecord],
    capacity: u32,
) -> AnalyticsResult<MonthAnalysis> {
    let days = days_of_month(month, year)?;

    // Agrupa por data uma única vez em vez de filtrar a lista a cada dia
    let mut by_date: BTreeMap<NaiveDate, Vec<&AppointmentRecord>> = BTreeMap::new();
    for appointment in appointments
        .iter()
        .filter(|a| a.date.year() == year && a.date.month() == month)
    {
        by_date.entry(appointment.date).or_default().push(appointment);
    }

    let daily_analysis: Vec<DayLoadAnalysis> = days
        .iter()
        .map(|day| {
            let records = by_date.get(day).map(Vec::as_slice).unwrap_or_default();
            analyze_day_records(*day, records.iter().copied(), capacity)
        })
        .collect();

    let mut peak_days: Vec<DayLoadAnalysis> = daily_analysis
        .iter()
        .filter(|d| matches!(d.load_level, LoadLevel::High | LoadLevel::Critical))
        .cloned()
        .collect();
    peak_days.sort_by(|a, b| b.utilization_rate.total_cmp(&a.utilization_rate));
    peak_days.truncate(HIGHLIGHT_DAYS_LIMIT);

    let mut low_days: Vec<DayLoadAnalysis> = daily_analysis
        .iter()
        .filter(|d| d.load_level == LoadLevel::Low)
        .cloned()
        .collect();
    low_days.sort_by(|a, b| a.utilization_rate.total_cmp(&b.utilization_rate));
    low_days.truncate(HIGHLIGHT_DAYS_LIMIT);

    let utilization_rate = daily_analysis
        .iter()
        .map(|d| d.utilization_rate)
        .sum::<f64>()
        / daily_analysis.len() as f64;

    let mut chair_utilization: BTreeMap<String, usize> = BTreeMap::new();
    let mut specialty_demand: BTreeMap<String, usize> = BTreeMap::new();
    for day in &daily_analysis {
        for (chair, count) in &day.chair_distribution {
            *chair_utilization.entry(chair.clone()).or_insert(0) += count;
        }
        for (specialty, count) in &day.specialty_distribution {
            *specialty_demand.entry(specialty.clone()).or_insert(0) += count;
        }
    }
    let total_appointments = daily_analysis.iter().map(|d| d.total_appointments).sum();

    let recommendations =
        build_recommendations(&peak_days, utilization_rate, &chair_utilization);

    info!(
        "Análise de {:02}/{}: {} agendamentos, ocupação média {:.1}%, {} dias de pico",
        month,
        year,
        total_appointments,
        utilization_rate,
        peak_days.len()
    );

    Ok(MonthAnalysis {
        month,
        year,
        daily_analysis,
        peak_days,
        low_days,
        total_appointments,
        utilization_rate,
        busiest_chair: busiest(&chair_utilization),
        top_specialty: busiest(&specialty_demand),
        chair_utilization,
        specialty_demand,
        recommendations,
    })
}

/// Chave com maior contagem; empate fica com o menor nome
fn busiest(counts: &BTreeMap<String, usize>) -> Option<String> {
    let mut best: Option<(&String, usize)> = None;
    for (name, &count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((name, count));
        }
    }
    best.map(|(name, _)| name.clone())
}

fn build_recommendations(
    peak_days: &[DayLoadAnalysis],
    average_utilization: f64,
    chair_utilization: &BTreeMap<String, usize>,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if !peak_days.is_empty() {
        let dates: Vec<String> = peak_days
            .iter()
            .map(|d| d.date.format("%d/%m").to_string())
            .collect();
        recommendations.push(format!(
            "Dias de pico ({}): considere abrir horários extras ou remanejar atendimentos.",
            dates.join(", ")
        ));
    }

    if average_utilization > HIGH_AVERAGE_UTILIZATION {
        recommendations.push(format!(
            "Ocupação média de {:.1}% acima de {}%: avalie ampliar a capacidade de atendimento.",
            average_utilization, HIGH_AVERAGE_UTILIZATION
        ));
    } else if average_utilization < LOW_AVERAGE_UTILIZATION {
        recommendations.push(format!(
            "Ocupação média de {:.1}% abaixo de {}%: reforce campanhas de agendamento e lembretes.",
            average_utilization, LOW_AVERAGE_UTILIZATION
        ));
    }

    let max = chair_utilization.iter().max_by_key(|&(_, &count)| count);
    let min = chair_utilization.iter().min_by_key(|&(_, &count)| count);
    if let (Some((max_chair, &max_count)), Some((min_chair, &min_count))) = (max, min) {
        if max_count - min_count > CHAIR_IMBALANCE_TOLERANCE {
            recommendations.push(format!(
                "Desequilíbrio entre cadeiras: {} com {} agendamentos e {} com {}. Redistribua a agenda.",
                max_chair, max_count, min_chair, min_count
            ));
        }
    }

    debug!("{} recomendações geradas", recommendations.len());
    recommendations
}
