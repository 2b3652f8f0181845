//! Análise de carga diária da agenda

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use crate::models::{AppointmentRecord, AppointmentStatus, DayLoadAnalysis, LoadLevel};
use crate::statistics::{clamp_rate, percentage};

/// Capacidade padrão de atendimentos por dia
pub const DEFAULT_DAY_CAPACITY: u32 = 40;

/// Limites (%) de ocupação para cada nível de carga
pub const CRITICAL_THRESHOLD: f64 = 90.0;
pub const HIGH_THRESHOLD: f64 = 70.0;
pub const MEDIUM_THRESHOLD: f64 = 50.0;

/// Classifica a taxa de ocupação em um nível de carga
pub fn classify_load(utilization_rate: f64) -> LoadLevel {
    if utilization_rate >= CRITICAL_THRESHOLD {
        LoadLevel::Critical
    } else if utilization_rate >= HIGH_THRESHOLD {
        LoadLevel::High
    } else if utilization_rate >= MEDIUM_THRESHOLD {
        LoadLevel::Medium
    } else {
        LoadLevel::Low
    }
}

/// Analisa a ocupação de um dia
///
/// Considera apenas os agendamentos da data informada. Cancelados liberam o
/// horário: entram em `cancelled_appointments` e ficam fora do total, da
/// ocupação e das distribuições.
pub fn analyze_day(
    date: NaiveDate,
    appointments: &[AppointmentRecord],
    capacity: u32,
) -> DayLoadAnalysis {
    analyze_day_records(date, appointments.iter().filter(|a| a.date == date), capacity)
}

/// Mesma análise sobre registros já filtrados para a data
pub(crate) fn analyze_day_records<'a>(
    date: NaiveDate,
    day_appointments: impl Iterator<Item = &'a AppointmentRecord>,
    capacity: u32,
) -> DayLoadAnalysis {
    let mut total = 0usize;
    let mut confirmed = 0usize;
    let mut pending = 0usize;
    let mut no_show = 0usize;
    let mut cancelled = 0usize;
    let mut chair_distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut specialty_distribution: BTreeMap<String, usize> = BTreeMap::new();

    for appointment in day_appointments {
        if !appointment.status.occupies_slot() {
            cancelled += 1;
            continue;
        }

        total += 1;
        match appointment.status {
            AppointmentStatus::Confirmed => confirmed += 1,
            AppointmentStatus::NoShow => no_show += 1,
            status if status.is_unconfirmed() => pending += 1,
            _ => {}
        }
        *chair_distribution.entry(appointment.chair.clone()).or_insert(0) += 1;
        *specialty_distribution
            .entry(appointment.specialty.clone())
            .or_insert(0) += 1;
    }

    let over_capacity = total > capacity as usize;
    let utilization_rate = if capacity == 0 {
        // Sem capacidade: qualquer agendamento lota o dia
        if total > 0 { 100.0 } else { 0.0 }
    } else {
        clamp_rate(percentage(total as f64, capacity as f64))
    };
    let load_level = if over_capacity {
        LoadLevel::Critical
    } else {
        classify_load(utilization_rate)
    };
    let available_slots = (capacity as usize).saturating_sub(total) as u32;

    if over_capacity {
        warn!(
            "Dia {} com {} agendamentos para capacidade {}",
            date, total, capacity
        );
    }
    debug!(
        "Carga de {}: {} agendamentos, ocupação {:.1}% ({})",
        date, total, utilization_rate, load_level
    );

    DayLoadAnalysis {
        date,
        day_of_week: date.weekday(),
        total_appointments: total,
        confirmed_appointments: confirmed,
        pending_appointments: pending,
        no_show_appointments: no_show,
        cancelled_appointments: cancelled,
        available_slots,
        utilization_rate,
        load_level,
        over_capacity,
        chair_distribution,
        specialty_distribution,
    }
}
