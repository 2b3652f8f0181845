//! Construtores de registros para testes
//!
//! Disponível nos testes da biblioteca e, com a feature `test-utils`, para os
//! testes das aplicações que dependem dela.

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::models::{AppointmentRecord, AppointmentStatus};

/// Data de calendário; entra em pânico se a data não existir
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("data de teste inválida")
}

/// Horário no formato `HH:MM`; entra em pânico se for inválido
pub fn time(hhmm: &str) -> NaiveTime {
    NaiveTime::parse_from_str(hhmm, "%H:%M").expect("horário de teste inválido")
}

/// Um agendamento com todos os campos informados
pub fn appointment(
    day: NaiveDate,
    hhmm: &str,
    status: AppointmentStatus,
    chair: &str,
    specialty: &str,
) -> AppointmentRecord {
    AppointmentRecord::new(day, time(hhmm), status, chair, specialty)
}

/// `count` agendamentos confirmados no dia, distribuídos em 4 cadeiras
/// a partir das 08:00, em blocos de 30 minutos
pub fn appointments_on(day: NaiveDate, count: usize) -> Vec<AppointmentRecord> {
    let start = time("08:00");
    (0..count)
        .map(|i| {
            let block = (i / 4) as i64;
            AppointmentRecord::new(
                day,
                start + Duration::minutes(30 * block),
                AppointmentStatus::Confirmed,
                format!("c{}", i % 4 + 1),
                "clinica_geral",
            )
        })
        .collect()
}

/// `count` agendamentos confirmados na mesma cadeira e horário
pub fn repeated(
    day: NaiveDate,
    hhmm: &str,
    chair: &str,
    specialty: &str,
    count: usize,
) -> Vec<AppointmentRecord> {
    (0..count)
        .map(|_| appointment(day, hhmm, AppointmentStatus::Confirmed, chair, specialty))
        .collect()
}
