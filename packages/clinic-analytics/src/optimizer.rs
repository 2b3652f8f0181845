//! Otimização da agenda
//!
//! Sugestão de horários, balanceamento de carga entre cadeiras e alocação de
//! cadeiras por especialidade. Todas as saídas têm ordem determinística.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime, Timelike};
use tracing::debug;

use crate::models::{
    AppointmentRecord, ChairAllocationOptimization, DemandLevel, LoadBalancingResult, Priority,
    Reallocation, SchedulingSuggestion,
};
use crate::statistics::{percentage, population_std_dev};

/// Atendimentos simultâneos que uma cadeira comporta em um mesmo horário
pub const CHAIR_WINDOW_SLOTS: u32 = 4;

/// Quantidade padrão de sugestões retornadas
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// Faixas de hora (inclusivas) preferidas pelos pacientes
const PREFERRED_HOURS: [(u32, u32); 2] = [(9, 11), (14, 16)];

const PREFERRED_HOUR_BONUS: i32 = 3;
const HIGH_DEMAND_PENALTY: i32 = 5;
const POINTS_PER_FREE_SLOT: i32 = 10;

/// Carga (% da recomendada) acima da qual a cadeira tem prioridade alta
pub const HIGH_PRIORITY_RATIO: f64 = 120.0;
/// Carga (% da recomendada) acima da qual a cadeira tem prioridade média
pub const MEDIUM_PRIORITY_RATIO: f64 = 110.0;

fn is_preferred_hour(time: NaiveTime) -> bool {
    let hour = time.hour();
    PREFERRED_HOURS
        .iter()
        .any(|&(start, end)| (start..=end).contains(&hour))
}

fn demand_for(available_slots: u32) -> DemandLevel {
    match available_slots {
        1 => DemandLevel::High,
        2 => DemandLevel::Medium,
        _ => DemandLevel::Low,
    }
}

/// Sugere os melhores horários para um novo agendamento na cadeira
///
/// Os horários candidatos são as combinações (data, hora) já presentes na
/// agenda. Cada uma com menos de [`CHAIR_WINDOW_SLOTS`] reservas na cadeira
/// recebe uma pontuação; o resultado vem ordenado por pontuação decrescente,
/// depois por data e hora.
pub fn suggest_optimal_times(
    appointments: &[AppointmentRecord],
    specialty: &str,
    chair: &str,
    limit: usize,
) -> Vec<SchedulingSuggestion> {
    // Agregação (data, hora, cadeira) -> reservas
    let mut bookings: BTreeMap<(NaiveDate, NaiveTime, &str), u32> = BTreeMap::new();
    for appointment in appointments.iter().filter(|a| a.status.occupies_slot()) {
        *bookings
            .entry((appointment.date, appointment.time, appointment.chair.as_str()))
            .or_insert(0) += 1;
    }

    let mut windows: BTreeMap<(NaiveDate, NaiveTime), u32> = BTreeMap::new();
    for (&(date, time, booked_chair), &count) in &bookings {
        let booked = windows.entry((date, time)).or_insert(0);
        if booked_chair == chair {
            *booked += count;
        }
    }

    let mut suggestions: Vec<SchedulingSuggestion> = windows
        .into_iter()
        .filter(|&(_, booked)| booked < CHAIR_WINDOW_SLOTS)
        .map(|((date, time), booked)| {
            let available_slots = CHAIR_WINDOW_SLOTS - booked;
            let demand_level = demand_for(available_slots);
            let preferred = is_preferred_hour(time);

            let mut score = available_slots as i32 * POINTS_PER_FREE_SLOT;
            if demand_level == DemandLevel::High {
                score -= HIGH_DEMAND_PENALTY;
            }
            if preferred {
                score += PREFERRED_HOUR_BONUS;
            }

            let reason = format!(
                "{} de {} vagas livres na cadeira {} em {} às {}, demanda {}{}",
                available_slots,
                CHAIR_WINDOW_SLOTS,
                chair,
                date.format("%d/%m/%Y"),
                time.format("%H:%M"),
                demand_level,
                if preferred { ", horário preferido pelos pacientes" } else { "" }
            );

            SchedulingSuggestion {
                date,
                time,
                chair: chair.to_string(),
                specialty: specialty.to_string(),
                available_slots,
                demand_level,
                score,
                reason,
            }
        })
        .collect();

    // Ordenação estável: empates mantêm a ordem de data e hora
    suggestions.sort_by(|a, b| b.score.cmp(&a.score));
    suggestions.truncate(limit);

    debug!(
        "{} horários sugeridos para a cadeira {} ({})",
        suggestions.len(),
        chair,
        specialty
    );
    suggestions
}

/// Carga por cadeira na ordem em que as cadeiras aparecem
fn load_by_chair(appointments: &[AppointmentRecord]) -> Vec<(String, usize)> {
    let mut loads: Vec<(String, usize)> = Vec::new();
    for appointment in appointments.iter().filter(|a| a.status.occupies_slot()) {
        match loads.iter_mut().find(|(chair, _)| *chair == appointment.chair) {
            Some((_, load)) => *load += 1,
            None => loads.push((appointment.chair.clone(), 1)),
        }
    }
    loads
}

fn std_dev_of(loads: &[(String, usize)]) -> f64 {
    let values: Vec<f64> = loads.iter().map(|(_, load)| *load as f64).collect();
    population_std_dev(&values)
}

/// Sugere remanejamentos entre cadeiras para aproximar a carga da média
///
/// Pareamento guloso na ordem em que as cadeiras aparecem: cada cadeira
/// sobrecarregada cede `min(excesso, déficit)` agendamentos para a próxima
/// cadeira com déficit. O resultado é apenas uma recomendação.
pub fn analyze_load_balancing(appointments: &[AppointmentRecord]) -> LoadBalancingResult {
    let loads = load_by_chair(appointments);
    if loads.is_empty() {
        return LoadBalancingResult {
            current_load: BTreeMap::new(),
            suggested_reallocation: Vec::new(),
            balanced_load: BTreeMap::new(),
            improvement_percentage: 0.0,
        };
    }

    let total: usize = loads.iter().map(|(_, load)| load).sum();
    let ideal = (total as f64 / loads.len() as f64).round() as usize;

    let mut overloaded: Vec<(usize, usize)> = Vec::new();
    let mut underloaded: Vec<(usize, usize)> = Vec::new();
    for (index, (_, load)) in loads.iter().enumerate() {
        if *load > ideal {
            overloaded.push((index, load - ideal));
        } else if *load < ideal {
            underloaded.push((index, ideal - load));
        }
    }

    let mut balanced = loads.clone();
    let mut suggested_reallocation = Vec::new();
    let mut target = 0;
    for (from, mut excess) in overloaded {
        while excess > 0 && target < underloaded.len() {
            let (to, deficit) = &mut underloaded[target];
            let moved = excess.min(*deficit);

            suggested_reallocation.push(Reallocation {
                from: loads[from].0.clone(),
                to: loads[*to].0.clone(),
                appointment_count: moved,
                reason: format!(
                    "Cadeira {} com {} agendamentos e cadeira {} com {}; carga ideal de {}",
                    loads[from].0, loads[from].1, loads[*to].0, loads[*to].1, ideal
                ),
            });
            balanced[from].1 -= moved;
            balanced[*to].1 += moved;
            excess -= moved;
            *deficit -= moved;

            if *deficit == 0 {
                target += 1;
            }
        }
    }

    let before = std_dev_of(&loads);
    let after = std_dev_of(&balanced);
    let improvement_percentage = if before > 0.0 {
        (before - after) / before * 100.0
    } else {
        0.0
    };

    debug!(
        "Balanceamento: ideal {} por cadeira, {} remanejamentos, melhoria {:.1}%",
        ideal,
        suggested_reallocation.len(),
        improvement_percentage
    );

    LoadBalancingResult {
        current_load: loads.into_iter().collect(),
        suggested_reallocation,
        balanced_load: balanced.into_iter().collect(),
        improvement_percentage,
    }
}

/// Avalia a carga de cada cadeira dentro de cada especialidade
///
/// `chairs_per_specialty` informa quantas cadeiras a clínica reserva para a
/// especialidade; sem essa informação usa as cadeiras que a atenderam.
/// Resultado ordenado por prioridade (alta primeiro), especialidade e cadeira.
pub fn optimize_chair_allocation(
    appointments: &[AppointmentRecord],
    chairs_per_specialty: &BTreeMap<String, usize>,
) -> Vec<ChairAllocationOptimization> {
    let mut demand: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();
    for appointment in appointments.iter().filter(|a| a.status.occupies_slot()) {
        *demand
            .entry(appointment.specialty.as_str())
            .or_default()
            .entry(appointment.chair.as_str())
            .or_insert(0) += 1;
    }

    let mut allocations = Vec::new();
    for (specialty, chairs) in &demand {
        let total: usize = chairs.values().sum();
        let chair_count = chairs_per_specialty
            .get(*specialty)
            .copied()
            .filter(|&count| count > 0)
            .unwrap_or(chairs.len());
        let recommended_load = total as f64 / chair_count as f64;

        for (chair, &current_load) in chairs {
            let load_ratio = percentage(current_load as f64, recommended_load);
            let priority = if load_ratio > HIGH_PRIORITY_RATIO {
                Priority::High
            } else if load_ratio > MEDIUM_PRIORITY_RATIO {
                Priority::Medium
            } else {
                Priority::Low
            };

            let action = match priority {
                Priority::High => format!(
                    "Cadeira {} com {:.0}% da carga recomendada em {}: transfira atendimentos para outras cadeiras.",
                    chair, load_ratio, specialty
                ),
                Priority::Medium => format!(
                    "Cadeira {} próxima do limite em {} ({:.0}%): monitore novos agendamentos.",
                    chair, specialty, load_ratio
                ),
                Priority::Low => format!(
                    "Cadeira {} com carga adequada em {} ({:.0}%).",
                    chair, specialty, load_ratio
                ),
            };

            allocations.push(ChairAllocationOptimization {
                specialty: specialty.to_string(),
                chair: chair.to_string(),
                current_load,
                recommended_load,
                load_ratio,
                priority,
                action,
            });
        }
    }

    allocations.sort_by_key(|allocation| allocation.priority.rank());
    allocations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{appointment, date, repeated};
    use crate::models::AppointmentStatus;

    fn chair_loads(loads: &[(&str, usize)]) -> Vec<AppointmentRecord> {
        let day = date(2024, 3, 4);
        loads
            .iter()
            .flat_map(|(chair, count)| repeated(day, "09:00", chair, "clinica_geral", *count))
            .collect()
    }

    #[test]
    fn test_reference_load_balancing() {
        let records = chair_loads(&[("c1", 10), ("c2", 10), ("c3", 4)]);

        let result = analyze_load_balancing(&records);

        assert_eq!(result.current_load.get("c3"), Some(&4));
        let moved: usize = result
            .suggested_reallocation
            .iter()
            .map(|r| r.appointment_count)
            .sum();
        assert_eq!(moved, 4);
        assert!(result.suggested_reallocation.iter().all(|r| r.to == "c3"));
        assert_eq!(result.suggested_reallocation[0].from, "c1");
        assert_eq!(result.suggested_reallocation[0].appointment_count, 2);
        assert_eq!(result.suggested_reallocation[1].from, "c2");
        assert!(result.balanced_load.values().all(|&load| load == 8));
        assert!((result.improvement_percentage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_balanced_load_needs_nothing() {
        let records = chair_loads(&[("c1", 6), ("c2", 6), ("c3", 6)]);

        let result = analyze_load_balancing(&records);

        assert!(result.suggested_reallocation.is_empty());
        assert_eq!(result.improvement_percentage, 0.0);
        assert_eq!(result.current_load, result.balanced_load);
    }

    #[test]
    fn test_load_balancing_empty_input() {
        let result = analyze_load_balancing(&[]);
        assert!(result.current_load.is_empty());
        assert_eq!(result.improvement_percentage, 0.0);
    }

    #[test]
    fn test_load_balancing_with_rounded_ideal() {
        // total 25, 3 cadeiras: ideal 8
        let records = chair_loads(&[("c1", 12), ("c2", 7), ("c3", 6)]);

        let result = analyze_load_balancing(&records);

        // Excesso 4 dividido entre déficits 1 e 2
        let moves: Vec<(&str, &str, usize)> = result
            .suggested_reallocation
            .iter()
            .map(|r| (r.from.as_str(), r.to.as_str(), r.appointment_count))
            .collect();
        assert_eq!(moves, vec![("c1", "c2", 1), ("c1", "c3", 2)]);
        assert_eq!(result.balanced_load.get("c1"), Some(&9));
        assert!(result.improvement_percentage > 0.0);
    }

    #[test]
    fn test_cancelled_appointments_do_not_count() {
        let day = date(2024, 3, 4);
        let mut records = repeated(day, "09:00", "c1", "limpeza", 3);
        records.push(appointment(day, "09:00", AppointmentStatus::Cancelled, "c2", "limpeza"));

        let result = analyze_load_balancing(&records);

        assert_eq!(result.current_load.len(), 1);
        assert!(result.suggested_reallocation.is_empty());
    }

    fn suggestion_fixture() -> Vec<AppointmentRecord> {
        let day = date(2024, 3, 4);
        let mut records = repeated(day, "09:00", "c1", "ortodontia", 3);
        records.extend(repeated(day, "10:30", "c1", "ortodontia", 2));
        records.extend(repeated(day, "13:00", "c2", "ortodontia", 1));
        records.extend(repeated(day, "14:00", "c1", "ortodontia", 4));
        records.extend(repeated(day, "17:00", "c1", "ortodontia", 1));
        records
    }

    #[test]
    fn test_suggestions_are_scored_and_sorted() {
        let suggestions = suggest_optimal_times(&suggestion_fixture(), "ortodontia", "c1", 5);

        let summary: Vec<(String, u32, i32)> = suggestions
            .iter()
            .map(|s| (s.time.format("%H:%M").to_string(), s.available_slots, s.score))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("13:00".to_string(), 4, 40),
                ("17:00".to_string(), 3, 30),
                ("10:30".to_string(), 2, 23),
                ("09:00".to_string(), 1, 8),
            ]
        );
        assert_eq!(suggestions[3].demand_level, DemandLevel::High);
        assert_eq!(suggestions[2].demand_level, DemandLevel::Medium);
        assert_eq!(suggestions[0].demand_level, DemandLevel::Low);
        assert!(suggestions.iter().all(|s| s.chair == "c1"));
        assert!(suggestions[2].reason.contains("horário preferido"));
    }

    #[test]
    fn test_suggestions_respect_limit_and_are_deterministic() {
        let records = suggestion_fixture();

        let first = suggest_optimal_times(&records, "ortodontia", "c1", 2);
        let second = suggest_optimal_times(&records, "ortodontia", "c1", 2);

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert!(suggest_optimal_times(&[], "ortodontia", "c1", 5).is_empty());
    }

    #[test]
    fn test_chair_allocation_priorities() {
        let day = date(2024, 3, 4);
        let mut records = repeated(day, "09:00", "c1", "implante", 13);
        records.extend(repeated(day, "10:00", "c2", "implante", 7));
        records.extend(repeated(day, "11:00", "c1", "limpeza", 5));
        records.extend(repeated(day, "11:00", "c2", "limpeza", 5));
        records.extend(repeated(day, "11:00", "c3", "ortodontia", 23));
        records.extend(repeated(day, "11:00", "c4", "ortodontia", 17));

        let allocations = optimize_chair_allocation(&records, &BTreeMap::new());

        // implante: recomendado 10 -> c1 130% (alta), c2 70% (baixa)
        // ortodontia: recomendado 20 -> c3 115% (média), c4 85% (baixa)
        assert_eq!(allocations[0].chair, "c1");
        assert_eq!(allocations[0].specialty, "implante");
        assert_eq!(allocations[0].priority, Priority::High);
        assert!((allocations[0].load_ratio - 130.0).abs() < 1e-9);
        assert_eq!(allocations[1].chair, "c3");
        assert_eq!(allocations[1].priority, Priority::Medium);
        assert!(allocations[2..].iter().all(|a| a.priority == Priority::Low));
        assert_eq!(allocations.len(), 6);
    }

    #[test]
    fn test_chair_allocation_uses_reserved_chairs() {
        let day = date(2024, 3, 4);
        let records = repeated(day, "09:00", "c1", "implante", 10);
        let reserved = BTreeMap::from([("implante".to_string(), 2)]);

        let allocations = optimize_chair_allocation(&records, &reserved);

        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].recommended_load, 5.0);
        assert_eq!(allocations[0].priority, Priority::High);
    }
}
