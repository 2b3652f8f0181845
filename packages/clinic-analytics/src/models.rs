//! Modelos de dados compartilhados entre os analisadores
//!
//! Este módulo define os registros de entrada (agendamentos e templates de
//! mensagem) e os relatórios produzidos pela biblioteca. Todos os mapas são
//! `BTreeMap` para que a serialização seja determinística.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// Status possíveis de um agendamento
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Agendamento inicial, ainda sem contato com o paciente
    Scheduled,
    /// Confirmado pelo paciente
    Confirmed,
    /// Aguardando resposta da mensagem de confirmação
    Pending,
    /// Cancelado (libera o horário)
    #[serde(alias = "canceled")]
    Cancelled,
    /// Paciente não compareceu
    NoShow,
}

impl AppointmentStatus {
    /// Indica se o agendamento ocupa um horário na agenda
    pub fn occupies_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }

    /// Agendado ou pendente: ocupa o horário mas ainda não foi confirmado
    pub fn is_unconfirmed(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::Pending)
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = AnalyticsError;

    fn from_str(status: &str) -> Result<Self, Self::Err> {
        match status.trim() {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "pending" => Ok(AppointmentStatus::Pending),
            "cancelled" | "canceled" => Ok(AppointmentStatus::Cancelled),
            "no_show" => Ok(AppointmentStatus::NoShow),
            other => Err(AnalyticsError::UnknownStatus(other.to_string())),
        }
    }
}

/// Serialização de horários no formato `HH:MM`
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        // Aceita também "HH:MM:SS" vindo de exportações antigas
        NaiveTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

/// Snapshot imutável de um agendamento fornecido pela camada de dados
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    /// Dia da consulta
    pub date: NaiveDate,
    /// Horário de início (HH:MM)
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    /// Status atual
    pub status: AppointmentStatus,
    /// Identificador da cadeira/consultório
    pub chair: String,
    /// Especialidade atendida
    pub specialty: String,
}

impl AppointmentRecord {
    /// Cria um registro a partir dos campos básicos
    pub fn new(
        date: NaiveDate,
        time: NaiveTime,
        status: AppointmentStatus,
        chair: impl Into<String>,
        specialty: impl Into<String>,
    ) -> Self {
        Self {
            date,
            time,
            status,
            chair: chair.into(),
            specialty: specialty.into(),
        }
    }

    /// Hora cheia do agendamento (0-23)
    pub fn hour(&self) -> u32 {
        self.time.hour()
    }
}

/// Funil de conversão de um template: enviados ≥ abertos ≥ clicados ≥ confirmados
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionFunnel {
    pub sent: i64,
    pub opened: i64,
    pub clicked: i64,
    pub confirmed: i64,
}

/// Resultados agregados de um template de mensagem (braço do experimento)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentArm {
    /// Confirmações obtidas
    pub confirmations: i64,
    /// Tentativas de envio
    pub total_attempts: i64,
    /// Confiança média das respostas classificadas (%)
    #[serde(default)]
    pub average_confidence: f64,
    /// Funil de conversão
    #[serde(default)]
    pub conversion_funnel: ConversionFunnel,
}

impl ExperimentArm {
    pub fn new(confirmations: i64, total_attempts: i64) -> Self {
        Self {
            confirmations,
            total_attempts,
            ..Default::default()
        }
    }
}

/// Intervalo de confiança em pontos percentuais
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

/// Resumo estatístico de um template dentro do teste A/B
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmSummary {
    pub confirmations: i64,
    pub total_attempts: i64,
    /// Taxa de confirmação (0-100)
    pub confirmation_rate: f64,
    /// Desvio padrão da taxa, em pontos percentuais
    pub standard_deviation: f64,
    pub average_confidence: f64,
}

/// Vencedor do teste A/B
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "tie")]
    Tie,
}

impl std::fmt::Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Winner::A => write!(f, "A"),
            Winner::B => write!(f, "B"),
            Winner::Tie => write!(f, "tie"),
        }
    }
}

/// Resultado completo de um teste A/B entre dois templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ABTestResult {
    pub template_a: ArmSummary,
    pub template_b: ArmSummary,
    pub confidence_level: f64,
    /// Estatística z do teste de duas proporções
    pub z_score: f64,
    pub p_value: f64,
    pub is_significant: bool,
    pub winner: Winner,
    /// Intervalo da diferença `taxa A − taxa B`
    pub confidence_interval: ConfidenceInterval,
    /// Melhoria relativa do vencedor sobre o perdedor (%), zero em empate
    pub relative_improvement: f64,
    pub recommendation: String,
}

/// Taxas por etapa do funil de conversão
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelAnalysis {
    /// abertos / enviados
    pub open_rate: f64,
    /// clicados / abertos
    pub click_rate: f64,
    /// confirmados / clicados
    pub confirmation_rate: f64,
    /// confirmados / enviados
    pub overall_conversion_rate: f64,
    pub dropoff_sent_to_opened: f64,
    pub dropoff_opened_to_clicked: f64,
    pub dropoff_clicked_to_confirmed: f64,
}

/// Nível de carga de um dia
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for LoadLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadLevel::Low => write!(f, "low"),
            LoadLevel::Medium => write!(f, "medium"),
            LoadLevel::High => write!(f, "high"),
            LoadLevel::Critical => write!(f, "critical"),
        }
    }
}

/// Análise de carga de um único dia
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayLoadAnalysis {
    pub date: NaiveDate,
    pub day_of_week: Weekday,
    /// Agendamentos que ocupam horário (exclui cancelados)
    pub total_appointments: usize,
    pub confirmed_appointments: usize,
    /// Agendados + pendentes
    pub pending_appointments: usize,
    pub no_show_appointments: usize,
    pub cancelled_appointments: usize,
    pub available_slots: u32,
    /// Taxa de ocupação (0-100)
    pub utilization_rate: f64,
    pub load_level: LoadLevel,
    /// Mais agendamentos do que a capacidade do dia
    pub over_capacity: bool,
    pub chair_distribution: BTreeMap<String, usize>,
    pub specialty_distribution: BTreeMap<String, usize>,
}

/// Análise agregada de um mês
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthAnalysis {
    pub month: u32,
    pub year: i32,
    /// Uma entrada por dia do calendário, em ordem
    pub daily_analysis: Vec<DayLoadAnalysis>,
    /// Até 5 dias high/critical, ocupação decrescente
    pub peak_days: Vec<DayLoadAnalysis>,
    /// Até 5 dias low, ocupação crescente
    pub low_days: Vec<DayLoadAnalysis>,
    pub total_appointments: usize,
    /// Média das taxas diárias (0-100)
    pub utilization_rate: f64,
    /// Agendamentos no mês por cadeira
    pub chair_utilization: BTreeMap<String, usize>,
    /// Agendamentos no mês por especialidade
    pub specialty_demand: BTreeMap<String, usize>,
    pub busiest_chair: Option<String>,
    pub top_specialty: Option<String>,
    pub recommendations: Vec<String>,
}

/// Nível de demanda de um horário sugerido
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for DemandLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DemandLevel::Low => write!(f, "baixa"),
            DemandLevel::Medium => write!(f, "média"),
            DemandLevel::High => write!(f, "alta"),
        }
    }
}

/// Horário candidato pontuado
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingSuggestion {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub chair: String,
    pub specialty: String,
    pub available_slots: u32,
    pub demand_level: DemandLevel,
    pub score: i32,
    pub reason: String,
}

/// Movimentação sugerida entre cadeiras
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reallocation {
    pub from: String,
    pub to: String,
    pub appointment_count: usize,
    pub reason: String,
}

/// Recomendação de balanceamento de carga entre cadeiras
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadBalancingResult {
    pub current_load: BTreeMap<String, usize>,
    pub suggested_reallocation: Vec<Reallocation>,
    pub balanced_load: BTreeMap<String, usize>,
    /// Redução percentual do desvio padrão da carga
    pub improvement_percentage: f64,
}

/// Prioridade de ajuste de uma cadeira
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Posição na ordenação (alta primeiro)
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

/// Situação de uma cadeira dentro de uma especialidade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChairAllocationOptimization {
    pub specialty: String,
    pub chair: String,
    pub current_load: usize,
    /// Carga recomendada por cadeira para a especialidade
    pub recommended_load: f64,
    /// Carga atual / recomendada × 100 (pode passar de 100)
    pub load_ratio: f64,
    pub priority: Priority,
    pub action: String,
}
