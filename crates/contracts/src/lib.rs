//! v1 cross-boundary contracts for the fleet engine, API facade, and dashboard collaborators.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const SCHEMA_VERSION_V1: &str = "1.0";
pub const CYCLE_DAYS: u32 = 42;
pub const CYCLE_WEEKS: u32 = 6;
pub const DAYS_PER_WEEK: u32 = 7;
pub const HOUSE_COUNT: usize = 10;
pub const CLUSTER_GRID_SIZE: usize = 10;

pub const REFERENCE_DATE_ENV: &str = "FLOCK_REFERENCE_DATE";
pub const BUILD_THREADS_ENV: &str = "FLOCK_BUILD_THREADS";

/// Week of the growth cycle a day falls in (`ceil(day / 7)`).
pub fn week_of_day(day: u32) -> u32 {
    day.div_ceil(DAYS_PER_WEEK)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FleetConfig {
    pub schema_version: String,
    /// Date the fleet is generated "as of". `None` resolves to today's local date at build time.
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
    #[serde(default = "default_build_worker_threads")]
    pub build_worker_threads: u16,
    pub notes: Option<String>,
}

fn default_build_worker_threads() -> u16 {
    1
}

impl FleetConfig {
    /// Default config overlaid with `FLOCK_REFERENCE_DATE` and `FLOCK_BUILD_THREADS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(raw) = env_value(REFERENCE_DATE_ENV) {
            match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
                Ok(date) => config.reference_date = Some(date),
                Err(err) => tracing::warn!(
                    value = %raw,
                    error = %err,
                    "ignoring invalid {REFERENCE_DATE_ENV}"
                ),
            }
        }

        if let Some(raw) = env_value(BUILD_THREADS_ENV) {
            match raw.trim().parse::<u16>() {
                Ok(threads) => config.build_worker_threads = threads.max(1),
                Err(err) => tracing::warn!(
                    value = %raw,
                    error = %err,
                    "ignoring invalid {BUILD_THREADS_ENV}"
                ),
            }
        }

        config
    }

    pub fn resolved_reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            reference_date: None,
            build_worker_threads: default_build_worker_threads(),
            notes: None,
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ClimateBias {
    Hotter,
    Humid,
    Stable,
    Cooler,
}

impl ClimateBias {
    pub const ALL: [ClimateBias; 4] = [
        ClimateBias::Hotter,
        ClimateBias::Humid,
        ClimateBias::Stable,
        ClimateBias::Cooler,
    ];

    /// Offset applied to the house temperature relative to the weekly setpoint.
    pub fn temperature_offset(self) -> f64 {
        match self {
            ClimateBias::Hotter => 2.0,
            ClimateBias::Cooler => -2.0,
            ClimateBias::Humid | ClimateBias::Stable => 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct House {
    pub id: String,
    pub name: String,
    pub floor_area: u32,
    pub capacity: u32,
    pub baseline_mortality: f64,
    pub climate_bias: ClimateBias,
    /// Capacity at registry time; never reduced by mortality.
    pub current_birds: u32,
    pub current_day: u32,
    pub cycle_start_date: NaiveDate,
}

impl House {
    pub fn current_week(&self) -> u32 {
        week_of_day(self.current_day)
    }
}

pub type DensityGrid = [[f64; CLUSTER_GRID_SIZE]; CLUSTER_GRID_SIZE];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyTelemetry {
    pub house_id: String,
    pub day: u32,
    pub week: u32,
    pub timestamp: NaiveDate,

    pub temp_setpoint: f64,
    pub temp_actual: f64,
    pub humidity: f64,
    pub co2: f64,
    pub nh3: f64,
    pub dust: f64,

    pub feed_intake_kg: f64,
    pub water_l: f64,
    pub power_kwh: f64,
    pub power_heater: f64,
    pub power_fans: f64,
    pub power_lights: f64,

    pub outside_temp: f64,
    pub outside_humidity: f64,
    pub outside_pressure: f64,

    pub staff_entries: u32,
    pub litter_turns: u32,
    pub vaccine_events: u32,

    /// Linear attrition estimate for this day; distinct from `House::current_birds`.
    pub birds_alive: u32,
    pub avg_weight_kg: f64,
    /// Daily mortality as a fraction.
    pub mortality: f64,

    pub airspeed_ms: f64,
    pub noise_db: f64,
    pub coughing_detected: bool,
    pub raised_volume_detected: bool,

    pub clustering: DensityGrid,
    pub spread_metric: f64,
    pub movement_index: f64,
}

impl DailyTelemetry {
    /// Temperature-humidity index used as the heat stress proxy.
    pub fn thi(&self) -> f64 {
        temperature_humidity_index(self.temp_actual, self.humidity)
    }
}

pub fn temperature_humidity_index(temp_actual: f64, humidity: f64) -> f64 {
    temp_actual + 0.36 * humidity
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    Ammonia,
    AmmoniaSpike,
    CarbonDioxide,
    Dust,
    HeatStress,
    Mortality,
    Coughing,
    RaisedVolume,
    Clustering,
    LowMovement,
}

impl AnomalyKind {
    /// Short tag used as the last segment of anomaly ids.
    pub fn tag(self) -> &'static str {
        match self {
            AnomalyKind::Ammonia => "nh3",
            AnomalyKind::AmmoniaSpike => "nh3-spike",
            AnomalyKind::CarbonDioxide => "co2",
            AnomalyKind::Dust => "dust",
            AnomalyKind::HeatStress => "heat",
            AnomalyKind::Mortality => "mort",
            AnomalyKind::Coughing => "coughing",
            AnomalyKind::RaisedVolume => "raisedvolume",
            AnomalyKind::Clustering => "clustering",
            AnomalyKind::LowMovement => "lowmovement",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AnomalyKind::Ammonia | AnomalyKind::AmmoniaSpike => "Ammonia (NH₃)",
            AnomalyKind::CarbonDioxide => "Carbon Dioxide (CO₂)",
            AnomalyKind::Dust => "Dust Concentration",
            AnomalyKind::HeatStress => "Heat Stress Index",
            AnomalyKind::Mortality => "Mortality Rate",
            AnomalyKind::Coughing => "Respiratory Distress",
            AnomalyKind::RaisedVolume => "Stress Vocalizations",
            AnomalyKind::Clustering => "Poor Flock Distribution",
            AnomalyKind::LowMovement => "Low Activity",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Anomaly {
    pub id: String,
    pub house_id: String,
    pub day: u32,
    pub timestamp: NaiveDate,
    pub kind: AnomalyKind,
    pub metric: String,
    pub value: f64,
    pub severity: Severity,
    pub message: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklyMetrics {
    pub week: u32,
    pub fcr: f64,
    pub pef: f64,
    /// Mean daily mortality over the week, in percent.
    pub mortality: f64,
    pub throughput: f64,
    /// Average daily profit for the week including the intervention uplift.
    pub profit: f64,
    pub avg_weight: f64,
}

/// Per-day efficiency trend built from running totals since day 1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyKpi {
    pub day: u32,
    pub cumulative_feed_kg: f64,
    pub fcr: f64,
    pub pef: f64,
    /// That day's mortality, in percent.
    pub mortality: f64,
    /// Running sum of daily mortality, in percent.
    pub cumulative_mortality: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Factor {
    #[serde(rename = "light")]
    Light,
    #[serde(rename = "temp")]
    Temperature,
    #[serde(rename = "vent")]
    Ventilation,
    #[serde(rename = "protein")]
    Protein,
}

impl Factor {
    pub const ALL: [Factor; 4] = [
        Factor::Light,
        Factor::Temperature,
        Factor::Ventilation,
        Factor::Protein,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Factor::Light => "light",
            Factor::Temperature => "temp",
            Factor::Ventilation => "vent",
            Factor::Protein => "protein",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Factor::Light => "hrs/day",
            Factor::Temperature => "°C",
            Factor::Ventilation => "%",
            Factor::Protein => "% CP",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Factor::Light => "Light (hrs/day)",
            Factor::Temperature => "Temperature (°C)",
            Factor::Ventilation => "Ventilation (%)",
            Factor::Protein => "Protein (% CP)",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown factor `{0}`; expected one of light, temp, vent, protein")]
pub struct ParseFactorError(pub String);

impl FromStr for Factor {
    type Err = ParseFactorError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "light" => Ok(Factor::Light),
            "temp" | "temperature" => Ok(Factor::Temperature),
            "vent" | "ventilation" => Ok(Factor::Ventilation),
            "protein" => Ok(Factor::Protein),
            _ => Err(ParseFactorError(raw.to_string())),
        }
    }
}

/// Operating point for every advisory factor.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct FactorValues {
    pub light: f64,
    #[serde(rename = "temp")]
    pub temperature: f64,
    #[serde(rename = "vent")]
    pub ventilation: f64,
    pub protein: f64,
}

impl FactorValues {
    pub fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Light => self.light,
            Factor::Temperature => self.temperature,
            Factor::Ventilation => self.ventilation,
            Factor::Protein => self.protein,
        }
    }

    pub fn set(&mut self, factor: Factor, value: f64) {
        match factor {
            Factor::Light => self.light = value,
            Factor::Temperature => self.temperature = value,
            Factor::Ventilation => self.ventilation = value,
            Factor::Protein => self.protein = value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoseResponse {
    pub factor: Factor,
    pub week: u32,
    pub current: f64,
    pub optimal: f64,
    pub doses: Vec<f64>,
    pub pef_uplift: Vec<f64>,
    pub profit_delta: Vec<f64>,
    pub ci_lower: Vec<f64>,
    pub ci_upper: Vec<f64>,
    pub support: Vec<f64>,
}

impl DoseResponse {
    /// Doses whose confidence interval is wider than 10% of the mean uplift.
    pub fn uncertain_doses(&self) -> Vec<bool> {
        self.ci_lower
            .iter()
            .zip(&self.ci_upper)
            .zip(&self.pef_uplift)
            .map(|((lower, upper), uplift)| (upper - lower) > 0.1 * uplift.abs())
            .collect()
    }

    pub fn mean_support(&self) -> f64 {
        if self.support.is_empty() {
            return 0.0;
        }
        self.support.iter().sum::<f64>() / self.support.len() as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PairwiseSurface {
    pub factor1: Factor,
    pub factor2: Factor,
    pub week: u32,
    pub doses1: Vec<f64>,
    pub doses2: Vec<f64>,
    /// Indexed `[i][j]` with `i` over `doses1` and `j` over `doses2`.
    pub pef_uplift: Vec<Vec<f64>>,
    pub safe: Vec<Vec<bool>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub factor: Factor,
    pub week: u32,
    pub current_value: f64,
    pub recommended_value: f64,
    pub pef_uplift: f64,
    pub profit_delta: f64,
    pub confidence: (f64, f64),
    pub support: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekSupport {
    pub week: u32,
    pub support: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Excellent,
    Good,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FarmHealth {
    pub score: u32,
    pub status: HealthStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FleetSummary {
    pub house_count: usize,
    pub daily_profit: f64,
    pub avg_pef: f64,
    pub avg_fcr: f64,
    pub critical_alerts: usize,
    pub top_alerts: Vec<Anomaly>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HouseOverview {
    pub house: House,
    pub current_week: u32,
    pub current_metrics: Option<WeeklyMetrics>,
    pub profit_improvement_pct: f64,
    pub critical_alerts: usize,
    pub health: Option<FarmHealth>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub week: u32,
    pub current: f64,
    pub baseline: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavingsLine {
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HouseImprovement {
    pub house_id: String,
    pub avg_profit: f64,
    pub improvement_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FleetReport {
    pub total_profit_improvement: f64,
    pub profit_trend: Vec<TrendPoint>,
    pub pef_trend: Vec<TrendPoint>,
    pub savings: Vec<SavingsLine>,
    pub house_improvements: Vec<HouseImprovement>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    HouseNotFound,
    InvalidQuery,
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub schema_version: String,
    pub error_code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(error_code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            error_code,
            message: message.into(),
            details,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResponse {
    pub schema_version: String,
    pub query_type: String,
    /// Build counter of the fleet snapshot the data was read from.
    pub fleet_generation: u64,
    pub data: Value,
}
