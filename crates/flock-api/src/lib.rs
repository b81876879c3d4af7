//! In-process read API over the fleet state store, plus the axum HTTP surface.

mod server;

use std::sync::Arc;

use contracts::{
    Anomaly, DailyKpi, DailyTelemetry, DoseResponse, Factor, FactorValues, FleetConfig, FleetReport,
    FleetSummary, House, HouseOverview, PairwiseSurface, Recommendation, WeekSupport,
    WeeklyMetrics,
};
use flock_core::{causal, insights, weekly, FleetState, FleetStore};

pub use flock_core::{EngineError, EngineResult};
pub use server::{
    default_bind_addr, router, serve, AppState, ServerError, BIND_ADDR_ENV, DEFAULT_BIND_ADDR,
};

/// Read-only facade handed to presentation collaborators. Every collection it returns is a
/// copy taken from the current snapshot and stays valid after `reinitialize()`.
#[derive(Debug)]
pub struct FleetApi {
    store: FleetStore,
}

impl FleetApi {
    pub fn from_config(config: FleetConfig) -> Self {
        Self {
            store: FleetStore::new(config),
        }
    }

    pub fn from_env() -> Self {
        Self::from_config(FleetConfig::from_env())
    }

    pub fn config(&self) -> &FleetConfig {
        self.store.config()
    }

    pub fn snapshot(&self) -> Arc<FleetState> {
        self.store.get()
    }

    pub fn generation(&self) -> u64 {
        self.snapshot().generation
    }

    /// Rebuilds the fleet and returns the new generation.
    pub fn reinitialize(&self) -> u64 {
        let state = self.store.init();
        tracing::info!(generation = state.generation, "fleet reinitialized");
        state.generation
    }

    pub fn list_houses(&self) -> Vec<House> {
        self.snapshot().houses().to_vec()
    }

    pub fn get_house(&self, house_id: &str) -> Option<House> {
        self.snapshot().house(house_id).cloned()
    }

    pub fn get_telemetry(&self, house_id: &str) -> Vec<DailyTelemetry> {
        self.snapshot().telemetry(house_id).to_vec()
    }

    /// One day of a house's series. `Ok(None)` for an unknown house or a day past its
    /// current day; days outside the cycle are an error.
    pub fn get_daily(&self, house_id: &str, day: u32) -> EngineResult<Option<DailyTelemetry>> {
        if !(1..=contracts::CYCLE_DAYS).contains(&day) {
            return Err(EngineError::DayOutOfRange(day));
        }
        Ok(self
            .snapshot()
            .telemetry(house_id)
            .iter()
            .find(|entry| entry.day == day)
            .cloned())
    }

    pub fn get_weekly_metrics(&self, house_id: &str) -> Vec<WeeklyMetrics> {
        self.snapshot().weekly(house_id).to_vec()
    }

    /// Day-level FCR/PEF trend; empty for an unknown house.
    pub fn get_daily_kpis(&self, house_id: &str) -> Vec<DailyKpi> {
        let state = self.snapshot();
        state
            .record(house_id)
            .map(|record| weekly::daily_kpis(&record.house, &record.telemetry))
            .unwrap_or_default()
    }

    pub fn get_anomalies(&self, house_id: &str) -> Vec<Anomaly> {
        self.snapshot().anomalies(house_id).to_vec()
    }

    pub fn house_overview(&self, house_id: &str) -> Option<HouseOverview> {
        let state = self.snapshot();
        let record = state.record(house_id)?;
        Some(insights::house_overview(
            &record.house,
            &record.weekly,
            &record.anomalies,
        ))
    }

    pub fn fleet_summary(&self) -> FleetSummary {
        insights::fleet_summary(&self.snapshot())
    }

    pub fn fleet_report(&self) -> FleetReport {
        insights::fleet_report(&self.snapshot())
    }

    pub fn dose_response(
        &self,
        factor: Factor,
        week: u32,
        current: f64,
    ) -> EngineResult<DoseResponse> {
        causal::dose_response(factor, week, current)
    }

    pub fn pairwise_surface(
        &self,
        factor1: Factor,
        factor2: Factor,
        week: u32,
    ) -> EngineResult<PairwiseSurface> {
        causal::pairwise_surface(factor1, factor2, week)
    }

    pub fn recommendations(
        &self,
        week: u32,
        current: &FactorValues,
    ) -> EngineResult<Vec<Recommendation>> {
        causal::recommend(week, current)
    }

    pub fn current_factor_values(&self, week: u32) -> EngineResult<FactorValues> {
        causal::current_factor_values(week)
    }

    pub fn week_support(&self) -> EngineResult<Vec<WeekSupport>> {
        causal::week_support()
    }
}

impl Default for FleetApi {
    fn default() -> Self {
        Self::from_config(FleetConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn api() -> FleetApi {
        FleetApi::from_config(FleetConfig {
            reference_date: NaiveDate::from_ymd_opt(2026, 10, 18),
            ..FleetConfig::default()
        })
    }

    #[test]
    fn lookups_for_unknown_house_are_empty() {
        let api = api();
        assert!(api.get_house("H99").is_none());
        assert!(api.get_telemetry("H99").is_empty());
        assert!(api.get_weekly_metrics("H99").is_empty());
        assert!(api.get_anomalies("H99").is_empty());
        assert!(api.get_daily_kpis("H99").is_empty());
        assert!(api.house_overview("H99").is_none());
        assert_eq!(api.get_daily("H99", 3), Ok(None));
    }

    #[test]
    fn house_reads_agree_with_each_other() {
        let api = api();
        let houses = api.list_houses();
        assert_eq!(houses.len(), 10);
        let h01 = api.get_house("H01").expect("H01 exists");
        assert_eq!(houses[0], h01);
        assert_eq!(api.get_telemetry("H01").len(), h01.current_day as usize);
        assert_eq!(api.get_daily_kpis("H01").len(), h01.current_day as usize);

        let day = api.get_daily("H01", 5).expect("valid day").expect("day recorded");
        assert_eq!(day.day, 5);
        assert_eq!(api.get_daily("H01", 40), Ok(None));
        assert_eq!(api.get_daily("H01", 0), Err(EngineError::DayOutOfRange(0)));
    }

    #[test]
    fn reinitialize_advances_generation_and_keeps_content() {
        let api = api();
        let before = api.list_houses();
        let generation = api.generation();
        let next = api.reinitialize();
        assert_eq!(next, generation + 1);
        assert_eq!(api.generation(), next);
        assert_eq!(api.list_houses(), before);
    }

    #[test]
    fn advisory_calls_surface_invalid_arguments() {
        let api = api();
        assert!(api.dose_response(Factor::Light, 0, 18.0).is_err());
        assert!(api.current_factor_values(7).is_err());
        let current = api.current_factor_values(3).expect("valid week");
        let recommendations = api.recommendations(3, &current).expect("valid week");
        assert_eq!(recommendations[0].factor, Factor::Temperature);
        assert_eq!(api.week_support().expect("all weeks").len(), 6);
    }
}
