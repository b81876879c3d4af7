//! Fleet state store: lazily materialised, read-only snapshot of every house.
//!
//! The first `get()` builds houses, telemetry, weekly metrics, and anomalies in one pass and
//! caches the result behind an `Arc`. Later reads share that snapshot until `reset()` or
//! `init()` replaces it. Each build bumps a generation counter so consumers can tell two
//! snapshots apart without comparing their contents.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::NaiveDate;
use contracts::{Anomaly, DailyTelemetry, FleetConfig, House, WeeklyMetrics};
use rayon::prelude::*;

use crate::anomaly::detect_anomalies;
use crate::registry::generate_houses;
use crate::telemetry::generate_series;
use crate::weekly::calculate_weekly_metrics;

#[derive(Debug, Clone, PartialEq)]
pub struct HouseRecord {
    pub house: House,
    pub telemetry: Vec<DailyTelemetry>,
    pub weekly: Vec<WeeklyMetrics>,
    pub anomalies: Vec<Anomaly>,
}

impl HouseRecord {
    pub fn build(house: House) -> Self {
        let telemetry = generate_series(&house);
        let weekly = calculate_weekly_metrics(&telemetry);
        let anomalies = detect_anomalies(&telemetry);
        tracing::debug!(
            house_id = %house.id,
            days = telemetry.len(),
            anomalies = anomalies.len(),
            "built house record"
        );
        Self {
            house,
            telemetry,
            weekly,
            anomalies,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FleetState {
    pub generation: u64,
    pub reference_date: NaiveDate,
    houses: Vec<House>,
    records: BTreeMap<String, HouseRecord>,
}

impl FleetState {
    pub fn houses(&self) -> &[House] {
        &self.houses
    }

    pub fn house(&self, house_id: &str) -> Option<&House> {
        self.records.get(house_id).map(|record| &record.house)
    }

    pub fn record(&self, house_id: &str) -> Option<&HouseRecord> {
        self.records.get(house_id)
    }

    /// Records in registry order (`H01` first).
    pub fn records(&self) -> impl Iterator<Item = &HouseRecord> + '_ {
        self.houses
            .iter()
            .filter_map(|house| self.records.get(&house.id))
    }

    pub fn telemetry(&self, house_id: &str) -> &[DailyTelemetry] {
        self.record(house_id)
            .map(|record| record.telemetry.as_slice())
            .unwrap_or_default()
    }

    pub fn weekly(&self, house_id: &str) -> &[WeeklyMetrics] {
        self.record(house_id)
            .map(|record| record.weekly.as_slice())
            .unwrap_or_default()
    }

    pub fn anomalies(&self, house_id: &str) -> &[Anomaly] {
        self.record(house_id)
            .map(|record| record.anomalies.as_slice())
            .unwrap_or_default()
    }

    pub fn anomaly_count(&self) -> usize {
        self.records.values().map(|record| record.anomalies.len()).sum()
    }
}

#[derive(Debug)]
pub struct FleetStore {
    config: FleetConfig,
    build_pool: Option<rayon::ThreadPool>,
    cache: RwLock<Option<Arc<FleetState>>>,
    generation: AtomicU64,
}

impl FleetStore {
    pub fn new(config: FleetConfig) -> Self {
        let build_worker_threads = usize::from(config.build_worker_threads.max(1));
        let build_pool = if build_worker_threads > 1 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(build_worker_threads)
                .build()
                .ok()
        } else {
            None
        };

        Self {
            config,
            build_pool,
            cache: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    /// Cached snapshot, building it on first use. Concurrent first callers wait on the
    /// write guard and then share the single build.
    pub fn get(&self) -> Arc<FleetState> {
        if let Some(state) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Arc::clone(state);
        }

        let mut slot = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(state) = slot.as_ref() {
            return Arc::clone(state);
        }
        let state = Arc::new(self.build());
        *slot = Some(Arc::clone(&state));
        state
    }

    /// Rebuilds eagerly and replaces whatever snapshot was cached. Readers keep getting the
    /// previous snapshot while the build runs; the write guard is only held for the swap.
    pub fn init(&self) -> Arc<FleetState> {
        let state = Arc::new(self.build());
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&state));
        state
    }

    /// Drops the cached snapshot; the next `get()` rebuilds. Outstanding `Arc`s stay valid.
    pub fn reset(&self) {
        let previous = self
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        tracing::info!(
            dropped_generation = previous.as_ref().map(|state| state.generation),
            "fleet cache reset"
        );
    }

    pub fn is_initialized(&self) -> bool {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn build(&self) -> FleetState {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let reference_date = self.config.resolved_reference_date();
        tracing::info!(
            generation,
            %reference_date,
            parallel = self.build_pool.is_some(),
            "building fleet state"
        );

        let houses = generate_houses(reference_date);
        let built = match &self.build_pool {
            Some(pool) => pool.install(|| {
                houses
                    .par_iter()
                    .cloned()
                    .map(HouseRecord::build)
                    .collect::<Vec<_>>()
            }),
            None => houses
                .iter()
                .cloned()
                .map(HouseRecord::build)
                .collect::<Vec<_>>(),
        };
        let records = built
            .into_iter()
            .map(|record| (record.house.id.clone(), record))
            .collect::<BTreeMap<_, _>>();

        let state = FleetState {
            generation,
            reference_date,
            houses,
            records,
        };
        tracing::info!(
            generation,
            houses = state.houses.len(),
            anomalies = state.anomaly_count(),
            "fleet state ready"
        );
        state
    }
}

impl Default for FleetStore {
    fn default() -> Self {
        Self::new(FleetConfig::default())
    }
}
