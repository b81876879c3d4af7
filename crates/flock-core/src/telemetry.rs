//! Per house-day telemetry synthesis.
//!
//! Every reading is recomputed from `(house, day)` alone: the stream is seeded with
//! `"{house_id}-day{day}"`, growth and attrition follow closed-form curves of the day index,
//! and nothing is carried over from the previous day's record. Draw order is part of the
//! output contract; reordering any `stream` call changes every downstream value.

use chrono::Days;
use contracts::{
    temperature_humidity_index, week_of_day, ClimateBias, DailyTelemetry, DensityGrid, House,
    CLUSTER_GRID_SIZE, CYCLE_DAYS,
};

use crate::rng::SeededStream;
use crate::{ensure_day, EngineResult};

pub const MARKET_WEIGHT_KG: f64 = 2.8;
const VACCINATION_DAYS: [u32; 3] = [7, 14, 21];

pub fn stream_label(house_id: &str, day: u32) -> String {
    format!("{house_id}-day{day}")
}

/// Telemetry for one day of `house`'s cycle. Days outside `1..=42` are rejected.
pub fn generate_daily(house: &House, day: u32) -> EngineResult<DailyTelemetry> {
    ensure_day(day)?;
    Ok(synthesize_day(house, day))
}

/// Full series for `house`, day 1 through `house.current_day`.
pub fn generate_series(house: &House) -> Vec<DailyTelemetry> {
    (1..=house.current_day.min(CYCLE_DAYS))
        .map(|day| synthesize_day(house, day))
        .collect()
}

/// Logistic growth curve centred on day 25.
pub fn average_weight_kg(day: u32) -> f64 {
    MARKET_WEIGHT_KG / (1.0 + (-(f64::from(day) - 25.0) / 7.0).exp())
}

/// Linear attrition estimate; never compounds the daily mortality draws.
pub fn birds_alive(house: &House, day: u32) -> u32 {
    let remaining = 1.0 - house.baseline_mortality * f64::from(day) / f64::from(CYCLE_DAYS);
    (f64::from(house.capacity) * remaining).floor().max(0.0) as u32
}

pub fn temperature_setpoint(week: u32) -> f64 {
    32.0 - (f64::from(week) - 1.0) * 1.5
}

fn synthesize_day(house: &House, day: u32) -> DailyTelemetry {
    let mut stream = SeededStream::new(stream_label(&house.id, day));
    let week = week_of_day(day);

    let temp_setpoint = temperature_setpoint(week);
    let temp_actual =
        temp_setpoint + house.climate_bias.temperature_offset() + stream.range(-0.5, 0.5);

    let humidity_base = if house.climate_bias == ClimateBias::Humid {
        75.0
    } else {
        60.0
    };
    let humidity = humidity_base + stream.range(-5.0, 5.0);

    let feed_intake_kg = f64::from(house.current_birds) * (0.05 + f64::from(week) * 0.015)
        + stream.range(-10.0, 10.0);
    let water_l = feed_intake_kg * 1.8 + stream.range(-20.0, 20.0);

    let power_heater = (32.0 - temp_actual) * 2.5 + stream.range(0.0, 5.0);
    let power_fans = f64::from(week) * 8.0 + stream.range(-2.0, 2.0);
    let power_lights = 15.0 + stream.range(-1.0, 1.0);
    let power_kwh = power_heater + power_fans + power_lights;

    let turn_interval = stream.integer(3, 7);
    let days_since_last_turn = i64::from(day) % turn_interval;
    let nh3 = (days_since_last_turn as f64 * 3.0 + stream.range(-2.0, 8.0)).max(0.0);

    let co2 = 1500.0 + f64::from(week) * 150.0 + humidity * 5.0 + stream.range(-100.0, 100.0);

    let dust_spike = if stream.boolean(0.15) {
        stream.range(5.0, 15.0)
    } else {
        0.0
    };
    let dust = 3.0 + dust_spike + stream.range(-0.5, 0.5);

    let avg_weight_kg = average_weight_kg(day);
    let mortality =
        house.baseline_mortality / f64::from(CYCLE_DAYS) + stream.range(-0.01, 0.02);
    let birds_alive = birds_alive(house, day);

    let outside_temp = 22.0 + stream.range(-5.0, 10.0);
    let outside_humidity = 55.0 + stream.range(-10.0, 15.0);
    let outside_pressure = 1013.0 + stream.range(-10.0, 10.0);

    let staff_entries = stream.integer(2, 6) as u32;
    let litter_turns = u32::from(days_since_last_turn == 0);
    let vaccine_events = u32::from(VACCINATION_DAYS.contains(&day));

    let timestamp = house
        .cycle_start_date
        .checked_add_days(Days::new(u64::from(day)))
        .unwrap_or(house.cycle_start_date);

    let airspeed_ms = 0.5 + f64::from(week) * 0.2 + stream.range(-0.1, 0.2);
    let thi = temperature_humidity_index(temp_actual, humidity);
    let baseline_noise = 55.0 + stream.range(-3.0, 8.0);
    let air_quality_stress = nh3 > 20.0 || dust > 10.0;
    let noise_db = if air_quality_stress || thi > 85.0 {
        stream.range(68.0, 80.0)
    } else {
        baseline_noise
    };
    let coughing_detected = air_quality_stress && stream.boolean(0.05);
    let raised_volume_detected = (thi > 85.0 || mortality > 0.15) && stream.boolean(0.08);

    let clustering = density_grid(&mut stream);
    let spread_metric = spread_metric(&clustering);
    let movement_index =
        (40.0 + f64::from(week) * 5.0 - thi * 0.3 + stream.range(-10.0, 10.0)).max(10.0);

    DailyTelemetry {
        house_id: house.id.clone(),
        day,
        week,
        timestamp,
        temp_setpoint,
        temp_actual,
        humidity,
        co2,
        nh3,
        dust,
        feed_intake_kg,
        water_l,
        power_kwh,
        power_heater,
        power_fans,
        power_lights,
        outside_temp,
        outside_humidity,
        outside_pressure,
        staff_entries,
        litter_turns,
        vaccine_events,
        birds_alive,
        avg_weight_kg,
        mortality,
        airspeed_ms,
        noise_db,
        coughing_detected,
        raised_volume_detected,
        clustering,
        spread_metric,
        movement_index,
    }
}

/// Base occupancy noise plus 2–3 Gaussian hot spots, clamped to `[0, 1]`.
///
/// Hot-spot centres are redrawn for every cell, which keeps the draw sequence identical to
/// the recorded fixtures.
fn density_grid(stream: &mut SeededStream) -> DensityGrid {
    let mut grid = [[0.0; CLUSTER_GRID_SIZE]; CLUSTER_GRID_SIZE];
    let hot_spots = stream.integer(2, 3);

    for (i, row) in grid.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            let mut density = 0.5 + stream.range(-0.2, 0.2);
            for _ in 0..hot_spots {
                let cx = stream.range(2.0, 8.0);
                let cy = stream.range(2.0, 8.0);
                let dist_sq = (i as f64 - cx).powi(2) + (j as f64 - cy).powi(2);
                density += (-dist_sq / 8.0).exp() * stream.range(0.2, 0.4);
            }
            *cell = density.clamp(0.0, 1.0);
        }
    }

    grid
}

/// `1 - min(1, stddev / mean)`; 1 means perfectly even occupancy.
pub fn spread_metric(grid: &DensityGrid) -> f64 {
    let cells = grid.iter().flatten().copied().collect::<Vec<_>>();
    let count = cells.len() as f64;
    let mean = cells.iter().sum::<f64>() / count;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance = cells.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / count;
    1.0 - (variance.sqrt() / mean).min(1.0)
}
