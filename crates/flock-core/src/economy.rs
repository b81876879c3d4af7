//! Per-day profit model and the fixed cost table it prices against.

use contracts::DailyTelemetry;

/// Flock size that every per-bird cost and the liveability figure are normalised to.
/// Deliberately not the house capacity.
pub const REFERENCE_FLOCK_SIZE: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostTable {
    /// Rand per kg live weight.
    pub sale_price: f64,
    pub avg_harvest_weight: f64,
    /// Rand per kg feed.
    pub feed_cost: f64,
    /// Rand per day-old chick.
    pub chick_cost: f64,
    /// Rand per kWh.
    pub electricity_cost: f64,
    /// Rand per litre.
    pub water_cost: f64,
    pub vaccine_cost: f64,
    pub litter_cost: f64,
    pub labour_cost: f64,
    pub maintenance_cost: f64,
}

pub const COSTS: CostTable = CostTable {
    sale_price: 32.0,
    avg_harvest_weight: 2.5,
    feed_cost: 8.5,
    chick_cost: 15.0,
    electricity_cost: 2.5,
    water_cost: 0.02,
    vaccine_cost: 1.5,
    litter_cost: 0.5,
    labour_cost: 7.5,
    maintenance_cost: 3.5,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfitInputs {
    pub birds_alive: u32,
    pub avg_weight_kg: f64,
    pub feed_intake_kg: f64,
    pub water_l: f64,
    pub power_kwh: f64,
    /// Head count the per-bird costs are charged against.
    pub capacity: u32,
}

impl ProfitInputs {
    /// Inputs for one telemetry day, priced against the reference flock.
    pub fn from_telemetry(day: &DailyTelemetry) -> Self {
        Self {
            birds_alive: day.birds_alive,
            avg_weight_kg: day.avg_weight_kg,
            feed_intake_kg: day.feed_intake_kg,
            water_l: day.water_l,
            power_kwh: day.power_kwh,
            capacity: REFERENCE_FLOCK_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfitCalculation {
    pub revenue: f64,
    pub total_costs: f64,
    pub profit: f64,
    pub profit_per_bird: f64,
    /// Profit as a percentage of revenue.
    pub margin: f64,
}

pub fn calculate_profit(inputs: &ProfitInputs) -> ProfitCalculation {
    let birds = f64::from(inputs.birds_alive);
    let capacity = f64::from(inputs.capacity);

    let revenue = birds * inputs.avg_weight_kg * COSTS.sale_price;
    let total_costs = inputs.feed_intake_kg * COSTS.feed_cost
        + capacity * COSTS.chick_cost
        + inputs.power_kwh * COSTS.electricity_cost
        + inputs.water_l * COSTS.water_cost
        + capacity * COSTS.vaccine_cost
        + capacity * COSTS.litter_cost
        + capacity * COSTS.labour_cost
        + capacity * COSTS.maintenance_cost;

    let profit = revenue - total_costs;
    let profit_per_bird = if inputs.birds_alive > 0 {
        profit / birds
    } else {
        0.0
    };
    let margin = if revenue > 0.0 {
        profit / revenue * 100.0
    } else {
        0.0
    };

    ProfitCalculation {
        revenue,
        total_costs,
        profit,
        profit_per_bird,
        margin,
    }
}

/// Cumulative feed over the standing flock's live weight; 0 when there is no weight.
pub fn daily_fcr(cumulative_feed_kg: f64, avg_weight_kg: f64, initial_birds: u32) -> f64 {
    if avg_weight_kg == 0.0 || initial_birds == 0 {
        return 0.0;
    }
    cumulative_feed_kg / (avg_weight_kg * f64::from(initial_birds))
}

/// Production efficiency factor from a mortality fraction; 0 for zero FCR or age.
pub fn daily_pef(avg_weight_kg: f64, fcr: f64, mortality_rate: f64, age_days: u32) -> f64 {
    if fcr == 0.0 || age_days == 0 {
        return 0.0;
    }
    let liveability = (1.0 - mortality_rate) * 100.0;
    liveability * avg_weight_kg * 100.0 / (fcr * f64::from(age_days))
}
