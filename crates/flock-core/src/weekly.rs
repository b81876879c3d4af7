//! Weekly KPI roll-up over a house's daily telemetry.

use contracts::{DailyKpi, DailyTelemetry, House, WeeklyMetrics, CYCLE_WEEKS, DAYS_PER_WEEK};

use crate::economy::{calculate_profit, daily_fcr, daily_pef, ProfitInputs, REFERENCE_FLOCK_SIZE};
use crate::round_to;

/// Per-week multiplier on daily profit modelling advisory interventions.
pub const WEEKLY_IMPROVEMENT_RATE: f64 = 0.03;

/// One record per week of the cycle that has telemetry, in week order.
///
/// Degenerate weeks resolve to zero instead of dividing: no live weight gives `fcr = 0`,
/// and `fcr = 0` gives `pef = 0`.
pub fn calculate_weekly_metrics(telemetry: &[DailyTelemetry]) -> Vec<WeeklyMetrics> {
    (1..=CYCLE_WEEKS)
        .filter_map(|week| {
            let days = telemetry
                .iter()
                .filter(|day| day.week == week)
                .collect::<Vec<_>>();
            summarize_week(week, &days)
        })
        .collect()
}

fn summarize_week(week: u32, days: &[&DailyTelemetry]) -> Option<WeeklyMetrics> {
    let last = days.last()?;
    let day_count = days.len() as f64;

    let total_feed = days.iter().map(|day| day.feed_intake_kg).sum::<f64>();
    let total_weight = days
        .iter()
        .map(|day| f64::from(day.birds_alive) * day.avg_weight_kg)
        .sum::<f64>();
    let avg_weight = last.avg_weight_kg;
    let fcr = if total_weight > 0.0 {
        total_feed / total_weight
    } else {
        0.0
    };

    let liveability = f64::from(last.birds_alive) / f64::from(REFERENCE_FLOCK_SIZE) * 100.0;
    let age_days = f64::from(week * DAYS_PER_WEEK);
    let pef = if fcr > 0.0 {
        liveability * avg_weight * 100.0 / (age_days * fcr)
    } else {
        0.0
    };

    let mortality = days.iter().map(|day| day.mortality).sum::<f64>() / day_count;

    let total_profit = days
        .iter()
        .map(|day| calculate_profit(&ProfitInputs::from_telemetry(day)).profit)
        .sum::<f64>();
    let daily_profit =
        total_profit / day_count * (1.0 + f64::from(week) * WEEKLY_IMPROVEMENT_RATE);

    Some(WeeklyMetrics {
        week,
        fcr: round_to(fcr, 2),
        pef: round_to(pef, 1),
        mortality: round_to(mortality * 100.0, 2),
        throughput: round_to(total_weight, 0),
        profit: round_to(daily_profit, 0),
        avg_weight: round_to(avg_weight, 2),
    })
}

/// Day-by-day FCR and PEF for a house, accumulating feed and mortality from the first day
/// of the series. FCR is taken against the house's placed capacity and PEF at the day's age.
pub fn daily_kpis(house: &House, telemetry: &[DailyTelemetry]) -> Vec<DailyKpi> {
    let mut cumulative_feed = 0.0;
    let mut cumulative_mortality = 0.0;

    telemetry
        .iter()
        .map(|day| {
            cumulative_feed += day.feed_intake_kg;
            cumulative_mortality += day.mortality;
            let fcr = daily_fcr(cumulative_feed, day.avg_weight_kg, house.capacity);
            let pef = daily_pef(day.avg_weight_kg, fcr, cumulative_mortality, day.day);
            DailyKpi {
                day: day.day,
                cumulative_feed_kg: round_to(cumulative_feed, 1),
                fcr: round_to(fcr, 2),
                pef: round_to(pef, 1),
                mortality: round_to(day.mortality * 100.0, 2),
                cumulative_mortality: round_to(cumulative_mortality * 100.0, 2),
            }
        })
        .collect()
}
