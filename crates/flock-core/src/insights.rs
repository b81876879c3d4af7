//! Fleet-level roll-ups for the dashboard, reports page, and per-house overview.

use contracts::{
    week_of_day, Anomaly, FarmHealth, FleetReport, FleetSummary, HealthStatus, House,
    HouseImprovement, HouseOverview, SavingsLine, Severity, TrendPoint, WeeklyMetrics,
    CYCLE_WEEKS,
};

use crate::fleet::FleetState;
use crate::round_to;
use crate::weekly::WEEKLY_IMPROVEMENT_RATE;

pub const TOP_ALERT_LIMIT: usize = 5;
pub const PEF_BASELINE_RATIO: f64 = 0.92;

/// Share of the total profit improvement attributed to each savings category.
pub const SAVINGS_SHARES: [(&str, f64); 4] = [
    ("Feed Optimization", 0.35),
    ("Energy Efficiency", 0.28),
    ("Mortality Reduction", 0.22),
    ("Other", 0.15),
];

pub fn fleet_summary(state: &FleetState) -> FleetSummary {
    let house_count = state.houses().len();
    let weekly = state
        .records()
        .flat_map(|record| record.weekly.iter())
        .collect::<Vec<_>>();

    let daily_profit = mean_over(weekly.iter().map(|entry| entry.profit), house_count);
    let avg_pef = mean_over(weekly.iter().map(|entry| entry.pef), weekly.len());
    let avg_fcr = mean_over(weekly.iter().map(|entry| entry.fcr), weekly.len());

    let mut critical = state
        .records()
        .flat_map(|record| record.anomalies.iter())
        .filter(|anomaly| anomaly.severity == Severity::High)
        .cloned()
        .collect::<Vec<_>>();
    let critical_alerts = critical.len();
    critical.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    critical.truncate(TOP_ALERT_LIMIT);

    FleetSummary {
        house_count,
        daily_profit,
        avg_pef,
        avg_fcr,
        critical_alerts,
        top_alerts: critical,
    }
}

pub fn house_overview(
    house: &House,
    weekly: &[WeeklyMetrics],
    anomalies: &[Anomaly],
) -> HouseOverview {
    let current_week = week_of_day(house.current_day);
    let current_metrics = weekly
        .iter()
        .find(|entry| entry.week == current_week)
        .cloned();
    let health = current_metrics
        .as_ref()
        .map(|metrics| {
            farm_health(metrics.pef, metrics.fcr, metrics.mortality, anomalies.len())
        });

    HouseOverview {
        house: house.clone(),
        current_week,
        current_metrics,
        profit_improvement_pct: improvement_pct(current_week),
        critical_alerts: count_critical(anomalies),
        health,
    }
}

/// Weighted 0–100 health score: PEF 30%, FCR 25%, mortality 25%, alert load 20%.
pub fn farm_health(pef: f64, fcr: f64, mortality: f64, alert_count: usize) -> FarmHealth {
    let pef_score = (pef / 400.0 * 100.0).min(100.0) * 0.3;
    let fcr_score = ((2.0 - fcr) / 0.5 * 100.0).max(0.0) * 0.25;
    let mortality_score = ((5.0 - mortality) / 5.0 * 100.0).max(0.0) * 0.25;
    let alert_score = ((20.0 - alert_count as f64) / 20.0 * 100.0).max(0.0) * 0.2;

    let score = (pef_score + fcr_score + mortality_score + alert_score)
        .round()
        .max(0.0) as u32;
    let status = if score > 75 {
        HealthStatus::Excellent
    } else if score > 50 {
        HealthStatus::Good
    } else {
        HealthStatus::Critical
    };

    FarmHealth { score, status }
}

pub fn fleet_report(state: &FleetState) -> FleetReport {
    let house_count = state.houses().len();
    let weekly = state
        .records()
        .flat_map(|record| record.weekly.iter())
        .collect::<Vec<_>>();

    let total_profit_improvement = weekly.iter().map(|entry| entry.profit).sum::<f64>();

    let mut profit_trend = Vec::with_capacity(CYCLE_WEEKS as usize);
    let mut pef_trend = Vec::with_capacity(CYCLE_WEEKS as usize);
    for week in 1..=CYCLE_WEEKS {
        let in_week = weekly
            .iter()
            .filter(|entry| entry.week == week)
            .collect::<Vec<_>>();
        let profit = mean_over(in_week.iter().map(|entry| entry.profit), house_count);
        let pef = mean_over(in_week.iter().map(|entry| entry.pef), house_count);

        profit_trend.push(TrendPoint {
            week,
            current: round_to(profit, 0),
            baseline: round_to(profit / (1.0 + f64::from(week) * WEEKLY_IMPROVEMENT_RATE), 0),
        });
        pef_trend.push(TrendPoint {
            week,
            current: round_to(pef, 1),
            baseline: round_to(pef * PEF_BASELINE_RATIO, 1),
        });
    }

    let savings = SAVINGS_SHARES
        .iter()
        .map(|(category, share)| SavingsLine {
            category: (*category).to_string(),
            value: total_profit_improvement * share,
        })
        .collect();

    let mut house_improvements = state
        .records()
        .map(|record| HouseImprovement {
            house_id: record.house.id.clone(),
            avg_profit: mean_over(
                record.weekly.iter().map(|entry| entry.profit),
                record.weekly.len(),
            ),
            improvement_pct: improvement_pct(record.house.current_week()),
        })
        .collect::<Vec<_>>();
    house_improvements.sort_by(|a, b| b.improvement_pct.total_cmp(&a.improvement_pct));

    FleetReport {
        total_profit_improvement,
        profit_trend,
        pef_trend,
        savings,
        house_improvements,
    }
}

fn improvement_pct(week: u32) -> f64 {
    round_to(f64::from(week) * WEEKLY_IMPROVEMENT_RATE * 100.0, 1)
}

fn count_critical(anomalies: &[Anomaly]) -> usize {
    anomalies
        .iter()
        .filter(|anomaly| anomaly.severity == Severity::High)
        .count()
}

/// Sum divided by `count`; an empty denominator yields 0.
fn mean_over(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::FleetStore;
    use chrono::NaiveDate;
    use contracts::FleetConfig;
    use std::sync::Arc;

    fn fleet() -> Arc<FleetState> {
        FleetStore::new(FleetConfig {
            reference_date: NaiveDate::from_ymd_opt(2026, 10, 18),
            ..FleetConfig::default()
        })
        .get()
    }

    #[test]
    fn health_score_weights_and_bands() {
        // Perfect PEF, FCR 1.5, zero mortality, no alerts: 30 + 25 + 25 + 20.
        assert_eq!(
            farm_health(400.0, 1.5, 0.0, 0),
            FarmHealth {
                score: 100,
                status: HealthStatus::Excellent
            }
        );
        // 15 + 12.5 + 12.5 + 10 = 50, which is not above the Good band.
        let half = farm_health(200.0, 1.75, 2.5, 10);
        assert_eq!(half.score, 50);
        assert_eq!(half.status, HealthStatus::Critical);
        assert_eq!(farm_health(300.0, 1.6, 1.0, 4).status, HealthStatus::Excellent);
        assert_eq!(farm_health(0.0, 3.0, 9.0, 40).score, 0);
    }

    #[test]
    fn summary_averages_all_weekly_records() {
        let state = fleet();
        let summary = fleet_summary(&state);
        let weekly = state
            .records()
            .flat_map(|record| record.weekly.clone())
            .collect::<Vec<_>>();

        assert_eq!(summary.house_count, 10);
        let profit = weekly.iter().map(|entry| entry.profit).sum::<f64>() / 10.0;
        assert!((summary.daily_profit - profit).abs() < 1e-6);
        let pef = weekly.iter().map(|entry| entry.pef).sum::<f64>() / weekly.len() as f64;
        assert!((summary.avg_pef - pef).abs() < 1e-9);
        assert!(summary.top_alerts.len() <= TOP_ALERT_LIMIT);
        assert!(summary.top_alerts.len() <= summary.critical_alerts);
        assert!(summary
            .top_alerts
            .iter()
            .all(|anomaly| anomaly.severity == Severity::High));
    }

    #[test]
    fn top_alerts_are_newest_first() {
        let state = fleet();
        let summary = fleet_summary(&state);
        assert!(summary
            .top_alerts
            .windows(2)
            .all(|pair| pair[0].timestamp >= pair[1].timestamp));
    }

    #[test]
    fn overview_uses_current_week_metrics() {
        let state = fleet();
        let record = state.record("H01").expect("H01 exists");
        let overview = house_overview(&record.house, &record.weekly, &record.anomalies);

        assert_eq!(overview.current_week, 5);
        assert_eq!(overview.profit_improvement_pct, 15.0);
        let metrics = overview.current_metrics.expect("week 5 metrics");
        assert_eq!(metrics.week, 5);
        assert_eq!(metrics.profit, 436_832.0);
        assert!(overview.health.is_some());
        assert_eq!(overview.critical_alerts, count_critical(&record.anomalies));
    }

    #[test]
    fn overview_without_metrics_has_no_health() {
        let state = fleet();
        let record = state.record("H02").expect("H02 exists");
        let overview = house_overview(&record.house, &[], &record.anomalies);
        assert!(overview.current_metrics.is_none());
        assert!(overview.health.is_none());
    }

    #[test]
    fn report_trends_cover_every_week() {
        let state = fleet();
        let report = fleet_report(&state);
        assert_eq!(report.profit_trend.len(), 6);
        assert_eq!(report.pef_trend.len(), 6);

        // No house in this fleet has reached week 6.
        assert_eq!(report.profit_trend[5].current, 0.0);
        for point in &report.pef_trend {
            assert!((point.baseline - round_to(point.current * PEF_BASELINE_RATIO, 1)).abs() <= 0.1);
        }

        let shares = report.savings.iter().map(|line| line.value).sum::<f64>();
        assert!((shares - report.total_profit_improvement).abs() < 1e-3);
        assert_eq!(report.savings[0].category, "Feed Optimization");
    }

    #[test]
    fn house_improvements_sort_by_week_uplift() {
        let state = fleet();
        let report = fleet_report(&state);
        assert_eq!(report.house_improvements.len(), 10);
        assert!(report
            .house_improvements
            .windows(2)
            .all(|pair| pair[0].improvement_pct >= pair[1].improvement_pct));
        // H01 (day 33) and H09 (day 29) are the only houses in week 5.
        let leaders = report.house_improvements[..2]
            .iter()
            .map(|entry| entry.house_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(leaders, vec!["H01", "H09"]);
        assert_eq!(report.house_improvements[0].improvement_pct, 15.0);
    }
}
