//! Threshold and day-over-day anomaly scan over one house's telemetry series.

use contracts::{Anomaly, AnomalyKind, DailyTelemetry, Severity};

pub const NH3_HIGH: f64 = 35.0;
pub const NH3_ELEVATED: f64 = 25.0;
pub const NH3_DAILY_RISE: f64 = 8.0;
pub const CO2_HIGH: f64 = 3000.0;
pub const CO2_ELEVATED: f64 = 2500.0;
pub const DUST_ELEVATED: f64 = 13.0;
pub const THI_HIGH: f64 = 90.0;
pub const THI_ELEVATED: f64 = 85.0;
pub const MORTALITY_HIGH: f64 = 0.15;
pub const SPREAD_FLOOR: f64 = 0.6;
pub const MOVEMENT_FLOOR: f64 = 30.0;

/// Scans `series` left to right. A day may raise several anomalies; only the NH₃ rise rule
/// looks at the previous day. Output order is day order, then rule order below.
pub fn detect_anomalies(series: &[DailyTelemetry]) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();
    let mut previous: Option<&DailyTelemetry> = None;

    for day in series {
        scan_day(day, previous, &mut anomalies);
        previous = Some(day);
    }

    anomalies
}

fn scan_day(t: &DailyTelemetry, prev: Option<&DailyTelemetry>, out: &mut Vec<Anomaly>) {
    if t.nh3 > NH3_ELEVATED {
        out.push(anomaly(
            t,
            AnomalyKind::Ammonia,
            t.nh3,
            if t.nh3 > NH3_HIGH {
                Severity::High
            } else {
                Severity::Medium
            },
            format!("Ammonia levels elevated at {:.1} ppm", t.nh3),
            "Increase ventilation and turn litter immediately",
        ));
    } else if let Some(prev) = prev.filter(|prev| t.nh3 > prev.nh3 + NH3_DAILY_RISE) {
        out.push(anomaly(
            t,
            AnomalyKind::AmmoniaSpike,
            t.nh3,
            Severity::Medium,
            format!("Sharp ammonia increase: {:.1} ppm", t.nh3 - prev.nh3),
            "Check litter moisture and ventilation rates",
        ));
    }

    if t.co2 > CO2_ELEVATED {
        out.push(anomaly(
            t,
            AnomalyKind::CarbonDioxide,
            t.co2,
            if t.co2 > CO2_HIGH {
                Severity::High
            } else {
                Severity::Medium
            },
            format!("CO₂ concentration at {:.0} ppm", t.co2),
            "Boost ventilation fans to maintain air quality",
        ));
    }

    if t.dust > DUST_ELEVATED {
        out.push(anomaly(
            t,
            AnomalyKind::Dust,
            t.dust,
            Severity::Medium,
            format!("Dust levels elevated at {:.1} mg/m³", t.dust),
            "Reduce activity and check ventilation system",
        ));
    }

    let thi = t.thi();
    if thi > THI_ELEVATED {
        out.push(anomaly(
            t,
            AnomalyKind::HeatStress,
            thi,
            if thi > THI_HIGH {
                Severity::High
            } else {
                Severity::Medium
            },
            format!("Heat stress conditions detected (THI: {thi:.1})"),
            "Increase fan speed, consider evaporative cooling",
        ));
    }

    if t.mortality > MORTALITY_HIGH {
        out.push(anomaly(
            t,
            AnomalyKind::Mortality,
            t.mortality * 100.0,
            Severity::High,
            format!("Daily mortality at {:.2}%", t.mortality * 100.0),
            "Inspect flock health, consult veterinarian",
        ));
    }

    if t.coughing_detected {
        out.push(anomaly(
            t,
            AnomalyKind::Coughing,
            1.0,
            Severity::Medium,
            "AI detected coughing sounds from flock".to_string(),
            "Check air quality (NH₃, dust levels). Inspect ventilation system.",
        ));
    }

    if t.raised_volume_detected {
        out.push(anomaly(
            t,
            AnomalyKind::RaisedVolume,
            t.noise_db,
            Severity::Medium,
            format!("Elevated stress vocalizations detected ({:.0} dB)", t.noise_db),
            "Inspect flock for health issues, check temperature and humidity comfort.",
        ));
    }

    if t.spread_metric < SPREAD_FLOOR {
        out.push(anomaly(
            t,
            AnomalyKind::Clustering,
            t.spread_metric,
            Severity::Low,
            format!(
                "Birds clustering unevenly (spread score: {:.2})",
                t.spread_metric
            ),
            "Check temperature zones, ensure water and feed access is uniform.",
        ));
    }

    if t.movement_index < MOVEMENT_FLOOR {
        out.push(anomaly(
            t,
            AnomalyKind::LowMovement,
            t.movement_index,
            Severity::Medium,
            format!(
                "Low flock activity detected (movement index: {:.0})",
                t.movement_index
            ),
            "Assess flock health and environmental comfort. Check for illness or heat stress.",
        ));
    }
}

fn anomaly(
    t: &DailyTelemetry,
    kind: AnomalyKind,
    value: f64,
    severity: Severity,
    message: String,
    suggestion: &str,
) -> Anomaly {
    Anomaly {
        id: format!("{}-d{}-{}", t.house_id, t.day, kind.tag()),
        house_id: t.house_id.clone(),
        day: t.day,
        timestamp: t.timestamp,
        kind,
        metric: kind.label().to_string(),
        value,
        severity,
        message,
        suggestion: suggestion.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use contracts::CLUSTER_GRID_SIZE;

    fn calm_day(day: u32) -> DailyTelemetry {
        DailyTelemetry {
            house_id: "H01".to_string(),
            day,
            week: contracts::week_of_day(day),
            timestamp: NaiveDate::from_ymd_opt(2026, 9, 1).expect("valid date")
                + chrono::Duration::days(i64::from(day)),
            temp_setpoint: 29.0,
            temp_actual: 20.0,
            humidity: 50.0,
            co2: 2000.0,
            nh3: 20.0,
            dust: 5.0,
            feed_intake_kg: 900.0,
            water_l: 1600.0,
            power_kwh: 60.0,
            power_heater: 30.0,
            power_fans: 15.0,
            power_lights: 15.0,
            outside_temp: 22.0,
            outside_humidity: 55.0,
            outside_pressure: 1013.0,
            staff_entries: 3,
            litter_turns: 0,
            vaccine_events: 0,
            birds_alive: 9_800,
            avg_weight_kg: 1.2,
            mortality: 0.01,
            airspeed_ms: 1.0,
            noise_db: 58.0,
            coughing_detected: false,
            raised_volume_detected: false,
            clustering: [[0.5; CLUSTER_GRID_SIZE]; CLUSTER_GRID_SIZE],
            spread_metric: 0.9,
            movement_index: 45.0,
        }
    }

    #[test]
    fn calm_day_raises_nothing() {
        assert!(detect_anomalies(&[calm_day(10)]).is_empty());
    }

    #[test]
    fn severe_ammonia_raises_single_high_event() {
        let mut day = calm_day(10);
        day.nh3 = 40.0;
        let anomalies = detect_anomalies(&[day]);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::Ammonia);
        assert_eq!(anomalies[0].severity, Severity::High);
        assert_eq!(anomalies[0].id, "H01-d10-nh3");
        assert_eq!(anomalies[0].message, "Ammonia levels elevated at 40.0 ppm");
    }

    #[test]
    fn elevated_ammonia_suppresses_rise_rule() {
        let mut first = calm_day(1);
        first.nh3 = 5.0;
        let mut second = calm_day(2);
        second.nh3 = 30.0;
        let anomalies = detect_anomalies(&[first, second]);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::Ammonia);
        assert_eq!(anomalies[0].severity, Severity::Medium);
    }

    #[test]
    fn ammonia_rise_compares_against_previous_day_only() {
        let mut first = calm_day(1);
        first.nh3 = 4.0;
        let mut second = calm_day(2);
        second.nh3 = 13.0;
        let mut third = calm_day(3);
        third.nh3 = 20.0;
        let anomalies = detect_anomalies(&[first.clone(), second, third]);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].id, "H01-d2-nh3-spike");
        assert_eq!(anomalies[0].message, "Sharp ammonia increase: 9.0 ppm");

        // First day of a series has nothing to compare with.
        let mut lone = first;
        lone.nh3 = 24.0;
        assert!(detect_anomalies(&[lone]).is_empty());
    }

    #[test]
    fn co2_and_heat_bands_split_medium_and_high() {
        let mut medium = calm_day(5);
        medium.co2 = 2600.0;
        medium.temp_actual = 60.0;
        medium.humidity = 75.0; // THI 87
        let mut high = calm_day(6);
        high.co2 = 3100.0;
        high.temp_actual = 65.0;
        high.humidity = 75.0; // THI 92

        let anomalies = detect_anomalies(&[medium, high]);
        let summary = anomalies
            .iter()
            .map(|entry| (entry.id.as_str(), entry.severity))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                ("H01-d5-co2", Severity::Medium),
                ("H01-d5-heat", Severity::Medium),
                ("H01-d6-co2", Severity::High),
                ("H01-d6-heat", Severity::High),
            ]
        );
    }

    #[test]
    fn behavioural_and_biological_rules_fire_in_rule_order() {
        let mut day = calm_day(8);
        day.dust = 14.0;
        day.mortality = 0.2;
        day.coughing_detected = true;
        day.raised_volume_detected = true;
        day.noise_db = 74.4;
        day.spread_metric = 0.55;
        day.movement_index = 25.0;

        let anomalies = detect_anomalies(&[day]);
        let kinds = anomalies.iter().map(|entry| entry.kind).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                AnomalyKind::Dust,
                AnomalyKind::Mortality,
                AnomalyKind::Coughing,
                AnomalyKind::RaisedVolume,
                AnomalyKind::Clustering,
                AnomalyKind::LowMovement,
            ]
        );
        assert_eq!(anomalies[1].value, 20.0);
        assert_eq!(anomalies[1].severity, Severity::High);
        assert_eq!(anomalies[3].message, "Elevated stress vocalizations detected (74 dB)");
        assert_eq!(anomalies[4].severity, Severity::Low);
        assert_eq!(anomalies[4].metric, "Poor Flock Distribution");
    }

    #[test]
    fn detection_is_idempotent() {
        let mut series = (1..=7).map(calm_day).collect::<Vec<_>>();
        series[3].nh3 = 31.0;
        series[5].dust = 20.0;
        assert_eq!(detect_anomalies(&series), detect_anomalies(&series));
    }
}
