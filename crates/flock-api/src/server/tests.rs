use super::*;
use chrono::NaiveDate;
use contracts::{DailyKpi, House, Recommendation};

fn test_state() -> AppState {
    AppState::new(FleetApi::from_config(FleetConfig {
        reference_date: NaiveDate::from_ymd_opt(2026, 10, 18),
        ..FleetConfig::default()
    }))
}

#[tokio::test]
async fn house_listing_wraps_registry_in_envelope() {
    let Json(response) = list_houses(State(test_state()))
        .await
        .expect("houses query");
    assert_eq!(response.schema_version, SCHEMA_VERSION_V1);
    assert_eq!(response.query_type, "houses");
    assert_eq!(response.fleet_generation, 1);

    let houses: Vec<House> = serde_json::from_value(response.data).expect("house list");
    assert_eq!(houses.len(), 10);
    assert_eq!(houses[0].id, "H01");
}

#[tokio::test]
async fn unknown_house_is_not_found_but_collections_are_empty() {
    let state = test_state();
    let err = get_house(Path("H77".to_string()), State(state.clone()))
        .await
        .expect_err("unknown house");
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.error.error_code, ErrorCode::HouseNotFound);

    let overview = get_house_overview(Path("H77".to_string()), State(state.clone())).await;
    assert!(overview.is_err());

    let Json(response) = get_house_anomalies(Path("H77".to_string()), State(state))
        .await
        .expect("empty collection");
    assert_eq!(response.data, json!([]));
}

#[tokio::test]
async fn telemetry_day_filter_validates_cycle_bounds() {
    let state = test_state();
    let Json(response) = get_house_telemetry(
        Path("H02".to_string()),
        State(state.clone()),
        Query(TelemetryQuery { day: Some(4) }),
    )
    .await
    .expect("telemetry query");
    let days = response.data.as_array().expect("array payload");
    assert_eq!(days.len(), 1);
    assert_eq!(days[0]["day"], json!(4));

    let err = get_house_telemetry(
        Path("H02".to_string()),
        State(state),
        Query(TelemetryQuery { day: Some(50) }),
    )
    .await
    .expect_err("day out of range");
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.error.error_code, ErrorCode::InvalidQuery);
}

#[tokio::test]
async fn reinitialize_bumps_generation_in_envelope() {
    let state = test_state();
    let Json(before) = get_fleet_summary(State(state.clone()))
        .await
        .expect("summary");
    assert_eq!(before.fleet_generation, 1);

    let Json(rebuilt) = reinitialize_fleet(State(state.clone()))
        .await
        .expect("reinitialize");
    assert_eq!(rebuilt.fleet_generation, 2);
    assert_eq!(rebuilt.data["generation"], json!(2));

    let Json(after) = get_fleet_summary(State(state)).await.expect("summary");
    assert_eq!(after.fleet_generation, 2);
    assert_eq!(after.data, before.data);
}

#[tokio::test]
async fn advisory_routes_reject_bad_factor_and_week() {
    let state = test_state();
    let err = get_dose_response(
        Path(("3".to_string(), "humidity".to_string())),
        State(state.clone()),
        Query(DoseResponseQuery::default()),
    )
    .await
    .expect_err("unknown factor");
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert!(err
        .error
        .details
        .as_deref()
        .is_some_and(|details| details.contains("humidity")));

    let err = get_recommendations(
        Path("9".to_string()),
        State(state),
        Query(OperatingPointQuery::default()),
    )
    .await
    .expect_err("week out of range");
    assert_eq!(err.error.error_code, ErrorCode::InvalidQuery);
}

#[tokio::test]
async fn dose_response_flags_uncertain_doses() {
    let Json(response) = get_dose_response(
        Path(("2".to_string(), "vent".to_string())),
        State(test_state()),
        Query(DoseResponseQuery {
            current: Some(61.0),
        }),
    )
    .await
    .expect("dose response");
    assert_eq!(response.data["factor"], json!("vent"));
    assert_eq!(response.data["current"], json!(61.0));
    assert_eq!(response.data["label"], json!("Ventilation (%)"));
    assert_eq!(response.data["unit"], json!("%"));
    let uncertain = response.data["uncertain"].as_array().expect("flags");
    assert_eq!(uncertain.len(), 20);
}

#[tokio::test]
async fn recommendation_overrides_replace_current_values() {
    let Json(response) = get_recommendations(
        Path("3".to_string()),
        State(test_state()),
        Query(OperatingPointQuery {
            light: Some(12.0),
            ..OperatingPointQuery::default()
        }),
    )
    .await
    .expect("recommendations");
    assert_eq!(response.data["current"]["light"], json!(12.0));

    let recommendations: Vec<Recommendation> =
        serde_json::from_value(response.data["recommendations"].clone()).expect("list");
    let light = recommendations
        .iter()
        .find(|entry| entry.factor == Factor::Light)
        .expect("light entry");
    assert_eq!(light.current_value, 12.0);
    assert!(recommendations
        .windows(2)
        .all(|pair| pair[0].pef_uplift >= pair[1].pef_uplift));
}

#[tokio::test]
async fn non_numeric_week_gets_the_error_envelope() {
    let state = test_state();
    let err = get_current_values(Path("three".to_string()), State(state.clone()))
        .await
        .expect_err("non-numeric week");
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.error.error_code, ErrorCode::InvalidQuery);
    assert_eq!(err.error.details.as_deref(), Some("week=three"));

    let err = get_pairwise_surface(
        Path(("-1".to_string(), "light".to_string(), "temp".to_string())),
        State(state.clone()),
    )
    .await
    .expect_err("negative week");
    assert_eq!(err.error.error_code, ErrorCode::InvalidQuery);

    let Json(response) = get_current_values(Path("4".to_string()), State(state))
        .await
        .expect("numeric week");
    assert_eq!(response.query_type, "current_factor_values");
}

#[tokio::test]
async fn daily_kpis_follow_the_house_series() {
    let state = test_state();
    let Json(response) = get_house_daily_kpis(Path("H01".to_string()), State(state.clone()))
        .await
        .expect("daily kpis");
    assert_eq!(response.query_type, "house_daily_kpis");
    let kpis: Vec<DailyKpi> = serde_json::from_value(response.data).expect("kpi list");
    let h01 = state.api().get_house("H01").expect("H01 exists");
    assert_eq!(kpis.len(), h01.current_day as usize);
    assert_eq!(kpis[0].day, 1);

    let telemetry = state.api().get_telemetry("H01");
    let feed = telemetry.iter().map(|day| day.feed_intake_kg).sum::<f64>();
    let last = kpis.last().expect("last day");
    assert!((last.cumulative_feed_kg - feed).abs() <= 0.05);

    let Json(empty) = get_house_daily_kpis(Path("H77".to_string()), State(state))
        .await
        .expect("unknown house");
    assert_eq!(empty.data, json!([]));
}

#[test]
fn cors_headers_are_permissive() {
    let mut headers = axum::http::HeaderMap::new();
    apply_cors_headers(&mut headers);
    assert_eq!(
        headers.get("access-control-allow-origin"),
        Some(&HeaderValue::from_static("*"))
    );
    assert_eq!(
        headers.get("access-control-allow-methods"),
        Some(&HeaderValue::from_static("GET,POST,OPTIONS"))
    );
}

#[test]
fn bind_address_falls_back_to_loopback() {
    if std::env::var(BIND_ADDR_ENV).is_err() {
        assert_eq!(default_bind_addr(), DEFAULT_BIND_ADDR);
    }
    assert!(DEFAULT_BIND_ADDR.parse::<SocketAddr>().is_ok());
}
