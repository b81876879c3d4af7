#[derive(Debug, Deserialize, Default)]
struct TelemetryQuery {
    day: Option<u32>,
}

async fn list_houses(State(state): State<AppState>) -> Result<Json<QueryResponse>, HttpApiError> {
    let fleet = state.api().snapshot();
    query_response("houses", fleet.generation, fleet.houses())
}

async fn get_house(
    Path(house_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let fleet = state.api().snapshot();
    let house = fleet
        .house(&house_id)
        .ok_or_else(|| HttpApiError::house_not_found(&house_id))?;
    query_response("house", fleet.generation, house)
}

/// Unknown houses read as an empty series, matching the in-process API.
async fn get_house_telemetry(
    Path(house_id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<TelemetryQuery>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let fleet = state.api().snapshot();
    let series = fleet.telemetry(&house_id);

    match query.day {
        Some(day) => {
            if !(1..=contracts::CYCLE_DAYS).contains(&day) {
                return Err(EngineError::DayOutOfRange(day).into());
            }
            let selected = series
                .iter()
                .filter(|entry| entry.day == day)
                .collect::<Vec<_>>();
            query_response("house_telemetry", fleet.generation, selected)
        }
        None => query_response("house_telemetry", fleet.generation, series),
    }
}

async fn get_house_weekly(
    Path(house_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let fleet = state.api().snapshot();
    query_response("house_weekly", fleet.generation, fleet.weekly(&house_id))
}

async fn get_house_daily_kpis(
    Path(house_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let fleet = state.api().snapshot();
    let kpis = fleet
        .record(&house_id)
        .map(|record| weekly::daily_kpis(&record.house, &record.telemetry))
        .unwrap_or_default();
    query_response("house_daily_kpis", fleet.generation, kpis)
}

async fn get_house_anomalies(
    Path(house_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let fleet = state.api().snapshot();
    query_response(
        "house_anomalies",
        fleet.generation,
        fleet.anomalies(&house_id),
    )
}

async fn get_house_overview(
    Path(house_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let fleet = state.api().snapshot();
    let record = fleet
        .record(&house_id)
        .ok_or_else(|| HttpApiError::house_not_found(&house_id))?;
    let overview = insights::house_overview(&record.house, &record.weekly, &record.anomalies);
    query_response("house_overview", fleet.generation, overview)
}
