async fn get_fleet_summary(
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let fleet = state.api().snapshot();
    query_response(
        "fleet_summary",
        fleet.generation,
        insights::fleet_summary(&fleet),
    )
}

async fn get_fleet_report(
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let fleet = state.api().snapshot();
    query_response("fleet_report", fleet.generation, insights::fleet_report(&fleet))
}

/// Rebuilds on the blocking pool so the runtime keeps serving reads from the old snapshot.
async fn reinitialize_fleet(
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let api = Arc::clone(&state.api);
    let generation = tokio::task::spawn_blocking(move || api.reinitialize())
        .await
        .map_err(|err| HttpApiError::internal("fleet rebuild failed", Some(err.to_string())))?;

    query_response(
        "fleet_reinitialized",
        generation,
        json!({ "generation": generation }),
    )
}
