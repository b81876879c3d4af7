fn query_response(
    query_type: &str,
    fleet_generation: u64,
    data: impl Serialize,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let data = serde_json::to_value(data).map_err(|err| {
        HttpApiError::internal("failed to encode query payload", Some(err.to_string()))
    })?;

    Ok(Json(QueryResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        query_type: query_type.to_string(),
        fleet_generation,
        data,
    }))
}

fn parse_factor(raw: &str) -> Result<Factor, HttpApiError> {
    raw.parse::<Factor>()
        .map_err(|err| HttpApiError::from_engine(EngineError::from(err)))
}

const CORS_HEADERS: [(&str, &str); 3] = [
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "GET,POST,OPTIONS"),
    ("access-control-allow-headers", "content-type"),
];

fn parse_week(raw: &str) -> Result<u32, HttpApiError> {
    raw.trim().parse::<u32>().map_err(|_| {
        HttpApiError::invalid_query(
            "week must be a whole number in 1..=6",
            Some(format!("week={raw}")),
        )
    })
}

fn apply_cors_headers(headers: &mut axum::http::HeaderMap) {
    for (name, value) in CORS_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
}

/// `FLOCK_BIND_ADDR` when set, otherwise loopback on 8080.
pub fn default_bind_addr() -> String {
    std::env::var(BIND_ADDR_ENV)
        .ok()
        .filter(|addr| !addr.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
}
