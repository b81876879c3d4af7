#[derive(Debug, Deserialize, Default)]
struct DoseResponseQuery {
    current: Option<f64>,
}

/// Per-factor overrides on top of the week's synthesized operating point.
#[derive(Debug, Deserialize, Default)]
struct OperatingPointQuery {
    light: Option<f64>,
    temp: Option<f64>,
    vent: Option<f64>,
    protein: Option<f64>,
}

impl OperatingPointQuery {
    fn apply(&self, values: &mut FactorValues) {
        let overrides = [
            (Factor::Light, self.light),
            (Factor::Temperature, self.temp),
            (Factor::Ventilation, self.vent),
            (Factor::Protein, self.protein),
        ];
        for (factor, value) in overrides {
            if let Some(value) = value {
                values.set(factor, value);
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct DoseResponseView {
    #[serde(flatten)]
    curve: contracts::DoseResponse,
    label: &'static str,
    unit: &'static str,
    uncertain: Vec<bool>,
}

async fn get_week_support(
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let support = state.api().week_support()?;
    query_response("week_support", state.api().generation(), support)
}

async fn get_current_values(
    Path(week): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let week = parse_week(&week)?;
    let values = state.api().current_factor_values(week)?;
    query_response("current_factor_values", state.api().generation(), values)
}

async fn get_dose_response(
    Path((week, factor)): Path<(String, String)>,
    State(state): State<AppState>,
    Query(query): Query<DoseResponseQuery>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let week = parse_week(&week)?;
    let factor = parse_factor(&factor)?;
    let current = match query.current {
        Some(value) => value,
        None => state.api().current_factor_values(week)?.get(factor),
    };
    let curve = state.api().dose_response(factor, week, current)?;
    let view = DoseResponseView {
        label: factor.label(),
        unit: factor.unit(),
        uncertain: curve.uncertain_doses(),
        curve,
    };
    query_response("dose_response", state.api().generation(), view)
}

async fn get_pairwise_surface(
    Path((week, factor1, factor2)): Path<(String, String, String)>,
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let week = parse_week(&week)?;
    let factor1 = parse_factor(&factor1)?;
    let factor2 = parse_factor(&factor2)?;
    let surface = state.api().pairwise_surface(factor1, factor2, week)?;
    query_response("pairwise_surface", state.api().generation(), surface)
}

async fn get_recommendations(
    Path(week): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<OperatingPointQuery>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let week = parse_week(&week)?;
    let mut current = state.api().current_factor_values(week)?;
    query.apply(&mut current);
    let recommendations = state.api().recommendations(week, &current)?;
    query_response(
        "recommendations",
        state.api().generation(),
        json!({
            "week": week,
            "current": current,
            "recommendations": recommendations,
        }),
    )
}
