#[derive(Clone)]
pub struct AppState {
    api: Arc<FleetApi>,
}

impl AppState {
    pub fn new(api: FleetApi) -> Self {
        Self { api: Arc::new(api) }
    }

    pub fn api(&self) -> &FleetApi {
        &self.api
    }
}
