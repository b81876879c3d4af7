#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind fleet api on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("fleet api stopped: {0}")]
    Serve(#[from] std::io::Error),
}

#[derive(Debug)]
struct HttpApiError {
    status: StatusCode,
    error: ApiError,
}

impl HttpApiError {
    fn house_not_found(house_id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: ApiError::new(
                ErrorCode::HouseNotFound,
                "house_id does not match a registered house",
                Some(format!("house_id={house_id}")),
            ),
        }
    }

    fn invalid_query(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: ApiError::new(ErrorCode::InvalidQuery, message, details),
        }
    }

    fn internal(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ApiError::new(ErrorCode::InternalError, message, details),
        }
    }

    fn from_engine(err: EngineError) -> Self {
        let message = match &err {
            EngineError::UnknownFactor(_) => "unknown advisory factor",
            EngineError::WeekOutOfRange(_) => "week is outside the growth cycle",
            EngineError::DayOutOfRange(_) => "day is outside the growth cycle",
        };
        Self::invalid_query(message, Some(err.to_string()))
    }
}

impl From<EngineError> for HttpApiError {
    fn from(value: EngineError) -> Self {
        Self::from_engine(value)
    }
}

impl IntoResponse for HttpApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}
