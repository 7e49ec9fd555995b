use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use tracing::{debug, error, warn};

use crate::api::state::AppState;
use crate::error::{FormError, PredictError};
use crate::predict::{predict_form, results_message};

/// Raw `(name, value)` pairs in submission order.
pub type FormPairs = Vec<(String, String)>;

fn render(state: &AppState, results: Option<&str>) -> Response {
    match state.templates.render_index(results) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "failed to render index page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// GET /
pub async fn home(State(state): State<AppState>) -> Response {
    render(&state, None)
}

/// POST /predict
///
/// Always answers 200 with the form page; failures show a generic message
/// and the cause is logged.
pub async fn predict(
    State(state): State<AppState>,
    form: std::result::Result<Form<FormPairs>, FormRejection>,
) -> Response {
    let outcome = match form {
        Ok(Form(pairs)) => predict_form(state.classifier.as_ref(), &pairs),
        Err(rejection) => Err(PredictError::InvalidInput(FormError::Malformed(
            rejection.body_text(),
        ))),
    };

    match &outcome {
        Ok(verdict) => debug!(%verdict, model = state.classifier.kind(), "prediction served"),
        Err(e) if e.is_invalid_input() => warn!(error = %e, "rejected prediction input"),
        Err(e) => error!(error = %e, "model prediction failed"),
    }

    render(&state, Some(results_message(&outcome)))
}
