//! Server-rendered dashboard page, a thin tera view over the dashboard
//! aggregation.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tera::{Context, Tera};
use tracing::{error, warn};

use crate::bootstrap::AppState;

#[derive(Clone)]
pub struct PagesState {
    app: AppState,
    templates: Arc<Tera>,
}

fn init_templates() -> Arc<Tera> {
    let mut tera = Tera::default();
    if let Err(template_error) =
        tera.add_raw_template("dashboard.html", include_str!("../../../templates/dashboard.html"))
    {
        warn!(error = %template_error, "embedded dashboard template failed to register");
    }
    Arc::new(tera)
}

pub fn router(app: AppState) -> Router {
    let state = PagesState { app, templates: init_templates() };
    Router::new().route("/plans/{plan_id}", get(dashboard_page)).with_state(state)
}

pub async fn dashboard_page(
    State(state): State<PagesState>,
    Path(plan_id): Path<String>,
) -> Response {
    let view = match state.app.journey.get_dashboard(&plan_id).await {
        Ok(view) => view,
        Err(_) => {
            return (
                StatusCode::NOT_FOUND,
                Html(format!("<h1>Plan not found</h1><p>No plan named {plan_id}.</p>")),
            )
                .into_response();
        }
    };

    let context = match Context::from_serialize(&view) {
        Ok(context) => context,
        Err(render_error) => {
            error!(
                event_name = "pages.context_failed",
                plan_id = %plan_id,
                error = %render_error,
                "dashboard context serialization failed"
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, Html("<h1>Render error</h1>".to_owned()))
                .into_response();
        }
    };

    match state.templates.render("dashboard.html", &context) {
        Ok(html) => Html(html).into_response(),
        Err(render_error) => {
            error!(
                event_name = "pages.render_failed",
                plan_id = %plan_id,
                error = %render_error,
                "dashboard template render failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, Html("<h1>Render error</h1>".to_owned()))
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::{Path, State};
    use axum::http::StatusCode;

    use crate::api::tests::test_state;
    use crate::pages::{dashboard_page, init_templates, PagesState};

    #[tokio::test]
    async fn renders_a_dashboard_page_for_an_existing_plan() {
        let app = test_state().await;
        let plan = app.journey.create_plan(Default::default()).await;
        let state = PagesState { app, templates: init_templates() };

        let response =
            dashboard_page(State(state), Path(plan.plan_id.as_str().to_owned())).await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_plans_render_a_not_found_page() {
        let state = PagesState { app: test_state().await, templates: init_templates() };

        let response =
            dashboard_page(State(state), Path("plan_19990101_000000".to_owned())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
