use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/plans",
            get(handlers::list_plans).post(handlers::add_plan),
        )
        .route(
            "/api/members",
            get(handlers::list_members).post(handlers::add_member),
        )
        .route(
            "/api/members/:id",
            patch(handlers::update_member).delete(handlers::remove_member),
        )
        .route("/api/members/:id/renew", post(handlers::renew_member))
        .route("/api/smart-expiring", get(handlers::smart_expiring))
        .route(
            "/api/trainers",
            get(handlers::list_trainers).post(handlers::add_trainer),
        )
        .route(
            "/api/trainers/:id",
            delete(handlers::remove_trainer),
        )
        .route(
            "/api/billing",
            get(handlers::list_billing).post(handlers::add_bill),
        )
        .with_state(state)
}
