use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::middleware::metrics_middleware;
use super::{audit, backup, handlers, matches, players, roster, scoring, stats, teams};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Audit
        .route("/audit", get(audit::query_audit))
        // Players
        .route(
            "/players",
            get(players::list_players).post(players::create_player),
        )
        .route(
            "/players/{id}",
            get(players::get_player)
                .put(players::update_player)
                .delete(players::delete_player),
        )
        // Teams
        .route("/teams", get(teams::list_teams).post(teams::create_team))
        .route(
            "/teams/{id}",
            get(teams::get_team)
                .put(teams::update_team)
                .delete(teams::delete_team),
        )
        // Roster import
        .route("/roster/import", post(roster::import_csv))
        .route("/roster/import/sheet", post(roster::import_sheet))
        // Matches
        .route("/matches", get(matches::list).post(matches::create))
        .route("/matches/import", post(matches::import))
        .route(
            "/matches/{id}",
            get(matches::get).delete(matches::delete),
        )
        .route("/matches/{id}/scorecard", get(matches::scorecard))
        .route("/matches/{id}/export", get(matches::export))
        .route("/matches/{id}/audit", get(audit::match_trail))
        // Scoring
        .route("/matches/{id}/start", post(scoring::start))
        .route("/matches/{id}/deliveries", post(scoring::record_delivery))
        .route("/matches/{id}/bowler", post(scoring::select_bowler))
        .route("/matches/{id}/swap", post(scoring::swap))
        .route("/matches/{id}/retire", post(scoring::retire))
        .route("/matches/{id}/declare", post(scoring::declare))
        .route("/matches/{id}/settings", put(scoring::update))
        .route("/matches/{id}/undo", post(scoring::undo))
        // Statistics and backup
        .route("/stats", get(stats::get_stats))
        .route("/backup", get(backup::get_backup))
        .route("/backup/restore", post(backup::restore_backup));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
