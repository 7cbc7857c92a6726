pub mod rd_station;
pub mod waitlist;

use axum::Router;

use crate::adapters::http::app_state::AppState;

pub fn router(app_state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/waitlist", waitlist::router(app_state))
        .nest("/rd-station", rd_station::router())
}
