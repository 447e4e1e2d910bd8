use utoipa_axum::{router::OpenApiRouter, routes};

use crate::handlers::{health, messages};
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(messages::list_messages))
        .routes(routes!(messages::ack_messages))
        .routes(routes!(messages::get_message))
        .routes(routes!(health::health))
        .routes(routes!(health::ready))
}
