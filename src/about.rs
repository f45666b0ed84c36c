use axum::{debug_handler, response::IntoResponse, routing::get, Router};

use crate::{include_res, AppState, Markdown};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/author/", get(author))
        .route("/tech/", get(tech))
}

#[debug_handler]
async fn author() -> impl IntoResponse {
    Markdown("About the author", include_res!(str, "/pages/about/author.md"))
}

#[debug_handler]
async fn tech() -> impl IntoResponse {
    Markdown("Technologies", include_res!(str, "/pages/about/tech.md"))
}
