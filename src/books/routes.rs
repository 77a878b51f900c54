use axum::{Router, routing::get};

use super::handler;
use crate::handler::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handler::list_books)
                .post(handler::create_book)
                .delete(handler::delete_all_books),
        )
        .route(
            "/:id",
            get(handler::get_book)
                .post(handler::add_comment)
                .delete(handler::delete_book),
        )
}
