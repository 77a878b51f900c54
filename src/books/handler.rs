use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::{AddCommentRequest, CreateBookRequest, Payload, required};
use crate::error::BookError;
use crate::handler::AppState;
use crate::model::{Book, BookId, BookView, CreatedBook};

fn message(msg: &'static str) -> Response {
    (StatusCode::OK, msg).into_response()
}

/// A segment axum cannot decode is as malformed as one that is not a number.
fn book_id(path: Result<Path<String>, PathRejection>) -> Option<BookId> {
    match path {
        Ok(Path(raw)) => Book::parse_id(&raw),
        Err(e) => {
            tracing::debug!(error = %e, "undecodable book id");
            None
        }
    }
}

pub async fn list_books(State(state): State<AppState>) -> Json<Vec<BookView>> {
    match state.db.list_books().await {
        Ok(books) => {
            tracing::info!(count = books.len(), "listed books");
            Json(books.into_iter().map(BookView::from).collect())
        }
        Err(e) => {
            tracing::warn!("failed to list books, answering with empty list: {}", e);
            Json(vec![])
        }
    }
}

pub async fn create_book(
    State(state): State<AppState>,
    Payload(payload): Payload<CreateBookRequest>,
) -> Result<Json<CreatedBook>, BookError> {
    let title = required(payload.title).ok_or(BookError::MissingField("title"))?;

    match state.db.create_book(&title).await {
        Ok(book) => {
            tracing::info!(id = book.id, "created book");
            Ok(Json(CreatedBook::from(book)))
        }
        Err(e) => {
            tracing::error!("failed to create book: {}", e);
            Err(BookError::SaveFailed)
        }
    }
}

pub async fn delete_all_books(State(state): State<AppState>) -> Response {
    match state.db.delete_all_books().await {
        Ok(deleted) => {
            tracing::info!(deleted, "deleted all books");
            message("complete delete successful")
        }
        Err(e) => {
            tracing::error!("failed to delete all books: {}", e);
            BookError::DeleteFailed.into_response()
        }
    }
}

pub async fn get_book(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<BookView>, BookError> {
    let id = book_id(path).ok_or(BookError::NotFound)?;

    match state.db.get_book(id).await {
        Ok(Some(book)) => Ok(Json(BookView::from(book))),
        Ok(None) => Err(BookError::NotFound),
        Err(e) => {
            tracing::error!(id, "failed to get book: {}", e);
            Err(BookError::NotFound)
        }
    }
}

pub async fn add_comment(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    Payload(payload): Payload<AddCommentRequest>,
) -> Result<Json<BookView>, BookError> {
    let comment = required(payload.comment).ok_or(BookError::MissingField("comment"))?;
    let id = book_id(path).ok_or(BookError::NotFound)?;

    match state.db.add_comment(id, &comment).await {
        Ok(Some(book)) => {
            tracing::info!(id, comments = book.comments.len(), "added comment");
            Ok(Json(BookView::from(book)))
        }
        Ok(None) => Err(BookError::NotFound),
        Err(e) => {
            tracing::error!(id, "failed to add comment: {}", e);
            Err(BookError::SaveFailed)
        }
    }
}

pub async fn delete_book(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    let Some(id) = book_id(path) else {
        return BookError::NotFound.into_response();
    };

    match state.db.delete_book(id).await {
        Ok(true) => {
            tracing::info!(id, "deleted book");
            message("delete successful")
        }
        Ok(false) => BookError::NotFound.into_response(),
        Err(e) => {
            tracing::error!(id, "failed to delete book: {}", e);
            BookError::DeleteFailed.into_response()
        }
    }
}
