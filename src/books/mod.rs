//! Book resource
//!
//! HTTP surface for the book collection under `/api/books`. Every request maps
//! to one storage call on the shared [`Database`](crate::db::Database).
//!
//! Failures are reported in the body with a `200 OK` status: clients receive
//! `missing required field …`, `no book exists` and similar plain-text
//! messages rather than 4xx/5xx codes.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bookshelf::books;
//!
//! let app = Router::new()
//!     .nest("/api/books", books::routes())
//!     .with_state(app_state);
//! ```

mod handler;
mod routes;

pub use routes::routes;
