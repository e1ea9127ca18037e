//! # students-api
//!
//! A small HTTP service for student records, stored in SQLite.
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | POST | `/api/students` | 201 "Student Created Successfully" |
//! | GET | `/api/students/{id}` | 200 "Student List Fetched Successfully" |
//! | GET | `/api/students` | 200 "Student List Fetched Successfully" |
//! | PUT | `/api/students/{id}` | 200 "Student Updated Successfully" |
//! | DELETE | `/api/students/{id}` | 200 "Successfully Deleted user" |
//!
//! Every body is a JSON envelope `{"status", "message", "data"}`; see
//! [`envelope`].
//!
//! ## Layout
//!
//! - HTTP plumbing: [`Router`] (one radix tree per method via [`matchit`]),
//!   [`Server`] (hyper, graceful shutdown), [`Request`], [`Response`].
//! - Domain: [`student`], [`validation`], [`envelope`], [`handlers`].
//! - Collaborators: [`storage`] (SQLite via `sqlx`), [`config`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use students_api::{Server, app, storage::SqliteStorage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), students_api::Error> {
//!     let storage = SqliteStorage::open("storage/storage.db").await?;
//!     Server::bind("localhost:8082")
//!         .serve(app::router(Arc::new(storage)))
//!         .await
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod app;
pub mod config;
pub mod envelope;
pub mod handlers;
pub mod health;
pub mod storage;
pub mod student;
pub mod validation;

pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
