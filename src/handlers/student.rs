//! `/api/students` handlers.
//!
//! Each public function takes the shared [`AppState`] and returns the
//! [`Handler`] the router stores. Every handler runs the same steps: decode
//! the request, validate, make one storage call, write an envelope. Failures
//! short-circuit as `Err(Response)`, so `?` reads as "reply now".

use std::num::ParseIntError;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{error, info, warn};

use super::AppState;
use crate::envelope::{Envelope, write_json};
use crate::handler::Handler;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;
use crate::storage::StorageError;
use crate::student::{NewStudent, StudentPatch};

pub const CREATED: &str = "Student Created Successfully";
pub const FETCHED: &str = "Student List Fetched Successfully";
pub const UPDATED: &str = "Student Updated Successfully";
pub const DELETED: &str = "Successfully Deleted user";

pub const EMPTY_BODY: &str = "empty body";
pub const ID_REQUIRED: &str = "id is required";
pub const INVALID_ID: &str = "invalid id format";
pub const NOT_FOUND: &str = "student not found";

type Reply = Result<Response, Response>;

/// `POST /api/students`
pub fn create(state: AppState) -> impl Handler {
    move |req: Request| {
        let state = state.clone();
        async move { settle(create_student(&state, req).await) }
    }
}

/// `GET /api/students/{id}`
pub fn get_by_id(state: AppState) -> impl Handler {
    move |req: Request| {
        let state = state.clone();
        async move { settle(get_student(&state, req).await) }
    }
}

/// `GET /api/students`
pub fn list(state: AppState) -> impl Handler {
    move |_req: Request| {
        let state = state.clone();
        async move { settle(list_students(&state).await) }
    }
}

/// `PUT /api/students/{id}`
pub fn update(state: AppState) -> impl Handler {
    move |req: Request| {
        let state = state.clone();
        async move { settle(update_student(&state, req).await) }
    }
}

/// `DELETE /api/students/{id}`
pub fn delete(state: AppState) -> impl Handler {
    move |req: Request| {
        let state = state.clone();
        async move { settle(delete_student(&state, req).await) }
    }
}

// ── Operations ────────────────────────────────────────────────────────────────

async fn create_student(state: &AppState, req: Request) -> Reply {
    info!("creating a student");

    // `null` decodes like `{}`, so every field is reported as required.
    let candidate = decode_body::<Option<NewStudent>>(req.body())?.unwrap_or_default();
    let valid = state
        .validator
        .check_new(candidate)
        .map_err(|errors| bad_request(Envelope::validation(&errors)))?;

    let id = state
        .storage
        .create_student(&valid.name, &valid.email, valid.age)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to create student");
            storage_failure(&e)
        })?;

    info!(id, "student created successfully");
    Ok(write_json(Status::Created, &Envelope::success(CREATED, json!({ "id": id }))))
}

async fn get_student(state: &AppState, req: Request) -> Reply {
    let id = path_id(&req).map_err(IdError::into_detailed_response)?;
    info!(id, "getting a student");

    let student = state.storage.get_student_by_id(id).await.map_err(|e| {
        error!(id, error = %e, "error getting student");
        storage_failure(&e)
    })?;

    Ok(write_json(Status::Ok, &Envelope::success(FETCHED, student)))
}

async fn list_students(state: &AppState) -> Reply {
    info!("getting all students");

    let students = state.storage.get_students().await.map_err(|e| {
        error!(error = %e, "error listing students");
        storage_failure(&e)
    })?;

    Ok(write_json(Status::Ok, &Envelope::success(FETCHED, students)))
}

async fn update_student(state: &AppState, req: Request) -> Reply {
    let id = path_id(&req).map_err(IdError::into_fixed_response)?;
    info!(id, "updating a student");

    let mut student = state.storage.get_student_by_id(id).await.map_err(|e| {
        warn!(id, error = %e, "student to update not fetched");
        not_found_or_failure(&e)
    })?;

    let object = decode_body::<Option<Map<String, Value>>>(req.body())?.unwrap_or_default();
    StudentPatch::from_object(&object).apply(&mut student);

    state
        .validator
        .check(&student)
        .map_err(|errors| bad_request(Envelope::validation(&errors)))?;

    let updated = state
        .storage
        .update_student(id, &student.name, &student.email, student.age)
        .await
        .map_err(|e| {
            error!(id, error = %e, "failed to update student");
            not_found_or_failure(&e)
        })?;

    Ok(write_json(Status::Ok, &Envelope::success(UPDATED, updated)))
}

async fn delete_student(state: &AppState, req: Request) -> Reply {
    let id = path_id(&req).map_err(IdError::into_detailed_response)?;
    info!(id, "deleting a student");

    let deleted = state.storage.delete_student(id).await.map_err(|e| {
        error!(id, error = %e, "failed to delete student");
        storage_failure(&e)
    })?;

    Ok(write_json(Status::Ok, &Envelope::success(DELETED, json!({ "id": deleted }))))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn settle(reply: Reply) -> Response {
    reply.unwrap_or_else(|response| response)
}

fn bad_request(envelope: Envelope) -> Response {
    write_json(Status::BadRequest, &envelope)
}

/// Decodes a JSON body. An empty or all-whitespace body is its own error.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(bad_request(Envelope::error(EMPTY_BODY)));
    }
    serde_json::from_slice(body).map_err(|e| bad_request(Envelope::error(e)))
}

/// `404` for a missing student, `500` for anything else. The message is
/// the storage error's own description.
fn storage_failure(err: &StorageError) -> Response {
    let status = match err {
        StorageError::NotFound { .. } => Status::NotFound,
        StorageError::Internal(_) => Status::InternalServerError,
    };
    write_json(status, &Envelope::error(err))
}

/// Like [`storage_failure`], but a missing student always reads
/// "student not found".
fn not_found_or_failure(err: &StorageError) -> Response {
    match err {
        StorageError::NotFound { .. } => write_json(Status::NotFound, &Envelope::error(NOT_FOUND)),
        StorageError::Internal(_) => storage_failure(err),
    }
}

enum IdError {
    Missing,
    Malformed(ParseIntError),
}

impl IdError {
    /// Reports the parse failure itself.
    fn into_detailed_response(self) -> Response {
        match self {
            Self::Missing => bad_request(Envelope::error(ID_REQUIRED)),
            Self::Malformed(e) => bad_request(Envelope::error(e)),
        }
    }

    /// Reports a fixed message.
    fn into_fixed_response(self) -> Response {
        match self {
            Self::Missing => bad_request(Envelope::error(ID_REQUIRED)),
            Self::Malformed(_) => bad_request(Envelope::error(INVALID_ID)),
        }
    }
}

fn path_id(req: &Request) -> Result<i64, IdError> {
    let raw = req.param("id").filter(|id| !id.is_empty()).ok_or(IdError::Missing)?;
    raw.parse::<i64>().map_err(|e| {
        warn!(id = raw, error = %e, "error parsing id");
        IdError::Malformed(e)
    })
}
