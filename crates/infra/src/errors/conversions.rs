//! Conversions from external infrastructure errors into domain errors.

use meetsched_domain::MeetSchedError;
use r2d2::Error as PoolError;
use rusqlite::Error as SqlError;
use tokio::task::JoinError;

/// SQLite extended code for a `RAISE(ABORT, ...)` inside a trigger.
const SQLITE_CONSTRAINT_TRIGGER: i32 = 1811;
const SQLITE_CONSTRAINT_CHECK: i32 = 275;
const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub MeetSchedError);

impl From<InfraError> for MeetSchedError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<MeetSchedError> for InfraError {
    fn from(value: MeetSchedError) -> Self {
        InfraError(value)
    }
}

trait IntoMeetSchedError {
    fn into_meetsched(self) -> MeetSchedError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → MeetSchedError */
/* -------------------------------------------------------------------------- */

impl IntoMeetSchedError for SqlError {
    fn into_meetsched(self) -> MeetSchedError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        MeetSchedError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        MeetSchedError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, SQLITE_CONSTRAINT_TRIGGER) => {
                        MeetSchedError::Conflict(message)
                    }
                    (ErrorCode::ConstraintViolation, SQLITE_CONSTRAINT_CHECK) => {
                        MeetSchedError::Validation(format!("check constraint failed: {message}"))
                    }
                    (
                        ErrorCode::ConstraintViolation,
                        SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY,
                    ) => MeetSchedError::Database(format!("unique constraint violation: {message}")),
                    _ => MeetSchedError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => MeetSchedError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                MeetSchedError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                MeetSchedError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => MeetSchedError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => MeetSchedError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_meetsched())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → MeetSchedError */
/* -------------------------------------------------------------------------- */

impl IntoMeetSchedError for PoolError {
    fn into_meetsched(self) -> MeetSchedError {
        MeetSchedError::Database(format!("connection pool error: {self}"))
    }
}

impl From<PoolError> for InfraError {
    fn from(value: PoolError) -> Self {
        InfraError(value.into_meetsched())
    }
}

/* -------------------------------------------------------------------------- */
/* tokio::task::JoinError → MeetSchedError */
/* -------------------------------------------------------------------------- */

impl IntoMeetSchedError for JoinError {
    fn into_meetsched(self) -> MeetSchedError {
        if self.is_cancelled() {
            MeetSchedError::Internal("blocking database task was cancelled".into())
        } else {
            MeetSchedError::Internal(format!("blocking database task panicked: {self}"))
        }
    }
}

impl From<JoinError> for InfraError {
    fn from(value: JoinError) -> Self {
        InfraError(value.into_meetsched())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
