//! Meeting repository implementation on SQLite.
//!
//! Every `MeetingQuery` is translated into one parameterised statement whose
//! `WHERE` clause selects exactly what `MeetingQuery::matches` accepts.
//! Sweep updates run as a single `UPDATE ... WHERE` so each is atomic.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meetsched_core::MeetingRepository;
use meetsched_domain::constants::TERMINAL_UPDATE_MESSAGE;
use meetsched_domain::{
    BulkStatusUpdate, Meeting, MeetSchedError, MeetingDraft, MeetingPatch, MeetingQuery,
    MeetingStatus, Result as DomainResult, SortField, SortOrder, SweepCondition, TimeWindow,
};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use tokio::task;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::manager::{map_sql_error, DbManager, SqliteConnection};
use crate::errors::InfraError;

const MEETING_COLUMNS: &str = "id, title, description, meeting_url, start_time, end_time, \
                               status, creator_id, created_at, updated_at";

/// SQLite-backed implementation of `MeetingRepository`
pub struct SqliteMeetingRepository {
    db: Arc<DbManager>,
}

impl SqliteMeetingRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Run `work` on the blocking pool with a pooled connection.
    async fn with_connection<T, F>(&self, work: F) -> DomainResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> DomainResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<T> {
            let mut conn = db.get_connection()?;
            work(&mut conn)
        })
        .await
        .map_err(|err| MeetSchedError::from(InfraError::from(err)))?
    }
}

#[async_trait]
impl MeetingRepository for SqliteMeetingRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Meeting>> {
        let id = id.to_string();
        self.with_connection(move |conn| select_by_id(conn, &id)).await
    }

    #[instrument(skip(self, query))]
    async fn find(&self, query: &MeetingQuery) -> DomainResult<Vec<Meeting>> {
        let sql = SelectSql::build(query)?;
        let meetings = self
            .with_connection(move |conn| {
                let mut stmt = conn.prepare(&sql.select()).map_err(map_sql_error)?;
                let rows = stmt
                    .query_map(params_from_iter(sql.params.iter()), map_meeting_row)
                    .map_err(map_sql_error)?;
                rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
            })
            .await?;

        debug!(count = meetings.len(), "meetings selected");
        Ok(meetings)
    }

    #[instrument(skip(self, query))]
    async fn count(&self, query: &MeetingQuery) -> DomainResult<u64> {
        let sql = SelectSql::build(query)?;
        self.with_connection(move |conn| {
            let count: i64 = conn
                .query_row(&sql.count(), params_from_iter(sql.params.iter()), |row| row.get(0))
                .map_err(map_sql_error)?;
            Ok(u64::try_from(count).unwrap_or_default())
        })
        .await
    }

    #[instrument(skip(self, draft), fields(creator_id = %draft.creator_id))]
    async fn create(&self, draft: MeetingDraft) -> DomainResult<Meeting> {
        let now = truncate_to_millis(Utc::now());
        let meeting = Meeting {
            id: Uuid::now_v7().to_string(),
            title: draft.title,
            description: draft.description,
            meeting_url: draft.meeting_url,
            start_time: truncate_to_millis(draft.start_time),
            end_time: truncate_to_millis(draft.end_time),
            status: draft.status,
            creator_id: draft.creator_id,
            created_at: now,
            updated_at: now,
        };

        self.with_connection(move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO meetings ({MEETING_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                ),
                params![
                    meeting.id,
                    meeting.title,
                    meeting.description,
                    meeting.meeting_url,
                    meeting.start_time.timestamp_millis(),
                    meeting.end_time.timestamp_millis(),
                    meeting.status.to_string(),
                    meeting.creator_id,
                    meeting.created_at.timestamp_millis(),
                    meeting.updated_at.timestamp_millis(),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(meeting)
        })
        .await
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: &str, patch: &MeetingPatch) -> DomainResult<Meeting> {
        let id = id.to_string();
        let patch = patch.clone();

        self.with_connection(move |conn| {
            let mut assignments = vec!["updated_at = ?"];
            let mut values = vec![Value::Integer(Utc::now().timestamp_millis())];

            if let Some(title) = patch.title {
                assignments.push("title = ?");
                values.push(Value::Text(title));
            }
            if let Some(description) = patch.description {
                assignments.push("description = ?");
                values.push(Value::Text(description));
            }
            if let Some(url) = patch.meeting_url {
                assignments.push("meeting_url = ?");
                values.push(Value::Text(url));
            }
            if let Some(start) = patch.start_time {
                assignments.push("start_time = ?");
                values.push(Value::Integer(start.timestamp_millis()));
            }
            if let Some(end) = patch.end_time {
                assignments.push("end_time = ?");
                values.push(Value::Integer(end.timestamp_millis()));
            }
            values.push(Value::Text(id.clone()));
            values.extend(MeetingStatus::OPEN.iter().map(|s| Value::Text(s.to_string())));

            let sql = format!(
                "UPDATE meetings SET {} WHERE id = ? AND status IN ({})",
                assignments.join(", "),
                placeholders(MeetingStatus::OPEN.len())
            );
            let changed =
                conn.execute(&sql, params_from_iter(values.iter())).map_err(map_sql_error)?;
            if changed == 0 {
                return match select_by_id(conn, &id)? {
                    Some(_) => Err(MeetSchedError::Forbidden(TERMINAL_UPDATE_MESSAGE.into())),
                    None => Err(not_found(&id)),
                };
            }

            select_by_id(conn, &id)?.ok_or_else(|| not_found(&id))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn transition_status(
        &self,
        id: &str,
        expected: MeetingStatus,
        to: MeetingStatus,
    ) -> DomainResult<Meeting> {
        let id = id.to_string();

        self.with_connection(move |conn| {
            let changed = conn
                .execute(
                    "UPDATE meetings SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
                    params![
                        to.to_string(),
                        Utc::now().timestamp_millis(),
                        id,
                        expected.to_string()
                    ],
                )
                .map_err(map_sql_error)?;

            let current = select_by_id(conn, &id)?.ok_or_else(|| not_found(&id))?;
            if changed == 0 {
                return Err(MeetSchedError::Conflict(format!(
                    "Meeting {id} is {} not {expected}",
                    current.status
                )));
            }
            Ok(current)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> DomainResult<()> {
        let id = id.to_string();

        self.with_connection(move |conn| {
            let changed = conn
                .execute("DELETE FROM meetings WHERE id = ?1", params![id])
                .map_err(map_sql_error)?;
            if changed == 0 {
                return Err(not_found(&id));
            }
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, update), fields(to = %update.to))]
    async fn bulk_update_status(&self, update: &BulkStatusUpdate) -> DomainResult<usize> {
        let (condition, mut values) = sweep_condition_sql(update.condition);
        let statuses = placeholders(update.from.len());

        let sql = format!(
            "UPDATE meetings SET status = ?, updated_at = ?
             WHERE status IN ({statuses}) AND {condition}"
        );
        let mut bound = vec![
            Value::Text(update.to.to_string()),
            Value::Integer(Utc::now().timestamp_millis()),
        ];
        bound.extend(update.from.iter().map(|s| Value::Text(s.to_string())));
        bound.append(&mut values);

        self.with_connection(move |conn| {
            conn.execute(&sql, params_from_iter(bound.iter())).map_err(map_sql_error)
        })
        .await
    }
}

// =============================================================================
// Query Translation
// =============================================================================

/// `WHERE`/`ORDER BY`/`LIMIT` fragments and bound values for one query.
struct SelectSql {
    filter: String,
    order: String,
    page: String,
    params: Vec<Value>,
}

impl SelectSql {
    fn build(query: &MeetingQuery) -> DomainResult<Self> {
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(creator_id) = &query.creator_id {
            clauses.push("creator_id = ?".into());
            params.push(Value::Text(creator_id.clone()));
        }
        if !query.statuses.is_empty() {
            clauses.push(format!("status IN ({})", placeholders(query.statuses.len())));
            params.extend(query.statuses.iter().map(|s| Value::Text(s.to_string())));
        }
        if let Some(exclude_id) = &query.exclude_id {
            clauses.push("id != ?".into());
            params.push(Value::Text(exclude_id.clone()));
        }
        if let Some(window) = &query.overlapping {
            clauses.push(window_sql(window).into());
            params.push(Value::Integer(window.end.timestamp_millis()));
            params.push(Value::Integer(window.start.timestamp_millis()));
        }
        if let Some(from) = query.starts_from {
            clauses.push("start_time >= ?".into());
            params.push(Value::Integer(from.timestamp_millis()));
        }
        if let Some(until) = query.starts_until {
            clauses.push("start_time <= ?".into());
            params.push(Value::Integer(until.timestamp_millis()));
        }
        if let Some(search) = &query.search {
            clauses.push(
                "(LOWER(title) LIKE ? ESCAPE '\\' OR LOWER(COALESCE(description, '')) LIKE ? ESCAPE '\\')"
                    .into(),
            );
            let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
            params.push(Value::Text(pattern.clone()));
            params.push(Value::Text(pattern));
        }

        let filter = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let column = match query.sort.field {
            SortField::StartTime => "start_time",
            SortField::EndTime => "end_time",
            SortField::CreatedAt => "created_at",
            SortField::Title => "title",
        };
        let direction = match query.sort.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let order = format!(" ORDER BY {column} {direction}, id ASC");

        // SQLite needs a LIMIT clause before OFFSET; -1 means unbounded.
        let page = match (query.limit, query.offset) {
            (None, 0) => String::new(),
            (limit, offset) => {
                let offset = i64::try_from(offset).map_err(|_| {
                    MeetSchedError::Validation(format!("Offset {offset} is out of range"))
                })?;
                format!(
                    " LIMIT {} OFFSET {offset}",
                    limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX))
                )
            }
        };

        Ok(Self { filter, order, page, params })
    }

    fn select(&self) -> String {
        format!(
            "SELECT {MEETING_COLUMNS} FROM meetings{}{}{}",
            self.filter, self.order, self.page
        )
    }

    fn count(&self) -> String {
        format!("SELECT COUNT(*) FROM meetings{}", self.filter)
    }
}

/// Intersection of `[start_time, end_time)` with the window. Binds
/// `window.end` first, then `window.start`.
fn window_sql(window: &TimeWindow) -> &'static str {
    if window.inclusive_end {
        "(start_time <= ? AND ? < end_time)"
    } else {
        "(start_time < ? AND ? < end_time)"
    }
}

fn sweep_condition_sql(condition: SweepCondition) -> (&'static str, Vec<Value>) {
    match condition {
        SweepCondition::InProgressAt(now) => {
            let now = now.timestamp_millis();
            ("start_time <= ? AND ? < end_time", vec![Value::Integer(now), Value::Integer(now)])
        }
        SweepCondition::EndedBy(now) => {
            ("end_time <= ?", vec![Value::Integer(now.timestamp_millis())])
        }
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

// =============================================================================
// Row Mapping
// =============================================================================

fn select_by_id(conn: &SqliteConnection, id: &str) -> DomainResult<Option<Meeting>> {
    conn.query_row(
        &format!("SELECT {MEETING_COLUMNS} FROM meetings WHERE id = ?1"),
        params![id],
        map_meeting_row,
    )
    .optional()
    .map_err(map_sql_error)
}

fn map_meeting_row(row: &Row<'_>) -> rusqlite::Result<Meeting> {
    Ok(Meeting {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        meeting_url: row.get(3)?,
        start_time: millis_column(row, 4)?,
        end_time: millis_column(row, 5)?,
        status: status_column(row, 6)?,
        creator_id: row.get(7)?,
        created_at: millis_column(row, 8)?,
        updated_at: millis_column(row, 9)?,
    })
}

fn millis_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp {millis} out of range").into(),
        )
    })
}

fn status_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<MeetingStatus> {
    let raw: String = row.get(idx)?;
    raw.parse::<MeetingStatus>().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
    })
}

fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at)
}

fn not_found(id: &str) -> MeetSchedError {
    MeetSchedError::NotFound(format!("Meeting {id} not found"))
}

// =============================================================================
// Tests
// =============================================================================
