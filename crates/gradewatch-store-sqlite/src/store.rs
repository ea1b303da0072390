// crates/gradewatch-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Snapshot Store
// Description: Durable SnapshotStore backed by SQLite WAL, single-writer.
// Purpose: Persist the current snapshot with precision-preserving decimals.
// Dependencies: gradewatch-core, rusqlite, thiserror
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use bigdecimal::BigDecimal;
use gradewatch_core::core::AssignmentId;
use gradewatch_core::core::CategoryId;
use gradewatch_core::core::PeriodId;
use gradewatch_core::core::format_rfc3339;
use gradewatch_core::core::model::Assignment;
use gradewatch_core::core::model::Category;
use gradewatch_core::core::model::Exception;
use gradewatch_core::core::model::Snapshot;
use gradewatch_core::core::parse_rfc3339;
use gradewatch_core::interfaces::AssignmentContext;
use gradewatch_core::interfaces::SnapshotStore;
use gradewatch_core::interfaces::StoreError;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;
use thiserror::Error;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for opening a [`SqliteSnapshotStore`].
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout applied via the `busy_timeout` pragma.
    pub busy_timeout_ms: u64,
}

impl SqliteStoreConfig {
    /// Builds a config pointing at `path` with the default busy timeout.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Store-backend errors, mapped to [`StoreError`] at the trait boundary.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// The database file or its parent directory could not be accessed.
    #[error("sqlite io error: {0}")]
    Io(String),
    /// A query or statement failed.
    #[error("sqlite error: {0}")]
    Db(String),
    /// Stored data violates an invariant the store relies on.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// The on-disk schema version does not match [`SCHEMA_VERSION`].
    #[error("sqlite schema version mismatch: {0}")]
    VersionMismatch(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Io(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
        }
    }
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Db(error.to_string())
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// A `SQLite`-backed [`SnapshotStore`]. Gradewatch has exactly one writer
/// (per spec §5), so a mutex-guarded connection is sufficient; there is no
/// separate writer thread or read pool.
pub struct SqliteSnapshotStore {
    connection: Mutex<Connection>,
}

impl SqliteSnapshotStore {
    /// Opens (creating if absent) a `SQLite`-backed snapshot store at
    /// `config.path`, initializing the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the database cannot be opened or the
    /// schema cannot be created or is incompatible.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        ensure_parent_dir(&config.path)?;
        let connection = Connection::open(&config.path)?;
        connection
            .pragma_update(None, "journal_mode", "WAL")
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        connection
            .pragma_update(None, "busy_timeout", config.busy_timeout_ms)
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        initialize_schema(&connection)?;
        Ok(Self { connection: Mutex::new(connection) })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite connection mutex poisoned".to_owned()))
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|err| SqliteStoreError::Io(err.to_string()))?;
        }
    }
    Ok(())
}

fn initialize_schema(connection: &Connection) -> Result<(), SqliteStoreError> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);
         CREATE TABLE IF NOT EXISTS meta (
             id INTEGER PRIMARY KEY CHECK (id = 0),
             timestamp TEXT NOT NULL
         );
         CREATE TABLE IF NOT EXISTS sections (
             section_id TEXT PRIMARY KEY,
             course_title TEXT NOT NULL,
             section_title TEXT NOT NULL
         );
         CREATE TABLE IF NOT EXISTS periods (
             period_id TEXT PRIMARY KEY,
             section_id TEXT NOT NULL REFERENCES sections(section_id),
             name TEXT NOT NULL
         );
         CREATE TABLE IF NOT EXISTS categories (
             category_id TEXT NOT NULL,
             period_id TEXT NOT NULL REFERENCES periods(period_id),
             name TEXT NOT NULL,
             weight TEXT,
             PRIMARY KEY (category_id, period_id)
         );
         CREATE TABLE IF NOT EXISTS assignments (
             assignment_id TEXT PRIMARY KEY,
             category_id TEXT NOT NULL,
             period_id TEXT NOT NULL,
             title TEXT NOT NULL,
             earned_points TEXT,
             max_points TEXT,
             exception TEXT NOT NULL,
             comment TEXT,
             due_date TEXT,
             FOREIGN KEY (category_id, period_id) REFERENCES categories(category_id, period_id)
         );",
    )?;
    let version: Option<i64> = connection
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
        .optional()?;
    match version {
        None => {
            connection.execute("INSERT INTO schema_version (version) VALUES (?1)", params![
                SCHEMA_VERSION
            ])?;
        }
        Some(found) if found == SCHEMA_VERSION => {}
        Some(found) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "expected schema version {SCHEMA_VERSION}, found {found}"
            )));
        }
    }
    Ok(())
}

fn exception_to_text(exception: Exception) -> &'static str {
    match exception {
        Exception::None => "none",
        Exception::Excused => "excused",
        Exception::Incomplete => "incomplete",
        Exception::Missing => "missing",
    }
}

fn exception_from_text(text: &str) -> Result<Exception, SqliteStoreError> {
    match text {
        "none" => Ok(Exception::None),
        "excused" => Ok(Exception::Excused),
        "incomplete" => Ok(Exception::Incomplete),
        "missing" => Ok(Exception::Missing),
        other => Err(SqliteStoreError::Corrupt(format!("unknown exception code {other:?}"))),
    }
}

fn decimal_to_text(value: &BigDecimal) -> String {
    value.to_string()
}

fn decimal_from_text(text: &str) -> Result<BigDecimal, SqliteStoreError> {
    BigDecimal::from_str(text)
        .map_err(|err| SqliteStoreError::Corrupt(format!("invalid decimal {text:?}: {err}")))
}

fn row_to_assignment_context(row: &rusqlite::Row<'_>) -> Result<AssignmentContext, rusqlite::Error> {
    let assignment_id: String = row.get("assignment_id")?;
    let title: String = row.get("title")?;
    let earned_points: Option<String> = row.get("earned_points")?;
    let max_points: Option<String> = row.get("max_points")?;
    let exception_code: String = row.get("exception")?;
    let comment: Option<String> = row.get("comment")?;
    let due_date: Option<String> = row.get("due_date")?;
    let section_title: String = row.get("section_title")?;
    let period_name: String = row.get("period_name")?;
    let category_name: String = row.get("category_name")?;

    let to_sql_err = |err: SqliteStoreError| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
    };
    let exception = exception_from_text(&exception_code).map_err(to_sql_err)?;
    let earned_points = earned_points.map(|text| decimal_from_text(&text)).transpose().map_err(to_sql_err)?;
    let max_points = max_points.map(|text| decimal_from_text(&text)).transpose().map_err(to_sql_err)?;
    let due_date = due_date
        .map(|text| parse_rfc3339(&text).map_err(|err| SqliteStoreError::Corrupt(err.to_string())))
        .transpose()
        .map_err(to_sql_err)?;

    Ok(AssignmentContext {
        section_title,
        period_name,
        category_name,
        assignment: Assignment {
            assignment_id: AssignmentId::new(assignment_id),
            title,
            earned_points,
            max_points,
            exception,
            comment,
            due_date,
        },
    })
}

const ASSIGNMENT_JOIN: &str = "SELECT a.assignment_id, a.title, a.earned_points, a.max_points,
        a.exception, a.comment, a.due_date,
        c.name AS category_name, p.name AS period_name, s.section_title
     FROM assignments a
     JOIN categories c ON c.category_id = a.category_id AND c.period_id = a.period_id
     JOIN periods p ON p.period_id = a.period_id
     JOIN sections s ON s.section_id = p.section_id";

impl SnapshotStore for SqliteSnapshotStore {
    fn latest_timestamp(&self) -> Result<Option<OffsetDateTime>, StoreError> {
        let connection = self.lock()?;
        let text: Option<String> = connection
            .query_row("SELECT timestamp FROM meta WHERE id = 0", [], |row| row.get(0))
            .optional()
            .map_err(SqliteStoreError::from)?;
        text.map(|value| {
            parse_rfc3339(&value).map_err(|err| SqliteStoreError::Corrupt(err.to_string()).into())
        })
        .transpose()
    }

    fn get_assignment(&self, id: &AssignmentId) -> Result<Option<AssignmentContext>, StoreError> {
        let connection = self.lock()?;
        let query = format!("{ASSIGNMENT_JOIN} WHERE a.assignment_id = ?1");
        connection
            .query_row(&query, params![id.as_str()], row_to_assignment_context)
            .optional()
            .map_err(|err| SqliteStoreError::from(err).into())
    }

    fn get_category(
        &self,
        category_id: &CategoryId,
        period_id: &PeriodId,
    ) -> Result<Option<Category>, StoreError> {
        let connection = self.lock()?;
        connection
            .query_row(
                "SELECT category_id, name, weight FROM categories WHERE category_id = ?1 AND period_id = ?2",
                params![category_id.as_str(), period_id.as_str()],
                |row| {
                    let id: String = row.get(0)?;
                    let name: String = row.get(1)?;
                    let weight: Option<String> = row.get(2)?;
                    Ok((id, name, weight))
                },
            )
            .optional()
            .map_err(SqliteStoreError::from)?
            .map(|(id, name, weight)| {
                let weight = weight
                    .map(|text| decimal_from_text(&text))
                    .transpose()
                    .map_err(StoreError::from)?;
                Ok(Category { category_id: CategoryId::new(id), name, weight, assignments: Vec::new() })
            })
            .transpose()
    }

    fn iter_assignments(&self) -> Result<Vec<AssignmentContext>, StoreError> {
        let connection = self.lock()?;
        let mut statement = connection.prepare(ASSIGNMENT_JOIN).map_err(SqliteStoreError::from)?;
        let rows = statement
            .query_map([], row_to_assignment_context)
            .map_err(SqliteStoreError::from)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(|err| SqliteStoreError::from(err).into())
    }

    fn replace_all(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let mut connection = self.lock()?;
        let transaction = connection.transaction().map_err(SqliteStoreError::from)?;
        transaction.execute("DELETE FROM assignments", []).map_err(SqliteStoreError::from)?;
        transaction.execute("DELETE FROM categories", []).map_err(SqliteStoreError::from)?;
        transaction.execute("DELETE FROM periods", []).map_err(SqliteStoreError::from)?;
        transaction.execute("DELETE FROM sections", []).map_err(SqliteStoreError::from)?;
        transaction.execute("DELETE FROM meta", []).map_err(SqliteStoreError::from)?;

        for section in &snapshot.sections {
            transaction
                .execute(
                    "INSERT INTO sections (section_id, course_title, section_title) VALUES (?1, ?2, ?3)",
                    params![section.section_id.as_str(), section.course_title, section.section_title],
                )
                .map_err(SqliteStoreError::from)?;
            for period in &section.periods {
                transaction
                    .execute(
                        "INSERT INTO periods (period_id, section_id, name) VALUES (?1, ?2, ?3)",
                        params![period.period_id.as_str(), section.section_id.as_str(), period.name],
                    )
                    .map_err(SqliteStoreError::from)?;
                for category in &period.categories {
                    transaction
                        .execute(
                            "INSERT INTO categories (category_id, period_id, name, weight) VALUES (?1, ?2, ?3, ?4)",
                            params![
                                category.category_id.as_str(),
                                period.period_id.as_str(),
                                category.name,
                                category.weight.as_ref().map(decimal_to_text),
                            ],
                        )
                        .map_err(SqliteStoreError::from)?;
                    for assignment in &category.assignments {
                        transaction
                            .execute(
                                "INSERT INTO assignments (assignment_id, category_id, period_id, title,
                                     earned_points, max_points, exception, comment, due_date)
                                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                                params![
                                    assignment.assignment_id.as_str(),
                                    category.category_id.as_str(),
                                    period.period_id.as_str(),
                                    assignment.title,
                                    assignment.earned_points.as_ref().map(decimal_to_text),
                                    assignment.max_points.as_ref().map(decimal_to_text),
                                    exception_to_text(assignment.exception),
                                    assignment.comment,
                                    assignment
                                        .due_date
                                        .map(|ts| format_rfc3339(ts).map_err(|err| SqliteStoreError::Corrupt(err.to_string())))
                                        .transpose()?,
                                ],
                            )
                            .map_err(SqliteStoreError::from)?;
                    }
                }
            }
        }
        let timestamp_text =
            format_rfc3339(snapshot.timestamp).map_err(|err| SqliteStoreError::Corrupt(err.to_string()))?;
        transaction
            .execute("INSERT INTO meta (id, timestamp) VALUES (0, ?1)", params![timestamp_text])
            .map_err(SqliteStoreError::from)?;
        transaction.commit().map_err(SqliteStoreError::from)?;
        Ok(())
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        let mut connection = self.lock()?;
        let transaction = connection.transaction().map_err(SqliteStoreError::from)?;
        transaction.execute("DELETE FROM assignments", []).map_err(SqliteStoreError::from)?;
        transaction.execute("DELETE FROM categories", []).map_err(SqliteStoreError::from)?;
        transaction.execute("DELETE FROM periods", []).map_err(SqliteStoreError::from)?;
        transaction.execute("DELETE FROM sections", []).map_err(SqliteStoreError::from)?;
        transaction.execute("DELETE FROM meta", []).map_err(SqliteStoreError::from)?;
        transaction.commit().map_err(SqliteStoreError::from)?;
        Ok(())
    }
}
