//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over `users` and `user_interests` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths only accept `ValidUser`, so every stored row passed the rule set.
//! - A user row and its interests are written in one transaction.
//! - A unique-index violation on `users.email` surfaces as `DuplicateEmail`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::user::{User, UserId};
use crate::validation::ValidUser;
use chrono::{DateTime, Utc};
use rusqlite::{
    params, Connection, ErrorCode, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT
    id,
    display_name,
    age,
    mobile,
    email,
    created_at,
    updated_at
FROM users";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for user persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(UserId),
    /// Storage-level unique constraint on email rejected the write.
    DuplicateEmail,
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "user not found: {id}"),
            Self::DuplicateEmail => write!(f, "email already registered"),
            Self::InvalidData(message) => write!(f, "invalid persisted user data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::DuplicateEmail | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if is_email_unique_violation(&value) {
            return Self::DuplicateEmail;
        }
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for user CRUD operations.
pub trait UserRepository {
    /// Inserts a new user and returns the stored record with its assigned id.
    fn create_user(&self, user: &ValidUser) -> RepoResult<User>;
    /// Replaces all attributes of an existing user; `id` and `created_at` are kept.
    fn update_user(&self, id: UserId, user: &ValidUser) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Lists users in creation order.
    fn list_users(&self) -> RepoResult<Vec<User>>;
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
    /// Finds a user holding `email` (case-insensitive), optionally skipping one id.
    fn find_id_by_email(&self, email: &str, exclude: Option<UserId>)
        -> RepoResult<Option<UserId>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn write_tx(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &ValidUser) -> RepoResult<User> {
        let id = Uuid::new_v4();
        let now = now_millis();

        let tx = self.write_tx()?;
        tx.execute(
            "INSERT INTO users (
                id,
                display_name,
                age,
                mobile,
                email,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6);",
            params![
                id.to_string(),
                user.user(),
                user.age(),
                user.mobile(),
                user.email(),
                now,
            ],
        )?;
        replace_interests(&tx, id, user.interest())?;
        tx.commit()?;

        build_user(id, user, now, now)
    }

    fn update_user(&self, id: UserId, user: &ValidUser) -> RepoResult<User> {
        let now = now_millis();

        let tx = self.write_tx()?;
        let created_at: Option<i64> = tx
            .query_row(
                "SELECT created_at FROM users WHERE id = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(created_at) = created_at else {
            return Err(RepoError::NotFound(id));
        };

        tx.execute(
            "UPDATE users
             SET
                display_name = ?2,
                age = ?3,
                mobile = ?4,
                email = ?5,
                updated_at = ?6
             WHERE id = ?1;",
            params![
                id.to_string(),
                user.user(),
                user.age(),
                user.mobile(),
                user.email(),
                now,
            ],
        )?;
        replace_interests(&tx, id, user.interest())?;
        tx.commit()?;

        build_user(id, user, created_at, now)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let mut user = parse_user_row(row)?;
            user.interest = load_interests(self.conn, id)?;
            return Ok(Some(user));
        }

        Ok(None)
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL}
             ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([])?;

        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        for user in &mut users {
            user.interest = load_interests(self.conn, user.id)?;
        }

        Ok(users)
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        // `user_interests` rows go with it via ON DELETE CASCADE.
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn find_id_by_email(
        &self,
        email: &str,
        exclude: Option<UserId>,
    ) -> RepoResult<Option<UserId>> {
        let exclude_text = exclude.map(|id| id.to_string());
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT id
                 FROM users
                 WHERE email = ?1 COLLATE NOCASE
                   AND (?2 IS NULL OR id <> ?2)
                 LIMIT 1;",
                params![email, exclude_text],
                |row| row.get(0),
            )
            .optional()?;

        found.map(|value| parse_user_id(&value)).transpose()
    }
}

fn replace_interests(tx: &Transaction<'_>, id: UserId, interests: &[String]) -> RepoResult<()> {
    let id_text = id.to_string();
    tx.execute(
        "DELETE FROM user_interests WHERE user_id = ?1;",
        [id_text.as_str()],
    )?;

    let mut stmt = tx.prepare(
        "INSERT INTO user_interests (user_id, position, interest) VALUES (?1, ?2, ?3);",
    )?;
    for (position, interest) in interests.iter().enumerate() {
        let position = i64::try_from(position)
            .map_err(|_| RepoError::InvalidData("too many interests".to_string()))?;
        stmt.execute(params![id_text.as_str(), position, interest.as_str()])?;
    }

    Ok(())
}

fn load_interests(conn: &Connection, id: UserId) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT interest
         FROM user_interests
         WHERE user_id = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([id.to_string()])?;
    let mut interests = Vec::new();
    while let Some(row) = rows.next()? {
        interests.push(row.get("interest")?);
    }
    Ok(interests)
}

/// Parses a row without interests; callers fill them from `user_interests`.
fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id_text: String = row.get("id")?;
    let id = parse_user_id(&id_text)?;

    Ok(User {
        id,
        user: row.get("display_name")?,
        interest: Vec::new(),
        age: row.get("age")?,
        mobile: row.get("mobile")?,
        email: row.get("email")?,
        created_at: millis_to_datetime(row.get("created_at")?, "users.created_at")?,
        updated_at: millis_to_datetime(row.get("updated_at")?, "users.updated_at")?,
    })
}

fn build_user(
    id: UserId,
    user: &ValidUser,
    created_at: i64,
    updated_at: i64,
) -> RepoResult<User> {
    Ok(User {
        id,
        user: user.user().to_string(),
        interest: user.interest().to_vec(),
        age: user.age(),
        mobile: user.mobile().to_string(),
        email: user.email().to_string(),
        created_at: millis_to_datetime(created_at, "users.created_at")?,
        updated_at: millis_to_datetime(updated_at, "users.updated_at")?,
    })
}

fn parse_user_id(value: &str) -> RepoResult<UserId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in users.id")))
}

fn millis_to_datetime(value: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid timestamp `{value}` in {column}")))
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn is_email_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, message) => {
            failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                && message
                    .as_deref()
                    .is_some_and(|text| text.contains("users.email") || text.contains("idx_users_email"))
        }
        _ => false,
    }
}
