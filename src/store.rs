use chrono::{NaiveDate, NaiveDateTime};
use sqlx::MySqlPool;

use crate::model::attendance::Attendance;
use crate::model::team::Team;
use crate::model::user::UserSummary;

const ATTENDANCE_COLUMNS: &str =
    "id, user_id, day, check_in, check_out, is_excused, excuse_reason, created_at";

/// MySQL signals every unique-key violation with SQLSTATE 23000. The
/// (user_id, day) unique key is the sole concurrency control here, so a
/// duplicate key means "another writer got there first", never corruption.
pub fn is_duplicate_key(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23000"))
}

pub async fn fetch_for_day(
    pool: &MySqlPool,
    user_id: u64,
    day: NaiveDate,
) -> Result<Option<Attendance>, sqlx::Error> {
    let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE user_id = ? AND day = ?");

    sqlx::query_as::<_, Attendance>(&sql)
        .bind(user_id)
        .bind(day)
        .fetch_optional(pool)
        .await
}

/// Get-or-create on the (user_id, day) single-writer key. A lost insert
/// race is normal flow: the refetch finds the row the other writer made.
/// Returns the record plus whether this call created it.
pub async fn get_or_create_for_day(
    pool: &MySqlPool,
    user_id: u64,
    day: NaiveDate,
) -> Result<(Attendance, bool), sqlx::Error> {
    if let Some(existing) = fetch_for_day(pool, user_id, day).await? {
        return Ok((existing, false));
    }

    let inserted = sqlx::query("INSERT INTO attendance (user_id, day) VALUES (?, ?)")
        .bind(user_id)
        .bind(day)
        .execute(pool)
        .await;

    let created = match inserted {
        Ok(_) => true,
        Err(e) if is_duplicate_key(&e) => false,
        Err(e) => return Err(e),
    };

    let record = fetch_for_day(pool, user_id, day)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    Ok((record, created))
}

/// Persists a clock action and returns the updated record.
pub async fn record_clock(
    pool: &MySqlPool,
    attendance_id: u64,
    is_check_in: bool,
    now: NaiveDateTime,
) -> Result<Attendance, sqlx::Error> {
    let column = if is_check_in { "check_in" } else { "check_out" };
    let update_sql = format!("UPDATE attendance SET {column} = ? WHERE id = ?");

    sqlx::query(&update_sql)
        .bind(now)
        .bind(attendance_id)
        .execute(pool)
        .await?;

    let fetch_sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE id = ?");
    sqlx::query_as::<_, Attendance>(&fetch_sql)
        .bind(attendance_id)
        .fetch_one(pool)
        .await
}

pub async fn fetch_user_range(
    pool: &MySqlPool,
    user_id: u64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<Attendance>, sqlx::Error> {
    let sql = format!(
        "SELECT {ATTENDANCE_COLUMNS} FROM attendance \
         WHERE user_id = ? AND day BETWEEN ? AND ? ORDER BY day"
    );

    sqlx::query_as::<_, Attendance>(&sql)
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
}

pub async fn fetch_range(
    pool: &MySqlPool,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<Attendance>, sqlx::Error> {
    let sql = format!(
        "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE day BETWEEN ? AND ? ORDER BY day"
    );

    sqlx::query_as::<_, Attendance>(&sql)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
}

pub async fn fetch_range_for_users(
    pool: &MySqlPool,
    user_ids: &[u64],
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<Attendance>, sqlx::Error> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; user_ids.len()].join(", ");
    let sql = format!(
        "SELECT {ATTENDANCE_COLUMNS} FROM attendance \
         WHERE day BETWEEN ? AND ? AND user_id IN ({placeholders}) ORDER BY day"
    );

    let mut query = sqlx::query_as::<_, Attendance>(&sql).bind(from).bind(to);
    for user_id in user_ids {
        query = query.bind(*user_id);
    }

    query.fetch_all(pool).await
}

pub async fn active_user_ids(pool: &MySqlPool) -> Result<Vec<u64>, sqlx::Error> {
    sqlx::query_scalar::<_, u64>("SELECT id FROM users WHERE is_active = TRUE ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn user_ids_with_record_on(
    pool: &MySqlPool,
    day: NaiveDate,
) -> Result<Vec<u64>, sqlx::Error> {
    sqlx::query_scalar::<_, u64>("SELECT user_id FROM attendance WHERE day = ?")
        .bind(day)
        .fetch_all(pool)
        .await
}

/// Single batched insert of bare records, one row per user. Returns the
/// number of rows written.
pub async fn insert_bare_records(
    pool: &MySqlPool,
    user_ids: &[u64],
    day: NaiveDate,
) -> Result<u64, sqlx::Error> {
    if user_ids.is_empty() {
        return Ok(0);
    }

    let values = vec!["(?, ?)"; user_ids.len()].join(", ");
    let sql = format!("INSERT INTO attendance (user_id, day) VALUES {values}");

    let mut query = sqlx::query(&sql);
    for user_id in user_ids {
        query = query.bind(*user_id).bind(day);
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

pub async fn fetch_user_summary(
    pool: &MySqlPool,
    user_id: u64,
) -> Result<Option<UserSummary>, sqlx::Error> {
    sqlx::query_as::<_, UserSummary>(
        "SELECT id, email, first_name, last_name FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_team(pool: &MySqlPool, team_id: u64) -> Result<Option<Team>, sqlx::Error> {
    sqlx::query_as::<_, Team>("SELECT id, name, description FROM teams WHERE id = ?")
        .bind(team_id)
        .fetch_optional(pool)
        .await
}

pub async fn team_member_ids(pool: &MySqlPool, team_id: u64) -> Result<Vec<u64>, sqlx::Error> {
    sqlx::query_scalar::<_, u64>(
        "SELECT user_id FROM team_members WHERE team_id = ? ORDER BY user_id",
    )
    .bind(team_id)
    .fetch_all(pool)
    .await
}
