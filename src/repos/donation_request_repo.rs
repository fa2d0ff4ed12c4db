/*
 * Responsibility
 * - donation_requests CRUD
 * - status 遷移は「現在の status」を WHERE に含めて条件付き UPDATE (競合時は None)
 */
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DonationRequestRow {
    pub id: i64,
    pub requester_name: String,
    pub requester_email: String,
    pub recipient_name: String,
    pub recipient_district: String,
    pub recipient_upazila: String,
    pub hospital_name: String,
    pub full_address: String,
    pub blood_group: String,
    pub donation_date: NaiveDate,
    pub donation_time: String,
    pub request_message: Option<String>,
    pub status: String,
    pub donor_name: Option<String>,
    pub donor_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewDonationRequest<'a> {
    pub requester_name: &'a str,
    pub requester_email: &'a str,
    pub recipient_name: &'a str,
    pub recipient_district: &'a str,
    pub recipient_upazila: &'a str,
    pub hospital_name: &'a str,
    pub full_address: &'a str,
    pub blood_group: &'a str,
    pub donation_date: NaiveDate,
    pub donation_time: &'a str,
    pub request_message: Option<&'a str>,
}

#[derive(Debug, Default)]
pub struct DetailChanges<'a> {
    pub recipient_name: Option<&'a str>,
    pub recipient_district: Option<&'a str>,
    pub recipient_upazila: Option<&'a str>,
    pub hospital_name: Option<&'a str>,
    pub full_address: Option<&'a str>,
    pub blood_group: Option<&'a str>,
    pub donation_date: Option<NaiveDate>,
    pub donation_time: Option<&'a str>,
    pub request_message: Option<&'a str>,
}

#[derive(Debug, Default)]
pub struct RequestFilter<'a> {
    pub status: Option<&'a str>,
    pub requester_email: Option<&'a str>,
}

const REQUEST_COLUMNS: &str = r#"
    id, requester_name, requester_email, recipient_name, recipient_district,
    recipient_upazila, hospital_name, full_address, blood_group, donation_date,
    donation_time, request_message, status, donor_name, donor_email,
    created_at, updated_at
"#;

pub async fn list(
    pool: &PgPool,
    filter: &RequestFilter<'_>,
    limit: i64,
    offset: i64,
) -> Result<Vec<DonationRequestRow>, RepoError> {
    let sql = format!(
        r#"
        SELECT {REQUEST_COLUMNS}
        FROM donation_requests
        WHERE ($1::text IS NULL OR status = $1)
          AND ($2::text IS NULL OR requester_email = $2)
        ORDER BY id DESC
        LIMIT $3 OFFSET $4
        "#
    );
    let rows = sqlx::query_as::<_, DonationRequestRow>(&sql)
        .bind(filter.status)
        .bind(filter.requester_email)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<DonationRequestRow>, RepoError> {
    let sql = format!("SELECT {REQUEST_COLUMNS} FROM donation_requests WHERE id = $1");
    let row = sqlx::query_as::<_, DonationRequestRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn create(
    pool: &PgPool,
    req: &NewDonationRequest<'_>,
) -> Result<DonationRequestRow, RepoError> {
    let sql = format!(
        r#"
        INSERT INTO donation_requests (
            requester_name, requester_email, recipient_name, recipient_district,
            recipient_upazila, hospital_name, full_address, blood_group,
            donation_date, donation_time, request_message, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'pending')
        RETURNING {REQUEST_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, DonationRequestRow>(&sql)
        .bind(req.requester_name)
        .bind(req.requester_email)
        .bind(req.recipient_name)
        .bind(req.recipient_district)
        .bind(req.recipient_upazila)
        .bind(req.hospital_name)
        .bind(req.full_address)
        .bind(req.blood_group)
        .bind(req.donation_date)
        .bind(req.donation_time)
        .bind(req.request_message)
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Edit details of a request that is still `pending`.
pub async fn update_details(
    pool: &PgPool,
    id: i64,
    changes: &DetailChanges<'_>,
) -> Result<Option<DonationRequestRow>, RepoError> {
    let sql = format!(
        r#"
        UPDATE donation_requests
        SET
            recipient_name = COALESCE($2, recipient_name),
            recipient_district = COALESCE($3, recipient_district),
            recipient_upazila = COALESCE($4, recipient_upazila),
            hospital_name = COALESCE($5, hospital_name),
            full_address = COALESCE($6, full_address),
            blood_group = COALESCE($7, blood_group),
            donation_date = COALESCE($8, donation_date),
            donation_time = COALESCE($9, donation_time),
            request_message = COALESCE($10, request_message),
            updated_at = now()
        WHERE id = $1 AND status = 'pending'
        RETURNING {REQUEST_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, DonationRequestRow>(&sql)
        .bind(id)
        .bind(changes.recipient_name)
        .bind(changes.recipient_district)
        .bind(changes.recipient_upazila)
        .bind(changes.hospital_name)
        .bind(changes.full_address)
        .bind(changes.blood_group)
        .bind(changes.donation_date)
        .bind(changes.donation_time)
        .bind(changes.request_message)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Move `from` → `to`. Returns `None` when the row is gone or no longer in `from`.
pub async fn transition(
    pool: &PgPool,
    id: i64,
    from: &str,
    to: &str,
) -> Result<Option<DonationRequestRow>, RepoError> {
    let sql = format!(
        r#"
        UPDATE donation_requests
        SET status = $3, updated_at = now()
        WHERE id = $1 AND status = $2
        RETURNING {REQUEST_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, DonationRequestRow>(&sql)
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// pending → inprogress with the donor recorded.
pub async fn assign_donor(
    pool: &PgPool,
    id: i64,
    donor_name: &str,
    donor_email: &str,
) -> Result<Option<DonationRequestRow>, RepoError> {
    let sql = format!(
        r#"
        UPDATE donation_requests
        SET status = 'inprogress', donor_name = $2, donor_email = $3, updated_at = now()
        WHERE id = $1 AND status = 'pending'
        RETURNING {REQUEST_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, DonationRequestRow>(&sql)
        .bind(id)
        .bind(donor_name)
        .bind(donor_email)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query("DELETE FROM donation_requests WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count(pool: &PgPool) -> Result<i64, RepoError> {
    let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM donation_requests")
        .fetch_one(pool)
        .await?;

    Ok(n)
}
