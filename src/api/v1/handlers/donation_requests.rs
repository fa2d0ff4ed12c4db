/*
 * Responsibility
 * - /donation-requests 系 handler (public / verified / owner / admin / volunteer)
 * - body / 保存済み row が持つ identity の本人確認は require_self を直接呼ぶ
 * - status 遷移は DonationStatus::can_transition_to + 条件付き UPDATE (競合は 409)
 */
use axum::{
    Json,
    extract::{Path, Query, State, rejection::{JsonRejection, QueryRejection}},
    http::StatusCode,
};

use crate::{
    api::v1::{
        dto::{
            common::ListQuery,
            donation_requests::{
                CreateDonationRequest, DonationRequestResponse, DonationStatus,
                RequesterQuery, UpdateDonationRequest, UpdateDonationStatusRequest,
            },
            users::UserStatus,
        },
        extractors::{AuthClaims, public_id::PublicDonationRequestId},
    },
    error::AppError,
    repos::{
        donation_request_repo::{
            self, DetailChanges, DonationRequestRow, NewDonationRequest, RequestFilter,
        },
        user_repo::UserRow,
    },
    services::auth::{Claims, guard::require_self},
    state::AppState,
};

fn row_to_response(
    state: &AppState,
    row: DonationRequestRow,
) -> Result<DonationRequestResponse, AppError> {
    Ok(DonationRequestResponse {
        id: state.id_codec.encode(row.id)?,
        requester_name: row.requester_name,
        requester_email: row.requester_email,
        recipient_name: row.recipient_name,
        recipient_district: row.recipient_district,
        recipient_upazila: row.recipient_upazila,
        hospital_name: row.hospital_name,
        full_address: row.full_address,
        blood_group: row.blood_group,
        donation_date: row.donation_date,
        donation_time: row.donation_time,
        request_message: row.request_message,
        status: row.status,
        donor_name: row.donor_name,
        donor_email: row.donor_email,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn rows_to_response(
    state: &AppState,
    rows: Vec<DonationRequestRow>,
) -> Result<Json<Vec<DonationRequestResponse>>, AppError> {
    let res = rows
        .into_iter()
        .map(|row| row_to_response(state, row))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(res))
}

fn stored_status(row: &DonationRequestRow) -> Result<DonationStatus, AppError> {
    row.status.parse().map_err(|_| {
        tracing::error!(request_id = row.id, status = %row.status, "stored donation status is invalid");
        AppError::Internal
    })
}

/// Registered, non-blocked caller.
async fn active_caller(state: &AppState, claims: &Claims) -> Result<UserRow, AppError> {
    let user = state.users.find_by_email(&claims.email).await?;
    ensure_active(claims, user)
}

fn ensure_active(claims: &Claims, user: Option<UserRow>) -> Result<UserRow, AppError> {
    let Some(user) = user else {
        tracing::warn!(email = %claims.email, "unregistered user refused");
        return Err(AppError::Forbidden);
    };
    if user.status == UserStatus::Blocked.as_str() {
        tracing::warn!(email = %claims.email, "blocked user refused");
        return Err(AppError::Forbidden);
    }
    Ok(user)
}

fn ensure_not_own(requester_email: &str, claims: &Claims) -> Result<(), AppError> {
    if requester_email == claims.email {
        return Err(AppError::bad_request(
            "OWN_REQUEST",
            "cannot donate to your own request",
        ));
    }
    Ok(())
}

async fn find(state: &AppState, id: i64) -> Result<DonationRequestRow, AppError> {
    donation_request_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found("donation request"))
}

// ---- public ----

pub async fn list_pending(
    State(state): State<AppState>,
    query: Result<Query<ListQuery<DonationStatus>>, QueryRejection>,
) -> Result<Json<Vec<DonationRequestResponse>>, AppError> {
    let Query(query) = query?;
    let (limit, offset) = query.limit_offset();
    // ?status= is ignored here, the public feed only shows open requests
    let filter = RequestFilter {
        status: Some(DonationStatus::Pending.as_str()),
        requester_email: None,
    };

    let rows = donation_request_repo::list(&state.db, &filter, limit, offset).await?;
    rows_to_response(&state, rows)
}

// ---- verified ----

pub async fn create_request(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    req: Result<Json<CreateDonationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DonationRequestResponse>), AppError> {
    let Json(req) = req?;
    req.validate().map_err(AppError::invalid)?;

    require_self(&claims, req.requester_email.trim()).into_result()?;
    active_caller(&state, &claims).await?;

    let new_request = NewDonationRequest {
        requester_name: req.requester_name.trim(),
        requester_email: req.requester_email.trim(),
        recipient_name: req.recipient_name.trim(),
        recipient_district: &req.recipient_district,
        recipient_upazila: &req.recipient_upazila,
        hospital_name: req.hospital_name.trim(),
        full_address: &req.full_address,
        blood_group: &req.blood_group,
        donation_date: req.donation_date,
        donation_time: &req.donation_time,
        request_message: req.request_message.as_deref(),
    };
    let row = donation_request_repo::create(&state.db, &new_request).await?;
    tracing::info!(request_id = row.id, requester = %claims.email, "donation request created");

    Ok((StatusCode::CREATED, Json(row_to_response(&state, row)?)))
}

pub async fn get_request(
    State(state): State<AppState>,
    request_id: PublicDonationRequestId,
) -> Result<Json<DonationRequestResponse>, AppError> {
    let row = find(&state, request_id.id).await?;
    Ok(Json(row_to_response(&state, row)?))
}

/// Caller volunteers as the donor: pending → inprogress.
pub async fn donate(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    request_id: PublicDonationRequestId,
) -> Result<Json<DonationRequestResponse>, AppError> {
    let donor = active_caller(&state, &claims).await?;
    let row = find(&state, request_id.id).await?;
    ensure_not_own(&row.requester_email, &claims)?;

    let row = donation_request_repo::assign_donor(&state.db, row.id, &donor.name, &donor.email)
        .await?
        .ok_or_else(|| AppError::conflict("INVALID_TRANSITION", "request is no longer pending"))?;
    tracing::info!(request_id = row.id, donor = %donor.email, "donor assigned");

    Ok(Json(row_to_response(&state, row)?))
}

pub async fn my_requests(
    State(state): State<AppState>,
    Path(email): Path<String>,
    query: Result<Query<ListQuery<DonationStatus>>, QueryRejection>,
) -> Result<Json<Vec<DonationRequestResponse>>, AppError> {
    let Query(query) = query?;
    requests_of(&state, &email, &query).await
}

/// `GET /my-donation-requests?email=`: same listing, identity in the query string.
pub async fn my_requests_by_query(
    State(state): State<AppState>,
    owner: Result<Query<RequesterQuery>, QueryRejection>,
    query: Result<Query<ListQuery<DonationStatus>>, QueryRejection>,
) -> Result<Json<Vec<DonationRequestResponse>>, AppError> {
    let Query(owner) = owner?;
    let Query(query) = query?;
    requests_of(&state, &owner.email, &query).await
}

async fn requests_of(
    state: &AppState,
    email: &str,
    query: &ListQuery<DonationStatus>,
) -> Result<Json<Vec<DonationRequestResponse>>, AppError> {
    let (limit, offset) = query.limit_offset();
    let filter = RequestFilter {
        status: query.status.map(|s| s.as_str()),
        requester_email: Some(email),
    };

    let rows = donation_request_repo::list(&state.db, &filter, limit, offset).await?;
    rows_to_response(state, rows)
}

// ---- owner ----

pub async fn update_request(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    request_id: PublicDonationRequestId,
    req: Result<Json<UpdateDonationRequest>, JsonRejection>,
) -> Result<Json<DonationRequestResponse>, AppError> {
    let Json(req) = req?;
    req.validate().map_err(AppError::invalid)?;

    let row = find(&state, request_id.id).await?;
    require_self(&claims, &row.requester_email).into_result()?;

    let changes = DetailChanges {
        recipient_name: req.recipient_name.as_deref().map(str::trim),
        recipient_district: req.recipient_district.as_deref(),
        recipient_upazila: req.recipient_upazila.as_deref(),
        hospital_name: req.hospital_name.as_deref().map(str::trim),
        full_address: req.full_address.as_deref(),
        blood_group: req.blood_group.as_deref(),
        donation_date: req.donation_date,
        donation_time: req.donation_time.as_deref(),
        request_message: req.request_message.as_deref(),
    };
    let row = donation_request_repo::update_details(&state.db, row.id, &changes)
        .await?
        .ok_or_else(|| {
            AppError::conflict("NOT_EDITABLE", "only pending requests can be edited")
        })?;

    Ok(Json(row_to_response(&state, row)?))
}

pub async fn delete_request(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    request_id: PublicDonationRequestId,
) -> Result<StatusCode, AppError> {
    let row = find(&state, request_id.id).await?;
    require_self(&claims, &row.requester_email).into_result()?;

    if donation_request_repo::delete(&state.db, row.id).await? {
        tracing::info!(request_id = row.id, requester = %claims.email, "donation request deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("donation request"))
    }
}

// ---- admin / volunteer ----

pub async fn list_all(
    State(state): State<AppState>,
    query: Result<Query<ListQuery<DonationStatus>>, QueryRejection>,
) -> Result<Json<Vec<DonationRequestResponse>>, AppError> {
    let Query(query) = query?;
    let (limit, offset) = query.limit_offset();
    let filter = RequestFilter {
        status: query.status.map(|s| s.as_str()),
        requester_email: None,
    };

    let rows = donation_request_repo::list(&state.db, &filter, limit, offset).await?;
    rows_to_response(&state, rows)
}

pub async fn update_status(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    request_id: PublicDonationRequestId,
    req: Result<Json<UpdateDonationStatusRequest>, JsonRejection>,
) -> Result<Json<DonationRequestResponse>, AppError> {
    let Json(req) = req?;
    let next = req.status;
    // inprogress needs a donor, so it is only reachable through /donate
    if next == DonationStatus::InProgress {
        return Err(AppError::invalid("use the donate endpoint to start a donation"));
    }

    let row = find(&state, request_id.id).await?;
    let current = stored_status(&row)?;
    if !current.can_transition_to(next) {
        return Err(AppError::conflict(
            "INVALID_TRANSITION",
            format!("cannot move from {} to {}", current.as_str(), next.as_str()),
        ));
    }

    let row = donation_request_repo::transition(&state.db, row.id, current.as_str(), next.as_str())
        .await?
        .ok_or_else(|| AppError::conflict("INVALID_TRANSITION", "request status changed concurrently"))?;
    tracing::info!(
        request_id = row.id,
        from = current.as_str(),
        to = next.as_str(),
        by = %claims.email,
        "donation status changed"
    );

    Ok(Json(row_to_response(&state, row)?))
}
