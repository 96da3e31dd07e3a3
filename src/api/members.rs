//! Member management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{member::AmountRequest, CreateMember, Loan, Member, MemberPatch},
};

/// Balance response body
#[derive(Serialize, ToSchema)]
pub struct BalanceResponse {
    pub member_id: i32,
    #[schema(value_type = String)]
    pub balance: Decimal,
}

/// List all members
#[utoipa::path(
    get,
    path = "/members",
    tag = "members",
    responses(
        (status = 200, description = "All registered members", body = Vec<Member>)
    )
)]
pub async fn list_members(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Member>>> {
    let members = state.services.members.list_members().await?;
    Ok(Json(members))
}

/// Get a single member
#[utoipa::path(
    get,
    path = "/members/{id}",
    tag = "members",
    params(
        ("id" = i32, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member", body = Member),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_member(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Member>> {
    let member = state.services.members.get_member(id).await?;
    Ok(Json(member))
}

/// Register a new member
#[utoipa::path(
    post,
    path = "/members",
    tag = "members",
    request_body = CreateMember,
    responses(
        (status = 201, description = "Member registered", body = Member),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register_member(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateMember>,
) -> AppResult<(StatusCode, Json<Member>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let member = state.services.members.register_member(request).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Partially update a member profile
#[utoipa::path(
    patch,
    path = "/members/{id}",
    tag = "members",
    params(
        ("id" = i32, Path, description = "Member ID")
    ),
    request_body = MemberPatch,
    responses(
        (status = 200, description = "Member updated", body = Member),
        (status = 400, description = "Invalid or empty patch"),
        (status = 404, description = "Member not found")
    )
)]
pub async fn update_member(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(patch): Json<MemberPatch>,
) -> AppResult<Json<Member>> {
    patch
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let member = state.services.members.update_member(id, patch).await?;
    Ok(Json(member))
}

/// Cancel a membership
#[utoipa::path(
    delete,
    path = "/members/{id}",
    tag = "members",
    params(
        ("id" = i32, Path, description = "Member ID")
    ),
    responses(
        (status = 204, description = "Membership cancelled"),
        (status = 404, description = "Member not found"),
        (status = 409, description = "Member has open loans")
    )
)]
pub async fn cancel_membership(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.lending.cancel_membership(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get a member's account balance
#[utoipa::path(
    get,
    path = "/members/{id}/balance",
    tag = "members",
    params(
        ("id" = i32, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Account balance", body = BalanceResponse),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_balance(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BalanceResponse>> {
    let balance = state.services.members.get_balance(id).await?;
    Ok(Json(BalanceResponse {
        member_id: id,
        balance,
    }))
}

/// Credit a member account
#[utoipa::path(
    post,
    path = "/members/{id}/credit",
    tag = "members",
    params(
        ("id" = i32, Path, description = "Member ID")
    ),
    request_body = AmountRequest,
    responses(
        (status = 200, description = "Account credited", body = Member),
        (status = 400, description = "Amount not positive"),
        (status = 404, description = "Member not found")
    )
)]
pub async fn credit_account(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(request): Json<AmountRequest>,
) -> AppResult<Json<Member>> {
    let member = state
        .services
        .members
        .credit_account(id, request.amount)
        .await?;
    Ok(Json(member))
}

/// Debit a member account
#[utoipa::path(
    post,
    path = "/members/{id}/debit",
    tag = "members",
    params(
        ("id" = i32, Path, description = "Member ID")
    ),
    request_body = AmountRequest,
    responses(
        (status = 200, description = "Account debited", body = Member),
        (status = 400, description = "Amount not positive"),
        (status = 404, description = "Member not found")
    )
)]
pub async fn debit_account(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(request): Json<AmountRequest>,
) -> AppResult<Json<Member>> {
    let member = state
        .services
        .members
        .debit_account(id, request.amount)
        .await?;
    Ok(Json(member))
}

/// Get loans for a specific member
#[utoipa::path(
    get,
    path = "/members/{id}/loans",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member's loans", body = Vec<Loan>),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_member_loans(
    State(state): State<crate::AppState>,
    Path(member_id): Path<i32>,
) -> AppResult<Json<Vec<Loan>>> {
    let loans = state.services.lending.member_loans(member_id).await?;
    Ok(Json(loans))
}
