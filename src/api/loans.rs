//! Loan management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::Loan};

/// Issue book request
#[derive(Deserialize, ToSchema)]
pub struct IssueBookRequest {
    /// Member borrowing the book
    pub member_id: i32,
    /// Book to issue
    pub book_id: i32,
}

/// List all loans
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    responses(
        (status = 200, description = "All loans", body = Vec<Loan>)
    )
)]
pub async fn list_loans(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Loan>>> {
    let loans = state.services.lending.list_loans().await?;
    Ok(Json(loans))
}

/// Issue a book to a member
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = IssueBookRequest,
    responses(
        (status = 201, description = "Book issued", body = Loan),
        (status = 404, description = "Member or book not found"),
        (status = 409, description = "Book out of stock")
    )
)]
pub async fn issue_book(
    State(state): State<crate::AppState>,
    Json(request): Json<IssueBookRequest>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    let loan = state
        .services
        .lending
        .issue_book(request.member_id, request.book_id)
        .await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = Loan),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Already returned"),
        (status = 422, description = "Member at debt limit")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.lending.return_book(loan_id).await?;
    Ok(Json(loan))
}
