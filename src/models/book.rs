//! Book (catalog entry) model and related types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    /// ISBN-13, unique across the catalog
    pub isbn: String,
    pub publication_year: i32,
    /// Number of copies currently available for issue
    pub stock: i32,
    /// Fee charged per loan, snapshotted onto each loan at issue time
    #[schema(value_type = String)]
    pub rent_fee: Decimal,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    #[validate(length(equal = 13, message = "ISBN must be 13 characters"))]
    pub isbn: String,
    #[validate(range(min = 0, message = "Publication year must be positive"))]
    pub publication_year: i32,
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: i32,
    #[schema(value_type = String)]
    pub rent_fee: Decimal,
}

/// Partial update for a book. Absent fields are left untouched; fields that
/// are never nullable cannot be cleared through this structure.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    #[validate(length(equal = 13, message = "ISBN must be 13 characters"))]
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub rent_fee: Option<Decimal>,
}

impl BookPatch {
    /// True when no field is present
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.isbn.is_none()
            && self.publication_year.is_none()
            && self.stock.is_none()
            && self.rent_fee.is_none()
    }
}
