//! Members repository for database operations

use rust_decimal::Decimal;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{CreateMember, Member, MemberPatch},
};

#[derive(Clone)]
pub struct MembersRepository {
    pool: Pool<Postgres>,
}

impl MembersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get member by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Member> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// List all members
    pub async fn list(&self) -> AppResult<Vec<Member>> {
        let members =
            sqlx::query_as::<_, Member>("SELECT * FROM members ORDER BY last_name, first_name, id")
                .fetch_all(&self.pool)
                .await?;
        Ok(members)
    }

    /// Check whether an email is already registered, optionally excluding one member
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM members WHERE email = $1 AND ($2::int IS NULL OR id != $2))",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Register a new member
    pub async fn create(&self, member: &CreateMember) -> AppResult<Member> {
        let created = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (first_name, last_name, email, phone_number, balance)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(&member.email)
        .bind(&member.phone_number)
        .bind(member.balance)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Apply a partial profile update; absent fields keep their current value
    pub async fn update(&self, id: i32, patch: &MemberPatch) -> AppResult<Member> {
        let updated = sqlx::query_as::<_, Member>(
            r#"
            UPDATE members SET
                first_name = COALESCE($1, first_name),
                last_name = COALESCE($2, last_name),
                email = COALESCE($3, email),
                phone_number = COALESCE($4, phone_number)
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&patch.first_name)
        .bind(&patch.last_name)
        .bind(&patch.email)
        .bind(&patch.phone_number)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))?;

        Ok(updated)
    }

    /// Adjust the balance by a signed amount (positive = credit,
    /// negative = debit). Serialized per member by the row update itself.
    pub async fn adjust_balance(&self, id: i32, amount: Decimal) -> AppResult<Member> {
        sqlx::query_as::<_, Member>(
            "UPDATE members SET balance = balance + $1 WHERE id = $2 RETURNING *",
        )
        .bind(amount)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }
}
