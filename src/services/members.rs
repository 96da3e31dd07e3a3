//! Member directory service

use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::{CreateMember, Member, MemberPatch},
    repository::Repository,
};

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
}

impl MembersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_members(&self) -> AppResult<Vec<Member>> {
        self.repository.members.list().await
    }

    pub async fn get_member(&self, id: i32) -> AppResult<Member> {
        self.repository.members.get_by_id(id).await
    }

    /// Register a new member
    pub async fn register_member(&self, member: CreateMember) -> AppResult<Member> {
        if self
            .repository
            .members
            .email_exists(&member.email, None)
            .await?
        {
            return Err(AppError::Conflict(format!(
                "A member with email {} already exists",
                member.email
            )));
        }
        self.repository.members.create(&member).await
    }

    /// Partially update a member profile
    pub async fn update_member(&self, id: i32, patch: MemberPatch) -> AppResult<Member> {
        if patch.is_empty() {
            return Err(AppError::BadRequest(
                "Patch contains no fields to update".to_string(),
            ));
        }
        if let Some(ref email) = patch.email {
            if self.repository.members.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict(format!(
                    "A member with email {} already exists",
                    email
                )));
            }
        }
        self.repository.members.update(id, &patch).await
    }

    /// Current account balance
    pub async fn get_balance(&self, id: i32) -> AppResult<Decimal> {
        Ok(self.repository.members.get_by_id(id).await?.balance)
    }

    /// Add funds to a member account
    pub async fn credit_account(&self, id: i32, amount: Decimal) -> AppResult<Member> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Credit amount must be positive".to_string(),
            ));
        }
        self.repository.members.adjust_balance(id, amount).await
    }

    /// Charge a member account
    pub async fn debit_account(&self, id: i32, amount: Decimal) -> AppResult<Member> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Debit amount must be positive".to_string(),
            ));
        }
        self.repository.members.adjust_balance(id, -amount).await
    }
}
