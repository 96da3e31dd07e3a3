//! Lending coordinator.
//!
//! The only place that mutates book stock, member balance, and loan
//! records together. Every mutating operation runs inside one
//! transactional context from the [`LendingStore`]: either all of its
//! writes land or none do, and any early return drops the context, which
//! rolls the transaction back.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::{Loan, LoanStatus},
    repository::LendingStore,
    services::ledger::LoanLedger,
};

#[derive(Clone)]
pub struct LendingService {
    store: Arc<dyn LendingStore>,
    /// Most negative balance at which a member may still settle a return
    debt_floor: Decimal,
}

impl LendingService {
    pub fn new(store: Arc<dyn LendingStore>, debt_floor: Decimal) -> Self {
        Self { store, debt_floor }
    }

    /// Issue a book to a member: decrement stock, snapshot the fee, create
    /// the loan. Stock check and decrement happen under the book's row
    /// lock, so two concurrent issues cannot drive stock negative.
    pub async fn issue_book(&self, member_id: i32, book_id: i32) -> AppResult<Loan> {
        let mut tx = self.store.begin().await?;

        let mut book = tx.book_for_update(book_id).await?;
        tx.member_for_update(member_id).await?;

        if book.stock <= 0 {
            return Err(AppError::OutOfStock(format!(
                "Book '{}' is out of stock",
                book.title
            )));
        }

        book.stock -= 1;
        let new_loan = LoanLedger::create(book.id, member_id, book.rent_fee, Utc::now().date_naive());

        tx.save_book(&book).await?;
        let loan = tx.insert_loan(&new_loan).await?;
        tx.commit().await?;

        tracing::info!(loan_id = loan.id, book_id, member_id, "book issued");
        Ok(loan)
    }

    /// Return a borrowed book: transition the loan, restock the book,
    /// deduct the loan's fee from the member's balance.
    ///
    /// The debt-floor check runs against the balance *before* this loan's
    /// fee is deducted. A member already at or below the floor is blocked
    /// from returning even though the deduction would only push the
    /// balance further down. Deliberate, long-standing behavior; do not
    /// reorder the check and the deduction.
    pub async fn return_book(&self, loan_id: i32) -> AppResult<Loan> {
        let mut tx = self.store.begin().await?;

        let loan = tx.loan_for_update(loan_id).await?;
        if loan.status == LoanStatus::Returned {
            return Err(AppError::AlreadyReturned(format!(
                "Loan {} has already been returned",
                loan.id
            )));
        }

        let mut book = tx.book_for_update(loan.book_id).await?;
        let mut member = tx.member_for_update(loan.member_id).await?;

        if member.balance <= self.debt_floor {
            return Err(AppError::DebtLimitExceeded(format!(
                "Member {} has reached the allowed debt limit",
                member.id
            )));
        }

        let loan = LoanLedger::mark_returned(loan, Utc::now().date_naive())?;
        book.stock += 1;
        member.balance -= loan.fee;

        tx.update_loan(&loan).await?;
        tx.save_book(&book).await?;
        tx.save_member(&member).await?;
        tx.commit().await?;

        tracing::info!(
            loan_id = loan.id,
            book_id = book.id,
            member_id = member.id,
            "book returned"
        );
        Ok(loan)
    }

    /// Cancel a membership. Fails with `NotFound` for an unknown member
    /// and `Conflict` while open loans still reference the member.
    pub async fn cancel_membership(&self, member_id: i32) -> AppResult<()> {
        if !self.store.delete_member(member_id).await? {
            return Err(AppError::NotFound(format!(
                "Member with id {} not found",
                member_id
            )));
        }
        tracing::info!(member_id, "membership cancelled");
        Ok(())
    }

    /// All loans
    pub async fn list_loans(&self) -> AppResult<Vec<Loan>> {
        self.store.list_loans().await
    }

    /// Loans of one member
    pub async fn member_loans(&self, member_id: i32) -> AppResult<Vec<Loan>> {
        self.store.member_loans(member_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Book, Member};
    use crate::repository::memory::MemoryLendingStore;
    use rust_decimal_macros::dec;

    fn book(id: i32, stock: i32, rent_fee: Decimal) -> Book {
        Book {
            id,
            title: format!("Book {}", id),
            author: "Author".to_string(),
            isbn: format!("978000000{:04}", id),
            publication_year: 1999,
            stock,
            rent_fee,
        }
    }

    fn member(id: i32, balance: Decimal) -> Member {
        Member {
            id,
            first_name: "Ada".to_string(),
            last_name: format!("Member {}", id),
            email: format!("member{}@example.org", id),
            phone_number: "0000000000".to_string(),
            balance,
        }
    }

    fn service(store: &MemoryLendingStore) -> LendingService {
        LendingService::new(Arc::new(store.clone()), dec!(-500))
    }

    #[tokio::test]
    async fn issue_decrements_stock_and_snapshots_fee() {
        let store = MemoryLendingStore::new();
        store.put_book(book(1, 3, dec!(5.00))).await;
        store.put_member(member(1, dec!(0))).await;

        let loan = service(&store).issue_book(1, 1).await.unwrap();

        assert_eq!(loan.status, LoanStatus::Issued);
        assert_eq!(loan.fee, dec!(5.00));
        assert!(loan.return_date.is_none());
        assert_eq!(store.book(1).await.unwrap().stock, 2);
    }

    #[tokio::test]
    async fn issue_fails_out_of_stock_and_mutates_nothing() {
        let store = MemoryLendingStore::new();
        store.put_book(book(1, 1, dec!(5.00))).await;
        store.put_member(member(1, dec!(0))).await;
        store.put_member(member(2, dec!(0))).await;
        let svc = service(&store);

        let loan = svc.issue_book(1, 1).await.unwrap();
        assert_eq!(loan.fee, dec!(5.00));
        assert_eq!(store.book(1).await.unwrap().stock, 0);

        let err = svc.issue_book(2, 1).await.unwrap_err();
        assert!(matches!(err, AppError::OutOfStock(_)));
        assert_eq!(store.book(1).await.unwrap().stock, 0);
        assert_eq!(svc.list_loans().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn issue_with_unknown_member_leaves_stock_untouched() {
        let store = MemoryLendingStore::new();
        store.put_book(book(1, 2, dec!(5.00))).await;
        let svc = service(&store);

        let err = svc.issue_book(99, 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.book(1).await.unwrap().stock, 2);
        assert!(svc.list_loans().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn issue_with_unknown_book_fails_not_found() {
        let store = MemoryLendingStore::new();
        store.put_member(member(1, dec!(0))).await;

        let err = service(&store).issue_book(1, 42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn return_settles_stock_balance_and_loan_together() {
        let store = MemoryLendingStore::new();
        store.put_book(book(1, 1, dec!(5.00))).await;
        store.put_member(member(1, dec!(0.00))).await;
        let svc = service(&store);

        let loan = svc.issue_book(1, 1).await.unwrap();
        let returned = svc.return_book(loan.id).await.unwrap();

        assert_eq!(returned.status, LoanStatus::Returned);
        assert!(returned.return_date.is_some());
        assert_eq!(store.book(1).await.unwrap().stock, 1);
        assert_eq!(store.member(1).await.unwrap().balance, dec!(-5.00));
    }

    #[tokio::test]
    async fn double_return_fails_and_mutates_nothing() {
        let store = MemoryLendingStore::new();
        store.put_book(book(1, 1, dec!(5.00))).await;
        store.put_member(member(1, dec!(0))).await;
        let svc = service(&store);

        let loan = svc.issue_book(1, 1).await.unwrap();
        svc.return_book(loan.id).await.unwrap();

        let err = svc.return_book(loan.id).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyReturned(_)));
        assert_eq!(store.book(1).await.unwrap().stock, 1);
        assert_eq!(store.member(1).await.unwrap().balance, dec!(-5.00));
    }

    #[tokio::test]
    async fn fee_snapshot_survives_catalog_price_change() {
        let store = MemoryLendingStore::new();
        store.put_book(book(1, 1, dec!(5.00))).await;
        store.put_member(member(1, dec!(0))).await;
        let svc = service(&store);

        let loan = svc.issue_book(1, 1).await.unwrap();

        // Catalog price goes up after issue
        let mut repriced = store.book(1).await.unwrap();
        repriced.rent_fee = dec!(9.99);
        store.put_book(repriced).await;

        let returned = svc.return_book(loan.id).await.unwrap();
        assert_eq!(returned.fee, dec!(5.00));
        assert_eq!(store.member(1).await.unwrap().balance, dec!(-5.00));
    }

    #[tokio::test]
    async fn return_blocked_at_debt_floor() {
        let store = MemoryLendingStore::new();
        store.put_book(book(1, 1, dec!(5.00))).await;
        store.put_member(member(1, dec!(0))).await;
        let svc = service(&store);

        let loan = svc.issue_book(1, 1).await.unwrap();

        // Member sinks to exactly the floor before returning
        let mut broke = store.member(1).await.unwrap();
        broke.balance = dec!(-500.00);
        store.put_member(broke).await;

        let err = svc.return_book(loan.id).await.unwrap_err();
        assert!(matches!(err, AppError::DebtLimitExceeded(_)));
        assert_eq!(store.book(1).await.unwrap().stock, 0);
        assert_eq!(store.member(1).await.unwrap().balance, dec!(-500.00));
        assert_eq!(
            store.loan(loan.id).await.unwrap().status,
            LoanStatus::Issued
        );
    }

    #[tokio::test]
    async fn return_blocked_below_debt_floor_regardless_of_fee() {
        let store = MemoryLendingStore::new();
        store.put_book(book(1, 1, dec!(0.01))).await;
        store.put_member(member(1, dec!(0))).await;
        let svc = service(&store);

        let loan = svc.issue_book(1, 1).await.unwrap();

        let mut broke = store.member(1).await.unwrap();
        broke.balance = dec!(-650.00);
        store.put_member(broke).await;

        let err = svc.return_book(loan.id).await.unwrap_err();
        assert!(matches!(err, AppError::DebtLimitExceeded(_)));
    }

    #[tokio::test]
    async fn return_of_unknown_loan_fails_not_found() {
        let store = MemoryLendingStore::new();
        let err = service(&store).return_book(12345).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn cancel_membership_distinguishes_missing_members() {
        let store = MemoryLendingStore::new();
        store.put_member(member(1, dec!(0))).await;
        let svc = service(&store);

        svc.cancel_membership(1).await.unwrap();
        assert!(store.member(1).await.is_none());

        let err = svc.cancel_membership(1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn cancel_membership_succeeds_with_returned_loan_history() {
        let store = MemoryLendingStore::new();
        store.put_book(book(1, 1, dec!(5.00))).await;
        store.put_member(member(1, dec!(0))).await;
        let svc = service(&store);

        // A fully settled loan must not block cancellation
        let loan = svc.issue_book(1, 1).await.unwrap();
        svc.return_book(loan.id).await.unwrap();

        svc.cancel_membership(1).await.unwrap();
        assert!(store.member(1).await.is_none());
        // History goes with the member
        assert!(store.loan(loan.id).await.is_none());
    }

    #[tokio::test]
    async fn cancel_membership_refused_while_loans_are_open() {
        let store = MemoryLendingStore::new();
        store.put_book(book(1, 1, dec!(5.00))).await;
        store.put_member(member(1, dec!(0))).await;
        let svc = service(&store);

        svc.issue_book(1, 1).await.unwrap();

        let err = svc.cancel_membership(1).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(store.member(1).await.is_some());
    }

    #[tokio::test]
    async fn member_loans_lists_only_that_member() {
        let store = MemoryLendingStore::new();
        store.put_book(book(1, 5, dec!(1.00))).await;
        store.put_member(member(1, dec!(0))).await;
        store.put_member(member(2, dec!(0))).await;
        let svc = service(&store);

        svc.issue_book(1, 1).await.unwrap();
        svc.issue_book(1, 1).await.unwrap();
        svc.issue_book(2, 1).await.unwrap();

        assert_eq!(svc.member_loans(1).await.unwrap().len(), 2);
        assert_eq!(svc.member_loans(2).await.unwrap().len(), 1);
        assert_eq!(svc.list_loans().await.unwrap().len(), 3);

        let err = svc.member_loans(99).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
