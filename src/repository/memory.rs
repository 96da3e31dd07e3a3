//! In-memory lending store.
//!
//! Backs the coordinator unit tests and doubles as a storage backend for
//! ephemeral deployments. A store-wide async mutex serializes
//! transactions; each transaction stages its writes against a snapshot of
//! the state and swaps the snapshot in on commit, so a dropped transaction
//! leaves nothing behind.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    error::{AppError, AppResult},
    models::{Book, Loan, Member, NewLoan},
    repository::{LendingStore, LendingTx},
};

#[derive(Debug, Default, Clone)]
struct MemoryState {
    books: BTreeMap<i32, Book>,
    members: BTreeMap<i32, Member>,
    loans: BTreeMap<i32, Loan>,
    next_loan_id: i32,
}

#[derive(Clone, Default)]
pub struct MemoryLendingStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryLendingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a book record
    pub async fn put_book(&self, book: Book) {
        self.state.lock().await.books.insert(book.id, book);
    }

    /// Seed a member record
    pub async fn put_member(&self, member: Member) {
        self.state.lock().await.members.insert(member.id, member);
    }

    /// Current book record, if any
    pub async fn book(&self, id: i32) -> Option<Book> {
        self.state.lock().await.books.get(&id).cloned()
    }

    /// Current member record, if any
    pub async fn member(&self, id: i32) -> Option<Member> {
        self.state.lock().await.members.get(&id).cloned()
    }

    /// Current loan record, if any
    pub async fn loan(&self, id: i32) -> Option<Loan> {
        self.state.lock().await.loans.get(&id).cloned()
    }
}

#[async_trait]
impl LendingStore for MemoryLendingStore {
    async fn begin(&self) -> AppResult<Box<dyn LendingTx>> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryLendingTx { guard, staged }))
    }

    async fn list_loans(&self) -> AppResult<Vec<Loan>> {
        let state = self.state.lock().await;
        let mut loans: Vec<Loan> = state.loans.values().cloned().collect();
        loans.sort_by(|a, b| (b.issue_date, b.id).cmp(&(a.issue_date, a.id)));
        Ok(loans)
    }

    async fn member_loans(&self, member_id: i32) -> AppResult<Vec<Loan>> {
        let state = self.state.lock().await;
        if !state.members.contains_key(&member_id) {
            return Err(AppError::NotFound(format!(
                "Member with id {} not found",
                member_id
            )));
        }
        let mut loans: Vec<Loan> = state
            .loans
            .values()
            .filter(|l| l.member_id == member_id)
            .cloned()
            .collect();
        loans.sort_by(|a, b| (b.issue_date, b.id).cmp(&(a.issue_date, a.id)));
        Ok(loans)
    }

    async fn delete_member(&self, member_id: i32) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let open_loans = state
            .loans
            .values()
            .filter(|l| l.member_id == member_id && l.return_date.is_none())
            .count();
        if open_loans > 0 {
            return Err(AppError::Conflict(format!(
                "Member has {} open loan(s) and cannot be removed",
                open_loans
            )));
        }
        if state.members.remove(&member_id).is_none() {
            return Ok(false);
        }
        // Loan history cascades away with the member, matching the
        // Postgres foreign keys
        state.loans.retain(|_, l| l.member_id != member_id);
        Ok(true)
    }
}

struct MemoryLendingTx {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[async_trait]
impl LendingTx for MemoryLendingTx {
    async fn book_for_update(&mut self, id: i32) -> AppResult<Book> {
        self.staged
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn member_for_update(&mut self, id: i32) -> AppResult<Member> {
        self.staged
            .members
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    async fn loan_for_update(&mut self, id: i32) -> AppResult<Loan> {
        self.staged
            .loans
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    async fn save_book(&mut self, book: &Book) -> AppResult<()> {
        self.staged.books.insert(book.id, book.clone());
        Ok(())
    }

    async fn save_member(&mut self, member: &Member) -> AppResult<()> {
        self.staged.members.insert(member.id, member.clone());
        Ok(())
    }

    async fn insert_loan(&mut self, loan: &NewLoan) -> AppResult<Loan> {
        self.staged.next_loan_id += 1;
        let created = Loan {
            id: self.staged.next_loan_id,
            book_id: loan.book_id,
            member_id: loan.member_id,
            issue_date: loan.issue_date,
            return_date: None,
            fee: loan.fee,
            status: loan.status,
        };
        self.staged.loans.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_loan(&mut self, loan: &Loan) -> AppResult<()> {
        self.staged.loans.insert(loan.id, loan.clone());
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> AppResult<()> {
        *self.guard = self.staged;
        Ok(())
    }
}
