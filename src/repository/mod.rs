//! Repository layer for database operations

pub mod books;
pub mod loans;
pub mod members;
pub mod memory;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{Book, Loan, Member, NewLoan},
};

/// Storage backend consumed by the lending coordinator.
///
/// `begin` opens a transactional context covering every record the
/// coordinator may touch in one operation. Read-only loan queries and
/// member deletion do not need the multi-entity context and are exposed
/// directly.
#[async_trait]
pub trait LendingStore: Send + Sync {
    async fn begin(&self) -> AppResult<Box<dyn LendingTx>>;

    /// All loans, most recent issue first
    async fn list_loans(&self) -> AppResult<Vec<Loan>>;

    /// Loans of one member; `NotFound` if the member does not exist
    async fn member_loans(&self, member_id: i32) -> AppResult<Vec<Loan>>;

    /// Delete a member. Ok(false) when absent; `Conflict` when open loans
    /// still reference the member.
    async fn delete_member(&self, member_id: i32) -> AppResult<bool>;
}

/// One atomic unit of lending work.
///
/// Loads of records that will be mutated are serialized per row by the
/// backend (row locks on Postgres, a store-wide mutex in memory). Writes
/// become visible only on `commit`; dropping the context rolls everything
/// back, so no failure path can leave a half-updated state behind.
#[async_trait]
pub trait LendingTx: Send {
    async fn book_for_update(&mut self, id: i32) -> AppResult<Book>;
    async fn member_for_update(&mut self, id: i32) -> AppResult<Member>;
    async fn loan_for_update(&mut self, id: i32) -> AppResult<Loan>;

    async fn save_book(&mut self, book: &Book) -> AppResult<()>;
    async fn save_member(&mut self, member: &Member) -> AppResult<()>;
    async fn insert_loan(&mut self, loan: &NewLoan) -> AppResult<Loan>;
    async fn update_loan(&mut self, loan: &Loan) -> AppResult<()>;

    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub members: members::MembersRepository,
    pub lending: loans::PgLendingStore,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            members: members::MembersRepository::new(pool.clone()),
            lending: loans::PgLendingStore::new(pool.clone()),
            pool,
        }
    }
}
