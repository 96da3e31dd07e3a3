//! Postgres lending store: loan queries and the transactional context
//! used by the lending coordinator.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{Book, Loan, Member, NewLoan},
    repository::{LendingStore, LendingTx},
};

#[derive(Clone)]
pub struct PgLendingStore {
    pool: Pool<Postgres>,
}

impl PgLendingStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LendingStore for PgLendingStore {
    async fn begin(&self) -> AppResult<Box<dyn LendingTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgLendingTx { tx }))
    }

    async fn list_loans(&self) -> AppResult<Vec<Loan>> {
        let loans =
            sqlx::query_as::<_, Loan>("SELECT * FROM loans ORDER BY issue_date DESC, id DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(loans)
    }

    async fn member_loans(&self, member_id: i32) -> AppResult<Vec<Loan>> {
        let member_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE id = $1)")
                .bind(member_id)
                .fetch_one(&self.pool)
                .await?;

        if !member_exists {
            return Err(AppError::NotFound(format!(
                "Member with id {} not found",
                member_id
            )));
        }

        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE member_id = $1 ORDER BY issue_date DESC, id DESC",
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    async fn delete_member(&self, member_id: i32) -> AppResult<bool> {
        // Guard and delete share one transaction. The member row lock
        // serializes this against issue_book, which locks the same row
        // before inserting a loan, so the open-loan count cannot go stale
        // between the check and the delete. Returned loans cascade away
        // with the member.
        let mut tx = self.pool.begin().await?;

        let member: Option<i32> =
            sqlx::query_scalar("SELECT id FROM members WHERE id = $1 FOR UPDATE")
                .bind(member_id)
                .fetch_optional(&mut *tx)
                .await?;

        if member.is_none() {
            return Ok(false);
        }

        let open_loans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE member_id = $1 AND status = 'Issued'",
        )
        .bind(member_id)
        .fetch_one(&mut *tx)
        .await?;

        if open_loans > 0 {
            return Err(AppError::Conflict(format!(
                "Member has {} open loan(s) and cannot be removed",
                open_loans
            )));
        }

        sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(member_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}

/// One database transaction. Rows that will be mutated are read with
/// `FOR UPDATE`, so concurrent operations touching the same book, member
/// or loan serialize on the row lock. Dropping the transaction without
/// commit rolls it back.
pub struct PgLendingTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LendingTx for PgLendingTx {
    async fn book_for_update(&mut self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn member_for_update(&mut self, id: i32) -> AppResult<Member> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    async fn loan_for_update(&mut self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    async fn save_book(&mut self, book: &Book) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE books SET title = $1, author = $2, isbn = $3,
                   publication_year = $4, stock = $5, rent_fee = $6
            WHERE id = $7
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.publication_year)
        .bind(book.stock)
        .bind(book.rent_fee)
        .bind(book.id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn save_member(&mut self, member: &Member) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE members SET first_name = $1, last_name = $2, email = $3,
                   phone_number = $4, balance = $5
            WHERE id = $6
            "#,
        )
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(&member.email)
        .bind(&member.phone_number)
        .bind(member.balance)
        .bind(member.id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn insert_loan(&mut self, loan: &NewLoan) -> AppResult<Loan> {
        let created = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (book_id, member_id, issue_date, return_date, fee, status)
            VALUES ($1, $2, $3, NULL, $4, $5)
            RETURNING *
            "#,
        )
        .bind(loan.book_id)
        .bind(loan.member_id)
        .bind(loan.issue_date)
        .bind(loan.fee)
        .bind(loan.status)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(created)
    }

    async fn update_loan(&mut self, loan: &Loan) -> AppResult<()> {
        sqlx::query("UPDATE loans SET return_date = $1, status = $2 WHERE id = $3")
            .bind(loan.return_date)
            .bind(loan.status)
            .bind(loan.id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
