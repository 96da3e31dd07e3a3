//! Loan ledger: lifecycle of individual loan records.
//!
//! Pure state transitions, no I/O. The coordinator owns loading, invariant
//! checks against other entities, and persistence.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::{Loan, LoanStatus, NewLoan},
};

pub struct LoanLedger;

impl LoanLedger {
    /// Produce a new Issued loan with the fee fixed at the given value.
    /// The fee never changes afterwards, whatever happens to the catalog
    /// price.
    pub fn create(book_id: i32, member_id: i32, fee: Decimal, issue_date: NaiveDate) -> NewLoan {
        NewLoan {
            book_id,
            member_id,
            issue_date,
            fee,
            status: LoanStatus::Issued,
        }
    }

    /// Transition a loan to Returned. The only guard here is the
    /// double-return check; everything else is the coordinator's business.
    pub fn mark_returned(mut loan: Loan, return_date: NaiveDate) -> AppResult<Loan> {
        if loan.status == LoanStatus::Returned {
            return Err(AppError::AlreadyReturned(format!(
                "Loan {} has already been returned",
                loan.id
            )));
        }
        loan.status = LoanStatus::Returned;
        loan.return_date = Some(return_date);
        Ok(loan)
    }
}
