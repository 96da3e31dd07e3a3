//! Data models for OpenShelf

pub mod book;
pub mod loan;
pub mod member;

// Re-export commonly used types
pub use book::{Book, BookPatch, CreateBook};
pub use loan::{Loan, LoanStatus, NewLoan};
pub use member::{CreateMember, Member, MemberPatch};
