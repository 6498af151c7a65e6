//! Data models for the Libris server

pub mod book;
pub mod claims;
pub mod enums;
pub mod fine;
pub mod librarian;
pub mod loan;
pub mod member;

pub use book::{Book, BookDetails, BookQuery, CreateBook, UpdateBook};
pub use claims::{Capability, UserClaims};
pub use enums::{
    BookStatus, FineResolution, FineStatus, LoanState, LoanStatus, MemberStatus, Role,
};
pub use fine::{FineDetails, FineQuery, FineRecord, UpdateFineStatus};
pub use librarian::{CreateLibrarian, Librarian, LibrarianQuery, UpdateLibrarian};
pub use loan::{IssueLoan, LoanDetails, LoanQuery, LoanRecord, ReturnOutcome};
pub use member::{CreateMember, Member, MemberDetails, MemberQuery, UpdateMember};
