//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, auth, books, fines, health, loans, members};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "0.9.0",
        description = "Library Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::staff_login,
        auth::member_login,
        auth::register,
        auth::logout,
        auth::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::list_categories,
        books::list_authors,
        // Members
        members::list_members,
        members::get_member,
        members::create_member,
        members::update_member,
        members::deactivate_member,
        // Loans
        loans::list_loans,
        loans::get_loan,
        loans::issue_loan,
        loans::return_loan,
        loans::member_loans,
        loans::list_overdue,
        // Fines
        fines::list_fines,
        fines::get_fine,
        fines::set_fine_status,
        fines::member_fines,
        fines::pending_balance,
        // Admin
        admin::dashboard,
        admin::list_librarians,
        admin::create_librarian,
        admin::update_librarian,
        admin::delete_librarian,
    ),
    components(
        schemas(
            // Auth
            auth::StaffLoginRequest,
            auth::MemberLoginRequest,
            auth::LoginResponse,
            auth::RegisterResponse,
            auth::UserInfo,
            // Books
            crate::models::Book,
            crate::models::BookDetails,
            crate::models::CreateBook,
            crate::models::UpdateBook,
            // Members
            crate::models::Member,
            crate::models::MemberDetails,
            crate::models::CreateMember,
            crate::models::UpdateMember,
            // Librarians
            crate::models::Librarian,
            crate::models::CreateLibrarian,
            crate::models::UpdateLibrarian,
            // Loans
            crate::models::LoanRecord,
            crate::models::LoanDetails,
            crate::models::IssueLoan,
            crate::models::ReturnOutcome,
            // Fines
            crate::models::FineRecord,
            crate::models::FineDetails,
            crate::models::UpdateFineStatus,
            fines::PendingBalance,
            // Enums
            crate::models::BookStatus,
            crate::models::MemberStatus,
            crate::models::Role,
            crate::models::LoanStatus,
            crate::models::LoanState,
            crate::models::FineStatus,
            crate::models::FineResolution,
            // Pagination envelopes
            super::PaginatedBooks,
            super::PaginatedMembers,
            super::PaginatedLibrarians,
            super::PaginatedLoans,
            super::PaginatedFines,
            // Admin
            admin::DashboardStats,
            admin::TopBook,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Catalog management"),
        (name = "members", description = "Member management"),
        (name = "loans", description = "Circulation"),
        (name = "fines", description = "Fine ledger"),
        (name = "admin", description = "Staff accounts and dashboard")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
