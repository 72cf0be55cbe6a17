pub mod error;
pub mod session_repo;

pub use session_repo::PgSessionRepo;
