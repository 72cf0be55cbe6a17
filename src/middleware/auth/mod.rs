pub mod bearer;
pub mod guard;

pub use guard::AuthGuard;
