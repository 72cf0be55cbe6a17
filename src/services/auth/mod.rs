pub mod claims;
pub mod secret;
pub mod store;
pub mod verifier;

pub use claims::{ClaimRequirement, ClaimSet};
pub use secret::{JwtSecret, StaticSecret};
pub use store::CredentialStore;
pub use verifier::{AlgorithmPolicy, TokenVerifier};
