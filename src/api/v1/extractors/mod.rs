mod authorized_claims;

pub use authorized_claims::AuthorizedClaims;
