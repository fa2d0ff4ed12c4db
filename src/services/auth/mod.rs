pub mod claims;
pub mod cookie;
pub mod factory;
pub mod guard;
pub mod issuer;
pub mod lookup;
pub mod role;
pub mod verifier;

#[cfg(test)]
pub mod testing;

pub use claims::Claims;
pub use factory::{build_principal_lookup, build_token_issuer, build_token_verifier};
pub use issuer::TokenIssuer;
pub use lookup::{CachedPrincipalLookup, LookupError, PrincipalLookup};
pub use role::{Principal, Role};
pub use verifier::TokenVerifier;
