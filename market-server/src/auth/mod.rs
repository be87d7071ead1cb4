//! Authentication boundary
//!
//! JWT validation and the `CurrentUser` extractor. The engine itself never
//! parses tokens; it trusts the caller id the boundary hands it.

mod extractor;
mod jwt;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService, ROLE_SUPPORT};
