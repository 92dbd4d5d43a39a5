/// Session authentication.
///
/// Token minting and parsing, password hashing, and the issuer that ties
/// them to the user store.

mod claims;
mod password;
mod session;
mod token;

pub use claims::AccessClaims;
pub use claims::RefreshClaims;
pub use claims::ACCESS_TOKEN_AGE;
pub use claims::REFRESH_TOKEN_AGE;
pub use password::hash_password;
pub use password::password_match;
pub use password::PASSWORD_HASH_COST;
pub use session::SessionIssuer;
pub use session::SessionTokens;
pub use token::TokenCodec;

/// Cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access-token";

/// Cookie carrying the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh-token";
