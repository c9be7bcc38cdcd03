//! Password hashing, JWT access/refresh tokens and the request extractor.

pub mod extractor;
pub mod jwt;
pub mod password;

pub use extractor::AuthenticatedUser;
pub use jwt::{
    create_token, create_token_pair, verify_token, verify_token_type, Claims, TokenError,
    TokenType,
};
pub use password::{hash_password, verify_password};
