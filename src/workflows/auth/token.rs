use super::domain::Role;

/// Contract with the external token collaborator. The signing algorithm and
/// wire shape belong to the implementation; the core only consumes claims.
pub trait TokenProvider: Send + Sync {
    fn issue(&self, role: Role, subject: &str) -> Result<TokenPair, TokenError>;
    fn verify(&self, access_token: &str) -> Result<TokenClaims, TokenError>;
    fn refresh(&self, refresh_token: &str) -> Result<String, TokenError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub subject: String,
    pub role: Role,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("access token is expired or malformed")]
    InvalidAccessToken,
    #[error("refresh token is expired or malformed")]
    InvalidRefreshToken,
    #[error("token provider unavailable: {0}")]
    Unavailable(String),
}
