mod jwt;
mod service;

pub use jwt::{AccessClaims, JwtConfig, JwtSigner, TokenError};
pub use service::{
    AuthService, CompleteSignUpCommand, LoginResult, OAuth2LoginResult, SessionTokens,
    SignUpCommand,
};
