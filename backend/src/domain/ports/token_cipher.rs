//! Port for sealing aggregator access tokens at rest.

use crate::domain::SealedToken;

use super::define_port_error;

define_port_error! {
    /// Errors raised while sealing or opening tokens.
    pub enum TokenCipherError {
        /// Encryption failed.
        Seal { message: String } => "token encryption failed: {message}",
        /// Ciphertext was malformed or failed authentication.
        Open { message: String } => "token decryption failed: {message}",
    }
}

/// Symmetric authenticated encryption for access tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenCipher: Send + Sync {
    /// Encrypt `plaintext` under a fresh nonce.
    fn seal(&self, plaintext: &str) -> Result<SealedToken, TokenCipherError>;

    /// Decrypt and authenticate a sealed token.
    fn open(&self, sealed: &SealedToken) -> Result<String, TokenCipherError>;
}

/// Fixture cipher for deployments without an encryption key.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTokenCipher;

impl TokenCipher for FixtureTokenCipher {
    fn seal(&self, _plaintext: &str) -> Result<SealedToken, TokenCipherError> {
        Err(TokenCipherError::seal("no encryption key configured"))
    }

    fn open(&self, _sealed: &SealedToken) -> Result<String, TokenCipherError> {
        Err(TokenCipherError::open("no encryption key configured"))
    }
}
