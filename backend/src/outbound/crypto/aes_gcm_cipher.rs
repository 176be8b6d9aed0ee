//! AES-256-GCM sealing of aggregator access tokens.
//!
//! The key is configured as 64 hex characters. Each seal draws a fresh
//! 12-byte nonce; ciphertext and nonce are stored base64-encoded with the
//! authentication tag appended to the ciphertext.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroize;

use crate::domain::SealedToken;
use crate::domain::ports::{TokenCipher, TokenCipherError};

const KEY_HEX_LEN: usize = 64;

/// Configured key is not 32 bytes of hex.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("token encryption key must be {KEY_HEX_LEN} hex characters")]
pub struct CipherKeyError;

/// [`TokenCipher`] backed by `ring`'s AES-256-GCM.
pub struct AesGcmTokenCipher {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl AesGcmTokenCipher {
    /// Build a cipher from a 64-character hex key.
    pub fn from_hex(hex_key: &str) -> Result<Self, CipherKeyError> {
        let hex_key = hex_key.trim();
        if hex_key.len() != KEY_HEX_LEN {
            return Err(CipherKeyError);
        }
        let mut bytes = hex::decode(hex_key).map_err(|_| CipherKeyError)?;
        let unbound = UnboundKey::new(&AES_256_GCM, &bytes).map_err(|_| CipherKeyError);
        bytes.zeroize();
        Ok(Self {
            key: LessSafeKey::new(unbound?),
            rng: SystemRandom::new(),
        })
    }
}

impl TokenCipher for AesGcmTokenCipher {
    fn seal(&self, plaintext: &str) -> Result<SealedToken, TokenCipherError> {
        let mut nonce_bytes = [0_u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| TokenCipherError::seal("nonce generation failed"))?;
        let mut in_out = plaintext.as_bytes().to_vec();
        self.key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::empty(),
                &mut in_out,
            )
            .map_err(|_| TokenCipherError::seal("encryption failed"))?;
        Ok(SealedToken {
            ciphertext: STANDARD.encode(&in_out),
            nonce: STANDARD.encode(nonce_bytes),
        })
    }

    fn open(&self, sealed: &SealedToken) -> Result<String, TokenCipherError> {
        let nonce_bytes = STANDARD
            .decode(&sealed.nonce)
            .map_err(|err| TokenCipherError::open(format!("nonce: {err}")))?;
        let nonce = Nonce::try_assume_unique_for_key(&nonce_bytes)
            .map_err(|_| TokenCipherError::open("nonce must be 12 bytes"))?;
        let mut in_out = STANDARD
            .decode(&sealed.ciphertext)
            .map_err(|err| TokenCipherError::open(format!("ciphertext: {err}")))?;
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| TokenCipherError::open("authentication failed"))?;
        let token = String::from_utf8(plaintext.to_vec())
            .map_err(|_| TokenCipherError::open("plaintext is not UTF-8"));
        in_out.zeroize();
        token
    }
}
