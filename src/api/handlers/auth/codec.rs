//! Symmetric cookie encryption.
//!
//! The session cookie is the JSON form of [`EncryptedSession`]: an
//! AES-256-CBC ciphertext plus the initialization vector, both hex-encoded.
//! The cipher key is derived once from the configured secret with scrypt, so
//! the CPU-bound derivation never runs on the request path.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use anyhow::{Context, Result};
use rand::{rngs::OsRng, RngCore};
use scrypt::{scrypt, Params};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;
const KEY_SALT: &[u8] = b"salt";
// Standard interactive scrypt cost: N=2^14, r=8, p=1.
const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

/// Plaintext session content, bound to the requester's identifier.
///
/// Never renewed in place: once `expires_at` has passed the caller must
/// re-authenticate for a fresh payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub identifier: String,
    /// Unix milliseconds.
    pub expires_at: i64,
    pub presented_credential: String,
}

/// Wire form of the session cookie. Opaque to everything but the codec.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedSession {
    pub ciphertext: String,
    pub iv: String,
}

/// AES-256-CBC codec over a scrypt-derived key.
pub struct CookieCodec {
    key: [u8; KEY_LEN],
}

impl CookieCodec {
    /// Derive the cipher key from the configured cookie secret.
    ///
    /// # Errors
    /// Returns an error if key derivation fails.
    pub fn new(secret: &SecretString) -> Result<Self> {
        let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN)
            .context("invalid scrypt parameters")?;
        let mut key = [0u8; KEY_LEN];
        scrypt(
            secret.expose_secret().as_bytes(),
            KEY_SALT,
            &params,
            &mut key,
        )
        .context("failed to derive cookie key")?;
        Ok(Self { key })
    }

    /// Encrypt a payload under a fresh random IV.
    ///
    /// Two encryptions of the same payload never share a ciphertext; both
    /// decrypt to the identical payload.
    ///
    /// # Errors
    /// Returns an error if the system RNG fails or the payload cannot be
    /// serialized.
    pub fn encrypt(&self, payload: &SessionPayload) -> Result<EncryptedSession> {
        let mut iv = [0u8; IV_LEN];
        OsRng
            .try_fill_bytes(&mut iv)
            .context("failed to generate cookie iv")?;
        let plaintext =
            serde_json::to_vec(payload).context("failed to serialize session payload")?;
        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(&plaintext);
        Ok(EncryptedSession {
            ciphertext: hex::encode(ciphertext),
            iv: hex::encode(iv),
        })
    }

    /// Decrypt an encoded session. Any failure — malformed hex, wrong IV
    /// length, padding error, wrong key, malformed JSON — yields `None`;
    /// callers treat `None` as "invalid session", never as a distinct error.
    pub fn decrypt(&self, encoded: &EncryptedSession) -> Option<SessionPayload> {
        let ciphertext = hex::decode(&encoded.ciphertext).ok()?;
        let iv: [u8; IV_LEN] = hex::decode(&encoded.iv).ok()?.try_into().ok()?;
        let plaintext = Aes256CbcDec::new(&self.key.into(), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .ok()?;
        serde_json::from_slice(&plaintext).ok()
    }
}
