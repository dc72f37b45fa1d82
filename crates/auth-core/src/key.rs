//! RSA private key parsing
//!
//! Vonage hands out application keys as PEM text. Depending on how the key
//! was exported it is either a PKCS#1 `RSA PRIVATE KEY` or a PKCS#8
//! `PRIVATE KEY` block, so both containers are accepted regardless of the
//! block label.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::der::Decode;
use rsa::pkcs8::{EncodePublicKey, LineEnding, ObjectIdentifier, PrivateKeyInfo};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::{AuthError, Result};

/// `rsaEncryption` from PKCS#1
const RSA_ENCRYPTION_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

/// A parsed RSA private key ready for RS256 signing.
///
/// Cloning is cheap; the key material is shared.
#[derive(Clone)]
pub struct SigningKey {
    inner: Arc<KeyInner>,
}

struct KeyInner {
    private: RsaPrivateKey,
    encoding: EncodingKey,
}

/// Parse a PEM encoded RSA private key (PKCS#1 first, then PKCS#8)
pub fn parse_private_key(pem_text: &str) -> Result<SigningKey> {
    let block = pem::parse(pem_text.trim())
        .map_err(|e| AuthError::KeyFormat(format!("failed to decode PEM block: {}", e)))?;
    let der = block.contents();

    let private = match RsaPrivateKey::from_pkcs1_der(der) {
        Ok(key) => key,
        Err(_) => parse_pkcs8(der)?,
    };

    SigningKey::from_rsa(private)
}

fn parse_pkcs8(der: &[u8]) -> Result<RsaPrivateKey> {
    let info = PrivateKeyInfo::from_der(der)
        .map_err(|e| AuthError::KeyFormat(format!("failed to parse private key: {}", e)))?;

    if info.algorithm.oid != RSA_ENCRYPTION_OID {
        return Err(AuthError::KeyType(format!(
            "not an RSA private key (algorithm {})",
            info.algorithm.oid
        )));
    }

    RsaPrivateKey::try_from(info)
        .map_err(|e| AuthError::KeyFormat(format!("failed to parse RSA key: {}", e)))
}

impl SigningKey {
    /// Wrap an already decoded RSA key
    pub fn from_rsa(private: RsaPrivateKey) -> Result<Self> {
        let der = private
            .to_pkcs1_der()
            .map_err(|e| AuthError::KeyFormat(format!("failed to encode RSA key: {}", e)))?;
        let encoding = EncodingKey::from_rsa_der(der.as_bytes());

        Ok(Self {
            inner: Arc::new(KeyInner { private, encoding }),
        })
    }

    /// Read and parse a PEM file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AuthError::KeyFormat(format!("failed to read {}: {}", path.display(), e))
        })?;
        parse_private_key(&text)
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding
    }

    /// Modulus size in bits
    pub fn size_bits(&self) -> usize {
        self.inner.private.size() * 8
    }

    /// Public half in SPKI PEM form, for handing to token verifiers
    pub fn public_key_pem(&self) -> Result<String> {
        RsaPublicKey::from(&self.inner.private)
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| AuthError::KeyFormat(format!("failed to encode public key: {}", e)))
    }

    /// Key that verifies tokens signed by this key
    pub fn decoding_key(&self) -> Result<DecodingKey> {
        let public_pem = self.public_key_pem()?;
        DecodingKey::from_rsa_pem(public_pem.as_bytes())
            .map_err(|e| AuthError::KeyFormat(format!("invalid public key: {}", e)))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("bits", &self.size_bits())
            .finish_non_exhaustive()
    }
}
