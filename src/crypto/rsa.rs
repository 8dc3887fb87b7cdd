use crate::crypto::HashAlg;
use crate::crypto::errors::CryptoResult;
use openssl::pkey::{PKey, Private, Public};
use openssl::rsa::{Padding, Rsa};
use openssl::sign::{RsaPssSaltlen, Signer, Verifier};
use std::fmt;

/// Signature padding schemes used by the RSA terminal-authentication
/// mechanisms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsaScheme {
    /// RSASSA-PKCS1-v1_5
    Pkcs1V15,
    /// RSASSA-PSS with MGF1 over the same digest, salt length = digest length
    Pss,
}

/// An RSA public key used to verify terminal signatures
#[derive(Clone)]
pub struct RsaPublicKey {
    openssl_key: PKey<Public>,
}

impl RsaPublicKey {
    /// Import key from SubjectPublicKeyInfo DER format
    pub fn from_der(der_bytes: impl AsRef<[u8]>) -> CryptoResult<Self> {
        let pkey = PKey::public_key_from_der(der_bytes.as_ref())?;
        pkey.rsa()?;
        Ok(Self { openssl_key: pkey })
    }

    /// Get the modulus size in bytes
    pub fn size(&self) -> CryptoResult<usize> {
        Ok(self.openssl_key.rsa()?.size() as usize)
    }

    /// Get the OpenSSL PKey of this public key
    pub fn as_openssl_pkey(&self) -> &PKey<Public> {
        &self.openssl_key
    }
}

impl fmt::Debug for RsaPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPublicKey")
            .field("bits", &self.openssl_key.bits())
            .finish()
    }
}

/// An RSA key pair, used on the signing side of tests and personalisation
#[derive(Clone)]
pub struct RsaKeyPair {
    openssl_key: PKey<Private>,
}

impl RsaKeyPair {
    /// Generate a fresh key pair
    pub fn generate(bits: u32) -> CryptoResult<Self> {
        let rsa = Rsa::generate(bits)?;
        Ok(Self {
            openssl_key: PKey::from_rsa(rsa)?,
        })
    }

    /// Derive the corresponding public key
    pub fn public_key(&self) -> CryptoResult<RsaPublicKey> {
        let der = self.openssl_key.public_key_to_der()?;
        RsaPublicKey::from_der(&der)
    }

    /// Sign data and return the raw signature bytes
    pub fn sign(
        &self,
        data: impl AsRef<[u8]>,
        hash_alg: HashAlg,
        scheme: RsaScheme,
    ) -> CryptoResult<Vec<u8>> {
        let mut signer = Signer::new(hash_alg.message_digest(), &self.openssl_key)?;
        if scheme == RsaScheme::Pss {
            signer.set_rsa_padding(Padding::PKCS1_PSS)?;
            signer.set_rsa_mgf1_md(hash_alg.message_digest())?;
            signer.set_rsa_pss_saltlen(RsaPssSaltlen::DIGEST_LENGTH)?;
        }
        signer.update(data.as_ref())?;
        Ok(signer.sign_to_vec()?)
    }
}

impl fmt::Debug for RsaKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKeyPair")
            .field("bits", &self.openssl_key.bits())
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Verify an RSA signature against data using a public key
pub fn verify(
    public_key: &RsaPublicKey,
    data: impl AsRef<[u8]>,
    signature: &[u8],
    hash_alg: HashAlg,
    scheme: RsaScheme,
) -> CryptoResult<bool> {
    let mut verifier = Verifier::new(hash_alg.message_digest(), public_key.as_openssl_pkey())?;
    if scheme == RsaScheme::Pss {
        verifier.set_rsa_padding(Padding::PKCS1_PSS)?;
        verifier.set_rsa_mgf1_md(hash_alg.message_digest())?;
        verifier.set_rsa_pss_saltlen(RsaPssSaltlen::DIGEST_LENGTH)?;
    }
    verifier.update(data.as_ref())?;
    Ok(verifier.verify(signature)?)
}
