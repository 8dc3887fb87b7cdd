pub mod curves;
pub mod ecdsa;
pub mod rsa;

mod errors;
mod keys;

// public re-exports
pub use curves::Curve;
pub use ecdsa::{EcdsaKeyPair, EcdsaSig};
pub use errors::Error;
pub use keys::{PrivateKey, PublicKey, SecureBytes};
pub use rsa::{RsaKeyPair, RsaPublicKey, RsaScheme};

use errors::CryptoResult;
use openssl::hash::{Hasher, MessageDigest as Digest};

/// Hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlg {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlg {
    /// Get the OpenSSL MessageDigest for this hash algorithm
    pub fn message_digest(&self) -> Digest {
        match self {
            HashAlg::Sha1 => Digest::sha1(),
            HashAlg::Sha224 => Digest::sha224(),
            HashAlg::Sha256 => Digest::sha256(),
            HashAlg::Sha384 => Digest::sha384(),
            HashAlg::Sha512 => Digest::sha512(),
        }
    }

    /// Hash the given data with this hash algorithm
    pub fn hash(&self, data: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut hasher = Hasher::new(self.message_digest())?;
        hasher.update(data)?;
        Ok(hasher.finish()?.to_vec())
    }
}

/// Padding and encoding rules of a signature mechanism
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    /// ECDSA; wire signatures are the plain concatenation r || s
    EcdsaRaw,
    /// RSASSA-PKCS1-v1_5; wire signatures are used as-is
    RsaPkcs1V15,
    /// RSASSA-PSS; wire signatures are used as-is
    RsaPss,
}

/// A key usable to verify terminal or certificate signatures
#[derive(Debug, Clone)]
pub enum VerificationKey {
    Ec(PublicKey),
    Rsa(RsaPublicKey),
}

/// Verify `signature` over `data`.
///
/// ECDSA wire signatures arrive as raw `r || s` and are rebuilt into the
/// DER SEQUENCE of two INTEGERs the platform verifier expects; RSA
/// signatures are passed through unchanged.
pub fn verify_signature(
    key: &VerificationKey,
    scheme: SignatureScheme,
    hash_alg: HashAlg,
    data: &[u8],
    signature: &[u8],
) -> CryptoResult<bool> {
    match (key, scheme) {
        (VerificationKey::Ec(public_key), SignatureScheme::EcdsaRaw) => {
            let sig = EcdsaSig::from_raw(public_key.curve(), signature)?;
            ecdsa::verify(public_key, data, &sig, hash_alg)
        }
        (VerificationKey::Rsa(public_key), SignatureScheme::RsaPkcs1V15) => {
            rsa::verify(public_key, data, signature, hash_alg, RsaScheme::Pkcs1V15)
        }
        (VerificationKey::Rsa(public_key), SignatureScheme::RsaPss) => {
            rsa::verify(public_key, data, signature, hash_alg, RsaScheme::Pss)
        }
        _ => Err(Error::Invalid(
            "Signature mechanism does not match the key type".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash() {
        let digest = HashAlg::Sha256.hash(b"abc").unwrap();
        assert_eq!(
            hex::encode(digest),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_verify_signature_ecdsa() {
        let key_pair = EcdsaKeyPair::generate(Curve::BrainpoolP256r1).unwrap();
        let data = b"signed challenge material";
        let raw = key_pair.sign(data, HashAlg::Sha256).unwrap().raw_signature();

        let key = VerificationKey::Ec(key_pair.public_key().clone());
        assert!(verify_signature(&key, SignatureScheme::EcdsaRaw, HashAlg::Sha256, data, &raw)
            .unwrap());

        let mut tampered = raw.clone();
        tampered[0] ^= 0x01;
        assert!(!verify_signature(
            &key,
            SignatureScheme::EcdsaRaw,
            HashAlg::Sha256,
            data,
            &tampered
        )
        .unwrap_or(false));
    }

    #[test]
    fn test_verify_signature_scheme_mismatch() {
        let key_pair = EcdsaKeyPair::generate(Curve::NistP256).unwrap();
        let key = VerificationKey::Ec(key_pair.public_key().clone());
        let result = verify_signature(
            &key,
            SignatureScheme::RsaPkcs1V15,
            HashAlg::Sha256,
            b"data",
            &[0u8; 256],
        );
        assert!(result.is_err());
    }
}
