use crate::crypto::HashAlg;
use crate::crypto::curves::Curve;
use crate::crypto::errors::{CryptoResult, Error};
use crate::crypto::keys::{PrivateKey, PublicKey};
use openssl::bn::BigNum;
use openssl::ecdsa::EcdsaSig as OpenSslEcdsaSig;
use openssl::sign::{Signer, Verifier};
use std::fmt;

/// ECDSA signature representation
///
/// Keeps both the DER structure the platform verifier consumes and the raw
/// `r || s` concatenation used on the wire by card-verifiable certificates.
#[derive(Clone, PartialEq, Eq)]
pub struct EcdsaSig {
    // The curve used for this signature
    curve: Curve,
    // DER-encoded signature data
    der_data: Vec<u8>,
    // Raw signature components (r, s)
    raw_components: (Vec<u8>, Vec<u8>),
}

impl EcdsaSig {
    /// Create signature from DER-encoded signature data
    pub fn from_der(curve: Curve, der_data: impl AsRef<[u8]>) -> CryptoResult<Self> {
        let ecdsa_sig = OpenSslEcdsaSig::from_der(der_data.as_ref())?;

        let r = ecdsa_sig.r().to_vec();
        let s = ecdsa_sig.s().to_vec();

        Ok(Self {
            curve,
            der_data: der_data.as_ref().to_vec(),
            raw_components: (r, s),
        })
    }

    /// Create signature from raw r, s components
    pub fn from_components(curve: Curve, r: &[u8], s: &[u8]) -> CryptoResult<Self> {
        let r_bn = BigNum::from_slice(r)?;
        let s_bn = BigNum::from_slice(s)?;
        let ecdsa_sig = OpenSslEcdsaSig::from_private_components(r_bn, s_bn)?;
        let der_data = ecdsa_sig.to_der()?;

        Ok(Self {
            curve,
            der_data,
            raw_components: (r.to_vec(), s.to_vec()),
        })
    }

    /// Rebuild the DER structure from a raw `r || s` concatenation of even
    /// length.
    pub fn from_raw(curve: Curve, raw: &[u8]) -> CryptoResult<Self> {
        if raw.is_empty() || raw.len() % 2 != 0 {
            return Err(Error::Invalid(format!(
                "Raw ECDSA signature must have even length, got {}",
                raw.len()
            )));
        }
        let (r, s) = raw.split_at(raw.len() / 2);
        Self::from_components(curve, r, s)
    }

    /// Get the curve used for this signature
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Get DER-encoded signature data
    pub fn as_der(&self) -> &[u8] {
        &self.der_data
    }

    /// Get raw concatenated signature components r || s, each component
    /// left-padded to the curve coordinate size.
    pub fn raw_signature(&self) -> Vec<u8> {
        let size = self.curve.coordinate_size();
        let (r, s) = &self.raw_components;
        let mut combined = vec![0u8; 2 * size];
        combined[size.saturating_sub(r.len())..size].copy_from_slice(r);
        combined[size + size.saturating_sub(s.len())..].copy_from_slice(s);
        combined
    }
}

impl fmt::Debug for EcdsaSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdsaSig")
            .field("curve", &self.curve)
            .field("size", &self.der_data.len())
            .field("hex", &hex::encode(&self.der_data))
            .finish()
    }
}

/// ECDSA key pair for signature operations
#[derive(Clone)]
pub struct EcdsaKeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl EcdsaKeyPair {
    /// Generate a new ECDSA key pair
    pub fn generate(curve: Curve) -> CryptoResult<Self> {
        let private_key = PrivateKey::generate(curve)?;
        let public_key = private_key.public_key()?;

        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Sign data with this key pair and return the signature
    pub fn sign(&self, data: impl AsRef<[u8]>, hash_alg: HashAlg) -> CryptoResult<EcdsaSig> {
        sign(&self.private_key, data, hash_alg)
    }

    /// Verify a signature against data using this key pair
    pub fn verify(
        &self,
        data: impl AsRef<[u8]>,
        signature: &EcdsaSig,
        hash_alg: HashAlg,
    ) -> CryptoResult<bool> {
        verify(&self.public_key, data, signature, hash_alg)
    }

    /// Get the private key
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// Get the public key
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Get the curve used by this key pair
    pub fn curve(&self) -> Curve {
        self.private_key.curve()
    }
}

impl fmt::Debug for EcdsaKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdsaKeyPair")
            .field("curve", &self.curve())
            .field("private_key", &"[REDACTED]")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// Sign data with a private key and return the signature
pub fn sign(
    private_key: &PrivateKey,
    data: impl AsRef<[u8]>,
    hash_alg: HashAlg,
) -> CryptoResult<EcdsaSig> {
    let mut signer = Signer::new(hash_alg.message_digest(), private_key.as_openssl_pkey())?;
    signer.update(data.as_ref())?;
    let signature_der = signer.sign_to_vec()?;

    EcdsaSig::from_der(private_key.curve(), signature_der)
}

/// Verify a signature against data using a public key
pub fn verify(
    public_key: &PublicKey,
    data: impl AsRef<[u8]>,
    signature: &EcdsaSig,
    hash_alg: HashAlg,
) -> CryptoResult<bool> {
    if signature.curve() != public_key.curve() {
        return Err(Error::Invalid(
            "Signature curve does not match key curve".to_string(),
        ));
    }

    let mut verifier = Verifier::new(hash_alg.message_digest(), public_key.as_openssl_pkey())?;
    verifier.update(data.as_ref())?;
    let result = verifier.verify(signature.as_der())?;
    Ok(result)
}
