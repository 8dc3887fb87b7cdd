use crate::crypto::curves::Curve;
use crate::crypto::errors::{CryptoResult, Error};
use openssl::bn::BigNumContext;
use openssl::ec::{EcGroup, EcKey, EcPoint, PointConversionForm as Form};
use openssl::pkey::{PKey, Private, Public};
use secrecy::{ExposeSecret, SecretSlice};
use std::fmt;

/// Secure wrapper for sensitive byte data that zeroizes on drop
#[derive(Debug, Clone, Default)]
pub struct SecureBytes(SecretSlice<u8>);

impl SecureBytes {
    /// Create new SecureBytes
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self(SecretSlice::new(data.into().into()))
    }

    /// Expose the secret data
    pub fn expose_secret(&self) -> &[u8] {
        self.0.expose_secret()
    }

    /// Get the length of the data
    pub fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    /// Check if the data is empty
    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }
}

impl From<&[u8]> for SecureBytes {
    fn from(value: &[u8]) -> Self {
        Self::new(value)
    }
}

impl From<Vec<u8>> for SecureBytes {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

/// An EC private key on one of the supported curves
#[derive(Clone)]
pub struct PrivateKey {
    curve: Curve,
    key_data: SecureBytes,
    openssl_key: PKey<Private>,
}

impl PrivateKey {
    /// Generate a new random private key with the given curve
    pub fn generate(curve: Curve) -> CryptoResult<Self> {
        let group: EcGroup = curve.try_into()?;
        let ec_key = EcKey::generate(&group)?;
        let key_bytes = ec_key.private_key().to_vec();

        // Pad to the curve size if necessary
        let mut padded_bytes = vec![0u8; curve.key_size()];
        let start_idx = curve.key_size().saturating_sub(key_bytes.len());
        padded_bytes[start_idx..].copy_from_slice(&key_bytes);

        let pkey = PKey::from_ec_key(ec_key)?;

        Ok(Self {
            curve,
            key_data: SecureBytes::new(padded_bytes),
            openssl_key: pkey,
        })
    }

    /// Get the curve used by this key
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Get the raw key bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.key_data.expose_secret()
    }

    /// Get the OpenSSL PKey
    pub fn as_openssl_pkey(&self) -> &PKey<Private> {
        &self.openssl_key
    }

    /// Derive the corresponding public key
    pub fn public_key(&self) -> CryptoResult<PublicKey> {
        let ec_key = self.openssl_key.ec_key()?;
        let public_point = ec_key.public_key();
        let group = ec_key.group();

        let mut ctx = BigNumContext::new()?;
        let point_bytes = public_point.to_bytes(group, Form::UNCOMPRESSED, &mut ctx)?;

        PublicKey::from_bytes(self.curve, &point_bytes)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("curve", &self.curve)
            .field("key_data", &"[REDACTED]")
            .finish()
    }
}

/// An EC public key on one of the supported curves
#[derive(Clone, Debug)]
pub struct PublicKey {
    curve: Curve,
    point_data: Vec<u8>,
    openssl_key: PKey<Public>,
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.curve == other.curve && self.point_data == other.point_data
    }
}

impl Eq for PublicKey {}

impl PublicKey {
    /// Create a public key from point bytes (uncompressed or compressed format)
    pub fn from_bytes(curve: Curve, point_bytes: impl AsRef<[u8]>) -> CryptoResult<Self> {
        let len = point_bytes.as_ref().len();
        if len != curve.uncompressed_point_size() && len != curve.coordinate_size() + 1 {
            return Err(Error::Invalid(format!(
                "Invalid point size: expected {} or {} bytes, got {len}",
                curve.uncompressed_point_size(),
                curve.coordinate_size() + 1
            )));
        }

        let group: EcGroup = curve.try_into()?;
        let mut ctx = BigNumContext::new()?;

        let uncompressed = match point_bytes.as_ref()[0] {
            0x04 => point_bytes.as_ref().to_vec(),
            0x02 | 0x03 => {
                let point = EcPoint::from_bytes(&group, point_bytes.as_ref(), &mut ctx)?;
                point.to_bytes(&group, Form::UNCOMPRESSED, &mut ctx)?
            }
            _ => {
                return Err(Error::Invalid(
                    "Point must be in uncompressed or compressed format".to_string(),
                ))
            }
        };

        let point = EcPoint::from_bytes(&group, &uncompressed, &mut ctx)?;
        let ec_key = EcKey::from_public_key(&group, &point)?;
        let pkey = PKey::from_ec_key(ec_key)?;

        Ok(Self {
            curve,
            point_data: uncompressed,
            openssl_key: pkey,
        })
    }

    /// Get the curve used by this key
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Get the uncompressed point bytes
    pub fn uncompressed_bytes(&self) -> &[u8] {
        &self.point_data
    }

    /// Get the compressed point bytes
    pub fn compressed_bytes(&self) -> CryptoResult<Vec<u8>> {
        let ec_key = self.openssl_key.ec_key()?;
        let point = ec_key.public_key();
        let group = ec_key.group();

        let mut ctx = BigNumContext::new()?;
        Ok(point.to_bytes(group, Form::COMPRESSED, &mut ctx)?)
    }

    /// Get the OpenSSL PKey of this public key
    pub fn as_openssl_pkey(&self) -> &PKey<Public> {
        &self.openssl_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_private_key_generation() {
        for &curve in Curve::all() {
            let private_key = PrivateKey::generate(curve).unwrap();
            assert_eq!(private_key.curve(), curve);
            assert_eq!(private_key.as_bytes().len(), curve.key_size());

            let public_key = private_key.public_key().unwrap();
            assert_eq!(public_key.curve(), curve);
        }
    }

    #[test]
    fn test_point_formats() {
        let curve = Curve::BrainpoolP256r1;
        let private_key = PrivateKey::generate(curve).unwrap();
        let public_key = private_key.public_key().unwrap();

        let compressed = public_key.compressed_bytes().unwrap();
        assert_eq!(compressed.len(), curve.coordinate_size() + 1);

        let recovered = PublicKey::from_bytes(curve, &compressed).unwrap();
        assert_eq!(recovered, public_key);
    }

    #[test]
    fn test_public_key_from_known_point() {
        let curve = Curve::BrainpoolP256r1;
        let key_bytes = hex!(
            "04"
            "19d4b7447788b0e1993db35500999627e739a4e5e35f02d8fb07d6122e76567f"
            "17758d7a3aa6943ef23e5e2909b3e8b31bfaa4544c2cbf1fb487f31ff239c8f8"
        );
        let expected_compressed =
            hex!("02 19d4b7447788b0e1993db35500999627e739a4e5e35f02d8fb07d6122e76567f");

        let public_key = PublicKey::from_bytes(curve, key_bytes).unwrap();
        assert_eq!(public_key.curve(), curve);
        assert_eq!(public_key.uncompressed_bytes(), key_bytes);
        assert_eq!(public_key.compressed_bytes().unwrap(), expected_compressed);
    }

    #[test]
    fn test_invalid_public_key() {
        // NIST P-256 point fed with the wrong curve
        let nist_p256_bytes = hex!(
            "04"
            "73039e0c42c496afb3f287ca7ef6b90bea2ab166696fb57b12b1bde7a7434fd6"
            "b41c9550b5a58040784d87816cda1c9d485edeab4c6931f947323554db382a5c"
        );
        let result = PublicKey::from_bytes(Curve::BrainpoolP256r1, nist_p256_bytes);
        assert!(result.is_err());

        // bad leading byte
        let mut garbled = nist_p256_bytes;
        garbled[0] = 0x05;
        let result = PublicKey::from_bytes(Curve::NistP256, garbled);
        assert!(result.is_err());
    }
}
