use crate::crypto::errors::Error;
use openssl::ec::{EcGroup, EcGroupRef};
use openssl::nid::Nid;
use std::fmt;

/// Prime moduli of the supported curves, used to recognise a curve from
/// explicit domain parameters carried in a CVCA certificate.
const NIST_P256_PRIME: &str = "ffffffff00000001000000000000000000000000ffffffffffffffffffffffff";
const NIST_P384_PRIME: &str = "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe\
                               ffffffff0000000000000000ffffffff";
const NIST_P521_PRIME: &str = "01ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff\
                               ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff\
                               ffff";
const BRAINPOOL_P256R1_PRIME: &str =
    "a9fb57dba1eea9bc3e660a909d838d726e3bf623d52620282013481d1f6e5377";
const BRAINPOOL_P384R1_PRIME: &str =
    "8cb91e82a3386d280f5d6f7e50e641df152f7109ed5456b412b1da197fb71123\
     acd3a729901d1a71874700133107ec53";
const BRAINPOOL_P512R1_PRIME: &str =
    "aadd9db8dbe9c48b3fd4e6ae33c9fc07cb308db3b3c9d20ed6639cca70330871\
     7d4d9b009bc66842aecda12ae6a380e62881ff2f2d82c68528aa6056583a48f3";

/// Supported elliptic curves for card-verifiable certificates
#[derive(Debug, Clone, Default, Copy, PartialEq, Eq)]
pub enum Curve {
    /// NIST P-256 (secp256r1)
    NistP256,
    /// NIST P-384 (secp384r1)
    NistP384,
    /// NIST P-521 (secp521r1)
    NistP521,
    /// Brainpool P-256r1
    #[default]
    BrainpoolP256r1,
    /// Brainpool P-384r1
    BrainpoolP384r1,
    /// Brainpool P-512r1
    BrainpoolP512r1,
}

impl Curve {
    /// Get the key size in bytes for this curve
    pub fn key_size(self) -> usize {
        match self {
            Curve::NistP256 | Curve::BrainpoolP256r1 => 32,
            Curve::NistP384 | Curve::BrainpoolP384r1 => 48,
            Curve::NistP521 => 66,
            Curve::BrainpoolP512r1 => 64,
        }
    }

    /// Get the coordinate size in bytes
    pub fn coordinate_size(self) -> usize {
        self.key_size()
    }

    /// Get the uncompressed point size in bytes
    pub fn uncompressed_point_size(self) -> usize {
        1 + 2 * self.key_size()
    }

    /// Get the raw signature size (r || s) in bytes
    pub fn signature_size(self) -> usize {
        2 * self.key_size()
    }

    /// Recognise a curve from the prime modulus of explicit domain
    /// parameters.
    pub fn from_prime(prime: &[u8]) -> Option<Curve> {
        // leading zero bytes do not change the value
        let stripped = {
            let start = prime.iter().position(|&b| b != 0).unwrap_or(prime.len());
            &prime[start..]
        };
        let hex_prime = hex::encode(stripped);
        for &curve in Curve::all() {
            let reference = curve.prime_hex().replace(char::is_whitespace, "");
            let reference = reference.trim_start_matches('0');
            if hex_prime.trim_start_matches('0') == reference {
                return Some(curve);
            }
        }
        None
    }

    fn prime_hex(self) -> &'static str {
        match self {
            Curve::NistP256 => NIST_P256_PRIME,
            Curve::NistP384 => NIST_P384_PRIME,
            Curve::NistP521 => NIST_P521_PRIME,
            Curve::BrainpoolP256r1 => BRAINPOOL_P256R1_PRIME,
            Curve::BrainpoolP384r1 => BRAINPOOL_P384R1_PRIME,
            Curve::BrainpoolP512r1 => BRAINPOOL_P512R1_PRIME,
        }
    }

    /// Get all supported curves
    pub fn all() -> &'static [Curve] {
        &[
            Curve::NistP256,
            Curve::NistP384,
            Curve::NistP521,
            Curve::BrainpoolP256r1,
            Curve::BrainpoolP384r1,
            Curve::BrainpoolP512r1,
        ]
    }
}

impl From<Curve> for Nid {
    fn from(curve: Curve) -> Self {
        match curve {
            Curve::NistP256 => Nid::X9_62_PRIME256V1,
            Curve::NistP384 => Nid::SECP384R1,
            Curve::NistP521 => Nid::SECP521R1,
            Curve::BrainpoolP256r1 => Nid::BRAINPOOL_P256R1,
            Curve::BrainpoolP384r1 => Nid::BRAINPOOL_P384R1,
            Curve::BrainpoolP512r1 => Nid::BRAINPOOL_P512R1,
        }
    }
}

impl TryFrom<Curve> for EcGroup {
    type Error = Error;

    fn try_from(curve: Curve) -> Result<Self, Self::Error> {
        Ok(EcGroup::from_curve_name(curve.into())?)
    }
}

impl TryFrom<&EcGroupRef> for Curve {
    type Error = Error;

    fn try_from(group: &EcGroupRef) -> Result<Self, Self::Error> {
        match group.curve_name() {
            Some(Nid::X9_62_PRIME256V1) => Ok(Curve::NistP256),
            Some(Nid::SECP384R1) => Ok(Curve::NistP384),
            Some(Nid::SECP521R1) => Ok(Curve::NistP521),
            Some(Nid::BRAINPOOL_P256R1) => Ok(Curve::BrainpoolP256r1),
            Some(Nid::BRAINPOOL_P384R1) => Ok(Curve::BrainpoolP384r1),
            Some(Nid::BRAINPOOL_P512R1) => Ok(Curve::BrainpoolP512r1),
            _ => Err(Error::UnsupportedCurve(
                "Unknown curve in group".to_string(),
            )),
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Curve::NistP256 => "NIST P-256 (secp256r1)",
            Curve::NistP384 => "NIST P-384 (secp384r1)",
            Curve::NistP521 => "NIST P-521 (secp521r1)",
            Curve::BrainpoolP256r1 => "Brainpool P-256r1",
            Curve::BrainpoolP384r1 => "Brainpool P-384r1",
            Curve::BrainpoolP512r1 => "Brainpool P-512r1",
        };
        write!(f, "{name}")
    }
}
