use crate::asn1::oid::*;
use crate::crypto::{HashAlg, SignatureScheme};

use super::Error;
use super::types::CvcResult;

use rasn::types::ObjectIdentifier as Oid;

/// Signature mechanisms usable in CV certificates and as
/// terminal-authentication cryptographic mechanism references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityProtocol {
    /// RSA v1.5 + SHA-1
    RsaV1_5Sha1,
    /// RSA v1.5 + SHA-256
    RsaV1_5Sha256,
    /// RSA-PSS + SHA-1
    RsaPssSha1,
    /// RSA-PSS + SHA-256
    RsaPssSha256,
    /// RSA v1.5 + SHA-512
    RsaV1_5Sha512,
    /// RSA-PSS + SHA-512
    RsaPssSha512,
    /// ECDSA + SHA-1
    EcdsaSha1,
    /// ECDSA + SHA-224
    EcdsaSha224,
    /// ECDSA + SHA-256
    EcdsaSha256,
    /// ECDSA + SHA-384
    EcdsaSha384,
    /// ECDSA + SHA-512
    EcdsaSha512,
}

impl SecurityProtocol {
    /// Resolve a security protocol from its object identifier
    pub fn from_oid(oid: &Oid) -> CvcResult<Self> {
        match oid.to_string().as_str() {
            RSA_SHA1_OID_STR => Ok(SecurityProtocol::RsaV1_5Sha1),
            RSA_SHA256_OID_STR => Ok(SecurityProtocol::RsaV1_5Sha256),
            RSA_SHA512_OID_STR => Ok(SecurityProtocol::RsaV1_5Sha512),
            RSA_PSS_SHA1_OID_STR => Ok(SecurityProtocol::RsaPssSha1),
            RSA_PSS_SHA256_OID_STR => Ok(SecurityProtocol::RsaPssSha256),
            RSA_PSS_SHA512_OID_STR => Ok(SecurityProtocol::RsaPssSha512),
            ECDSA_SHA1_OID_STR => Ok(SecurityProtocol::EcdsaSha1),
            ECDSA_SHA224_OID_STR => Ok(SecurityProtocol::EcdsaSha224),
            ECDSA_SHA256_OID_STR => Ok(SecurityProtocol::EcdsaSha256),
            ECDSA_SHA384_OID_STR => Ok(SecurityProtocol::EcdsaSha384),
            ECDSA_SHA512_OID_STR => Ok(SecurityProtocol::EcdsaSha512),
            other => Err(Error::UnsupportedProtocol(other.to_string())),
        }
    }

    /// Resolve a security protocol from the value field of an OBJECT
    /// IDENTIFIER whose tag and length were stripped by the sender.
    pub fn from_oid_value(value: &[u8]) -> CvcResult<Self> {
        if value.is_empty() || value.len() > 0x7F {
            return Err(Error::InvalidData(
                "Object identifier value of implausible length".to_string(),
            ));
        }
        let mut der = Vec::with_capacity(value.len() + 2);
        der.push(0x06);
        der.push(value.len() as u8);
        der.extend_from_slice(value);

        let oid: Oid = rasn::der::decode(&der)?;
        Self::from_oid(&oid)
    }

    /// Get the object identifier for this security protocol
    pub fn oid(&self) -> Oid {
        match self {
            SecurityProtocol::RsaV1_5Sha1 => Oid::new_unchecked(RSA_SHA1_OID.into()),
            SecurityProtocol::RsaV1_5Sha256 => Oid::new_unchecked(RSA_SHA256_OID.into()),
            SecurityProtocol::RsaPssSha1 => Oid::new_unchecked(RSA_PSS_SHA1_OID.into()),
            SecurityProtocol::RsaPssSha256 => Oid::new_unchecked(RSA_PSS_SHA256_OID.into()),
            SecurityProtocol::RsaV1_5Sha512 => Oid::new_unchecked(RSA_SHA512_OID.into()),
            SecurityProtocol::RsaPssSha512 => Oid::new_unchecked(RSA_PSS_SHA512_OID.into()),
            SecurityProtocol::EcdsaSha1 => Oid::new_unchecked(ECDSA_SHA1_OID.into()),
            SecurityProtocol::EcdsaSha224 => Oid::new_unchecked(ECDSA_SHA224_OID.into()),
            SecurityProtocol::EcdsaSha256 => Oid::new_unchecked(ECDSA_SHA256_OID.into()),
            SecurityProtocol::EcdsaSha384 => Oid::new_unchecked(ECDSA_SHA384_OID.into()),
            SecurityProtocol::EcdsaSha512 => Oid::new_unchecked(ECDSA_SHA512_OID.into()),
        }
    }

    /// Get the hash algorithm for this protocol
    pub fn hash_algorithm(&self) -> HashAlg {
        match self {
            SecurityProtocol::RsaV1_5Sha1
            | SecurityProtocol::RsaPssSha1
            | SecurityProtocol::EcdsaSha1 => HashAlg::Sha1,

            SecurityProtocol::EcdsaSha224 => HashAlg::Sha224,

            SecurityProtocol::RsaV1_5Sha256
            | SecurityProtocol::RsaPssSha256
            | SecurityProtocol::EcdsaSha256 => HashAlg::Sha256,

            SecurityProtocol::EcdsaSha384 => HashAlg::Sha384,

            SecurityProtocol::RsaV1_5Sha512
            | SecurityProtocol::RsaPssSha512
            | SecurityProtocol::EcdsaSha512 => HashAlg::Sha512,
        }
    }

    /// Get the padding/encoding rules of this protocol
    pub fn signature_scheme(&self) -> SignatureScheme {
        match self {
            SecurityProtocol::EcdsaSha1
            | SecurityProtocol::EcdsaSha224
            | SecurityProtocol::EcdsaSha256
            | SecurityProtocol::EcdsaSha384
            | SecurityProtocol::EcdsaSha512 => SignatureScheme::EcdsaRaw,

            SecurityProtocol::RsaV1_5Sha1
            | SecurityProtocol::RsaV1_5Sha256
            | SecurityProtocol::RsaV1_5Sha512 => SignatureScheme::RsaPkcs1V15,

            SecurityProtocol::RsaPssSha1
            | SecurityProtocol::RsaPssSha256
            | SecurityProtocol::RsaPssSha512 => SignatureScheme::RsaPss,
        }
    }

    /// Check if this is an ECDSA protocol
    pub fn is_ecdsa(&self) -> bool {
        self.signature_scheme() == SignatureScheme::EcdsaRaw
    }

    /// Check if this is an RSA protocol
    pub fn is_rsa(&self) -> bool {
        !self.is_ecdsa()
    }
}

impl std::fmt::Display for SecurityProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Algorithm: {self:?}")
    }
}
