use rasn::types::ObjectIdentifier as Oid;

use crate::apdu::Tlv;

use super::errors::TaError;

/// Protocol progress of a terminal-authentication session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaState {
    /// Nothing happened yet
    Idle,
    /// A verification anchor was selected with MSE:Set DST
    AnchorSet,
    /// The certificate chain is complete and MSE:Set AT bound the
    /// authentication parameters
    ChainBuilt,
    /// A challenge was handed to the terminal
    Challenged,
    /// The terminal proved possession of the chain's leaf key
    Authenticated,
}

/// One authenticated auxiliary data object (tag `73`) from MSE:Set AT.
///
/// The original encoding is retained verbatim, it re-enters the signature
/// computation of External Authenticate byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedAuxiliaryData {
    oid: Oid,
    discretionary_data: Vec<u8>,
    encoded: Vec<u8>,
}

impl AuthenticatedAuxiliaryData {
    /// Build an auxiliary data object from its parts
    pub fn new(oid: Oid, discretionary_data: impl Into<Vec<u8>>) -> Result<Self, TaError> {
        let discretionary_data = discretionary_data.into();
        let oid_der = rasn::der::encode(&oid)
            .map_err(|e| TaError::MalformedData(format!("Unencodable object identifier: {e}")))?;

        let mut value = oid_der;
        value.extend_from_slice(&Tlv::new(0x53, discretionary_data.clone()).encode());
        let encoded = Tlv::new(0x73, value).encode();

        Ok(Self {
            oid,
            discretionary_data,
            encoded,
        })
    }

    /// Parse a single entry of the auxiliary data container
    pub fn from_tlv(object: &Tlv) -> Result<Self, TaError> {
        if object.tag != 0x73 {
            return Err(TaError::MalformedData(
                "Invalid encoding of the auxiliary data, entry is not a discretionary data \
                 template"
                    .to_string(),
            ));
        }
        let children = object
            .children()
            .map_err(|e| TaError::MalformedData(format!("Invalid auxiliary data encoding: {e}")))?;

        let oid_object = Tlv::find(&children, 0x06).ok_or_else(|| {
            TaError::MalformedData(
                "Invalid encoding of the auxiliary data, object identifier missing".to_string(),
            )
        })?;
        let oid: Oid = rasn::der::decode(&oid_object.encode()).map_err(|_| {
            TaError::MalformedData(
                "Invalid encoding of the auxiliary data, object identifier not parseable"
                    .to_string(),
            )
        })?;

        let data_object = Tlv::find(&children, 0x53).ok_or_else(|| {
            TaError::MalformedData(
                "Invalid encoding of the auxiliary data, discretionary data missing".to_string(),
            )
        })?;

        Ok(Self {
            oid,
            discretionary_data: data_object.value.clone(),
            encoded: object.encode(),
        })
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    pub fn discretionary_data(&self) -> &[u8] {
        &self.discretionary_data
    }

    /// The full original encoding, tag `73` included
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }
}

/// A certification authority or holder reference: country code, holder
/// mnemonic and five-character sequence number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyReference(Vec<u8>);

impl PublicKeyReference {
    const MIN_LEN: usize = 7;
    const MAX_LEN: usize = 16;

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for PublicKeyReference {
    type Error = TaError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        if !(Self::MIN_LEN..=Self::MAX_LEN).contains(&value.len()) {
            return Err(TaError::MalformedData(format!(
                "Public key reference of invalid length {}",
                value.len()
            )));
        }
        if !value.iter().all(|b| b.is_ascii_alphanumeric()) {
            return Err(TaError::MalformedData(
                "Public key reference contains characters outside [0-9A-Za-z]".to_string(),
            ));
        }
        Ok(Self(value.to_vec()))
    }
}

impl std::fmt::Display for PublicKeyReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asn1::oid::DATE_OF_BIRTH_OID;

    #[test]
    fn test_auxiliary_data_roundtrip() {
        let oid = Oid::new_unchecked(DATE_OF_BIRTH_OID.into());
        let aux = AuthenticatedAuxiliaryData::new(oid.clone(), vec![0x01, 0x09, 0x09, 0x00])
            .unwrap();

        let parsed = AuthenticatedAuxiliaryData::from_tlv(&Tlv::parse(aux.encoded()).unwrap())
            .unwrap();
        assert_eq!(parsed, aux);
        assert_eq!(parsed.oid(), &oid);
        assert_eq!(parsed.discretionary_data(), &[0x01, 0x09, 0x09, 0x00]);
    }

    #[test]
    fn test_auxiliary_data_rejects_wrong_template() {
        let bogus = Tlv::new(0x53, vec![0x01]);
        assert!(AuthenticatedAuxiliaryData::from_tlv(&bogus).is_err());

        // template without an object identifier
        let no_oid = Tlv::constructed(0x73, &[Tlv::new(0x53, vec![0x01])]);
        assert!(AuthenticatedAuxiliaryData::from_tlv(&no_oid).is_err());

        // template without discretionary data
        let oid = Oid::new_unchecked(DATE_OF_BIRTH_OID.into());
        let oid_der = rasn::der::encode(&oid).unwrap();
        let no_data = Tlv::new(0x73, oid_der);
        assert!(AuthenticatedAuxiliaryData::from_tlv(&no_data).is_err());
    }

    #[test]
    fn test_public_key_reference_validation() {
        assert!(PublicKeyReference::try_from(b"DETESTeID00005".as_slice()).is_ok());
        assert!(PublicKeyReference::try_from(b"DE00001".as_slice()).is_ok());

        // too short, too long, bad characters
        assert!(PublicKeyReference::try_from(b"DE001".as_slice()).is_err());
        assert!(PublicKeyReference::try_from(b"DETESTCVCA0000100".as_slice()).is_err());
        assert!(PublicKeyReference::try_from(b"DETEST eID005".as_slice()).is_err());
    }
}
