use rasn::error::{DecodeError, EncodeError};
use rasn::prelude::{AsnType, Decode, Encode, Integer, ObjectIdentifier as Oid};

use super::oid::ID_TA;

/// TAInfo ::= SEQUENCE {
///     protocol OBJECT IDENTIFIER,
///     version  INTEGER -- 2
/// }
///
/// Published through EF.CardAccess to announce the supported
/// terminal-authentication version.
#[derive(Debug, Clone, PartialEq, Eq, AsnType, Encode, Decode)]
pub struct TerminalAuthenticationInfo {
    pub protocol: Oid,
    pub version: Integer,
}

impl TerminalAuthenticationInfo {
    pub const PROTOCOL_VERSION: u8 = 2;

    /// The TAInfo advertised by this simulator.
    pub fn version_2() -> Self {
        Self {
            protocol: Oid::new_unchecked(ID_TA.into()),
            version: Integer::from(Self::PROTOCOL_VERSION),
        }
    }

    pub fn to_der(&self) -> Result<Vec<u8>, EncodeError> {
        rasn::der::encode(self)
    }

    pub fn from_der(der: impl AsRef<[u8]>) -> Result<Self, DecodeError> {
        rasn::der::decode(der.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ta_info_encoding() {
        let info = TerminalAuthenticationInfo::version_2();
        let der = info.to_der().unwrap();

        // SEQUENCE { OID 0.4.0.127.0.7.2.2.2, INTEGER 2 }
        assert_eq!(
            der,
            vec![
                0x30, 0x0D, 0x06, 0x08, 0x04, 0x00, 0x7F, 0x00, 0x07, 0x02, 0x02, 0x02, 0x02,
                0x01, 0x02
            ]
        );
    }

    #[test]
    fn test_ta_info_roundtrip() {
        let info = TerminalAuthenticationInfo::version_2();
        let der = info.to_der().unwrap();
        let decoded = TerminalAuthenticationInfo::from_der(&der).unwrap();
        assert_eq!(decoded, info);
        assert_eq!(decoded.version, Integer::from(2));
    }
}
