use openssl::error::ErrorStack;
use rasn::error::{DecodeError, EncodeError};
use thiserror::Error;

/// Error types for CV certificate operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("ASN.1 encoding error: {0}")]
    Asn1Encode(EncodeError),

    #[error("ASN.1 decoding error: {0}")]
    Asn1Decode(DecodeError),

    #[error("Hex decoding error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("Cryptographic error: {0}")]
    Crypto(#[from] ErrorStack),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unsupported security protocol: {0}")]
    UnsupportedProtocol(String),
}

impl From<EncodeError> for Error {
    fn from(err: EncodeError) -> Self {
        Error::Asn1Encode(err)
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        Error::Asn1Decode(err)
    }
}

impl From<crate::crypto::Error> for Error {
    fn from(err: crate::crypto::Error) -> Self {
        Error::InvalidData(err.to_string())
    }
}

impl From<crate::apdu::Error> for Error {
    fn from(err: crate::apdu::Error) -> Self {
        Error::InvalidData(err.to_string())
    }
}
