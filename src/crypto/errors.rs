use openssl::error::ErrorStack;
use thiserror::Error;

/// Error types for cryptographic operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("OpenSSL error: {0}")]
    OpenSSL(#[from] ErrorStack),

    #[error("Hex decoding error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Unsupported curve: {0}")]
    UnsupportedCurve(String),
}

pub(crate) type CryptoResult<T> = Result<T, Error>;
