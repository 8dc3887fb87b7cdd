//! Known object identifiers of the terminal-authentication protocol family.

// Terminal Authentication protocol identifier published in EF.CardAccess
pub const ID_TA_STR: &str = "0.4.0.127.0.7.2.2.2";
pub const ID_TA: &[u32] = &[0, 4, 0, 127, 0, 7, 2, 2, 2];

// Terminal type object identifiers (id-roles); the CHAT of a CV certificate
// carries one of these as its object identifier
pub const ID_IS_STR: &str = "0.4.0.127.0.7.3.1.2.1";
pub const ID_AT_STR: &str = "0.4.0.127.0.7.3.1.2.2";
pub const ID_ST_STR: &str = "0.4.0.127.0.7.3.1.2.3";
pub const ID_IS: &[u32] = &[0, 4, 0, 127, 0, 7, 3, 1, 2, 1];
pub const ID_AT: &[u32] = &[0, 4, 0, 127, 0, 7, 3, 1, 2, 2];
pub const ID_ST: &[u32] = &[0, 4, 0, 127, 0, 7, 3, 1, 2, 3];

// Signature mechanism OIDs usable as terminal-authentication references
pub const RSA_SHA1_OID_STR: &str = "0.4.0.127.0.7.2.2.2.1.1";
pub const RSA_SHA256_OID_STR: &str = "0.4.0.127.0.7.2.2.2.1.2";
pub const RSA_PSS_SHA1_OID_STR: &str = "0.4.0.127.0.7.2.2.2.1.3";
pub const RSA_PSS_SHA256_OID_STR: &str = "0.4.0.127.0.7.2.2.2.1.4";
pub const RSA_SHA512_OID_STR: &str = "0.4.0.127.0.7.2.2.2.1.5";
pub const RSA_PSS_SHA512_OID_STR: &str = "0.4.0.127.0.7.2.2.2.1.6";
pub const ECDSA_SHA1_OID_STR: &str = "0.4.0.127.0.7.2.2.2.2.1";
pub const ECDSA_SHA224_OID_STR: &str = "0.4.0.127.0.7.2.2.2.2.2";
pub const ECDSA_SHA256_OID_STR: &str = "0.4.0.127.0.7.2.2.2.2.3";
pub const ECDSA_SHA384_OID_STR: &str = "0.4.0.127.0.7.2.2.2.2.4";
pub const ECDSA_SHA512_OID_STR: &str = "0.4.0.127.0.7.2.2.2.2.5";
pub const RSA_SHA1_OID: &[u32] = &[0, 4, 0, 127, 0, 7, 2, 2, 2, 1, 1];
pub const RSA_SHA256_OID: &[u32] = &[0, 4, 0, 127, 0, 7, 2, 2, 2, 1, 2];
pub const RSA_PSS_SHA1_OID: &[u32] = &[0, 4, 0, 127, 0, 7, 2, 2, 2, 1, 3];
pub const RSA_PSS_SHA256_OID: &[u32] = &[0, 4, 0, 127, 0, 7, 2, 2, 2, 1, 4];
pub const RSA_SHA512_OID: &[u32] = &[0, 4, 0, 127, 0, 7, 2, 2, 2, 1, 5];
pub const RSA_PSS_SHA512_OID: &[u32] = &[0, 4, 0, 127, 0, 7, 2, 2, 2, 1, 6];
pub const ECDSA_SHA1_OID: &[u32] = &[0, 4, 0, 127, 0, 7, 2, 2, 2, 2, 1];
pub const ECDSA_SHA224_OID: &[u32] = &[0, 4, 0, 127, 0, 7, 2, 2, 2, 2, 2];
pub const ECDSA_SHA256_OID: &[u32] = &[0, 4, 0, 127, 0, 7, 2, 2, 2, 2, 3];
pub const ECDSA_SHA384_OID: &[u32] = &[0, 4, 0, 127, 0, 7, 2, 2, 2, 2, 4];
pub const ECDSA_SHA512_OID: &[u32] = &[0, 4, 0, 127, 0, 7, 2, 2, 2, 2, 5];

// Certificate extension identifiers; only the sector extension is
// interpreted here
pub const ID_SECTOR_STR: &str = "0.4.0.127.0.7.3.1.3.2";
pub const ID_SECTOR: &[u32] = &[0, 4, 0, 127, 0, 7, 3, 1, 3, 2];
pub const ID_DESCRIPTION_STR: &str = "0.4.0.127.0.7.3.1.3.1";
pub const ID_DESCRIPTION: &[u32] = &[0, 4, 0, 127, 0, 7, 3, 1, 3, 1];

// OIDs for authenticated auxiliary data
pub const DATE_OF_BIRTH_OID: &[u32] = &[0, 4, 0, 127, 0, 7, 3, 1, 4, 1];
pub const DATE_OF_EXPIRY_OID: &[u32] = &[0, 4, 0, 127, 0, 7, 3, 1, 4, 2];
pub const MUNICIPALITY_ID_OID: &[u32] = &[0, 4, 0, 127, 0, 7, 3, 1, 4, 3];
