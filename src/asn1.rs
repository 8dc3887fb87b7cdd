pub mod cvcert;
pub mod oid;
pub mod security_info;
