use rasn::types::ObjectIdentifier as Oid;
use time::UtcDateTime;

use crate::asn1::oid::{ID_AT, ID_AT_STR, ID_IS, ID_IS_STR, ID_ST, ID_ST_STR};

use super::errors::Error;

pub(crate) type CvcResult<T> = Result<T, Error>;

/// Holder roles of the CV certificate hierarchy, encoded in the two
/// most significant bits of the CHAT template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessRole {
    /// Terminal
    AT = 0,
    /// Document Verifier (non-official/foreign)
    DVNoF = 1,
    /// Document Verifier (official domestic)
    DVOD = 2,
    /// Certificate authority, root or link
    CVCA = 3,
    /// Unknown role
    Unknown = -1,
}

impl AccessRole {
    /// Get the bit pattern for the role in CHAT template
    pub fn bit_pattern(&self) -> u8 {
        match self {
            AccessRole::AT => 0b00,
            AccessRole::DVNoF => 0b01,
            AccessRole::DVOD => 0b10,
            AccessRole::CVCA => 0b11,
            AccessRole::Unknown => 0b00,
        }
    }

    /// Create from bit pattern
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => AccessRole::AT,
            0b01 => AccessRole::DVNoF,
            0b10 => AccessRole::DVOD,
            0b11 => AccessRole::CVCA,
            _ => AccessRole::Unknown,
        }
    }

    pub fn is_cvca(&self) -> bool {
        matches!(self, AccessRole::CVCA)
    }

    pub fn is_dv(&self) -> bool {
        matches!(self, AccessRole::DVOD | AccessRole::DVNoF)
    }

    pub fn is_domestic_dv(&self) -> bool {
        matches!(self, AccessRole::DVOD)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AccessRole::AT)
    }
}

/// Relative authorization bitfield of a CHAT, role bits included.
///
/// Big-endian: byte 0 is the most significant. Narrowing a stored value by
/// an incoming one is a bitwise AND aligned at the least significant bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeAuthorization {
    bytes: Vec<u8>,
}

impl RelativeAuthorization {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Bit length carried with the value
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8
    }

    /// Role encoded in the two most significant bits
    pub fn role(&self) -> AccessRole {
        match self.bytes.first() {
            Some(first) => AccessRole::from_bits((first >> 6) & 0b11),
            None => AccessRole::Unknown,
        }
    }

    /// Constrain this authorization by an incoming one.
    ///
    /// The result takes the incoming length; bytes beyond the stored value
    /// grant nothing.
    pub fn intersect(&self, incoming: &RelativeAuthorization) -> RelativeAuthorization {
        let mut out = incoming.bytes.clone();
        let out_len = out.len();
        for i in 0..out_len {
            let stored = if i < self.bytes.len() {
                self.bytes[self.bytes.len() - 1 - i]
            } else {
                0x00
            };
            out[out_len - 1 - i] &= stored;
        }
        RelativeAuthorization::new(out)
    }
}

/// Terminal types distinguished by TR-03110, identified by the object
/// identifier carried in the CHAT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalType {
    InspectionSystem,
    AuthenticationTerminal,
    SignatureTerminal,
}

impl TerminalType {
    /// Resolve a terminal type from its object identifier
    pub fn from_oid(oid: &Oid) -> CvcResult<Self> {
        match oid.to_string().as_str() {
            ID_IS_STR => Ok(TerminalType::InspectionSystem),
            ID_AT_STR => Ok(TerminalType::AuthenticationTerminal),
            ID_ST_STR => Ok(TerminalType::SignatureTerminal),
            other => Err(Error::InvalidData(format!(
                "Not a terminal type object identifier: {other}"
            ))),
        }
    }

    /// The object identifier of this terminal type
    pub fn as_oid(&self) -> Oid {
        match self {
            TerminalType::InspectionSystem => Oid::new_unchecked(ID_IS.into()),
            TerminalType::AuthenticationTerminal => Oid::new_unchecked(ID_AT.into()),
            TerminalType::SignatureTerminal => Oid::new_unchecked(ID_ST.into()),
        }
    }
}

impl std::fmt::Display for TerminalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TerminalType::InspectionSystem => "Inspection System",
            TerminalType::AuthenticationTerminal => "Authentication Terminal",
            TerminalType::SignatureTerminal => "Signature Terminal",
        };
        write!(f, "{name}")
    }
}

/// Date representation for CV certificates (unpacked BCD format)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date {
    year: u16,
    month: u8,
    day: u8,
}

impl Date {
    /// Create a new date.
    ///
    /// Year must be in range 2000-2099.
    /// Month must be in range 1-12.
    /// Day must be in range 1-31.
    pub fn new(year: u16, month: u8, day: u8) -> Result<Self, Error> {
        if !(2000..=2099).contains(&year) {
            return Err(Error::InvalidData(format!(
                "Year out of range [2000-2099]: {year}",
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidData(format!("Invalid month: {month}")));
        }
        if !(1..=31).contains(&day) {
            return Err(Error::InvalidData(format!("Invalid day: {day}")));
        }
        let max_days = match month {
            2 => {
                if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) {
                    29 // Leap year
                } else {
                    28
                }
            }
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        };
        if day > max_days {
            return Err(Error::InvalidData(format!(
                "Invalid day for month {month}: {day}",
            )));
        }

        Ok(Self { year, month, day })
    }

    /// Create from a UTC timestamp
    pub fn from_datetime(dt: UtcDateTime) -> Self {
        Self {
            year: dt.year() as u16,
            month: dt.month() as u8,
            day: dt.day(),
        }
    }

    /// Create from current date and time
    pub fn now() -> Self {
        Self::from_datetime(UtcDateTime::now())
    }

    /// Convert to unpacked BCD format (YYMMDD, 6 bytes)
    pub fn to_bcd(&self) -> [u8; 6] {
        let yy = (self.year % 100) as u8;
        let mm = self.month;
        let dd = self.day;

        [
            (yy / 10) & 0x0F,
            (yy % 10) & 0x0F,
            (mm / 10) & 0x0F,
            (mm % 10) & 0x0F,
            (dd / 10) & 0x0F,
            (dd % 10) & 0x0F,
        ]
    }

    /// Create from unpacked BCD format (YYMMDD, 6 bytes)
    pub fn from_bcd(bcd: &[u8]) -> Result<Self, Error> {
        if bcd.len() != 6 {
            return Err(Error::InvalidData(format!(
                "Invalid BCD date length: {}. Expected 6.",
                bcd.len(),
            )));
        }

        // low nibble holds the digit; high nibble must be zero per "unpacked BCD"
        let digits: [u8; 6] = {
            let mut digits = [0u8; 6];
            for (i, byte) in bcd.iter().enumerate() {
                let d = byte & 0x0F;
                if byte >> 4 != 0 || d > 9 {
                    return Err(Error::InvalidData(format!(
                        "Invalid unpacked BCD at position {i}: 0x{byte:02x}"
                    )));
                }
                digits[i] = d;
            }
            digits
        };

        let year = 2000 + (digits[0] as u16) * 10 + digits[1] as u16;
        let month = digits[2] * 10 + digits[3];
        let day = digits[4] * 10 + digits[5];

        Date::new(year, month, day)
    }

    /// Get year
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Get month
    pub fn month(&self) -> u8 {
        self.month
    }

    /// Get day
    pub fn day(&self) -> u8 {
        self.day
    }
}

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_bits_roundtrip() {
        for role in [
            AccessRole::AT,
            AccessRole::DVNoF,
            AccessRole::DVOD,
            AccessRole::CVCA,
        ] {
            assert_eq!(AccessRole::from_bits(role.bit_pattern()), role);
        }
    }

    #[test]
    fn test_role_predicates() {
        assert!(AccessRole::CVCA.is_cvca());
        assert!(AccessRole::DVOD.is_dv());
        assert!(AccessRole::DVOD.is_domestic_dv());
        assert!(AccessRole::DVNoF.is_dv());
        assert!(!AccessRole::DVNoF.is_domestic_dv());
        assert!(AccessRole::AT.is_terminal());
        assert!(!AccessRole::AT.is_dv());
    }

    #[test]
    fn test_relative_authorization_role() {
        let auth = RelativeAuthorization::new(vec![0xC0, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(auth.role(), AccessRole::CVCA);

        let auth = RelativeAuthorization::new(vec![0x00, 0x00, 0x00, 0x01, 0x03]);
        assert_eq!(auth.role(), AccessRole::AT);

        assert_eq!(RelativeAuthorization::new(vec![]).role(), AccessRole::Unknown);
    }

    #[test]
    fn test_relative_authorization_intersection() {
        let stored = RelativeAuthorization::new(vec![0xFF, 0x0F, 0xF0, 0xAA, 0x55]);
        let incoming = RelativeAuthorization::new(vec![0xC3, 0xFF, 0x3C, 0xFF, 0xFF]);

        let narrowed = stored.intersect(&incoming);
        assert_eq!(narrowed.bytes(), &[0xC3, 0x0F, 0x30, 0xAA, 0x55]);
    }

    #[test]
    fn test_intersection_narrows_only() {
        let stored = RelativeAuthorization::new(vec![0x12, 0x34]);
        let incoming = RelativeAuthorization::new(vec![0xFF, 0xFF]);

        // all-ones incoming leaves the stored value unchanged
        assert_eq!(stored.intersect(&incoming).bytes(), stored.bytes());

        // bits can only clear, never appear
        let narrowed = stored.intersect(&RelativeAuthorization::new(vec![0x10, 0x04]));
        assert_eq!(narrowed.bytes(), &[0x10, 0x04 & 0x34]);
    }

    #[test]
    fn test_intersection_length_mismatch() {
        let stored = RelativeAuthorization::new(vec![0x0F]);
        let incoming = RelativeAuthorization::new(vec![0xFF, 0xFF]);

        // high bytes the stored value never granted stay cleared
        assert_eq!(stored.intersect(&incoming).bytes(), &[0x00, 0x0F]);
    }

    #[test]
    fn test_terminal_type_oid_roundtrip() {
        for tt in [
            TerminalType::InspectionSystem,
            TerminalType::AuthenticationTerminal,
            TerminalType::SignatureTerminal,
        ] {
            assert_eq!(TerminalType::from_oid(&tt.as_oid()).unwrap(), tt);
        }
    }

    #[test]
    fn test_terminal_type_rejects_unrelated_oid() {
        let oid = Oid::new_unchecked(crate::asn1::oid::ID_TA.into());
        assert!(TerminalType::from_oid(&oid).is_err());
    }

    #[test]
    fn test_date_bcd_roundtrip() {
        let date = Date::new(2027, 3, 9).unwrap();
        assert_eq!(date.to_bcd(), [0x02, 0x07, 0x00, 0x03, 0x00, 0x09]);
        assert_eq!(Date::from_bcd(&date.to_bcd()).unwrap(), date);
    }

    #[test]
    fn test_date_rejects_packed_bcd() {
        assert!(Date::from_bcd(&[0x27, 0x00, 0x03, 0x00, 0x00, 0x09]).is_err());
        assert!(Date::from_bcd(&[0x02, 0x07, 0x03]).is_err());
    }

    #[test]
    fn test_date_ordering() {
        let earlier = Date::new(2025, 6, 30).unwrap();
        let later = Date::new(2025, 7, 1).unwrap();
        assert!(earlier < later);
        assert!(later > earlier);
        assert!(earlier <= Date::new(2025, 6, 30).unwrap());
    }

    #[test]
    fn test_date_validation() {
        assert!(Date::new(1999, 1, 1).is_err());
        assert!(Date::new(2024, 13, 1).is_err());
        assert!(Date::new(2024, 2, 30).is_err());
        assert!(Date::new(2024, 2, 29).is_ok()); // leap year
        assert!(Date::new(2025, 2, 29).is_err());
    }
}
