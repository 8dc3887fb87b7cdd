mod tlv;

pub use tlv::Tlv;

type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// ISO7816 instructions handled by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Ins {
    Unknown = 0x00,
    MseSet = 0x22,
    PerformSecurityOperation = 0x2A,
    ExternalAuthenticate = 0x82,
    GetChallenge = 0x84,
}

impl From<u8> for Ins {
    fn from(value: u8) -> Self {
        match value {
            0x22 => Self::MseSet,
            0x2A => Self::PerformSecurityOperation,
            0x82 => Self::ExternalAuthenticate,
            0x84 => Self::GetChallenge,
            _ => Self::Unknown,
        }
    }
}

/// ISO7816-4 command APDU
#[derive(Debug, Clone)]
pub struct APDUCommand {
    pub cla: u8,
    pub ins: Ins,
    pub p1: u8,
    pub p2: u8,
    pub data: Vec<u8>,
    pub le: Option<u16>,
}

impl APDUCommand {
    const SHORT_MAX_LC: usize = 0xFF;
    const SHORT_MAX_LE: u16 = 0x0100;

    pub fn new(ins: Ins, p1: u8, p2: u8, data: impl Into<Vec<u8>>, le: Option<u16>) -> Self {
        Self {
            cla: 0x00,
            ins,
            p1,
            p2,
            data: data.into(),
            le,
        }
    }

    pub fn from_components(header: [u8; 4], data: impl Into<Vec<u8>>, le: Option<u16>) -> Self {
        Self {
            cla: header[0],
            ins: header[1].into(),
            p1: header[2],
            p2: header[3],
            data: data.into(),
            le,
        }
    }

    /// P1 and P2 as a single big-endian parameter word.
    pub fn p1p2(&self) -> u16 {
        ((self.p1 as u16) << 8) | self.p2 as u16
    }

    pub fn set_secure_messaging(&mut self, enabled: bool) {
        if enabled {
            self.cla |= 0x0C;
        } else {
            self.cla &= !0x0C;
        }
    }

    /// Whether the secure-messaging indication survived into this APDU.
    pub fn is_secure_messaging(&self) -> bool {
        (self.cla & 0x0C) == 0x0C
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![self.cla, self.ins as u8, self.p1, self.p2];

        if !self.data.is_empty() {
            if self.data.len() <= Self::SHORT_MAX_LC {
                bytes.push(self.data.len() as u8);
            } else {
                bytes.push(0x00);
                bytes.extend_from_slice(&(self.data.len() as u16).to_be_bytes());
            }
            bytes.extend_from_slice(&self.data);
        }
        if let Some(le) = self.le {
            if le == 0 {
                bytes.push(0x00);
            } else if le > Self::SHORT_MAX_LE || self.data.len() > Self::SHORT_MAX_LC {
                bytes.extend_from_slice(&le.to_be_bytes());
            } else {
                bytes.push(if le == 0x100 { 0x00 } else { le as u8 });
            }
        }
        bytes
    }
}

/// ISO7816-4 status words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const SUCCESS: StatusCode = StatusCode(0x9000);
    pub const AUTHENTICATION_FAILED: StatusCode = StatusCode(0x6300);
    pub const SECURITY_STATUS_NOT_SATISFIED: StatusCode = StatusCode(0x6982);
    pub const REFERENCE_DATA_NOT_USABLE: StatusCode = StatusCode(0x6984);
    pub const CONDITIONS_OF_USE_NOT_SATISFIED: StatusCode = StatusCode(0x6985);
    pub const WRONG_DATA: StatusCode = StatusCode(0x6A80);
    pub const REFERENCE_DATA_NOT_FOUND: StatusCode = StatusCode(0x6A88);
    pub const IMPLEMENTATION_ERROR: StatusCode = StatusCode(0x6FFF);

    pub fn sw1(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn sw2(&self) -> u8 {
        self.0 as u8
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

/// ISO7816-4 response APDU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct APDUResponse {
    pub data: Vec<u8>,
    pub sw1: u8,
    pub sw2: u8,
}

impl APDUResponse {
    pub fn new(data: impl Into<Vec<u8>>, sw1: u8, sw2: u8) -> Self {
        Self {
            data: data.into(),
            sw1,
            sw2,
        }
    }

    /// A response with an empty value field.
    pub fn from_status(status: StatusCode) -> Self {
        Self::new(Vec::new(), status.sw1(), status.sw2())
    }

    pub fn with_data(data: impl Into<Vec<u8>>, status: StatusCode) -> Self {
        Self::new(data, status.sw1(), status.sw2())
    }

    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Result<Self> {
        let bytes = bytes.as_ref();
        if bytes.len() < 2 {
            return Err(Error::InvalidData("Invalid APDU format".into()));
        }

        let len = bytes.len();
        let sw1 = bytes[len - 2];
        let sw2 = bytes[len - 1];
        let data = bytes[..len - 2].to_vec();
        Ok(Self { data, sw1, sw2 })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn status(&self) -> StatusCode {
        StatusCode(((self.sw1 as u16) << 8) | (self.sw2 as u16))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.data.clone();
        bytes.push(self.sw1);
        bytes.push(self.sw2);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ins_mapping() {
        assert_eq!(Ins::from(0x22), Ins::MseSet);
        assert_eq!(Ins::from(0x2A), Ins::PerformSecurityOperation);
        assert_eq!(Ins::from(0x82), Ins::ExternalAuthenticate);
        assert_eq!(Ins::from(0x84), Ins::GetChallenge);
        assert_eq!(Ins::from(0xA4), Ins::Unknown);
    }

    #[test]
    fn test_p1p2() {
        let cmd = APDUCommand::new(Ins::MseSet, 0x81, 0xB6, vec![], None);
        assert_eq!(cmd.p1p2(), 0x81B6);
    }

    #[test]
    fn test_secure_messaging_flag() {
        let mut cmd = APDUCommand::new(Ins::GetChallenge, 0x00, 0x00, vec![], Some(8));
        assert!(!cmd.is_secure_messaging());

        cmd.set_secure_messaging(true);
        assert!(cmd.is_secure_messaging());
        assert_eq!(cmd.cla & 0x0C, 0x0C);

        cmd.set_secure_messaging(false);
        assert!(!cmd.is_secure_messaging());
    }

    #[test]
    fn test_command_serialization() {
        let cmd = APDUCommand::new(Ins::MseSet, 0xC1, 0xA4, vec![0x83, 0x01, 0x41], None);
        assert_eq!(
            cmd.to_bytes(),
            vec![0x00, 0x22, 0xC1, 0xA4, 0x03, 0x83, 0x01, 0x41]
        );
    }

    #[test]
    fn test_response_roundtrip() {
        let resp = APDUResponse::with_data(vec![0x01, 0x02], StatusCode::SUCCESS);
        let bytes = resp.to_bytes();
        assert_eq!(bytes, vec![0x01, 0x02, 0x90, 0x00]);

        let parsed = APDUResponse::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.status(), StatusCode::SUCCESS);
        assert_eq!(parsed.data(), &[0x01, 0x02]);
    }

    #[test]
    fn test_response_from_status() {
        let resp = APDUResponse::from_status(StatusCode::REFERENCE_DATA_NOT_FOUND);
        assert!(resp.data().is_empty());
        assert_eq!(resp.sw1, 0x6A);
        assert_eq!(resp.sw2, 0x88);
    }
}
