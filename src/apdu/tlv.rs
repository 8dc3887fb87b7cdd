use super::{Error, Result};

/// A BER-TLV data object as carried in APDU command and response bodies.
///
/// Tags are kept as `u16` so the two-byte tags of the CV certificate
/// profile (`7F21`, `7F4E`, `5F37`) fit next to the one-byte context tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    pub tag: u16,
    pub value: Vec<u8>,
}

impl Tlv {
    pub fn new(tag: u16, value: impl Into<Vec<u8>>) -> Self {
        Self {
            tag,
            value: value.into(),
        }
    }

    /// Build a constructed object from already-encoded children.
    pub fn constructed(tag: u16, children: &[Tlv]) -> Self {
        let mut value = Vec::new();
        for child in children {
            value.extend_from_slice(&child.encode());
        }
        Self::new(tag, value)
    }

    /// Constructed bit of the leading tag byte.
    pub fn is_constructed(&self) -> bool {
        let first = if self.tag > 0xFF {
            (self.tag >> 8) as u8
        } else {
            self.tag as u8
        };
        first & 0x20 != 0
    }

    /// Parse the value field of a constructed object into its children.
    pub fn children(&self) -> Result<Vec<Tlv>> {
        if !self.is_constructed() {
            return Err(Error::InvalidData(format!(
                "Tag 0x{:02X} is not constructed",
                self.tag
            )));
        }
        Self::parse_multiple(&self.value)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.value.len() + 4);
        if self.tag > 0xFF {
            result.push((self.tag >> 8) as u8);
        }
        result.push(self.tag as u8);

        let len = self.value.len();
        if len < 0x80 {
            result.push(len as u8);
        } else {
            let len_bytes = if len <= 0xFF { 1 } else { 2 };
            result.push(0x80 | len_bytes as u8);
            for i in (0..len_bytes).rev() {
                result.push((len >> (i * 8)) as u8);
            }
        }
        result.extend_from_slice(&self.value);
        result
    }

    /// Parse exactly one object; trailing bytes are an error.
    pub fn parse(data: impl AsRef<[u8]>) -> Result<Self> {
        let data = data.as_ref();
        let (tlv, next_offset) = Self::parse_at_offset(data, 0)?;
        if next_offset != data.len() {
            return Err(Error::InvalidData(format!(
                "{} trailing bytes after TLV object",
                data.len() - next_offset
            )));
        }
        Ok(tlv)
    }

    pub fn parse_multiple(data: impl AsRef<[u8]>) -> Result<Vec<Self>> {
        let mut objects = Vec::new();
        let mut offset = 0;

        let data = data.as_ref();
        while offset < data.len() {
            let (tlv, next_offset) = Self::parse_at_offset(data, offset)?;
            objects.push(tlv);
            offset = next_offset;
        }
        Ok(objects)
    }

    /// First object with the given tag, if any.
    pub fn find(objects: &[Tlv], tag: u16) -> Option<&Tlv> {
        objects.iter().find(|t| t.tag == tag)
    }

    fn parse_at_offset(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        if offset + 2 > data.len() {
            return Err(Error::InvalidData(
                "Insufficient data for TLV header".into(),
            ));
        }

        let (tag, tag_end) = Self::parse_tag(data, offset)?;
        let (length, length_end) = Self::parse_length(data, tag_end)?;

        if length_end + length > data.len() {
            return Err(Error::InvalidData(format!(
                "TLV length {length} exceeds available data",
            )));
        }
        let value = data[length_end..length_end + length].to_vec();
        Ok((Self::new(tag, value), length_end + length))
    }

    fn parse_tag(data: &[u8], offset: usize) -> Result<(u16, usize)> {
        let first = data[offset];
        if first & 0x1F != 0x1F {
            return Ok((first as u16, offset + 1));
        }
        // high-tag-number form; two bytes cover every tag of this profile
        if offset + 1 >= data.len() {
            return Err(Error::InvalidData("Truncated multi-byte tag".into()));
        }
        let second = data[offset + 1];
        if second & 0x80 != 0 {
            return Err(Error::InvalidData(format!(
                "Unsupported tag longer than two bytes at offset {offset}",
            )));
        }
        Ok((((first as u16) << 8) | second as u16, offset + 2))
    }

    fn parse_length(data: &[u8], offset: usize) -> Result<(usize, usize)> {
        if offset >= data.len() {
            return Err(Error::InvalidData("No length byte".into()));
        }

        let first_byte = data[offset];
        if first_byte & 0x80 == 0 {
            Ok((first_byte as usize, offset + 1))
        } else {
            let length_bytes = (first_byte & 0x7F) as usize;

            if length_bytes == 0 {
                return Err(Error::InvalidData("Invalid indefinite length".into()));
            }
            if offset + 1 + length_bytes > data.len() {
                return Err(Error::InvalidData(
                    "Insufficient data for long length".into(),
                ));
            }

            let mut length = 0usize;
            for i in 0..length_bytes {
                length = (length << 8) | (data[offset + 1 + i] as usize);
            }
            Ok((length, offset + 1 + length_bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_short_length() {
        let tlv = Tlv::new(0x83, vec![0x01, 0x02, 0x03]);
        assert_eq!(tlv.encode(), vec![0x83, 0x03, 0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_encode_long_length() {
        let data = vec![0xAA; 200];
        let tlv = Tlv::new(0x83, data.clone());
        let encoded = tlv.encode();

        assert_eq!(encoded[0], 0x83); // Tag
        assert_eq!(encoded[1], 0x81); // Long form: 1 byte length
        assert_eq!(encoded[2], 200); // Length value
        assert_eq!(&encoded[3..], &data);
    }

    #[test]
    fn test_encode_two_byte_tag() {
        let tlv = Tlv::new(0x5F37, vec![0x11, 0x22]);
        assert_eq!(tlv.encode(), vec![0x5F, 0x37, 0x02, 0x11, 0x22]);
    }

    #[test]
    fn test_parse_multiple_objects() {
        let mut data = vec![];
        data.extend_from_slice(&[0x80, 0x02, 0x01, 0x02]);
        data.extend_from_slice(&[0x83, 0x03, 0x41, 0x42, 0x43]);
        data.extend_from_slice(&[0x91, 0x02, 0x02, 0xAB]);

        let parsed = Tlv::parse_multiple(&data).unwrap();

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].tag, 0x80);
        assert_eq!(parsed[1].tag, 0x83);
        assert_eq!(parsed[2].tag, 0x91);
        assert_eq!(Tlv::find(&parsed, 0x83).unwrap().value, b"ABC");
        assert!(Tlv::find(&parsed, 0x67).is_none());
    }

    #[test]
    fn test_parse_two_byte_tags() {
        let mut data = vec![0x7F, 0x4E, 0x03, 0x01, 0x02, 0x03];
        data.extend_from_slice(&[0x5F, 0x37, 0x01, 0xFF]);

        let parsed = Tlv::parse_multiple(&data).unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].tag, 0x7F4E);
        assert!(parsed[0].is_constructed());
        assert_eq!(parsed[1].tag, 0x5F37);
        assert!(!parsed[1].is_constructed());
    }

    #[test]
    fn test_constructed_children() {
        let inner_a = Tlv::new(0x06, vec![0x04, 0x00]);
        let inner_b = Tlv::new(0x53, vec![0x19]);
        let outer = Tlv::constructed(0x73, &[inner_a.clone(), inner_b.clone()]);

        let children = outer.children().unwrap();
        assert_eq!(children, vec![inner_a, inner_b]);
    }

    #[test]
    fn test_children_of_primitive_fails() {
        let tlv = Tlv::new(0x06, vec![0x01]);
        assert!(tlv.children().is_err());
    }

    #[test]
    fn test_parse_insufficient_data() {
        let data = vec![0x87]; // Only tag, no length
        assert!(Tlv::parse_multiple(&data).is_err());

        let data = vec![0x83, 0x05, 0x01]; // Length exceeds data
        assert!(Tlv::parse_multiple(&data).is_err());
    }

    #[test]
    fn test_parse_rejects_trailing_bytes() {
        let data = vec![0x83, 0x01, 0x01, 0x00];
        assert!(Tlv::parse(&data).is_err());
        assert!(Tlv::parse(&data[..3]).is_ok());
    }

    #[test]
    fn test_roundtrip() {
        let original = Tlv::new(0x7F21, vec![0x01, 0x02, 0x03, 0x04]);
        let encoded = original.encode();
        let parsed = Tlv::parse(&encoded).unwrap();

        assert_eq!(parsed, original);
    }
}
