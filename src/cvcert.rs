mod crypto;
mod errors;
mod types;

// public re-exports
pub use crypto::SecurityProtocol;
pub use errors::Error;
pub use types::{AccessRole, Date, RelativeAuthorization, TerminalType};

use openssl::bn::{BigNum, BigNumContext};
use openssl::ec::{EcGroup, PointConversionForm as Form};
use rasn::der::{decode as der_decode, encode as der_encode};
use rasn::types::{Any, ObjectIdentifier as Oid, OctetString};
use types::CvcResult;

use crate::apdu::Tlv;
use crate::asn1::cvcert::{
    CertificateExtensions, Chat, CvCertificate as Asn1CvCertificate,
    CvCertificateBody as Asn1CvCertificateBody, EcdsaPublicKey,
};
use crate::asn1::oid::ID_SECTOR_STR;
use crate::crypto::{Curve, PublicKey, VerificationKey};

/// Tags of the sector public key hashes inside the sector extension
const TAG_FIRST_SECTOR_HASH: u16 = 0x80;
const TAG_SECOND_SECTOR_HASH: u16 = 0x81;

/// A Card Verifiable Certificate according to TR-03110-3
#[derive(Debug, Clone)]
pub struct CvCertificate {
    inner: Asn1CvCertificate,
}

impl CvCertificate {
    /// Decode a CV certificate from DER format
    pub fn from_der(data: &[u8]) -> CvcResult<Self> {
        if data.is_empty() {
            return Err(Error::InvalidData("Empty certificate data".to_string()));
        }
        Ok(Self {
            inner: der_decode::<Asn1CvCertificate>(data)?,
        })
    }

    /// Decode a CV certificate from hex string
    pub fn from_hex(hex_data: impl AsRef<str>) -> CvcResult<Self> {
        let data = hex::decode(hex_data.as_ref())?;
        Self::from_der(&data)
    }

    /// Assemble a certificate from its DER parts
    pub fn from_parts(body: Asn1CvCertificateBody, signature: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: Asn1CvCertificate {
                body,
                signature: OctetString::from(signature.into()),
            },
        }
    }

    /// Returns the signature of this certificate as byte slice.
    ///
    /// For ECDSA mechanisms this is the raw concatenation r || s.
    pub fn signature(&self) -> &[u8] {
        self.inner.signature.as_ref()
    }

    /// Returns the certificate profile identifier
    pub fn profile_id(&self) -> &[u8] {
        self.inner.body.profile_id.as_ref()
    }

    /// Returns the certification authority reference as raw bytes
    pub fn car_bytes(&self) -> &[u8] {
        self.inner.body.car.as_ref()
    }

    /// Returns the certificate holder reference as raw bytes
    pub fn chr_bytes(&self) -> &[u8] {
        self.inner.body.chr.as_ref()
    }

    /// Returns the certification authority reference string
    pub fn car(&self) -> String {
        String::from_utf8_lossy(self.car_bytes()).to_string()
    }

    /// Returns the certificate holder reference string
    pub fn chr(&self) -> String {
        String::from_utf8_lossy(self.chr_bytes()).to_string()
    }

    /// Returns the public key of this certificate
    pub fn public_key(&self) -> &EcdsaPublicKey {
        &self.inner.body.public_key
    }

    /// Fill in domain parameters missing from this certificate's key with
    /// those of the issuing certificate's key.
    pub fn inherit_domain_parameters(&mut self, issuer: &EcdsaPublicKey) {
        self.inner.body.public_key.inherit_domain_parameters(issuer);
    }

    /// Returns the certificate holder authorization template
    pub fn chat(&self) -> &Chat {
        &self.inner.body.chat
    }

    /// Get the holder role encoded in the CHAT
    pub fn role(&self) -> AccessRole {
        self.chat().role()
    }

    /// Get the relative authorization carried in the CHAT
    pub fn relative_authorization(&self) -> RelativeAuthorization {
        self.chat().relative_authorization()
    }

    /// Get the terminal type named by the CHAT object identifier
    pub fn terminal_type(&self) -> CvcResult<TerminalType> {
        TerminalType::from_oid(&self.chat().oid)
    }

    /// Get the date from which this certificate is effective
    pub fn effective_date(&self) -> CvcResult<Date> {
        Date::from_bcd(self.inner.body.effective_date.as_ref())
    }

    /// Returns the expiration date of this certificate
    pub fn expiration_date(&self) -> CvcResult<Date> {
        Date::from_bcd(self.inner.body.expiration_date.as_ref())
    }

    /// Returns the parsed certificate extensions
    pub fn extensions(&self) -> CvcResult<Vec<CertificateExtension>> {
        match &self.inner.body.extensions {
            Some(extensions) => extensions
                .0
                .iter()
                .map(CertificateExtension::from_any)
                .collect(),
            None => Ok(Vec::new()),
        }
    }

    /// Extract the sector public key hashes from the sector extension.
    ///
    /// Either hash may be absent; a certificate without a sector extension
    /// yields none at all.
    pub fn sector_public_key_hashes(&self) -> CvcResult<(Option<Vec<u8>>, Option<Vec<u8>>)> {
        let mut first = None;
        let mut second = None;
        for extension in self.extensions()? {
            if extension.oid().to_string() != ID_SECTOR_STR {
                continue;
            }
            if let Some(hash) = extension.find_data_object(TAG_FIRST_SECTOR_HASH) {
                first = Some(hash.value.clone());
            }
            if let Some(hash) = extension.find_data_object(TAG_SECOND_SECTOR_HASH) {
                second = Some(hash.value.clone());
            }
        }
        Ok((first, second))
    }

    /// Check if this certificate carries its own domain parameters
    /// (CVCA characteristic)
    pub fn has_domain_parameters(&self) -> bool {
        self.public_key().has_domain_parameters()
    }

    /// Check if this certificate is self-signed
    pub fn is_self_signed(&self) -> bool {
        self.car_bytes() == self.chr_bytes()
    }

    /// Returns the DER representation of the certificate
    pub fn to_der(&self) -> CvcResult<Vec<u8>> {
        Ok(der_encode(&self.inner)?)
    }

    /// Returns the DER bytes of the certificate body, the exact sequence
    /// covered by the signature
    pub fn raw_body(&self) -> CvcResult<Vec<u8>> {
        Ok(der_encode(&self.inner.body)?)
    }
}

/// A single certificate extension: a discretionary data template holding an
/// object identifier and its data objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateExtension {
    oid: Oid,
    data_objects: Vec<Tlv>,
}

impl CertificateExtension {
    pub fn new(oid: Oid, data_objects: Vec<Tlv>) -> Self {
        Self { oid, data_objects }
    }

    /// Parse an extension from the opaque encoding kept in the certificate
    /// body
    pub fn from_any(raw: &Any) -> CvcResult<Self> {
        let template = Tlv::parse(raw.as_bytes())?;
        if template.tag != 0x73 {
            return Err(Error::InvalidData(format!(
                "Certificate extension must be a discretionary data template, got tag 0x{:02X}",
                template.tag
            )));
        }

        let mut children = template.children()?.into_iter();
        let oid_object = children.next().ok_or_else(|| {
            Error::InvalidData("Certificate extension without object identifier".to_string())
        })?;
        if oid_object.tag != 0x06 {
            return Err(Error::InvalidData(
                "Certificate extension must start with an object identifier".to_string(),
            ));
        }
        let oid: Oid = der_decode(&oid_object.encode())?;

        Ok(Self {
            oid,
            data_objects: children.collect(),
        })
    }

    /// Re-encode the extension for embedding into a certificate body
    pub fn to_any(&self) -> CvcResult<Any> {
        let oid_der = der_encode(&self.oid)?;
        let mut value = oid_der;
        for object in &self.data_objects {
            value.extend_from_slice(&object.encode());
        }
        Ok(Any::new(Tlv::new(0x73, value).encode()))
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    pub fn data_objects(&self) -> &[Tlv] {
        &self.data_objects
    }

    pub fn find_data_object(&self, tag: u16) -> Option<&Tlv> {
        Tlv::find(&self.data_objects, tag)
    }
}

/// Build the extensions data object of a certificate body
pub fn build_extensions(
    extensions: &[CertificateExtension],
) -> CvcResult<Option<CertificateExtensions>> {
    if extensions.is_empty() {
        return Ok(None);
    }
    let mut encoded = Vec::with_capacity(extensions.len());
    for extension in extensions {
        encoded.push(extension.to_any()?);
    }
    Ok(Some(CertificateExtensions(encoded)))
}

impl Chat {
    /// Create a new CHAT for the given terminal type
    pub fn new(terminal_type: TerminalType, template: impl Into<Vec<u8>>) -> Self {
        Self {
            oid: terminal_type.as_oid(),
            template: OctetString::from(template.into()),
        }
    }

    /// Get the holder role of this CHAT
    pub fn role(&self) -> AccessRole {
        match self.template.first() {
            Some(first_byte) => AccessRole::from_bits((first_byte >> 6) & 0b11),
            None => AccessRole::Unknown,
        }
    }

    /// Get the relative authorization of this CHAT, role bits included
    pub fn relative_authorization(&self) -> RelativeAuthorization {
        RelativeAuthorization::new(self.template.to_vec())
    }
}

impl EcdsaPublicKey {
    /// Build a key data object for a certificate.
    ///
    /// With `with_domain_parameters` the full parameter set of the curve is
    /// embedded, as CVCA certificates require; DV and terminal certificates
    /// carry the bare public point.
    pub fn new(
        protocol: SecurityProtocol,
        curve: Curve,
        public_point: impl Into<Vec<u8>>,
        with_domain_parameters: bool,
    ) -> CvcResult<Self> {
        let mut key = Self {
            oid: protocol.oid(),
            prime: None,
            a: None,
            b: None,
            generator: None,
            order: None,
            public_point: OctetString::from(public_point.into()),
            cofactor: None,
        };
        if with_domain_parameters {
            let group: EcGroup = curve
                .try_into()
                .map_err(|e: crate::crypto::Error| Error::InvalidData(e.to_string()))?;
            let mut ctx = BigNumContext::new()?;

            let mut p = BigNum::new()?;
            let mut a = BigNum::new()?;
            let mut b = BigNum::new()?;
            group.components_gfp(&mut p, &mut a, &mut b, &mut ctx)?;

            let generator = group
                .generator()
                .to_bytes(&group, Form::UNCOMPRESSED, &mut ctx)?;
            let mut order = BigNum::new()?;
            group.order(&mut order, &mut ctx)?;
            let mut cofactor = BigNum::new()?;
            group.cofactor(&mut cofactor, &mut ctx)?;

            key.prime = Some(OctetString::from(p.to_vec()));
            key.a = Some(OctetString::from(a.to_vec()));
            key.b = Some(OctetString::from(b.to_vec()));
            key.generator = Some(OctetString::from(generator));
            key.order = Some(OctetString::from(order.to_vec()));
            key.cofactor = Some(OctetString::from(cofactor.to_vec()));
        }
        Ok(key)
    }

    /// Get the security protocol of this public key.
    ///
    /// Returns None if the security protocol is not supported.
    pub fn security_protocol(&self) -> Option<SecurityProtocol> {
        SecurityProtocol::from_oid(&self.oid).ok()
    }

    /// Returns the public point of this public key as byte slice
    pub fn public_point(&self) -> &[u8] {
        &self.public_point
    }

    /// Check if the full domain parameter set is present
    pub fn has_domain_parameters(&self) -> bool {
        self.prime.is_some()
            && self.a.is_some()
            && self.b.is_some()
            && self.generator.is_some()
            && self.order.is_some()
            && self.cofactor.is_some()
    }

    /// Adopt domain parameters from the issuing key for every parameter
    /// this key does not carry itself.
    pub fn inherit_domain_parameters(&mut self, issuer: &EcdsaPublicKey) {
        if self.prime.is_none() {
            self.prime = issuer.prime.clone();
        }
        if self.a.is_none() {
            self.a = issuer.a.clone();
        }
        if self.b.is_none() {
            self.b = issuer.b.clone();
        }
        if self.generator.is_none() {
            self.generator = issuer.generator.clone();
        }
        if self.order.is_none() {
            self.order = issuer.order.clone();
        }
        if self.cofactor.is_none() {
            self.cofactor = issuer.cofactor.clone();
        }
    }

    /// Turn this data object into a key the signature verifier accepts.
    ///
    /// Requires domain parameters, inherited or own, whose prime names one
    /// of the supported curves.
    pub fn verification_key(&self) -> CvcResult<VerificationKey> {
        let prime = self.prime.as_ref().ok_or_else(|| {
            Error::InvalidData(
                "Public key carries no domain parameters, not even inherited ones".to_string(),
            )
        })?;
        let curve = Curve::from_prime(prime.as_ref()).ok_or_else(|| {
            Error::InvalidData("Domain parameters do not name a supported curve".to_string())
        })?;
        let public_key = PublicKey::from_bytes(curve, self.public_point())
            .map_err(|e| Error::InvalidData(e.to_string()))?;
        Ok(VerificationKey::Ec(public_key))
    }
}
