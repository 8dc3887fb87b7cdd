//! DER shapes of the card-verifiable certificate profile (TR-03110-3 C).

use rasn::prelude::{
    Any, AsnType, Decode, Encode, ObjectIdentifier as Oid, OctetString, SequenceOf,
};

/// Certificate Holder Authorization Template (CHAT)
///
/// The object identifier names the terminal type; the template byte string
/// carries the role bits and the relative authorization.
#[derive(Debug, Clone, Decode, Encode, AsnType)]
#[rasn(tag(application, 0x4C))]
pub struct Chat {
    /// terminal type object identifier
    pub oid: Oid,
    /// role and relative authorization bits
    #[rasn(tag(application, 0x13))]
    pub template: OctetString,
}

/// ECDSA public key data object
///
/// Domain parameters are only present on CVCA certificates; DV and terminal
/// certificates inherit them from their issuer.
#[derive(Debug, Clone, Decode, Encode, AsnType)]
#[rasn(tag(application, 0x49))]
pub struct EcdsaPublicKey {
    /// signature mechanism object identifier
    pub oid: Oid,
    #[rasn(tag(context, 1))]
    /// prime modulus
    pub prime: Option<OctetString>,
    #[rasn(tag(context, 2))]
    /// first coefficient
    pub a: Option<OctetString>,
    #[rasn(tag(context, 3))]
    /// second coefficient
    pub b: Option<OctetString>,
    #[rasn(tag(context, 4))]
    /// base point
    pub generator: Option<OctetString>,
    #[rasn(tag(context, 5))]
    /// order of the base point
    pub order: Option<OctetString>,
    #[rasn(tag(context, 6))]
    /// public point
    pub public_point: OctetString,
    #[rasn(tag(context, 7))]
    /// cofactor
    pub cofactor: Option<OctetString>,
}

/// Certificate extensions: a sequence of discretionary data templates,
/// kept opaque at this level and interpreted by the certificate wrapper
#[derive(Debug, Clone, Decode, Encode, AsnType)]
#[rasn(tag(application, 0x05))]
#[rasn(delegate)]
pub struct CertificateExtensions(pub SequenceOf<Any>);

/// Card Verifiable Certificate Body
#[derive(Debug, Clone, Decode, Encode, AsnType)]
#[rasn(tag(application, 0x4E))]
pub struct CvCertificateBody {
    /// certificate profile identifier
    #[rasn(tag(application, 0x29))]
    pub profile_id: OctetString,
    #[rasn(tag(application, 0x02))]
    /// certification authority reference
    pub car: OctetString,
    /// public key value and domain parameters
    pub public_key: EcdsaPublicKey,
    #[rasn(tag(application, 0x20))]
    /// certificate holder reference
    pub chr: OctetString,
    /// certificate holder authorization template
    pub chat: Chat,
    /// certificate effective date, unpacked BCD YYMMDD
    #[rasn(tag(application, 0x25), size(6))]
    pub effective_date: OctetString,
    /// certificate expiration date, unpacked BCD YYMMDD
    #[rasn(tag(application, 0x24), size(6))]
    pub expiration_date: OctetString,
    /// certificate extensions
    pub extensions: Option<CertificateExtensions>,
}

/// Card Verifiable Certificate
#[derive(Debug, Clone, Decode, Encode, AsnType)]
#[rasn(tag(application, 0x21))]
pub struct CvCertificate {
    /// certificate body, the exact byte sequence that is signed
    pub body: CvCertificateBody,
    /// signature over the body; raw r||s for ECDSA mechanisms
    #[rasn(tag(application, 0x37))]
    pub signature: OctetString,
}
