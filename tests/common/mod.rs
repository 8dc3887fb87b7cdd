//! Shared helpers: signed certificate chains and APDU builders.

use rasn::types::OctetString;

use eid_card_sim::apdu::{APDUCommand, Ins, Tlv};
use eid_card_sim::asn1::cvcert::{Chat, CvCertificateBody, EcdsaPublicKey};
use eid_card_sim::asn1::oid::ID_SECTOR;
use eid_card_sim::card::{CardState, TrustPoint};
use eid_card_sim::crypto::{Curve, EcdsaKeyPair, HashAlg};
use eid_card_sim::cvcert::{
    build_extensions, CertificateExtension, CvCertificate, Date, RelativeAuthorization,
    SecurityProtocol, TerminalType,
};
use eid_card_sim::secstatus::{
    AuthorizationStore, ConfinedAuthorizationMechanism, PaceMechanism,
};
use eid_card_sim::ta::AuthenticatedAuxiliaryData;

pub const CVCA_CHR: &str = "DECVCA00001";
pub const DV_CHR: &str = "DEDVT00001";
pub const TERMINAL_CHR: &str = "DETERM00001";

pub const CVCA_TEMPLATE: [u8; 5] = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
pub const DV_TEMPLATE: [u8; 5] = [0xBF, 0xFF, 0xFF, 0xFF, 0x13];
pub const TERMINAL_TEMPLATE: [u8; 5] = [0x3F, 0xFF, 0xFF, 0xFF, 0x03];
pub const CONFINED_AUTHORIZATION: [u8; 5] = [0x3F, 0xFF, 0xFF, 0xFF, 0x17];

pub const ID_ICC: [u8; 33] = [0x03; 33];
pub const TERMINAL_EPHEMERAL_KEY: [u8; 33] = [0x41; 33];

pub const FIRST_SECTOR_HASH: [u8; 32] = [0xAA; 32];
pub const SECOND_SECTOR_HASH: [u8; 32] = [0xBB; 32];

/// Default chip date the test card starts at
pub fn chip_date() -> Date {
    Date::new(2026, 8, 1).unwrap()
}

pub fn date(year: u16, month: u8, day: u8) -> Date {
    Date::new(year, month, day).unwrap()
}

/// Build and sign one certificate of the chain.
#[allow(clippy::too_many_arguments)]
pub fn build_certificate(
    signer: &EcdsaKeyPair,
    car: &str,
    chr: &str,
    holder: &EcdsaKeyPair,
    template: [u8; 5],
    with_domain_parameters: bool,
    effective: Date,
    expiration: Date,
    extensions: &[CertificateExtension],
) -> CvCertificate {
    let public_key = EcdsaPublicKey::new(
        SecurityProtocol::EcdsaSha256,
        Curve::BrainpoolP256r1,
        holder.public_key().uncompressed_bytes(),
        with_domain_parameters,
    )
    .unwrap();

    let body = CvCertificateBody {
        profile_id: OctetString::from(vec![0x00]),
        car: OctetString::from(car.as_bytes().to_vec()),
        public_key,
        chr: OctetString::from(chr.as_bytes().to_vec()),
        chat: Chat::new(TerminalType::AuthenticationTerminal, template.to_vec()),
        effective_date: OctetString::from(effective.to_bcd().to_vec()),
        expiration_date: OctetString::from(expiration.to_bcd().to_vec()),
        extensions: build_extensions(extensions).unwrap(),
    };

    let body_der = rasn::der::encode(&body).unwrap();
    let signature = signer
        .sign(&body_der, HashAlg::Sha256)
        .unwrap()
        .raw_signature();
    CvCertificate::from_parts(body, signature)
}

pub fn sector_extension() -> CertificateExtension {
    CertificateExtension::new(
        rasn::types::ObjectIdentifier::new_unchecked(ID_SECTOR.into()),
        vec![
            Tlv::new(0x80, FIRST_SECTOR_HASH.to_vec()),
            Tlv::new(0x81, SECOND_SECTOR_HASH.to_vec()),
        ],
    )
}

/// A complete CVCA → DV → terminal chain with its key pairs
pub struct TestChain {
    pub cvca_keys: EcdsaKeyPair,
    pub cvca: CvCertificate,
    pub dv_keys: EcdsaKeyPair,
    pub dv: CvCertificate,
    pub terminal_keys: EcdsaKeyPair,
    pub terminal: CvCertificate,
}

impl TestChain {
    /// A chain that is fully valid on [`chip_date`]
    pub fn valid() -> Self {
        let cvca_keys = EcdsaKeyPair::generate(Curve::BrainpoolP256r1).unwrap();
        let dv_keys = EcdsaKeyPair::generate(Curve::BrainpoolP256r1).unwrap();
        let terminal_keys = EcdsaKeyPair::generate(Curve::BrainpoolP256r1).unwrap();

        let cvca = build_certificate(
            &cvca_keys,
            CVCA_CHR,
            CVCA_CHR,
            &cvca_keys,
            CVCA_TEMPLATE,
            true,
            date(2025, 1, 1),
            date(2030, 1, 1),
            &[],
        );
        // effective yesterday, expires tomorrow relative to the chip date
        let dv = build_certificate(
            &cvca_keys,
            CVCA_CHR,
            DV_CHR,
            &dv_keys,
            DV_TEMPLATE,
            false,
            date(2026, 7, 31),
            date(2026, 8, 2),
            &[],
        );
        let terminal = build_certificate(
            &dv_keys,
            DV_CHR,
            TERMINAL_CHR,
            &terminal_keys,
            TERMINAL_TEMPLATE,
            false,
            date(2026, 7, 31),
            date(2026, 8, 2),
            &[sector_extension()],
        );

        Self {
            cvca_keys,
            cvca,
            dv_keys,
            dv,
            terminal_keys,
            terminal,
        }
    }
}

/// The confined authorizations the channel establishment confirmed
pub fn confined_authorization_store() -> AuthorizationStore {
    AuthorizationStore::new().with_authorization(
        TerminalType::AuthenticationTerminal.as_oid(),
        RelativeAuthorization::new(CONFINED_AUTHORIZATION.to_vec()),
    )
}

/// A card primed with the CVCA trust point and the artifacts of one
/// completed channel establishment
pub fn card_with_pace(cvca: &CvCertificate) -> CardState {
    let mut card = CardState::new(chip_date());
    card.trust_points_mut().insert(
        TerminalType::AuthenticationTerminal,
        TrustPoint::new(cvca.clone()),
    );
    card.sec_status_mut().add_pace_mechanism(PaceMechanism::new(
        TerminalType::AuthenticationTerminal.as_oid(),
        ID_ICC.to_vec(),
    ));
    card.sec_status_mut()
        .add_confined_authorization_mechanism(ConfinedAuthorizationMechanism::new(
            confined_authorization_store(),
        ));
    card
}

fn secured(mut command: APDUCommand) -> APDUCommand {
    command.set_secure_messaging(true);
    command
}

pub fn set_dst_apdu(chr: &str) -> APDUCommand {
    let data = Tlv::new(0x83, chr.as_bytes().to_vec()).encode();
    secured(APDUCommand::new(Ins::MseSet, 0x81, 0xB6, data, None))
}

pub fn pso_verify_apdu(certificate: &CvCertificate) -> APDUCommand {
    let mut data = certificate.raw_body().unwrap();
    data.extend_from_slice(&Tlv::new(0x5F37, certificate.signature().to_vec()).encode());
    secured(APDUCommand::new(
        Ins::PerformSecurityOperation,
        0x00,
        0xBE,
        data,
        None,
    ))
}

pub fn set_at_apdu(
    chr: &str,
    protocol: SecurityProtocol,
    ephemeral_key: &[u8],
    auxiliary_data: &[AuthenticatedAuxiliaryData],
) -> APDUCommand {
    let mut data = Tlv::new(0x83, chr.as_bytes().to_vec()).encode();

    // the mechanism reference travels without tag and length
    let oid_der = rasn::der::encode(&protocol.oid()).unwrap();
    data.extend_from_slice(&Tlv::new(0x80, oid_der[2..].to_vec()).encode());

    if !auxiliary_data.is_empty() {
        let mut container = Vec::new();
        for auxiliary in auxiliary_data {
            container.extend_from_slice(auxiliary.encoded());
        }
        data.extend_from_slice(&Tlv::new(0x67, container).encode());
    }

    data.extend_from_slice(&Tlv::new(0x91, ephemeral_key.to_vec()).encode());
    secured(APDUCommand::new(Ins::MseSet, 0xC1, 0xA4, data, None))
}

pub fn get_challenge_apdu() -> APDUCommand {
    secured(APDUCommand::new(Ins::GetChallenge, 0x00, 0x00, vec![], Some(8)))
}

pub fn external_authenticate_apdu(signature: &[u8]) -> APDUCommand {
    secured(APDUCommand::new(
        Ins::ExternalAuthenticate,
        0x00,
        0x00,
        signature.to_vec(),
        None,
    ))
}

/// The byte sequence the terminal signs for External Authenticate
pub fn data_to_sign(
    challenge: &[u8],
    ephemeral_key: &[u8],
    auxiliary_data: &[AuthenticatedAuxiliaryData],
) -> Vec<u8> {
    let mut data = ID_ICC.to_vec();
    data.extend_from_slice(challenge);
    data.extend_from_slice(ephemeral_key);
    if !auxiliary_data.is_empty() {
        let mut container = Vec::new();
        for auxiliary in auxiliary_data {
            container.extend_from_slice(auxiliary.encoded());
        }
        data.extend_from_slice(&Tlv::new(0x67, container).encode());
    }
    data
}

/// Sign the challenge material the way an authenticating terminal would
pub fn terminal_signature(
    terminal_keys: &EcdsaKeyPair,
    challenge: &[u8],
    auxiliary_data: &[AuthenticatedAuxiliaryData],
) -> Vec<u8> {
    let data = data_to_sign(challenge, &TERMINAL_EPHEMERAL_KEY, auxiliary_data);
    terminal_keys
        .sign(&data, HashAlg::Sha256)
        .unwrap()
        .raw_signature()
}
