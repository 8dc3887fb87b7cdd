mod errors;
mod rules;
mod types;

pub use errors::TaError;
pub use types::{AuthenticatedAuxiliaryData, PublicKeyReference, TaState};

use std::collections::HashMap;

use rand::{CryptoRng, RngCore};
use rasn::types::ObjectIdentifier as Oid;

use crate::apdu::{APDUCommand, APDUResponse, Ins, StatusCode, Tlv};
use crate::asn1::security_info::TerminalAuthenticationInfo;
use crate::card::CardState;
use crate::crypto;
use crate::cvcert::{
    AccessRole, CvCertificate, RelativeAuthorization, SecurityProtocol, TerminalType,
};
use crate::secstatus::{
    AuthorizationStore, EffectiveAuthorizationMechanism, TerminalAuthenticationMechanism,
};

/// Parameter words of the commands this protocol answers
pub const P1P2_SET_DST: u16 = 0x81B6;
pub const P1P2_SET_AT: u16 = 0xC1A4;
pub const P1P2_VERIFY_CERTIFICATE: u16 = 0x00BE;
pub const P1P2_NO_FURTHER_INFORMATION: u16 = 0x0000;

const TAG_CRYPTOGRAPHIC_MECHANISM: u16 = 0x80;
const TAG_PUBLIC_KEY_REFERENCE: u16 = 0x83;
const TAG_AUXILIARY_DATA: u16 = 0x67;
const TAG_EPHEMERAL_PUBLIC_KEY: u16 = 0x91;
const TAG_CERTIFICATE_BODY: u16 = 0x7F4E;
const TAG_CERTIFICATE_SIGNATURE: u16 = 0x5F37;
const TAG_CV_CERTIFICATE: u16 = 0x7F21;

const CHALLENGE_LEN: usize = 8;

/// Outcome of a successfully handled command
struct Success {
    data: Vec<u8>,
    reason: &'static str,
}

impl Success {
    fn empty(reason: &'static str) -> Self {
        Self {
            data: Vec::new(),
            reason,
        }
    }

    fn with_data(data: Vec<u8>, reason: &'static str) -> Self {
        Self { data, reason }
    }
}

type HandlerResult = Result<Success, TaError>;

/// The card side of Terminal Authentication version 2.
///
/// Owns the per-session protocol state and consumes the security artifacts
/// a preceding channel-establishment run deposited in the card state. One
/// command APDU enters, one response APDU leaves; failed commands never
/// advance the session.
pub struct TaProtocol {
    rng: Box<dyn RngCore>,
    state: TaState,
    current_certificate: Option<CvCertificate>,
    most_recent_temporary_certificate: Option<CvCertificate>,
    challenge: Option<[u8; CHALLENGE_LEN]>,
    auxiliary_data: Vec<AuthenticatedAuxiliaryData>,
    cryptographic_mechanism_reference: Option<SecurityProtocol>,
    compressed_terminal_ephemeral_public_key: Option<Vec<u8>>,
    terminal_type: Option<TerminalType>,
    authorization_store: Option<AuthorizationStore>,
}

impl TaProtocol {
    /// Create a protocol instance around an injected randomness source.
    pub fn new(rng: impl RngCore + CryptoRng + 'static) -> Self {
        Self {
            rng: Box::new(rng),
            state: TaState::Idle,
            current_certificate: None,
            most_recent_temporary_certificate: None,
            challenge: None,
            auxiliary_data: Vec::new(),
            cryptographic_mechanism_reference: None,
            compressed_terminal_ephemeral_public_key: None,
            terminal_type: None,
            authorization_store: None,
        }
    }

    /// Current protocol progress
    pub fn state(&self) -> TaState {
        self.state
    }

    /// The certificate currently used as verification anchor, if any
    pub fn current_certificate(&self) -> Option<&CvCertificate> {
        self.current_certificate.as_ref()
    }

    /// Discard all session state; the randomness source is kept.
    pub fn reset(&mut self) {
        self.state = TaState::Idle;
        self.current_certificate = None;
        self.most_recent_temporary_certificate = None;
        self.challenge = None;
        self.auxiliary_data.clear();
        self.cryptographic_mechanism_reference = None;
        self.compressed_terminal_ephemeral_public_key = None;
        self.terminal_type = None;
        self.authorization_store = None;
    }

    /// The SecInfo entries this protocol contributes to EF.CardAccess
    pub fn sec_infos(&self) -> Vec<TerminalAuthenticationInfo> {
        vec![TerminalAuthenticationInfo::version_2()]
    }

    /// Handle one command APDU and emit its response.
    pub fn process(&mut self, card: &mut CardState, apdu: &APDUCommand) -> APDUResponse {
        match self.dispatch(card, apdu) {
            Ok(success) => {
                tracing::debug!(reason = success.reason, "command processed");
                APDUResponse::with_data(success.data, StatusCode::SUCCESS)
            }
            Err(error) => {
                tracing::warn!(
                    status = %error.status_word(),
                    reason = %error,
                    "command rejected"
                );
                APDUResponse::from_status(error.status_word())
            }
        }
    }

    fn dispatch(&mut self, card: &mut CardState, apdu: &APDUCommand) -> HandlerResult {
        if !apdu.is_secure_messaging() {
            return Err(TaError::NotSecureMessaged);
        }

        match (apdu.ins, apdu.p1p2()) {
            // selecting a new verification anchor restarts chain building,
            // so it is acceptable in every state
            (Ins::MseSet, P1P2_SET_DST) => self.set_dst(card, &apdu.data),
            (Ins::PerformSecurityOperation, P1P2_VERIFY_CERTIFICATE) => {
                self.require_state(&[TaState::AnchorSet], "certificate verification")?;
                self.verify_certificate(card, &apdu.data)
            }
            (Ins::MseSet, P1P2_SET_AT) => {
                self.require_state(&[TaState::AnchorSet], "authentication template selection")?;
                self.set_at(&apdu.data)
            }
            (Ins::GetChallenge, P1P2_NO_FURTHER_INFORMATION) => {
                // repeated requests are fine, each overwrites the challenge
                self.require_state(
                    &[TaState::ChainBuilt, TaState::Challenged],
                    "challenge generation",
                )?;
                self.get_challenge()
            }
            (Ins::ExternalAuthenticate, P1P2_NO_FURTHER_INFORMATION) => {
                self.require_state(&[TaState::Challenged], "external authentication")?;
                self.external_authenticate(card, &apdu.data)
            }
            _ => Err(TaError::WrongApduType),
        }
    }

    fn require_state(&self, allowed: &[TaState], step: &str) -> Result<(), TaError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(TaError::ConditionsNotSatisfied(format!(
                "{step} is not available in the current protocol step"
            )))
        }
    }

    /// MSE:Set DST: select the verification anchor the chain starts from.
    fn set_dst(&mut self, card: &mut CardState, data: &[u8]) -> HandlerResult {
        let objects = Tlv::parse_multiple(data)
            .map_err(|e| TaError::MalformedData(format!("Unparseable command data: {e}")))?;
        let reference = Tlv::find(&objects, TAG_PUBLIC_KEY_REFERENCE)
            .ok_or_else(|| TaError::MissingReference("No public key reference found".into()))?;

        let terminal_type = Self::resolve_terminal_type(card)?;
        self.terminal_type = Some(terminal_type);

        // drop the previously selected key before resolving the new one
        self.current_certificate = None;

        if let Some(temporary) = &self.most_recent_temporary_certificate {
            if temporary.chr_bytes() == reference.value.as_slice() {
                // continuing the already-validated chain, the narrowed
                // authorizations stay in effect
                self.current_certificate = Some(temporary.clone());
                self.state = TaState::AnchorSet;
                return Ok(Success::empty(
                    "public key found in temporarily imported certificate",
                ));
            }
        }

        let (anchor, reason) = match card.trust_points().get(terminal_type) {
            Some(trust_point) => {
                if trust_point.current().chr_bytes() == reference.value.as_slice() {
                    (
                        Some(trust_point.current().clone()),
                        "public key found in current trust anchor",
                    )
                } else if let Some(previous) = trust_point
                    .previous()
                    .filter(|previous| previous.chr_bytes() == reference.value.as_slice())
                {
                    (
                        Some(previous.clone()),
                        "public key found in previous trust anchor",
                    )
                } else {
                    (None, "")
                }
            }
            None => (None, ""),
        };

        let anchor = anchor.ok_or_else(|| {
            TaError::MissingReference(
                "The identified public key could not be found in a trust point or temporarily \
                 imported certificate"
                    .into(),
            )
        })?;
        self.current_certificate = Some(anchor.clone());

        // a fresh anchor selection starts from the confined authorizations
        // the channel establishment confirmed
        if self.authorization_store.is_none() {
            self.authorization_store = Self::initial_authorizations(card);
        }
        let authorized = self
            .authorization_store
            .as_ref()
            .and_then(|store| store.get_authorization(&terminal_type.as_oid()))
            .is_some();
        if !authorized {
            return Err(TaError::SecurityStatusNotSatisfied(
                "Previous protocol did not provide authorization information for this terminal \
                 type"
                    .into(),
            ));
        }

        self.update_authorizations(&anchor)?;
        self.state = TaState::AnchorSet;
        Ok(Success::empty(reason))
    }

    /// PSO:Verify Certificate: extend the chain by one link.
    fn verify_certificate(&mut self, card: &mut CardState, data: &[u8]) -> HandlerResult {
        let objects = Tlv::parse_multiple(data)
            .map_err(|e| TaError::NotUsable(format!("Unparseable command data: {e}")))?;
        let body = Tlv::find(&objects, TAG_CERTIFICATE_BODY).ok_or_else(|| {
            TaError::MissingReference("The certificate body data is missing".into())
        })?;
        let signature = Tlv::find(&objects, TAG_CERTIFICATE_SIGNATURE).ok_or_else(|| {
            TaError::MissingReference("The certificate signature data is missing".into())
        })?;

        let current = self
            .current_certificate
            .clone()
            .ok_or_else(|| TaError::ImplementationError("No verification anchor selected".into()))?;

        // reassemble the outer certificate object around body and signature
        let mut outer_value = body.encode();
        outer_value.extend_from_slice(&signature.encode());
        let outer = Tlv::new(TAG_CV_CERTIFICATE, outer_value);

        let mut certificate = CvCertificate::from_der(&outer.encode())
            .map_err(|e| TaError::NotUsable(format!("Could not parse the certificate: {e}")))?;
        certificate.inherit_domain_parameters(current.public_key());

        if certificate.car_bytes() != current.chr_bytes() {
            return Err(TaError::MissingReference(
                "Could not find fitting certificate (CAR invalid)".into(),
            ));
        }

        let candidate_role = certificate.role();
        if candidate_role == AccessRole::Unknown {
            return Err(TaError::NotUsable(
                "The certificate carries an unknown holder role".into(),
            ));
        }
        if !rules::is_issuer_role_valid(candidate_role, current.role()) {
            return Err(TaError::NotUsable(
                "The certificate was issued by an invalid instance".into(),
            ));
        }

        let protocol = current.public_key().security_protocol().ok_or_else(|| {
            TaError::NotUsable("The anchor key names an unsupported signature mechanism".into())
        })?;
        let verification_key = current
            .public_key()
            .verification_key()
            .map_err(|e| TaError::NotUsable(format!("Unusable anchor key: {e}")))?;
        let signed_bytes = body.encode();
        let signature_valid = crypto::verify_signature(
            &verification_key,
            protocol.signature_scheme(),
            protocol.hash_algorithm(),
            &signed_bytes,
            signature.value.as_slice(),
        )
        .map_err(|e| TaError::NotUsable(format!("Could not verify the certificate: {e}")))?;
        if !signature_valid {
            return Err(TaError::NotUsable(
                "Could not verify the certificate's signature".into(),
            ));
        }

        let candidate_expiration = certificate
            .expiration_date()
            .map_err(|e| TaError::NotUsable(format!("Unreadable expiration date: {e}")))?;
        let issuer_expiration = current
            .expiration_date()
            .map_err(|e| TaError::NotUsable(format!("Unreadable anchor expiration date: {e}")))?;
        if !rules::is_chain_link_valid(
            candidate_role,
            &candidate_expiration,
            current.role(),
            &issuer_expiration,
            card.current_date().date(),
        ) {
            return Err(TaError::NotUsable("The certificate has an invalid date".into()));
        }

        let candidate_effective = certificate
            .effective_date()
            .map_err(|e| TaError::NotUsable(format!("Unreadable effective date: {e}")))?;
        if let Some(new_date) = rules::effective_date_update(
            candidate_role,
            &candidate_effective,
            current.role(),
            card.current_date().date(),
        ) {
            tracing::debug!(date = %new_date, "advancing the chip date");
            card.current_date_mut().advance_to(new_date);
        }

        self.import_certificate(card, certificate.clone(), candidate_role)?;
        self.update_authorizations(&certificate)?;

        Ok(Success::empty("certificate verified and imported"))
    }

    /// MSE:Set AT: bind the mechanism, key reference, auxiliary data and
    /// terminal ephemeral key for the upcoming authentication.
    fn set_at(&mut self, data: &[u8]) -> HandlerResult {
        let objects = Tlv::parse_multiple(data)
            .map_err(|e| TaError::MalformedData(format!("Unparseable command data: {e}")))?;
        let current = self
            .current_certificate
            .as_ref()
            .ok_or_else(|| TaError::ImplementationError("No verification anchor selected".into()))?;

        let reference = Tlv::find(&objects, TAG_PUBLIC_KEY_REFERENCE).ok_or_else(|| {
            TaError::MalformedData("The public key reference data is missing".into())
        })?;
        let key_reference = PublicKeyReference::try_from(reference.value.as_slice())?;
        if current.chr_bytes() != key_reference.as_bytes() {
            return Err(TaError::MissingReference(
                "The referenced public key could not be found".into(),
            ));
        }

        let mechanism = Tlv::find(&objects, TAG_CRYPTOGRAPHIC_MECHANISM).ok_or_else(|| {
            TaError::MissingReference("The cryptographic mechanism reference is missing".into())
        })?;
        let protocol = SecurityProtocol::from_oid_value(&mechanism.value).map_err(|_| {
            TaError::MalformedData("The cryptographic mechanism reference encoding is invalid".into())
        })?;

        let mut auxiliary_data = Vec::new();
        if let Some(container) = Tlv::find(&objects, TAG_AUXILIARY_DATA) {
            let entries = container.children().map_err(|e| {
                TaError::MalformedData(format!("Invalid encoding of the auxiliary data: {e}"))
            })?;
            if entries.is_empty() {
                return Err(TaError::MalformedData(
                    "The auxiliary data container holds no entries".into(),
                ));
            }
            for entry in &entries {
                auxiliary_data.push(AuthenticatedAuxiliaryData::from_tlv(entry)?);
            }
        }

        let ephemeral = Tlv::find(&objects, TAG_EPHEMERAL_PUBLIC_KEY).ok_or_else(|| {
            TaError::MalformedData("The ephemeral public key data is missing".into())
        })?;

        self.cryptographic_mechanism_reference = Some(protocol);
        self.auxiliary_data = auxiliary_data;
        self.compressed_terminal_ephemeral_public_key = Some(ephemeral.value.clone());
        self.state = TaState::ChainBuilt;
        Ok(Success::empty("authentication template selected"))
    }

    /// Get Challenge: hand the terminal eight fresh random bytes.
    fn get_challenge(&mut self) -> HandlerResult {
        let mut challenge = [0u8; CHALLENGE_LEN];
        self.rng.fill_bytes(&mut challenge);
        self.challenge = Some(challenge);
        self.state = TaState::Challenged;
        Ok(Success::with_data(
            challenge.to_vec(),
            "challenge generated",
        ))
    }

    /// External Authenticate: verify the terminal's signature over the
    /// challenge material and commit the session result.
    fn external_authenticate(&mut self, card: &mut CardState, data: &[u8]) -> HandlerResult {
        let challenge = self.challenge.ok_or_else(|| {
            TaError::ConditionsNotSatisfied(
                "No challenge was generated, request a challenge first".into(),
            )
        })?;

        if !card
            .sec_status()
            .terminal_authentication_mechanisms()
            .is_empty()
        {
            return Err(TaError::SecurityStatusNotSatisfied(
                "Terminal authentication already completed in this session".into(),
            ));
        }

        let id_icc = card
            .sec_status()
            .pace_mechanisms()
            .first()
            .map(|mechanism| mechanism.compressed_ephemeral_chip_public_key().to_vec())
            .ok_or_else(|| {
                TaError::ConditionsNotSatisfied(
                    "No protocol providing data for the chip identifier was run".into(),
                )
            })?;

        let ephemeral_key = self
            .compressed_terminal_ephemeral_public_key
            .clone()
            .ok_or_else(|| {
                TaError::ImplementationError("No terminal ephemeral key was bound".into())
            })?;
        let protocol = self.cryptographic_mechanism_reference.ok_or_else(|| {
            TaError::ImplementationError("No cryptographic mechanism reference was bound".into())
        })?;
        let current = self
            .current_certificate
            .as_ref()
            .ok_or_else(|| TaError::ImplementationError("No verification anchor selected".into()))?;

        let mut data_to_verify =
            Vec::with_capacity(id_icc.len() + challenge.len() + ephemeral_key.len());
        data_to_verify.extend_from_slice(&id_icc);
        data_to_verify.extend_from_slice(&challenge);
        data_to_verify.extend_from_slice(&ephemeral_key);
        if !self.auxiliary_data.is_empty() {
            let mut container_value = Vec::new();
            for auxiliary in &self.auxiliary_data {
                container_value.extend_from_slice(auxiliary.encoded());
            }
            data_to_verify.extend_from_slice(&Tlv::new(TAG_AUXILIARY_DATA, container_value).encode());
        }

        let verification_key = current.public_key().verification_key().map_err(|e| {
            TaError::ImplementationError(format!("Unusable terminal certificate key: {e}"))
        })?;
        let signature_valid = crypto::verify_signature(
            &verification_key,
            protocol.signature_scheme(),
            protocol.hash_algorithm(),
            &data_to_verify,
            data,
        )
        .map_err(|e| {
            TaError::ImplementationError(format!("The signature could not be verified: {e}"))
        })?;
        if !signature_valid {
            return Err(TaError::AuthenticationFailed);
        }

        self.commit_authentication(card, ephemeral_key, protocol)
    }

    /// Publish the outcome of a successful authentication into the card's
    /// security status.
    fn commit_authentication(
        &mut self,
        card: &mut CardState,
        ephemeral_key: Vec<u8>,
        protocol: SecurityProtocol,
    ) -> HandlerResult {
        let current = self
            .current_certificate
            .as_ref()
            .ok_or_else(|| TaError::ImplementationError("No verification anchor selected".into()))?;
        let terminal_type = self
            .terminal_type
            .ok_or_else(|| TaError::ImplementationError("No terminal type resolved".into()))?;
        let authorization_store = self.authorization_store.clone().ok_or_else(|| {
            TaError::ImplementationError("No authorization information collected".into())
        })?;

        let certificate_extensions = current.extensions().map_err(|e| {
            TaError::ImplementationError(format!("Unreadable certificate extensions: {e}"))
        })?;
        let (first_sector_hash, second_sector_hash) =
            current.sector_public_key_hashes().map_err(|e| {
                TaError::ImplementationError(format!("Unreadable sector extension: {e}"))
            })?;

        card.sec_status_mut().add_terminal_authentication_mechanism(
            TerminalAuthenticationMechanism::new(
                ephemeral_key,
                terminal_type,
                self.auxiliary_data.clone(),
                first_sector_hash,
                second_sector_hash,
                protocol.hash_algorithm(),
                certificate_extensions,
            ),
        );
        card.sec_status_mut().add_effective_authorization_mechanism(
            EffectiveAuthorizationMechanism::new(authorization_store),
        );

        self.state = TaState::Authenticated;
        Ok(Success::empty("terminal authenticated"))
    }

    /// Permanent import for authorities, temporary import for everything
    /// below them.
    fn import_certificate(
        &mut self,
        card: &mut CardState,
        certificate: CvCertificate,
        role: AccessRole,
    ) -> Result<(), TaError> {
        if role.is_cvca() {
            let terminal_type = self.terminal_type.ok_or_else(|| {
                TaError::ImplementationError("No terminal type resolved".into())
            })?;
            // without a trust point there is nowhere to persist the new
            // authority; the chain walk itself is unaffected
            if let Some(trust_point) = card.trust_points_mut().get_mut(terminal_type) {
                trust_point.rollover(certificate);
            }
        } else {
            self.most_recent_temporary_certificate = Some(certificate.clone());
            self.current_certificate = Some(certificate);
        }
        Ok(())
    }

    /// The terminal type announced by the single channel-establishment run
    /// preceding this protocol.
    fn resolve_terminal_type(card: &CardState) -> Result<TerminalType, TaError> {
        let mechanisms = card.sec_status().pace_mechanisms();
        match mechanisms.len() {
            1 => TerminalType::from_oid(mechanisms[0].terminal_type_oid()).map_err(|_| {
                TaError::SecurityStatusNotSatisfied(
                    "Previous channel establishment did not provide information about the \
                     terminal type"
                        .into(),
                )
            }),
            0 => Err(TaError::SecurityStatusNotSatisfied(
                "Missing previous execution of a channel-establishment protocol".into(),
            )),
            _ => Err(TaError::ImplementationError(
                "Previous channel establishment is ambiguous".into(),
            )),
        }
    }

    /// The authorization store a fresh anchor selection starts from.
    fn initial_authorizations(card: &CardState) -> Option<AuthorizationStore> {
        let mechanisms = card.sec_status().confined_authorization_mechanisms();
        if mechanisms.len() == 1 {
            Some(mechanisms[0].authorization_store().clone())
        } else {
            None
        }
    }

    /// Narrow the session authorizations by the certificate's CHAT.
    fn update_authorizations(&mut self, certificate: &CvCertificate) -> Result<(), TaError> {
        let store = self.authorization_store.as_mut().ok_or_else(|| {
            TaError::ImplementationError("No authorization information collected".into())
        })?;
        store.update(Self::authorizations_from_certificate(certificate));
        Ok(())
    }

    fn authorizations_from_certificate(
        certificate: &CvCertificate,
    ) -> HashMap<Oid, RelativeAuthorization> {
        let chat = certificate.chat();
        HashMap::from([(chat.oid.clone(), chat.relative_authorization())])
    }
}

impl std::fmt::Debug for TaProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaProtocol")
            .field("state", &self.state)
            .field("terminal_type", &self.terminal_type)
            .field("has_challenge", &self.challenge.is_some())
            .finish()
    }
}
