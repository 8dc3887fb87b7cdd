mod authorization;

pub use authorization::AuthorizationStore;

use rasn::types::ObjectIdentifier as Oid;

use crate::cvcert::{CertificateExtension, TerminalType};
use crate::crypto::HashAlg;
use crate::ta::AuthenticatedAuxiliaryData;

/// Security artifacts a PACE run leaves behind for later protocols
#[derive(Debug, Clone)]
pub struct PaceMechanism {
    terminal_type_oid: Oid,
    compressed_ephemeral_chip_public_key: Vec<u8>,
}

impl PaceMechanism {
    pub fn new(terminal_type_oid: Oid, compressed_ephemeral_chip_public_key: Vec<u8>) -> Self {
        Self {
            terminal_type_oid,
            compressed_ephemeral_chip_public_key,
        }
    }

    /// The terminal-type object identifier announced during PACE
    pub fn terminal_type_oid(&self) -> &Oid {
        &self.terminal_type_oid
    }

    /// The compressed ephemeral public key of the chip, the id_ICC input
    /// of terminal authentication
    pub fn compressed_ephemeral_chip_public_key(&self) -> &[u8] {
        &self.compressed_ephemeral_chip_public_key
    }
}

/// The authorization bounds confirmed by the card holder during PACE
#[derive(Debug, Clone)]
pub struct ConfinedAuthorizationMechanism {
    authorization_store: AuthorizationStore,
}

impl ConfinedAuthorizationMechanism {
    pub fn new(authorization_store: AuthorizationStore) -> Self {
        Self {
            authorization_store,
        }
    }

    pub fn authorization_store(&self) -> &AuthorizationStore {
        &self.authorization_store
    }
}

/// Result of a completed terminal authentication
#[derive(Debug, Clone)]
pub struct TerminalAuthenticationMechanism {
    compressed_terminal_ephemeral_public_key: Vec<u8>,
    terminal_type: TerminalType,
    auxiliary_data: Vec<AuthenticatedAuxiliaryData>,
    first_sector_public_key_hash: Option<Vec<u8>>,
    second_sector_public_key_hash: Option<Vec<u8>>,
    hash_algorithm: HashAlg,
    certificate_extensions: Vec<CertificateExtension>,
}

impl TerminalAuthenticationMechanism {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        compressed_terminal_ephemeral_public_key: Vec<u8>,
        terminal_type: TerminalType,
        auxiliary_data: Vec<AuthenticatedAuxiliaryData>,
        first_sector_public_key_hash: Option<Vec<u8>>,
        second_sector_public_key_hash: Option<Vec<u8>>,
        hash_algorithm: HashAlg,
        certificate_extensions: Vec<CertificateExtension>,
    ) -> Self {
        Self {
            compressed_terminal_ephemeral_public_key,
            terminal_type,
            auxiliary_data,
            first_sector_public_key_hash,
            second_sector_public_key_hash,
            hash_algorithm,
            certificate_extensions,
        }
    }

    pub fn compressed_terminal_ephemeral_public_key(&self) -> &[u8] {
        &self.compressed_terminal_ephemeral_public_key
    }

    pub fn terminal_type(&self) -> TerminalType {
        self.terminal_type
    }

    pub fn auxiliary_data(&self) -> &[AuthenticatedAuxiliaryData] {
        &self.auxiliary_data
    }

    pub fn first_sector_public_key_hash(&self) -> Option<&[u8]> {
        self.first_sector_public_key_hash.as_deref()
    }

    pub fn second_sector_public_key_hash(&self) -> Option<&[u8]> {
        self.second_sector_public_key_hash.as_deref()
    }

    pub fn hash_algorithm(&self) -> HashAlg {
        self.hash_algorithm
    }

    pub fn certificate_extensions(&self) -> &[CertificateExtension] {
        &self.certificate_extensions
    }
}

/// The authorizations effectively granted to the authenticated terminal
#[derive(Debug, Clone)]
pub struct EffectiveAuthorizationMechanism {
    authorization_store: AuthorizationStore,
}

impl EffectiveAuthorizationMechanism {
    pub fn new(authorization_store: AuthorizationStore) -> Self {
        Self {
            authorization_store,
        }
    }

    pub fn authorization_store(&self) -> &AuthorizationStore {
        &self.authorization_store
    }
}

/// The card-wide security status.
///
/// Protocols append mechanism entries as they succeed; nothing here is
/// removed short of a session teardown.
#[derive(Debug, Clone, Default)]
pub struct SecStatus {
    pace: Vec<PaceMechanism>,
    confined_authorization: Vec<ConfinedAuthorizationMechanism>,
    terminal_authentication: Vec<TerminalAuthenticationMechanism>,
    effective_authorization: Vec<EffectiveAuthorizationMechanism>,
}

impl SecStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pace_mechanism(&mut self, mechanism: PaceMechanism) {
        self.pace.push(mechanism);
    }

    pub fn add_confined_authorization_mechanism(
        &mut self,
        mechanism: ConfinedAuthorizationMechanism,
    ) {
        self.confined_authorization.push(mechanism);
    }

    pub fn add_terminal_authentication_mechanism(
        &mut self,
        mechanism: TerminalAuthenticationMechanism,
    ) {
        self.terminal_authentication.push(mechanism);
    }

    pub fn add_effective_authorization_mechanism(
        &mut self,
        mechanism: EffectiveAuthorizationMechanism,
    ) {
        self.effective_authorization.push(mechanism);
    }

    pub fn pace_mechanisms(&self) -> &[PaceMechanism] {
        &self.pace
    }

    pub fn confined_authorization_mechanisms(&self) -> &[ConfinedAuthorizationMechanism] {
        &self.confined_authorization
    }

    pub fn terminal_authentication_mechanisms(&self) -> &[TerminalAuthenticationMechanism] {
        &self.terminal_authentication
    }

    pub fn effective_authorization_mechanisms(&self) -> &[EffectiveAuthorizationMechanism] {
        &self.effective_authorization
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mechanisms_accumulate() {
        let mut status = SecStatus::new();
        assert!(status.pace_mechanisms().is_empty());
        assert!(status.terminal_authentication_mechanisms().is_empty());

        status.add_pace_mechanism(PaceMechanism::new(
            TerminalType::AuthenticationTerminal.as_oid(),
            vec![0x02; 33],
        ));
        status.add_confined_authorization_mechanism(ConfinedAuthorizationMechanism::new(
            AuthorizationStore::new(),
        ));

        assert_eq!(status.pace_mechanisms().len(), 1);
        assert_eq!(status.confined_authorization_mechanisms().len(), 1);
        assert_eq!(
            status.pace_mechanisms()[0].compressed_ephemeral_chip_public_key(),
            &[0x02; 33][..]
        );
    }
}
