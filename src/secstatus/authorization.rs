use std::collections::HashMap;

use rasn::types::ObjectIdentifier as Oid;

use crate::cvcert::RelativeAuthorization;

/// Effective authorizations per terminal-type object identifier.
///
/// Chain walks only ever narrow an entry: updating an existing
/// authorization is a bitwise AND with the incoming value, an unknown
/// object identifier adopts the incoming value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationStore {
    authorizations: HashMap<Oid, RelativeAuthorization>,
}

impl AuthorizationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style entry insertion, used when seeding the store
    pub fn with_authorization(mut self, oid: Oid, authorization: RelativeAuthorization) -> Self {
        self.authorizations.insert(oid, authorization);
        self
    }

    /// The current authorization for an object identifier, if any
    pub fn get_authorization(&self, oid: &Oid) -> Option<&RelativeAuthorization> {
        self.authorizations.get(oid)
    }

    /// Narrow the store by a set of incoming authorizations.
    pub fn update(&mut self, incoming: HashMap<Oid, RelativeAuthorization>) {
        for (oid, authorization) in incoming {
            let merged = match self.authorizations.get(&oid) {
                Some(existing) => existing.intersect(&authorization),
                None => authorization,
            };
            self.authorizations.insert(oid, merged);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.authorizations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.authorizations.len()
    }
}
