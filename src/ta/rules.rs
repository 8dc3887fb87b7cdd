//! Chain-validation predicates of TR-03110 v2.10, section 2.6.2.

use crate::cvcert::{AccessRole, Date};

/// Role compatibility between a candidate certificate and its issuer:
/// certificate authorities sign authorities and document verifiers,
/// document verifiers sign terminals.
pub fn is_issuer_role_valid(candidate: AccessRole, issuer: AccessRole) -> bool {
    if (candidate.is_cvca() || candidate.is_dv()) && !issuer.is_cvca() {
        return false;
    }
    if candidate.is_terminal() && !issuer.is_dv() {
        return false;
    }
    true
}

/// Validity of a chain link against the chip date.
///
/// Link certificates may always be imported, even through an expired
/// authority; the chip date is the safety net. DV and terminal
/// certificates must not be expired, and when chaining directly from an
/// authority the authority itself must not be expired either. Expiration
/// dates are inclusive.
pub fn is_chain_link_valid(
    candidate_role: AccessRole,
    candidate_expiration: &Date,
    issuer_role: AccessRole,
    issuer_expiration: &Date,
    chip_date: &Date,
) -> bool {
    if issuer_role.is_cvca() {
        if candidate_role.is_cvca() {
            true
        } else {
            chip_date <= issuer_expiration && chip_date <= candidate_expiration
        }
    } else {
        chip_date <= candidate_expiration
    }
}

/// The new chip date caused by importing a certificate, if any.
///
/// Only authorities and official domestic document verifiers are trusted
/// as time sources, and the date only ever moves forward.
pub fn effective_date_update(
    candidate_role: AccessRole,
    candidate_effective: &Date,
    issuer_role: AccessRole,
    chip_date: &Date,
) -> Option<Date> {
    if chip_date < candidate_effective
        && (candidate_role.is_cvca()
            || candidate_role.is_domestic_dv()
            || issuer_role.is_domestic_dv())
    {
        Some(candidate_effective.clone())
    } else {
        None
    }
}
