use std::collections::HashMap;

use crate::cvcert::{CvCertificate, Date, TerminalType};
use crate::secstatus::SecStatus;

/// A certificate-authority anchor for one terminal type.
///
/// Keeps the latest imported CVCA certificate and the one it replaced, so a
/// terminal may still chain from the previous generation during rollover.
#[derive(Debug, Clone)]
pub struct TrustPoint {
    current: CvCertificate,
    previous: Option<CvCertificate>,
}

impl TrustPoint {
    pub fn new(current: CvCertificate) -> Self {
        Self {
            current,
            previous: None,
        }
    }

    pub fn current(&self) -> &CvCertificate {
        &self.current
    }

    pub fn previous(&self) -> Option<&CvCertificate> {
        self.previous.as_ref()
    }

    /// Permanent import of a new CVCA certificate: the current anchor moves
    /// to the previous slot.
    pub fn rollover(&mut self, new_cvca: CvCertificate) {
        self.previous = Some(std::mem::replace(&mut self.current, new_cvca));
    }
}

/// The trust points of the card, one per terminal type
#[derive(Debug, Clone, Default)]
pub struct TrustPointStore {
    points: HashMap<TerminalType, TrustPoint>,
}

impl TrustPointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, terminal_type: TerminalType, trust_point: TrustPoint) {
        self.points.insert(terminal_type, trust_point);
    }

    pub fn get(&self, terminal_type: TerminalType) -> Option<&TrustPoint> {
        self.points.get(&terminal_type)
    }

    pub fn get_mut(&mut self, terminal_type: TerminalType) -> Option<&mut TrustPoint> {
        self.points.get_mut(&terminal_type)
    }
}

/// The rolling chip-internal date.
///
/// Certificate imports may move it forward; it never runs backwards.
#[derive(Debug, Clone)]
pub struct CurrentDate {
    date: Date,
}

impl CurrentDate {
    pub fn new(date: Date) -> Self {
        Self { date }
    }

    pub fn date(&self) -> &Date {
        &self.date
    }

    /// Move the date forward; an earlier date leaves it untouched.
    pub fn advance_to(&mut self, date: Date) {
        if date > self.date {
            self.date = date;
        }
    }
}

/// Card-wide state shared with the protocol machines: trust points, the
/// chip date and the session security status
#[derive(Debug, Clone)]
pub struct CardState {
    trust_points: TrustPointStore,
    current_date: CurrentDate,
    sec_status: SecStatus,
}

impl CardState {
    pub fn new(date: Date) -> Self {
        Self {
            trust_points: TrustPointStore::new(),
            current_date: CurrentDate::new(date),
            sec_status: SecStatus::new(),
        }
    }

    pub fn trust_points(&self) -> &TrustPointStore {
        &self.trust_points
    }

    pub fn trust_points_mut(&mut self) -> &mut TrustPointStore {
        &mut self.trust_points
    }

    pub fn current_date(&self) -> &CurrentDate {
        &self.current_date
    }

    pub fn current_date_mut(&mut self) -> &mut CurrentDate {
        &mut self.current_date
    }

    pub fn sec_status(&self) -> &SecStatus {
        &self.sec_status
    }

    pub fn sec_status_mut(&mut self) -> &mut SecStatus {
        &mut self.sec_status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_date_is_monotonic() {
        let mut date = CurrentDate::new(Date::new(2025, 6, 1).unwrap());

        date.advance_to(Date::new(2024, 12, 31).unwrap());
        assert_eq!(date.date(), &Date::new(2025, 6, 1).unwrap());

        date.advance_to(Date::new(2025, 6, 2).unwrap());
        assert_eq!(date.date(), &Date::new(2025, 6, 2).unwrap());

        // equal date is not a move
        date.advance_to(Date::new(2025, 6, 2).unwrap());
        assert_eq!(date.date(), &Date::new(2025, 6, 2).unwrap());
    }
}
