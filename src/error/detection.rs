// Detection error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Detection error code constants
///
/// Error code range: 2001-2005
pub struct DetectionErrorCodes {}

impl DetectionErrorCodes {
    /// Threshold sweep never produced four contacts
    pub const CONTACT_COUNT: i32 = 2001;

    /// A contact has no static support interval
    pub const NO_STATIC_PERIOD: i32 = 2002;

    /// A jump landmark could not be located
    pub const LANDMARK_NOT_FOUND: i32 = 2003;

    /// Assembled phase boundaries are out of order
    pub const PHASE_ORDER: i32 = 2004;

    /// No constant-slope run isolates the flight phase
    pub const FLIGHT_NOT_FOUND: i32 = 2005;
}

/// Jump boundary searched for inside a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landmark {
    EventStart,
    EventEnd,
    EccentricStart,
    ConcentricStart,
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Landmark::EventStart => "start of jump",
            Landmark::EventEnd => "end of jump",
            Landmark::EccentricStart => "eccentric start",
            Landmark::ConcentricStart => "concentric start",
        };
        f.write_str(label)
    }
}

/// Log a detection error with structured context
pub fn log_detection_error(err: &DetectionError, context: &str) {
    error!(
        "Detection error in {}: code={}, component=Segmentation, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Segmentation and landmark failures
///
/// The data was well-formed but the jumps could not be isolated. None of
/// these are retried.
///
/// Error code range: 2001-2005
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionError {
    /// Threshold sweep exhausted; counts are from the last attempt
    ContactCount {
        ceiling_n: f64,
        liftoffs: usize,
        landings: usize,
    },

    /// Contact (1-based) has no paired static run
    NoStaticPeriod { contact: usize },

    /// Landmark could not be identified within a contact (1-based)
    LandmarkNotFound { contact: usize, landmark: Landmark },

    /// Boundaries of a jump (1-based) violate the ordering invariant
    PhaseOrder { jump: usize, detail: String },

    /// No flight run after the pre-takeoff velocity peak
    FlightNotFound { jump: usize },
}

impl ErrorCode for DetectionError {
    fn code(&self) -> i32 {
        match self {
            DetectionError::ContactCount { .. } => DetectionErrorCodes::CONTACT_COUNT,
            DetectionError::NoStaticPeriod { .. } => DetectionErrorCodes::NO_STATIC_PERIOD,
            DetectionError::LandmarkNotFound { .. } => DetectionErrorCodes::LANDMARK_NOT_FOUND,
            DetectionError::PhaseOrder { .. } => DetectionErrorCodes::PHASE_ORDER,
            DetectionError::FlightNotFound { .. } => DetectionErrorCodes::FLIGHT_NOT_FOUND,
        }
    }

    fn message(&self) -> String {
        match self {
            DetectionError::ContactCount {
                ceiling_n,
                liftoffs,
                landings,
            } => format!(
                "Could not segment three jumps below {} N (last attempt: {} liftoffs, {} landings)",
                ceiling_n, liftoffs, landings
            ),
            DetectionError::NoStaticPeriod { contact } => {
                format!("Contact {} has no static support period", contact)
            }
            DetectionError::LandmarkNotFound { contact, landmark } => {
                format!("Could not identify {} in contact {}", landmark, contact)
            }
            DetectionError::PhaseOrder { jump, detail } => {
                format!("Phase boundaries of jump {} are out of order: {}", jump, detail)
            }
            DetectionError::FlightNotFound { jump } => {
                format!("Could not isolate the flight phase of jump {}", jump)
            }
        }
    }
}

impl fmt::Display for DetectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DetectionError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for DetectionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_error_codes() {
        assert_eq!(
            DetectionError::ContactCount {
                ceiling_n: 100.0,
                liftoffs: 0,
                landings: 0
            }
            .code(),
            DetectionErrorCodes::CONTACT_COUNT
        );
        assert_eq!(
            DetectionError::LandmarkNotFound {
                contact: 2,
                landmark: Landmark::EventEnd
            }
            .code(),
            DetectionErrorCodes::LANDMARK_NOT_FOUND
        );
        assert_eq!(
            DetectionError::PhaseOrder {
                jump: 1,
                detail: String::new()
            }
            .code(),
            DetectionErrorCodes::PHASE_ORDER
        );
    }

    #[test]
    fn test_landmark_message() {
        let err = DetectionError::LandmarkNotFound {
            contact: 3,
            landmark: Landmark::EventEnd,
        };
        assert_eq!(err.message(), "Could not identify end of jump in contact 3");
    }
}
