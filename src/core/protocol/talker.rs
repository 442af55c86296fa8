//! Talker identifiers
//!
//! The characters preceding the 3-letter sentence code name the emitting
//! device (`GP` in `$GPGGA`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Description of talkers `U0`..`U9`
pub const USER_CONFIGURED: &str = "User Configured";

/// Description of proprietary `P...` talkers
pub const VENDOR_SPECIFIC: &str = "Vendor specific";

/// Description of anything else
pub const UNKNOWN_TALKER: &str = "unknown";

/// Resolved talker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Talker {
    /// Talker identifier as it appeared in the sentence
    pub id: String,
    /// Human description
    pub description: String,
}

static TALKERS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("AB", "Independent AIS Base Station"),
        ("AD", "Dependent AIS Base Station"),
        ("AG", "Heading Track Controller (Autopilot) - General"),
        ("AI", "Mobile Class A or B AIS Station"),
        ("AN", "AIS Aids to Navigation Station"),
        ("AP", "Heading Track Controller (Autopilot) - Magnetic"),
        ("AR", "AIS Receiving Station"),
        ("AS", "AIS Limited Base Station"),
        ("AT", "AIS Transmitting Station"),
        ("AX", "AIS Simplex Repeater Station"),
        ("BD", "BeiDou Navigation Satellite System"),
        ("BI", "Bilge Systems"),
        ("BN", "Bridge Navigational Watch Alarm System"),
        ("CA", "Central Alarm Management"),
        ("CD", "Digital Selective Calling (DSC)"),
        ("CR", "Data Receiver"),
        ("CS", "Satellite Communications"),
        ("CT", "Radio-Telephone (MF/HF)"),
        ("CV", "Radio-Telephone (VHF)"),
        ("CX", "Scanning Receiver"),
        ("DE", "DECCA Navigator"),
        ("DF", "Direction Finder"),
        ("DU", "Duplex Repeater Station"),
        ("EC", "Electronic Chart System (ECS)"),
        ("EI", "Electronic Chart Display & Information System (ECDIS)"),
        ("EP", "Emergency Position Indicating Beacon (EPIRB)"),
        ("ER", "Engine Room Monitoring Systems"),
        ("FD", "Fire Door Controller/Monitoring Point"),
        ("FE", "Fire Extinguisher System"),
        ("FR", "Fire Detection Point"),
        ("FS", "Fire Sprinkler System"),
        ("GA", "Galileo Positioning System"),
        ("GB", "BeiDou (BDS) Positioning System"),
        ("GI", "NavIC (IRNSS) Positioning System"),
        ("GL", "GLONASS Receiver"),
        ("GN", "Global Navigation Satellite System (GNSS)"),
        ("GP", "Global Positioning System receiver"),
        ("GQ", "QZSS Positioning System"),
        ("HC", "Compass, Magnetic"),
        ("HD", "Hull Door Controller/Monitoring Panel"),
        ("HE", "Gyro, North Seeking"),
        ("HF", "Fluxgate Compass"),
        ("HN", "Gyro, Non-North Seeking"),
        ("HS", "Hull Stress Monitoring"),
        ("II", "Integrated Instrumentation"),
        ("IN", "Integrated Navigation"),
        ("JA", "Alarm and Monitoring System"),
        ("JB", "Reefer Monitoring System"),
        ("JC", "Power Management System"),
        ("JD", "Propulsion Control System"),
        ("JE", "Engine Control Console"),
        ("JF", "Propulsion Boiler"),
        ("JG", "Auxiliary Boiler"),
        ("JH", "Electronic Governor System"),
        ("LA", "Loran A"),
        ("LC", "Loran C"),
        ("MP", "Microwave Positioning System"),
        ("MX", "Multiplexer"),
        ("NL", "Navigation Light Controller"),
        ("OM", "OMEGA Navigation System"),
        ("OS", "Distress Alarm System"),
        ("QZ", "QZSS Regional GPS Augmentation System"),
        ("RA", "RADAR and/or ARPA"),
        ("RB", "Record Book"),
        ("RC", "Propulsion Machinery including Remote Control"),
        ("RI", "Rudder Angle Indicator"),
        ("SA", "Physical Shore AIS Station"),
        ("SD", "Depth Sounder"),
        ("SG", "Steering Gear/Steering Engine"),
        ("SN", "Electronic Positioning System, other/general"),
        ("SS", "Scanning Sounder"),
        ("ST", "Skytraq Debug Output"),
        ("TC", "Track Control"),
        ("TI", "Turn Rate Indicator"),
        ("TR", "TRANSIT Navigation System"),
        ("UP", "Microprocessor Controller"),
        ("VA", "VHF Data Exchange System (VDES), ASM"),
        ("VD", "Velocity Sensor, Doppler, other/general"),
        ("VM", "Velocity Sensor, Speed Log, Water, Magnetic"),
        ("VR", "Voyage Data Recorder"),
        ("VS", "VHF Data Exchange System (VDES), Satellite"),
        ("VT", "VHF Data Exchange System (VDES), Terrestrial"),
        ("VW", "Velocity Sensor, Speed Log, Water, Mechanical"),
        ("WD", "Watertight Door Controller/Monitoring Panel"),
        ("WI", "Weather Instruments"),
        ("WL", "Water Level Detection Systems"),
        ("YC", "Transducer - Temperature"),
        ("YD", "Transducer - Displacement, Angular or Linear"),
        ("YF", "Transducer - Frequency"),
        ("YL", "Transducer - Level"),
        ("YP", "Transducer - Pressure"),
        ("YR", "Transducer - Flow Rate"),
        ("YT", "Transducer - Tachometer"),
        ("YV", "Transducer - Volume"),
        ("YX", "Transducer"),
        ("ZA", "Timekeeper - Atomic Clock"),
        ("ZC", "Timekeeper - Chronometer"),
        ("ZQ", "Timekeeper - Quartz"),
        ("ZV", "Timekeeper - Radio Update, WWV or WWVH"),
    ]
    .into_iter()
    .collect()
});

/// Resolve a talker prefix
///
/// Never fails: unrecognised prefixes resolve to [`UNKNOWN_TALKER`].
pub fn resolve(id: &str) -> Talker {
    let description = match TALKERS.get(id) {
        Some(description) => *description,
        None if is_user_configured(id) => USER_CONFIGURED,
        None if id.starts_with('P') => VENDOR_SPECIFIC,
        None => UNKNOWN_TALKER,
    };
    Talker {
        id: id.to_string(),
        description: description.to_string(),
    }
}

/// `U` followed by one decimal digit
fn is_user_configured(id: &str) -> bool {
    let bytes = id.as_bytes();
    bytes.len() == 2 && bytes[0] == b'U' && bytes[1].is_ascii_digit()
}

/// Number of talkers in the fixed table
pub fn known_count() -> usize {
    TALKERS.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_talkers() {
        let gp = resolve("GP");
        assert_eq!(gp.id, "GP");
        assert_eq!(gp.description, "Global Positioning System receiver");
        assert_eq!(resolve("HE").description, "Gyro, North Seeking");
        // exact table match, not a user configured code
        assert_eq!(resolve("UP").description, "Microprocessor Controller");
        assert!(known_count() >= 90);
    }

    #[test]
    fn test_user_configured() {
        assert_eq!(resolve("U8"), Talker { id: "U8".into(), description: USER_CONFIGURED.into() });
        assert_eq!(resolve("U0").description, USER_CONFIGURED);
        assert_eq!(resolve("UX").description, UNKNOWN_TALKER);
        assert_eq!(resolve("U12").description, UNKNOWN_TALKER);
    }

    #[test]
    fn test_vendor_specific() {
        assert_eq!(resolve("P").description, VENDOR_SPECIFIC);
        assert_eq!(resolve("PNORSUB").description, VENDOR_SPECIFIC);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(resolve("XX"), Talker { id: "XX".into(), description: "unknown".into() });
        assert_eq!(resolve("").description, UNKNOWN_TALKER);
    }
}
