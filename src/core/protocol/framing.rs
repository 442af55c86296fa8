//! NMEA frame extraction
//!
//! Cuts `$...*XX\r\n` frames out of an arbitrary text stream. Garbage between
//! frames is skipped, candidates that fail structural or checksum validation
//! are discarded, and an unterminated tail can be handed back to the caller
//! so the next chunk completes it.

use super::checksum::{self, CHECKSUM_LENGTH};

// ============ Frame constants ============
/// Start of every frame
pub const START_FLAG: &str = "$";
/// Separates the sentence identifier and the data fields
pub const SEPARATOR: char = ',';
/// Separates the body from the checksum
pub const DELIMITER: char = '*';
/// End of every frame
pub const END_FLAG: &str = "\r\n";
/// Shortest possible frame: `$*XX\r\n`
pub const MINIMAL_LENGTH: usize = START_FLAG.len() + 1 + CHECKSUM_LENGTH + END_FLAG.len();

/// A structurally valid, checksum-verified frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Complete frame including `$` and `\r\n`
    pub raw: String,
    /// Sentence identifier, possibly still carrying a talker prefix
    pub sentence: String,
    /// Checksum transmitted with the frame
    pub checksum: u8,
    /// Data fields after the identifier
    pub fields: Vec<String>,
}

/// Why a candidate is not a frame
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameRejection {
    /// Shorter than `$*XX\r\n`
    #[error("frame shorter than {} characters", MINIMAL_LENGTH)]
    TooShort,
    /// Does not begin with `$`
    #[error("frame does not start with '$'")]
    MissingStart,
    /// Does not end with `\r\n`
    #[error("frame does not end with CRLF")]
    MissingEnd,
    /// No `,` anywhere
    #[error("frame contains no field separator")]
    MissingSeparator,
    /// Zero or several `*`
    #[error("frame contains {0} checksum delimiters, expected 1")]
    DelimiterCount(usize),
    /// Checksum is not two characters long
    #[error("checksum has {0} characters, expected 2")]
    ChecksumLength(usize),
    /// Checksum is not hexadecimal
    #[error("checksum '{0}' is not hexadecimal")]
    ChecksumDigits(String),
    /// Checksum does not match the body
    #[error("checksum mismatch: frame says {expected:02X}, body gives {computed:02X}")]
    ChecksumMismatch {
        /// Transmitted checksum
        expected: u8,
        /// Checksum of the received body
        computed: u8,
    },
}

/// Validate a single `$...\r\n` candidate and split it into its parts
pub fn parse_frame(candidate: &str) -> Result<RawFrame, FrameRejection> {
    if !candidate.starts_with(START_FLAG) {
        return Err(FrameRejection::MissingStart);
    }
    if !candidate.ends_with(END_FLAG) {
        return Err(FrameRejection::MissingEnd);
    }
    if candidate.len() < MINIMAL_LENGTH {
        return Err(FrameRejection::TooShort);
    }
    if !candidate.contains(SEPARATOR) {
        return Err(FrameRejection::MissingSeparator);
    }

    let inner = &candidate[START_FLAG.len()..candidate.len() - END_FLAG.len()];
    let mut parts = inner.split(DELIMITER);
    let (body, cs) = match (parts.next(), parts.next(), parts.next()) {
        (Some(body), Some(cs), None) => (body, cs),
        _ => return Err(FrameRejection::DelimiterCount(inner.matches(DELIMITER).count())),
    };
    if cs.len() != CHECKSUM_LENGTH {
        return Err(FrameRejection::ChecksumLength(cs.len()));
    }
    let expected = checksum::decode(cs).ok_or_else(|| FrameRejection::ChecksumDigits(cs.to_string()))?;
    let computed = checksum::calculate(body);
    if expected != computed {
        return Err(FrameRejection::ChecksumMismatch { expected, computed });
    }

    let mut tokens = body.split(SEPARATOR);
    let sentence = tokens.next().unwrap_or_default().to_string();
    let fields = tokens.map(str::to_string).collect();

    Ok(RawFrame {
        raw: candidate.to_string(),
        sentence,
        checksum: expected,
        fields,
    })
}

/// Build a frame from an identifier and already formatted field values
pub fn encode_frame<S: AsRef<str>>(sentence: &str, fields: &[S]) -> String {
    let mut body = String::from(sentence);
    for field in fields {
        body.push(SEPARATOR);
        body.push_str(field.as_ref());
    }
    let cs = checksum::calculate(&body);
    format!("{}{}{}{}{}", START_FLAG, body, DELIMITER, checksum::encode(u32::from(cs)), END_FLAG)
}

/// Output of one extraction pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Valid frames in stream order
    pub frames: Vec<RawFrame>,
    /// Unterminated tail starting at its `$`, when carry-over is enabled
    pub carry: String,
    /// Candidates that were discarded
    pub rejected: usize,
}

/// Extract every complete frame from `text`
///
/// Scanning resumes one character after the `$` of a rejected candidate, so
/// a valid frame hidden inside garbage is still found. With `carry_over`,
/// text from the last unterminated `$` onwards is returned in
/// [`Extraction::carry`]; otherwise it is dropped.
pub fn extract_frames(text: &str, carry_over: bool) -> Extraction {
    let mut out = Extraction::default();
    let mut pivot = 0;

    while pivot < text.len() {
        let start = match text[pivot..].find(START_FLAG) {
            Some(offset) => pivot + offset,
            None => break,
        };

        let search_from = start + START_FLAG.len();
        let end = match text[search_from..].find(END_FLAG) {
            Some(offset) => search_from + offset,
            None => {
                if carry_over {
                    out.carry = text[start..].to_string();
                }
                break;
            }
        };

        let candidate = &text[start..end + END_FLAG.len()];
        match parse_frame(candidate) {
            Ok(frame) => {
                out.frames.push(frame);
                pivot = end + END_FLAG.len();
            }
            Err(rejection) => {
                tracing::debug!("Discarding NMEA candidate {:?}: {}", candidate, rejection);
                out.rejected += 1;
                pivot = search_from;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const GGA: &str = "$GPGGA,074844.199,3652.514,N,00225.679,W,1,12,1.0,0.0,M,0.0,M,,*79\r\n";
    const GSA: &str = "$GPGSA,A,3,01,02,03,04,05,06,07,08,09,10,11,12,1.0,1.0,1.0*30\r\n";

    #[test]
    fn test_parse_frame() {
        let frame = parse_frame(GGA).unwrap();
        assert_eq!(frame.raw, GGA);
        assert_eq!(frame.sentence, "GPGGA");
        assert_eq!(frame.checksum, 0x79);
        assert_eq!(frame.fields.len(), 14);
        assert_eq!(frame.fields[0], "074844.199");
        assert_eq!(frame.fields[13], "");
    }

    #[test]
    fn test_parse_frame_rejections() {
        assert_eq!(parse_frame("GPGGA,1*00\r\n"), Err(FrameRejection::MissingStart));
        assert_eq!(parse_frame("$GPGGA,1*00"), Err(FrameRejection::MissingEnd));
        assert_eq!(parse_frame("$*0\r\n"), Err(FrameRejection::TooShort));
        assert_eq!(parse_frame("$GPHDT*00\r\n"), Err(FrameRejection::MissingSeparator));
        assert_eq!(parse_frame("$A,B\r\n"), Err(FrameRejection::DelimiterCount(0)));
        assert_eq!(parse_frame("$A,*B*00\r\n"), Err(FrameRejection::DelimiterCount(2)));
        assert_eq!(parse_frame("$A,B*123\r\n"), Err(FrameRejection::ChecksumLength(3)));
        assert_eq!(parse_frame("$A,B*ZZ\r\n"), Err(FrameRejection::ChecksumDigits("ZZ".into())));
        assert!(matches!(
            parse_frame("$GPGGA,074844.199,3652.514,N,00225.679,W,1,12,1.0,0.0,M,0.0,M,,*78\r\n"),
            Err(FrameRejection::ChecksumMismatch { expected: 0x78, computed: 0x79 })
        ));
    }

    #[test]
    fn test_encode_frame() {
        let fields = ["074844.199", "3652.514", "N", "00225.679", "W", "1", "12", "1.0", "0.0", "M", "0.0", "M", "", ""];
        assert_eq!(encode_frame("GPGGA", &fields), GGA);
    }

    #[test]
    fn test_extract_multiple_with_noise() {
        let text = format!("noise{}garbage$$${}tail", GGA, GSA);
        let out = extract_frames(&text, false);
        assert_eq!(out.frames.len(), 2);
        assert_eq!(out.frames[0].sentence, "GPGGA");
        assert_eq!(out.frames[1].sentence, "GPGSA");
        assert!(out.carry.is_empty());
    }

    #[test]
    fn test_resync_inside_garbage() {
        // broken frame whose span swallows the start of a valid one
        let text = format!("$GPGGA,12{}", GSA);
        let out = extract_frames(&text, false);
        assert_eq!(out.frames.len(), 1);
        assert_eq!(out.frames[0].raw, GSA);
        assert_eq!(out.rejected, 1);
    }

    #[test]
    fn test_carry_over() {
        let (head, tail) = GGA.split_at(20);

        let out = extract_frames(&format!("{}{}", GSA, head), true);
        assert_eq!(out.frames.len(), 1);
        assert_eq!(out.carry, head);

        let out = extract_frames(&format!("{}{}", out.carry, tail), true);
        assert_eq!(out.frames.len(), 1);
        assert_eq!(out.frames[0].raw, GGA);
        assert!(out.carry.is_empty());

        let out = extract_frames(head, false);
        assert!(out.frames.is_empty());
        assert!(out.carry.is_empty());
    }

    #[test]
    fn test_split_on_crlf() {
        // "\r" at the end of one chunk and "\n" at the start of the next
        let (head, tail) = GGA.split_at(GGA.len() - 1);
        let first = extract_frames(head, true);
        assert!(first.frames.is_empty());
        let second = extract_frames(&format!("{}{}", first.carry, tail), true);
        assert_eq!(second.frames.len(), 1);
    }

    #[test]
    fn test_no_start_flag() {
        let out = extract_frames("just some text\r\n", true);
        assert!(out.frames.is_empty());
        assert!(out.carry.is_empty());
        assert_eq!(out.rejected, 0);
    }
}
