//! Frame validation and field tokenization for GGA sentences.
//!
//! [`read_frame`](fn.read_frame.html) checks the outer `$...*XX` structure of
//! a sentence and its checksum, [`read_fields`](fn.read_fields.html) cuts the
//! validated payload into raw GGA fields. Neither converts any numbers.

use std::fmt;

use err::LexError;

const CHECKSUM_DELIMITER: char = '*';
const CHECKSUM_LENGTH: usize = 2;
const SENTENCE_TYPE_LENGTH: usize = 3;
const FIELD_SEPARATOR: char = ',';
const GGA: &str = "GGA";
const STATION_ID_LENGTH: usize = 4;
const LAT_SPLIT: usize = 2;
const LONG_SPLIT: usize = 3;

/// Talker ids a frame may start with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Talker {
    /// `GP`
    Gps,
    /// `GN`
    Gnss,
    /// `GL`
    Glonass,
    /// `HE`, north seeking gyro
    Heading,
    /// `AI`
    Ais,
    /// `P`, proprietary sentence
    Proprietary,
}

// Two letter ids come first so `P` never shadows them.
const TALKERS: [(&str, Talker); 6] = [
    ("GP", Talker::Gps),
    ("GN", Talker::Gnss),
    ("GL", Talker::Glonass),
    ("HE", Talker::Heading),
    ("AI", Talker::Ais),
    ("P", Talker::Proprietary),
];

impl Talker {
    /// The talker id as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match *self {
            Talker::Gps => "GP",
            Talker::Gnss => "GN",
            Talker::Glonass => "GL",
            Talker::Heading => "HE",
            Talker::Ais => "AI",
            Talker::Proprietary => "P",
        }
    }

    /// Split a known talker id off the front of `payload`.
    fn split(payload: &str) -> Option<(Talker, &str)> {
        TALKERS
            .iter()
            .find(|&&(id, _)| payload.starts_with(id))
            .map(|&(id, talker)| (talker, &payload[id.len()..]))
    }
}

impl fmt::Display for Talker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated GGA frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<'a> {
    pub talker: Talker,
    /// Everything between the start delimiter and `*`, i.e. talker id,
    /// sentence type and data fields.
    pub payload: &'a str,
    pub checksum: u8,
}

/// The raw fields of a GGA payload. Optional groups that were omitted are
/// `None`, never an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GgaFields<'a> {
    pub hour: &'a str,
    pub minute: &'a str,
    pub second: &'a str,
    pub fraction: Option<&'a str>,
    pub lat_degrees: &'a str,
    pub lat_minutes: &'a str,
    pub lat_hemisphere: &'a str,
    pub long_degrees: &'a str,
    pub long_minutes: &'a str,
    pub long_hemisphere: &'a str,
    pub quality: &'a str,
    pub satellites: &'a str,
    pub hdop: &'a str,
    pub altitude: Option<&'a str>,
    pub geo_sep: Option<&'a str>,
    pub age: Option<&'a str>,
    pub station_id: Option<&'a str>,
    pub faa_mode: Option<&'a str>,
}

/// XOR of all bytes of `payload`.
pub fn checksum(payload: &[u8]) -> u8 {
    payload.iter().fold(0, |acc, b| acc ^ b)
}

/// Validate the frame of `sentence` and return its payload.
///
/// The sentence has to start with `'$'` or `'!'` and end with `*` followed
/// by two uppercase hex digits; surrounding whitespace such as the line ending is
/// ignored. Only `GGA` sentences are accepted, and the checksum has to match.
pub fn read_frame(sentence: &str) -> Result<Frame, LexError> {
    let sentence = sentence.trim();
    if !sentence.is_ascii() {
        return Err(LexError::MalformedFrame("non-ASCII character"));
    }
    if !sentence.starts_with('$') && !sentence.starts_with('!') {
        return Err(LexError::MalformedFrame("missing start delimiter"));
    }

    let star = match sentence.rfind(CHECKSUM_DELIMITER) {
        Some(i) => i,
        None => return Err(LexError::MalformedFrame("missing checksum")),
    };
    let payload = &sentence[1..star];
    let declared = &sentence[star + 1..];
    if declared.len() != CHECKSUM_LENGTH || !declared.bytes().all(is_upper_hex) {
        return Err(LexError::MalformedFrame("checksum must be two uppercase hex digits"));
    }
    let declared = u8::from_str_radix(declared, 16)
        .map_err(|_| LexError::MalformedFrame("checksum must be two uppercase hex digits"))?;

    let (talker, rest) = match Talker::split(payload) {
        Some(v) => v,
        None => return Err(LexError::MalformedFrame("unknown talker id")),
    };
    // sentence type, separator and at least one data character
    if rest.len() < SENTENCE_TYPE_LENGTH + 2 {
        return Err(LexError::MalformedFrame("missing data fields"));
    }
    let (sen_type, data) = rest.split_at(SENTENCE_TYPE_LENGTH);
    if !sen_type.bytes().all(is_word) {
        return Err(LexError::MalformedFrame("invalid sentence type"));
    }
    if !data.starts_with(FIELD_SEPARATOR) {
        return Err(LexError::MalformedFrame("missing data fields"));
    }

    if !sen_type.eq_ignore_ascii_case(GGA) {
        return Err(LexError::UnsupportedSentenceType(sen_type.to_owned()));
    }

    let expected = checksum(payload.as_bytes());
    if expected != declared {
        return Err((expected, declared).into());
    }

    Ok(Frame {
        talker,
        payload,
        checksum: declared,
    })
}

/// Cut a validated GGA payload into its fields.
///
/// The payload still starts with talker id and sentence type, that field is
/// skipped. Fails with `LexError::MalformedPayload` naming the first field
/// that does not fit the GGA layout.
pub fn read_fields(payload: &str) -> Result<GgaFields, LexError> {
    if !payload.is_ascii() {
        return Err(LexError::MalformedPayload("payload"));
    }
    let mut fields = payload.split(FIELD_SEPARATOR);

    expect_field!(fields, "sentence type");

    let time = expect_field!(fields, "time", is_time);
    let (hour, rest) = time.split_at(2);
    let (minute, rest) = rest.split_at(2);
    let (second, rest) = rest.split_at(2);
    let fraction = match rest.trim_start_matches('.') {
        "" => None,
        f => Some(f),
    };

    let lat = expect_field!(fields, "latitude", is_latitude);
    let (lat_degrees, lat_minutes) = lat.split_at(LAT_SPLIT);
    let lat_hemisphere = expect_field!(fields, "latitude hemisphere", |f: &str| f == "N" || f == "S");

    let long = expect_field!(fields, "longitude", is_longitude);
    let (long_degrees, long_minutes) = long.split_at(LONG_SPLIT);
    let long_hemisphere = expect_field!(fields, "longitude hemisphere", |f: &str| f == "E" || f == "W");

    // The table in the decoder knows 9 (WAAS) as well, the grammar stops at 8.
    let quality = expect_field!(fields, "quality", |f: &str| {
        f.len() == 1 && f.as_bytes()[0] >= b'0' && f.as_bytes()[0] <= b'8'
    });
    let satellites = expect_field!(fields, "satellites", |f: &str| {
        !f.is_empty() && f.len() <= 3 && is_digits(f)
    });
    let hdop = expect_field!(fields, "hdop", is_hdop);

    let altitude = accept_field!(fields, "altitude", is_signed_decimal_or_dash);
    expect_field!(fields, "altitude unit", is_unit);
    let geo_sep = accept_field!(fields, "geoidal separation", is_signed_decimal_or_dash);
    expect_field!(fields, "geoidal separation unit", is_unit);
    let age = accept_field!(fields, "age", |f: &str| f == "-" || is_decimal(f));
    let station_id = accept_field!(fields, "station id", |f: &str| {
        f.len() == STATION_ID_LENGTH && f.bytes().all(is_word)
    });

    let faa_mode = match fields.next() {
        Some("") | None => None,
        Some(f) => Some(f),
    };
    if fields.next().is_some() {
        return Err(LexError::MalformedPayload("trailing"));
    }

    Ok(GgaFields {
        hour,
        minute,
        second,
        fraction,
        lat_degrees,
        lat_minutes,
        lat_hemisphere,
        long_degrees,
        long_minutes,
        long_hemisphere,
        quality,
        satellites,
        hdop,
        altitude: altitude.filter(|f| *f != "-"),
        geo_sep: geo_sep.filter(|f| *f != "-"),
        age: age.filter(|f| *f != "-"),
        station_id,
        faa_mode,
    })
}

#[inline]
fn is_upper_hex(b: u8) -> bool {
    b.is_ascii_digit() || (b'A'..=b'F').contains(&b)
}

#[inline]
fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[inline]
fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

/// `\d+(\.\d+)?`
fn is_decimal(s: &str) -> bool {
    let mut parts = s.splitn(2, '.');
    let int = parts.next().unwrap_or("");
    let frac = parts.next();
    !int.is_empty() && is_digits(int) && frac.map_or(true, |f| !f.is_empty() && is_digits(f))
}

/// `-?\d+(\.\d+)?` or a lone `-`
fn is_signed_decimal_or_dash(s: &str) -> bool {
    let unsigned = if s.starts_with('-') { &s[1..] } else { s };
    s == "-" || is_decimal(unsigned)
}

/// `\d{1,3}(\.\d+)?`
fn is_hdop(s: &str) -> bool {
    let int_len = s.find('.').unwrap_or_else(|| s.len());
    is_decimal(s) && int_len <= 3
}

/// `hhmmss`, optionally followed by `.` and fractional digits. The dot may
/// be missing, some receivers send `hhmmssff`.
fn is_time(s: &str) -> bool {
    if s.len() < 6 || !is_digits(&s[..6]) {
        return false;
    }
    let rest = &s[6..];
    let digits = if rest.starts_with('.') { &rest[1..] } else { rest };
    is_digits(digits)
}

/// Degrees of `split` digits followed by minutes `\d{2}\.\d+`
fn is_coordinate(s: &str, split: usize) -> bool {
    s.len() > split + 3
        && is_digits(&s[..split + 2])
        && s.as_bytes()[split + 2] == b'.'
        && is_digits(&s[split + 3..])
}

fn is_latitude(s: &str) -> bool {
    is_coordinate(s, LAT_SPLIT)
}

fn is_longitude(s: &str) -> bool {
    is_coordinate(s, LONG_SPLIT)
}

fn is_unit(s: &str) -> bool {
    s.is_empty() || s == "M" || s == "-"
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTENCE: &str =
        "$GPGGA,134658.00,5106.9792,N,11402.3003,W,2,09,1.0,1048.47,M,-16.27,M,08,AAAA*60";

    /// Frame `payload` with a correct checksum.
    fn frame(payload: &str) -> String {
        format!("${}*{:02X}", payload, checksum(payload.as_bytes()))
    }

    #[test]
    fn checksum_of_reference_sentence() {
        let payload = "GPGGA,134658.00,5106.9792,N,11402.3003,W,2,09,1.0,1048.47,M,-16.27,M,08,AAAA";
        assert_eq!(checksum(payload.as_bytes()), 0x60);
        assert_eq!(checksum(b""), 0);
    }

    #[test]
    fn read_valid_frame() {
        let frame = read_frame(SENTENCE).unwrap();
        assert_eq!(frame.talker, Talker::Gps);
        assert_eq!(frame.checksum, 0x60);
        assert!(frame.payload.starts_with("GPGGA,134658.00"));
        assert!(frame.payload.ends_with(",08,AAAA"));
    }

    #[test]
    fn read_frame_ignores_line_ending() {
        let line = format!("{}\r\n", SENTENCE);
        assert_matches!(read_frame(&line), Ok(Frame { checksum: 0x60, .. }));
    }

    #[test]
    fn read_frame_accepts_other_talkers_and_delimiters() {
        let gn = frame("GNGGA,000000,0000.0,N,00000.0,E,0,0,0,,,,,,");
        assert_matches!(read_frame(&gn), Ok(Frame { talker: Talker::Gnss, .. }));

        let p = frame("PGGA,000000,0000.0,N,00000.0,E,0,0,0,,,,,,");
        assert_matches!(read_frame(&p), Ok(Frame { talker: Talker::Proprietary, .. }));

        let bang = frame("AIGGA,000000,0000.0,N,00000.0,E,0,0,0,,,,,,").replacen('$', "!", 1);
        assert_matches!(read_frame(&bang), Ok(Frame { talker: Talker::Ais, .. }));
    }

    #[test]
    fn read_frame_accepts_lowercase_sentence_type() {
        let sentence = frame("GPgga,134658.00,5106.9792,N,11402.3003,W,2,09,1.0,,,,,,");
        assert_matches!(read_frame(&sentence), Ok(Frame { talker: Talker::Gps, .. }));
    }

    #[test]
    fn read_frame_rejects_lowercase_checksum() {
        let payload = "GPGGA,134658.00,5106.9792,N,11402.3003,W,2,09,1.0,1048.47,M,-16.27,M,08,AAHB";
        assert_eq!(checksum(payload.as_bytes()), 0x6A);
        let upper = format!("${}*6A", payload);
        assert_matches!(read_frame(&upper), Ok(Frame { checksum: 0x6A, .. }));
        let lower = format!("${}*6a", payload);
        assert_matches!(read_frame(&lower), Err(LexError::MalformedFrame(_)));
    }

    #[test]
    fn malformed_frames() {
        assert_matches!(read_frame(""), Err(LexError::MalformedFrame(_)));
        assert_matches!(
            read_frame("GPGGA,134658.00*60"),
            Err(LexError::MalformedFrame("missing start delimiter"))
        );
        assert_matches!(
            read_frame("$GPGGA,134658.00"),
            Err(LexError::MalformedFrame("missing checksum"))
        );
        assert_matches!(
            read_frame("$GPGGA,134658.00*6"),
            Err(LexError::MalformedFrame(_))
        );
        assert_matches!(
            read_frame("$GPGGA,134658.00*6G"),
            Err(LexError::MalformedFrame(_))
        );
        assert_matches!(
            read_frame(&frame("XXGGA,134658.00")),
            Err(LexError::MalformedFrame("unknown talker id"))
        );
        assert_matches!(
            read_frame(&frame("GPGGA,")),
            Err(LexError::MalformedFrame("missing data fields"))
        );
        assert_matches!(
            read_frame(&frame("GPGGAA,1")),
            Err(LexError::MalformedFrame("missing data fields"))
        );
        assert_matches!(
            read_frame("$GPGGA,1°*00"),
            Err(LexError::MalformedFrame("non-ASCII character"))
        );
    }

    #[test]
    fn unsupported_sentence_type() {
        let rmc = frame("GPRMC,134658.00,A,5106.9792,N,11402.3003,W,0.0,0.0,010118,,");
        assert_matches!(
            read_frame(&rmc),
            Err(LexError::UnsupportedSentenceType(ref t)) if t == "RMC"
        );
    }

    #[test]
    fn sentence_type_is_checked_before_checksum() {
        assert_matches!(
            read_frame("$GPRMC,1*00"),
            Err(LexError::UnsupportedSentenceType(_))
        );
    }

    #[test]
    fn checksum_mismatch_reports_both_values() {
        let bad = SENTENCE.replace("*60", "*61");
        assert_matches!(read_frame(&bad), Err(LexError::InvalidChecksum(0x60, 0x61)));
    }

    #[test]
    fn checksum_fires_iff_declared_differs() {
        let payload = "GPGGA,134658.00,5106.9792,N,11402.3003,W,2,09,1.0,1048.47,M,-16.27,M,08,AAAA";
        for declared in 0..=255u8 {
            let sentence = format!("${}*{:02X}", payload, declared);
            let result = read_frame(&sentence);
            if declared == 0x60 {
                assert_matches!(result, Ok(_));
            } else {
                assert_matches!(result, Err(LexError::InvalidChecksum(0x60, d)) if d == declared);
            }
        }
    }

    #[test]
    fn read_all_fields() {
        let payload = "GPGGA,134658.00,5106.9792,N,11402.3003,W,2,09,1.0,1048.47,M,-16.27,M,08,AAAA";
        let fields = read_fields(payload).unwrap();
        assert_eq!(
            fields,
            GgaFields {
                hour: "13",
                minute: "46",
                second: "58",
                fraction: Some("00"),
                lat_degrees: "51",
                lat_minutes: "06.9792",
                lat_hemisphere: "N",
                long_degrees: "114",
                long_minutes: "02.3003",
                long_hemisphere: "W",
                quality: "2",
                satellites: "09",
                hdop: "1.0",
                altitude: Some("1048.47"),
                geo_sep: Some("-16.27"),
                age: Some("08"),
                station_id: Some("AAAA"),
                faa_mode: None,
            }
        );
    }

    #[test]
    fn fraction_without_dot() {
        let fields = read_fields("GPGGA,13465825,5106.9792,N,11402.3003,W,1,9,1,,,,,,").unwrap();
        assert_eq!((fields.hour, fields.minute, fields.second), ("13", "46", "58"));
        assert_eq!(fields.fraction, Some("25"));
    }

    #[test]
    fn omitted_optional_fields_are_none() {
        let fields = read_fields("GPGGA,134658,5106.9792,S,11402.3003,E,1,9,1,,,,,,").unwrap();
        assert_eq!(fields.fraction, None);
        assert_eq!(fields.altitude, None);
        assert_eq!(fields.geo_sep, None);
        assert_eq!(fields.age, None);
        assert_eq!(fields.station_id, None);
        assert_eq!(fields.faa_mode, None);

        let dashes = read_fields("GPGGA,134658.,5106.9792,S,11402.3003,E,1,9,1,-,-,-,-,-,").unwrap();
        assert_eq!(dashes.fraction, None);
        assert_eq!(dashes.altitude, None);
        assert_eq!(dashes.geo_sep, None);
        assert_eq!(dashes.age, None);
    }

    #[test]
    fn faa_mode_is_captured_raw() {
        let fields =
            read_fields("GNGGA,134658.00,5106.9792,N,11402.3003,W,1,12,0.9,1048.47,M,-16.27,M,,,D")
                .unwrap();
        assert_eq!(fields.station_id, None);
        assert_eq!(fields.faa_mode, Some("D"));

        let unknown =
            read_fields("GNGGA,134658.00,5106.9792,N,11402.3003,W,1,12,0.9,1048.47,M,-16.27,M,,,X")
                .unwrap();
        assert_eq!(unknown.faa_mode, Some("X"));
    }

    #[test]
    fn malformed_payload_names_the_field() {
        let cases = [
            ("GPGGA,1346,5106.9792,N,11402.3003,W,2,09,1.0,,,,,,", "time"),
            ("GPGGA,134658.0a,5106.9792,N,11402.3003,W,2,09,1.0,,,,,,", "time"),
            ("GPGGA,134658..0,5106.9792,N,11402.3003,W,2,09,1.0,,,,,,", "time"),
            ("GPGGA,134658,51069792,N,11402.3003,W,2,09,1.0,,,,,,", "latitude"),
            ("GPGGA,134658,5106.9792,X,11402.3003,W,2,09,1.0,,,,,,", "latitude hemisphere"),
            ("GPGGA,134658,5106.9792,N,1402.3003,W,2,09,1.0,,,,,,", "longitude"),
            ("GPGGA,134658,5106.9792,N,11402.3003,N,2,09,1.0,,,,,,", "longitude hemisphere"),
            ("GPGGA,134658,5106.9792,N,11402.3003,W,9,09,1.0,,,,,,", "quality"),
            ("GPGGA,134658,5106.9792,N,11402.3003,W,2,1234,1.0,,,,,,", "satellites"),
            ("GPGGA,134658,5106.9792,N,11402.3003,W,2,09,1234.0,,,,,,", "hdop"),
            ("GPGGA,134658,5106.9792,N,11402.3003,W,2,09,1.,,,,,,", "hdop"),
            ("GPGGA,134658,5106.9792,N,11402.3003,W,2,09,1.0,--1,,,,,", "altitude"),
            ("GPGGA,134658,5106.9792,N,11402.3003,W,2,09,1.0,1,F,,,,", "altitude unit"),
            ("GPGGA,134658,5106.9792,N,11402.3003,W,2,09,1.0,1,M,x,M,,", "geoidal separation"),
            ("GPGGA,134658,5106.9792,N,11402.3003,W,2,09,1.0,1,M,1,M,-8,", "age"),
            ("GPGGA,134658,5106.9792,N,11402.3003,W,2,09,1.0,1,M,1,M,8,AB", "station id"),
            ("GPGGA,134658,5106.9792,N,11402.3003,W,2,09,1.0,1,M,1,M,8", "station id"),
            ("GPGGA,134658,5106.9792,N,11402.3003,W,2,09,1.0,1,M,1,M,8,,A,B", "trailing"),
            ("GPGGA", "time"),
        ];
        for &(payload, field) in cases.iter() {
            match read_fields(payload) {
                Err(LexError::MalformedPayload(f)) => assert_eq!(f, field, "{}", payload),
                other => panic!("{}: unexpected {:?}", payload, other),
            }
        }
    }

    #[test]
    fn decimal_grammar() {
        assert!(is_decimal("0"));
        assert!(is_decimal("08"));
        assert!(is_decimal("1048.47"));
        assert!(!is_decimal(""));
        assert!(!is_decimal("1."));
        assert!(!is_decimal(".5"));
        assert!(!is_decimal("-1"));
        assert!(is_signed_decimal_or_dash("-16.27"));
        assert!(is_signed_decimal_or_dash("-"));
        assert!(!is_signed_decimal_or_dash("--16"));
        assert!(!is_signed_decimal_or_dash("1-"));
    }

    #[test]
    fn talker_display() {
        assert_eq!(Talker::Gps.to_string(), "GP");
        assert_eq!(Talker::Proprietary.to_string(), "P");
    }
}
