//! This module provides the decoder for the *GGA* sentence of the *NMEA 0183*
//! protocol.

use arrayvec::ArrayString;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use err::{LexError, ParseError};
use lexer::{self, Talker};

const MAX_NANO_DIGITS: usize = 9;

/// The cardinal directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CardDir {
    North,
    South,
    East,
    West,
}

impl CardDir {
    /// Takes a hemisphere field as validated by the lexer.
    #[inline]
    fn from_field(field: &str) -> Result<Self, ParseError> {
        match field {
            "N" => Ok(CardDir::North),
            "S" => Ok(CardDir::South),
            "E" => Ok(CardDir::East),
            "W" => Ok(CardDir::West),
            // unreachable for fields that went through `lexer::read_fields`
            _ => Err(LexError::MalformedPayload("hemisphere").into()),
        }
    }

    #[inline]
    fn get_sign(&self) -> f64 {
        match *self {
            CardDir::North | CardDir::East => 1.0,
            CardDir::South | CardDir::West => -1.0,
        }
    }
}

/// Indicator of the quality of gps data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixQuality {
    Invalid,
    GpsFix,
    DgpsFix,
    PpsFix,
    RealTimeKinematic,
    FloatRtk,
    DeadReckoning,
    ManualInput,
    Simulation,
    Waas,
}

impl FixQuality {
    /// Takes an integer in the range `0..=9` and returns the corresponding
    /// `FixQuality`.
    /// Else `ParseError::InvalidQuality` is returned.
    pub fn from_code(code: u8) -> Result<Self, ParseError> {
        match code {
            0 => Ok(FixQuality::Invalid),
            1 => Ok(FixQuality::GpsFix),
            2 => Ok(FixQuality::DgpsFix),
            3 => Ok(FixQuality::PpsFix),
            4 => Ok(FixQuality::RealTimeKinematic),
            5 => Ok(FixQuality::FloatRtk),
            6 => Ok(FixQuality::DeadReckoning),
            7 => Ok(FixQuality::ManualInput),
            8 => Ok(FixQuality::Simulation),
            9 => Ok(FixQuality::Waas),
            _ => Err(ParseError::InvalidQuality(code)),
        }
    }

    /// The numeric indicator as sent on the wire.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn description(&self) -> &'static str {
        match *self {
            FixQuality::Invalid => "Invalid",
            FixQuality::GpsFix => "GPS fix (single point)",
            FixQuality::DgpsFix => "DGPS fix",
            FixQuality::PpsFix => "PPS fix",
            FixQuality::RealTimeKinematic => "Real Time Kinematic",
            FixQuality::FloatRtk => "Float RTK",
            FixQuality::DeadReckoning => "Dead reckoning mode",
            FixQuality::ManualInput => "Manual input mode",
            FixQuality::Simulation => "Simulation mode",
            FixQuality::Waas => "WAAS",
        }
    }
}

impl fmt::Display for FixQuality {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.description())
    }
}

/// FAA mode indicator, appended by NMEA 2.3 and later receivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaaMode {
    Autonomous,
    Differential,
    Estimated,
    ManualInput,
    Simulated,
    NotValid,
    Precise,
}

impl FaaMode {
    /// Unknown letters are not an error, they yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(FaaMode::Autonomous),
            "D" => Some(FaaMode::Differential),
            "E" => Some(FaaMode::Estimated),
            "M" => Some(FaaMode::ManualInput),
            "S" => Some(FaaMode::Simulated),
            "N" => Some(FaaMode::NotValid),
            "P" => Some(FaaMode::Precise),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match *self {
            FaaMode::Autonomous => 'A',
            FaaMode::Differential => 'D',
            FaaMode::Estimated => 'E',
            FaaMode::ManualInput => 'M',
            FaaMode::Simulated => 'S',
            FaaMode::NotValid => 'N',
            FaaMode::Precise => 'P',
        }
    }

    pub fn description(&self) -> &'static str {
        match *self {
            FaaMode::Autonomous => "Autonomous",
            FaaMode::Differential => "Differential",
            FaaMode::Estimated => "Estimated",
            FaaMode::ManualInput => "Manual input",
            FaaMode::Simulated => "Simulated",
            FaaMode::NotValid => "Not Valid",
            FaaMode::Precise => "Precise",
        }
    }
}

impl fmt::Display for FaaMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.description())
    }
}

/// Differential reference station id, always four characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationId(ArrayString<[u8; 4]>);

impl StationId {
    fn from_field(field: &str) -> Result<Self, ParseError> {
        ArrayString::from(field)
            .map(StationId)
            .map_err(|_| LexError::MalformedPayload("station id").into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for StationId {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// This represents a correct GGA sentence and can be created by a
/// [GgaParser](../parser/struct.GgaParser.html)
#[derive(Debug, Clone, PartialEq)]
pub struct GgaFix {
    /// Talker id contained in the header of the sentence.
    pub talker: Talker,
    /// Time of the fix. The sentence only carries the time of day, the date is
    /// the reference date of the parser.
    pub timestamp: DateTime<Utc>,
    /// Latitude in decimal degrees.
    /// A positive value indicates that the coordinate is in the northern hemisphere.
    /// A negative value indicates that the coordinate is in the southern hemisphere.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    /// A positive value indicates that the coordinate is in the eastern hemisphere.
    /// A negative value indicates that the coordinate is in the western hemisphere.
    pub longitude: f64,
    /// Indicates the quality of the gps data.
    pub quality: FixQuality,
    /// Number of satellites in view.
    pub satellites: u16,
    /// Horizontal dilution of precision
    pub hdop: f64,
    /// Antenna Altitude above/below mean-sea-level (geoid) (in meters)
    pub altitude: Option<f64>,
    /// Geoidal separation, the difference between the WGS-84 earth ellipsoid
    /// and mean-sea-level (geoid), "-" means mean-sea-level below ellipsoid
    pub geoid_separation: Option<f64>,
    /// Age of differential GPS data, time in seconds since last SC104 type
    /// 1 or 9 update, null field when DGPS is not used
    pub differential_age: Option<f64>,
    /// Differential reference station ID
    pub station_id: Option<StationId>,
    pub faa_mode: Option<FaaMode>,
}

impl FromStr for GgaFix {
    type Err = ParseError;

    /// Parse with the current UTC date, see [parse_gga](../fn.parse_gga.html).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GgaParser::new().parse(s)
    }
}

/// The parser for the `NMEA 0183` protocol that parses only GGA sentences.
///
/// GGA sentences only carry the time of day. The parser combines it with a
/// reference date, which is the current UTC date unless one is set with
/// [with_reference_date](#method.with_reference_date).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GgaParser {
    reference_date: Option<NaiveDate>,
}

impl GgaParser {
    /// Create a parser that stamps fixes with the UTC date at parse time.
    pub fn new() -> Self {
        GgaParser {
            reference_date: None,
        }
    }

    /// Create a parser that stamps every fix with `date`.
    pub fn with_reference_date(date: NaiveDate) -> Self {
        GgaParser {
            reference_date: Some(date),
        }
    }

    /// The fixed reference date, `None` if the wall clock is used.
    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.reference_date
    }

    /// Parse a single sentence.
    /// The first char has to `'$'` or `'!'`. Returns
    /// `LexError::UnsupportedSentenceType` if the sentence type is not GGA.
    pub fn parse(&self, sentence: &str) -> Result<GgaFix, ParseError> {
        let result = self.parse_gga(sentence);
        match result {
            Ok(ref fix) => trace!("decoded GGA fix at {} from {}", fix.timestamp, fix.talker),
            Err(ref e) => debug!("rejected sentence {:?}: {}", sentence, e),
        }
        result
    }

    fn parse_gga(&self, sentence: &str) -> Result<GgaFix, ParseError> {
        let frame = lexer::read_frame(sentence)?;
        trace!("accepted frame with checksum {:02X}", frame.checksum);
        let fields = lexer::read_fields(frame.payload)?;

        let date = match self.reference_date {
            Some(date) => date,
            None => Utc::now().naive_utc().date(),
        };
        let timestamp = to_timestamp(date, fields.hour, fields.minute, fields.second, fields.fraction)?;

        let latitude = to_degrees(
            fields.lat_degrees,
            fields.lat_minutes,
            CardDir::from_field(fields.lat_hemisphere)?,
        )?;
        let longitude = to_degrees(
            fields.long_degrees,
            fields.long_minutes,
            CardDir::from_field(fields.long_hemisphere)?,
        )?;

        let quality = FixQuality::from_code(u8::from_str(fields.quality)?)?;

        let faa_mode = match fields.faa_mode {
            Some(code) => {
                let mode = FaaMode::from_code(code);
                if mode.is_none() {
                    debug!("ignoring unknown FAA mode {:?}", code);
                }
                mode
            }
            None => None,
        };

        Ok(GgaFix {
            talker: frame.talker,
            timestamp,
            latitude,
            longitude,
            quality,
            satellites: u16::from_str(fields.satellites)?,
            hdop: f64::from_str(fields.hdop)?,
            altitude: to_optional_f64(fields.altitude)?,
            geoid_separation: to_optional_f64(fields.geo_sep)?,
            differential_age: to_optional_f64(fields.age)?,
            station_id: match fields.station_id {
                Some(id) => Some(StationId::from_field(id)?),
                None => None,
            },
            faa_mode,
        })
    }
}

/// Parse a GGA sentence, stamping the fix with the current UTC date.
pub fn parse_gga(sentence: &str) -> Result<GgaFix, ParseError> {
    GgaParser::new().parse(sentence)
}

/// Combine the time of day `hhmmss.f` with `date`.
/// `fraction` holds the digits after the decimal point, only the first nine
/// are significant.
fn to_timestamp(
    date: NaiveDate,
    hour: &str,
    minute: &str,
    second: &str,
    fraction: Option<&str>,
) -> Result<DateTime<Utc>, ParseError> {
    let nanos = match fraction {
        Some(f) => {
            let digits = &f[..f.len().min(MAX_NANO_DIGITS)];
            u32::from_str(digits)? * 10u32.pow((MAX_NANO_DIGITS - digits.len()) as u32)
        }
        None => 0,
    };
    let time = NaiveTime::from_hms_nano_opt(
        u32::from_str(hour)?,
        u32::from_str(minute)?,
        u32::from_str(second)?,
        nanos,
    );
    match time {
        Some(time) => Ok(Utc.from_utc_datetime(&NaiveDateTime::new(date, time))),
        None => Err(ParseError::InvalidTimestamp(format!(
            "{}{}{}.{}",
            hour,
            minute,
            second,
            fraction.unwrap_or("0")
        ))),
    }
}

/// Decimal degrees from whole `degrees` and decimal `minutes`, signed by
/// `dir`.
#[inline]
fn to_degrees(degrees: &str, minutes: &str, dir: CardDir) -> Result<f64, ParseError> {
    let degrees = f64::from_str(degrees)?;
    let minutes = f64::from_str(minutes)?;
    Ok((degrees + minutes / 60.0) * dir.get_sign())
}

#[inline]
fn to_optional_f64(field: Option<&str>) -> Result<Option<f64>, ParseError> {
    match field {
        Some(f) => Ok(Some(f64::from_str(f)?)),
        None => Ok(None),
    }
}
