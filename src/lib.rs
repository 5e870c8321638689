//! Decoder for the *GGA* sentence (Global Positioning Fix Data) of the
//! *NMEA 0183* protocol.
//!
//! ```
//! # extern crate chrono;
//! # extern crate gga_fix;
//! use chrono::NaiveDate;
//! use gga_fix::{FixQuality, GgaParser};
//!
//! # fn main() {
//! let parser = GgaParser::with_reference_date(NaiveDate::from_ymd_opt(2018, 3, 14).unwrap());
//! let fix = parser
//!     .parse("$GPGGA,134658.00,5106.9792,N,11402.3003,W,2,09,1.0,1048.47,M,-16.27,M,08,AAAA*60")
//!     .unwrap();
//! assert_eq!(fix.latitude, 51.11632);
//! assert_eq!(fix.quality, FixQuality::DgpsFix);
//! # }
//! ```

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
extern crate arrayvec;
extern crate chrono;
#[macro_use]
extern crate log;
#[macro_use]
extern crate quick_error;

pub mod err;
#[macro_use]
mod macros;
pub mod lexer;
pub mod parser;

pub use err::{LexError, ParseError};
pub use lexer::Talker;
pub use parser::{parse_gga, FaaMode, FixQuality, GgaFix, GgaParser, StationId};
