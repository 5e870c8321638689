use std::num;

quick_error! {
    #[derive(Debug)]
    pub enum ParseError {
        Lexer(err: LexError) {
            from()
            description("Lexer error")
            display("Unable to parse GGA sentence: {}", err)
            cause(err)
        }
        InvalidTimestamp(time: String) {
            description("Invalid UTC time")
            display("Invalid UTC time \"{}\"", time)
        }
        InvalidQuality(code: u8) {
            description("Invalid GPS quality")
            display("Invalid GPS quality indicator {}, expecting 0 to 9", code)
        }
        // Int and Float cannot fire for fields accepted by the lexer's grammar.
        Int(err: num::ParseIntError) {
            from()
            description("Integer parsing error")
            display("{}", err)
            cause(err)
        }
        Float(err: num::ParseFloatError) {
            from()
            description("Float parsing error")
            display("{}", err)
            cause(err)
        }
    }
}

quick_error! {
    #[derive(Debug)]
    pub enum LexError {
        MalformedFrame(reason: &'static str) {
            description("Malformed NMEA frame")
            display("Unable to parse NMEA data: {}", reason)
        }
        UnsupportedSentenceType(found: String) {
            description("Unsupported sentence type")
            display("Invalid format, expecting GGA, received {}", found)
        }
        InvalidChecksum(expected: u8, actual: u8) {
            description("Invalid checksum")
            display("Invalid checksum, expecting {:02X}, received {:02X}", expected, actual)
        }
        MalformedPayload(field: &'static str) {
            description("Malformed GGA payload")
            display("Unable to parse GGA data: malformed {} field", field)
        }
    }
}

// Quick error can't handle from for tuples
impl From<(u8, u8)> for LexError {
    fn from((expected, actual): (u8, u8)) -> Self {
        LexError::InvalidChecksum(expected, actual)
    }
}
