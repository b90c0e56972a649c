//! Parsing of raw sensor frames.
//!
//! The board emits one reading per line in a fixed format:
//!
//! ```text
//! Humidity: 45.0 %\tTemperature: 23.5 *C
//! ```
//!
//! The humidity field comes first, tab-delimited from the temperature field.
//! Each line is an independent best-effort parse; a rejected frame is simply
//! discarded by the caller.

/// Label marking the humidity field.
pub const HUMIDITY_MARKER: &str = "Humidity:";
/// Label marking the temperature field.
pub const TEMPERATURE_MARKER: &str = "Temperature:";

const FIELD_DELIMITER: char = '\t';
const HUMIDITY_UNIT: &str = "%";
const TEMPERATURE_UNIT: &str = "*C";

/// The two numeric fields extracted from one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub temperature_c: f64,
    pub humidity_pct: f64,
}

/// Why a frame was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// A required marker is missing or the fields do not split as expected
    Malformed,
    /// A field is present but its payload is not a finite float
    NumericParse,
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::Malformed => write!(f, "frame does not match the wire format"),
            FrameError::NumericParse => write!(f, "frame field is not a finite number"),
        }
    }
}

impl std::error::Error for FrameError {}

/// Parse one line from the serial link into a [`Sample`].
///
/// The caller is expected to skip blank lines; they are not part of the wire
/// contract and would be rejected as malformed here.
pub fn parse_frame(line: &str) -> Result<Sample, FrameError> {
    if !line.contains(HUMIDITY_MARKER) || !line.contains(TEMPERATURE_MARKER) {
        return Err(FrameError::Malformed);
    }

    let mut fields = line.split(FIELD_DELIMITER);
    let humidity_field = fields.next().ok_or(FrameError::Malformed)?;
    let temperature_field = fields.next().ok_or(FrameError::Malformed)?;

    let humidity_pct = parse_field(humidity_field, HUMIDITY_MARKER, HUMIDITY_UNIT)?;
    let temperature_c = parse_field(temperature_field, TEMPERATURE_MARKER, TEMPERATURE_UNIT)?;

    Ok(Sample {
        temperature_c,
        humidity_pct,
    })
}

/// Extract the numeric payload of one `Label: <value> <unit>` field.
///
/// The unit suffix is stripped when present; a frame without it still parses,
/// matching the board's occasional unit-less output.
fn parse_field(field: &str, marker: &str, unit: &str) -> Result<f64, FrameError> {
    if !field.contains(marker) {
        return Err(FrameError::Malformed);
    }

    let (_, payload) = field.split_once(':').ok_or(FrameError::Malformed)?;
    let payload = payload.trim();
    let payload = payload.strip_suffix(unit).unwrap_or(payload).trim();

    let value: f64 = payload.parse().map_err(|_| FrameError::NumericParse)?;
    if !value.is_finite() {
        return Err(FrameError::NumericParse);
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_frame() {
        let sample = parse_frame("Humidity: 45.0 %\tTemperature: 23.5 *C").unwrap();
        assert_eq!(sample.temperature_c, 23.5);
        assert_eq!(sample.humidity_pct, 45.0);
    }

    #[test]
    fn test_parse_negative_temperature() {
        let sample = parse_frame("Humidity: 80.2 %\tTemperature: -4.1 *C").unwrap();
        assert_eq!(sample.temperature_c, -4.1);
        assert_eq!(sample.humidity_pct, 80.2);
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert_eq!(parse_frame("garbage"), Err(FrameError::Malformed));
    }

    #[test]
    fn test_missing_temperature_field_is_malformed() {
        assert_eq!(parse_frame("Humidity: 45.0 %"), Err(FrameError::Malformed));
    }

    #[test]
    fn test_swapped_fields_are_malformed() {
        assert_eq!(
            parse_frame("Temperature: 23.5 *C\tHumidity: 45.0 %"),
            Err(FrameError::Malformed)
        );
    }

    #[test]
    fn test_non_numeric_payload() {
        assert_eq!(
            parse_frame("Humidity: abc %\tTemperature: 23.5 *C"),
            Err(FrameError::NumericParse)
        );
    }

    #[test]
    fn test_non_finite_payload_rejected() {
        assert_eq!(
            parse_frame("Humidity: inf %\tTemperature: 23.5 *C"),
            Err(FrameError::NumericParse)
        );
        assert_eq!(
            parse_frame("Humidity: 45.0 %\tTemperature: NaN *C"),
            Err(FrameError::NumericParse)
        );
    }

    #[test]
    fn test_missing_unit_suffix_still_parses() {
        let sample = parse_frame("Humidity: 45.0\tTemperature: 23.5 *C").unwrap();
        assert_eq!(sample.humidity_pct, 45.0);
    }
}
