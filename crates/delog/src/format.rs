use std::fmt;
use std::time::Duration;

/// Formats a duration the way it is shown between brackets on every log line,
/// e.g. `350ns`, `1.5µs`, `1.234ms`, `12.5s` or `1h2m3.004s`. Trailing zeros
/// of the fraction are omitted.
pub struct ElapsedFormatter(pub Duration);

impl fmt::Display for ElapsedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MICROSECOND: u128 = 1_000;
        const MILLISECOND: u128 = 1_000_000;
        const SECOND: u128 = 1_000_000_000;

        let nanos = self.0.as_nanos();
        if nanos == 0 {
            return f.write_str("0s");
        }

        if nanos < SECOND {
            // Pick the largest unit that keeps the integer part non-zero.
            let (precision, unit) = if nanos < MICROSECOND {
                (0, "ns")
            } else if nanos < MILLISECOND {
                (3, "µs")
            } else {
                (6, "ms")
            };

            let scale = 10u128.pow(precision);
            write!(f, "{}", nanos / scale)?;
            write_fraction(f, nanos % scale, precision)?;
            return f.write_str(unit);
        }

        let seconds = nanos / SECOND;
        let hours = seconds / 3600;
        let minutes = (seconds / 60) % 60;

        if hours > 0 {
            write!(f, "{hours}h{minutes}m")?;
        } else if minutes > 0 {
            write!(f, "{minutes}m")?;
        }

        write!(f, "{}", seconds % 60)?;
        write_fraction(f, nanos % SECOND, 9)?;
        f.write_str("s")
    }
}

/// Writes `.digits` for a fraction with the given number of decimal digits,
/// without trailing zeros. Writes nothing for a zero fraction.
fn write_fraction(f: &mut fmt::Formatter<'_>, mut fraction: u128, mut precision: u32) -> fmt::Result {
    if fraction == 0 {
        return Ok(());
    }

    while fraction % 10 == 0 {
        fraction /= 10;
        precision -= 1;
    }

    write!(f, ".{:0width$}", fraction, width = precision as usize)
}

/// Appends the decimal representation of `value` to the buffer, padded with
/// leading zeros to at least `width` digits. A width of `-1`, or any width
/// smaller than the number of digits, results in the natural representation.
pub fn itoa(buffer: &mut Vec<u8>, mut value: u64, width: i32) {
    // Assemble the digits in reverse order, a u64 has at most 20 of them.
    let mut digits = [0u8; 20];
    let mut position = digits.len();

    loop {
        position -= 1;
        digits[position] = b'0' + (value % 10) as u8;
        value /= 10;

        if value == 0 {
            break;
        }
    }

    let length = digits.len() - position;
    let width = usize::try_from(width).unwrap_or(0);
    buffer.resize(buffer.len() + width.saturating_sub(length), b'0');
    buffer.extend_from_slice(&digits[position..]);
}

/// Returns the zero padded representation of `value`, see [itoa].
pub fn pad(value: u64, width: i32) -> String {
    let mut buffer = Vec::new();
    itoa(&mut buffer, value, width);
    String::from_utf8(buffer).expect("itoa only produces ASCII digits")
}
