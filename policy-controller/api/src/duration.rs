use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr, time::Duration};

/// A duration written as a sequence of decimal numbers with unit suffixes,
/// such as `"300ms"`, `"1.5s"` or `"1m30s"`.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfDuration(Duration);

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum ParseError {
    #[error("empty duration")]
    Empty,

    #[error("invalid unit: {}", EXPECTED_UNITS)]
    InvalidUnit,

    #[error("missing a unit: {}", EXPECTED_UNITS)]
    NoUnit,

    #[error("invalid number: {}", .0)]
    NotANumber(#[from] std::num::ParseFloatError),

    #[error("duration out of range")]
    Overflow,
}

const EXPECTED_UNITS: &str = "expected one of 'ns', 'us', '\u{00b5}s', 'ms', 's', 'm', or 'h'";

impl From<Duration> for ConfDuration {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl From<ConfDuration> for Duration {
    fn from(ConfDuration(duration): ConfDuration) -> Self {
        duration
    }
}

impl fmt::Debug for ConfDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ConfDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl FromStr for ConfDuration {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        fn unit_secs(unit: &str) -> Result<f64, ParseError> {
            Ok(match unit {
                "ns" => 1e-9,
                "us" | "\u{00b5}s" => 1e-6,
                "ms" => 1e-3,
                "s" => 1.0,
                "m" => 60.0,
                "h" => 60.0 * 60.0,
                _ => return Err(ParseError::InvalidUnit),
            })
        }

        if s.is_empty() {
            return Err(ParseError::Empty);
        }
        if s == "0" {
            return Ok(Self::default());
        }

        let mut total = Duration::ZERO;
        let mut rest = s;
        while !rest.is_empty() {
            let num_end = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .ok_or(ParseError::NoUnit)?;
            let (num, tail) = rest.split_at(num_end);
            let unit_end = tail
                .find(|c: char| c.is_ascii_digit() || c == '.')
                .unwrap_or(tail.len());
            let (unit, tail) = tail.split_at(unit_end);
            let value = num.parse::<f64>()?;
            let part = Duration::try_from_secs_f64(unit_secs(unit)? * value)
                .map_err(|_| ParseError::Overflow)?;
            total = total.checked_add(part).ok_or(ParseError::Overflow)?;
            rest = tail;
        }
        Ok(Self(total))
    }
}

impl Serialize for ConfDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ConfDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;
        impl de::Visitor<'_> for Visitor {
            type Value = ConfDuration;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string in duration format")
            }

            fn visit_str<E: de::Error>(self, s: &str) -> Result<Self::Value, E> {
                s.parse().map_err(de::Error::custom)
            }
        }
        deserializer.deserialize_str(Visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses() {
        for (input, expected) in [
            ("0", Duration::ZERO),
            ("5s", Duration::from_secs(5)),
            ("300ms", Duration::from_millis(300)),
            ("1.5s", Duration::from_millis(1500)),
            ("1m30s", Duration::from_secs(90)),
            ("2h", Duration::from_secs(7200)),
            ("250us", Duration::from_micros(250)),
            ("250\u{00b5}s", Duration::from_micros(250)),
        ] {
            assert_eq!(
                input.parse::<ConfDuration>(),
                Ok(ConfDuration(expected)),
                "{input}"
            );
        }
    }

    #[test]
    fn rejects() {
        assert_eq!("".parse::<ConfDuration>(), Err(ParseError::Empty));
        assert_eq!("10".parse::<ConfDuration>(), Err(ParseError::NoUnit));
        assert_eq!("10d".parse::<ConfDuration>(), Err(ParseError::InvalidUnit));
        assert!(matches!(
            "1..5s".parse::<ConfDuration>(),
            Err(ParseError::NotANumber(_))
        ));
        assert_eq!(
            "99999999999999999999h".parse::<ConfDuration>(),
            Err(ParseError::Overflow)
        );
        assert_eq!(
            "18446744073709549568s1h".parse::<ConfDuration>(),
            Err(ParseError::Overflow)
        );
    }
}
