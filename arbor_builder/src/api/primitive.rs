use serde_json::Value;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::api::ValueError;
use crate::prelude::Native;

/// The primitive kind a flag value is built over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `true` or `false`.
    Bool,
    /// A signed 64 bit integer.
    Int,
    /// A 64 bit float.
    Float,
    /// Any string.
    Str,
    /// A duration such as `1h30m` or `250ms`.
    Duration,
    /// A filesystem path.
    Path,
    /// A single character.
    Rune,
    /// An IP address.
    Addr,
    /// An IP address with a port.
    AddrPort,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Str => "string",
            Kind::Duration => "duration",
            Kind::Path => "path",
            Kind::Rune => "rune",
            Kind::Addr => "addr",
            Kind::AddrPort => "addrport",
        };
        write!(f, "{name}")
    }
}

/// A single value of some [`Kind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(String),
    /// A duration.
    Duration(Duration),
    /// A filesystem path.
    Path(PathBuf),
    /// A single character.
    Rune(char),
    /// An IP address.
    Addr(IpAddr),
    /// A socket address.
    AddrPort(SocketAddr),
}

impl Primitive {
    /// The kind of this primitive.
    pub fn kind(&self) -> Kind {
        match self {
            Primitive::Bool(_) => Kind::Bool,
            Primitive::Int(_) => Kind::Int,
            Primitive::Float(_) => Kind::Float,
            Primitive::Str(_) => Kind::Str,
            Primitive::Duration(_) => Kind::Duration,
            Primitive::Path(_) => Kind::Path,
            Primitive::Rune(_) => Kind::Rune,
            Primitive::Addr(_) => Kind::Addr,
            Primitive::AddrPort(_) => Kind::AddrPort,
        }
    }

    /// Convert the wire string form into a primitive of `kind`.
    pub(crate) fn parse(kind: Kind, raw: &str) -> Result<Self, ValueError> {
        let conversion = || ValueError::Conversion {
            raw: raw.to_string(),
            kind,
        };

        match kind {
            // Only the exact literals.
            Kind::Bool => match raw {
                "true" => Ok(Primitive::Bool(true)),
                "false" => Ok(Primitive::Bool(false)),
                _ => Err(conversion()),
            },
            Kind::Int => i64::from_str(raw)
                .map(Primitive::Int)
                .map_err(|_| conversion()),
            Kind::Float => f64::from_str(raw)
                .map(Primitive::Float)
                .map_err(|_| conversion()),
            Kind::Str => Ok(Primitive::Str(raw.to_string())),
            Kind::Duration => parse_duration(raw)
                .map(Primitive::Duration)
                .ok_or_else(conversion),
            Kind::Path => Ok(Primitive::Path(PathBuf::from(raw))),
            Kind::Rune => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Primitive::Rune(c)),
                    _ => Err(conversion()),
                }
            }
            Kind::Addr => IpAddr::from_str(raw)
                .map(Primitive::Addr)
                .map_err(|_| conversion()),
            Kind::AddrPort => SocketAddr::from_str(raw)
                .map(Primitive::AddrPort)
                .map_err(|_| conversion()),
        }
    }

    /// Convert a structured (config file) value into a primitive of `kind`.
    pub(crate) fn from_interface(kind: Kind, iface: &Value) -> Result<Self, ValueError> {
        let conversion = || ValueError::Conversion {
            raw: iface.to_string(),
            kind,
        };

        match (kind, iface) {
            (Kind::Bool, Value::Bool(b)) => Ok(Primitive::Bool(*b)),
            (Kind::Int, Value::Number(n)) => n.as_i64().map(Primitive::Int).ok_or_else(conversion),
            (Kind::Float, Value::Number(n)) => {
                n.as_f64().map(Primitive::Float).ok_or_else(conversion)
            }
            (
                Kind::Str
                | Kind::Duration
                | Kind::Path
                | Kind::Rune
                | Kind::Addr
                | Kind::AddrPort,
                Value::String(s),
            ) => Self::parse(kind, s),
            _ => Err(conversion()),
        }
    }
}

impl std::fmt::Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Primitive::Bool(value) => write!(f, "{value}"),
            Primitive::Int(value) => write!(f, "{value}"),
            Primitive::Float(value) => write!(f, "{value}"),
            Primitive::Str(value) => write!(f, "{value}"),
            Primitive::Duration(value) => write!(f, "{}", format_duration(value)),
            Primitive::Path(value) => write!(f, "{}", value.display()),
            Primitive::Rune(value) => write!(f, "{value}"),
            Primitive::Addr(value) => write!(f, "{value}"),
            Primitive::AddrPort(value) => write!(f, "{value}"),
        }
    }
}

macro_rules! native {
    ($type:ty, $kind:ident) => {
        impl Native for $type {
            const KIND: Kind = Kind::$kind;

            fn into_primitive(self) -> Primitive {
                Primitive::$kind(self)
            }

            fn from_primitive(primitive: &Primitive) -> Option<Self> {
                match primitive {
                    Primitive::$kind(value) => Some(value.clone()),
                    _ => None,
                }
            }
        }
    };
}

native!(bool, Bool);
native!(i64, Int);
native!(f64, Float);
native!(String, Str);
native!(Duration, Duration);
native!(PathBuf, Path);
native!(char, Rune);
native!(IpAddr, Addr);
native!(SocketAddr, AddrPort);

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;
const NANOS_PER_MINUTE: u128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MINUTE;
// Anything finer than a nanosecond is dropped anyway.
const MAX_FRACTION_DIGITS: usize = 18;

/// Parse a duration made of `<number><unit>` terms, ex: `1h30m`, `1.5s`, `250ms`.
/// Units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`; the bare string `0` is also accepted.
pub(crate) fn parse_duration(raw: &str) -> Option<Duration> {
    if raw == "0" {
        return Some(Duration::ZERO);
    }

    if raw.is_empty() {
        return None;
    }

    let mut rest = raw;
    let mut nanos: u128 = 0;

    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_end);
        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);

        let scale = match unit {
            "ns" => 1,
            "us" | "µs" => NANOS_PER_MICRO,
            "ms" => NANOS_PER_MILLI,
            "s" => NANOS_PER_SECOND,
            "m" => NANOS_PER_MINUTE,
            "h" => NANOS_PER_HOUR,
            _ => return None,
        };

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));

        if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
            return None;
        }

        let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let mut term = whole.checked_mul(scale)?;

        if !fraction.is_empty() {
            let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
            let digits: u128 = fraction.parse().ok()?;
            let fraction_nanos = digits.checked_mul(scale)? / 10u128.pow(fraction.len() as u32);
            term = term.checked_add(fraction_nanos)?;
        }

        nanos = nanos.checked_add(term)?;
        rest = tail;
    }

    u64::try_from(nanos).ok().map(Duration::from_nanos)
}

/// Render a duration in the same form `parse_duration` accepts, ex: `1h30m0s`.
pub(crate) fn format_duration(duration: &Duration) -> String {
    let nanos = duration.as_nanos();

    if nanos == 0 {
        "0s".to_string()
    } else if nanos < NANOS_PER_MICRO {
        format!("{nanos}ns")
    } else if nanos < NANOS_PER_MILLI {
        format!("{}µs", decimal(nanos, NANOS_PER_MICRO))
    } else if nanos < NANOS_PER_SECOND {
        format!("{}ms", decimal(nanos, NANOS_PER_MILLI))
    } else {
        let hours = nanos / NANOS_PER_HOUR;
        let minutes = (nanos % NANOS_PER_HOUR) / NANOS_PER_MINUTE;
        let seconds = nanos % NANOS_PER_MINUTE;
        let mut out = String::default();

        if hours > 0 {
            out.push_str(&format!("{hours}h"));
        }

        if hours > 0 || minutes > 0 {
            out.push_str(&format!("{minutes}m"));
        }

        out.push_str(&format!("{}s", decimal(seconds, NANOS_PER_SECOND)));
        out
    }
}

fn decimal(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let fraction = value % unit;

    if fraction == 0 {
        whole.to_string()
    } else {
        let width = unit.to_string().len() - 1;
        let digits = format!("{fraction:0width$}");
        format!("{whole}.{}", digits.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(Kind::Bool, "true", Primitive::Bool(true))]
    #[case(Kind::Bool, "false", Primitive::Bool(false))]
    #[case(Kind::Int, "-12", Primitive::Int(-12))]
    #[case(Kind::Float, "1.5", Primitive::Float(1.5))]
    #[case(Kind::Str, "", Primitive::Str("".to_string()))]
    #[case(Kind::Duration, "1h30m", Primitive::Duration(Duration::from_secs(5400)))]
    #[case(Kind::Path, "~/x", Primitive::Path(PathBuf::from("~/x")))]
    #[case(Kind::Rune, "é", Primitive::Rune('é'))]
    #[case(Kind::Addr, "::1", Primitive::Addr(IpAddr::from_str("::1").unwrap()))]
    #[case(Kind::AddrPort, "127.0.0.1:80", Primitive::AddrPort(SocketAddr::from_str("127.0.0.1:80").unwrap()))]
    fn parse(#[case] kind: Kind, #[case] raw: &str, #[case] expected: Primitive) {
        assert_eq!(Primitive::parse(kind, raw).unwrap(), expected);
        assert_eq!(expected.kind(), kind);
    }

    #[rstest]
    #[case(Kind::Bool, "yes")]
    #[case(Kind::Bool, "True")]
    #[case(Kind::Bool, "1")]
    #[case(Kind::Int, "1.0")]
    #[case(Kind::Int, "abc")]
    #[case(Kind::Float, "one")]
    #[case(Kind::Duration, "5")]
    #[case(Kind::Duration, "5 minutes")]
    #[case(Kind::Rune, "ab")]
    #[case(Kind::Rune, "")]
    #[case(Kind::Addr, "localhost")]
    #[case(Kind::AddrPort, "127.0.0.1")]
    fn parse_invalid(#[case] kind: Kind, #[case] raw: &str) {
        assert_eq!(
            Primitive::parse(kind, raw).unwrap_err(),
            ValueError::Conversion {
                raw: raw.to_string(),
                kind,
            }
        );
    }

    #[rstest]
    #[case(Kind::Bool, json!(true), Primitive::Bool(true))]
    #[case(Kind::Int, json!(7), Primitive::Int(7))]
    #[case(Kind::Float, json!(7), Primitive::Float(7.0))]
    #[case(Kind::Str, json!("abc"), Primitive::Str("abc".to_string()))]
    #[case(Kind::Duration, json!("2s"), Primitive::Duration(Duration::from_secs(2)))]
    #[case(Kind::Path, json!("/tmp"), Primitive::Path(PathBuf::from("/tmp")))]
    fn from_interface(#[case] kind: Kind, #[case] iface: Value, #[case] expected: Primitive) {
        assert_eq!(Primitive::from_interface(kind, &iface).unwrap(), expected);
    }

    #[rstest]
    #[case(Kind::Bool, json!("true"))]
    #[case(Kind::Int, json!("7"))]
    #[case(Kind::Int, json!(7.5))]
    #[case(Kind::Str, json!(7))]
    #[case(Kind::Str, json!(["a"]))]
    #[case(Kind::Path, json!({"a": "b"}))]
    fn from_interface_mismatch(#[case] kind: Kind, #[case] iface: Value) {
        assert_matches!(
            Primitive::from_interface(kind, &iface),
            Err(ValueError::Conversion { .. })
        );
    }

    #[rstest]
    #[case("0", Duration::ZERO)]
    #[case("0s", Duration::ZERO)]
    #[case("300ms", Duration::from_millis(300))]
    #[case("1.5s", Duration::from_millis(1500))]
    #[case(".5s", Duration::from_millis(500))]
    #[case("2h45m", Duration::from_secs(2 * 3600 + 45 * 60))]
    #[case("1m0.25s", Duration::from_millis(60_250))]
    #[case("10us", Duration::from_micros(10))]
    #[case("10µs", Duration::from_micros(10))]
    #[case("7ns", Duration::from_nanos(7))]
    fn duration_parse(#[case] raw: &str, #[case] expected: Duration) {
        assert_eq!(parse_duration(raw), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("1")]
    #[case("h")]
    #[case(".s")]
    #[case("1.2.3s")]
    #[case("1d")]
    #[case("-1s")]
    #[case("94522879700260684295381835.9h")]
    fn duration_parse_invalid(#[case] raw: &str) {
        assert_eq!(parse_duration(raw), None);
    }

    #[rstest]
    #[case(Duration::ZERO, "0s")]
    #[case(Duration::from_nanos(7), "7ns")]
    #[case(Duration::from_micros(1500), "1.5ms")]
    #[case(Duration::from_millis(250), "250ms")]
    #[case(Duration::from_millis(1500), "1.5s")]
    #[case(Duration::from_secs(90), "1m30s")]
    #[case(Duration::from_secs(5400), "1h30m0s")]
    fn duration_format(#[case] duration: Duration, #[case] expected: &str) {
        assert_eq!(format_duration(&duration), expected);
        assert_eq!(parse_duration(expected), Some(duration));
    }

    #[test]
    fn native() {
        assert_eq!(i64::KIND, Kind::Int);
        assert_eq!(5i64.into_primitive(), Primitive::Int(5));
        assert_eq!(i64::from_primitive(&Primitive::Int(5)), Some(5));
        assert_eq!(i64::from_primitive(&Primitive::Bool(true)), None);
        assert_eq!(
            PathBuf::from_primitive(&Primitive::Path(PathBuf::from("a"))),
            Some(PathBuf::from("a"))
        );
    }
}
