use super::sink::{ParamWarning, ValueKind};
use super::store::ParamStore;

const TRUTHY: [&str; 4] = ["1", "true", "yes", "on"];
const FALSY: [&str; 4] = ["0", "false", "no", "off"];

/// Typed, defaulting lookups.
///
/// Every accessor is total: an absent key yields `default`, and a present key whose
/// value does not convert yields `default` plus a [`ParamWarning::InvalidValue`].
impl ParamStore {
    pub fn param_string(&mut self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Base-10 signed integer in the `i32` range; the whole value must be consumed.
    pub fn param_int(&mut self, key: &str, default: i32) -> i32 {
        self.typed(key, default, ValueKind::Int, parse_int, |d| d.to_string())
    }

    /// Decimal or exponential floating-point literal with a finite result.
    pub fn param_double(&mut self, key: &str, default: f64) -> f64 {
        self.typed(key, default, ValueKind::Double, parse_double, |d| {
            format!("{:?}", d)
        })
    }

    /// Case-insensitive `1/true/yes/on` or `0/false/no/off`.
    pub fn param_bool(&mut self, key: &str, default: bool) -> bool {
        self.typed(key, default, ValueKind::Bool, parse_bool, |d| d.to_string())
    }

    fn typed<T: Copy>(
        &mut self,
        key: &str,
        default: T,
        kind: ValueKind,
        parse: fn(&str) -> Option<T>,
        render: impl Fn(T) -> String,
    ) -> T {
        self.ensure_loaded();
        let Some(raw) = self.peek(key) else {
            return default;
        };

        match parse(raw) {
            Some(value) => value,
            None => {
                let warning = ParamWarning::InvalidValue {
                    key: key.to_string(),
                    raw: raw.to_string(),
                    kind,
                    default: render(default),
                };
                self.sink.emit(warning);
                default
            }
        }
    }
}

fn parse_int(raw: &str) -> Option<i32> {
    raw.trim_ascii().parse::<i32>().ok()
}

fn parse_double(raw: &str) -> Option<f64> {
    let raw = raw.trim_ascii();
    let value = raw.parse::<f64>().ok().filter(|v| v.is_finite())?;
    if value == 0.0 && underflows(raw) {
        return None;
    }
    Some(value)
}

/// A zero result from a literal whose mantissa has a non-zero digit is a range error.
fn underflows(literal: &str) -> bool {
    literal
        .split(['e', 'E'])
        .next()
        .is_some_and(|mantissa| mantissa.bytes().any(|b| matches!(b, b'1'..=b'9')))
}

fn parse_bool(raw: &str) -> Option<bool> {
    let raw = raw.trim_ascii();
    if TRUTHY.iter().any(|t| raw.eq_ignore_ascii_case(t)) {
        Some(true)
    } else if FALSY.iter().any(|f| raw.eq_ignore_ascii_case(f)) {
        Some(false)
    } else {
        None
    }
}
