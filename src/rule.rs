use crate::Value;

/// Validation and extraction settings for one parameter, fixed at compile time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rule {
    pub(crate) required: bool,
    pub(crate) value_type: ValueType,
    pub(crate) cardinality: Cardinality,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ValueType {
    String,
    /// `<number>`
    Number,
    /// `<a|b|c>`
    Union(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cardinality {
    Single,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl Rule {
    pub(crate) fn new(value_type: ValueType, modifier: Option<char>) -> Self {
        let (required, cardinality) = match modifier {
            Some('+') => (true, Cardinality::OneOrMore),
            Some('*') => (false, Cardinality::ZeroOrMore),
            Some('?') => (false, Cardinality::Single),
            _ => (true, Cardinality::Single),
        };
        Self {
            required,
            value_type,
            cardinality,
        }
    }

    /// Fewest segments an array parameter must consume.
    pub(crate) fn min_len(&self) -> usize {
        match self.cardinality {
            Cardinality::Single | Cardinality::ZeroOrMore => 0,
            Cardinality::OneOrMore => 1,
        }
    }

    pub(crate) fn is_array(&self) -> bool {
        self.cardinality != Cardinality::Single
    }

    /// Length of the leading run of `segments` accepted by the base rule.
    pub(crate) fn run_len(&self, segments: &[&str]) -> usize {
        segments
            .iter()
            .take_while(|s| self.value_type.accepts(s))
            .count()
    }
}

impl ValueType {
    pub(crate) fn from_type_name(name: Option<&str>) -> Self {
        match name {
            None => Self::String,
            Some("number") => Self::Number,
            Some(members) => Self::Union(members.split('|').map(str::to_string).collect()),
        }
    }

    pub(crate) fn accepts(&self, segment: &str) -> bool {
        match self {
            Self::String => true,
            Self::Number => parse_int(segment).is_some(),
            Self::Union(members) => members.iter().any(|m| m == segment),
        }
    }

    pub(crate) fn extract(&self, segment: &str) -> Option<Value> {
        match self {
            Self::String | Self::Union(_) => Some(Value::String(segment.to_string())),
            Self::Number => parse_int(segment).map(Value::Number),
        }
    }
}

/// Permissive integer conversion: leading whitespace, an optional sign, an
/// optional `0x` prefix, then the longest run of digits. Trailing garbage is
/// ignored, so `"12abc"` is `12`.
pub(crate) fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(rest) => (16, rest),
        None => (10, s),
    };
    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value = i64::from_str_radix(&digits[..end], radix).ok()?;
    Some(if negative { -value } else { value })
}
