use parse_display::Display;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::LazyLock;

mod encoding;
mod params;
mod rule;

mod tests_readme;

pub use params::{BuildParams, Params, ToParam, UnsupportedValue, Value};

use encoding::{decode_path, encode_path};
use rule::{Rule, ValueType};

/// `:<name>`, then an optional `<type>`, then an optional `+`, `*` or `?`.
static PARAM_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([0-9A-Za-z_]+)?(?:<([^<>]+)>)?([+*?])?$").unwrap());

/// A compiled path template such as `/profile/:id<number>+`.
///
/// The template is parsed once; [`parse`](Self::parse) and
/// [`build`](Self::build) only walk the compiled segment list.
#[derive(Clone)]
pub struct PathTemplate {
    source: String,
    segments: Vec<Segment>,
}
impl std::fmt::Debug for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self.source)
    }
}
impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Literal { range: Range<usize> },
    Param(Param),
}

#[derive(Debug, Clone)]
struct Param {
    token_start: usize,
    name_range: Range<usize>,
    rule: Rule,
}

/// Result of a successful [`PathTemplate::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// The input exactly as given, before decoding.
    pub path: String,
    /// `None` when the template declares no parameters.
    pub params: Option<Params>,
}
impl Match {
    /// Value of a parameter; `None` if it is unknown or was not matched.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.as_ref()?.get(name)?.as_ref()
    }
}

impl PathTemplate {
    pub fn new(s: &str) -> Result<Self> {
        let mut segments = Vec::new();
        for (start, token) in split_segments(s) {
            let Some(c) = PARAM_TOKEN.captures(token) else {
                segments.push(Segment::Literal {
                    range: start..start + token.len(),
                });
                continue;
            };
            let Some(name) = c.get(1) else {
                return Err(Error::new(s, start, ErrorKind::UnnamedParameter));
            };
            let value_type = ValueType::from_type_name(c.get(2).map(|m| m.as_str()));
            let modifier = c.get(3).and_then(|m| m.as_str().chars().next());
            segments.push(Segment::Param(Param {
                token_start: start,
                name_range: start + name.start()..start + name.end(),
                rule: Rule::new(value_type, modifier),
            }));
        }
        tracing::debug!(template = s, segments = segments.len(), "compiled path template");
        Ok(Self {
            source: s.to_string(),
            segments,
        })
    }

    /// Matches `input` against the template.
    ///
    /// The whole input is percent-decoded before it is split into segments.
    /// Returns `None` on any mismatch; there is no backtracking, and segments
    /// left over after the last descriptor are a mismatch.
    pub fn parse(&self, input: &str) -> Option<Match> {
        let decoded = decode_path(input)?;
        let segments: Vec<&str> = split_segments(&decoded).map(|(_, s)| s).collect();
        if !self.validate(&segments) {
            return None;
        }
        let params = self.extract(&segments)?;
        Some(Match {
            path: input.to_string(),
            params,
        })
    }

    fn validate(&self, segments: &[&str]) -> bool {
        let mut i = 0;
        for segment in &self.segments {
            match segment {
                Segment::Literal { range } => {
                    let literal = &self.source[range.clone()];
                    if segments.get(i) != Some(&literal) {
                        tracing::trace!(template = %self, literal, index = i, "literal mismatch");
                        return false;
                    }
                    i += 1;
                }
                Segment::Param(p) if p.rule.is_array() => {
                    let n = p.rule.run_len(segments.get(i..).unwrap_or_default());
                    if n < p.rule.min_len() {
                        tracing::trace!(
                            template = %self,
                            name = self.param_name(p),
                            "too few segments"
                        );
                        return false;
                    }
                    i += n;
                }
                Segment::Param(p) => {
                    let valid = match segments.get(i) {
                        Some(s) => p.rule.value_type.accepts(s),
                        None => !p.rule.required,
                    };
                    if !valid {
                        tracing::trace!(
                            template = %self,
                            name = self.param_name(p),
                            index = i,
                            "invalid segment"
                        );
                        return false;
                    }
                    i += 1;
                }
            }
        }
        if i < segments.len() {
            tracing::trace!(
                template = %self,
                rest = segments.len() - i,
                "unconsumed segments"
            );
            return false;
        }
        true
    }

    fn extract(&self, segments: &[&str]) -> Option<Option<Params>> {
        if !self.has_params() {
            return Some(None);
        }
        let mut params = Params::new();
        let mut i = 0;
        for segment in &self.segments {
            let Segment::Param(p) = segment else {
                i += 1;
                continue;
            };
            let value = if p.rule.is_array() {
                let rest = segments.get(i..).unwrap_or_default();
                let run = &rest[..p.rule.run_len(rest)];
                i += run.len();
                let mut items = Vec::with_capacity(run.len());
                for s in run {
                    items.push(p.rule.value_type.extract(s)?);
                }
                Some(Value::List(items))
            } else {
                let value = match segments.get(i) {
                    Some(s) => Some(p.rule.value_type.extract(s)?),
                    None => None,
                };
                i += 1;
                value
            };
            params.insert(self.param_name(p).to_string(), value);
        }
        Some(Some(params))
    }

    /// Builds a percent-encoded path from `params`.
    ///
    /// Absent optional parameters and falsy scalars (`""`, `0`, `false`)
    /// contribute no segment.
    pub fn build(&self, mut params: impl BuildParams) -> Result<String> {
        let mut fragments: Vec<Cow<str>> = Vec::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal { range } => {
                    fragments.push(Cow::Borrowed(&self.source[range.clone()]));
                }
                Segment::Param(p) => {
                    let name = self.param_name(p);
                    let value = params
                        .param(name)
                        .map_err(|_| self.param_error(p, ErrorKind::ObjectParameter))?;
                    match value {
                        Some(value) => {
                            let mut out = Vec::new();
                            value.push_fragments(&mut out);
                            fragments.extend(out.into_iter().map(Cow::Owned));
                        }
                        None if p.rule.required => {
                            return Err(self.param_error(p, ErrorKind::MissingParameter));
                        }
                        None => {}
                    }
                }
            }
        }
        let mut path = String::new();
        for fragment in fragments.iter().filter(|f| !f.is_empty()) {
            path.push('/');
            path.push_str(fragment);
        }
        if path.is_empty() {
            path.push('/');
        }
        Ok(encode_path(&path))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    fn param_name(&self, p: &Param) -> &str {
        &self.source[p.name_range.clone()]
    }
    fn params(&self) -> impl Iterator<Item = &Param> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(p) => Some(p),
            Segment::Literal { .. } => None,
        })
    }
    fn param_error(&self, p: &Param, kind: ErrorKind) -> Error {
        let mut e = Error::new(&self.source, p.token_start, kind);
        e.param = Some(p.name_range.clone());
        e
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params().map(|p| self.param_name(p))
    }
    pub fn find_param(&self, name: &str) -> Option<usize> {
        self.param_names().position(|n| n == name)
    }
    pub fn has_params(&self) -> bool {
        self.params().next().is_some()
    }
}

/// Shorthand for [`PathTemplate::new`].
pub fn compile(template: &str) -> Result<PathTemplate> {
    PathTemplate::new(template)
}

/// Non-empty `/`-delimited tokens with their byte offsets.
fn split_segments(s: &str) -> impl Iterator<Item = (usize, &str)> {
    s.split('/')
        .scan(0, |start, token| {
            let item = (*start, token);
            *start += token.len() + 1;
            Some(item)
        })
        .filter(|(_, token)| !token.is_empty())
}

impl FromStr for PathTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}
impl TryFrom<&str> for PathTemplate {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl Serialize for PathTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}
impl<'de> Deserialize<'de> for PathTemplate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = Cow::<str>::deserialize(deserializer)?;
        Self::new(&s).map_err(serde::de::Error::custom)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    #[display("parameter has no name")]
    UnnamedParameter,
    #[display("missing required parameter")]
    MissingParameter,
    #[display("Paths doesn't support object parameters")]
    ObjectParameter,
}

#[derive(Clone, Debug)]
pub struct Error {
    source: String,
    source_index: usize,
    kind: ErrorKind,
    param: Option<Range<usize>>,
}

impl Error {
    fn new(source: &str, source_index: usize, kind: ErrorKind) -> Self {
        Self {
            source: source.to_string(),
            source_index,
            kind,
            param: None,
        }
    }
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
    /// Name of the parameter a build error refers to.
    pub fn param(&self) -> Option<&str> {
        Some(&self.source[self.param.clone()?])
    }
    /// The template the error was raised for.
    pub fn template(&self) -> &str {
        &self.source
    }
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(name) = self.param() {
            write!(f, "{} `{name}`", self.kind)?;
        } else {
            write!(f, "{}", self.kind)?;
        }
        write!(
            f,
            " (\"{} >>>> {}\")",
            &self.source[..self.source_index],
            &self.source[self.source_index..],
        )
    }
}

impl std::error::Error for Error {}
