//! Error model for Cirrus RPC.
//!
//! Every failure that crosses the client boundary is an [`RpcError`]: an
//! attribute bag keyed by name, holding at minimum a `"message"` entry.
//! Errors are constructed either directly ([`RpcError::from_message`]) or
//! through the positional template renderer ([`RpcError::formatted`] and the
//! [`raise!`](crate::raise) macro).

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;

/// Attribute key under which the human-readable message is stored.
pub const MESSAGE_KEY: &str = "message";

/// A typed value attached to an [`RpcError`] attribute bag.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Text value.
    Str(String),
    /// Signed integer value.
    Int(i64),
    /// Unsigned integer value.
    Uint(u64),
    /// Floating point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u16> for AttrValue {
    fn from(v: u16) -> Self {
        Self::Uint(u64::from(v))
    }
}

impl From<u64> for AttrValue {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Template substitution failure.
///
/// Raised while rendering a message template; never silently ignored. A
/// `FormatError` converts into an [`RpcError`] describing the defect so it
/// still travels the single RPC error channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// A placeholder referenced an argument that was not supplied.
    #[error("placeholder %{index}% has no matching argument ({supplied} supplied)")]
    MissingArgument {
        /// One-based placeholder index.
        index: usize,
        /// Number of arguments that were supplied.
        supplied: usize,
    },

    /// A `%` was not followed by a digit sequence and closing `%`.
    #[error("malformed placeholder at byte {at}")]
    Malformed {
        /// Byte offset of the offending character.
        at: usize,
    },

    /// The template ended inside a placeholder.
    #[error("unterminated placeholder at byte {at}")]
    Unterminated {
        /// Byte offset where the placeholder started.
        at: usize,
    },

    /// Placeholder indices are one-based; `%0%` is invalid.
    #[error("placeholder indices start at %1%")]
    ZeroIndex,
}

/// Render `template`, substituting `%N%` with `args[N - 1]`.
///
/// `%%` emits a literal percent sign.
fn render(template: &str, args: &[AttrValue]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((at, c)) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        match chars.peek().copied() {
            None => return Err(FormatError::Unterminated { at }),
            Some((_, '%')) => {
                chars.next();
                out.push('%');
            }
            Some((_, d)) if d.is_ascii_digit() => {
                let mut index: usize = 0;
                while let Some((_, d)) = chars.peek().copied() {
                    match d.to_digit(10) {
                        Some(v) => {
                            index = index.saturating_mul(10).saturating_add(v as usize);
                            chars.next();
                        }
                        None => break,
                    }
                }
                match chars.next() {
                    Some((_, '%')) => {}
                    Some((p, _)) => return Err(FormatError::Malformed { at: p }),
                    None => return Err(FormatError::Unterminated { at }),
                }
                if index == 0 {
                    return Err(FormatError::ZeroIndex);
                }
                let arg = args.get(index - 1).ok_or(FormatError::MissingArgument {
                    index,
                    supplied: args.len(),
                })?;
                let _ = write!(out, "{arg}");
            }
            Some((p, _)) => return Err(FormatError::Malformed { at: p }),
        }
    }

    Ok(out)
}

/// Uniform error type for all RPC client failures.
///
/// Carries an open-ended bag of named, typed attributes. Every error a
/// caller observes holds a `"message"` attribute; constructing one without
/// it and then calling [`message`](RpcError::message) is a programming
/// defect.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", display_message(.attrs))]
pub struct RpcError {
    attrs: BTreeMap<String, AttrValue>,
}

fn display_message(attrs: &BTreeMap<String, AttrValue>) -> String {
    match attrs.get(MESSAGE_KEY) {
        Some(v) => v.to_string(),
        None => "rpc error (missing message context)".to_string(),
    }
}

impl RpcError {
    /// Create an error with an empty attribute bag.
    ///
    /// Callers normally use [`from_message`](Self::from_message) or
    /// [`formatted`](Self::formatted); an error without a `"message"`
    /// attribute must gain one before it reaches an observer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            attrs: BTreeMap::new(),
        }
    }

    /// Create an error carrying the given message.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        Self::new().with_attr(MESSAGE_KEY, message.into())
    }

    /// Create an error by rendering a positional template.
    ///
    /// Placeholders are `%1%`, `%2%`, … and substitute the corresponding
    /// argument's display form. Substitution failures are reported, not
    /// swallowed.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use cirrus_core::{AttrValue, RpcError};
    ///
    /// let err = RpcError::formatted(
    ///     "cannot reach %1%:%2%",
    ///     &["db.internal".into(), AttrValue::Uint(5432)],
    /// )
    /// .unwrap();
    /// assert_eq!(err.message(), "cannot reach db.internal:5432");
    /// ```
    pub fn formatted(template: &str, args: &[AttrValue]) -> Result<Self, FormatError> {
        Ok(Self::from_message(render(template, args)?))
    }

    /// Attach an attribute, replacing any previous value under `key`.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute by key.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// Iterate over all attached attributes.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The attached human-readable message.
    ///
    /// # Panics
    ///
    /// Panics with a "missing context" message if the error carries no
    /// `"message"` attribute. That state is a programming defect; use
    /// [`try_message`](Self::try_message) when unsure.
    #[must_use]
    pub fn message(&self) -> &str {
        match self.try_message() {
            Some(msg) => msg,
            None => panic!("missing context: RpcError has no message attribute"),
        }
    }

    /// The attached message, or `None` if the error carries none.
    #[must_use]
    pub fn try_message(&self) -> Option<&str> {
        match self.attrs.get(MESSAGE_KEY) {
            Some(AttrValue::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Re-signal this error across an API boundary.
    ///
    /// Moves the error unchanged into the error channel; the full attribute
    /// bag survives, not just the message.
    pub fn rethrow<T>(self) -> Result<T, Self> {
        Err(self)
    }
}

impl Default for RpcError {
    fn default() -> Self {
        Self::new()
    }
}

impl From<FormatError> for RpcError {
    fn from(err: FormatError) -> Self {
        Self::from_message(format!("message formatting failed: {err}"))
            .with_attr("format_error", err.to_string())
    }
}

/// Construct an [`RpcError`] from a positional template and return it as
/// `Err` from the enclosing function.
///
/// Arguments after the template are converted through [`AttrValue::from`]
/// and substituted for `%1%`, `%2%`, … in order. A substitution failure is
/// itself returned as an `RpcError` rather than being ignored.
///
/// ## Example
///
/// ```rust
/// use cirrus_core::{raise, RpcError};
///
/// fn lookup(port: u16) -> Result<(), RpcError> {
///     if port == 0 {
///         raise!("invalid port %1%", port);
///     }
///     Ok(())
/// }
///
/// assert_eq!(lookup(0).unwrap_err().message(), "invalid port 0");
/// ```
#[macro_export]
macro_rules! raise {
    ($template:expr $(,)?) => {
        return Err($crate::RpcError::from_message($template))
    };
    ($template:expr, $($arg:expr),+ $(,)?) => {
        match $crate::RpcError::formatted($template, &[$($crate::AttrValue::from($arg)),+]) {
            Ok(err) => return Err(err),
            Err(fmt_err) => return Err($crate::RpcError::from(fmt_err)),
        }
    };
}
