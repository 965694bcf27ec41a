use thiserror::Error;

/// Failure while parsing a token stream against an [`OptionSet`](crate::OptionSet).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Option-like token that cannot be tokenized, e.g. `--=value` or `---x`.
    #[error("bad flag syntax: {0}")]
    BadSyntax(String),

    /// Named option not present in the set.
    #[error("unknown argument {0}")]
    Unknown(String),

    /// Input ended while an option or a mandatory positional still needed a value.
    #[error("no value provided for argument {0}")]
    MissingValue(String),

    /// The value could not be converted to the option's type.
    #[error("invalid value {value:?} for argument {name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

impl ParseError {
    /// Whether parsing stopped because a value was expected but input ran out.
    pub fn is_missing_value(&self) -> bool {
        matches!(self, Self::MissingValue(_))
    }
}

/// Failure while declaring an option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclareError {
    #[error("option declared without a name")]
    Unnamed,

    #[error("flag redeclared: {0}")]
    Redeclared(String),
}
