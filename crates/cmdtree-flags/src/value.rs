/// The type of value an option holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    Int,
    Float,
    Bool,
    StringList,
}

/// A typed option value.
///
/// Scalars are replaced on every [`set`](Value::set); lists append.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    StringList(Vec<String>),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Self::String(_) => Kind::String,
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::Bool(_) => Kind::Bool,
            Self::StringList(_) => Kind::StringList,
        }
    }

    /// Convert `raw` to this value's type and store it.
    ///
    /// On conversion failure the previous value is kept.
    pub fn set(&mut self, raw: &str) -> Result<(), String> {
        match self {
            Self::String(v) => *v = raw.to_string(),
            Self::Int(v) => *v = parse_int(raw)?,
            Self::Float(v) => *v = raw.parse::<f64>().map_err(|e| e.to_string())?,
            Self::Bool(v) => *v = parse_bool(raw)?,
            Self::StringList(v) => v.push(raw.to_string()),
        }
        Ok(())
    }

    /// Literal form for help text: strings quoted, numbers and booleans bare.
    pub fn literal(&self) -> String {
        match self {
            Self::String(v) => format!("{v:?}"),
            Self::Int(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
            Self::Bool(v) => v.to_string(),
            Self::StringList(v) => format!("{v:?}"),
        }
    }
}

/// Parse a signed 64-bit integer.
///
/// Accepts an optional sign followed by decimal digits or a `0x`, `0o`, `0b`
/// prefixed literal.
pub fn parse_int(raw: &str) -> Result<i64, String> {
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let (radix, digits) = if let Some(d) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        (16, d)
    } else if let Some(d) = unsigned
        .strip_prefix("0o")
        .or_else(|| unsigned.strip_prefix("0O"))
    {
        (8, d)
    } else if let Some(d) = unsigned
        .strip_prefix("0b")
        .or_else(|| unsigned.strip_prefix("0B"))
    {
        (2, d)
    } else {
        (10, unsigned)
    };

    // from_str_radix would accept a second sign.
    if digits.starts_with(['+', '-']) {
        return Err(format!("invalid integer {raw:?}"));
    }
    let magnitude =
        u64::from_str_radix(digits, radix).map_err(|e| format!("invalid integer {raw:?}: {e}"))?;

    if negative {
        if magnitude > i64::MAX as u64 + 1 {
            return Err(format!("integer {raw:?} out of range"));
        }
        Ok((magnitude as i64).wrapping_neg())
    } else {
        i64::try_from(magnitude).map_err(|_| format!("integer {raw:?} out of range"))
    }
}

/// Parse a boolean the way flag values and environment variables spell it.
pub fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(format!("invalid boolean {raw:?}")),
    }
}
