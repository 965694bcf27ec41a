use indexmap::IndexMap;

use crate::error::{DeclareError, ParseError};
use crate::value::{Kind, Value};

/// Prefix a bare option name for display: `-x` for one character, `--name` otherwise.
pub fn prefixed(name: &str) -> String {
    if name.chars().count() == 1 {
        format!("-{name}")
    } else {
        format!("--{name}")
    }
}

/// Everything needed to declare one option.
///
/// `value` is the starting value (default, possibly already replaced by an
/// environment variable); it is also recorded as the slot's default.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub names: Vec<String>,
    pub usage: String,
    pub value: Value,
    pub optional: bool,
}

impl Declaration {
    pub fn new(names: Vec<String>, value: Value) -> Self {
        Self {
            names,
            usage: String::new(),
            value,
            optional: false,
        }
    }
}

/// Runtime holder for one declared option.
#[derive(Debug, Clone)]
pub struct Slot {
    names: Vec<String>,
    usage: String,
    value: Value,
    default: Value,
    optional: bool,
    positional: bool,
    explicit: bool,
}

impl Slot {
    /// Canonical (first) name.
    pub fn name(&self) -> &str {
        &self.names[0]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn kind(&self) -> Kind {
        self.value.kind()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_positional(&self) -> bool {
        self.positional
    }

    /// Whether the value came from the argument list (not default or env).
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// Name as it appears in messages: prefixed for named options, bare for positionals.
    pub fn display_name(&self) -> String {
        if self.positional {
            self.name().to_string()
        } else {
            prefixed(self.name())
        }
    }

    fn assign(&mut self, raw: &str) -> Result<(), String> {
        // The first explicit occurrence replaces default/env contents.
        if let Value::StringList(items) = &mut self.value {
            if !self.explicit {
                items.clear();
            }
        }
        self.value.set(raw)?;
        self.explicit = true;
        Ok(())
    }
}

/// An ordered collection of named and positional options.
///
/// Every alias maps to the same slot. Positional slots are filled in
/// declaration order.
#[derive(Debug, Clone, Default)]
pub struct OptionSet {
    slots: Vec<Slot>,
    names: IndexMap<String, usize>,
    positionals: Vec<usize>,
    rest: Vec<String>,
    missing_value: Option<usize>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a named option. Returns the slot index.
    pub fn declare(&mut self, decl: Declaration) -> Result<usize, DeclareError> {
        self.insert(decl, false)
    }

    /// Declare a positional option. Returns the slot index.
    pub fn declare_positional(&mut self, decl: Declaration) -> Result<usize, DeclareError> {
        self.insert(decl, true)
    }

    fn insert(&mut self, decl: Declaration, positional: bool) -> Result<usize, DeclareError> {
        if decl.names.is_empty() || decl.names.iter().any(|n| n.is_empty()) {
            return Err(DeclareError::Unnamed);
        }
        for (i, name) in decl.names.iter().enumerate() {
            if self.names.contains_key(name) || decl.names[..i].contains(name) {
                return Err(DeclareError::Redeclared(name.clone()));
            }
        }

        let idx = self.slots.len();
        for name in &decl.names {
            self.names.insert(name.clone(), idx);
        }
        if positional {
            self.positionals.push(idx);
        }
        self.slots.push(Slot {
            names: decl.names,
            usage: decl.usage,
            default: decl.value.clone(),
            value: decl.value,
            optional: decl.optional,
            positional,
            explicit: false,
        });
        Ok(idx)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    pub fn lookup(&self, name: &str) -> Option<&Slot> {
        self.index_of(name).map(|idx| &self.slots[idx])
    }

    pub fn slot(&self, idx: usize) -> Option<&Slot> {
        self.slots.get(idx)
    }

    /// All slots in declaration order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Tokens left after parsing: everything after `--`, or everything from
    /// the first plain token that found no positional slot.
    pub fn rest(&self) -> &[String] {
        &self.rest
    }

    pub fn arg(&self, n: usize) -> Option<&str> {
        self.rest.get(n).map(|s| s.as_str())
    }

    /// Slot index that was waiting for a value when the last parse failed.
    ///
    /// Reset at the start of every [`parse`](OptionSet::parse).
    pub fn missing_value(&self) -> Option<usize> {
        self.missing_value
    }

    /// Parse `args` left to right.
    pub fn parse(&mut self, args: &[String]) -> Result<(), ParseError> {
        self.rest.clear();
        self.missing_value = None;

        let mut next_positional = 0usize;
        let mut i = 0usize;
        while i < args.len() {
            let token = args[i].as_str();

            if token == "--" {
                self.rest.extend(args[i + 1..].iter().cloned());
                break;
            }

            let Some(name) = option_name(token) else {
                let Some(&idx) = self.positionals.get(next_positional) else {
                    // not an option and no more positionals
                    self.rest.extend(args[i..].iter().cloned());
                    break;
                };
                self.assign(idx, token)?;
                next_positional += 1;
                i += 1;
                continue;
            };

            if name.starts_with(['-', '=']) {
                return Err(ParseError::BadSyntax(token.to_string()));
            }
            i += 1;

            // --name=value
            if let Some((flag, value)) = name.split_once('=') {
                let idx = self
                    .index_of(flag)
                    .ok_or_else(|| ParseError::Unknown(prefixed(flag)))?;
                self.assign(idx, value)?;
                continue;
            }

            let (idx, negated) = match self.index_of(name) {
                Some(idx) => (idx, false),
                None => match name.strip_prefix("no-").and_then(|base| self.index_of(base)) {
                    Some(idx) if self.slots[idx].kind() == Kind::Bool => (idx, true),
                    _ => return Err(ParseError::Unknown(prefixed(name))),
                },
            };

            if self.slots[idx].kind() == Kind::Bool {
                let value = match args.get(i).map(|s| s.as_str()) {
                    Some(v @ ("true" | "false")) => {
                        i += 1;
                        v == "true"
                    }
                    _ => true,
                };
                let value = if negated { !value } else { value };
                self.assign(idx, if value { "true" } else { "false" })?;
                continue;
            }

            let Some(value) = args.get(i) else {
                self.missing_value = Some(idx);
                return Err(ParseError::MissingValue(prefixed(name)));
            };
            i += 1;
            self.assign(idx, value)?;
        }

        let unfilled = self.positionals[next_positional..]
            .iter()
            .copied()
            .find(|&idx| !self.slots[idx].optional);
        if let Some(idx) = unfilled {
            self.missing_value = Some(idx);
            return Err(ParseError::MissingValue(
                self.slots[idx].display_name(),
            ));
        }

        Ok(())
    }

    fn assign(&mut self, idx: usize, raw: &str) -> Result<(), ParseError> {
        let slot = &mut self.slots[idx];
        slot.assign(raw).map_err(|reason| ParseError::InvalidValue {
            name: slot.display_name(),
            value: raw.to_string(),
            reason,
        })
    }
}

/// Return the option name carried by `token`, without its dash prefix.
///
/// `-x` and `--name` are options; `-`, `--` and anything not starting with a
/// dash are plain tokens. A leftover `-` or `=` at the start of the name is
/// reported by the caller as bad syntax.
fn option_name(token: &str) -> Option<&str> {
    if token.len() < 2 || !token.starts_with('-') || token == "--" {
        return None;
    }
    Some(token.strip_prefix("--").unwrap_or(&token[1..]))
}
