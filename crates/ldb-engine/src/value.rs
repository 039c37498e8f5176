//! Runtime value snapshots and display rendering.
//! - RuntimeValue: closed set of value kinds the runtime reports
//! - render/summary: uniform display rules
//! - format_number: decimal text for numbers

#![allow(missing_docs)]

use smol_str::SmolStr;

/// Longest string rendering, in bytes.
pub const MAX_STRING_BYTES: usize = 63;

/// Shown for a table value when its contents were not asked for.
pub const TABLE_PLACEHOLDER: &str = "table (not yet displayable)";

/// Snapshot of one runtime value, taken while the debuggee is suspended.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeValue {
    Nil,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    /// Lossy UTF-8 view of the runtime string.
    String(String),
    /// Shallow table contents; `None` for a table nested inside another table,
    /// which is never expanded.
    Table(Option<TableView>),
    Function,
    /// Any other kind (userdata, thread, ...), by type name.
    Other(SmolStr),
}

/// Shallow key/value listing of a table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableView {
    pub entries: Vec<TableEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry {
    pub key: RuntimeValue,
    pub value: RuntimeValue,
}

impl TableView {
    #[must_use]
    pub fn new(entries: Vec<TableEntry>) -> Self {
        Self { entries }
    }

    /// Iterate `(key, value)` display pairs.
    pub fn rendered(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.entries
            .iter()
            .map(|entry| (entry.key.render(), entry.value.render()))
    }
}

impl TableEntry {
    #[must_use]
    pub fn new(key: RuntimeValue, value: RuntimeValue) -> Self {
        Self { key, value }
    }
}

impl RuntimeValue {
    /// Runtime type name of the value.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Nil => "nil",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) | Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Table(_) => "table",
            Self::Function => "function",
            Self::Other(name) => name.as_str(),
        }
    }

    #[must_use]
    pub fn is_function(&self) -> bool {
        matches!(self, Self::Function)
    }

    /// Expanded table contents, if this is a table snapshot.
    #[must_use]
    pub fn as_table(&self) -> Option<&TableView> {
        match self {
            Self::Table(Some(view)) => Some(view),
            _ => None,
        }
    }

    /// Scalar rendering: numbers, strings and booleans as text, every other
    /// kind (tables included) as its type name.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Boolean(value) => if *value { "true" } else { "false" }.to_string(),
            Self::Integer(value) => value.to_string(),
            Self::Number(value) => format_number(*value),
            Self::String(text) => truncate_display(text, MAX_STRING_BYTES).to_string(),
            other => other.type_name().to_string(),
        }
    }

    /// Like [`render`](Self::render) but tables get the short placeholder.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Table(_) => TABLE_PLACEHOLDER.to_string(),
            other => other.render(),
        }
    }
}

/// Cut `text` to at most `max` bytes without splitting a character.
#[must_use]
pub fn truncate_display(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Decimal text with 14 significant digits (`%.14g`).
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return if value.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    // Exponent after rounding to 14 significant digits.
    let scientific = format!("{value:.13e}");
    let Some((mantissa, exp)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exp.parse().unwrap_or(0);
    if !(-4..14).contains(&exponent) {
        let mantissa = trim_fraction(mantissa);
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exponent.abs());
    }
    let decimals = usize::try_from(13 - exponent).unwrap_or(0);
    trim_fraction(&format!("{value:.decimals$}")).to_string()
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
