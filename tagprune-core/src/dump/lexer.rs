//! Quote-aware scanning of SQL literal text.
//!
//! This is not a SQL parser. It only knows enough about quoting to find
//! the real end of an `INSERT` statement, cut its `VALUES` list into row
//! tuples, and cut a tuple into literal fields. Delimiters are ASCII, so the
//! scanners walk bytes and only ever slice at ASCII positions.

/// Row identifier as stored in the leading column of a tuple.
pub type RowId = u64;

/// A single literal inside a row tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Int(i64),
    /// Quoted string, unescaped.
    Str(String),
    Null,
    /// Anything else (floats, hex literals, function calls), trimmed.
    Raw(String),
}

impl SqlValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Non-negative integer usable as a row id.
    pub fn as_id(&self) -> Option<RowId> {
        self.as_int().and_then(|v| RowId::try_from(v).ok())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    Plain,
    Quoted(u8),
    Escaped(u8),
}

impl QuoteState {
    #[inline]
    fn step(self, b: u8) -> Self {
        match self {
            Self::Plain if b == b'\'' || b == b'"' => Self::Quoted(b),
            Self::Plain => Self::Plain,
            Self::Quoted(q) if b == b'\\' => Self::Escaped(q),
            // A doubled quote closes and immediately reopens, which is what `''` means.
            Self::Quoted(q) if b == q => Self::Plain,
            Self::Quoted(q) => Self::Quoted(q),
            Self::Escaped(q) => Self::Quoted(q),
        }
    }
}

/// Byte offset of the first `;` at or after `from` that is not inside a
/// quoted literal.
pub fn find_statement_end(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut state = QuoteState::Plain;
    for (offset, &b) in bytes.get(from..)?.iter().enumerate() {
        if state == QuoteState::Plain && b == b';' {
            return Some(from + offset);
        }
        state = state.step(b);
    }
    None
}

/// Row tuples of a `VALUES` list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TupleSplit<'a> {
    /// Each tuple including its parentheses, in source order.
    pub tuples: Vec<&'a str>,
    /// Runs of text that were neither a tuple nor a separator (including an
    /// unclosed trailing tuple).
    pub stray: usize,
}

/// Cuts a `VALUES` list into its top-level parenthesized tuples.
///
/// Separators (commas and whitespace) between tuples are discarded.
pub fn split_tuples(rows: &str) -> TupleSplit<'_> {
    let bytes = rows.as_bytes();
    let mut split = TupleSplit::default();
    let mut state = QuoteState::Plain;
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_stray = false;

    for (i, &b) in bytes.iter().enumerate() {
        if state != QuoteState::Plain {
            state = state.step(b);
            continue;
        }
        match b {
            b'(' => {
                if depth == 0 {
                    start = i;
                    in_stray = false;
                }
                depth += 1;
            }
            b')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    split.tuples.push(&rows[start..=i]);
                }
            }
            _ if depth == 0 => {
                if b == b',' || b.is_ascii_whitespace() {
                    in_stray = false;
                } else if !in_stray {
                    split.stray += 1;
                    in_stray = true;
                }
                // Quotes outside any tuple still have to be tracked.
                state = state.step(b);
            }
            _ => state = state.step(b),
        }
    }

    if depth > 0 {
        split.stray += 1;
    }
    split
}

/// Row id held in the first field of a tuple.
///
/// The field is read with the same literal rules as [`split_fields`], so a
/// padded or signed id (`( 1,...)`, `(+1,...)`) yields the id the row parsers
/// see.
pub fn leading_id(tuple: &str) -> Option<RowId> {
    let inner = tuple.trim().strip_prefix('(')?;
    let end = inner.find([',', ')']).unwrap_or(inner.len());
    parse_value(&inner[..end])?.as_id()
}

/// Splits a `(...)` tuple into its literal fields.
///
/// Returns `None` if the text is not parenthesized or a quoted field is
/// malformed.
pub fn split_fields(tuple: &str) -> Option<Vec<SqlValue>> {
    let inner = tuple.trim().strip_prefix('(')?.strip_suffix(')')?;
    let bytes = inner.as_bytes();
    let mut fields = Vec::new();
    let mut state = QuoteState::Plain;
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, &b) in bytes.iter().enumerate() {
        if state == QuoteState::Plain {
            match b {
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                b',' if depth == 0 => {
                    fields.push(parse_value(&inner[start..i])?);
                    start = i + 1;
                    continue;
                }
                _ => {}
            }
        }
        state = state.step(b);
    }
    if state != QuoteState::Plain {
        return None;
    }
    if !inner.trim().is_empty() || !fields.is_empty() {
        fields.push(parse_value(&inner[start..])?);
    }
    Some(fields)
}

fn parse_value(raw: &str) -> Option<SqlValue> {
    let raw = raw.trim();
    let first = raw.as_bytes().first().copied();
    if let Some(q @ (b'\'' | b'"')) = first {
        return unquote(raw, q).map(SqlValue::Str);
    }
    if raw.eq_ignore_ascii_case("NULL") {
        return Some(SqlValue::Null);
    }
    if let Ok(v) = raw.parse::<i64>() {
        return Some(SqlValue::Int(v));
    }
    Some(SqlValue::Raw(raw.to_string()))
}

/// Unescapes a quoted literal, MySQL style.
fn unquote(raw: &str, quote: u8) -> Option<String> {
    let q = quote as char;
    let body = raw.strip_prefix(q)?.strip_suffix(q)?;
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            let escaped = chars.next()?;
            out.push(match escaped {
                '0' => '\0',
                'n' => '\n',
                'r' => '\r',
                't' => '\t',
                'b' => '\u{8}',
                'Z' => '\u{1a}',
                other => other,
            });
        } else if c == q {
            // Only a doubled quote may appear unescaped inside the body.
            if chars.next() != Some(q) {
                return None;
            }
            out.push(q);
        } else {
            out.push(c);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_end_skips_quoted_semicolons() {
        let text = "INSERT INTO `t` VALUES (1,'a;b'),(2,'it\\'s; fine'),(3,'x'';y');\nNEXT;";
        let end = find_statement_end(text, 0).unwrap();
        assert_eq!(&text[end - 11..=end], "(3,'x'';y');");
    }

    #[test]
    fn test_statement_end_missing() {
        assert_eq!(find_statement_end("(1,'unterminated;", 0), None);
        assert_eq!(find_statement_end("abc", 10), None);
    }

    #[test]
    fn test_split_tuples_multiline() {
        let split = split_tuples("\n(1,'FOO'),\n(2,'BAR')\n");
        assert_eq!(split.tuples, vec!["(1,'FOO')", "(2,'BAR')"]);
        assert_eq!(split.stray, 0);
    }

    #[test]
    fn test_split_tuples_nested_and_quoted_parens() {
        let split = split_tuples(" (1,'a)b',CONCAT('x','y')),(2,'(')");
        assert_eq!(split.tuples, vec!["(1,'a)b',CONCAT('x','y'))", "(2,'(')"]);
    }

    #[test]
    fn test_split_tuples_counts_stray_text() {
        let split = split_tuples("(1,'A'), garbage ,(2,'B'),(3,'C'");
        assert_eq!(split.tuples, vec!["(1,'A')", "(2,'B')"]);
        assert_eq!(split.stray, 2);
    }

    #[test]
    fn test_leading_id() {
        assert_eq!(leading_id("(42,'X')"), Some(42));
        assert_eq!(leading_id("( 42,'X')"), Some(42));
        assert_eq!(leading_id("(+7 ,'X')"), Some(7));
        assert_eq!(leading_id("(-1,'X')"), None);
        assert_eq!(leading_id("('3','X')"), None);
        assert_eq!(leading_id("(NULL,'X')"), None);
        assert_eq!(leading_id("42"), None);
    }

    #[test]
    fn test_split_fields() {
        let fields = split_fields("(7,'it\\'s','',NULL,1.5,'a''b')").unwrap();
        assert_eq!(
            fields,
            vec![
                SqlValue::Int(7),
                SqlValue::Str("it's".into()),
                SqlValue::Str(String::new()),
                SqlValue::Null,
                SqlValue::Raw("1.5".into()),
                SqlValue::Str("a'b".into()),
            ]
        );
    }

    #[test]
    fn test_split_fields_rejects_malformed() {
        assert_eq!(split_fields("1,'a'"), None);
        assert_eq!(split_fields("(1,'open)"), None);
        assert_eq!(split_fields("()"), Some(vec![]));
    }

    #[test]
    fn test_as_id_rejects_negative() {
        assert_eq!(SqlValue::Int(-1).as_id(), None);
        assert_eq!(SqlValue::Int(3).as_id(), Some(3));
        assert_eq!(SqlValue::Str("3".into()).as_id(), None);
    }
}
