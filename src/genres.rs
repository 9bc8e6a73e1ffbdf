use std::collections::BTreeSet;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenreParseError {
  #[error("missing closing bracket in genre list")]
  UnclosedBracket,
  #[error("unterminated quote in genre list")]
  UnterminatedQuote,
  #[error("unexpected character '{0}' in genre list")]
  UnexpectedChar(char)
}

/// Parse the stored genre representation into a set of labels.
///
/// Accepts a JSON string array, a bracketed quoted list in either quote
/// style (`['Fantasy', "Sci-Fi"]`), or a bare comma-delimited list. Anything
/// bracketed but malformed fails closed; stored data is never evaluated.
pub fn parse_genre_list(raw: &str) -> Result<BTreeSet<String>, GenreParseError> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Ok(BTreeSet::new());
  }
  if trimmed.starts_with('[') {
    if let Ok(labels) = serde_json::from_str::<Vec<String>>(trimmed) {
      return Ok(collect_labels(labels));
    }
    return parse_bracketed(trimmed);
  }
  Ok(collect_labels(trimmed.split(',').map(str::to_owned)))
}

fn collect_labels<I>(labels: I) -> BTreeSet<String>
  where I: IntoIterator<Item = String> {
  labels.into_iter()
    .map(|label| label.trim().to_owned())
    .filter(|label| !label.is_empty())
    .collect()
}

/// Strict tokenizer for the bracketed quoted-list form. Every entry must be
/// a quoted string; entries are comma separated.
fn parse_bracketed(input: &str) -> Result<BTreeSet<String>, GenreParseError> {
  let inner = input
    .strip_prefix('[')
    .and_then(|rest| rest.strip_suffix(']'))
    .ok_or(GenreParseError::UnclosedBracket)?;

  let mut labels = Vec::new();
  let mut chars = inner.chars().peekable();
  loop {
    while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
      chars.next();
    }
    let quote = match chars.next() {
      None => break,
      Some(c @ ('\'' | '"')) => c,
      Some(other) => return Err(GenreParseError::UnexpectedChar(other))
    };
    let mut label = String::new();
    loop {
      match chars.next() {
        None => return Err(GenreParseError::UnterminatedQuote),
        Some(c) if c == quote => break,
        Some(c) => label.push(c)
      }
    }
    labels.push(label);
    while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
      chars.next();
    }
    match chars.next() {
      None => break,
      Some(',') => continue,
      Some(other) => return Err(GenreParseError::UnexpectedChar(other))
    }
  }
  Ok(collect_labels(labels))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn set(labels: &[&str]) -> BTreeSet<String> {
    labels.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn parses_single_quoted_list() {
    let parsed = parse_genre_list("['Fantasy', 'Adventure']").unwrap();
    assert_eq!(parsed, set(&["Adventure", "Fantasy"]));
  }

  #[test]
  fn parses_json_array() {
    let parsed = parse_genre_list(r#"["Sci-Fi", "Adventure"]"#).unwrap();
    assert_eq!(parsed, set(&["Adventure", "Sci-Fi"]));
  }

  #[test]
  fn parses_bare_delimited_list() {
    let parsed = parse_genre_list("Fantasy, Adventure , Fantasy").unwrap();
    assert_eq!(parsed, set(&["Adventure", "Fantasy"]));
  }

  #[test]
  fn empty_input_is_an_empty_set() {
    assert!(parse_genre_list("").unwrap().is_empty());
    assert!(parse_genre_list("   ").unwrap().is_empty());
    assert!(parse_genre_list("[]").unwrap().is_empty());
  }

  #[test]
  fn mixed_quote_styles_parse() {
    let parsed = parse_genre_list(r#"['Fantasy', "Sci-Fi"]"#).unwrap();
    assert_eq!(parsed, set(&["Fantasy", "Sci-Fi"]));
  }

  #[test]
  fn unterminated_quote_fails_closed() {
    assert_eq!(
      parse_genre_list("['Fantasy"),
      Err(GenreParseError::UnclosedBracket)
    );
    assert_eq!(
      parse_genre_list("['Fantasy]"),
      Err(GenreParseError::UnterminatedQuote)
    );
  }

  #[test]
  fn unquoted_bracketed_entry_fails_closed() {
    assert_eq!(
      parse_genre_list("[Fantasy]"),
      Err(GenreParseError::UnexpectedChar('F'))
    );
  }

  #[test]
  fn non_string_entries_fail_closed() {
    assert!(parse_genre_list("[1, 2]").is_err());
  }

  #[test]
  fn whitespace_only_entries_are_dropped() {
    let parsed = parse_genre_list("['Fantasy', '  ']").unwrap();
    assert_eq!(parsed, set(&["Fantasy"]));
  }
}
