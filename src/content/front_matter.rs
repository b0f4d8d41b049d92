//! `---` delimited front-matter.
//!
//! ```text
//! ---
//! title: Hello
//! date: 2024-02-01
//! tags: swift, hidden:seo
//! ---
//! Body starts here.
//! ```
//!
//! Parsing never fails: lines that are not `key: value` are kept aside and
//! reported by the item builder.

const DELIMITER: &str = "---";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    entries: Vec<(String, String)>,
    malformed: Vec<String>,
}

impl FrontMatter {
    /// Split a source file into its front-matter and body.
    ///
    /// Without an opening *and* closing delimiter the whole file is body.
    pub fn split(source: &str) -> (Self, &str) {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);

        let Some(rest) = strip_delimiter_line(source) else {
            return (Self::default(), source);
        };

        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            if line.trim_end() == DELIMITER {
                let block = &rest[..offset];
                let body = &rest[offset + line.len()..];
                return (Self::parse_block(block), body);
            }
            offset += line.len();
        }

        (Self::default(), source)
    }

    fn parse_block(block: &str) -> Self {
        let mut matter = Self::default();
        for line in block.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once(':') {
                Some((key, value)) if is_key(key.trim()) => {
                    matter
                        .entries
                        .push((key.trim().to_owned(), unquote(value.trim()).to_owned()));
                }
                _ => matter.malformed.push(line.to_owned()),
            }
        }
        matter
    }

    /// Value of `key`; a repeated key keeps its last value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn malformed(&self) -> &[String] {
        &self.malformed
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.malformed.is_empty()
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            malformed: Vec::new(),
        }
    }
}

fn strip_delimiter_line(source: &str) -> Option<&str> {
    let (first, rest) = source.split_once('\n').unwrap_or((source, ""));
    (first.trim_end() == DELIMITER).then_some(rest)
}

fn is_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_basic() {
        let source = "---\ntitle: Hello\ndate: 2024-02-01\n---\n# Body\n";
        let (matter, body) = FrontMatter::split(source);
        assert_eq!(matter.get("title"), Some("Hello"));
        assert_eq!(matter.get("date"), Some("2024-02-01"));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_split_without_front_matter() {
        let source = "# Just markdown\n\n---\n\nafter a rule";
        let (matter, body) = FrontMatter::split(source);
        assert!(matter.is_empty());
        assert_eq!(body, source);
    }

    #[test]
    fn test_split_unterminated_is_body() {
        let source = "---\ntitle: Hello\nno closing line";
        let (matter, body) = FrontMatter::split(source);
        assert!(matter.is_empty());
        assert_eq!(body, source);
    }

    #[test]
    fn test_values_keep_colons_and_strip_quotes() {
        let source = "---\ntitle: \"Swift: a tour\"\ndescription: 'quoted'\ntags: kind:swift, ios\n---\n";
        let (matter, body) = FrontMatter::split(source);
        assert_eq!(matter.get("title"), Some("Swift: a tour"));
        assert_eq!(matter.get("description"), Some("quoted"));
        assert_eq!(matter.get("tags"), Some("kind:swift, ios"));
        assert_eq!(body, "");
    }

    #[test]
    fn test_malformed_lines_are_kept() {
        let source = "---\ntitle: ok\njust some words\n: no key\n# comment\n---\nbody";
        let (matter, _) = FrontMatter::split(source);
        assert_eq!(matter.get("title"), Some("ok"));
        assert_eq!(matter.malformed(), ["just some words", ": no key"]);
    }

    #[test]
    fn test_crlf_and_bom() {
        let source = "\u{feff}---\r\ntitle: Windows\r\n---\r\nbody\r\n";
        let (matter, body) = FrontMatter::split(source);
        assert_eq!(matter.get("title"), Some("Windows"));
        assert_eq!(body, "body\r\n");
    }

    #[test]
    fn test_repeated_key_last_wins() {
        let (matter, _) = FrontMatter::split("---\nslug: a\nslug: b\n---\n");
        assert_eq!(matter.get("slug"), Some("b"));
    }
}
