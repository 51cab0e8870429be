//! URL canonicalization and redirection rewriting.
//!
//! URLs are kept in their textual form and never decoded: the scheme is
//! lower-cased on parse, and bytes that may not appear literally in a path or
//! fragment (spaces, non-ASCII) are percent-encoded. Otherwise the case of
//! host, path, query and fragment survives unless an operation changes it.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Host every redirection target is forced onto.
pub const REDIRECT_HOST: &str = "www.byfood.com";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("missing scheme")]
    MissingScheme,
    #[error("missing host")]
    MissingHost,
    #[error("invalid character {0:?} in URL")]
    InvalidCharacter(char),
    #[error("invalid port {0:?} after host")]
    InvalidPort(String),
    #[error("invalid URL escape {0:?}")]
    InvalidEscape(String),
    #[error("missing ']' in host")]
    UnclosedBracket,
    #[error("unsupported operation {0:?}")]
    UnsupportedOperation(String),
}

/// Rewrite applied by [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Drop query and fragment, trim trailing slashes.
    Canonical,
    /// Force the redirect host and lower-case everything.
    Redirection,
    /// Canonical, then redirection.
    All,
}

impl Operation {
    pub const VARIANTS: [Operation; 3] = [
        Operation::Canonical,
        Operation::Redirection,
        Operation::All,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Canonical => "canonical",
            Operation::Redirection => "redirection",
            Operation::All => "all",
        }
    }
}

impl FromStr for Operation {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::VARIANTS
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UrlError::UnsupportedOperation(s.to_string()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An absolute URL split into the parts the operations touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    scheme: String,
    userinfo: Option<String>,
    host: String,
    path: String,
    /// `Some("")` keeps a bare trailing `?`.
    query: Option<String>,
    fragment: String,
}

impl ParsedUrl {
    /// Parse an absolute `scheme://host/...` URL.
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        if let Some(c) = raw.chars().find(|c| c.is_ascii_control()) {
            return Err(UrlError::InvalidCharacter(c));
        }

        let (rest, fragment) = match raw.split_once('#') {
            Some((rest, fragment)) => (rest, fragment.to_string()),
            None => (raw, String::new()),
        };

        let (scheme, rest) = split_scheme(rest).ok_or(UrlError::MissingScheme)?;

        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, Some(query.to_string())),
            None => (rest, None),
        };

        let rest = rest.strip_prefix("//").ok_or(UrlError::MissingHost)?;
        let (authority, path) = match rest.find('/') {
            Some(i) => rest.split_at(i),
            None => (rest, ""),
        };
        let (userinfo, host) = match authority.rsplit_once('@') {
            Some((userinfo, host)) => (Some(userinfo.to_string()), host),
            None => (None, authority),
        };

        if host.is_empty() {
            return Err(UrlError::MissingHost);
        }
        if let Some(c) = host.chars().find(|&c| !is_host_char(c)) {
            return Err(UrlError::InvalidCharacter(c));
        }
        check_port(host)?;
        check_escapes(host)?;
        if let Some(userinfo) = &userinfo {
            check_escapes(userinfo)?;
        }
        check_escapes(path)?;
        check_escapes(&fragment)?;

        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            userinfo,
            host: host.to_string(),
            path: escape(path, is_path_byte),
            query,
            fragment: escape(&fragment, is_fragment_byte),
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    fn canonicalize(&mut self) {
        self.query = None;
        self.fragment.clear();

        let trimmed = self.path.trim_end_matches('/').len();
        self.path.truncate(trimmed);
        if self.path.is_empty() {
            self.path.push('/');
        }
    }

    fn redirect(&mut self) {
        self.host = REDIRECT_HOST.to_string();

        self.scheme = self.scheme.to_lowercase();
        self.host = self.host.to_lowercase();
        self.path = lowercase_outside_escapes(&self.path);
        self.query = self.query.as_deref().map(str::to_lowercase);
        self.fragment = lowercase_outside_escapes(&self.fragment);
    }
}

impl FromStr for ParsedUrl {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ParsedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://", self.scheme)?;
        if let Some(userinfo) = &self.userinfo {
            write!(f, "{}@", userinfo)?;
        }
        write!(f, "{}{}", self.host, self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{}", query)?;
        }
        if !self.fragment.is_empty() {
            write!(f, "#{}", self.fragment)?;
        }
        Ok(())
    }
}

/// `scheme ":" rest`, where scheme is a letter followed by letters, digits,
/// `+`, `-` or `.`. Anything else means the input has no scheme.
fn split_scheme(raw: &str) -> Option<(&str, &str)> {
    for (i, c) in raw.char_indices() {
        match c {
            'a'..='z' | 'A'..='Z' => {}
            '0'..='9' | '+' | '-' | '.' if i > 0 => {}
            ':' if i > 0 => return Some((&raw[..i], &raw[i + 1..])),
            _ => return None,
        }
    }
    None
}

/// Characters allowed literally in a host: letters, digits, the unreserved
/// and sub-delimiter marks, brackets for IP literals, `%` escapes, and
/// anything outside ASCII.
fn is_host_char(c: char) -> bool {
    !c.is_ascii()
        || c.is_ascii_alphanumeric()
        || matches!(
            c,
            '-' | '.' | '_' | '~' | '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ','
                | ';' | '=' | ':' | '[' | ']' | '<' | '>' | '"' | '%'
        )
}

/// The port, if present, must be all digits; an empty port is allowed.
fn check_port(host: &str) -> Result<(), UrlError> {
    let port = match host.strip_prefix('[') {
        Some(literal) => {
            let end = literal.find(']').ok_or(UrlError::UnclosedBracket)?;
            &literal[end + 1..]
        }
        None => host.rfind(':').map_or("", |i| &host[i..]),
    };

    match port.strip_prefix(':') {
        _ if port.is_empty() => Ok(()),
        Some(digits) if digits.bytes().all(|b| b.is_ascii_digit()) => Ok(()),
        _ => Err(UrlError::InvalidPort(port.to_string())),
    }
}

/// Every `%` must start a two-digit hex escape.
fn check_escapes(s: &str) -> Result<(), UrlError> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        let valid = bytes
            .get(i + 1..i + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            let end = (i + 3).min(bytes.len());
            return Err(UrlError::InvalidEscape(
                String::from_utf8_lossy(&bytes[i..end]).into_owned(),
            ));
        }
        i += 3;
    }
    Ok(())
}

fn is_path_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'-' | b'.' | b'_' | b'~' | b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*'
                | b'+' | b',' | b';' | b'=' | b':' | b'@' | b'/' | b'%'
        )
}

fn is_fragment_byte(b: u8) -> bool {
    is_path_byte(b) || b == b'?'
}

/// Percent-encode every byte `allowed` rejects. Existing escapes are kept.
fn escape(s: &str, allowed: fn(u8) -> bool) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if allowed(b) {
            out.push(char::from(b));
        } else {
            out.push('%');
            out.push(char::from(HEX[usize::from(b >> 4)]));
            out.push(char::from(HEX[usize::from(b & 0x0f)]));
        }
    }
    out
}

/// Lower-case `s`, leaving the hex digits of `%XX` escapes as they are.
fn lowercase_outside_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut hex_left = 0;
    for c in s.chars() {
        if hex_left > 0 {
            out.push(c);
            hex_left -= 1;
        } else {
            if c == '%' {
                hex_left = 2;
            }
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Apply `operation` to a copy of `url`; the input is never modified.
pub fn normalize(url: &ParsedUrl, operation: Operation) -> String {
    let mut out = url.clone();
    match operation {
        Operation::Canonical => out.canonicalize(),
        Operation::Redirection => out.redirect(),
        Operation::All => {
            out.canonicalize();
            out.redirect();
        }
    }
    out.to_string()
}

/// Like [`normalize`], for an operation name that has not been checked yet.
pub fn process(url: &ParsedUrl, operation: &str) -> Result<String, UrlError> {
    let operation = operation.parse()?;
    Ok(normalize(url, operation))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> ParsedUrl {
        ParsedUrl::parse(raw).unwrap()
    }

    #[test]
    fn all_strips_query_and_forces_lowercase_host() {
        let u = url("https://BYFOOD.com/food-EXPeriences?query=abc/");
        assert_eq!(
            normalize(&u, Operation::All),
            "https://www.byfood.com/food-experiences"
        );
    }

    #[test]
    fn canonical_preserves_case() {
        let u = url("https://BYFOOD.com/food-EXPeriences?query=abc/");
        assert_eq!(
            normalize(&u, Operation::Canonical),
            "https://BYFOOD.com/food-EXPeriences"
        );
    }

    #[test]
    fn redirection_keeps_query_and_trailing_slash() {
        let u = url("https://BYFOOD.com/food-EXPeriences?query=ABC/");
        assert_eq!(
            normalize(&u, Operation::Redirection),
            "https://www.byfood.com/food-experiences?query=abc/"
        );

        let u = url("http://example.com/Menu/#Top");
        assert_eq!(
            normalize(&u, Operation::Redirection),
            "http://www.byfood.com/menu/#top"
        );
    }

    #[test]
    fn canonical_trims_every_trailing_slash_and_fragment() {
        assert_eq!(
            normalize(&url("https://a.com/x///#frag"), Operation::Canonical),
            "https://a.com/x"
        );
        assert_eq!(
            normalize(&url("https://a.com"), Operation::Canonical),
            "https://a.com/"
        );
        assert_eq!(
            normalize(&url("https://a.com///?q=1"), Operation::Canonical),
            "https://a.com/"
        );
    }

    #[test]
    fn redirection_replaces_port_and_keeps_userinfo() {
        assert_eq!(
            normalize(&url("HTTP://Bob@Example.com:8080/A?B=C"), Operation::Redirection),
            "http://Bob@www.byfood.com/a?b=c"
        );
    }

    #[test]
    fn bare_question_mark_survives_redirection() {
        assert_eq!(
            normalize(&url("https://a.com/x?"), Operation::Redirection),
            "https://www.byfood.com/x?"
        );
    }

    #[test]
    fn operations_are_idempotent() {
        let inputs = [
            "https://BYFOOD.com/food-EXPeriences?query=abc/",
            "https://a.com/x///#frag",
            "http://Example.COM/A/B/?Q=1#F",
            "https://a.com",
            "https://a.com/Café Menu/#Top Row",
        ];
        for raw in inputs {
            for op in Operation::VARIANTS {
                let once = normalize(&url(raw), op);
                let twice = normalize(&url(&once), op);
                assert_eq!(once, twice, "{} on {}", op, raw);
            }
        }
    }

    #[test]
    fn input_is_not_mutated() {
        let u = url("https://BYFOOD.com/A/?q=1#f");
        let before = u.clone();
        let _ = normalize(&u, Operation::All);
        assert_eq!(u, before);
        assert_eq!(u.host(), "BYFOOD.com");
        assert_eq!(u.path(), "/A/");
        assert_eq!(u.query(), Some("q=1"));
        assert_eq!(u.fragment(), "f");
    }

    #[test]
    fn rejects_urls_without_scheme_or_host() {
        assert_eq!(ParsedUrl::parse("byfood.com/abc"), Err(UrlError::MissingScheme));
        assert_eq!(ParsedUrl::parse("not a url"), Err(UrlError::MissingScheme));
        assert_eq!(ParsedUrl::parse("://a.com"), Err(UrlError::MissingScheme));
        assert_eq!(ParsedUrl::parse("https://"), Err(UrlError::MissingHost));
        assert_eq!(ParsedUrl::parse("https:/a.com"), Err(UrlError::MissingHost));
        assert_eq!(ParsedUrl::parse("mailto:me@a.com"), Err(UrlError::MissingHost));
        assert_eq!(
            ParsedUrl::parse("https://a b.com/"),
            Err(UrlError::InvalidCharacter(' '))
        );
        assert_eq!(
            ParsedUrl::parse("https://a.com/\n"),
            Err(UrlError::InvalidCharacter('\n'))
        );
        assert_eq!(
            ParsedUrl::parse("https://a.com:abc/x"),
            Err(UrlError::InvalidPort(":abc".to_string()))
        );
        assert_eq!(
            ParsedUrl::parse("https://[::1]x/"),
            Err(UrlError::InvalidPort("x".to_string()))
        );
        assert_eq!(ParsedUrl::parse("https://[::1/"), Err(UrlError::UnclosedBracket));
        assert_eq!(
            ParsedUrl::parse("https://a.com/%zz"),
            Err(UrlError::InvalidEscape("%zz".to_string()))
        );
        assert_eq!(
            ParsedUrl::parse("https://a.com/x%4"),
            Err(UrlError::InvalidEscape("%4".to_string()))
        );
        assert_eq!(
            ParsedUrl::parse("https://a%g1.com/"),
            Err(UrlError::InvalidEscape("%g1".to_string()))
        );
        assert_eq!(
            ParsedUrl::parse("https://a{b}.com/"),
            Err(UrlError::InvalidCharacter('{'))
        );
    }

    #[test]
    fn accepts_ports_and_ip_literals() {
        assert_eq!(url("https://a.com:8080/x").to_string(), "https://a.com:8080/x");
        assert_eq!(url("https://a.com:/x").to_string(), "https://a.com:/x");
        assert_eq!(url("http://[::1]:80/").to_string(), "http://[::1]:80/");
        assert_eq!(url("http://a<b>.com/").host(), "a<b>.com");
    }

    #[test]
    fn path_is_percent_encoded_on_output() {
        let u = url("https://a.com/A B/");
        assert_eq!(u.path(), "/A%20B/");
        assert_eq!(normalize(&u, Operation::All), "https://www.byfood.com/a%20b");
        assert_eq!(normalize(&u, Operation::Canonical), "https://a.com/A%20B");

        let u = url("https://a.com/Café/%4A#Top Row");
        assert_eq!(
            normalize(&u, Operation::Redirection),
            "https://www.byfood.com/caf%C3%A9/%4A#top%20row"
        );
    }

    #[test]
    fn scheme_is_lowercased_on_parse() {
        let u = url("HTTPS://BYFOOD.com/X");
        assert_eq!(u.scheme(), "https");
        assert_eq!(normalize(&u, Operation::Canonical), "https://BYFOOD.com/X");
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let u = url("https://a.com/");
        assert_eq!(
            process(&u, "nope"),
            Err(UrlError::UnsupportedOperation("nope".to_string()))
        );
        assert_eq!(process(&u, "Canonical").unwrap_err().to_string(), "unsupported operation \"Canonical\"");
        assert_eq!(process(&u, "all").unwrap(), "https://www.byfood.com/");
    }
}
