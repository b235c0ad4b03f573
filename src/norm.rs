use thiserror::Error;
use url::Url;

/// Why a URL was rejected during normalization. Call sites treat every
/// variant the same way (drop the URL), the split exists for logging.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("blank URL")]
    Blank,
    #[error("unsupported scheme `{0}`")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    NoHost,
    #[error(transparent)]
    Syntax(#[from] url::ParseError),
}

/// Canonical string form of an http(s) URL, used for dedup, host
/// extraction and the final result set.
///
/// Dot segments and host casing are resolved by the WHATWG parser; the
/// fragment is dropped unconditionally; a single trailing slash is
/// stripped unless the path is the bare root. Idempotent.
pub fn normalize(raw: &str) -> Result<String, NormalizeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NormalizeError::Blank);
    }

    let mut url = Url::parse(trimmed)?;
    let scheme = url.scheme().to_ascii_lowercase();
    if scheme != "http" && scheme != "https" {
        return Err(NormalizeError::UnsupportedScheme(scheme));
    }
    if url.host_str().is_none() {
        return Err(NormalizeError::NoHost);
    }

    url.set_fragment(None);

    let mut out = url.to_string();
    if out.ends_with('/') && url.path() != "/" {
        out.pop();
    }
    Ok(out)
}

/// Host of an absolute URL, or `None` when it cannot be derived.
pub fn host_of(raw: &str) -> Option<String> {
    Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fragment() {
        assert_eq!(
            normalize("https://a.com/x#frag").unwrap(),
            normalize("https://a.com/x").unwrap()
        );
    }

    #[test]
    fn strips_one_trailing_slash_but_keeps_bare_root() {
        assert_eq!(normalize("https://a.com/foo/").unwrap(), "https://a.com/foo");
        assert_eq!(normalize("https://a.com/").unwrap(), "https://a.com/");
        assert_eq!(normalize("https://a.com").unwrap(), "https://a.com/");
    }

    #[test]
    fn bare_root_with_explicit_port_keeps_the_slash() {
        // The bare-root rule is about the path, so a non-default port
        // changes nothing: `/` survives, deeper paths lose the slash.
        assert_eq!(
            normalize("http://a.com:8080/").unwrap(),
            "http://a.com:8080/"
        );
        assert_eq!(normalize("http://a.com:8080").unwrap(), "http://a.com:8080/");
        assert_eq!(
            normalize("http://a.com:8080/foo/").unwrap(),
            "http://a.com:8080/foo"
        );
    }

    #[test]
    fn resolves_dot_segments() {
        assert_eq!(
            normalize("https://a.com/x/../y/./z").unwrap(),
            "https://a.com/y/z"
        );
    }

    #[test]
    fn keeps_query_and_port() {
        assert_eq!(
            normalize("https://a.com:8080/p?q=1&r=2").unwrap(),
            "https://a.com:8080/p?q=1&r=2"
        );
    }

    #[test]
    fn is_idempotent() {
        for raw in [
            "https://a.com/foo/",
            "https://a.com/x#frag",
            "http://A.COM/x/../y",
            "https://a.com",
            "https://a.com/p?q=1",
        ] {
            let once = normalize(raw).unwrap();
            assert_eq!(normalize(&once).unwrap(), once, "not idempotent: {raw}");
        }
    }

    #[test]
    fn rejects_blank_and_relative_and_other_schemes() {
        assert!(matches!(normalize("   "), Err(NormalizeError::Blank)));
        assert!(matches!(normalize(""), Err(NormalizeError::Blank)));
        assert!(matches!(
            normalize("ftp://a.com/x"),
            Err(NormalizeError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            normalize("mailto:someone@a.com"),
            Err(NormalizeError::UnsupportedScheme(_))
        ));
        assert!(matches!(normalize("/just/a/path"), Err(NormalizeError::Syntax(_))));
        assert!(normalize("https://").is_err());
    }

    #[test]
    fn host_of_handles_absent_hosts() {
        assert_eq!(host_of("https://Example.com/p"), Some("example.com".to_string()));
        assert_eq!(host_of("not a url"), None);
    }
}
