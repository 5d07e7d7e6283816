// validator.rs - Target normalization for domains, URLs and IPv4 addresses
// Validation is syntactic only. Values that pass are still passed to tools as
// discrete argv elements, never through a shell.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_HOSTNAME: Regex = Regex::new(
        r"^(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)*[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$"
    )
    .unwrap();
    static ref RE_IPV4: Regex = Regex::new(
        r"^((25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$"
    )
    .unwrap();
}

const SCHEMES: [&str; 2] = ["http://", "https://"];

fn strip_scheme(input: &str) -> &str {
    for scheme in SCHEMES {
        if let Some(head) = input.get(..scheme.len()) {
            if head.eq_ignore_ascii_case(scheme) {
                return &input[scheme.len()..];
            }
        }
    }
    input
}

/// Strip protocol, path and port, then check the hostname grammar.
/// Returns the lower-cased domain, or `None` when the input is not a hostname
/// with at least one dot.
pub fn validate_domain(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let host = strip_scheme(trimmed);
    let host = host.split('/').next().unwrap_or_default();
    let host = host.split(':').next().unwrap_or_default();

    if host.contains('.') && RE_HOSTNAME.is_match(host) {
        Some(host.to_ascii_lowercase())
    } else {
        None
    }
}

/// Prepend `http://` when no scheme is present. Permissive: the part after the
/// scheme is not checked.
pub fn validate_url(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if strip_scheme(trimmed).len() != trimmed.len() {
        Some(trimmed.to_string())
    } else {
        Some(format!("http://{}", trimmed))
    }
}

/// Strict dotted-quad IPv4. IPv6 is not supported.
pub fn validate_ip(input: &str) -> bool {
    RE_IPV4.is_match(input)
}

/// Port scan targets: an IPv4 address verbatim, or a canonical domain.
pub fn validate_host_or_ip(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if validate_ip(trimmed) {
        return Some(trimmed.to_string());
    }
    validate_domain(trimmed)
}

/// Host part of a URL (port included), used for output directory labels.
pub fn host_of(url: &str) -> String {
    strip_scheme(url.trim())
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_domain_lowercases() {
        assert_eq!(validate_domain("EXAMPLE.com"), Some("example.com".to_string()));
        assert_eq!(validate_domain("Sub.Example.CO.uk"), Some("sub.example.co.uk".to_string()));
    }

    #[test]
    fn test_validate_domain_strips_scheme_path_and_port() {
        assert_eq!(
            validate_domain("https://www.example.com:8443/login?x=1"),
            Some("www.example.com".to_string())
        );
        assert_eq!(validate_domain("HTTP://example.com/"), Some("example.com".to_string()));
    }

    #[test]
    fn test_validate_domain_rejects_garbage() {
        assert_eq!(validate_domain("not a domain"), None);
        assert_eq!(validate_domain("localhost"), None);
        assert_eq!(validate_domain(""), None);
        assert_eq!(validate_domain("-bad.example.com"), None);
        assert_eq!(validate_domain("bad-.example.com"), None);
        assert_eq!(validate_domain("example..com"), None);
        assert_eq!(validate_domain("example.com;id"), None);
        assert_eq!(validate_domain(&format!("{}.com", "a".repeat(64))), None);
        assert!(validate_domain(&format!("{}.com", "a".repeat(63))).is_some());
    }

    #[test]
    fn test_validate_url() {
        assert_eq!(validate_url("example.com"), Some("http://example.com".to_string()));
        assert_eq!(validate_url("https://x.com"), Some("https://x.com".to_string()));
        assert_eq!(validate_url("http://x.com/a"), Some("http://x.com/a".to_string()));
        assert_eq!(validate_url("   "), None);
    }

    #[test]
    fn test_validate_ip() {
        assert!(validate_ip("192.168.1.1"));
        assert!(validate_ip("0.0.0.0"));
        assert!(validate_ip("255.255.255.255"));
        assert!(!validate_ip("999.999.999.999"));
        assert!(!validate_ip("1.2.3"));
        assert!(!validate_ip("1.2.3.4.5"));
        assert!(!validate_ip("::1"));
    }

    #[test]
    fn test_validate_host_or_ip() {
        assert_eq!(validate_host_or_ip("10.0.0.1"), Some("10.0.0.1".to_string()));
        assert_eq!(validate_host_or_ip("Scanme.Nmap.org"), Some("scanme.nmap.org".to_string()));
        assert_eq!(validate_host_or_ip("not a host"), None);
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("https://example.com/admin"), "example.com");
        assert_eq!(host_of("http://example.com:8080"), "example.com:8080");
        assert_eq!(host_of("example.com"), "example.com");
    }
}
