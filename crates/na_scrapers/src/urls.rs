/// Prefixes treated as already absolute.
const ABSOLUTE_PREFIXES: &[&str] = &["http://", "https://", "ftp://", "data:", "mailto:", "javascript:"];

/// Joins a possibly relative `href`/`src` onto a source's base URL.
///
/// This is a syntactic join: `..` and `.` segments are left as they are.
pub fn resolve(candidate: &str, base_url: &str) -> String {
    let candidate = candidate.trim();
    if is_absolute(candidate) {
        return candidate.to_string();
    }
    if let Some(rest) = candidate.strip_prefix("//") {
        return format!("https://{}", rest);
    }

    let base = base_url.trim_end_matches('/');
    if candidate.starts_with('/') {
        format!("{}{}", base, candidate)
    } else {
        format!("{}/{}", base, candidate)
    }
}

pub fn is_absolute(candidate: &str) -> bool {
    ABSOLUTE_PREFIXES.iter().any(|prefix| {
        candidate
            .get(..prefix.len())
            .map_or(false, |head| head.eq_ignore_ascii_case(prefix))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASES: &[&str] = &["https://www.straitstimes.com", "https://www.bbc.com/sport", "http://localhost:8080"];

    #[test]
    fn test_absolute_urls_are_unchanged() {
        assert_eq!(resolve("https://cna.asia/a", BASES[0]), "https://cna.asia/a");
        assert_eq!(resolve("HTTP://cna.asia/a", BASES[0]), "HTTP://cna.asia/a");
        assert_eq!(resolve("data:image/gif;base64,R0lG", BASES[0]), "data:image/gif;base64,R0lG");
    }

    #[test]
    fn test_protocol_relative() {
        assert_eq!(resolve("//cdn.example.com/img.jpg", BASES[1]), "https://cdn.example.com/img.jpg");
    }

    #[test]
    fn test_root_relative_concatenates_directly() {
        for base in BASES {
            for path in ["/story/42", "/a/b?c=d", "/"] {
                assert_eq!(resolve(path, base), format!("{}{}", base, path));
            }
        }
        assert_eq!(resolve("/story/42", "https://www.straitstimes.com/"), "https://www.straitstimes.com/story/42");
    }

    #[test]
    fn test_bare_relative_gets_one_separator() {
        for base in BASES {
            for path in ["story/42", "img.jpg", "../up"] {
                assert_eq!(resolve(path, base), format!("{}/{}", base, path));
            }
        }
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(resolve("  /story/1 \n", BASES[0]), "https://www.straitstimes.com/story/1");
    }
}
