//! Human-readable URL identifiers.
//!
//! Slugs look like `showroom-alfa-motors-48213`: an entity kind, the
//! kebab-cased name parts, and a 5-digit random suffix. The suffix plus
//! a UNIQUE index on the slug column keeps identifiers unique; creators
//! retry with a fresh suffix on conflict.

use rand::Rng;

/// Lowercase ASCII kebab-case of the input.
///
/// Non-alphanumeric runs collapse to a single dash; leading/trailing
/// dashes are trimmed. Non-ASCII characters are dropped.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    out
}

/// Build a slug from an entity kind and name parts.
///
/// Empty parts are skipped; if every part slugifies to nothing, the slug
/// is just `{kind}-{suffix}`.
pub fn new_slug(kind: &str, parts: &[&str]) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(10_000..=99_999);

    let mut slug = String::from(kind);
    for part in parts {
        let s = slugify(part);
        if !s.is_empty() {
            slug.push('-');
            slug.push_str(&s);
        }
    }
    slug.push('-');
    slug.push_str(&suffix.to_string());
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Alfa Motors"), "alfa-motors");
        assert_eq!(slugify("  A -- B  "), "a-b");
        assert_eq!(slugify("V8 3.0L"), "v8-3-0l");
    }

    #[test]
    fn slugify_drops_non_ascii() {
        assert_eq!(slugify("Café"), "caf");
        assert_eq!(slugify("автосалон"), "");
    }

    #[test]
    fn new_slug_shape() {
        let slug = new_slug("showroom", &["Alfa Motors"]);
        assert!(slug.starts_with("showroom-alfa-motors-"));
        let suffix = slug.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 5);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn new_slug_empty_parts() {
        let slug = new_slug("dealer", &[""]);
        assert!(slug.starts_with("dealer-"));
        assert_eq!(slug.matches('-').count(), 1);
    }

    #[test]
    fn new_slug_varies() {
        // 5-digit suffix: two of three draws colliding is vanishingly unlikely.
        let a = new_slug("product", &["same"]);
        let b = new_slug("product", &["same"]);
        let c = new_slug("product", &["same"]);
        assert!(a != b || b != c);
    }
}
