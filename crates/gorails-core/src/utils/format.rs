use url::Url;

/// Longest slug kept in a filename, before the position prefix and extension
const MAX_SLUG_LEN: usize = 120;

/// Extension used when the asset URL does not carry one
const DEFAULT_EXTENSION: &str = "mp4";

/// Lowercase a title and join its alphanumeric runs with `-`.
/// "Demo Title" becomes "demo-title".
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.chars().count() > MAX_SLUG_LEN {
        slug = slug.chars().take(MAX_SLUG_LEN).collect();
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

/// File extension of the last path segment, if it looks like one
fn extension_from_url(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    let (_, ext) = last.rsplit_once('.')?;
    if ext.is_empty() || ext.len() > 5 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Filename for a downloaded episode.
/// Bulk downloads pass a 1-based position, which becomes a `NN_` prefix.
pub fn episode_filename(title: &str, asset_url: &Url, position: Option<usize>) -> String {
    let mut stem = slugify(title);
    if stem.is_empty() {
        stem = "episode".to_string();
    }
    let ext = extension_from_url(asset_url).unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

    match position {
        Some(pos) => format!("{:02}_{}.{}", pos, stem, ext),
        None => format!("{}.{}", stem, ext),
    }
}

/// Collapse all whitespace runs to single spaces and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Human readable byte count
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Demo Title"), "demo-title");
        assert_eq!(slugify("  Rails 7: What's New?  "), "rails-7-what-s-new");
        assert_eq!(slugify("a/b\\c|d"), "a-b-c-d");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn test_slugify_caps_length() {
        let long = "word ".repeat(100);
        let slug = slugify(&long);
        assert!(slug.chars().count() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_episode_filename() {
        let cdn = url("https://cdn.example.com/demo.mp4");
        assert_eq!(episode_filename("Demo Title", &cdn, None), "demo-title.mp4");
        assert_eq!(episode_filename("Demo Title", &cdn, Some(3)), "03_demo-title.mp4");
        assert_eq!(episode_filename("Demo Title", &cdn, Some(112)), "112_demo-title.mp4");
    }

    #[test]
    fn test_episode_filename_extension_fallbacks() {
        let no_ext = url("https://cdn.example.com/videos/12345?sig=abc");
        assert_eq!(episode_filename("Intro", &no_ext, None), "intro.mp4");

        let webm = url("https://cdn.example.com/videos/intro.WEBM?sig=abc");
        assert_eq!(episode_filename("Intro", &webm, None), "intro.webm");

        assert_eq!(episode_filename("!!!", &no_ext, None), "episode.mp4");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("\n  Episode \t 1\n"), "Episode 1");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
