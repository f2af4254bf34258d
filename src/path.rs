//! URL path helpers exposed to project scripts as `Path`.

/// The last segment of `url`.
pub fn filename(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Everything up to and including the last `/` of `url`.
///
/// A url without any `/` yields `"/"`.
pub fn directory(url: &str) -> String {
    match url.rfind('/') {
        Some(i) => url[..=i].to_string(),
        None => "/".to_string(),
    }
}

pub fn is_relative(url: &str) -> bool {
    url.starts_with('.')
}

/// Join `url` onto `base`, where `base` names a directory.
pub fn join(base: &str, url: &str) -> String {
    if base.is_empty() || url.starts_with('/') {
        return url.to_string();
    }
    let url = url.strip_prefix("./").unwrap_or(url);
    if base.ends_with('/') {
        format!("{base}{url}")
    } else {
        format!("{base}/{url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_filename_and_directory() {
        assert_eq!(filename("/resources/tilesets/tileset.json"), "tileset.json");
        assert_eq!(directory("/resources/tilesets/tileset.json"), "/resources/tilesets/");
        assert_eq!(filename("plain"), "plain");
        assert_eq!(directory("plain"), "/");
    }

    #[test]
    fn relative_urls_start_with_a_dot() {
        assert!(is_relative("./bush.png"));
        assert!(is_relative("../bush.png"));
        assert!(!is_relative("/bush.png"));
    }

    #[test]
    fn join_respects_absolute_urls() {
        assert_eq!(join("/project/", "./main.rhai"), "/project/main.rhai");
        assert_eq!(join("/project", "config.json"), "/project/config.json");
        assert_eq!(join("/project/", "/abs.png"), "/abs.png");
        assert_eq!(join("", "x.png"), "x.png");
    }
}
