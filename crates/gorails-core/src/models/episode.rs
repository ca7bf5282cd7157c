use url::Url;

/// Episode link found on a playlist page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeReference {
    pub title: String,
    pub page_url: Url,
}

/// Series link found on the series index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesReference {
    pub title: String,
    pub url: Url,
    /// Last path segment of the series URL, used as the directory name
    pub slug: String,
}

/// What an episode page tells us before any redirect is followed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodePage {
    pub title: String,
    pub download_url: Url,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub title: String,
    pub direct_url: Url,
    pub suggested_filename: String,
}

impl SeriesReference {
    pub fn new(title: String, url: Url) -> Self {
        let slug = url
            .path_segments()
            .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| crate::utils::slugify(&title));
        Self { title, url, slug }
    }
}
