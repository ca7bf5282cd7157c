use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub title: String,
    pub path: PathBuf,
    pub bytes: u64,
    /// File already existed and `force` was off
    pub skipped: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PlaylistSummary {
    pub total: usize,
    pub outcomes: Vec<DownloadOutcome>,
    /// Page URL and error message for every episode that failed
    pub failures: Vec<(String, String)>,
}

impl PlaylistSummary {
    pub fn downloaded(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.skipped).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| o.skipped).count()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// A run with at least one episode on disk afterwards
    pub fn is_success(&self) -> bool {
        !self.outcomes.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeriesSummary {
    pub total: usize,
    pub series: Vec<(String, PlaylistSummary)>,
    pub failures: Vec<(String, String)>,
}

impl SeriesSummary {
    pub fn completed(&self) -> usize {
        self.series.len()
    }

    /// At least one series left an episode on disk
    pub fn is_success(&self) -> bool {
        self.series.iter().any(|(_, playlist)| playlist.is_success())
    }
}
