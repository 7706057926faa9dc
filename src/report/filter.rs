use crate::probe::ProbeResult;

/// Decides which results are shown. Export ignores it and keeps everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFilter {
    show_successful: bool,
    show_failed: bool,
    search: String,
}

impl Default for ResultFilter {
    fn default() -> Self {
        Self::new(true, true, None)
    }
}

impl ResultFilter {
    #[must_use]
    pub fn new(show_successful: bool, show_failed: bool, search: Option<&str>) -> Self {
        Self {
            show_successful,
            show_failed,
            search: search.unwrap_or_default().to_lowercase(),
        }
    }

    #[must_use]
    pub fn matches(&self, result: &ProbeResult) -> bool {
        let visible = if result.is_success() {
            self.show_successful
        } else {
            self.show_failed
        };
        visible && self.matches_search(result)
    }

    pub fn apply<'results>(
        &'results self,
        results: &'results [ProbeResult],
    ) -> impl Iterator<Item = &'results ProbeResult> + 'results {
        results.iter().filter(move |result| self.matches(result))
    }

    fn matches_search(&self, result: &ProbeResult) -> bool {
        if self.search.is_empty() {
            return true;
        }
        result.url.to_lowercase().contains(&self.search)
            || result.protocol.as_str().contains(&self.search)
            || result
                .method
                .as_str()
                .to_ascii_lowercase()
                .contains(&self.search)
    }
}
