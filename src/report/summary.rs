use crate::probe::ProbeResult;

/// Running totals over the result stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    /// 2xx/3xx responses.
    pub successful: usize,
    /// Responses with any other status.
    pub failed: usize,
    /// No response at all (status 0).
    pub errored: usize,
}

impl BatchSummary {
    pub fn record(&mut self, result: &ProbeResult) {
        self.total = self.total.saturating_add(1);
        if result.is_transport_error() {
            self.errored = self.errored.saturating_add(1);
        } else if result.is_success() {
            self.successful = self.successful.saturating_add(1);
        } else {
            self.failed = self.failed.saturating_add(1);
        }
    }

    #[must_use]
    pub fn from_results(results: &[ProbeResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.record(result);
        }
        summary
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} result(s): {} successful, {} failed, {} errored",
            self.total, self.successful, self.failed, self.errored
        )
    }
}
