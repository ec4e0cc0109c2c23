/// Observable state of one publish attempt. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Progress {
    pub step: String,
    pub percent: u8,
    pub error: Option<String>,
    pub record_id: Option<String>,
}

impl Progress {
    pub fn is_done(&self) -> bool {
        self.percent == 100 && self.error.is_none()
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

pub trait ProgressSink {
    fn report(&mut self, progress: &Progress);
}

impl<F> ProgressSink for F
where
    F: FnMut(&Progress),
{
    fn report(&mut self, progress: &Progress) {
        self(progress)
    }
}

/// Sink that keeps every update, for callers that want the history.
#[derive(Debug, Default)]
pub struct ProgressLog {
    pub updates: Vec<Progress>,
}

impl ProgressLog {
    pub fn last(&self) -> Option<&Progress> {
        self.updates.last()
    }

    pub fn percents(&self) -> Vec<u8> {
        let mut percents: Vec<u8> = self.updates.iter().map(|p| p.percent).collect();
        percents.dedup();
        percents
    }
}

impl ProgressSink for ProgressLog {
    fn report(&mut self, progress: &Progress) {
        self.updates.push(progress.clone());
    }
}
