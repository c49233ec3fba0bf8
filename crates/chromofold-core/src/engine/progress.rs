#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    /// Emitted by the convert-factor search as each candidate completes.
    FactorEvaluated { factor: f64, correlation: f64 },

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reporter_without_callback_is_silent() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::PhaseFinish);
    }

    #[test]
    fn events_reach_the_callback_in_order() {
        let seen: Mutex<Vec<String>> = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            seen.lock().unwrap().push(format!("{event:?}"));
        }));

        reporter.report(Progress::PhaseStart { name: "Converting" });
        reporter.report(Progress::TaskStart { total_steps: 2 });
        reporter.report(Progress::TaskIncrement);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].contains("Converting"));
        assert!(seen[2].contains("TaskIncrement"));
    }
}
