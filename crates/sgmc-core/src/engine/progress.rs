#[derive(Debug, Clone)]
pub enum Progress {
    RunStart { num_sweeps: usize, num_sites: usize },
    RunFinish,

    FillStart { target_atoms: usize },
    FillFinish { attempts: usize },

    SweepStart { index: usize, temperature: f64 },
    SweepFinish { index: usize, energy: f64, acceptance: f64 },

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
