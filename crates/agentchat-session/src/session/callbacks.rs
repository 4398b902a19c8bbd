//! Consumer callbacks for stream output and errors.

use tracing::trace;

use crate::assembler::StreamOutcome;
use crate::error::SessionError;
use crate::types::{ChatResult, PartialResult, ThreadCreated};

pub type PartialCallback = Box<dyn Fn(&PartialResult) + Send + Sync>;
pub type FinalCallback = Box<dyn Fn(&ChatResult) + Send + Sync>;
pub type ThreadCallback = Box<dyn Fn(&ThreadCreated) + Send + Sync>;
pub type ErrorCallback = Box<dyn Fn(&SessionError) + Send + Sync>;

/// Callbacks invoked on the connection's I/O task, once per logical event.
/// They must return quickly and must not block.
#[derive(Default)]
pub struct SessionCallbacks {
    on_partial: Option<PartialCallback>,
    on_final: Option<FinalCallback>,
    on_thread_created: Option<ThreadCallback>,
    on_error: Option<ErrorCallback>,
}

impl SessionCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_partial(mut self, f: impl Fn(&PartialResult) + Send + Sync + 'static) -> Self {
        self.on_partial = Some(Box::new(f));
        self
    }

    pub fn on_final(mut self, f: impl Fn(&ChatResult) + Send + Sync + 'static) -> Self {
        self.on_final = Some(Box::new(f));
        self
    }

    pub fn on_thread_created(mut self, f: impl Fn(&ThreadCreated) + Send + Sync + 'static) -> Self {
        self.on_thread_created = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&SessionError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub(crate) fn deliver(&self, outcome: StreamOutcome) {
        match outcome {
            StreamOutcome::Partial(partial) => {
                trace!(chars = partial.content.len(), "Partial result");
                if let Some(cb) = &self.on_partial {
                    cb(&partial);
                }
            }
            StreamOutcome::Final(result) => {
                if let Some(cb) = &self.on_final {
                    cb(&result);
                }
            }
            StreamOutcome::ThreadCreated(thread) => {
                if let Some(cb) = &self.on_thread_created {
                    cb(&thread);
                }
            }
            StreamOutcome::Error(message) => self.report_error(&SessionError::Server(message)),
        }
    }

    pub(crate) fn report_error(&self, err: &SessionError) {
        if let Some(cb) = &self.on_error {
            cb(err);
        }
    }
}
