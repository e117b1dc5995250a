use std::time::Instant;

use once_cell::sync::Lazy;

use crate::{
    declare::RequestState,
    error::{ClassifiedError, ErrorKind},
    logging::Logger,
};

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("request"));

/// Follows one inbound request through its states and writes the outcome
/// to the `request` log.
pub struct RequestTrace {
    label: String,
    state: RequestState,
    started: Instant,
}

impl RequestTrace {
    pub fn new(label: impl Into<String>) -> Self {
        RequestTrace {
            label: label.into(),
            state: RequestState::Pending,
            started: Instant::now(),
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn advance(&mut self, next: RequestState) {
        if !self.state.can_advance_to(next) {
            LOGGER.warn(format!(
                "{} unexpected transition {:?} -> {:?}",
                self.label, self.state, next
            ));
        }

        self.state = next;
    }

    pub fn succeed(&mut self) {
        self.advance(RequestState::Success);
        LOGGER.info(format!(
            "{} succeeded in {} ms",
            self.label,
            self.started.elapsed().as_millis()
        ));
    }

    /// Records the failure together with the internal `detail` that never
    /// reaches the response body, then hands the error back.
    pub fn fail(&mut self, err: ClassifiedError, detail: &str) -> ClassifiedError {
        self.advance(RequestState::Failed(err.kind));

        let line = format!(
            "{} failed in {} ms: {} ({})",
            self.label,
            self.started.elapsed().as_millis(),
            err,
            detail
        );

        match err.kind {
            ErrorKind::Unknown => LOGGER.error(line),
            _ => LOGGER.warn(line),
        }

        err
    }
}
