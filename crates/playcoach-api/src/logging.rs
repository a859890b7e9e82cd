//! Structured request logging for the analysis pipeline.

use tracing::{error, info, warn, Span};

use playcoach_models::VideoName;

use crate::pipeline::Stage;

/// Logger carrying the video name through every pipeline log line.
#[derive(Debug, Clone)]
pub struct RequestLogger {
    video_name: String,
}

impl RequestLogger {
    pub fn new(video_name: &VideoName) -> Self {
        Self {
            video_name: video_name.to_string(),
        }
    }

    /// Log reaching `stage`.
    pub fn stage(&self, stage: Stage, message: &str) {
        info!(
            video_name = %self.video_name,
            stage = stage.as_str(),
            "{}", message
        );
    }

    pub fn warning(&self, stage: Stage, message: &str) {
        warn!(
            video_name = %self.video_name,
            stage = stage.as_str(),
            "{}", message
        );
    }

    /// Log a failure while attempting `stage`.
    pub fn failed(&self, stage: Stage, err: &dyn std::error::Error) {
        error!(
            video_name = %self.video_name,
            stage = stage.as_str(),
            error = %err,
            "Analysis failed"
        );
    }

    pub fn video_name(&self) -> &str {
        &self.video_name
    }

    pub fn create_span(&self) -> Span {
        tracing::info_span!("analysis", video_name = %self.video_name)
    }
}

/// Log capture for tests.
#[cfg(test)]
pub(crate) mod capture {
    use std::sync::{Arc, Mutex};

    use tracing::subscriber::DefaultGuard;

    /// Formatted log output collected in memory.
    #[derive(Clone, Default)]
    pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        /// Route this thread's events here until the guard drops.
        pub(crate) fn install(&self) -> DefaultGuard {
            let writer = self.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_writer(move || writer.clone())
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_default(subscriber)
        }

        pub(crate) fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }
}
