//! Console reporting bridge.
//!
//! Stands in for the social-media collaborators: status summaries and
//! photo captions are written to the log instead of being posted.  A
//! networked bridge would implement the same [`ReportingBridge`] trait.

use log::info;

use crate::app::ports::ReportingBridge;
use crate::error::ReportError;

#[derive(Default)]
pub struct LogReporter {
    posts: u32,
}

impl LogReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reports handed over so far.
    pub fn posts(&self) -> u32 {
        self.posts
    }
}

impl ReportingBridge for LogReporter {
    fn publish_status(&mut self, summary: &str) -> Result<(), ReportError> {
        self.posts += 1;
        for line in summary.lines() {
            info!("REPORT | status | {line}");
        }
        Ok(())
    }

    fn publish_photo(&mut self, caption: &str) -> Result<(), ReportError> {
        self.posts += 1;
        info!("REPORT | photo | growbox_{caption}.jpg");
        Ok(())
    }
}
