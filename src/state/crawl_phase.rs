//! Phase definitions for the harvest state machine

use crate::HarvestError;
use std::fmt;

/// Represents the current phase of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Fetching listing page 1 and determining the page count
    Planning,

    /// Walking listing pages and extracting question entries
    Listing,

    /// Fetching and extracting the detail pages of one listing page
    Detailing,

    /// Run finished; records are ready for encoding
    Done,
}

impl CrawlPhase {
    /// Returns true if no further work happens in this phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if moving from this phase to `next` is allowed
    ///
    /// Any phase may end the run early; otherwise phases only move forward,
    /// with Listing and Detailing alternating once per listing page.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Planning, Self::Listing)
                | (Self::Listing, Self::Detailing)
                | (Self::Detailing, Self::Listing)
                | (Self::Planning, Self::Done)
                | (Self::Listing, Self::Done)
                | (Self::Detailing, Self::Done)
        )
    }

    /// Moves to `next`, rejecting transitions the state machine does not allow
    pub fn transition(&mut self, next: CrawlPhase) -> Result<(), HarvestError> {
        if !self.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    /// Short lowercase name used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Listing => "listing",
            Self::Detailing => "detailing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
