//! State module for tracking crawl progress
//!
//! The harvest moves through a fixed sequence of phases:
//! `Planning → Listing ⇄ Detailing → Done`.

mod crawl_phase;

pub use crawl_phase::CrawlPhase;
