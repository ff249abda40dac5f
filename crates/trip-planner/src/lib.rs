//! # trip-planner
//!
//! A three-agent crew that turns a travel request into a day-by-day
//! itinerary.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  TripRequest: Bangalore → Krabi, Sep 10-20, "swimming, food"   │
//! ├────────────────────────────────────────────────────────────────┤
//! │  1. City Selection Expert    search + scrape   → city report   │
//! │  2. Local Expert             search + scrape   → city guide    │
//! │  3. Travel Concierge         + calculator      → itinerary.md  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Search runs against Serper, page rendering against Browserless, and
//! long pages are summarized chunk by chunk before an agent sees them.

pub mod agents;
pub mod backend;
pub mod config;
pub mod crew;
pub mod error;
pub mod request;
pub mod svckit;
pub mod tasks;

pub use agents::TripAgents;
pub use config::PlannerConfig;
pub use crew::TripCrew;
pub use error::{PlannerError, Result};
pub use request::{TripRequest, TripResponse};
pub use tasks::TripTasks;

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{CalculatorTool, ScrapeTool, SearchTool};
}
