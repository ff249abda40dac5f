//! Service Kit - Agent Tools
//!
//! Domain tools that implement `agent_core::Tool` for the trip planner.

mod browser;
mod calculator;
mod html;
mod search;

pub use browser::ScrapeTool;
pub use calculator::{CalcError, CalculatorTool, evaluate};
pub use html::HtmlExtractor;
pub use search::SearchTool;
