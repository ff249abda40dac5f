//! Trip Tasks
//!
//! Instruction templates for the three planning steps. Every template is
//! rendered in full when the task is built.

use std::sync::Arc;

use agent_core::{Agent, Task};

pub const CITY_SELECTION: &str = "city_selection";
pub const LOCAL_GUIDE: &str = "local_guide";
pub const ITINERARY: &str = "itinerary";

const TIP_SECTION: &str = "If you do your BEST WORK, I'll tip you $100!";

#[derive(Debug, Default, Clone, Copy)]
pub struct TripTasks;

impl TripTasks {
    pub const fn new() -> Self {
        Self
    }

    pub fn identify_task(
        &self,
        agent: Arc<Agent>,
        origin: &str,
        destination: &str,
        interests: &str,
        date_range: &str,
    ) -> Task {
        Task::new(
            CITY_SELECTION,
            format!(
                "Analyze and select the best city for a trip based on the user's criteria.\n\
                 While the user suggested {destination}, you can recommend a different city if it's a better fit.\n\
                 Your final answer must be a detailed report on the chosen city, including flight costs, weather forecast, and top attractions.\n\
                 {TIP_SECTION}\n\
                 **Trip Details:**\n\
                 - From: {origin}, To: {destination}, Dates: {date_range}, Interests: {interests}"
            ),
            "A detailed report on the chosen city with flight costs, weather, and attractions.",
            agent,
        )
    }

    pub fn gather_task(&self, agent: Arc<Agent>, interests: &str, date_range: &str) -> Task {
        Task::new(
            LOCAL_GUIDE,
            format!(
                "Compile an in-depth guide for the city chosen in the previous step.\n\
                 Focus on key attractions, local customs, and daily activities matching the traveler's interests. Find hidden gems.\n\
                 The final answer must be a comprehensive city guide rich in cultural insights and practical tips.\n\
                 {TIP_SECTION}\n\
                 **Trip Details:**\n\
                 - Dates: {date_range}, Interests: {interests}"
            ),
            "A comprehensive city guide with cultural insights and practical tips.",
            agent,
        )
    }

    pub fn plan_task(&self, agent: Arc<Agent>, interests: &str, date_range: &str) -> Task {
        Task::new(
            ITINERARY,
            format!(
                "Expand the city guide into a full, day-by-day travel itinerary.\n\
                 Include detailed plans, weather forecasts, restaurant recommendations, packing suggestions, and a complete budget breakdown.\n\
                 You MUST suggest actual places, hotels, and restaurants, explaining why each choice fits the traveler's interests.\n\
                 Your final answer MUST be a complete travel plan, formatted as markdown.\n\
                 {TIP_SECTION}\n\
                 **Trip Details:**\n\
                 - Dates: {date_range}, Interests: {interests}"
            ),
            "A complete markdown travel plan with a daily schedule, budget, and packing list.",
            agent,
        )
    }
}
