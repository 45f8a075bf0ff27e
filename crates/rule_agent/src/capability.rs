//! External capabilities the integration check queries.
//!
//! The event bus and the mission API live outside this crate. The checks
//! only need to know which modules are expected to use them, what a call
//! site looks like, and what an event payload must carry.

use crate::fixtures::{EventContract, EventSchema};

/// Shared event bus contract.
pub trait EventBusCapability: Send + Sync {
    /// Whether `module` is expected to emit events.
    fn expects_emission(&self, module: &str) -> bool;

    /// Source snippets that count as an emission.
    fn emission_calls(&self) -> &[String];

    /// Declared payload of an event type.
    fn schema(&self, event_type: &str) -> Option<&EventSchema>;
}

/// Cross-cutting mission creation API.
pub trait MissionCapability: Send + Sync {
    /// Whether `module` is expected to create missions.
    fn expects_missions(&self, module: &str) -> bool;

    /// Source snippets that count as a mission creation.
    fn mission_calls(&self) -> &[String];
}

impl EventBusCapability for EventContract {
    fn expects_emission(&self, module: &str) -> bool {
        self.emitting_modules.iter().any(|m| m == module)
    }

    fn emission_calls(&self) -> &[String] {
        &self.emission_calls
    }

    fn schema(&self, event_type: &str) -> Option<&EventSchema> {
        self.events.get(event_type)
    }
}

impl MissionCapability for EventContract {
    fn expects_missions(&self, module: &str) -> bool {
        self.mission_modules.iter().any(|m| m == module)
    }

    fn mission_calls(&self) -> &[String] {
        &self.mission_calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_answers_capability_queries() {
        let contract = EventContract::default();
        assert!(contract.expects_emission("orders"));
        assert!(!contract.expects_emission("marketing"));
        assert!(contract.expects_missions("campaigns"));
        assert!(contract.schema("order.created").is_some());
        assert!(contract.schema("order.deleted").is_none());
    }
}
