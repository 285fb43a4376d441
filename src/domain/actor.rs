use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque operator identity supplied by the auth collaborator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ActorId(pub i64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Privileges an actor may hold. Granting lives in the auth collaborator;
/// the engine only checks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Capability {
    ManageShifts,
    HandleCash,
}

/// Capability lookup contract the engine calls before privileged operations.
pub trait CapabilitySet {
    fn has_capability(&self, capability: Capability) -> bool;
}

/// Plain actor carrier: an identity plus the capabilities the auth
/// collaborator resolved for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    capabilities: Vec<Capability>,
}

impl Actor {
    pub fn new(id: ActorId) -> Self {
        Self {
            id,
            capabilities: Vec::new(),
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.grant(capability);
        self
    }

    pub fn grant(&mut self, capability: Capability) {
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
    }
}

impl CapabilitySet for Actor {
    fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granted_capability_is_visible() {
        let actor = Actor::new(ActorId(7)).with_capability(Capability::HandleCash);
        assert!(actor.has_capability(Capability::HandleCash));
        assert!(!actor.has_capability(Capability::ManageShifts));
    }

    #[test]
    fn grant_is_idempotent() {
        let mut actor = Actor::new(ActorId(7));
        actor.grant(Capability::HandleCash);
        actor.grant(Capability::HandleCash);
        assert!(actor.has_capability(Capability::HandleCash));
    }
}
