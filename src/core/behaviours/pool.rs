use crate::core::behaviours::{Behaviour, BehaviourKind};
use std::fmt::Debug;
use std::sync::Arc;

/// Handler that behaviours are exposed under during an agent's step.
pub const STEP_HANDLER: &str = "step";

/// How a newly added behaviour joins the existing list.
pub trait ListAdder: Debug + Send + Sync {
    fn add(&self, behaviours: &mut Vec<Behaviour>, behaviour: Behaviour);
}

/// Append unconditionally.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAdder;

impl ListAdder for AlwaysAdder {
    fn add(&self, behaviours: &mut Vec<Behaviour>, behaviour: Behaviour) {
        behaviours.push(behaviour);
    }
}

/// Replace whatever is held for the same category.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceAdder;

impl ListAdder for ReplaceAdder {
    fn add(&self, behaviours: &mut Vec<Behaviour>, behaviour: Behaviour) {
        let category = behaviour.kind().category();
        match behaviours.iter().position(|b| b.is_a(category)) {
            Some(index) => {
                behaviours[index] = behaviour;
                let mut seen = 0;
                behaviours.retain(|b| {
                    if b.is_a(category) {
                        seen += 1;
                        seen == 1
                    } else {
                        true
                    }
                });
            }
            None => behaviours.push(behaviour),
        }
    }
}

/// Keep the first behaviour of each category.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverAdder;

impl ListAdder for NeverAdder {
    fn add(&self, behaviours: &mut Vec<Behaviour>, behaviour: Behaviour) {
        let category = behaviour.kind().category();
        if !behaviours.iter().any(|b| b.is_a(category)) {
            behaviours.push(behaviour);
        }
    }
}

#[derive(Debug, Clone)]
pub struct BehaviourPool {
    behaviours: Vec<Behaviour>,
    adder: Arc<dyn ListAdder>,
}

impl Default for BehaviourPool {
    fn default() -> Self {
        Self::new(None)
    }
}

impl BehaviourPool {
    pub fn new(adder: Option<Arc<dyn ListAdder>>) -> Self {
        Self {
            behaviours: Vec::new(),
            adder: adder.unwrap_or_else(|| Arc::new(ReplaceAdder)),
        }
    }

    pub fn with_behaviours(behaviours: Vec<Behaviour>, adder: Option<Arc<dyn ListAdder>>) -> Self {
        let mut pool = Self::new(adder);
        for behaviour in behaviours {
            pool.add_behaviour(behaviour);
        }
        pool
    }

    pub fn add_behaviour(&mut self, behaviour: Behaviour) {
        self.adder.add(&mut self.behaviours, behaviour);
    }

    /// Install a default unless the user supplied something for `category`.
    pub fn add_default_behaviour(&mut self, behaviour: Behaviour, category: BehaviourKind) {
        if !self.behaviours.iter().any(|b| b.is_a(category)) {
            self.behaviours.push(behaviour);
        }
    }

    pub fn expose_behaviour(&self, handler: &str, kind: BehaviourKind) -> Vec<&Behaviour> {
        if handler != STEP_HANDLER {
            return Vec::new();
        }
        self.behaviours.iter().filter(|b| b.is_a(kind)).collect()
    }

    /// First behaviour able to carry out `kind`.
    pub fn satisfy(&self, kind: BehaviourKind) -> Option<Behaviour> {
        self.behaviours.iter().find(|b| b.is_a(kind)).cloned()
    }

    pub fn len(&self) -> usize {
        self.behaviours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviours.is_empty()
    }
}
