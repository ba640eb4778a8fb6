use crate::{
    Event, EventEnvelope, EventLevel, GameContent, GameState, GelSource, Rejection, ResourceState,
};

impl ResourceState {
    pub fn new(sill: f32) -> Self {
        Self {
            sill,
            gel: 0,
            traits: std::collections::BTreeSet::new(),
        }
    }

    /// Restore sill toward `cap` at `rate_per_sec`. Returns the amount restored.
    ///
    /// Non-finite or non-positive elapsed time restores nothing.
    pub fn regenerate(&mut self, elapsed_secs: f32, rate_per_sec: f32, cap: f32) -> f32 {
        if !elapsed_secs.is_finite() || elapsed_secs <= 0.0 || rate_per_sec <= 0.0 {
            return 0.0;
        }
        let headroom = (cap - self.sill).max(0.0);
        let gained = (rate_per_sec * elapsed_secs).min(headroom);
        self.sill += gained;
        gained
    }

    pub fn spend_sill(&mut self, amount: f32) -> Result<(), Rejection> {
        if self.sill < amount {
            return Err(Rejection::InsufficientSill {
                required: amount,
                available: self.sill,
            });
        }
        self.sill -= amount;
        Ok(())
    }

    pub fn spend_gel(&mut self, amount: u32) -> Result<(), Rejection> {
        self.gel = self
            .gel
            .checked_sub(amount)
            .ok_or(Rejection::InsufficientGel {
                required: amount,
                available: self.gel,
            })?;
        Ok(())
    }

    /// Returns the new gel total.
    pub fn add_gel(&mut self, amount: u32) -> u32 {
        self.gel = self.gel.saturating_add(amount);
        self.gel
    }

    /// Returns true if the trait was not already present.
    pub fn grant_trait(&mut self, name: &str) -> bool {
        self.traits.insert(name.to_string())
    }

    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.contains(name)
    }
}

pub(crate) fn regenerate_sill(
    state: &mut GameState,
    content: &GameContent,
    elapsed_secs: f32,
    event_level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) {
    let c = &content.constants;
    let gained = state
        .resources
        .regenerate(elapsed_secs, c.sill_regen_per_sec, c.sill_cap);

    if gained > 0.0 && event_level == EventLevel::Debug {
        let sill = state.resources.sill;
        events.push(crate::emit(
            &mut state.counters,
            state.meta.tick,
            Event::SillRegenerated {
                amount: gained,
                sill,
            },
        ));
    }
}

pub(crate) fn credit_gel(
    state: &mut GameState,
    amount: u32,
    source: GelSource,
    events: &mut Vec<EventEnvelope>,
) {
    if amount == 0 {
        return;
    }
    let total = state.resources.add_gel(amount);
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::GelGained {
            amount,
            total,
            source,
        },
    ));
}

/// Grant a trait, emitting `TraitUnlocked` only the first time.
pub(crate) fn unlock_trait(state: &mut GameState, name: &str, events: &mut Vec<EventEnvelope>) {
    if !state.resources.grant_trait(name) {
        return;
    }
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::TraitUnlocked {
            name: name.to_string(),
        },
    ));
}
