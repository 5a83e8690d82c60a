//! World switch state machine
//!
//! [`TransitionState`] is a plain value; every change goes through
//! [`TransitionState::apply`], which returns the next state together with an
//! outcome describing what happened. [`WorldSwitch`] owns the state, maps
//! world ids onto resident worlds and drives their visibility each frame.

use serde::{Deserialize, Serialize};

use crate::error::PortalError;
use crate::world::{WorldKey, Worlds};

/// Index of a world in the switch's ring of worlds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldId(pub usize);

impl WorldId {
    pub const A: WorldId = WorldId(0);
    pub const B: WorldId = WorldId(1);
}

/// Events accepted by [`TransitionState::apply`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionEvent {
    /// Swap current and other world, advancing the stage
    Toggle,
    /// Back to world A, stage 1, idle
    Reset,
    /// A camera return tween started
    BeginTransition,
    /// The camera return tween finished
    EndTransition,
    /// Camera travel progress toward the portal, 0..1
    Progress(f32),
}

/// What an event did
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionOutcome {
    Toggled { from: WorldId, to: WorldId, stage: u8 },
    /// Toggle ignored because a transition is still running
    Debounced,
    Reset,
    TransitionStarted,
    TransitionEnded,
    ProgressUpdated(f32),
    /// Event had no effect
    Unchanged,
}

/// Which world is current and where the travel stands
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionState {
    current: WorldId,
    world_count: usize,
    stage: u8,
    max_stage: u8,
    is_transitioning: bool,
    travel_progress: f32,
}

impl TransitionState {
    /// Start on world A at stage 1
    ///
    /// `max_stage` below 1 is raised to 1.
    pub fn new(world_count: usize, max_stage: u8) -> Result<Self, PortalError> {
        if world_count < 2 {
            return Err(PortalError::InvalidWorldCount(world_count));
        }
        Ok(Self {
            current: WorldId::A,
            world_count,
            stage: 1,
            max_stage: max_stage.max(1),
            is_transitioning: false,
            travel_progress: 0.0,
        })
    }

    /// The world shown directly on screen
    pub fn current(&self) -> WorldId {
        self.current
    }

    /// The world shown through the portal
    pub fn other(&self) -> WorldId {
        WorldId((self.current.0 + 1) % self.world_count)
    }

    pub fn world_count(&self) -> usize {
        self.world_count
    }

    pub fn stage(&self) -> u8 {
        self.stage
    }

    pub fn max_stage(&self) -> u8 {
        self.max_stage
    }

    pub fn is_transitioning(&self) -> bool {
        self.is_transitioning
    }

    pub fn travel_progress(&self) -> f32 {
        self.travel_progress
    }

    /// The single transition function
    pub fn apply(self, event: TransitionEvent) -> (Self, TransitionOutcome) {
        match event {
            TransitionEvent::Toggle => {
                if self.is_transitioning {
                    return (self, TransitionOutcome::Debounced);
                }
                let from = self.current;
                let next = Self {
                    current: self.other(),
                    stage: (self.stage % self.max_stage) + 1,
                    travel_progress: 0.0,
                    ..self
                };
                (
                    next,
                    TransitionOutcome::Toggled {
                        from,
                        to: next.current,
                        stage: next.stage,
                    },
                )
            }
            TransitionEvent::Reset => (
                Self {
                    current: WorldId::A,
                    stage: 1,
                    is_transitioning: false,
                    travel_progress: 0.0,
                    ..self
                },
                TransitionOutcome::Reset,
            ),
            TransitionEvent::BeginTransition => {
                if self.is_transitioning {
                    (self, TransitionOutcome::Unchanged)
                } else {
                    (
                        Self {
                            is_transitioning: true,
                            ..self
                        },
                        TransitionOutcome::TransitionStarted,
                    )
                }
            }
            TransitionEvent::EndTransition => {
                if self.is_transitioning {
                    (
                        Self {
                            is_transitioning: false,
                            ..self
                        },
                        TransitionOutcome::TransitionEnded,
                    )
                } else {
                    (self, TransitionOutcome::Unchanged)
                }
            }
            TransitionEvent::Progress(p) => {
                let p = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
                (
                    Self {
                        travel_progress: p,
                        ..self
                    },
                    TransitionOutcome::ProgressUpdated(p),
                )
            }
        }
    }
}

/// Owns the transition state and drives world visibility
pub struct WorldSwitch {
    state: TransitionState,
    worlds: Vec<WorldKey>,
    show_other_during_blend: bool,
    toggle_count: u64,
}

impl WorldSwitch {
    /// Switch between `worlds` in ring order; the first one starts current
    pub fn new(worlds: Vec<WorldKey>, max_stage: u8) -> Result<Self, PortalError> {
        let state = TransitionState::new(worlds.len(), max_stage)?;
        Ok(Self {
            state,
            worlds,
            show_other_during_blend: false,
            toggle_count: 0,
        })
    }

    /// Also show the other world while a transition is running
    pub fn with_show_other_during_blend(mut self, enabled: bool) -> Self {
        self.show_other_during_blend = enabled;
        self
    }

    pub fn state(&self) -> &TransitionState {
        &self.state
    }

    /// Number of toggles that actually swapped worlds
    pub fn toggle_count(&self) -> u64 {
        self.toggle_count
    }

    pub fn current_key(&self) -> WorldKey {
        self.key_for(self.state.current())
    }

    pub fn other_key(&self) -> WorldKey {
        self.key_for(self.state.other())
    }

    fn key_for(&self, id: WorldId) -> WorldKey {
        // ids come from a state built with world_count == worlds.len()
        self.worlds[id.0 % self.worlds.len()]
    }

    /// Feed one event through the state machine
    pub fn handle(&mut self, event: TransitionEvent) -> TransitionOutcome {
        let (next, outcome) = self.state.apply(event);
        self.state = next;
        match outcome {
            TransitionOutcome::Toggled { from, to, stage } => {
                self.toggle_count += 1;
                log::info!("World switched {:?} -> {:?} (stage {})", from, to, stage);
            }
            TransitionOutcome::Debounced => {
                log::debug!("Toggle ignored: transition still running");
            }
            TransitionOutcome::Reset => {
                log::info!("World switch reset to {:?}", WorldId::A);
            }
            _ => {}
        }
        outcome
    }

    /// Swap current and other world
    ///
    /// Returns [`PortalError::ReentrantToggle`] when debounced.
    pub fn toggle(&mut self) -> Result<WorldId, PortalError> {
        match self.handle(TransitionEvent::Toggle) {
            TransitionOutcome::Toggled { to, .. } => Ok(to),
            _ => Err(PortalError::ReentrantToggle),
        }
    }

    pub fn reset(&mut self) {
        self.handle(TransitionEvent::Reset);
    }

    /// Drive world visibility from the current state
    ///
    /// The current world is visible. Every other world is hidden and only
    /// appears inside the capture pass, except while a transition is running
    /// with `show_other_during_blend` enabled.
    pub fn apply_visibility(&self, worlds: &mut Worlds) {
        let current = self.current_key();
        let other = self.other_key();
        let blend = self.show_other_during_blend && self.state.is_transitioning();
        for key in &self.worlds {
            let visible = *key == current || (blend && *key == other);
            worlds.set_visible(*key, visible);
        }
    }
}
