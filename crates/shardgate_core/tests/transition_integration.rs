//! Integration tests for the world switch pipeline
//!
//! These tests drive a full stage through the switch:
//! 1. Scene template instantiation produces resident worlds
//! 2. Toggling swaps which world is visible
//! 3. Re-entrant toggles during a transition are debounced
//! 4. Reachable states keep current != other and stage within range

use shardgate_core::{
    PortalError, PortalQuad, SceneTemplate, TransitionEvent, TransitionOutcome, TransitionState,
    WorldId, WorldTemplate,
};

fn stage_template(world_count: usize) -> SceneTemplate {
    let mut template = SceneTemplate::new("Integration", PortalQuad::default());
    for i in 0..world_count {
        template = template.with_world(WorldTemplate::new(format!("world_{}", i)));
    }
    template
}

// ==================== Visibility Tests ====================

/// Exactly one world is on screen after every toggle
#[test]
fn test_single_visible_world_across_toggles() {
    let mut stage = stage_template(2).instantiate().expect("Stage should instantiate");
    let mut switch = stage.world_switch(4).expect("Switch should build");

    for i in 0..10 {
        switch.apply_visibility(&mut stage.worlds);
        assert_eq!(stage.worlds.visible_count(), 1, "frame {}", i);
        assert_eq!(stage.worlds.is_visible(switch.current_key()), Some(true));
        assert_eq!(stage.worlds.is_visible(switch.other_key()), Some(false));
        switch.toggle().expect("Toggle should not be debounced");
    }
    assert_eq!(switch.toggle_count(), 10);
}

/// Worlds stay resident across swaps
#[test]
fn test_worlds_stay_resident() {
    let mut stage = stage_template(2).instantiate().unwrap();
    let mut switch = stage.world_switch(4).unwrap();
    let before = stage.worlds.len();
    switch.toggle().unwrap();
    switch.apply_visibility(&mut stage.worlds);
    assert_eq!(stage.worlds.len(), before);
}

// ==================== Debounce Tests ====================

/// A click-driven swap holds the guard until its return tween ends
#[test]
fn test_click_flow_debounces_arrivals() {
    let stage = stage_template(2).instantiate().unwrap();
    let mut switch = stage.world_switch(4).unwrap();

    // Arrival: swap, then the return tween starts
    assert_eq!(switch.toggle(), Ok(WorldId::B));
    switch.handle(TransitionEvent::BeginTransition);

    // Jittery second arrival while returning
    assert_eq!(switch.toggle(), Err(PortalError::ReentrantToggle));
    assert_eq!(switch.state().current(), WorldId::B);

    // Return tween done
    assert_eq!(switch.handle(TransitionEvent::EndTransition), TransitionOutcome::TransitionEnded);
    assert_eq!(switch.toggle(), Ok(WorldId::A));
    assert_eq!(switch.toggle_count(), 2);
}

// ==================== State Invariant Tests ====================

/// Walk a fixed event script over several ring sizes and check invariants at every step
#[test]
fn test_reachable_states_keep_invariants() {
    let script = [
        TransitionEvent::Toggle,
        TransitionEvent::Progress(0.5),
        TransitionEvent::BeginTransition,
        TransitionEvent::Toggle,
        TransitionEvent::EndTransition,
        TransitionEvent::Toggle,
        TransitionEvent::Toggle,
        TransitionEvent::Toggle,
        TransitionEvent::Reset,
        TransitionEvent::Toggle,
    ];

    for world_count in 2..5 {
        for max_stage in 1..5u8 {
            let mut state = TransitionState::new(world_count, max_stage).unwrap();
            for _ in 0..3 {
                for event in script {
                    state = state.apply(event).0;
                    assert_ne!(state.current(), state.other());
                    assert!(state.current().0 < world_count);
                    assert!(state.stage() >= 1 && state.stage() <= max_stage);
                }
            }
        }
    }
}

/// Stage 4 wraps back to stage 1
#[test]
fn test_stage_wraps() {
    let mut state = TransitionState::new(2, 4).unwrap();
    for _ in 0..3 {
        state = state.apply(TransitionEvent::Toggle).0;
    }
    assert_eq!(state.stage(), 4);
    state = state.apply(TransitionEvent::Toggle).0;
    assert_eq!(state.stage(), 1);
}

/// A template with too few worlds never produces a switch
#[test]
fn test_single_world_rejected() {
    assert!(stage_template(1).instantiate().is_err());
    assert_eq!(
        TransitionState::new(0, 4),
        Err(PortalError::InvalidWorldCount(0))
    );
}
