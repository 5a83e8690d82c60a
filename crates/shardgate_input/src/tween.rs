//! Eased camera tweens
//!
//! A [`Tween`] moves a camera position and its look-at point together with a
//! quartic ease-in/ease-out curve. [`Tweener`] holds at most one running
//! tween: starting a new one kills the previous one first.

use shardgate_math::easing::ease_in_out_quart;
use shardgate_math::Vec3;

/// Why a tween was started
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenPurpose {
    /// Flying toward the portal
    Approach,
    /// Flying back to the start after a world swap
    Return,
}

/// Camera pose at one instant of a tween
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TweenSample {
    pub position: Vec3,
    pub look_at: Vec3,
    pub finished: bool,
}

/// Position + look-at animation with a fixed duration
#[derive(Clone, Debug, PartialEq)]
pub struct Tween {
    pub purpose: TweenPurpose,
    from_position: Vec3,
    to_position: Vec3,
    from_look: Vec3,
    to_look: Vec3,
    duration: f32,
    elapsed: f32,
}

impl Tween {
    pub fn new(
        purpose: TweenPurpose,
        (from_position, from_look): (Vec3, Vec3),
        (to_position, to_look): (Vec3, Vec3),
        duration: f32,
    ) -> Self {
        Self {
            purpose,
            from_position,
            to_position,
            from_look,
            to_look,
            duration: duration.max(0.0),
            elapsed: 0.0,
        }
    }

    /// Linear progress in 0..1
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Pose at the current progress
    pub fn sample(&self) -> TweenSample {
        let t = ease_in_out_quart(self.progress());
        TweenSample {
            position: self.from_position.lerp(self.to_position, t),
            look_at: self.from_look.lerp(self.to_look, t),
            finished: self.is_finished(),
        }
    }

    /// Advance by `dt` seconds and return the new pose
    pub fn advance(&mut self, dt: f32) -> TweenSample {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.sample()
    }
}

/// Runs at most one tween at a time
#[derive(Debug, Default)]
pub struct Tweener {
    active: Option<Tween>,
}

impl Tweener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `tween`, killing any tween already running
    ///
    /// Returns the killed tween, if there was one.
    pub fn start(&mut self, tween: Tween) -> Option<Tween> {
        let killed = self.active.replace(tween);
        if let Some(old) = &killed {
            log::debug!("Killed running {:?} tween at {:.2}", old.purpose, old.progress());
        }
        killed
    }

    /// Stop the running tween without finishing it
    pub fn cancel(&mut self) -> Option<Tween> {
        self.active.take()
    }

    pub fn active(&self) -> Option<&Tween> {
        self.active.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Advance the running tween
    ///
    /// Returns the pose and the tween's purpose; a finished tween is removed.
    pub fn advance(&mut self, dt: f32) -> Option<(TweenPurpose, TweenSample)> {
        let tween = self.active.as_mut()?;
        let sample = tween.advance(dt);
        let purpose = tween.purpose;
        if sample.finished {
            self.active = None;
        }
        Some((purpose, sample))
    }
}
