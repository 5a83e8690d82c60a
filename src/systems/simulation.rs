//! Frame simulation system
//!
//! Manages the per-frame simulation including:
//! - Delta time calculation
//! - Camera flight and arrival detection
//! - World switching
//! - Particle emitters: initial upload, per-frame kernel steps

use std::sync::Arc;
use std::time::Instant;

use shardgate_core::{PortalStage, ResourceKey, ResourceRegistry, WorldKey, WorldSwitch};
use shardgate_input::{CameraFlightController, FlightUpdate};
use shardgate_particles::{
    CpuSimulation, EmitterConfig, ExplosionAnimation, InitialState, ParticleFrameUniforms, SimulationService, VelocityKernel,
};
use shardgate_render::PerspectiveCamera;

/// Result of a simulation update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationResult {
    /// Delta actually simulated
    pub dt: f32,
    pub flight: FlightUpdate,
    /// Worlds were swapped since the previous update (by arrival or click)
    pub world_toggled: bool,
    /// Uniforms for this frame's particle kernel step
    pub particles: ParticleFrameUniforms,
    /// Rotation speed of the shard group
    pub group_spin: f32,
}

/// One emitter bound to its simulation
struct EmitterRun<S> {
    name: String,
    world: WorldKey,
    kernel: Arc<VelocityKernel>,
    initial: InitialState,
    service: S,
}

/// Manages the simulation loop
pub struct SimulationSystem<S = CpuSimulation> {
    last_frame: Instant,
    max_delta: f32,
    explosion: ExplosionAnimation,
    kernels: ResourceRegistry<VelocityKernel>,
    emitters: Vec<EmitterRun<S>>,
    last_toggle_count: u64,
}

impl<S: SimulationService> SimulationSystem<S> {
    /// Create a simulation system; frames never advance more than `max_delta`
    pub fn new(max_delta: f32, animation_duration: f32) -> Self {
        Self {
            last_frame: Instant::now(),
            max_delta,
            explosion: ExplosionAnimation::new(animation_duration),
            kernels: ResourceRegistry::new(),
            emitters: Vec::new(),
            last_toggle_count: 0,
        }
    }

    /// Wall-clock time since the previous call
    pub fn measure_delta(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        dt
    }

    pub fn explosion(&self) -> &ExplosionAnimation {
        &self.explosion
    }

    /// Bind every emitter on the stage to a simulation made by `spawn`
    ///
    /// Each emitter's initial state is generated and uploaded. Emitters with
    /// the same kernel config share one kernel instance. Emitters that fail
    /// validation or upload are skipped. Returns the number of emitters bound.
    pub fn attach<F>(&mut self, stage: &PortalStage, mut spawn: F) -> usize
    where
        F: FnMut(&EmitterConfig) -> S,
    {
        for (world_key, world) in stage.worlds.iter() {
            for emitter in &world.emitters {
                if let Err(e) = emitter.validate() {
                    log::warn!("Emitter '{}' in world '{}' skipped: {}", emitter.name, world.name, e);
                    continue;
                }
                let key = match ResourceKey::of_config(&emitter.kernel) {
                    Ok(key) => key,
                    Err(e) => {
                        log::warn!("Emitter '{}' kernel not registered: {}", emitter.name, e);
                        continue;
                    }
                };

                let initial = emitter.initial_state();
                let mut service = spawn(emitter);
                if let Err(e) = service.upload_initial(&initial) {
                    log::warn!("Emitter '{}' upload failed: {}", emitter.name, e);
                    continue;
                }

                let kernel = emitter.kernel;
                self.emitters.push(EmitterRun {
                    name: emitter.name.clone(),
                    world: world_key,
                    kernel: self.kernels.get_or_create(key, || kernel),
                    initial,
                    service,
                });
            }
        }
        log::debug!(
            "{} emitters share {} particle kernels",
            self.emitters.len(),
            self.kernels.len()
        );
        self.emitters.len()
    }

    /// Distinct particle kernels currently registered
    pub fn kernel_count(&self) -> usize {
        self.kernels.len()
    }

    pub fn emitter_count(&self) -> usize {
        self.emitters.len()
    }

    /// Simulation bound to the emitter called `name`
    pub fn service(&self, name: &str) -> Option<&S> {
        self.emitters.iter().find(|e| e.name == name).map(|e| &e.service)
    }

    /// Drop emitters and shared kernels (scene teardown)
    pub fn release(&mut self) {
        self.emitters.clear();
        self.kernels.clear();
    }

    /// Run one simulation frame
    ///
    /// A world swap restarts the shard explosion and re-uploads the new
    /// current world's emitters so it bursts in.
    pub fn update(
        &mut self,
        raw_dt: f32,
        flight: &mut CameraFlightController,
        camera: &mut PerspectiveCamera,
        switch: &mut WorldSwitch,
    ) -> SimulationResult {
        // Cap dt to prevent a huge jump on the first frame or after a stall
        let dt = if raw_dt.is_finite() {
            raw_dt.clamp(0.0, self.max_delta)
        } else {
            0.0
        };

        let update = flight.update(camera, switch, dt);

        let world_toggled = switch.toggle_count() != self.last_toggle_count;
        if world_toggled {
            self.last_toggle_count = switch.toggle_count();
            self.explosion.restart();
            self.reupload(switch.current_key());
        }
        let particles = self.explosion.advance(dt);

        for run in &mut self.emitters {
            if let Err(e) = run.service.step(&run.kernel, &particles) {
                log::warn!("Emitter '{}' step failed: {}", run.name, e);
            }
        }

        SimulationResult {
            dt,
            flight: update,
            world_toggled,
            particles,
            group_spin: self.explosion.group_spin_speed(),
        }
    }

    fn reupload(&mut self, world: WorldKey) {
        for run in self.emitters.iter_mut().filter(|r| r.world == world) {
            if let Err(e) = run.service.upload_initial(&run.initial) {
                log::warn!("Emitter '{}' re-upload failed: {}", run.name, e);
            }
        }
    }
}

impl Default for SimulationSystem {
    fn default() -> Self {
        Self::new(0.1, 10.0)
    }
}
