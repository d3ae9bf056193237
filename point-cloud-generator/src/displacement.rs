/// Noise-driven, time-gated point displacement
use crate::chunker::GeometryChunk;
use crate::error::{GeneratorError, GeneratorResult};
use crate::math::{inverse_lerp, lerp};
use crate::transform::Frame;
use constants::displacement::{
    DEFAULT_DURATION, DEFAULT_NOISE_SCALE, DEFAULT_NOISE_SEED, DEFAULT_NOISE_SPEED,
    DEFAULT_NOISY_AMOUNT, DEFAULT_SHOULD_MOVE_THRESHOLD, DEFAULT_SPEED, DEFAULT_TARGET_SPEED,
};
use glam::Vec3;
use noise::{NoiseFn, Perlin};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tuning for the displacement effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplacementParams {
    /// Share of normal directions allowed to move, in `[0, 1]`.
    pub should_move_threshold: f32,
    /// Seconds a trigger stays active.
    pub duration: f32,
    pub speed: f32,
    pub noise_scale: f32,
    pub noise_speed: f32,
    /// Speed of the push away from the target frame.
    pub target_speed: f32,
    /// Blend towards a random per-vertex damping factor, in `[0, 1]`.
    pub noisy_amount: f32,
    pub noise_seed: u32,
}

impl Default for DisplacementParams {
    fn default() -> Self {
        Self {
            should_move_threshold: DEFAULT_SHOULD_MOVE_THRESHOLD,
            duration: DEFAULT_DURATION,
            speed: DEFAULT_SPEED,
            noise_scale: DEFAULT_NOISE_SCALE,
            noise_speed: DEFAULT_NOISE_SPEED,
            target_speed: DEFAULT_TARGET_SPEED,
            noisy_amount: DEFAULT_NOISY_AMOUNT,
            noise_seed: DEFAULT_NOISE_SEED,
        }
    }
}

impl DisplacementParams {
    pub fn validate(&self) -> GeneratorResult<()> {
        if !(0.0..=1.0).contains(&self.should_move_threshold) {
            return Err(GeneratorError::InvalidConfig(format!(
                "should_move_threshold must be in [0, 1], got {}",
                self.should_move_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.noisy_amount) {
            return Err(GeneratorError::InvalidConfig(format!(
                "noisy_amount must be in [0, 1], got {}",
                self.noisy_amount
            )));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(GeneratorError::InvalidConfig(format!(
                "displacement duration must be a non-negative number of seconds, got {}",
                self.duration
            )));
        }
        Ok(())
    }
}

/// Source of uniform samples in `[0, 1)` for per-vertex damping.
pub trait RandomSource {
    fn next_f32(&mut self) -> f32;
}

impl<R: Rng> RandomSource for R {
    fn next_f32(&mut self) -> f32 {
        self.gen_range(0.0..1.0)
    }
}

/// Activation window opened by each displacement trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplacementWindow {
    fired_at: Option<f32>,
    duration: f32,
}

impl DisplacementWindow {
    pub fn new(duration: f32) -> Self {
        Self {
            fired_at: None,
            duration,
        }
    }

    /// Opens the window at `now`, restarting it if already open.
    pub fn trigger(&mut self, now: f32) {
        self.fired_at = Some(now);
    }

    pub fn is_active(&self, now: f32) -> bool {
        self.fired_at
            .is_some_and(|fired_at| now < fired_at + self.duration)
    }

    pub fn fired_at(&self) -> Option<f32> {
        self.fired_at
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration;
    }
}

/// 2D Perlin field remapped to `[0, 1]`.
pub struct NoiseField {
    perlin: Perlin,
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }

    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let value = self.perlin.get([x as f64, y as f64]) as f32;
        (value * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

/// Advances chunk positions under noise and target repulsion.
pub struct DisplacementEngine {
    params: DisplacementParams,
    noise: NoiseField,
}

impl DisplacementEngine {
    pub fn new(params: DisplacementParams) -> Self {
        let noise = NoiseField::new(params.noise_seed);
        Self { params, noise }
    }

    pub fn params(&self) -> &DisplacementParams {
        &self.params
    }

    pub fn set_params(&mut self, params: DisplacementParams) {
        if params.noise_seed != self.params.noise_seed {
            self.noise = NoiseField::new(params.noise_seed);
        }
        self.params = params;
    }

    /// Moves every vertex one step of `dt` seconds. Normals and colours are untouched.
    /// Fails before writing anything when no target frame is bound.
    pub fn step(
        &self,
        chunks: &mut [GeometryChunk],
        dt: f32,
        frame: &dyn Frame,
        target: Option<&dyn Frame>,
        rng: &mut dyn RandomSource,
    ) -> GeneratorResult<()> {
        let target_position = target.ok_or(GeneratorError::MissingTarget)?.position();

        for chunk in chunks.iter_mut() {
            for (position, normal) in chunk.positions.iter_mut().zip(chunk.normals.iter()) {
                let world = frame.to_world(*position);
                let moved = self.displace_vertex(world, *normal, target_position, dt, rng);
                *position = frame.to_local(moved);
            }
        }

        Ok(())
    }

    /// World-space position after one step, given the vertex's local normal.
    pub fn displace_vertex(
        &self,
        world: Vec3,
        local_normal: Vec3,
        target_position: Vec3,
        dt: f32,
        rng: &mut dyn RandomSource,
    ) -> Vec3 {
        let p = &self.params;
        let s = p.noise_scale;

        let noise_offset = (Vec3::new(
            self.noise.sample(world.x * s, world.y * s),
            self.noise.sample(world.y * s, world.z * s),
            self.noise.sample(world.z * s, world.x * s),
        ) * 2.0
            - Vec3::ONE)
            * p.noise_speed;

        // A vertex sitting exactly on the target has no direction to flee in.
        let target_offset = (world - target_position).normalize_or_zero() * p.target_speed;

        let noisy_factor = lerp(1.0, rng.next_f32(), p.noisy_amount);

        let should_move = inverse_lerp(
            1.0 - p.should_move_threshold,
            1.0,
            self.noise.sample(local_normal.x * s, local_normal.y * s),
        );

        world + (noise_offset + target_offset) * dt * p.speed * noisy_factor * should_move
    }
}
