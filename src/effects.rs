//! Timers and the confetti burst
//!
//! Both are plain values polled from the frame loop with the current
//! `Instant`; dropping them is all the teardown they need.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::color_space::Rgb;

/// One-shot deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timer {
    armed: Option<(Instant, Duration)>,
}

impl Timer {
    pub fn start(now: Instant, delay: Duration) -> Self {
        Self {
            armed: Some((now, delay)),
        }
    }

    /// A timer that never fires
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.armed.is_some()
    }

    /// True exactly once, on the first poll at or after the deadline.
    pub fn fired(&mut self, now: Instant) -> bool {
        match self.armed {
            Some((started, delay)) if now.saturating_duration_since(started) >= delay => {
                self.armed = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.armed = None;
    }

    /// Fraction of the delay elapsed, `None` when not armed.
    pub fn progress(&self, now: Instant) -> Option<f32> {
        self.armed.map(|(started, delay)| {
            if delay.is_zero() {
                return 1.0;
            }
            let elapsed = now.saturating_duration_since(started).as_secs_f32();
            (elapsed / delay.as_secs_f32()).min(1.0)
        })
    }
}

pub const CONFETTI_COLORS: [Rgb; 3] = [
    Rgb::new(0xec, 0x48, 0x99),
    Rgb::new(0x8b, 0x5c, 0xf6),
    Rgb::new(0x3b, 0x82, 0xf6),
];

/// Particles launched from each origin per tick
const PARTICLES_PER_ORIGIN: usize = 3;
const SPREAD_DEGREES: f32 = 55.0;
const GRAVITY: f32 = 1.4;
const PARTICLE_LIFETIME: Duration = Duration::from_millis(1600);
/// Cap on a single integration step, so a stalled frame does not teleport particles
const MAX_STEP: Duration = Duration::from_millis(100);

/// Launch points in normalized coordinates (x, y from the top-left) and
/// launch angle in degrees, 90 being straight up.
const ORIGINS: [(f32, f32, f32); 2] = [(0.0, 0.85, 60.0), (1.0, 0.85, 120.0)];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    vx: f32,
    vy: f32,
    age: Duration,
    pub color: Rgb,
}

impl Particle {
    /// Whether the particle is inside the unit square
    pub fn is_visible(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

/// Side-cannon confetti, emitted for a fixed duration
#[derive(Debug, Clone)]
pub struct ConfettiBurst {
    started: Instant,
    duration: Duration,
    last_tick: Instant,
    particles: Vec<Particle>,
    rng: StdRng,
}

impl ConfettiBurst {
    pub fn new(now: Instant, duration: Duration) -> Self {
        Self::with_rng(now, duration, StdRng::from_entropy())
    }

    /// Deterministic burst for tests and benchmarks
    pub fn with_seed(now: Instant, duration: Duration, seed: u64) -> Self {
        Self::with_rng(now, duration, StdRng::seed_from_u64(seed))
    }

    fn with_rng(now: Instant, duration: Duration, rng: StdRng) -> Self {
        Self {
            started: now,
            duration,
            last_tick: now,
            particles: Vec::new(),
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }

    /// Advance the simulation to `now`.
    pub fn tick(&mut self, now: Instant) {
        if self.is_finished(now) {
            self.particles.clear();
            return;
        }

        let step = now.saturating_duration_since(self.last_tick).min(MAX_STEP);
        self.last_tick = now;
        let dt = step.as_secs_f32();

        for particle in &mut self.particles {
            particle.vy += GRAVITY * dt;
            particle.x += particle.vx * dt;
            particle.y += particle.vy * dt;
            particle.age += step;
        }
        self.particles
            .retain(|p| p.age < PARTICLE_LIFETIME && p.y <= 1.2);

        for (x, y, angle) in ORIGINS {
            for _ in 0..PARTICLES_PER_ORIGIN {
                let particle = self.launch(x, y, angle);
                self.particles.push(particle);
            }
        }
    }

    fn launch(&mut self, x: f32, y: f32, angle: f32) -> Particle {
        let half_spread = SPREAD_DEGREES / 2.0;
        let angle = (angle + self.rng.gen_range(-half_spread..=half_spread)).to_radians();
        let speed = self.rng.gen_range(0.7..1.3);
        let color = CONFETTI_COLORS[self.rng.gen_range(0..CONFETTI_COLORS.len())];

        Particle {
            x,
            y,
            vx: angle.cos() * speed,
            vy: -angle.sin() * speed,
            age: Duration::ZERO,
            color,
        }
    }
}
