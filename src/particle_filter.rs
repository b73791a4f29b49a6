//! Particle filter over planar position and heading.
//!
//! Each detected step propagates every particle by the step displacement plus
//! uniform heading and step-length noise. Weights are normalized, the
//! effective sample size is checked, and a systematic resample equalizes the
//! population when it degenerates. The position estimate is the weighted mean.
//!
//! There is no observation model: weights only change through normalization
//! and the uniform reset on resampling.

use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::PdrConfig;
use crate::error::{PdrError, PdrResult};
use crate::heading::wrap_degrees;

/// One pose hypothesis
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    /// Degrees in `[0, 360)`; 0 moves along +y, 90 along +x
    pub heading: f64,
    pub weight: f64,
}

impl Particle {
    pub fn new(x: f64, y: f64, heading: f64, weight: f64) -> Self {
        Self {
            x,
            y,
            heading,
            weight,
        }
    }
}

/// Outcome of one per-step filter update
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterUpdate {
    pub x: f64,
    pub y: f64,
    /// Effective sample size measured before any resampling
    pub effective_sample_size: f64,
    pub resampled: bool,
}

/// Fixed-size particle population with its own RNG and resampling buffers
#[derive(Clone, Debug)]
pub struct ParticleCloud {
    particles: Vec<Particle>,
    // Reused by systematic resampling so steady-state updates do not allocate
    scratch: Vec<Particle>,
    cumulative: Vec<f64>,
    rng: StdRng,
    last_neff: f64,
}

impl ParticleCloud {
    /// `count` particles at `(x, y)` with zero heading and weight `1/count`
    pub fn new(count: usize, x: f64, y: f64, seed: Option<u64>) -> Self {
        let count = count.max(1);
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut cloud = Self {
            particles: Vec::with_capacity(count),
            scratch: Vec::with_capacity(count),
            cumulative: Vec::with_capacity(count),
            rng,
            last_neff: count as f64,
        };
        cloud.fill(count, x, y);
        cloud
    }

    pub fn from_config(config: &PdrConfig) -> Self {
        Self::new(config.particle_count, 0.0, 0.0, config.seed)
    }

    /// Put every particle back at `(x, y)` with zero heading and uniform weight.
    /// The RNG stream continues.
    pub fn reinitialize(&mut self, x: f64, y: f64) {
        let count = self.particles.len();
        self.fill(count, x, y);
    }

    fn fill(&mut self, count: usize, x: f64, y: f64) {
        let w = 1.0 / count as f64;
        self.particles.clear();
        self.particles
            .extend((0..count).map(|_| Particle::new(x, y, 0.0, w)));
        self.last_neff = count as f64;
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Overwrite importance weights, e.g. from an external likelihood.
    /// Weights are taken as given; call `normalize_weights` afterwards.
    pub fn set_weights(&mut self, weights: &[f64]) -> PdrResult<()> {
        if weights.len() != self.particles.len() {
            return Err(PdrError::InvalidParameters(format!(
                "expected {} weights, got {}",
                self.particles.len(),
                weights.len()
            )));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(PdrError::InvalidParameters(
                "weights must be finite and non-negative".to_string(),
            ));
        }
        for (particle, &w) in self.particles.iter_mut().zip(weights) {
            particle.weight = w;
        }
        Ok(())
    }

    pub fn total_weight(&self) -> f64 {
        self.particles.iter().map(|p| p.weight).sum()
    }

    /// Effective sample size from the most recent update
    pub fn last_effective_sample_size(&self) -> f64 {
        self.last_neff
    }

    /// Move every particle by one noisy step.
    ///
    /// Heading noise is drawn from `±heading_noise/2` degrees and length noise
    /// from `±step_len_noise/2` meters, independently per particle.
    pub fn propagate(&mut self, step_length: f64, heading_deg: f64, config: &PdrConfig) {
        let half_heading = config.heading_noise / 2.0;
        let half_length = config.step_len_noise / 2.0;

        for particle in &mut self.particles {
            let heading_jitter = self.rng.gen_range(-half_heading..=half_heading);
            let length_jitter = self.rng.gen_range(-half_length..=half_length);

            let heading = wrap_degrees(heading_deg + heading_jitter);
            let step = step_length + length_jitter;
            let rad = heading.to_radians();

            particle.x += step * rad.sin();
            particle.y += step * rad.cos();
            particle.heading = heading;
        }
    }

    /// Divide every weight by the total. A non-positive or non-finite total
    /// leaves the weights as they are.
    pub fn normalize_weights(&mut self) {
        let total = self.total_weight();
        if total > 0.0 && total.is_finite() {
            for particle in &mut self.particles {
                particle.weight /= total;
            }
        }
    }

    /// `1 / Σw²`, or 0 when every weight is zero
    pub fn effective_sample_size(&self) -> f64 {
        let sum_sq: f64 = self.particles.iter().map(|p| p.weight * p.weight).sum();
        if sum_sq > 0.0 {
            1.0 / sum_sq
        } else {
            0.0
        }
    }

    /// Systematic resampling: one uniform offset in `[0, total/N)`, then N
    /// fixed-stride picks along the cumulative weights. Survivors keep their
    /// pose and get weight `1/N`.
    pub fn systematic_resample(&mut self) {
        let n = self.particles.len();
        if n == 0 {
            return;
        }
        let uniform = 1.0 / n as f64;

        self.cumulative.clear();
        let mut running = 0.0;
        for particle in &self.particles {
            running += particle.weight;
            self.cumulative.push(running);
        }

        let total = running;
        if !(total > 0.0 && total.is_finite()) {
            log::warn!(
                "resample skipped: total weight {} is degenerate, resetting to uniform",
                total
            );
            for particle in &mut self.particles {
                particle.weight = uniform;
            }
            return;
        }

        let stride = total / n as f64;
        let offset = self.rng.gen::<f64>() * stride;

        self.scratch.clear();
        let mut idx = 0;
        for i in 0..n {
            let target = offset + i as f64 * stride;
            while idx < n - 1 && self.cumulative[idx] < target {
                idx += 1;
            }
            let mut survivor = self.particles[idx];
            survivor.weight = uniform;
            self.scratch.push(survivor);
        }

        std::mem::swap(&mut self.particles, &mut self.scratch);
    }

    /// Weighted mean position of the population
    pub fn estimate(&self) -> (f64, f64) {
        let total = self.total_weight();
        let mean = if total > 0.0 && total.is_finite() {
            self.particles
                .iter()
                .fold(Vector2::<f64>::zeros(), |acc, p| acc + Vector2::new(p.x, p.y) * p.weight)
                / total
        } else {
            self.particles
                .iter()
                .fold(Vector2::<f64>::zeros(), |acc, p| acc + Vector2::new(p.x, p.y))
                / self.particles.len().max(1) as f64
        };
        (mean.x, mean.y)
    }

    /// Weighted RMS distance of particles from the mean position
    pub fn spread(&self) -> f64 {
        let (mx, my) = self.estimate();
        let total = self.total_weight();
        if !(total > 0.0 && total.is_finite()) {
            return 0.0;
        }
        let var: f64 = self
            .particles
            .iter()
            .map(|p| p.weight * ((p.x - mx).powi(2) + (p.y - my).powi(2)))
            .sum::<f64>()
            / total;
        var.sqrt()
    }

    /// Full per-step cycle: propagate, normalize, degeneracy check,
    /// resample if needed, estimate.
    pub fn update(&mut self, step_length: f64, heading_deg: f64, config: &PdrConfig) -> FilterUpdate {
        self.propagate(step_length, heading_deg, config);
        self.normalize_weights();

        let neff = self.effective_sample_size();
        self.last_neff = neff;
        let resampled = neff < config.resample_threshold;
        if resampled {
            log::debug!(
                "resampling {} particles (neff {:.1} < {:.1})",
                self.particles.len(),
                neff,
                config.resample_threshold
            );
            self.systematic_resample();
        }

        let (x, y) = self.estimate();
        FilterUpdate {
            x,
            y,
            effective_sample_size: neff,
            resampled,
        }
    }
}
