//! Interior-light flicker on a strained grid.
//!
//! When the clean-energy value drops to the flicker threshold or below,
//! interior point lights start to waver: each light gets a Perlin-noise
//! offset added to its cached baseline intensity. The noise is sampled at
//! (time x speed, light index x phase step) so lights flicker out of phase
//! with each other, and the amplitude grows linearly as energy approaches
//! zero. Above the threshold every light sits at its exact baseline.

use bevy::prelude::*;
use fastnoise_lite::{FastNoiseLite, NoiseType};

use simulation::clean_energy::CleanEnergy;

use crate::settings::VisualSettings;

// =============================================================================
// Constants
// =============================================================================

/// Spacing between lights along the noise's second axis. Non-integer so
/// consecutive lights never land on the same lattice row.
const PHASE_STEP: f32 = 19.7;

/// Seed for the flicker noise; fixed so runs look the same.
const FLICKER_SEED: i32 = 1402;

// =============================================================================
// Components
// =============================================================================

/// Marks a point light as flicker-capable. Baseline and phase are filled in
/// by `register_flicker_lights` the frame after spawn.
#[derive(Component, Debug, Default)]
pub struct FlickerLight {
    /// Intensity captured at registration; the value restored above the
    /// threshold and the center of the flicker band below it.
    pub baseline: f32,
    /// Sequential index used as the light's noise phase.
    pub phase_index: u32,
}

// =============================================================================
// Resources
// =============================================================================

/// The shared flicker noise generator, configured once.
#[derive(Resource)]
pub struct FlickerNoise(pub FastNoiseLite);

impl Default for FlickerNoise {
    fn default() -> Self {
        let mut noise = FastNoiseLite::with_seed(FLICKER_SEED);
        noise.set_noise_type(Some(NoiseType::Perlin));
        noise.set_frequency(Some(1.0));
        Self(noise)
    }
}

/// Allocator for per-light phase indices.
#[derive(Resource, Default)]
pub struct FlickerPhases {
    pub next_index: u32,
}

// =============================================================================
// Pure helpers
// =============================================================================

/// Flicker amplitude for the current energy value.
///
/// Zero at or above the threshold, growing linearly to `max_strength` at
/// energy zero.
pub fn flicker_strength(threshold: f32, max_strength: f32, energy: f32) -> f32 {
    if threshold <= 0.0 || energy >= threshold {
        return 0.0;
    }
    let t = ((threshold - energy) / threshold).clamp(0.0, 1.0);
    max_strength * t
}

/// Per-light intensity offset: Perlin noise over (time x speed, phase) scaled
/// by the current amplitude. Bounded by `strength` since Perlin output stays
/// within [-1, 1].
pub fn flicker_offset(
    noise: &FastNoiseLite,
    time_secs: f32,
    speed: f32,
    phase_index: u32,
    strength: f32,
) -> f32 {
    noise.get_noise_2d(time_secs * speed, phase_index as f32 * PHASE_STEP) * strength
}

// =============================================================================
// Systems
// =============================================================================

/// Capture each new flicker light's baseline intensity and hand it a phase.
pub fn register_flicker_lights(
    mut phases: ResMut<FlickerPhases>,
    mut lights: Query<(&mut FlickerLight, &PointLight), Added<FlickerLight>>,
) {
    for (mut flicker, light) in lights.iter_mut() {
        flicker.baseline = light.intensity;
        flicker.phase_index = phases.next_index;
        phases.next_index += 1;
    }
}

/// Apply the flicker offset (or restore baselines) each frame.
pub fn apply_light_flicker(
    time: Res<Time>,
    energy: Res<CleanEnergy>,
    settings: Res<VisualSettings>,
    noise: Res<FlickerNoise>,
    mut lights: Query<(&FlickerLight, &mut PointLight)>,
) {
    let strength = flicker_strength(
        settings.flicker_threshold,
        settings.flicker_max_strength,
        energy.current,
    );

    if strength <= 0.0 {
        for (flicker, mut light) in lights.iter_mut() {
            if light.intensity != flicker.baseline {
                light.intensity = flicker.baseline;
            }
        }
        return;
    }

    let now = time.elapsed_secs();
    for (flicker, mut light) in lights.iter_mut() {
        let offset = flicker_offset(
            &noise.0,
            now,
            settings.flicker_speed,
            flicker.phase_index,
            strength,
        );
        light.intensity = (flicker.baseline + offset).max(0.0);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_zero_at_and_above_threshold() {
        assert!(flicker_strength(30.0, 1000.0, 30.0).abs() < f32::EPSILON);
        assert!(flicker_strength(30.0, 1000.0, 80.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_strength_max_at_zero_energy() {
        assert!((flicker_strength(30.0, 1000.0, 0.0) - 1000.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_strength_linear_midpoint() {
        assert!((flicker_strength(30.0, 1000.0, 15.0) - 500.0).abs() < 0.01);
    }

    #[test]
    fn test_strength_grows_as_energy_falls() {
        let mut prev = flicker_strength(30.0, 1000.0, 30.0);
        for i in (0..30).rev() {
            let next = flicker_strength(30.0, 1000.0, i as f32);
            assert!(next >= prev, "strength should grow: {} -> {}", prev, next);
            prev = next;
        }
    }

    #[test]
    fn test_strength_handles_degenerate_threshold() {
        assert!(flicker_strength(0.0, 1000.0, 0.0).abs() < f32::EPSILON);
        assert!(flicker_strength(-5.0, 1000.0, 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_strength_clamped_below_zero_energy() {
        // Energy below zero cannot exceed the maximum amplitude.
        assert!((flicker_strength(30.0, 1000.0, -50.0) - 1000.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_offset_bounded_by_strength() {
        let noise = FlickerNoise::default();
        for i in 0u32..200 {
            let t = i as f32 * 0.037;
            let offset = flicker_offset(&noise.0, t, 6.0, i % 8, 500.0);
            assert!(
                offset.abs() <= 500.0 + 1e-3,
                "offset {} exceeds strength at t={}",
                offset,
                t
            );
        }
    }

    #[test]
    fn test_flickered_intensity_never_negative() {
        // Strength larger than the baseline: clamping keeps the result at
        // zero or above.
        let noise = FlickerNoise::default();
        let baseline = 100.0;
        for i in 0..200 {
            let t = i as f32 * 0.051;
            let offset = flicker_offset(&noise.0, t, 6.0, 3, 10_000.0);
            let intensity = (baseline + offset).max(0.0);
            assert!(intensity >= 0.0);
        }
    }

    #[test]
    fn test_lights_flicker_out_of_phase() {
        // Two lights must not produce identical offset traces.
        let noise = FlickerNoise::default();
        let mut differs = false;
        for i in 0..50 {
            let t = 0.3 + i as f32 * 0.113;
            let a = flicker_offset(&noise.0, t, 6.0, 0, 1000.0);
            let b = flicker_offset(&noise.0, t, 6.0, 1, 1000.0);
            if (a - b).abs() > 1.0 {
                differs = true;
                break;
            }
        }
        assert!(differs, "phase step failed to decorrelate lights");
    }

    #[test]
    fn test_zero_strength_means_zero_offset() {
        let noise = FlickerNoise::default();
        assert!(flicker_offset(&noise.0, 12.34, 6.0, 2, 0.0).abs() < f32::EPSILON);
    }
}
