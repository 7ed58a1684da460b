//! The visual mapper's configuration surface.
//!
//! All knobs live on one resource with public fields, tuned from code or a
//! debug UI. Endpoint pairs are named `dirty` (energy 0) and `clean`
//! (energy 100); every mapped value is a linear blend between its pair.

use bevy::prelude::*;

/// Endpoint values and thresholds for the energy-driven environment visuals.
#[derive(Resource, Debug, Clone)]
pub struct VisualSettings {
    /// Sun illuminance (lux) at energy 0.
    pub sun_illuminance_dirty: f32,
    /// Sun illuminance (lux) at energy 100.
    pub sun_illuminance_clean: f32,
    /// Sun color at energy 0 (smog-filtered).
    pub sun_color_dirty: Color,
    /// Sun color at energy 100.
    pub sun_color_clean: Color,

    /// Ambient brightness at energy 0.
    pub ambient_brightness_dirty: f32,
    /// Ambient brightness at energy 100.
    pub ambient_brightness_clean: f32,
    /// Ambient color at energy 0.
    pub ambient_color_dirty: Color,
    /// Ambient color at energy 100.
    pub ambient_color_clean: Color,

    /// Sky tint at energy 0 (haze brown-grey).
    pub sky_tint_dirty: Color,
    /// Sky tint at energy 100 (azure).
    pub sky_tint_clean: Color,
    /// Sky exposure multiplier at energy 0.
    pub sky_exposure_dirty: f32,
    /// Sky exposure multiplier at energy 100.
    pub sky_exposure_clean: f32,
    /// Per-channel threshold under which a sky write is skipped as redundant.
    pub sky_write_epsilon: f32,

    /// Energy value at or below which interior lights start to flicker.
    pub flicker_threshold: f32,
    /// Time scale fed into the flicker noise.
    pub flicker_speed: f32,
    /// Flicker amplitude (lumens) reached at energy 0.
    pub flicker_max_strength: f32,

    /// Minimum seconds between reflection-probe refreshes.
    pub probe_refresh_seconds: f32,
    /// Energy movement (absolute) that justifies a probe refresh on its own.
    pub probe_refresh_energy_delta: f32,
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            sun_illuminance_dirty: 2_000.0,
            sun_illuminance_clean: 10_000.0,
            sun_color_dirty: Color::srgb(0.85, 0.66, 0.45),
            sun_color_clean: Color::srgb(1.0, 0.95, 0.9),

            ambient_brightness_dirty: 80.0,
            ambient_brightness_clean: 300.0,
            ambient_color_dirty: Color::srgb(0.62, 0.55, 0.48),
            ambient_color_clean: Color::srgb(0.9, 0.9, 1.0),

            sky_tint_dirty: Color::srgb(0.52, 0.47, 0.40),
            sky_tint_clean: Color::srgb(0.40, 0.66, 0.95),
            sky_exposure_dirty: 0.55,
            sky_exposure_clean: 1.25,
            sky_write_epsilon: 0.002,

            flicker_threshold: 30.0,
            flicker_speed: 6.0,
            flicker_max_strength: 350_000.0,

            probe_refresh_seconds: 2.0,
            probe_refresh_energy_delta: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_ordered() {
        let s = VisualSettings::default();
        assert!(s.sun_illuminance_dirty < s.sun_illuminance_clean);
        assert!(s.ambient_brightness_dirty < s.ambient_brightness_clean);
        assert!(s.sky_exposure_dirty < s.sky_exposure_clean);
    }

    #[test]
    fn test_defaults_are_positive() {
        let s = VisualSettings::default();
        assert!(s.sun_illuminance_dirty >= 0.0);
        assert!(s.flicker_threshold > 0.0);
        assert!(s.flicker_max_strength > 0.0);
        assert!(s.probe_refresh_seconds > 0.0);
        assert!(s.probe_refresh_energy_delta > 0.0);
        assert!(s.sky_write_epsilon > 0.0);
    }
}
