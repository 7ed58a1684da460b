//! Sun and ambient lighting driven by the clean-energy value.
//!
//! Both lights blend between a dirty-air look (dim, smog-warm sun over a
//! muddy ambient) and a clean-air look (bright warm-white sun, cool bright
//! ambient). The blend factor is the clamped energy fraction, recomputed
//! every frame.

use bevy::prelude::*;

use simulation::clean_energy::CleanEnergy;

use crate::settings::VisualSettings;

// =============================================================================
// Pure helpers
// =============================================================================

/// Linear interpolation between two f32 values.
pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Linear interpolation between two sRGB colors.
pub(crate) fn color_lerp(a: Color, b: Color, t: f32) -> Color {
    let a = a.to_srgba();
    let b = b.to_srgba();
    Color::srgb(
        lerp(a.red, b.red, t),
        lerp(a.green, b.green, t),
        lerp(a.blue, b.blue, t),
    )
}

/// Sun illuminance and color for a given energy fraction.
///
/// Illuminance is clamped non-negative so a misconfigured endpoint can never
/// produce a negative light.
pub fn sun_light_for_energy(settings: &VisualSettings, fraction: f32) -> (f32, Color) {
    let t = fraction.clamp(0.0, 1.0);
    let illuminance = lerp(
        settings.sun_illuminance_dirty,
        settings.sun_illuminance_clean,
        t,
    )
    .max(0.0);
    let color = color_lerp(settings.sun_color_dirty, settings.sun_color_clean, t);
    (illuminance, color)
}

/// Ambient brightness and color for a given energy fraction.
pub fn ambient_light_for_energy(settings: &VisualSettings, fraction: f32) -> (f32, Color) {
    let t = fraction.clamp(0.0, 1.0);
    let brightness = lerp(
        settings.ambient_brightness_dirty,
        settings.ambient_brightness_clean,
        t,
    )
    .max(0.0);
    let color = color_lerp(settings.ambient_color_dirty, settings.ambient_color_clean, t);
    (brightness, color)
}

// =============================================================================
// Systems
// =============================================================================

/// Writes the sun (every directional light) and the ambient light resource
/// from the current energy value. A scene without a sun is fine: the query
/// is simply empty.
pub fn update_energy_lighting(
    energy: Res<CleanEnergy>,
    settings: Res<VisualSettings>,
    mut suns: Query<&mut DirectionalLight>,
    mut ambient: ResMut<AmbientLight>,
) {
    let fraction = energy.fraction();

    let (illuminance, sun_color) = sun_light_for_energy(&settings, fraction);
    for mut sun in suns.iter_mut() {
        sun.illuminance = illuminance;
        sun.color = sun_color;
    }

    let (brightness, ambient_color) = ambient_light_for_energy(&settings, fraction);
    ambient.brightness = brightness;
    ambient.color = ambient_color;
}

// =============================================================================
// Tests
// =============================================================================
