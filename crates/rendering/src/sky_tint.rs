//! Sky-dome tint and exposure.
//!
//! The sky is an inverted dome mesh with an unlit material; the color
//! written to it is `tint * exposure`, both blended from the clean-energy
//! value. Writes go through a change guard: mutating a material asset marks
//! it dirty and re-uploads it, so redundant writes are skipped when the
//! candidate color is within epsilon of the last one written.
//!
//! The `changed_this_frame` flag is consumed by the reflection-probe system
//! later in the same frame.

use bevy::prelude::*;

use simulation::clean_energy::CleanEnergy;

use crate::energy_lighting::{color_lerp, lerp};
use crate::settings::VisualSettings;

// =============================================================================
// Resources
// =============================================================================

/// Handle of the sky dome's material, filled in by scene setup. `None` when
/// the scene runs without a dome; the tint system then does nothing.
#[derive(Resource, Default)]
pub struct SkyDomeMaterial(pub Option<Handle<StandardMaterial>>);

/// Change-guard state for sky writes.
#[derive(Resource, Default)]
pub struct SkyTintState {
    /// Last color actually written to the material.
    pub last_written: Option<Srgba>,
    /// Whether this frame's run of the tint system wrote the material.
    pub changed_this_frame: bool,
}

// =============================================================================
// Pure helpers
// =============================================================================

/// Final sky color for a given energy fraction: blended tint scaled by the
/// blended exposure. Channels are clamped non-negative; exposure above 1
/// may push them past 1 intentionally (HDR sky).
pub fn sky_color_for_energy(settings: &VisualSettings, fraction: f32) -> Srgba {
    let t = fraction.clamp(0.0, 1.0);
    let tint = color_lerp(settings.sky_tint_dirty, settings.sky_tint_clean, t).to_srgba();
    let exposure = lerp(settings.sky_exposure_dirty, settings.sky_exposure_clean, t).max(0.0);
    Srgba::new(
        (tint.red * exposure).max(0.0),
        (tint.green * exposure).max(0.0),
        (tint.blue * exposure).max(0.0),
        1.0,
    )
}

/// Whether `candidate` differs from the last written color by more than
/// `epsilon` on any channel. A never-written sky always needs a write.
pub fn needs_write(last: Option<Srgba>, candidate: Srgba, epsilon: f32) -> bool {
    match last {
        None => true,
        Some(prev) => {
            (prev.red - candidate.red).abs() > epsilon
                || (prev.green - candidate.green).abs() > epsilon
                || (prev.blue - candidate.blue).abs() > epsilon
        }
    }
}

// =============================================================================
// Systems
// =============================================================================

/// Per-frame sky write, guarded against redundant updates.
pub fn update_sky_tint(
    energy: Res<CleanEnergy>,
    settings: Res<VisualSettings>,
    dome: Res<SkyDomeMaterial>,
    mut state: ResMut<SkyTintState>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    state.changed_this_frame = false;

    let Some(handle) = dome.0.as_ref() else {
        return;
    };

    let candidate = sky_color_for_energy(&settings, energy.fraction());
    if !needs_write(state.last_written, candidate, settings.sky_write_epsilon) {
        return;
    }

    let Some(material) = materials.get_mut(handle) else {
        return;
    };
    material.base_color = Color::srgb(candidate.red, candidate.green, candidate.blue);
    state.last_written = Some(candidate);
    state.changed_this_frame = true;
}

/// Startup diagnostic: a scene without a sky material still runs, but the
/// sky stays whatever the dome was spawned with.
pub fn check_sky_material(
    dome: Res<SkyDomeMaterial>,
    materials: Res<Assets<StandardMaterial>>,
) {
    match dome.0.as_ref() {
        None => warn!("sky dome material missing; sky tint disabled"),
        Some(handle) if materials.get(handle).is_none() => {
            warn!("sky dome material handle is dangling; sky tint disabled");
        }
        _ => {}
    }
}

// =============================================================================
// Tests
// =============================================================================
