//! Throttled reflection-probe refresh.
//!
//! Bevy's light probes sample pre-made environment cubemaps; this module
//! generates those cubemaps procedurally (a single sky-colored texel per
//! face) and re-renders them at runtime. A refresh rewrites every probe's
//! cubemap from the current sky color and rescales the probe's intensity by
//! the energy fraction.
//!
//! Rewriting image assets re-uploads them, so refreshes are gated: enough
//! wall-clock time must have passed, and either the sky was rewritten this
//! frame or the energy value moved past a delta threshold since the last
//! refresh.

use bevy::pbr::environment_map::EnvironmentMapLight;
use bevy::pbr::LightProbe;
use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{
    Extent3d, TextureDimension, TextureFormat, TextureViewDescriptor, TextureViewDimension,
};

use simulation::clean_energy::CleanEnergy;

use crate::settings::VisualSettings;
use crate::sky_tint::{sky_color_for_energy, SkyTintState};

// =============================================================================
// Components
// =============================================================================

/// A refreshable environment probe. Spawned alongside `LightProbe` and
/// `EnvironmentMapLight`; holds the cubemap handle the refresh rewrites and
/// the intensity the energy fraction scales.
#[derive(Component)]
pub struct EnvironmentProbe {
    /// The probe's generated cubemap (shared by diffuse and specular maps).
    pub cubemap: Handle<Image>,
    /// Intensity at energy 100; scaled down linearly with the fraction.
    pub base_intensity: f32,
}

// =============================================================================
// Resources
// =============================================================================

/// When and at what energy value probes were last refreshed.
#[derive(Resource, Debug, Default)]
pub struct ProbeRefreshState {
    /// Elapsed seconds at the last refresh; `None` until the first one.
    pub last_refresh_secs: Option<f32>,
    /// Energy value captured at the last refresh.
    pub last_refresh_energy: f32,
}

// =============================================================================
// Pure helpers
// =============================================================================

/// Refresh gate. Time elapsed is a hard precondition; given that, a refresh
/// needs a reason: the sky changed this frame, or energy drifted far enough
/// from the value captured at the last refresh.
pub fn should_refresh(
    now_secs: f32,
    state: &ProbeRefreshState,
    energy: f32,
    sky_changed: bool,
    settings: &VisualSettings,
) -> bool {
    let elapsed_ok = match state.last_refresh_secs {
        None => true,
        Some(last) => now_secs - last >= settings.probe_refresh_seconds,
    };
    if !elapsed_ok {
        return false;
    }
    sky_changed || (energy - state.last_refresh_energy).abs() >= settings.probe_refresh_energy_delta
}

/// Build a 1x1x6 solid-color cubemap usable as an environment map.
///
/// Kept in main-world memory as well so refreshes can rewrite the texels.
pub fn make_probe_cubemap(color: Srgba) -> Image {
    let pixel = color_to_texel(color);
    let mut image = Image::new_fill(
        Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 6,
        },
        TextureDimension::D2,
        &pixel,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    );
    image.texture_view_descriptor = Some(TextureViewDescriptor {
        dimension: Some(TextureViewDimension::Cube),
        ..default()
    });
    image
}

/// Overwrite every texel of a probe cubemap with one color.
pub fn write_cubemap_color(image: &mut Image, color: Srgba) {
    let pixel = color_to_texel(color);
    for texel in image.data.chunks_exact_mut(4) {
        texel.copy_from_slice(&pixel);
    }
}

fn color_to_texel(color: Srgba) -> [u8; 4] {
    [
        (color.red.clamp(0.0, 1.0) * 255.0) as u8,
        (color.green.clamp(0.0, 1.0) * 255.0) as u8,
        (color.blue.clamp(0.0, 1.0) * 255.0) as u8,
        255,
    ]
}

// =============================================================================
// Systems
// =============================================================================

/// Gated probe refresh. Runs after the sky-tint system in the same frame so
/// `SkyTintState::changed_this_frame` is current.
pub fn refresh_reflection_probes(
    time: Res<Time>,
    energy: Res<CleanEnergy>,
    settings: Res<VisualSettings>,
    sky: Res<SkyTintState>,
    mut state: ResMut<ProbeRefreshState>,
    mut probes: Query<(&EnvironmentProbe, &mut EnvironmentMapLight)>,
    mut images: ResMut<Assets<Image>>,
) {
    let now = time.elapsed_secs();
    if !should_refresh(
        now,
        &state,
        energy.current,
        sky.changed_this_frame,
        &settings,
    ) {
        return;
    }
    if probes.is_empty() {
        return;
    }

    let sky_color = sky_color_for_energy(&settings, energy.fraction());
    for (probe, mut env_light) in probes.iter_mut() {
        if let Some(image) = images.get_mut(&probe.cubemap) {
            write_cubemap_color(image, sky_color);
        }
        env_light.intensity = probe.base_intensity * energy.fraction();
    }

    state.last_refresh_secs = Some(now);
    state.last_refresh_energy = energy.current;
}

/// Spawn one refreshable probe at `position` covering `extent`.
pub fn spawn_probe(
    commands: &mut Commands,
    images: &mut Assets<Image>,
    position: Vec3,
    extent: Vec3,
    base_intensity: f32,
    initial_color: Srgba,
) {
    let cubemap = images.add(make_probe_cubemap(initial_color));
    commands.spawn((
        LightProbe,
        EnvironmentMapLight {
            diffuse_map: cubemap.clone(),
            specular_map: cubemap.clone(),
            intensity: base_intensity,
            rotation: Quat::IDENTITY,
        },
        Transform::from_translation(position).with_scale(extent),
        EnvironmentProbe {
            cubemap,
            base_intensity,
        },
    ));
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> VisualSettings {
        VisualSettings {
            probe_refresh_seconds: 2.0,
            probe_refresh_energy_delta: 5.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_first_refresh_needs_a_reason() {
        let state = ProbeRefreshState::default();
        // Time gate passes (never refreshed), but neither trigger holds:
        // energy equals the captured default and the sky did not change.
        assert!(!should_refresh(0.0, &state, 0.0, false, &settings()));
        assert!(should_refresh(0.0, &state, 0.0, true, &settings()));
        assert!(should_refresh(0.0, &state, 50.0, false, &settings()));
    }

    #[test]
    fn test_throttle_blocks_even_with_reason() {
        let state = ProbeRefreshState {
            last_refresh_secs: Some(10.0),
            last_refresh_energy: 40.0,
        };
        // 1 second after the last refresh, below the 2-second cadence.
        assert!(!should_refresh(11.0, &state, 90.0, true, &settings()));
    }

    #[test]
    fn test_refresh_on_sky_change_after_interval() {
        let state = ProbeRefreshState {
            last_refresh_secs: Some(10.0),
            last_refresh_energy: 40.0,
        };
        assert!(should_refresh(12.5, &state, 40.0, true, &settings()));
    }

    #[test]
    fn test_refresh_on_energy_delta_after_interval() {
        let state = ProbeRefreshState {
            last_refresh_secs: Some(10.0),
            last_refresh_energy: 40.0,
        };
        assert!(should_refresh(12.5, &state, 46.0, false, &settings()));
        // Small drift alone is not a reason.
        assert!(!should_refresh(12.5, &state, 42.0, false, &settings()));
    }

    #[test]
    fn test_no_refresh_without_any_reason() {
        let state = ProbeRefreshState {
            last_refresh_secs: Some(10.0),
            last_refresh_energy: 40.0,
        };
        assert!(!should_refresh(100.0, &state, 40.0, false, &settings()));
    }

    #[test]
    fn test_cubemap_has_six_faces() {
        let image = make_probe_cubemap(Srgba::new(0.5, 0.5, 0.5, 1.0));
        assert_eq!(image.texture_descriptor.size.depth_or_array_layers, 6);
        // 6 faces x 1 texel x 4 bytes
        assert_eq!(image.data.len(), 24);
    }

    #[test]
    fn test_cubemap_color_bytes() {
        let image = make_probe_cubemap(Srgba::new(1.0, 0.0, 0.5, 1.0));
        for texel in image.data.chunks_exact(4) {
            assert_eq!(texel[0], 255);
            assert_eq!(texel[1], 0);
            assert_eq!(texel[2], 127);
            assert_eq!(texel[3], 255);
        }
    }

    #[test]
    fn test_write_cubemap_color_rewrites_all_faces() {
        let mut image = make_probe_cubemap(Srgba::new(0.0, 0.0, 0.0, 1.0));
        write_cubemap_color(&mut image, Srgba::new(0.0, 1.0, 0.0, 1.0));
        for texel in image.data.chunks_exact(4) {
            assert_eq!(texel, [0, 255, 0, 255]);
        }
    }

    #[test]
    fn test_texel_clamps_hdr_channels() {
        // Exposure can push sky channels past 1.0; texels saturate.
        let image = make_probe_cubemap(Srgba::new(1.5, -0.2, 0.0, 1.0));
        let texel = &image.data[0..4];
        assert_eq!(texel[0], 255);
        assert_eq!(texel[1], 0);
    }
}
