//! Demo scene: ground, a block of buildings with interior lights, sun, sky
//! dome, and two reflection probes.
//!
//! Everything is built from primitives and `StandardMaterial`s; initial
//! light/sky values come from the same mapping helpers the per-frame
//! systems use, so frame one already matches the current energy value.

use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;
use bevy::render::render_resource::Face;

use simulation::clean_energy::CleanEnergy;

use crate::energy_lighting::{ambient_light_for_energy, sun_light_for_energy};
use crate::light_flicker::FlickerLight;
use crate::reflection_probes::spawn_probe;
use crate::settings::VisualSettings;
use crate::sky_tint::{sky_color_for_energy, SkyDomeMaterial};

// =============================================================================
// Constants
// =============================================================================

/// Side length of the ground plane.
const GROUND_SIZE: f32 = 160.0;

/// Radius of the sky dome; larger than the camera's maximum orbit distance
/// so the camera always stays inside it.
const SKY_RADIUS: f32 = 600.0;

/// Number of buildings in the demo block.
const BUILDING_COUNT: usize = 6;

/// Building footprint side length.
const BUILDING_SIDE: f32 = 8.0;

/// Spacing between building centers.
const BUILDING_SPACING: f32 = 14.0;

/// Interior light output at full strength, lumens.
const INTERIOR_LIGHT_LUMENS: f32 = 600_000.0;

/// Reflection-probe intensity at energy 100.
const PROBE_BASE_INTENSITY: f32 = 900.0;

// =============================================================================
// Systems
// =============================================================================

pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    settings: Res<VisualSettings>,
    energy: Res<CleanEnergy>,
) {
    let fraction = energy.fraction();

    // Ambient light, seeded from the current energy value.
    let (brightness, ambient_color) = ambient_light_for_energy(&settings, fraction);
    commands.insert_resource(AmbientLight {
        color: ambient_color,
        brightness,
    });

    // Sun, angled from above.
    let (illuminance, sun_color) = sun_light_for_energy(&settings, fraction);
    commands.spawn((
        DirectionalLight {
            illuminance,
            color: sun_color,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -std::f32::consts::FRAC_PI_4,
            std::f32::consts::FRAC_PI_6,
            0.0,
        )),
    ));

    // Ground.
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.34, 0.38, 0.31),
            perceptual_roughness: 1.0,
            ..default()
        })),
        Transform::default(),
    ));

    // Building block. Heights vary by a deterministic per-index hash; each
    // building carries one interior point light flagged for flicker.
    let building_mesh_cache: Vec<Handle<Mesh>> = (0..BUILDING_COUNT)
        .map(|i| {
            let height = building_height(i);
            meshes.add(Cuboid::new(BUILDING_SIDE, height, BUILDING_SIDE))
        })
        .collect();
    let wall_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.55, 0.53, 0.5),
        perceptual_roughness: 0.9,
        ..default()
    });

    for (i, mesh) in building_mesh_cache.into_iter().enumerate() {
        let height = building_height(i);
        let x = (i as f32 - (BUILDING_COUNT as f32 - 1.0) / 2.0) * BUILDING_SPACING;
        let z = if i % 2 == 0 { -9.0 } else { 7.0 };

        commands.spawn((
            Mesh3d(mesh),
            MeshMaterial3d(wall_material.clone()),
            Transform::from_xyz(x, height / 2.0, z),
        ));

        commands.spawn((
            PointLight {
                intensity: INTERIOR_LIGHT_LUMENS,
                color: Color::srgb(1.0, 0.85, 0.6),
                range: 30.0,
                shadows_enabled: false,
                ..default()
            },
            Transform::from_xyz(x, height * 0.6, z),
            FlickerLight::default(),
        ));
    }

    // Sky dome: inverted sphere with an unlit material; the tint system
    // rewrites its base color.
    let initial_sky = sky_color_for_energy(&settings, fraction);
    let dome_material = materials.add(StandardMaterial {
        base_color: Color::srgb(initial_sky.red, initial_sky.green, initial_sky.blue),
        unlit: true,
        cull_mode: Some(Face::Front),
        ..default()
    });
    commands.spawn((
        Mesh3d(meshes.add(Sphere::new(SKY_RADIUS).mesh().uv(32, 18))),
        MeshMaterial3d(dome_material.clone()),
        Transform::default(),
        NotShadowCaster,
    ));
    commands.insert_resource(SkyDomeMaterial(Some(dome_material)));

    // Two probes covering the block, refreshed by the probe system.
    spawn_probe(
        &mut commands,
        &mut images,
        Vec3::new(-20.0, 10.0, 0.0),
        Vec3::splat(60.0),
        PROBE_BASE_INTENSITY,
        initial_sky,
    );
    spawn_probe(
        &mut commands,
        &mut images,
        Vec3::new(20.0, 10.0, 0.0),
        Vec3::splat(60.0),
        PROBE_BASE_INTENSITY,
        initial_sky,
    );
}

/// Deterministic building height: 8 to 16 world units.
fn building_height(index: usize) -> f32 {
    8.0 + ((index * 31) % 5) as f32 * 2.0
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_building_heights_in_range() {
        for i in 0..BUILDING_COUNT {
            let h = building_height(i);
            assert!((8.0..=16.0).contains(&h), "height {} out of range", h);
        }
    }

    #[test]
    fn test_building_heights_vary() {
        let distinct: std::collections::HashSet<u32> = (0..BUILDING_COUNT)
            .map(|i| building_height(i) as u32)
            .collect();
        assert!(distinct.len() > 1, "block should not be uniform");
    }

    #[test]
    fn test_sky_dome_encloses_camera_range() {
        // The dome must be big enough that the farthest zoom stays inside.
        assert!(SKY_RADIUS > 320.0);
    }
}
