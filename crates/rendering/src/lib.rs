use bevy::prelude::*;

pub mod camera;
pub mod energy_lighting;
pub mod light_flicker;
pub mod reflection_probes;
pub mod scene;
pub mod settings;
pub mod sky_tint;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<settings::VisualSettings>()
            .init_resource::<camera::OrbitDrag>()
            .init_resource::<sky_tint::SkyDomeMaterial>()
            .init_resource::<sky_tint::SkyTintState>()
            .init_resource::<reflection_probes::ProbeRefreshState>()
            .init_resource::<light_flicker::FlickerNoise>()
            .init_resource::<light_flicker::FlickerPhases>()
            .add_systems(
                Startup,
                (
                    camera::setup_camera,
                    scene::setup_scene,
                    sky_tint::check_sky_material,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    camera::camera_orbit_drag,
                    camera::camera_zoom,
                    camera::camera_pan_keyboard,
                    camera::apply_orbit_camera,
                ),
            )
            // The environment chain runs in declaration order: the sky system
            // records whether it wrote this frame and the probe system reads
            // that flag, so the two must not be reordered.
            .add_systems(
                Update,
                (
                    energy_lighting::update_energy_lighting,
                    sky_tint::update_sky_tint,
                    reflection_probes::refresh_reflection_probes,
                )
                    .chain()
                    .after(simulation::clean_energy::update_clean_energy),
            )
            .add_systems(
                Update,
                (
                    light_flicker::register_flicker_lights,
                    light_flicker::apply_light_flicker,
                )
                    .chain()
                    .after(simulation::clean_energy::update_clean_energy),
            );
    }
}
