//! Orbit camera: right-drag to orbit, scroll to zoom, WASD/arrows to pan.
//!
//! Pointer input is ignored while egui owns it, so dragging a panel slider
//! never spins the camera.

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

const PAN_SPEED: f32 = 60.0;
const ZOOM_SPEED: f32 = 0.12;
const ORBIT_SENSITIVITY: f32 = 0.006;
const MIN_DISTANCE: f32 = 15.0;
const MAX_DISTANCE: f32 = 320.0;
const MIN_PITCH: f32 = 8.0 * std::f32::consts::PI / 180.0;
const MAX_PITCH: f32 = 80.0 * std::f32::consts::PI / 180.0;

// =============================================================================
// Resources
// =============================================================================

/// Orbital camera model: the camera circles a focus point on the ground.
#[derive(Resource)]
pub struct OrbitCamera {
    /// Point the camera looks at.
    pub focus: Vec3,
    /// Horizontal rotation in radians.
    pub yaw: f32,
    /// Elevation angle in radians, clamped to [MIN_PITCH, MAX_PITCH].
    pub pitch: f32,
    /// Distance from the focus point.
    pub distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            focus: Vec3::new(0.0, 4.0, 0.0),
            yaw: 0.6,
            pitch: 28.0_f32.to_radians(),
            distance: 90.0,
        }
    }
}

/// Right-drag state for orbiting.
#[derive(Resource, Default)]
pub struct OrbitDrag {
    pub dragging: bool,
    pub last_pos: Vec2,
}

// =============================================================================
// Pure helpers
// =============================================================================

/// Spherical-to-cartesian: camera position and look target for the current
/// orbit state.
pub fn orbit_to_transform(orbit: &OrbitCamera) -> (Vec3, Vec3) {
    let x = orbit.distance * orbit.pitch.cos() * orbit.yaw.sin();
    let y = orbit.distance * orbit.pitch.sin();
    let z = orbit.distance * orbit.pitch.cos() * orbit.yaw.cos();
    (orbit.focus + Vec3::new(x, y, z), orbit.focus)
}

/// True when egui wants the pointer; world pointer input should skip.
fn egui_wants_pointer(contexts: &mut EguiContexts) -> bool {
    let ctx = contexts.ctx_mut();
    ctx.wants_pointer_input() || ctx.is_pointer_over_area()
}

// =============================================================================
// Systems
// =============================================================================

pub fn setup_camera(mut commands: Commands) {
    let orbit = OrbitCamera::default();
    let (pos, look_at) = orbit_to_transform(&orbit);
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(pos).looking_at(look_at, Vec3::Y),
    ));
    commands.insert_resource(orbit);
}

/// Right-mouse drag: horizontal movement yaws, vertical movement pitches.
pub fn camera_orbit_drag(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    mut contexts: EguiContexts,
    mut drag: ResMut<OrbitDrag>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };

    if buttons.just_pressed(MouseButton::Right) && !egui_wants_pointer(&mut contexts) {
        if let Some(pos) = window.cursor_position() {
            drag.dragging = true;
            drag.last_pos = pos;
        }
    }

    if buttons.just_released(MouseButton::Right) {
        drag.dragging = false;
    }

    if drag.dragging {
        if let Some(pos) = window.cursor_position() {
            let delta = pos - drag.last_pos;
            orbit.yaw -= delta.x * ORBIT_SENSITIVITY;
            orbit.pitch = (orbit.pitch + delta.y * ORBIT_SENSITIVITY).clamp(MIN_PITCH, MAX_PITCH);
            drag.last_pos = pos;
        }
    }
}

/// Scroll wheel: zoom by scaling the orbit distance.
pub fn camera_zoom(
    mut scroll_evts: EventReader<MouseWheel>,
    mut contexts: EguiContexts,
    mut orbit: ResMut<OrbitCamera>,
) {
    if egui_wants_pointer(&mut contexts) {
        scroll_evts.clear();
        return;
    }
    for evt in scroll_evts.read() {
        let dy = match evt.unit {
            MouseScrollUnit::Line => evt.y,
            MouseScrollUnit::Pixel => evt.y / 100.0,
        };
        let factor = 1.0 - dy * ZOOM_SPEED;
        orbit.distance = (orbit.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

/// WASD/arrow keys: pan the focus along the ground plane, relative to yaw.
pub fn camera_pan_keyboard(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let mut dir = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) || keys.pressed(KeyCode::ArrowUp) {
        dir.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown) {
        dir.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft) {
        dir.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight) {
        dir.x += 1.0;
    }

    if dir != Vec2::ZERO {
        let dir = dir.normalize();
        let scale = orbit.distance / 90.0;
        let delta = PAN_SPEED * scale * time.delta_secs();
        let cos_yaw = orbit.yaw.cos();
        let sin_yaw = orbit.yaw.sin();
        orbit.focus.x += (dir.x * cos_yaw + dir.y * sin_yaw) * delta;
        orbit.focus.z += (-dir.x * sin_yaw + dir.y * cos_yaw) * delta;
    }
}

/// Apply the orbit state to the camera transform when it changed.
pub fn apply_orbit_camera(
    orbit: Res<OrbitCamera>,
    mut query: Query<&mut Transform, With<Camera3d>>,
) {
    if !orbit.is_changed() {
        return;
    }
    let (pos, look_at) = orbit_to_transform(&orbit);
    let Ok(mut transform) = query.get_single_mut() else {
        return;
    };
    *transform = Transform::from_translation(pos).looking_at(look_at, Vec3::Y);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_position_respects_distance() {
        let orbit = OrbitCamera::default();
        let (pos, look_at) = orbit_to_transform(&orbit);
        assert!(
            ((pos - look_at).length() - orbit.distance).abs() < 0.001,
            "camera should sit exactly at the orbit distance"
        );
    }

    #[test]
    fn test_orbit_look_target_is_focus() {
        let orbit = OrbitCamera {
            focus: Vec3::new(10.0, 2.0, -4.0),
            ..Default::default()
        };
        let (_, look_at) = orbit_to_transform(&orbit);
        assert_eq!(look_at, orbit.focus);
    }

    #[test]
    fn test_orbit_stays_above_focus_plane() {
        // Pitch within [MIN_PITCH, MAX_PITCH] always puts the camera above
        // the focus height.
        for pitch in [MIN_PITCH, 0.5, 1.0, MAX_PITCH] {
            let orbit = OrbitCamera {
                pitch,
                ..Default::default()
            };
            let (pos, _) = orbit_to_transform(&orbit);
            assert!(pos.y > orbit.focus.y);
        }
    }

    #[test]
    fn test_default_pitch_in_clamp_range() {
        let orbit = OrbitCamera::default();
        assert!(orbit.pitch >= MIN_PITCH && orbit.pitch <= MAX_PITCH);
        assert!(orbit.distance >= MIN_DISTANCE && orbit.distance <= MAX_DISTANCE);
    }
}
