use bevy::prelude::*;
use bevy::render::view::screenshot::{save_to_disk, Screenshot};
use bevy::window::PresentMode;
use bevy::winit::{UpdateMode, WinitSettings};

use simulation::clean_energy::EnergyControls;

/// Energy values swept by screenshot mode, lowest to highest.
const SHOT_PRESETS: &[(&str, f32)] = &[
    ("00_blackout", 0.0),
    ("01_failing", 15.0),
    ("02_strained", 35.0),
    ("03_mixed", 60.0),
    ("04_clean", 85.0),
    ("05_pristine", 100.0),
];

/// Frames to let the first render settle before the sweep starts.
const SWEEP_WARMUP_FRAMES: u32 = 60;

/// Frames spent on each preset. Long enough for the probe refresh cadence
/// (2 seconds) to pass between lock and capture.
const FRAMES_PER_PRESET: u32 = 150;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "GridLight".to_string(),
            resolution: (1280.0, 720.0).into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(WinitSettings {
        focused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(16)),
        unfocused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(100)),
    })
    .add_plugins((
        simulation::SimulationPlugin,
        rendering::RenderingPlugin,
        ui::UiPlugin,
    ));

    // Screenshot mode: locks the energy value at each preset in turn,
    // captures one frame per preset, and exits.
    if std::env::var("GRIDLIGHT_SCREENSHOTS").is_ok() {
        app.init_resource::<SweepState>();
        app.add_systems(Update, run_screenshot_sweep);
    }

    app.run();
}

#[derive(Resource, Default)]
struct SweepState {
    frame: u32,
    next_shot: usize,
}

/// Steps through [`SHOT_PRESETS`]: lock the energy value, give the renderer
/// time to settle (and the probe throttle a chance to fire), then capture.
fn run_screenshot_sweep(
    mut commands: Commands,
    mut sweep: ResMut<SweepState>,
    mut controls: ResMut<EnergyControls>,
    mut exit: EventWriter<AppExit>,
) {
    sweep.frame += 1;
    if sweep.frame < SWEEP_WARMUP_FRAMES {
        return;
    }

    if sweep.next_shot >= SHOT_PRESETS.len() {
        // Give the last capture a moment to hit the disk before exiting.
        let done = SWEEP_WARMUP_FRAMES + SHOT_PRESETS.len() as u32 * FRAMES_PER_PRESET;
        if sweep.frame > done + 20 {
            exit.send(AppExit::Success);
        }
        return;
    }

    let (name, energy) = SHOT_PRESETS[sweep.next_shot];
    match (sweep.frame - SWEEP_WARMUP_FRAMES) % FRAMES_PER_PRESET {
        0 => controls.locked_value = Some(energy),
        140 => {
            // Late in the preset window: lighting, sky, and probes have all
            // caught up to the locked value by now.
            let path = format!("/tmp/gridlight_{}.png", name);
            commands
                .spawn(Screenshot::primary_window())
                .observe(save_to_disk(path));
            sweep.next_shot += 1;
        }
        _ => {}
    }
}
