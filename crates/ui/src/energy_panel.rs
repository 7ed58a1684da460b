//! Clean-energy controls UI panel.
//!
//! Provides an egui window with:
//! - Energy slider (0..100); dragging locks the value
//! - Lock/unlock toggle to pin the current value
//! - Ramp speed selector (Normal / Fast / Frozen)
//! - Quick presets
//! - Grid-mix readout (renewable vs total output, sky cover)
//! - Keybind (E) to toggle the panel

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use simulation::clean_energy::{CleanEnergy, EnergyControls, RampSpeed};
use simulation::power_mix::GridMix;

// =============================================================================
// Resources
// =============================================================================

/// Whether the energy controls panel is visible.
#[derive(Resource)]
pub struct EnergyPanelVisible(pub bool);

impl Default for EnergyPanelVisible {
    fn default() -> Self {
        // Visible at launch: the panel is how you drive the demo.
        Self(true)
    }
}

// =============================================================================
// Systems
// =============================================================================

/// Toggles the panel with the E key.
pub fn toggle_energy_panel(
    keys: Res<ButtonInput<KeyCode>>,
    mut visible: ResMut<EnergyPanelVisible>,
) {
    if keys.just_pressed(KeyCode::KeyE) {
        visible.0 = !visible.0;
    }
}

/// Renders the energy controls window.
pub fn energy_panel_ui(
    mut contexts: EguiContexts,
    mut visible: ResMut<EnergyPanelVisible>,
    mut controls: ResMut<EnergyControls>,
    mut energy: ResMut<CleanEnergy>,
    mix: Res<GridMix>,
) {
    if !visible.0 {
        return;
    }

    let mut open = true;
    egui::Window::new("Clean Energy")
        .open(&mut open)
        .resizable(false)
        .default_width(260.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.spacing_mut().item_spacing.y = 8.0;

            // --- Current value display ---
            let effective = controls.effective_value(energy.current);
            ui.heading(format!(
                "{:.0}% clean ({})",
                effective,
                grid_state_label(effective)
            ));

            ui.separator();

            // --- Energy slider ---
            ui.label("Clean energy:");
            let mut slider_value = effective;
            let response = ui.add(
                egui::Slider::new(&mut slider_value, 0.0..=100.0)
                    .text("%")
                    .custom_formatter(|v, _| format!("{:.0}", v)),
            );
            if response.changed() {
                // Dragging the slider locks the value so the grid doesn't
                // immediately pull it back.
                controls.locked_value = Some(slider_value);
                energy.current = slider_value;
            }

            ui.separator();

            // --- Lock toggle ---
            let is_locked = controls.locked_value.is_some();
            let lock_label = if is_locked {
                "Locked (click to return to the grid)"
            } else {
                "Unlocked (click to pin the current value)"
            };
            if ui.selectable_label(is_locked, lock_label).clicked() {
                if is_locked {
                    controls.locked_value = None;
                } else {
                    controls.locked_value = Some(energy.current);
                }
            }

            ui.separator();

            // --- Ramp speed ---
            ui.label("Ramp speed:");
            ui.horizontal(|ui| {
                for (speed, label) in [
                    (RampSpeed::Normal, "Normal"),
                    (RampSpeed::Fast, "Fast"),
                    (RampSpeed::Frozen, "Frozen"),
                ] {
                    if ui
                        .selectable_label(controls.ramp_speed == speed, label)
                        .clicked()
                    {
                        controls.ramp_speed = speed;
                        // Picking a moving speed implies wanting to watch the
                        // value move; drop the lock.
                        if speed != RampSpeed::Frozen && controls.locked_value.is_some() {
                            controls.locked_value = None;
                        }
                    }
                }
            });

            // --- Quick presets ---
            ui.separator();
            ui.label("Presets:");
            ui.horizontal(|ui| {
                for (label, value) in [("Blackout", 0.0), ("Strained", 25.0), ("Mixed", 50.0)] {
                    if ui.button(label).clicked() {
                        controls.locked_value = Some(value);
                        energy.current = value;
                    }
                }
            });
            ui.horizontal(|ui| {
                for (label, value) in [("Mostly clean", 75.0), ("Pristine", 100.0)] {
                    if ui.button(label).clicked() {
                        controls.locked_value = Some(value);
                        energy.current = value;
                    }
                }
            });

            // --- Grid mix readout ---
            ui.separator();
            ui.label(format!(
                "Grid: {:.0} MW renewable / {:.0} MW total",
                mix.renewable_mw, mix.total_mw
            ));
            ui.label(format!(
                "Sky cover: {:.0}%  ->  grid target {:.0}%",
                mix.sky_cover * 100.0,
                mix.clean_share()
            ));
        });

    if !open {
        visible.0 = false;
    }
}

/// Human-readable label for an energy value.
fn grid_state_label(energy: f32) -> &'static str {
    if energy >= 90.0 {
        "Pristine"
    } else if energy >= 65.0 {
        "Clean"
    } else if energy >= 40.0 {
        "Mixed"
    } else if energy >= 15.0 {
        "Strained"
    } else {
        "Failing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_state_labels() {
        assert_eq!(grid_state_label(100.0), "Pristine");
        assert_eq!(grid_state_label(90.0), "Pristine");
        assert_eq!(grid_state_label(70.0), "Clean");
        assert_eq!(grid_state_label(50.0), "Mixed");
        assert_eq!(grid_state_label(20.0), "Strained");
        assert_eq!(grid_state_label(5.0), "Failing");
        assert_eq!(grid_state_label(0.0), "Failing");
    }

    #[test]
    fn test_panel_starts_visible() {
        assert!(EnergyPanelVisible::default().0);
    }
}
