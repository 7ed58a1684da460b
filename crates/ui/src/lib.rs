use bevy::prelude::*;
use bevy_egui::EguiPlugin;

pub mod energy_panel;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .init_resource::<energy_panel::EnergyPanelVisible>()
            .add_systems(
                Update,
                (
                    energy_panel::toggle_energy_panel,
                    energy_panel::energy_panel_ui,
                )
                    .chain(),
            );
    }
}
