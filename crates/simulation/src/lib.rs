use bevy::prelude::*;

pub mod clean_energy;
pub mod config;
pub mod power_mix;

// ---------------------------------------------------------------------------
// System sets
// ---------------------------------------------------------------------------

/// Ordering sets for the fixed-rate grid simulation.
///
/// Source-level updates (weather variability on renewable output) run before
/// the aggregation that folds all sources into the grid mix.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Per-source output updates.
    Sources,
    /// Aggregation of source outputs into the grid-wide mix.
    Aggregate,
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (SimulationSet::Sources, SimulationSet::Aggregate).chain(),
        );

        app.add_plugins((
            clean_energy::CleanEnergyPlugin,
            power_mix::PowerMixPlugin,
        ));
    }
}
