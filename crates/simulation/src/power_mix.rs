//! Power-grid mix: derives the clean-energy scalar from power sources.
//!
//! Each `PowerSource` entity contributes output to the grid; a source is
//! renewable when its fuel cost is zero (the dispatch-order convention).
//! Clean share = renewable output / total output × 100, and becomes the
//! target of `CleanEnergy` unless the UI has locked a value.
//!
//! Weather-sensitive sources (wind, solar) lose output as sky cover rises.
//! Sky cover is redrawn every few seconds from a seeded RNG and smoothed
//! per tick, so the demo's energy value drifts deterministically.

use bevy::prelude::*;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::clean_energy::{CleanEnergy, EnergyControls};
use crate::SimulationSet;

// =============================================================================
// Constants
// =============================================================================

/// Seconds between sky-cover redraws.
const SKY_COVER_INTERVAL: f32 = 4.0;

/// Per-tick smoothing factor toward the drawn sky-cover value.
const SKY_COVER_SMOOTHING: f32 = 0.05;

/// Fraction of a weather-sensitive source's output lost under full sky cover.
const SKY_COVER_OUTPUT_LOSS: f32 = 0.7;

/// Seed for the sky-cover draw; fixed so demo runs are reproducible.
const SKY_COVER_SEED: u64 = 0x6c1d_9e37;

// =============================================================================
// Components
// =============================================================================

/// A single generator feeding the grid.
#[derive(Component, Debug, Clone)]
pub struct PowerSource {
    /// Display name for logs and readouts.
    pub name: &'static str,
    /// Nameplate output in MW.
    pub output_mw: f32,
    /// Marginal fuel cost in $/MWh; zero marks the source as renewable.
    pub fuel_cost: f32,
    /// Whether output scales down with sky cover (wind/solar).
    pub weather_sensitive: bool,
}

impl PowerSource {
    /// Renewable sources burn no fuel.
    pub fn is_renewable(&self) -> bool {
        self.fuel_cost == 0.0
    }

    /// Output after applying the current sky cover (0 = clear, 1 = overcast).
    pub fn effective_output(&self, sky_cover: f32) -> f32 {
        if self.weather_sensitive {
            let cover = sky_cover.clamp(0.0, 1.0);
            self.output_mw * (1.0 - SKY_COVER_OUTPUT_LOSS * cover)
        } else {
            self.output_mw
        }
    }
}

// =============================================================================
// Resources
// =============================================================================

/// Aggregated grid state, recomputed every fixed tick.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct GridMix {
    /// Renewable output currently on the grid, MW.
    pub renewable_mw: f32,
    /// Total output currently on the grid, MW.
    pub total_mw: f32,
    /// Smoothed sky cover, 0 (clear) to 1 (overcast).
    pub sky_cover: f32,
    /// Sky cover the smoothing is heading toward.
    pub sky_cover_target: f32,
    /// Seconds until the next sky-cover redraw.
    pub redraw_timer: f32,
}

impl Default for GridMix {
    fn default() -> Self {
        Self {
            renewable_mw: 0.0,
            total_mw: 0.0,
            sky_cover: 0.2,
            sky_cover_target: 0.2,
            redraw_timer: SKY_COVER_INTERVAL,
        }
    }
}

impl GridMix {
    /// Renewable share of total output, 0–100.
    ///
    /// An empty grid reports 100: with nothing generating, no dirty energy
    /// is being produced.
    pub fn clean_share(&self) -> f32 {
        clean_share_of(self.renewable_mw, self.total_mw)
    }
}

/// Seeded RNG for the sky-cover draw.
#[derive(Resource)]
pub struct SkyCoverRng(pub ChaCha8Rng);

impl Default for SkyCoverRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(SKY_COVER_SEED))
    }
}

// =============================================================================
// Pure helpers
// =============================================================================

/// Clean share formula shared by the aggregate system and tests.
pub fn clean_share_of(renewable_mw: f32, total_mw: f32) -> f32 {
    if total_mw <= 0.0 {
        return 100.0;
    }
    (renewable_mw / total_mw * 100.0).clamp(0.0, 100.0)
}

// =============================================================================
// Systems
// =============================================================================

/// Redraw and smooth sky cover on the fixed tick.
pub fn update_sky_cover(
    time: Res<Time>,
    mut rng: ResMut<SkyCoverRng>,
    mut mix: ResMut<GridMix>,
) {
    mix.redraw_timer -= time.delta_secs();
    if mix.redraw_timer <= 0.0 {
        mix.redraw_timer = SKY_COVER_INTERVAL;
        mix.sky_cover_target = rng.0.gen_range(0.0..=1.0);
    }

    let delta = mix.sky_cover_target - mix.sky_cover;
    mix.sky_cover += delta * SKY_COVER_SMOOTHING;
}

/// Fold every source's effective output into the grid mix and push the
/// resulting clean share into the energy target (unless locked).
pub fn aggregate_grid_mix(
    sources: Query<&PowerSource>,
    controls: Res<EnergyControls>,
    mut mix: ResMut<GridMix>,
    mut energy: ResMut<CleanEnergy>,
) {
    let mut renewable = 0.0;
    let mut total = 0.0;
    for source in &sources {
        let output = source.effective_output(mix.sky_cover);
        total += output;
        if source.is_renewable() {
            renewable += output;
        }
    }
    mix.renewable_mw = renewable;
    mix.total_mw = total;

    if controls.locked_value.is_none() {
        energy.target = mix.clean_share();
    }
}

/// Spawn the demo fleet. Roughly half the nameplate capacity is renewable,
/// so the clean share hovers mid-scale and moves with the weather.
pub fn spawn_demo_sources(mut commands: Commands) {
    let fleet = [
        PowerSource {
            name: "Ridgeline Wind",
            output_mw: 120.0,
            fuel_cost: 0.0,
            weather_sensitive: true,
        },
        PowerSource {
            name: "Southfield Solar",
            output_mw: 80.0,
            fuel_cost: 0.0,
            weather_sensitive: true,
        },
        PowerSource {
            name: "Millrace Hydro",
            output_mw: 60.0,
            fuel_cost: 0.0,
            weather_sensitive: false,
        },
        PowerSource {
            name: "Harbor Coal",
            output_mw: 150.0,
            fuel_cost: 30.0,
            weather_sensitive: false,
        },
        PowerSource {
            name: "Eastgate Gas Peaker",
            output_mw: 90.0,
            fuel_cost: 45.0,
            weather_sensitive: false,
        },
    ];
    for source in fleet {
        info!(
            "power mix: {} online ({} MW, {})",
            source.name,
            source.output_mw,
            if source.is_renewable() {
                "renewable"
            } else {
                "fossil"
            }
        );
        commands.spawn(source);
    }
}

// =============================================================================
// Plugin
// =============================================================================

pub struct PowerMixPlugin;

impl Plugin for PowerMixPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GridMix>()
            .init_resource::<SkyCoverRng>()
            .add_systems(Startup, spawn_demo_sources)
            .add_systems(
                FixedUpdate,
                (
                    update_sky_cover.in_set(SimulationSet::Sources),
                    aggregate_grid_mix.in_set(SimulationSet::Aggregate),
                ),
            );
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn source(output_mw: f32, fuel_cost: f32, weather_sensitive: bool) -> PowerSource {
        PowerSource {
            name: "test",
            output_mw,
            fuel_cost,
            weather_sensitive,
        }
    }

    #[test]
    fn test_clean_share_all_renewable() {
        assert!((clean_share_of(30.0, 30.0) - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_clean_share_no_renewable() {
        assert!(clean_share_of(0.0, 30.0) < 0.01);
    }

    #[test]
    fn test_clean_share_mixed() {
        // 10 MW renewable of 20 MW total -> 50%
        assert!((clean_share_of(10.0, 20.0) - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_clean_share_empty_grid() {
        assert!((clean_share_of(0.0, 0.0) - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_is_renewable_by_fuel_cost() {
        assert!(source(10.0, 0.0, false).is_renewable());
        assert!(!source(10.0, 30.0, false).is_renewable());
    }

    #[test]
    fn test_effective_output_clear_sky() {
        let wind = source(100.0, 0.0, true);
        assert!((wind.effective_output(0.0) - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_effective_output_overcast_reduces_sensitive_only() {
        let wind = source(100.0, 0.0, true);
        let coal = source(100.0, 30.0, false);
        assert!(
            (wind.effective_output(1.0) - (100.0 * (1.0 - SKY_COVER_OUTPUT_LOSS))).abs() < 0.01
        );
        assert!((coal.effective_output(1.0) - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_effective_output_clamps_cover() {
        let wind = source(100.0, 0.0, true);
        // Cover beyond 1.0 behaves like full overcast, never negative output.
        assert!(
            (wind.effective_output(5.0) - wind.effective_output(1.0)).abs() < f32::EPSILON
        );
        assert!(wind.effective_output(5.0) >= 0.0);
    }

    #[test]
    fn test_share_in_bounds_across_sky_cover() {
        let fleet = [
            source(120.0, 0.0, true),
            source(60.0, 0.0, false),
            source(150.0, 30.0, false),
        ];
        for i in 0..=10 {
            let cover = i as f32 / 10.0;
            let mut renewable = 0.0;
            let mut total = 0.0;
            for s in &fleet {
                let out = s.effective_output(cover);
                total += out;
                if s.is_renewable() {
                    renewable += out;
                }
            }
            let share = clean_share_of(renewable, total);
            assert!(
                (0.0..=100.0).contains(&share),
                "share {} out of bounds at cover {}",
                share,
                cover
            );
        }
    }

    #[test]
    fn test_more_cover_means_dirtier_grid() {
        // With fossil baseload fixed, rising sky cover shrinks the renewable
        // share monotonically.
        let fleet = [source(120.0, 0.0, true), source(150.0, 30.0, false)];
        let share_at = |cover: f32| {
            let mut renewable = 0.0;
            let mut total = 0.0;
            for s in &fleet {
                let out = s.effective_output(cover);
                total += out;
                if s.is_renewable() {
                    renewable += out;
                }
            }
            clean_share_of(renewable, total)
        };
        let mut prev = share_at(0.0);
        for i in 1..=10 {
            let next = share_at(i as f32 / 10.0);
            assert!(
                next <= prev + 0.001,
                "share should fall as cover rises: {} -> {}",
                prev,
                next
            );
            prev = next;
        }
    }

    #[test]
    fn test_sky_cover_rng_deterministic() {
        let mut a = SkyCoverRng::default();
        let mut b = SkyCoverRng::default();
        for _ in 0..8 {
            let x: f32 = a.0.gen_range(0.0..=1.0);
            let y: f32 = b.0.gen_range(0.0..=1.0);
            assert!((x - y).abs() < f32::EPSILON);
        }
    }
}
