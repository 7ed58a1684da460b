//! Clean-energy state and player-facing controls.
//!
//! `CleanEnergy` holds the scalar (0–100) every visual system reads. The
//! value ramps toward a target fed by the power mix, so lighting shifts
//! smoothly instead of snapping when a plant drops off the grid.
//!
//! `EnergyControls` exposes the override surface used by the UI panel:
//! - Lock: pin the value regardless of what the grid produces
//! - Ramp speed: normal, fast, or frozen

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{ENERGY_MAX, ENERGY_RAMP_RATE};

// =============================================================================
// Types
// =============================================================================

/// Controls how quickly the displayed energy value chases its target.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RampSpeed {
    /// Normal ramp rate.
    #[default]
    Normal,
    /// 3x the normal ramp rate.
    Fast,
    /// The displayed value stays where it is (target changes are ignored).
    Frozen,
}

impl RampSpeed {
    /// Multiplier applied to [`ENERGY_RAMP_RATE`].
    pub fn multiplier(self) -> f32 {
        match self {
            RampSpeed::Normal => 1.0,
            RampSpeed::Fast => 3.0,
            RampSpeed::Frozen => 0.0,
        }
    }
}

// =============================================================================
// Resources
// =============================================================================

/// The clean-energy scalar driving all environment visuals.
///
/// `current` is the value the rendering layer reads each frame; `target` is
/// where the power mix (or a UI preset) wants it to go.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct CleanEnergy {
    /// Displayed/applied value (0–100).
    pub current: f32,
    /// Value `current` ramps toward (0–100).
    pub target: f32,
}

impl Default for CleanEnergy {
    fn default() -> Self {
        Self {
            current: 65.0,
            target: 65.0,
        }
    }
}

impl CleanEnergy {
    /// Normalized interpolation factor: `clamp(current / 100, 0, 1)`.
    pub fn fraction(&self) -> f32 {
        (self.current / ENERGY_MAX).clamp(0.0, 1.0)
    }

    /// Set both current and target, clamped into range.
    pub fn set(&mut self, value: f32) {
        let v = value.clamp(0.0, ENERGY_MAX);
        self.current = v;
        self.target = v;
    }
}

/// Player-facing overrides for the clean-energy value.
///
/// When `locked_value` is set, the displayed value is pinned to it and the
/// power mix stops writing the target. Unlocking lets the value ramp back to
/// whatever the grid currently produces.
#[derive(Resource, Debug, Default, Clone, Serialize, Deserialize)]
pub struct EnergyControls {
    /// If `Some(v)`, the displayed energy value is pinned to `v` (0–100).
    pub locked_value: Option<f32>,
    /// Ramp-speed setting for the unlocked case.
    pub ramp_speed: RampSpeed,
}

impl EnergyControls {
    /// Returns the effective energy value.
    ///
    /// If a locked value is set, returns that (clamped into range).
    /// Otherwise returns the ramped `current` value passed in.
    pub fn effective_value(&self, current: f32) -> f32 {
        if let Some(locked) = self.locked_value {
            locked.clamp(0.0, ENERGY_MAX)
        } else {
            current
        }
    }
}

// =============================================================================
// Pure helpers
// =============================================================================

/// Move `current` toward `target` by at most `step`, without overshoot.
pub fn ramp_toward(current: f32, target: f32, step: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= step {
        target
    } else {
        current + step.copysign(delta)
    }
}

// =============================================================================
// Systems
// =============================================================================

/// Per-frame update of the displayed energy value.
///
/// - Locked: the value is pinned directly (instant feedback for the slider).
/// - Frozen ramp speed: the value stays put.
/// - Otherwise: ramp toward the target at the configured rate.
pub fn update_clean_energy(
    time: Res<Time>,
    controls: Res<EnergyControls>,
    mut energy: ResMut<CleanEnergy>,
) {
    if controls.locked_value.is_some() {
        energy.current = controls.effective_value(energy.current);
        return;
    }

    let rate = ENERGY_RAMP_RATE * controls.ramp_speed.multiplier();
    if rate <= 0.0 {
        return;
    }

    let step = rate * time.delta_secs();
    let target = energy.target.clamp(0.0, ENERGY_MAX);
    energy.current = ramp_toward(energy.current, target, step);
}

// =============================================================================
// Plugin
// =============================================================================

pub struct CleanEnergyPlugin;

impl Plugin for CleanEnergyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CleanEnergy>()
            .init_resource::<EnergyControls>()
            .add_systems(Update, update_clean_energy);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let energy = CleanEnergy::default();
        assert!((energy.current - 65.0).abs() < f32::EPSILON);
        assert!((energy.target - 65.0).abs() < f32::EPSILON);

        let controls = EnergyControls::default();
        assert_eq!(controls.locked_value, None);
        assert_eq!(controls.ramp_speed, RampSpeed::Normal);
    }

    #[test]
    fn test_fraction_in_range() {
        let energy = CleanEnergy {
            current: 50.0,
            target: 50.0,
        };
        assert!((energy.fraction() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_fraction_clamps_out_of_range() {
        let high = CleanEnergy {
            current: 150.0,
            target: 150.0,
        };
        assert!((high.fraction() - 1.0).abs() < f32::EPSILON);

        let low = CleanEnergy {
            current: -20.0,
            target: -20.0,
        };
        assert!(low.fraction().abs() < f32::EPSILON);
    }

    #[test]
    fn test_set_clamps() {
        let mut energy = CleanEnergy::default();
        energy.set(240.0);
        assert!((energy.current - ENERGY_MAX).abs() < f32::EPSILON);
        assert!((energy.target - ENERGY_MAX).abs() < f32::EPSILON);

        energy.set(-3.0);
        assert!(energy.current.abs() < f32::EPSILON);
    }

    #[test]
    fn test_effective_value_unlocked() {
        let controls = EnergyControls {
            locked_value: None,
            ..Default::default()
        };
        assert!((controls.effective_value(42.5) - 42.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_effective_value_locked() {
        let controls = EnergyControls {
            locked_value: Some(80.0),
            ..Default::default()
        };
        // The ramped value is ignored while locked.
        assert!((controls.effective_value(20.0) - 80.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_effective_value_clamps_locked() {
        let controls = EnergyControls {
            locked_value: Some(250.0),
            ..Default::default()
        };
        assert!((controls.effective_value(0.0) - ENERGY_MAX).abs() < f32::EPSILON);

        let controls = EnergyControls {
            locked_value: Some(-10.0),
            ..Default::default()
        };
        assert!(controls.effective_value(50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ramp_toward_no_overshoot() {
        // Step larger than remaining distance snaps to target.
        assert!((ramp_toward(40.0, 42.0, 10.0) - 42.0).abs() < f32::EPSILON);
        // Step smaller than distance advances exactly one step.
        assert!((ramp_toward(40.0, 80.0, 10.0) - 50.0).abs() < f32::EPSILON);
        // Works downward too.
        assert!((ramp_toward(80.0, 40.0, 10.0) - 70.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ramp_toward_converges() {
        let mut v = 0.0;
        for _ in 0..100 {
            v = ramp_toward(v, 73.0, 1.0);
        }
        assert!((v - 73.0).abs() < f32::EPSILON, "did not converge: {}", v);
    }

    #[test]
    fn test_ramp_speed_multipliers() {
        assert!((RampSpeed::Normal.multiplier() - 1.0).abs() < f32::EPSILON);
        assert!((RampSpeed::Fast.multiplier() - 3.0).abs() < f32::EPSILON);
        assert!(RampSpeed::Frozen.multiplier().abs() < f32::EPSILON);
    }
}
