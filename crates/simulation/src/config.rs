/// Upper bound of the clean-energy scale. Values are clamped into
/// [0, ENERGY_MAX] before any visual mapping.
pub const ENERGY_MAX: f32 = 100.0;

/// Percent-per-second the displayed energy value moves toward its target at
/// normal ramp speed.
pub const ENERGY_RAMP_RATE: f32 = 12.0;
