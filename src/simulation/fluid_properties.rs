use crate::{
    floating_type_mod::{FT, PI},
    simulation::constants::{SimulationConstants, RADIUS_MULTIPLIER},
};

/// Derived constants computed once per run from the particles-per-meter of
/// the input set. Precomputing the smoothing powers and the two kernel
/// normalization factors keeps transcendental math out of the pair loops.
#[derive(Debug, Clone, Copy)]
pub struct FluidProperties {
    pub particles_per_meter: FT,
    pub smoothing: FT,
    pub smoothing_sq: FT,
    pub smoothing_6: FT,
    pub smoothing_9: FT,
    pub mass: FT,
    /// 315 / (64 pi h^9), normalization of the density kernel.
    pub density_kernel: FT,
    /// 45 / (pi h^6), normalization of the pressure/viscosity kernel.
    pub pressure_kernel: FT,
    pub mass_pressure_half: FT,
    pub mass_viscosity: FT,
    pub rest_density: FT,
}

impl FluidProperties {
    pub fn new(particles_per_meter: FT, constants: &SimulationConstants) -> FluidProperties {
        let smoothing = RADIUS_MULTIPLIER / particles_per_meter;
        let smoothing_sq = smoothing * smoothing;
        let smoothing_6 = smoothing_sq * smoothing_sq * smoothing_sq;
        let smoothing_9 = smoothing_6 * smoothing_sq * smoothing;
        let mass = constants.rest_density / particles_per_meter.powi(3);
        FluidProperties {
            particles_per_meter,
            smoothing,
            smoothing_sq,
            smoothing_6,
            smoothing_9,
            mass,
            density_kernel: 315.0 / (64.0 * PI * smoothing_9),
            pressure_kernel: 45.0 / (PI * smoothing_6),
            mass_pressure_half: mass * constants.pressure * 0.5,
            mass_viscosity: mass * constants.viscosity,
            rest_density: constants.rest_density,
        }
    }
}

#[test]
fn powers_derive_from_the_same_smoothing() {
    let constants = SimulationConstants::default();
    let props = FluidProperties::new(204.0, &constants);

    assert_eq!(props.smoothing, RADIUS_MULTIPLIER / 204.0);
    assert_eq!(props.smoothing_sq, props.smoothing * props.smoothing);
    assert_eq!(
        props.smoothing_6,
        props.smoothing_sq * props.smoothing_sq * props.smoothing_sq
    );
    assert_eq!(
        props.smoothing_9,
        props.smoothing_6 * props.smoothing_sq * props.smoothing
    );
}

#[test]
fn kernel_normalization_factors() {
    let constants = SimulationConstants::default();
    let props = FluidProperties::new(204.0, &constants);

    assert_eq!(props.density_kernel, 315.0 / (64.0 * PI * props.smoothing_9));
    assert_eq!(props.pressure_kernel, 45.0 / (PI * props.smoothing_6));
    assert_eq!(props.mass, 1000.0 / (204.0 as FT).powi(3));
    assert_eq!(props.mass_pressure_half, props.mass * 1.5);
    assert_eq!(props.mass_viscosity, props.mass * 0.4);
}
