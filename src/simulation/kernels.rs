use crate::{
    floating_type_mod::FT,
    simulation::{constants::MIN_DISTANCE, fluid_properties::FluidProperties},
    V3,
};

/// Symmetric density contribution for a pair closer than the smoothing
/// radius. Both particles of the pair receive this value.
pub fn density_increment(props: &FluidProperties, squared_distance: FT) -> FT {
    let diff = props.smoothing_sq - squared_distance;
    diff * diff * diff
}

/// Final density of a particle once all pair contributions are accumulated.
/// Must be applied exactly once per particle per step.
pub fn transformed_density(props: &FluidProperties, accumulated: FT) -> FT {
    (accumulated + props.smoothing_6) * props.density_kernel * props.mass
}

/// Pressure/viscosity acceleration contribution of one qualifying pair.
/// The caller adds the result to particle i and subtracts it from particle j.
/// Requires both densities to be final.
#[allow(clippy::too_many_arguments)]
pub fn acceleration_increment(
    props: &FluidProperties,
    position_i: V3,
    position_j: V3,
    velocity_i: V3,
    velocity_j: V3,
    density_i: FT,
    density_j: FT,
    squared_distance: FT,
) -> V3 {
    let distance = squared_distance.max(MIN_DISTANCE).sqrt();
    let smoothing_diff = props.smoothing - distance;

    let pressure_term = (position_i - position_j)
        * props.mass_pressure_half
        * (smoothing_diff * smoothing_diff / distance)
        * (density_i + density_j - 2.0 * props.rest_density);
    let viscosity_term = (velocity_j - velocity_i) * props.mass_viscosity;

    (pressure_term + viscosity_term) * props.pressure_kernel / (density_i * density_j)
}

#[cfg(test)]
use crate::{simulation::constants::SimulationConstants, vec3};

#[test]
fn coincident_pair_density_increment_is_smoothing_6() {
    // fence-post: at distance zero the increment is (h^2 - 0)^3 = h^6 exactly
    let props = FluidProperties::new(204.0, &SimulationConstants::default());
    assert_eq!(density_increment(&props, 0.0), props.smoothing_6);
}

#[test]
fn density_increment_vanishes_at_cutoff() {
    let props = FluidProperties::new(204.0, &SimulationConstants::default());
    assert_eq!(density_increment(&props, props.smoothing_sq), 0.0);
}

#[test]
fn acceleration_increment_is_antisymmetric() {
    let props = FluidProperties::new(204.0, &SimulationConstants::default());
    let position_i = vec3(0.01, 0.02, 0.03);
    let position_j = vec3(0.011, 0.019, 0.031);
    let velocity_i = vec3(0.5, -0.2, 0.1);
    let velocity_j = vec3(-0.3, 0.4, 0.0);
    let density_i = 996.0;
    let density_j = 1004.5;
    let squared_distance = (position_i - position_j).norm_squared();

    let forward = acceleration_increment(
        &props,
        position_i,
        position_j,
        velocity_i,
        velocity_j,
        density_i,
        density_j,
        squared_distance,
    );
    let backward = acceleration_increment(
        &props,
        position_j,
        position_i,
        velocity_j,
        velocity_i,
        density_j,
        density_i,
        squared_distance,
    );

    // pressure term flips with the position difference, viscosity with the
    // velocity difference; the denominator is symmetric
    assert_eq!(forward, -backward);
}

#[test]
fn coincident_pair_acceleration_is_finite() {
    let props = FluidProperties::new(204.0, &SimulationConstants::default());
    let position = vec3(0.0, 0.0, 0.0);
    let increment = acceleration_increment(
        &props,
        position,
        position,
        vec3(0.1, 0.0, 0.0),
        vec3(0.0, 0.1, 0.0),
        1000.0,
        1000.0,
        0.0,
    );
    assert!(increment.iter().all(|component| component.is_finite()));
}
