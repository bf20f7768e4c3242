use serde::{Deserialize, Serialize};

use crate::{floating_type_mod::FT, vec3, V3};

/// Shape constant relating the smoothing radius to particles-per-meter.
pub const RADIUS_MULTIPLIER: FT = 1.695;

/// Floor for squared pairwise distances so the pressure term stays finite
/// for coincident particles.
pub const MIN_DISTANCE: FT = 1e-12;

/// Minimum penetration depth before a boundary penalty force kicks in.
pub const MIN_COLLISION_DIFF: FT = 1e-10;

/// Bytes of the particle file header: f32 ppm + i32 count.
pub const HEADER_SIZE: usize = 8;

/// f32 values per particle record: position, hv, velocity.
pub const PARTICLE_COMPONENTS: usize = 9;

/// Simulation tuning constants. The defaults are the canonical values of the
/// model; a YAML file can override individual values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConstants {
    pub rest_density: FT,
    pub pressure: FT,
    pub collision_stiffness: FT,
    pub damping: FT,
    pub viscosity: FT,
    pub particle_size: FT,
    pub time_step: FT,
    pub gravity: V3,
    pub domain_min: V3,
    pub domain_max: V3,
}

impl SimulationConstants {
    pub fn squared_time_step(&self) -> FT {
        self.time_step * self.time_step
    }

    pub fn domain_extent(&self) -> V3 {
        self.domain_max - self.domain_min
    }
}

impl Default for SimulationConstants {
    fn default() -> Self {
        SimulationConstants {
            rest_density: 1000.0,
            pressure: 3.0,
            collision_stiffness: 30000.0,
            damping: 128.0,
            viscosity: 0.4,
            particle_size: 0.0002,
            time_step: 0.001,
            gravity: vec3(0.0, -9.8, 0.0),
            domain_min: vec3(-0.065, -0.08, -0.065),
            domain_max: vec3(0.065, 0.1, 0.065),
        }
    }
}

#[test]
fn constants_yaml_partial_override() {
    let constants: SimulationConstants =
        serde_yaml::from_str("rest_density: 500.0\ntime_step: 0.002\n").unwrap();
    assert_eq!(constants.rest_density, 500.0);
    assert_eq!(constants.time_step, 0.002);
    // untouched keys keep the defaults
    assert_eq!(constants.damping, 128.0);
    assert_eq!(constants.gravity, vec3(0.0, -9.8, 0.0));
}
