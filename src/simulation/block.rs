use crate::{
    simulation::{
        constants::{SimulationConstants, MIN_COLLISION_DIFF},
        fluid_properties::FluidProperties,
        kernels,
        storage::{Particle, ParticleStorage},
    },
    V3,
};

use std::collections::BTreeSet;

/// One of the six domain walls a block can directly border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Boundary {
    XLow,
    XHigh,
    YLow,
    YHigh,
    ZLow,
    ZHigh,
}

impl Boundary {
    pub fn low(axis: usize) -> Boundary {
        [Boundary::XLow, Boundary::YLow, Boundary::ZLow][axis]
    }

    pub fn high(axis: usize) -> Boundary {
        [Boundary::XHigh, Boundary::YHigh, Boundary::ZHigh][axis]
    }
}

/// A cell of the spatial lattice holding the particles currently inside its
/// bounds. Identity is the cell's index in the grid's flat block array;
/// blocks are rebuilt wholesale on repositioning, never mutated in place.
#[derive(Debug, Default)]
pub struct Block<S: ParticleStorage> {
    pub particles: S,
}

impl<S: ParticleStorage> Block<S> {
    pub fn push(&mut self, particle: Particle, gravity: V3) {
        self.particles.push(particle, gravity);
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Density contribution of the unordered pair (i, j) inside this block.
    pub fn density_pair(&mut self, props: &FluidProperties, i: usize, j: usize) {
        let squared_distance =
            (self.particles.position(i) - self.particles.position(j)).norm_squared();
        if squared_distance < props.smoothing_sq {
            let increment = kernels::density_increment(props, squared_distance);
            self.particles.add_density(i, increment);
            self.particles.add_density(j, increment);
        }
    }

    /// Density contribution between particle i of this block and particle j
    /// of a neighboring block.
    pub fn density_cross(&mut self, props: &FluidProperties, i: usize, other: &mut Block<S>, j: usize) {
        let squared_distance =
            (self.particles.position(i) - other.particles.position(j)).norm_squared();
        if squared_distance < props.smoothing_sq {
            let increment = kernels::density_increment(props, squared_distance);
            self.particles.add_density(i, increment);
            other.particles.add_density(j, increment);
        }
    }

    pub fn finalize_density(&mut self, props: &FluidProperties, i: usize) {
        let density = kernels::transformed_density(props, self.particles.density(i));
        self.particles.set_density(i, density);
    }

    /// Acceleration contribution of the unordered pair (i, j) inside this
    /// block. Densities must already be final.
    pub fn acceleration_pair(&mut self, props: &FluidProperties, i: usize, j: usize) {
        let squared_distance =
            (self.particles.position(i) - self.particles.position(j)).norm_squared();
        if squared_distance < props.smoothing_sq {
            let increment = kernels::acceleration_increment(
                props,
                self.particles.position(i),
                self.particles.position(j),
                self.particles.velocity(i),
                self.particles.velocity(j),
                self.particles.density(i),
                self.particles.density(j),
                squared_distance,
            );
            self.particles.add_acceleration(i, increment);
            self.particles.add_acceleration(j, -increment);
        }
    }

    pub fn acceleration_cross(
        &mut self,
        props: &FluidProperties,
        i: usize,
        other: &mut Block<S>,
        j: usize,
    ) {
        let squared_distance =
            (self.particles.position(i) - other.particles.position(j)).norm_squared();
        if squared_distance < props.smoothing_sq {
            let increment = kernels::acceleration_increment(
                props,
                self.particles.position(i),
                other.particles.position(j),
                self.particles.velocity(i),
                other.particles.velocity(j),
                self.particles.density(i),
                other.particles.density(j),
                squared_distance,
            );
            self.particles.add_acceleration(i, increment);
            other.particles.add_acceleration(j, -increment);
        }
    }

    /// Penalty forces against the owned domain faces, one axis at a time.
    /// The probe position is one explicit sub-step ahead of the particle.
    pub fn apply_boundary_penalty(
        &mut self,
        faces: &BTreeSet<Boundary>,
        constants: &SimulationConstants,
    ) {
        for i in 0..self.particles.len() {
            let position = self.particles.position(i);
            let hv = self.particles.hv(i);
            let velocity = self.particles.velocity(i);
            let mut acceleration = self.particles.acceleration(i);

            for axis in 0..3 {
                if faces.contains(&Boundary::low(axis)) {
                    let probe = position[axis] + hv[axis] * constants.time_step;
                    let depth = constants.particle_size - (probe - constants.domain_min[axis]);
                    if depth > MIN_COLLISION_DIFF {
                        acceleration[axis] +=
                            constants.collision_stiffness * depth - constants.damping * velocity[axis];
                    }
                } else if faces.contains(&Boundary::high(axis)) {
                    let probe = position[axis] + hv[axis] * constants.time_step;
                    let depth = constants.particle_size - (constants.domain_max[axis] - probe);
                    if depth > MIN_COLLISION_DIFF {
                        acceleration[axis] -=
                            constants.collision_stiffness * depth + constants.damping * velocity[axis];
                    }
                }
            }

            self.particles.set_acceleration(i, acceleration);
        }
    }

    /// Leapfrog step for every particle in the block.
    pub fn integrate(&mut self, constants: &SimulationConstants) {
        let dt = constants.time_step;
        let dt_sq = constants.squared_time_step();
        for i in 0..self.particles.len() {
            let acceleration = self.particles.acceleration(i);
            let mut position = self.particles.position(i);
            let mut hv = self.particles.hv(i);

            position += hv * dt + acceleration * dt_sq;
            let velocity = hv + acceleration * dt * 0.5;
            hv += acceleration * dt;

            self.particles.set_position(i, position);
            self.particles.set_velocity(i, velocity);
            self.particles.set_hv(i, hv);
        }
    }

    /// Hard mirror correction for particles that crossed an owned face during
    /// integration. Penalty forces prevent most crossings but not all.
    pub fn apply_boundary_reflection(
        &mut self,
        faces: &BTreeSet<Boundary>,
        constants: &SimulationConstants,
    ) {
        for i in 0..self.particles.len() {
            let mut position = self.particles.position(i);
            let mut velocity = self.particles.velocity(i);
            let mut hv = self.particles.hv(i);
            let mut reflected = false;

            for axis in 0..3 {
                if faces.contains(&Boundary::low(axis)) {
                    let distance = position[axis] - constants.domain_min[axis];
                    if distance < 0.0 {
                        position[axis] = constants.domain_min[axis] - distance;
                        velocity[axis] = -velocity[axis];
                        hv[axis] = -hv[axis];
                        reflected = true;
                    }
                } else if faces.contains(&Boundary::high(axis)) {
                    let distance = constants.domain_max[axis] - position[axis];
                    if distance < 0.0 {
                        position[axis] = constants.domain_max[axis] + distance;
                        velocity[axis] = -velocity[axis];
                        hv[axis] = -hv[axis];
                        reflected = true;
                    }
                }
            }

            if reflected {
                self.particles.set_position(i, position);
                self.particles.set_velocity(i, velocity);
                self.particles.set_hv(i, hv);
            }
        }
    }
}
