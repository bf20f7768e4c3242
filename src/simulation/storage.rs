use crate::{floating_type_mod::FT, V3};

/// Persistent particle state. Acceleration and density are per-step derived
/// quantities owned by the storage, not by the particle: rebinning a particle
/// must reset them, never carry them over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub id: usize,
    pub position: V3,
    pub hv: V3,
    pub velocity: V3,
}

/// Index-based access to per-particle state. The interaction engine is written
/// once against this trait; the two implementations below differ only in
/// memory layout.
pub trait ParticleStorage: Default + Send + Sync {
    fn len(&self) -> usize;

    /// Appends a particle with derived state reset: acceleration to the
    /// gravity vector, density to zero.
    fn push(&mut self, particle: Particle, gravity: V3);

    /// Copies out the persistent state (for rebinning and output).
    fn particle(&self, i: usize) -> Particle;

    fn id(&self, i: usize) -> usize;
    fn position(&self, i: usize) -> V3;
    fn hv(&self, i: usize) -> V3;
    fn velocity(&self, i: usize) -> V3;
    fn acceleration(&self, i: usize) -> V3;
    fn density(&self, i: usize) -> FT;

    fn set_position(&mut self, i: usize, value: V3);
    fn set_hv(&mut self, i: usize, value: V3);
    fn set_velocity(&mut self, i: usize, value: V3);
    fn set_acceleration(&mut self, i: usize, value: V3);
    fn set_density(&mut self, i: usize, value: FT);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn add_density(&mut self, i: usize, increment: FT) {
        let density = self.density(i) + increment;
        self.set_density(i, density);
    }

    fn add_acceleration(&mut self, i: usize, increment: V3) {
        let acceleration = self.acceleration(i) + increment;
        self.set_acceleration(i, acceleration);
    }
}

/// Array-of-structures backend: one colocated record per particle.
#[derive(Debug, Default, Clone)]
pub struct AosStorage {
    records: Vec<AosRecord>,
}

#[derive(Debug, Clone, Copy)]
struct AosRecord {
    particle: Particle,
    acceleration: V3,
    density: FT,
}

impl ParticleStorage for AosStorage {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn push(&mut self, particle: Particle, gravity: V3) {
        self.records.push(AosRecord {
            particle,
            acceleration: gravity,
            density: 0.0,
        });
    }

    fn particle(&self, i: usize) -> Particle {
        self.records[i].particle
    }

    fn id(&self, i: usize) -> usize {
        self.records[i].particle.id
    }

    fn position(&self, i: usize) -> V3 {
        self.records[i].particle.position
    }

    fn hv(&self, i: usize) -> V3 {
        self.records[i].particle.hv
    }

    fn velocity(&self, i: usize) -> V3 {
        self.records[i].particle.velocity
    }

    fn acceleration(&self, i: usize) -> V3 {
        self.records[i].acceleration
    }

    fn density(&self, i: usize) -> FT {
        self.records[i].density
    }

    fn set_position(&mut self, i: usize, value: V3) {
        self.records[i].particle.position = value;
    }

    fn set_hv(&mut self, i: usize, value: V3) {
        self.records[i].particle.hv = value;
    }

    fn set_velocity(&mut self, i: usize, value: V3) {
        self.records[i].particle.velocity = value;
    }

    fn set_acceleration(&mut self, i: usize, value: V3) {
        self.records[i].acceleration = value;
    }

    fn set_density(&mut self, i: usize, value: FT) {
        self.records[i].density = value;
    }
}

/// Structure-of-arrays backend: one parallel array per field. All arrays stay
/// the same length; `push` is the only growth path.
#[derive(Debug, Default, Clone)]
pub struct SoaStorage {
    id: Vec<usize>,
    position: Vec<V3>,
    hv: Vec<V3>,
    velocity: Vec<V3>,
    acceleration: Vec<V3>,
    density: Vec<FT>,
}

impl ParticleStorage for SoaStorage {
    fn len(&self) -> usize {
        self.id.len()
    }

    fn push(&mut self, particle: Particle, gravity: V3) {
        self.id.push(particle.id);
        self.position.push(particle.position);
        self.hv.push(particle.hv);
        self.velocity.push(particle.velocity);
        self.acceleration.push(gravity);
        self.density.push(0.0);
    }

    fn particle(&self, i: usize) -> Particle {
        Particle {
            id: self.id[i],
            position: self.position[i],
            hv: self.hv[i],
            velocity: self.velocity[i],
        }
    }

    fn id(&self, i: usize) -> usize {
        self.id[i]
    }

    fn position(&self, i: usize) -> V3 {
        self.position[i]
    }

    fn hv(&self, i: usize) -> V3 {
        self.hv[i]
    }

    fn velocity(&self, i: usize) -> V3 {
        self.velocity[i]
    }

    fn acceleration(&self, i: usize) -> V3 {
        self.acceleration[i]
    }

    fn density(&self, i: usize) -> FT {
        self.density[i]
    }

    fn set_position(&mut self, i: usize, value: V3) {
        self.position[i] = value;
    }

    fn set_hv(&mut self, i: usize, value: V3) {
        self.hv[i] = value;
    }

    fn set_velocity(&mut self, i: usize, value: V3) {
        self.velocity[i] = value;
    }

    fn set_acceleration(&mut self, i: usize, value: V3) {
        self.acceleration[i] = value;
    }

    fn set_density(&mut self, i: usize, value: FT) {
        self.density[i] = value;
    }
}

#[cfg(test)]
fn sample_particle() -> Particle {
    use crate::vec3;
    Particle {
        id: 7,
        position: vec3(0.01, -0.02, 0.03),
        hv: vec3(0.1, 0.2, 0.3),
        velocity: vec3(-0.1, 0.0, 0.1),
    }
}

#[test]
fn push_resets_derived_state() {
    use crate::vec3;

    fn check<S: ParticleStorage>() {
        let gravity = vec3(0.0, -9.8, 0.0);
        let mut storage = S::default();
        storage.push(sample_particle(), gravity);

        assert_eq!(storage.len(), 1);
        assert_eq!(storage.acceleration(0), gravity);
        assert_eq!(storage.density(0), 0.0);
        assert_eq!(storage.particle(0), sample_particle());
    }

    check::<AosStorage>();
    check::<SoaStorage>();
}

#[test]
fn backends_agree_on_accessors() {
    use crate::vec3;

    let gravity = vec3(0.0, -9.8, 0.0);
    let mut aos = AosStorage::default();
    let mut soa = SoaStorage::default();
    aos.push(sample_particle(), gravity);
    soa.push(sample_particle(), gravity);

    aos.add_density(0, 2.5);
    soa.add_density(0, 2.5);
    aos.add_acceleration(0, vec3(1.0, 2.0, 3.0));
    soa.add_acceleration(0, vec3(1.0, 2.0, 3.0));

    assert_eq!(aos.density(0), soa.density(0));
    assert_eq!(aos.acceleration(0), soa.acceleration(0));
    assert_eq!(aos.particle(0), soa.particle(0));
}
