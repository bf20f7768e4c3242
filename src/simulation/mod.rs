pub mod block;
pub mod constants;
pub mod fluid_properties;
pub mod grid;
pub mod kernels;
pub mod simulation;
pub mod storage;

pub use block::{Block, Boundary};
pub use constants::SimulationConstants;
pub use fluid_properties::FluidProperties;
pub use grid::Grid;
pub use simulation::Simulation;
pub use storage::{AosStorage, Particle, ParticleStorage, SoaStorage};
