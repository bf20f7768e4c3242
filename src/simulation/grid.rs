use rayon::prelude::*;

use crate::{
    floating_type_mod::FT,
    simulation::{
        block::{Block, Boundary},
        constants::SimulationConstants,
        fluid_properties::FluidProperties,
        storage::{Particle, ParticleStorage},
    },
    V3, V3I,
};

use std::collections::{BTreeMap, BTreeSet};

/// Regular lattice of blocks covering the simulation domain, sized to the
/// smoothing radius so all interaction partners of a particle live in its own
/// or a directly adjacent block.
///
/// Adjacency holds only strictly-higher flat indices, so every unordered
/// block pair is traversed exactly once per step. Neighbors are kept as
/// indices and resolved against the block array at traversal time; the array
/// is swapped wholesale on repositioning.
pub struct Grid<S: ParticleStorage> {
    grid_size: [usize; 3],
    block_size: V3,
    num_blocks: usize,
    blocks: Vec<Block<S>>,
    adjacent_blocks: Vec<Vec<usize>>,
    boundary_faces: BTreeMap<usize, BTreeSet<Boundary>>,
    constants: SimulationConstants,
}

impl<S: ParticleStorage> Grid<S> {
    pub fn new(particles: Vec<Particle>, smoothing: FT, constants: SimulationConstants) -> Grid<S> {
        let extent = constants.domain_extent();
        let mut grid_size = [0usize; 3];
        let mut block_size = V3::zeros();
        for axis in 0..3 {
            grid_size[axis] = ((extent[axis] / smoothing).floor() as usize).max(1);
            block_size[axis] = extent[axis] / grid_size[axis] as FT;
        }
        let num_blocks = grid_size[0] * grid_size[1] * grid_size[2];

        let mut grid = Grid {
            grid_size,
            block_size,
            num_blocks,
            blocks: (0..num_blocks).map(|_| Block::default()).collect(),
            adjacent_blocks: vec![Vec::new(); num_blocks],
            boundary_faces: BTreeMap::new(),
            constants,
        };

        for particle in particles {
            let index = grid.block_index(particle.position);
            grid.blocks[index].push(particle, constants.gravity);
        }

        for index in 0..num_blocks {
            grid.link_neighbors(index);
        }

        println!(
            "Grid size: {} x {} x {}",
            grid_size[0], grid_size[1], grid_size[2]
        );
        println!("Number of blocks: {}", num_blocks);
        println!(
            "Block size: {} x {} x {}",
            block_size.x, block_size.y, block_size.z
        );

        grid
    }

    /// Flat index of the block containing `position`. Positions slightly
    /// outside the domain box still map to the nearest edge block.
    pub fn block_index(&self, position: V3) -> usize {
        let mut cell = [0usize; 3];
        for axis in 0..3 {
            let raw = ((position[axis] - self.constants.domain_min[axis]) / self.block_size[axis])
                .floor()
                .max(0.0)
                .min((self.grid_size[axis] - 1) as FT);
            cell[axis] = raw as usize;
        }
        self.flatten(cell[0], cell[1], cell[2])
    }

    pub fn block_coordinates(&self, index: usize) -> (usize, usize, usize) {
        let [nx, ny, _] = self.grid_size;
        (index % nx, index / nx % ny, index / (nx * ny))
    }

    fn flatten(&self, x: usize, y: usize, z: usize) -> usize {
        let [nx, ny, _] = self.grid_size;
        x + y * nx + z * nx * ny
    }

    fn in_bounds(&self, block_pos: V3I) -> bool {
        (0..3).all(|axis| block_pos[axis] >= 0 && (block_pos[axis] as usize) < self.grid_size[axis])
    }

    /// One-time pass over the 3x3x3 neighborhood of a block: in-bounds
    /// neighbors with a higher flat index go to the adjacency list, missing
    /// geometric neighbors mark the corresponding domain face as owned.
    fn link_neighbors(&mut self, index: usize) {
        let (x, y, z) = self.block_coordinates(index);
        let block_pos = V3I::new(x as i32, y as i32, z as i32);

        for dx in -1..=1i32 {
            for dy in -1..=1i32 {
                for dz in -1..=1i32 {
                    if dx == 0 && dy == 0 && dz == 0 {
                        continue;
                    }
                    let neighbor_pos = block_pos + V3I::new(dx, dy, dz);
                    if self.in_bounds(neighbor_pos) {
                        let neighbor_index = self.flatten(
                            neighbor_pos.x as usize,
                            neighbor_pos.y as usize,
                            neighbor_pos.z as usize,
                        );
                        if neighbor_index > index {
                            self.adjacent_blocks[index].push(neighbor_index);
                        }
                    } else {
                        self.record_boundary_faces(index, neighbor_pos);
                    }
                }
            }
        }
    }

    fn record_boundary_faces(&mut self, index: usize, neighbor_pos: V3I) {
        let faces = self.boundary_faces.entry(index).or_default();
        for axis in 0..3 {
            if neighbor_pos[axis] < 0 {
                faces.insert(Boundary::low(axis));
            } else if neighbor_pos[axis] as usize >= self.grid_size[axis] {
                faces.insert(Boundary::high(axis));
            }
        }
    }

    /// Rebuild-and-swap: every particle is re-binned from its current
    /// position into a fresh block array. Derived state is reset by `push`;
    /// ids carry through verbatim.
    pub fn reposition(&mut self) {
        let gravity = self.constants.gravity;
        let mut rebinned: Vec<Block<S>> = (0..self.num_blocks).map(|_| Block::default()).collect();
        for block in &self.blocks {
            for i in 0..block.len() {
                let particle = block.particles.particle(i);
                let index = self.block_index(particle.position);
                rebinned[index].push(particle, gravity);
            }
        }
        self.blocks = rebinned;
    }

    /// Accumulates pair density contributions block by block in ascending
    /// index order, then finalizes each particle. Runs sequentially: the pair
    /// summation order determines the output bits.
    pub fn accumulate_densities(&mut self, props: &FluidProperties) {
        for index in 0..self.num_blocks {
            let count = self.blocks[index].len();
            for i in 0..count {
                for j in (i + 1)..count {
                    self.blocks[index].density_pair(props, i, j);
                }
                for a in 0..self.adjacent_blocks[index].len() {
                    let adjacent = self.adjacent_blocks[index][a];
                    let (head, tail) = self.blocks.split_at_mut(adjacent);
                    let current = &mut head[index];
                    let neighbor = &mut tail[0];
                    for j in 0..neighbor.len() {
                        current.density_cross(props, i, neighbor, j);
                    }
                }
                // all contributions to particle i are in by now: pairs with
                // lower indices and lower blocks were handled in earlier
                // iterations, the rest just above
                self.blocks[index].finalize_density(props, i);
            }
        }
    }

    /// Same traversal as the density pass. Requires all densities final.
    pub fn accumulate_accelerations(&mut self, props: &FluidProperties) {
        for index in 0..self.num_blocks {
            let count = self.blocks[index].len();
            for i in 0..count {
                for j in (i + 1)..count {
                    self.blocks[index].acceleration_pair(props, i, j);
                }
                for a in 0..self.adjacent_blocks[index].len() {
                    let adjacent = self.adjacent_blocks[index][a];
                    let (head, tail) = self.blocks.split_at_mut(adjacent);
                    let current = &mut head[index];
                    let neighbor = &mut tail[0];
                    for j in 0..neighbor.len() {
                        current.acceleration_cross(props, i, neighbor, j);
                    }
                }
            }
        }
    }

    /// Penalty forces for every block owning at least one domain face.
    /// Interior blocks never run the check.
    pub fn apply_boundary_penalty(&mut self) {
        for (&index, faces) in &self.boundary_faces {
            self.blocks[index].apply_boundary_penalty(faces, &self.constants);
        }
    }

    /// Leapfrog step over all blocks. Blocks own disjoint particles and the
    /// per-particle arithmetic is order-independent, so this runs in parallel
    /// without affecting reproducibility.
    pub fn integrate(&mut self) {
        let constants = self.constants;
        self.blocks
            .par_iter_mut()
            .for_each(|block| block.integrate(&constants));
    }

    pub fn apply_boundary_reflection(&mut self) {
        for (&index, faces) in &self.boundary_faces {
            self.blocks[index].apply_boundary_reflection(faces, &self.constants);
        }
    }

    pub fn num_particles(&self) -> usize {
        self.blocks.iter().map(|block| block.len()).sum()
    }

    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    pub fn grid_size(&self) -> [usize; 3] {
        self.grid_size
    }

    pub fn blocks(&self) -> &[Block<S>] {
        &self.blocks
    }

    pub fn adjacent_blocks(&self, index: usize) -> &[usize] {
        &self.adjacent_blocks[index]
    }

    pub fn boundary_faces(&self) -> &BTreeMap<usize, BTreeSet<Boundary>> {
        &self.boundary_faces
    }

    /// All particles in ascending id order, regardless of which block they
    /// ended up in.
    pub fn particles_sorted_by_id(&self) -> Vec<Particle> {
        let mut particles = Vec::with_capacity(self.num_particles());
        for block in &self.blocks {
            for i in 0..block.len() {
                particles.push(block.particles.particle(i));
            }
        }
        particles.sort_unstable_by_key(|particle| particle.id);
        particles
    }
}
