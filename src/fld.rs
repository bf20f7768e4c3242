//! Reader/writer for the binary particle file format: an 8-byte header
//! (f32 particles-per-meter, i32 particle count, little endian) followed by
//! nine f32 values per particle (position, half-step velocity, velocity).

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    error::SimError,
    floating_type_mod::FT,
    simulation::constants::{HEADER_SIZE, PARTICLE_COMPONENTS},
    simulation::storage::Particle,
    vec3,
};

use std::fs;
use std::io::{self, BufWriter, Cursor, Write};
use std::path::Path;

#[derive(Debug)]
pub struct FluidFile {
    pub particles_per_meter: FT,
    pub particles: Vec<Particle>,
}

/// Reads and validates a particle file. All validation happens here, before
/// the simulation loop ever starts.
pub fn read_fluid_file(path: &Path) -> Result<FluidFile, SimError> {
    let bytes = fs::read(path).map_err(|source| SimError::InputFile {
        path: path.display().to_string(),
        source,
    })?;
    parse_fluid_file(&bytes)
}

/// Parses the format from an in-memory byte buffer.
pub fn parse_fluid_file(bytes: &[u8]) -> Result<FluidFile, SimError> {
    if bytes.len() < HEADER_SIZE {
        return Err(SimError::MalformedHeader);
    }

    let mut cursor = Cursor::new(bytes);
    let particles_per_meter = cursor
        .read_f32::<LittleEndian>()
        .map_err(|_| SimError::MalformedHeader)? as FT;
    let header_count = cursor
        .read_i32::<LittleEndian>()
        .map_err(|_| SimError::MalformedHeader)?;

    if header_count <= 0 {
        return Err(SimError::InvalidParticleCount(header_count));
    }

    let body = &bytes[HEADER_SIZE..];
    let found = body.len() / (std::mem::size_of::<f32>() * PARTICLE_COMPONENTS);
    if found != header_count as usize {
        return Err(SimError::ParticleCountMismatch {
            header: header_count,
            found,
        });
    }

    let mut particles = Vec::with_capacity(found);
    for id in 0..found {
        let mut components = [0.0 as FT; PARTICLE_COMPONENTS];
        for component in &mut components {
            *component = cursor
                .read_f32::<LittleEndian>()
                .map_err(|_| SimError::MalformedHeader)? as FT;
        }
        particles.push(Particle {
            id,
            position: vec3(components[0], components[1], components[2]),
            hv: vec3(components[3], components[4], components[5]),
            velocity: vec3(components[6], components[7], components[8]),
        });
    }

    Ok(FluidFile {
        particles_per_meter,
        particles,
    })
}

/// Opens the output file for writing. Called before the simulation runs so an
/// unwritable path fails fast.
pub fn create_output_file(path: &Path) -> Result<fs::File, SimError> {
    fs::File::create(path).map_err(|source| SimError::OutputFile {
        path: path.display().to_string(),
        source,
    })
}

/// Serializes the final particle set, expected in ascending id order.
pub fn write_fluid_file(
    file: fs::File,
    path: &Path,
    particles_per_meter: FT,
    particles: &[Particle],
) -> Result<(), SimError> {
    let mut writer = BufWriter::new(file);
    write_particles(&mut writer, particles_per_meter, particles).map_err(|source| {
        SimError::OutputFile {
            path: path.display().to_string(),
            source,
        }
    })
}

fn write_particles(
    writer: &mut impl Write,
    particles_per_meter: FT,
    particles: &[Particle],
) -> io::Result<()> {
    writer.write_f32::<LittleEndian>(particles_per_meter as f32)?;
    writer.write_i32::<LittleEndian>(particles.len() as i32)?;
    for particle in particles {
        for vector in [particle.position, particle.hv, particle.velocity] {
            for axis in 0..3 {
                writer.write_f32::<LittleEndian>(vector[axis] as f32)?;
            }
        }
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bytes(header_count: i32, particle_count: usize) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.write_f32::<LittleEndian>(204.0).unwrap();
        bytes.write_i32::<LittleEndian>(header_count).unwrap();
        for id in 0..particle_count {
            for component in 0..PARTICLE_COMPONENTS {
                bytes
                    .write_f32::<LittleEndian>(id as f32 + component as f32 * 0.125)
                    .unwrap();
            }
        }
        bytes
    }

    #[test]
    fn parses_header_and_particles() {
        let file = parse_fluid_file(&sample_bytes(2, 2)).unwrap();

        assert_eq!(file.particles_per_meter, 204.0);
        assert_eq!(file.particles.len(), 2);
        assert_eq!(file.particles[0].id, 0);
        assert_eq!(file.particles[1].id, 1);
        assert_eq!(file.particles[1].position, vec3(1.0, 1.125, 1.25));
        assert_eq!(file.particles[1].hv, vec3(1.375, 1.5, 1.625));
        assert_eq!(file.particles[1].velocity, vec3(1.75, 1.875, 2.0));
    }

    #[test]
    fn header_count_must_match_body_length() {
        let error = parse_fluid_file(&sample_bytes(3, 2)).unwrap_err();
        match error {
            SimError::ParticleCountMismatch { header, found } => {
                assert_eq!(header, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn rejects_non_positive_particle_count() {
        let error = parse_fluid_file(&sample_bytes(0, 0)).unwrap_err();
        assert!(matches!(error, SimError::InvalidParticleCount(0)));

        let error = parse_fluid_file(&sample_bytes(-4, 0)).unwrap_err();
        assert!(matches!(error, SimError::InvalidParticleCount(-4)));
    }

    #[test]
    fn rejects_truncated_header() {
        let error = parse_fluid_file(&[0x00, 0x01, 0x02]).unwrap_err();
        assert!(matches!(error, SimError::MalformedHeader));
    }

    #[test]
    fn write_then_parse_round_trips() {
        let original = parse_fluid_file(&sample_bytes(3, 3)).unwrap();

        let mut buffer = Vec::new();
        write_particles(&mut buffer, original.particles_per_meter, &original.particles).unwrap();
        let reparsed = parse_fluid_file(&buffer).unwrap();

        assert_eq!(reparsed.particles_per_meter, original.particles_per_meter);
        assert_eq!(reparsed.particles, original.particles);
    }
}
