use std::path::Path;
use std::time::Instant;

use clap::{App, Arg};

use grid_sph::{
    fld, AosStorage, Particle, ParticleStorage, SimError, Simulation, SimulationConstants,
    SoaStorage,
};

const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
const CARGO_PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

fn main() {
    let matches = App::new("grid-sph")
        .version(CARGO_PKG_VERSION)
        .about(CARGO_PKG_DESCRIPTION)
        .arg(
            Arg::with_name("STEPS")
                .help("Number of simulation time steps")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("INPUT")
                .help("Input particle file (.fld)")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::with_name("OUTPUT")
                .help("Output particle file (.fld)")
                .required(true)
                .index(3),
        )
        .arg(
            Arg::with_name("LAYOUT")
                .long("layout")
                .takes_value(true)
                .possible_values(&["aos", "soa"])
                .default_value("aos")
                .help("In-memory particle storage layout"),
        )
        .arg(
            Arg::with_name("CONSTANTS")
                .long("constants")
                .short("c")
                .takes_value(true)
                .help("YAML file overriding individual simulation constants"),
        )
        .get_matches();

    let steps = matches.value_of("STEPS").expect("missing step count");
    let input = matches.value_of("INPUT").expect("missing input path");
    let output = matches.value_of("OUTPUT").expect("missing output path");
    let layout = matches.value_of("LAYOUT").expect("layout has a default");
    let constants_path = matches.value_of("CONSTANTS");

    if let Err(error) = run(steps, input, output, layout, constants_path) {
        eprintln!("Error: {}", error);
        std::process::exit(error.exit_code());
    }
}

fn run(
    steps: &str,
    input: &str,
    output: &str,
    layout: &str,
    constants_path: Option<&str>,
) -> Result<(), SimError> {
    let steps = parse_steps(steps)?;
    let constants = match constants_path {
        Some(path) => load_constants(path)?,
        None => SimulationConstants::default(),
    };

    let fluid_file = fld::read_fluid_file(Path::new(input))?;
    // fail fast on an unwritable output before spending time simulating
    let output_file = fld::create_output_file(Path::new(output))?;

    println!("Number of particles: {}", fluid_file.particles.len());
    println!("Particles per meter: {}", fluid_file.particles_per_meter);

    let results = match layout {
        "soa" => simulate::<SoaStorage>(steps, &fluid_file, constants),
        _ => simulate::<AosStorage>(steps, &fluid_file, constants),
    };

    fld::write_fluid_file(
        output_file,
        Path::new(output),
        fluid_file.particles_per_meter,
        &results,
    )
}

fn parse_steps(raw: &str) -> Result<u32, SimError> {
    let steps: i64 = raw.parse().map_err(|_| SimError::NonNumericTimeSteps)?;
    if steps <= 0 || steps > u32::MAX as i64 {
        return Err(SimError::InvalidTimeSteps(steps));
    }
    Ok(steps as u32)
}

fn load_constants(path: &str) -> Result<SimulationConstants, SimError> {
    let yaml = std::fs::read_to_string(path).map_err(|source| SimError::InputFile {
        path: path.to_string(),
        source,
    })?;
    serde_yaml::from_str(&yaml).map_err(|error| SimError::ConstantsFile {
        path: path.to_string(),
        message: error.to_string(),
    })
}

fn simulate<S: ParticleStorage>(
    steps: u32,
    fluid_file: &fld::FluidFile,
    constants: SimulationConstants,
) -> Vec<Particle> {
    let mut simulation: Simulation<S> = Simulation::new(
        fluid_file.particles_per_meter,
        fluid_file.particles.clone(),
        constants,
    );

    let start = Instant::now();
    simulation.run(steps);
    println!("Execution time: {:?}", start.elapsed());

    simulation.results()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_steps_accepts_positive_counts() {
        assert_eq!(parse_steps("1").unwrap(), 1);
        assert_eq!(parse_steps("2000").unwrap(), 2000);
    }

    #[test]
    fn parse_steps_rejects_non_numeric_input() {
        assert!(matches!(
            parse_steps("ten").unwrap_err(),
            SimError::NonNumericTimeSteps
        ));
    }

    #[test]
    fn parse_steps_rejects_non_positive_counts() {
        assert!(matches!(
            parse_steps("0").unwrap_err(),
            SimError::InvalidTimeSteps(0)
        ));
        assert!(matches!(
            parse_steps("-5").unwrap_err(),
            SimError::InvalidTimeSteps(-5)
        ));
    }

    #[test]
    fn parse_steps_rejects_counts_above_u32_range() {
        // 2^32 must not wrap around to a zero-step run
        assert!(matches!(
            parse_steps("4294967296").unwrap_err(),
            SimError::InvalidTimeSteps(4294967296)
        ));
    }
}
