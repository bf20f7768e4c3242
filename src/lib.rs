pub mod error;
pub mod fld;
pub mod simulation;

pub use error::SimError;
pub use simulation::*;

#[cfg(feature = "single-precision")]
pub mod floating_type_mod {
    pub type FT = f32;
    pub use std::f32::consts::PI;
}

#[cfg(not(feature = "single-precision"))]
pub mod floating_type_mod {
    pub type FT = f64;
    pub use std::f64::consts::PI;
}

use floating_type_mod::FT;

use nalgebra::SVector;

pub type V<T, const D: usize> = SVector<T, D>;

pub type V3 = V<FT, 3>;
pub type V3I = V<i32, 3>;

pub fn vec3(x: FT, y: FT, z: FT) -> V3 {
    [x, y, z].into()
}
