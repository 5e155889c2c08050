pub mod shepherd;

pub use shepherd::{Ports, Shepherd, Tuning};
