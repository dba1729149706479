pub mod dataset;
pub mod person;

pub use dataset::*;
pub use person::*;
