//! Launch pipelines - launch preparation

mod prepare;

pub use prepare::prepare;
