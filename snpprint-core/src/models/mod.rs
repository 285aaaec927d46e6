pub mod locus;
pub mod panel;
pub mod sample;

pub use locus::{ChromosomeClass, Locus};
pub use panel::Panel;
pub use sample::{SampleRef, SexCall};
