use thiserror::Error;

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("Panel record at {path}:{line} is missing a chromosome token")]
    MissingChromosome { path: String, line: usize },

    #[error("Panel record at {path}:{line} has an invalid {field} coordinate: {value}")]
    InvalidCoordinate {
        path: String,
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("Panel record at {path}:{line} is missing a name field")]
    MissingName { path: String, line: usize },

    #[error("Panel record at {path}:{line} has a name field without an `rsId|gene` separator: {name}")]
    MalformedName {
        path: String,
        line: usize,
        name: String,
    },

    #[error("Duplicate panel position {chrom}:{pos}")]
    DuplicatePosition { chrom: String, pos: u32 },

    #[error("Corrupted file. 0 loci found in the panel file: {0}")]
    EmptyPanel(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
