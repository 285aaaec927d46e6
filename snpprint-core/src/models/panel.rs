use std::collections::HashSet;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::errors::PanelError;
use crate::models::locus::{ChromosomeClass, Locus};
use crate::utils::get_dynamic_reader;

///
/// Panel struct, the in-memory representation of the curated SNP panel BED
/// file. Locus order follows the file; positions are unique within the panel.
///
#[derive(Clone, Debug)]
pub struct Panel {
    pub loci: Vec<Locus>,
    pub path: Option<PathBuf>,
}

impl Panel {
    ///
    /// Create a new [Panel] from a BED file (plain or gzipped) whose name
    /// field is `rsId|gene`.
    ///
    /// The panel contract is the first four BED columns; any trailing columns
    /// are accepted on input but are not carried through, so files derived
    /// from a panel (the autosomal/sex splits) are always 4-column BED.
    ///
    /// Any malformed record is a fatal error: a silently dropped locus would
    /// break the fixed fingerprint length downstream.
    ///
    /// # Arguments:
    /// - path: path to the panel BED file on disk.
    pub fn from_bed(path: &Path) -> Result<Self, PanelError> {
        let display = path.display().to_string();
        let reader = get_dynamic_reader(path)
            .map_err(|e| PanelError::Io(std::io::Error::other(e)))?;

        let mut loci: Vec<Locus> = Vec::new();
        let mut seen: HashSet<(String, u32)> = HashSet::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;

            if line.starts_with('#') || line.starts_with("track") || line.starts_with("browser") {
                continue;
            }

            let mut fields = line.split('\t');
            let chrom = match fields.next() {
                Some(c) if !c.is_empty() => c.to_string(),
                _ => {
                    return Err(PanelError::MissingChromosome {
                        path: display,
                        line: line_no,
                    })
                }
            };

            let start = parse_coord(fields.next(), "start", &display, line_no)?;
            let end = parse_coord(fields.next(), "end", &display, line_no)?;

            let name = fields.next().ok_or_else(|| PanelError::MissingName {
                path: display.clone(),
                line: line_no,
            })?;
            let (rs_id, gene) = name.split_once('|').ok_or_else(|| PanelError::MalformedName {
                path: display.clone(),
                line: line_no,
                name: name.to_string(),
            })?;

            let locus = Locus {
                chrom,
                start,
                end,
                rs_id: rs_id.to_string(),
                gene: gene.to_string(),
            };

            if !seen.insert((locus.chrom.clone(), locus.pos())) {
                return Err(PanelError::DuplicatePosition {
                    chrom: locus.chrom,
                    pos: locus.start + 1,
                });
            }
            loci.push(locus);
        }

        if loci.is_empty() {
            return Err(PanelError::EmptyPanel(display));
        }

        Ok(Panel {
            loci,
            path: Some(path.to_owned()),
        })
    }

    pub fn len(&self) -> usize {
        self.loci.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loci.is_empty()
    }

    ///
    /// Loci on autosomal chromosomes, in panel order.
    ///
    pub fn autosomal(&self) -> impl Iterator<Item = &Locus> {
        self.loci
            .iter()
            .filter(|l| l.class() == ChromosomeClass::Autosomal)
    }

    ///
    /// Loci on sex chromosomes, in panel order.
    ///
    pub fn sex_linked(&self) -> impl Iterator<Item = &Locus> {
        self.loci
            .iter()
            .filter(|l| l.class() == ChromosomeClass::SexLinked)
    }
}

impl TryFrom<&Path> for Panel {
    type Error = PanelError;

    fn try_from(value: &Path) -> Result<Self, Self::Error> {
        Panel::from_bed(value)
    }
}

fn parse_coord(
    field: Option<&str>,
    name: &'static str,
    path: &str,
    line_no: usize,
) -> Result<u32, PanelError> {
    let raw = field.unwrap_or("");
    raw.parse().map_err(|_| PanelError::InvalidCoordinate {
        path: path.to_string(),
        line: line_no,
        field: name,
        value: raw.to_string(),
    })
}
