use std::fmt::{self, Display};

///
/// Chromosome class of a panel locus. Sex-linked loci are excluded from
/// fingerprint content because zygosity on X/Y cannot be compared across
/// sexes.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromosomeClass {
    Autosomal,
    SexLinked,
}

impl ChromosomeClass {
    ///
    /// Classify a chromosome token. Matches `X`/`Y` with or without a `chr`
    /// prefix, case-insensitively; everything else is autosomal.
    ///
    pub fn of(chrom: &str) -> Self {
        let token = match (chrom.get(..3), chrom.get(3..)) {
            (Some(prefix), Some(rest)) if prefix.eq_ignore_ascii_case("chr") => rest,
            _ => chrom,
        };
        if token.eq_ignore_ascii_case("x") || token.eq_ignore_ascii_case("y") {
            ChromosomeClass::SexLinked
        } else {
            ChromosomeClass::Autosomal
        }
    }
}

///
/// One SNP panel locus: a genomic interval carrying the reference SNP id and
/// the gene symbol it annotates.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct Locus {
    pub chrom: String,
    pub start: u32,
    pub end: u32,
    pub rs_id: String,
    pub gene: String,
}

impl Locus {
    ///
    /// 1-based variant position of this locus (BED start is 0-based).
    ///
    pub fn pos(&self) -> u32 {
        self.start + 1
    }

    pub fn class(&self) -> ChromosomeClass {
        ChromosomeClass::of(&self.chrom)
    }

    ///
    /// Get the BED line for this locus, name field as `rsId|gene`.
    ///
    pub fn as_bed_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}|{}",
            self.chrom, self.start, self.end, self.rs_id, self.gene
        )
    }
}

impl Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_bed_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("chr1", ChromosomeClass::Autosomal)]
    #[case("22", ChromosomeClass::Autosomal)]
    #[case("chrX", ChromosomeClass::SexLinked)]
    #[case("chrx", ChromosomeClass::SexLinked)]
    #[case("X", ChromosomeClass::SexLinked)]
    #[case("Y", ChromosomeClass::SexLinked)]
    #[case("chrY", ChromosomeClass::SexLinked)]
    #[case("CHRY", ChromosomeClass::SexLinked)]
    #[case("chrXY_random", ChromosomeClass::Autosomal)]
    #[case("chrM", ChromosomeClass::Autosomal)]
    fn test_chromosome_class(#[case] chrom: &str, #[case] expected: ChromosomeClass) {
        assert_eq!(ChromosomeClass::of(chrom), expected);
    }

    #[test]
    fn test_locus_position_is_one_based() {
        let locus = Locus {
            chrom: "chr1".to_string(),
            start: 99,
            end: 100,
            rs_id: "rs1".to_string(),
            gene: "GENEA".to_string(),
        };
        assert_eq!(locus.pos(), 100);
        assert_eq!(locus.as_bed_line(), "chr1\t99\t100\trs1|GENEA");
    }
}
