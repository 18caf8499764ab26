//! Genome assembly used by the `locus` data type
//!
//! Chromosomes are laid end to end on a single linear axis. Locus scales
//! operate on the linear coordinate; [`Genome::to_chromosomal`] maps back for
//! presentation and bookmarking.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

/// One chromosome of an assembly
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Chromosome {
    pub name: String,
    pub size: u64,
}

/// A position on a named chromosome
#[derive(Debug, Clone, PartialEq)]
pub struct ChromosomalLocus {
    pub chrom: String,
    pub pos: f64,
}

impl fmt::Display for ChromosomalLocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chrom, self.pos)
    }
}

/// A named chromosome assembly with cumulative offsets
#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    pub name: String,
    chromosomes: Vec<Chromosome>,
    /// Linear start of each chromosome, parallel to `chromosomes`
    offsets: Vec<u64>,
    by_name: HashMap<String, usize>,
}

impl Genome {
    pub fn new(name: impl Into<String>, chromosomes: Vec<Chromosome>) -> Self {
        let mut offsets = Vec::with_capacity(chromosomes.len());
        let mut by_name = HashMap::new();
        let mut total = 0;
        for (i, chrom) in chromosomes.iter().enumerate() {
            offsets.push(total);
            by_name.insert(chrom.name.clone(), i);
            total += chrom.size;
        }
        Self {
            name: name.into(),
            chromosomes,
            offsets,
            by_name,
        }
    }

    pub fn chromosomes(&self) -> &[Chromosome] {
        &self.chromosomes
    }

    pub fn total_size(&self) -> u64 {
        self.chromosomes.iter().map(|c| c.size).sum()
    }

    /// Linear coordinate of `pos` on `chrom`, if the chromosome exists
    pub fn to_linear(&self, chrom: &str, pos: f64) -> Option<f64> {
        self.by_name
            .get(chrom)
            .map(|&i| self.offsets[i] as f64 + pos)
    }

    /// Chromosome and in-chromosome position of a linear coordinate
    ///
    /// Coordinates past the end clamp to the last chromosome.
    pub fn to_chromosomal(&self, linear: f64) -> Option<ChromosomalLocus> {
        if self.chromosomes.is_empty() {
            return None;
        }
        let index = self
            .offsets
            .iter()
            .rposition(|&offset| offset as f64 <= linear)
            .unwrap_or(0);
        Some(ChromosomalLocus {
            chrom: self.chromosomes[index].name.clone(),
            pos: linear - self.offsets[index] as f64,
        })
    }
}
