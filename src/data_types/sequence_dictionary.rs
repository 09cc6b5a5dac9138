
use anyhow::{Context, anyhow};
use indexmap::IndexMap;
use rust_lib_reference_genome::reference_genome::ReferenceGenome;

use crate::data_types::variants::GenomicVariant;

/// Ordered lookup of the sequences both call sets are sorted by.
/// Sequence order comes from the reference genome, and every coordinate
/// comparison in the merge-join funnels through `compare_regions`.
#[derive(Clone, Debug, Default)]
pub struct SequenceDictionary {
    /// Map from sequence name to its length, preserving reference order
    sequence_lengths: IndexMap<String, u64>
}

impl SequenceDictionary {
    /// Builds the dictionary from a pre-loaded reference genome
    pub fn from_reference_genome(reference_genome: &ReferenceGenome) -> Self {
        let sequence_lengths = reference_genome.contig_keys().iter()
            .map(|k| (k.clone(), reference_genome.get_full_chromosome(k).len() as u64))
            .collect();
        Self {
            sequence_lengths
        }
    }

    /// Direct constructor, mostly for tests
    pub fn new(sequence_lengths: IndexMap<String, u64>) -> Self {
        Self {
            sequence_lengths
        }
    }

    /// Position of a sequence in the fixed ordering
    pub fn sequence_index(&self, sequence_name: &str) -> Option<usize> {
        self.sequence_lengths.get_index_of(sequence_name)
    }

    /// Length of a sequence, in bases
    pub fn sequence_length(&self, sequence_name: &str) -> anyhow::Result<u64> {
        self.sequence_lengths.get(sequence_name).copied()
            .ok_or(anyhow!("Sequence {sequence_name:?} is not in the reference genome"))
    }

    /// Signed ordering/overlap code between two sites:
    /// * +/-3 - different sequences, sign follows the sequence ordering
    /// * +/-2 - same sequence, disjoint spans; -2 means `a` ends before `b` starts
    /// * -1/0/+1 - overlapping spans, ordered by (first, last)
    ///
    /// The merge-join relies on |code| > 1 meaning "no overlap".
    /// # Errors
    /// * if either sequence name is unknown to the dictionary
    pub fn compare_regions(&self, a: &GenomicVariant, b: &GenomicVariant) -> anyhow::Result<i32> {
        let index_a = self.sequence_index(a.sequence_name())
            .with_context(|| format!("Sequence {:?} is not in the reference genome", a.sequence_name()))?;
        let index_b = self.sequence_index(b.sequence_name())
            .with_context(|| format!("Sequence {:?} is not in the reference genome", b.sequence_name()))?;

        if index_a != index_b {
            return Ok(if index_a < index_b { -3 } else { 3 });
        }
        if a.last() < b.first() {
            return Ok(-2);
        }
        if b.last() < a.first() {
            return Ok(2);
        }

        // overlapping; order by start, then end
        let code = match a.first().cmp(&b.first()) {
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Greater => 1,
            std::cmp::Ordering::Equal => {
                match a.last().cmp(&b.last()) {
                    std::cmp::Ordering::Less => -1,
                    std::cmp::Ordering::Greater => 1,
                    std::cmp::Ordering::Equal => 0
                }
            }
        };
        Ok(code)
    }
}
