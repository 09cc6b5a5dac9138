
use crate::data_types::call_report::VariantCallReport;

/// The variant types we stratify counts by
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, strum_macros::AsRefStr)]
pub enum VariantType {
    /// Exactly two alleles, both length = 1
    #[strum(serialize = "SNV")]
    Snv=0,
    /// Exactly two alleles with different lengths
    #[strum(serialize = "INDEL")]
    Indel,
    /// Everything else: multi-allelic sites, MNVs, short tandem repeats
    #[strum(serialize = "STR")]
    Str // make sure Str is always the last one in the list
}

/// Genotype classifications, these double as column offsets in the count matrices
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum GenotypeClass {
    HomozygousReference=0,
    Heterozygous,
    HomozygousAlternate
}

impl GenotypeClass {
    /// The column offset this class contributes to a count matrix
    pub fn offset(self) -> usize {
        self as usize
    }
}

#[derive(thiserror::Error, Debug)]
pub enum VariantError {
    #[error("allele{index} is empty (length = 0)")]
    EmptyAllele{ index: usize },
    #[error("at least one allele (the reference) is required")]
    NoAlleles,
    #[error("first position must be >= 1")]
    FirstPosition,
    #[error("at most two allele indices can be called")]
    TooManyCalledAlleles,
    #[error("called allele index {index} is out of range for {num_alleles} alleles")]
    CalledAlleleRange{ index: u8, num_alleles: usize }
}

/// A single variant (or reference-confirming) site from one call set.
/// Coordinates are 1-based and inclusive on both ends.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GenomicVariant {
    /// Name of the containing sequence (chromosome)
    sequence_name: String,
    /// First reference position covered by the site, 1-based inclusive
    first: u64,
    /// Last reference position covered by the site, 1-based inclusive
    last: u64,
    /// All allele strings; index 0 is always the reference allele
    alleles: Vec<String>,
    /// Type tag if the input declared one; inferred from the alleles otherwise
    variant_type: Option<VariantType>
}

impl GenomicVariant {
    /// Creates a new variant site, deriving `last` from the reference allele span.
    /// # Arguments
    /// * `sequence_name` - the containing sequence
    /// * `first` - 1-based first position
    /// * `alleles` - all allele strings, reference first
    /// * `variant_type` - optional declared type tag
    /// # Errors
    /// * if no alleles are provided, or any allele is empty
    /// * if `first` is 0 (coordinates are 1-based)
    pub fn new(sequence_name: String, first: u64, alleles: Vec<String>, variant_type: Option<VariantType>) -> Result<GenomicVariant, VariantError> {
        if first == 0 {
            return Err(VariantError::FirstPosition);
        }
        if alleles.is_empty() {
            return Err(VariantError::NoAlleles);
        }
        for (index, allele) in alleles.iter().enumerate() {
            if allele.is_empty() {
                return Err(VariantError::EmptyAllele { index });
            }
        }

        // the reference allele defines the covered span
        let last = first + alleles[0].len() as u64 - 1;
        Ok(GenomicVariant {
            sequence_name,
            first,
            last,
            alleles,
            variant_type
        })
    }

    // getters
    pub fn sequence_name(&self) -> &str {
        &self.sequence_name
    }

    pub fn first(&self) -> u64 {
        self.first
    }

    pub fn last(&self) -> u64 {
        self.last
    }

    pub fn alleles(&self) -> &[String] {
        &self.alleles
    }

    pub fn reference_allele(&self) -> &str {
        &self.alleles[0]
    }

    pub fn variant_type(&self) -> Option<VariantType> {
        self.variant_type
    }
}

/// A variant site plus the genotype called for the single sample under comparison.
/// Created once per input record; treated as immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct CalledGenomicVariant {
    /// The underlying site definition
    variant: GenomicVariant,
    /// Indices into `variant.alleles()` of the called alleles, sorted and unique;
    /// one entry = homozygous, two = heterozygous, empty = undecided (no-call)
    called_indices: Vec<u8>,
    /// Genotype quality from the input; 0 means unknown
    genotype_quality: u16,
    /// Per-genotype log-likelihoods when the input provided them
    call_report: Option<VariantCallReport>
}

impl CalledGenomicVariant {
    /// Attaches a genotype call to a variant site.
    /// Called indices are sorted and deduplicated, so `1/0` and `0/1` are the same call.
    /// # Arguments
    /// * `variant` - the site definition
    /// * `called_indices` - allele indices of the called genotype; empty for a no-call
    /// * `genotype_quality` - input genotype quality, 0 if unknown
    /// * `call_report` - optional per-genotype likelihood report
    /// # Errors
    /// * if more than two distinct alleles are called
    /// * if any called index does not correspond to an allele
    pub fn new(variant: GenomicVariant, mut called_indices: Vec<u8>, genotype_quality: u16, call_report: Option<VariantCallReport>) -> Result<CalledGenomicVariant, VariantError> {
        called_indices.sort_unstable();
        called_indices.dedup();
        if called_indices.len() > 2 {
            return Err(VariantError::TooManyCalledAlleles);
        }
        let num_alleles = variant.alleles().len();
        for &index in called_indices.iter() {
            if index as usize >= num_alleles {
                return Err(VariantError::CalledAlleleRange { index, num_alleles });
            }
        }

        Ok(CalledGenomicVariant {
            variant,
            called_indices,
            genotype_quality,
            call_report
        })
    }

    /// True if no genotype was called for the sample
    pub fn is_undecided(&self) -> bool {
        self.called_indices.is_empty()
    }

    /// True if two distinct alleles were called
    pub fn is_heterozygous(&self) -> bool {
        self.called_indices.len() == 2
    }

    /// True if the only called allele is the reference allele
    pub fn is_homozygous_reference(&self) -> bool {
        self.called_indices == [0]
    }

    /// Maps the call onto the three-way genotype classification.
    /// Total function: anything that is neither heterozygous nor purely reference
    /// lands on the alternate-homozygous class; undecided calls are filtered out
    /// before classification matters.
    pub fn genotype_class(&self) -> GenotypeClass {
        if self.is_heterozygous() {
            GenotypeClass::Heterozygous
        } else if !self.is_homozygous_reference() {
            GenotypeClass::HomozygousAlternate
        } else {
            GenotypeClass::HomozygousReference
        }
    }

    /// Returns the declared type tag if present, otherwise infers one from the allele set.
    /// Two alleles with different lengths are an indel; two alleles of length 1 are an SNV;
    /// everything else (multi-allelic sites, MNVs) falls into the STR/other bucket.
    pub fn classify_variant_type(&self) -> VariantType {
        if let Some(vt) = self.variant.variant_type() {
            return vt;
        }
        let alleles = self.variant.alleles();
        if alleles.len() == 2 && alleles[0].len() != alleles[1].len() {
            VariantType::Indel
        } else if alleles.len() == 2 && alleles[0].len() == 1 {
            VariantType::Snv
        } else {
            VariantType::Str
        }
    }

    // getters, mostly pass-through to the site definition
    pub fn variant(&self) -> &GenomicVariant {
        &self.variant
    }

    pub fn sequence_name(&self) -> &str {
        self.variant.sequence_name()
    }

    pub fn first(&self) -> u64 {
        self.variant.first()
    }

    pub fn last(&self) -> u64 {
        self.variant.last()
    }

    pub fn alleles(&self) -> &[String] {
        self.variant.alleles()
    }

    pub fn reference_allele(&self) -> &str {
        self.variant.reference_allele()
    }

    pub fn called_indices(&self) -> &[u8] {
        &self.called_indices
    }

    pub fn genotype_quality(&self) -> u16 {
        self.genotype_quality
    }

    pub fn call_report(&self) -> Option<&VariantCallReport> {
        self.call_report.as_ref()
    }
}
