/// Contains the per-genotype likelihood report attached to calls
pub mod call_report;
/// Contains the quality-stratified confusion matrices and derived statistics
pub mod comparison_counts;
/// Wrapper for the fixed sequence ordering with region comparison logic
pub mod sequence_dictionary;
/// Contains variant definition functionality and genotype classification
pub mod variants;
