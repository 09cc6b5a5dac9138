
/// Flank expansion logic that reconciles differently anchored representations
pub mod allele_normalizer;
/// Command line interface functionality
pub mod cli;
/// Core logic for the merge-join between the gold standard and test call sets
pub mod comparator;
/// Decides whether two overlapping calls describe the same event
pub mod consistency;
/// Contains various shared data types
pub mod data_types;
/// Resolves genotype qualities from stored values or likelihood reports
pub mod genotype_quality;
/// Tooling for parsing input files into meaningful structs / data
pub mod parsing;
/// Various utility functions that tend to be very generic
pub mod util;
/// All output writers
pub mod writers;
