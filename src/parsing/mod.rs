/*!
# Parsing module
Contains the logic for parsing input files into meaningful structs / data.
*/
/// Handles conversion of VCF records into called variants, streaming or pre-loaded
pub mod call_stream;
/// Helper functions for noodles
pub mod noodles_helper;
