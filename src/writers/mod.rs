/*!
# Writers module
Contains the logic for writing the output files for the bench command.
*/
/// Generates the per-type counts and statistics report
pub mod counts_report;
/// Receives call records routed out of the comparison pass
pub mod vcf_sink;
