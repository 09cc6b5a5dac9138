/*!
# CLI module
Contains all the command line interfaces as well as the checks on those values.
*/
/// Contains the bench subcommand settings
pub mod bench;
/// Core CLI that routes to the subcommands
pub mod core;
