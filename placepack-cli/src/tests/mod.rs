//! Unit and command-level tests for the placepack CLI.

mod commands;
