//! Tile mosaic renderer commands, shared by the binary and its tests.

pub mod commands;
