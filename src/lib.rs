//! borgrun: one-shot borg backups with pruning, compaction and rclone sync.
//!
//! This crate provides the retention timeframe parser, the staged backup
//! pipeline and the command-line definitions for the `borgrun` binary.

pub mod archive;
pub mod cli;
pub mod constants;
pub mod error;
pub mod job;
pub mod logging;
pub mod path_util;
pub mod pipeline;
pub mod settings;
pub mod timeframe;
pub mod tool;
