//! Crankshaft client-script patcher.
//!
//! The Steam client ships minified UI scripts and overwrites any modified
//! resources at startup, so this runs every time Crankshaft starts. The
//! pipeline restores a pristine copy if a previous patch is detected, backs
//! up the original, unminifies it with an external formatter, locates an
//! insertion point with line-oriented heuristics, writes the patched script
//! back, and finally reloads the running client over the CEF remote
//! debugging protocol.

pub mod cdp;
pub mod config;
pub mod patcher;
pub mod plugins;
pub mod unmin;

pub(crate) mod anchor;
pub(crate) mod cli;
pub(crate) mod inject;
pub(crate) mod pathutil;
