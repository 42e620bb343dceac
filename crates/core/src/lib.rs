//! Core library for loading ComfyUI workflows.
//!
//! Converts editor ("UI") workflow exports into the API graph accepted by
//! a ComfyUI server, classifies prompt, image and output nodes for the
//! pickers, extracts workflows embedded in PNG metadata, and prepares
//! graphs for submission.

pub mod error;
pub mod png_metadata;
pub mod workflow;
pub mod workflow_loader;
pub mod workflow_params;
