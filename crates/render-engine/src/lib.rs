//! scenerun Render Engine
//!
//! Runs the Manim renderer on a script and reports what happened as a
//! single result record.
//!
//! # Pipeline
//!
//! ```text
//! script text ──► scenerun-XXXX.py ──┐
//!                                    ├── python -m manim <script> <scene> ...
//! scene, output, quality ────────────┘         │
//!                                              ├── exit status + output file
//!                                              ▼
//!                                        RenderOutcome (JSON)
//! ```
//!
//! The scratch script is removed once the renderer finishes, times out or
//! fails to start.

pub mod client;
pub mod outcome;
pub mod probe;
pub mod runner;

pub use client::{parse_runner_output, RunnerClient};
pub use outcome::{Quality, RenderOutcome, RenderRequest};
pub use probe::{probe_renderer, SetupReport};
pub use runner::ManimRunner;
