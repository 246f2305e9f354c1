//! Qualifier systems built on the quala engine.

pub mod nullness;
pub mod taint;
