//! wgpu render backend for the glow grid.
//!
//! Draws the instanced sphere grid lit by two rectangular area lights into
//! a multisampled HDR target, then runs the bloom chain and composites the
//! result onto the output surface.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - All per-frame state comes from the scene handed to `render`.

mod bloom;
mod gpu;
mod scene_pass;
mod shaders;
mod targets;

pub use bloom::{
    BLOOM_MIPS, composite_weights, gaussian_coefficients, gaussian_pdf, lerp_bloom_factor,
    mip_sizes,
};
pub use gpu::WgpuRenderer;
pub use targets::{DEPTH_FORMAT, HDR_FORMAT};
