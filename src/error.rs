//! Error types for the host side of the renderer.
//!
//! The per pixel pipeline itself never fails; these cover setup, frame
//! sequencing and file I/O.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Width or height of zero
    #[error("Invalid resolution {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    /// Tile width of zero
    #[error("Tile width must be at least one pixel")]
    InvalidTileWidth,

    /// Frame committed out of order
    #[error("Frame {got} committed out of sequence (expected 0 or {expected})")]
    FrameOutOfSequence { expected: u32, got: u32 },

    /// Frame sample count differs from the accumulation buffer size
    #[error("Frame has {got} samples but the accumulation buffer holds {expected}")]
    FrameSizeMismatch { expected: usize, got: usize },

    /// Mesh file could not be opened
    #[error("Failed to open mesh {}: {source}", .path.display())]
    MeshIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Mesh file is not valid STL or has no triangles
    #[error("Invalid mesh {}: {reason}", .path.display())]
    InvalidMesh { path: PathBuf, reason: String },

    /// Output image could not be written
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
