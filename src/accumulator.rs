use glam::Vec3A;
use log::trace;

use crate::error::{Error, Result};

/// Running per pixel mean of the rendered frames.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    accumulated_image: Vec<Vec3A>,
    last_frame_index: Option<u32>,
}

impl Accumulator {
    pub fn new(pixel_count: usize) -> Accumulator {
        Accumulator {
            accumulated_image: vec![Vec3A::ZERO; pixel_count],
            last_frame_index: None,
        }
    }

    pub fn image(&self) -> &[Vec3A] {
        &self.accumulated_image
    }

    pub fn len(&self) -> usize {
        self.accumulated_image.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accumulated_image.is_empty()
    }

    /// Index of the last committed frame, `None` right after a reset.
    pub fn last_frame_index(&self) -> Option<u32> {
        self.last_frame_index
    }

    /// Number of frames averaged into the current image.
    pub fn frame_count(&self) -> u32 {
        self.last_frame_index.map_or(0, |index| index + 1)
    }

    pub fn reset(&mut self) {
        self.accumulated_image.fill(Vec3A::ZERO);
        self.last_frame_index = None;
    }

    /// The frame index the next commit must carry, besides 0.
    pub fn expected_frame_index(&self) -> u32 {
        self.frame_count()
    }

    /// Folds a whole frame of samples into the running mean.
    ///
    /// Frame 0 replaces the buffer (and may change its size). Any other frame
    /// must directly follow the last committed one and match the buffer size,
    /// otherwise the buffer is left untouched.
    pub fn commit(&mut self, samples: &[Vec3A], frame_index: u32) -> Result<()> {
        if frame_index == 0 {
            self.accumulated_image.clear();
            self.accumulated_image.extend_from_slice(samples);
            self.last_frame_index = Some(0);
            return Ok(());
        }

        let expected = self.expected_frame_index();
        if frame_index != expected {
            return Err(Error::FrameOutOfSequence {
                expected,
                got: frame_index,
            });
        }

        if samples.len() != self.accumulated_image.len() {
            return Err(Error::FrameSizeMismatch {
                expected: self.accumulated_image.len(),
                got: samples.len(),
            });
        }

        let weight = 1.0 / (frame_index as f32 + 1.0);
        for (accumulated, &sample) in self.accumulated_image.iter_mut().zip(samples) {
            *accumulated += (sample - *accumulated) * weight;
        }

        self.last_frame_index = Some(frame_index);
        trace!("accumulated frame {frame_index}");

        Ok(())
    }
}
