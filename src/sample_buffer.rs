// src/sample_buffer.rs
//
// Engine-owned mono source audio.
//
// Loading is a two-step protocol: `allocate` hands out a zeroed writable
// region, the host fills it, and `commit` marks it valid. Until the commit the
// buffer reads as not loaded, so a block processed in between is silent.

use std::fmt;

/// Error while committing a sample buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// The committed length is larger than the allocated region.
    LengthExceedsAllocation { requested: usize, allocated: usize },

    /// A buffer must have at least one channel.
    InvalidChannelCount,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::LengthExceedsAllocation {
                requested,
                allocated,
            } => {
                write!(
                    f,
                    "Commit length {} exceeds allocated length {}",
                    requested, allocated
                )
            }
            BufferError::InvalidChannelCount => write!(f, "Channel count must be non-zero"),
        }
    }
}

impl std::error::Error for BufferError {}

/// Mono source audio read by grains.
#[derive(Debug)]
pub struct SampleBuffer {
    data: Vec<f32>,
    /// Valid frames, only meaningful once committed
    len: usize,
    channels: usize,
    committed: bool,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            len: 0,
            channels: 1,
            committed: false,
        }
    }

    /// Replace the storage with a zeroed region of `len` samples and return
    /// it for writing. The previous contents are released.
    pub fn allocate(&mut self, len: usize) -> &mut [f32] {
        self.data = vec![0.0; len];
        self.len = len;
        self.committed = false;
        &mut self.data
    }

    /// Mark the allocated region as valid audio.
    pub fn commit(&mut self, channels: usize, len: usize) -> Result<(), BufferError> {
        if channels == 0 {
            return Err(BufferError::InvalidChannelCount);
        }
        if len > self.data.len() {
            return Err(BufferError::LengthExceedsAllocation {
                requested: len,
                allocated: self.data.len(),
            });
        }
        self.channels = channels;
        self.len = len;
        self.committed = true;
        Ok(())
    }

    /// Swap in fully written storage in one step, returning the old storage.
    pub fn replace(&mut self, samples: Vec<f32>, channels: usize) -> Vec<f32> {
        self.len = samples.len();
        self.channels = channels.max(1);
        self.committed = true;
        std::mem::replace(&mut self.data, samples)
    }

    /// Writable view of the allocated region.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.data[..self.len.min(self.data.len())]
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.committed && self.len > 0
    }

    /// Committed length in samples (0 while a load is pending).
    #[inline]
    pub fn len(&self) -> usize {
        if self.committed { self.len } else { 0 }
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn allocated_len(&self) -> usize {
        self.data.len()
    }

    /// Read at a fractional position with linear interpolation.
    ///
    /// The last valid index is read directly; anything outside the buffer is
    /// silence.
    #[inline]
    pub fn read(&self, pos: f32) -> f32 {
        let len = self.len();
        if pos < 0.0 || len == 0 {
            return 0.0;
        }
        if pos < (len - 1) as f32 {
            let idx = pos as usize;
            let frac = pos - idx as f32;
            let next = (idx + 1).min(len - 1);
            self.data[idx] * (1.0 - frac) + self.data[next] * frac
        } else if pos < len as f32 {
            self.data[len - 1]
        } else {
            0.0
        }
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(samples: &[f32]) -> SampleBuffer {
        let mut buffer = SampleBuffer::new();
        buffer.allocate(samples.len()).copy_from_slice(samples);
        buffer.commit(1, samples.len()).unwrap();
        buffer
    }

    #[test]
    fn test_pending_until_commit() {
        let mut buffer = SampleBuffer::new();
        buffer.allocate(16)[0] = 1.0;
        assert!(!buffer.is_loaded());
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.read(0.0), 0.0);

        buffer.commit(1, 16).unwrap();
        assert!(buffer.is_loaded());
        assert_eq!(buffer.read(0.0), 1.0);
    }

    #[test]
    fn test_commit_validation() {
        let mut buffer = SampleBuffer::new();
        buffer.allocate(8);
        assert_eq!(
            buffer.commit(1, 9),
            Err(BufferError::LengthExceedsAllocation {
                requested: 9,
                allocated: 8
            })
        );
        assert_eq!(buffer.commit(0, 8), Err(BufferError::InvalidChannelCount));
        assert!(buffer.commit(2, 4).is_ok());
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.channels(), 2);
    }

    #[test]
    fn test_reallocation_clears() {
        let mut buffer = loaded(&[1.0, 1.0, 1.0]);
        buffer.allocate(3);
        buffer.commit(1, 3).unwrap();
        assert!(buffer.samples().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_interpolated_read() {
        let buffer = loaded(&[0.0, 1.0, 3.0]);
        assert_eq!(buffer.read(0.5), 0.5);
        assert_eq!(buffer.read(1.25), 1.5);
        // Last index read directly
        assert_eq!(buffer.read(2.0), 3.0);
        assert_eq!(buffer.read(2.7), 3.0);
        // Outside
        assert_eq!(buffer.read(3.0), 0.0);
        assert_eq!(buffer.read(-0.1), 0.0);
    }

    #[test]
    fn test_replace_returns_old_storage() {
        let mut buffer = loaded(&[0.5; 4]);
        let old = buffer.replace(vec![0.25; 10], 2);
        assert_eq!(old, vec![0.5; 4]);
        assert_eq!(buffer.len(), 10);
        assert_eq!(buffer.channels(), 2);
        assert!(buffer.is_loaded());
    }
}
