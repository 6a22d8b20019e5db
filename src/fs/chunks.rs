//! Chunk planning for uploads.

use serde::{Deserialize, Serialize};

use crate::error::{BucketError, Result};

/// One slice of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDescriptor {
    /// Byte offset into the source
    pub offset: u64,
    /// Number of bytes in this chunk
    pub length: u64,
    /// Zero-based position
    pub index: u32,
    /// Number of chunks in the upload
    pub total_chunks: u32,
}

impl ChunkDescriptor {
    /// Check if this is the last chunk of its upload.
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total_chunks
    }

    /// Progress percentage once this chunk is acknowledged.
    pub fn percent_after(&self) -> f64 {
        (self.index as f64 + 1.0) / self.total_chunks as f64 * 100.0
    }
}

/// Chunk layout of one upload.
///
/// Descriptors are produced on demand, so a plan costs the same for any
/// number of chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    size: u64,
    chunk_size: u64,
    total_chunks: u32,
}

impl ChunkPlan {
    /// Number of chunks, always at least one.
    pub fn len(&self) -> u32 {
        self.total_chunks
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Descriptor of chunk `index`.
    pub fn get(&self, index: u32) -> Option<ChunkDescriptor> {
        if index >= self.total_chunks {
            return None;
        }
        let offset = u64::from(index) * self.chunk_size;
        Some(ChunkDescriptor {
            offset,
            length: self.chunk_size.min(self.size - offset),
            index,
            total_chunks: self.total_chunks,
        })
    }

    /// Descriptors in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ChunkDescriptor> + '_ {
        (0..self.total_chunks).filter_map(|i| self.get(i))
    }
}

/// Split `size` bytes into chunks of at most `chunk_size` bytes.
///
/// Files smaller than `chunk_size` (including empty ones) yield a single
/// chunk. Otherwise the plan has `ceil(size / chunk_size)` ascending chunks
/// and only the last may be shorter. Fails when the chunk count does not
/// fit the wire's 32-bit chunk numbers.
pub fn plan_chunks(size: u64, chunk_size: u64) -> Result<ChunkPlan> {
    let chunk_size = chunk_size.max(1);
    if size < chunk_size {
        return Ok(ChunkPlan {
            size,
            chunk_size,
            total_chunks: 1,
        });
    }

    let total = size.div_ceil(chunk_size);
    let total_chunks = u32::try_from(total).map_err(|_| {
        BucketError::InvalidConfig(format!(
            "{} bytes in chunks of {} bytes needs {} chunks, more than {} allowed",
            size,
            chunk_size,
            total,
            u32::MAX
        ))
    })?;

    Ok(ChunkPlan {
        size,
        chunk_size,
        total_chunks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_file_single_chunk() {
        let plan = plan_chunks(10, 100).unwrap();
        assert_eq!(plan.len(), 1);
        let only = plan.get(0).unwrap();
        assert_eq!(only.length, 10);
        assert_eq!(only.total_chunks, 1);
        assert!(only.is_last());
        assert_eq!(plan.get(1), None);
    }

    #[test]
    fn test_empty_file() {
        let plan: Vec<ChunkDescriptor> = plan_chunks(0, 100).unwrap().iter().collect();
        assert_eq!(plan, vec![ChunkDescriptor { offset: 0, length: 0, index: 0, total_chunks: 1 }]);
    }

    #[test]
    fn test_exact_multiple() {
        let plan = plan_chunks(300, 100).unwrap();
        assert_eq!(plan.len(), 3);
        assert!(plan.iter().all(|c| c.length == 100 && c.total_chunks == 3));
        assert_eq!(plan.get(2).unwrap().offset, 200);
    }

    #[test]
    fn test_size_equal_to_chunk_size() {
        let plan = plan_chunks(100, 100).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.get(0).unwrap().length, 100);
    }

    #[test]
    fn test_short_last_chunk() {
        let plan = plan_chunks(250, 100).unwrap();
        let lengths: Vec<u64> = plan.iter().map(|c| c.length).collect();
        assert_eq!(lengths, vec![100, 100, 50]);
        let indices: Vec<u32> = plan.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(plan.iter().map(|c| c.length).sum::<u64>(), 250);
    }

    #[test]
    fn test_percent_after() {
        let plan = plan_chunks(400, 100).unwrap();
        let percents: Vec<f64> = plan.iter().map(|c| c.percent_after()).collect();
        assert_eq!(percents, vec![25.0, 50.0, 75.0, 100.0]);
    }

    #[test]
    fn test_chunk_count_limit() {
        let max = u64::from(u32::MAX);
        let plan = plan_chunks(max, 1).unwrap();
        assert_eq!(plan.len(), u32::MAX);
        let last = plan.get(u32::MAX - 1).unwrap();
        assert_eq!(last.index, u32::MAX - 1);
        assert_eq!(last.offset, max - 1);
        assert!(last.is_last());

        assert!(matches!(
            plan_chunks(max + 1, 1),
            Err(BucketError::InvalidConfig(_))
        ));
        assert!(plan_chunks(u64::MAX, 1).is_err());
    }

    #[test]
    fn test_large_plan_is_lazy() {
        let plan = plan_chunks(1 << 40, 1 << 10).unwrap();
        assert_eq!(plan.len(), 1 << 30);
        let first: Vec<u32> = plan.iter().take(3).map(|c| c.index).collect();
        assert_eq!(first, vec![0, 1, 2]);
    }
}
