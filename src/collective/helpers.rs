use crate::error::{PlenumError, Result};

/// Byte-level partition of a packed buffer among `world` ranks.
///
/// `total` bytes hold `total / datasize` elements; the first `remainder`
/// ranks carry one extra element each. Offsets are the packed displacements
/// in rank order, so `offsets[r]` is where rank `r`'s chunk starts.
#[derive(Debug)]
pub(crate) struct ChunkLayout {
    pub offsets: Vec<usize>,
    pub base_bytes: usize,
    pub remainder: usize,
    pub datasize: usize,
}

impl ChunkLayout {
    pub fn new(total: usize, datasize: usize, world: usize) -> Result<Self> {
        if datasize == 0 || total % datasize != 0 {
            return Err(PlenumError::IndivisibleBuffer {
                size: total,
                datasize,
            });
        }
        let count = total / datasize;
        let base_bytes = (count / world) * datasize;
        let remainder = count % world;

        let offsets: Vec<usize> = (0..world)
            .scan(0usize, |acc, i| {
                let off = *acc;
                *acc += if i < remainder {
                    base_bytes + datasize
                } else {
                    base_bytes
                };
                Some(off)
            })
            .collect();

        Ok(Self {
            offsets,
            base_bytes,
            remainder,
            datasize,
        })
    }

    /// Bytes assigned to `rank`.
    pub fn chunk_bytes(&self, rank: usize) -> usize {
        if rank < self.remainder {
            self.base_bytes + self.datasize
        } else {
            self.base_bytes
        }
    }

    /// Displacement of `rank`'s chunk in the packed buffer.
    pub fn offset_bytes(&self, rank: usize) -> usize {
        self.offsets[rank]
    }
}
