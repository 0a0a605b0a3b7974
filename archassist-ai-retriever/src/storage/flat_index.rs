//! Exact nearest-neighbour index over contiguous `f32` rows.
//!
//! Vectors are stored row-major in a single buffer. Search computes the
//! squared Euclidean distance to every row, so results are exact and the cost
//! is linear in the corpus size, which is fine for the modest corpora this
//! crate targets.
//!
//! ## On-disk format
//!
//! ```text
//! magic "AAFI" | version u32 LE | dimension u32 LE | count u64 LE | count*dimension f32
//! ```
//!
//! The vector body is the raw in-memory buffer (native endianness).

use crate::error::{StoreError, StoreResult};
use archassist_ai_embed::Embedding;

const MAGIC: &[u8; 4] = b"AAFI";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 4 + 8;

/// One search result: row position and squared L2 distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of vectors in the index.
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The vector stored at `position`.
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    /// Check every row of a batch without modifying the index.
    pub fn validate_batch(&self, vectors: &[Embedding]) -> StoreResult<()> {
        for (row, vector) in vectors.iter().enumerate() {
            if vector.len() != self.dimension {
                return Err(StoreError::DimensionMismatch {
                    row,
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
        }
        Ok(())
    }

    /// Append a batch. Nothing is appended unless every row is valid.
    pub fn add(&mut self, vectors: &[Embedding]) -> StoreResult<()> {
        self.validate_batch(vectors)?;
        self.data.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.data.extend_from_slice(vector);
        }
        Ok(())
    }

    /// Keep only the first `len` vectors.
    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len * self.dimension);
    }

    /// The `k` nearest rows to `query`, ascending by distance.
    ///
    /// Ties keep insertion order. Returns fewer than `k` neighbours when the
    /// index holds fewer vectors.
    pub fn search(&self, query: &[f32], k: usize) -> StoreResult<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(StoreError::QueryDimension {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut neighbors: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, row)| Neighbor {
                position,
                distance: squared_l2(query, row),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        });
        neighbors.truncate(k);
        Ok(neighbors)
    }

    /// Serialize into the on-disk format.
    pub fn encode(&self) -> Vec<u8> {
        let body: &[u8] = bytemuck::cast_slice(&self.data);
        let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.len() as u64).to_le_bytes());
        bytes.extend_from_slice(body);
        bytes
    }

    /// Parse the on-disk format. The error string describes what is wrong.
    pub fn decode(bytes: &[u8]) -> Result<Self, String> {
        if bytes.len() < HEADER_LEN {
            return Err(format!("file is {} bytes, shorter than the header", bytes.len()));
        }
        if &bytes[0..4] != MAGIC {
            return Err("missing index magic".to_string());
        }

        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version != FORMAT_VERSION {
            return Err(format!("unsupported format version {version}"));
        }

        let dimension = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
        let mut count_bytes = [0u8; 8];
        count_bytes.copy_from_slice(&bytes[12..HEADER_LEN]);
        let count = u64::from_le_bytes(count_bytes) as usize;

        let values = count
            .checked_mul(dimension)
            .ok_or_else(|| "vector count overflows".to_string())?;
        let body = &bytes[HEADER_LEN..];
        if body.len() != values * std::mem::size_of::<f32>() {
            return Err(format!(
                "expected {} vector bytes for {count} x {dimension}, found {}",
                values * std::mem::size_of::<f32>(),
                body.len()
            ));
        }
        if dimension == 0 && count > 0 {
            return Err("zero dimension with non-zero vector count".to_string());
        }

        let mut data = vec![0f32; values];
        bytemuck::cast_slice_mut::<f32, u8>(&mut data).copy_from_slice(body);
        Ok(Self { dimension, data })
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(rows: &[&[f32]]) -> FlatIndex {
        let mut index = FlatIndex::new(rows[0].len());
        let vectors: Vec<Embedding> = rows.iter().map(|r| r.to_vec()).collect();
        index.add(&vectors).unwrap();
        index
    }

    #[test]
    fn test_squared_l2() {
        assert_eq!(squared_l2(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
        assert_eq!(squared_l2(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_search_orders_by_distance() {
        let index = index_with(&[&[0.0, 1.0, 0.0], &[1.0, 0.0, 0.0], &[0.5, 0.5, 0.0]]);

        let results = index.search(&[1.0, 0.0, 0.0], 3).unwrap();
        let positions: Vec<usize> = results.iter().map(|n| n.position).collect();
        assert_eq!(positions, vec![1, 2, 0]);
        assert_eq!(results[0].distance, 0.0);
        assert!((results[1].distance - 0.5).abs() < 1e-6);
        assert!((results[2].distance - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_search_never_exceeds_corpus() {
        let index = index_with(&[&[1.0, 0.0]]);
        let results = index.search(&[0.0, 0.0], 3).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_search_ties_keep_insertion_order() {
        let index = index_with(&[&[1.0, 0.0], &[0.0, 1.0], &[-1.0, 0.0]]);
        let results = index.search(&[0.0, 0.0], 2).unwrap();
        assert_eq!(results[0].position, 0);
        assert_eq!(results[1].position, 1);
    }

    #[test]
    fn test_search_empty_and_zero_k() {
        let index = FlatIndex::new(2);
        assert!(index.search(&[0.0, 0.0], 5).unwrap().is_empty());

        let index = index_with(&[&[1.0, 0.0]]);
        assert!(index.search(&[0.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_query_dimension_checked() {
        let index = index_with(&[&[1.0, 0.0]]);
        let err = index.search(&[1.0, 0.0, 0.0], 1).unwrap_err();
        assert!(matches!(
            err,
            StoreError::QueryDimension {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_add_rejects_whole_batch() {
        let mut index = index_with(&[&[1.0, 2.0, 3.0]]);
        let batch = vec![vec![4.0, 5.0, 6.0], vec![7.0, 8.0]];

        let err = index.add(&batch).unwrap_err();
        assert!(matches!(
            err,
            StoreError::DimensionMismatch {
                row: 1,
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(index.len(), 1);
        assert_eq!(index.vector(0), Some(&[1.0, 2.0, 3.0][..]));
        assert_eq!(index.vector(1), None);
    }

    #[test]
    fn test_truncate() {
        let mut index = index_with(&[&[1.0], &[2.0], &[3.0]]);
        index.truncate(1);
        assert_eq!(index.len(), 1);
        assert_eq!(index.vector(0), Some(&[1.0][..]));
    }

    #[test]
    fn test_encode_decode() {
        let index = index_with(&[&[0.25, -1.5], &[3.0, 4.0]]);
        let bytes = index.encode();
        assert_eq!(&bytes[..4], b"AAFI");
        assert_eq!(bytes.len(), HEADER_LEN + 4 * 4);

        let decoded = FlatIndex::decode(&bytes).unwrap();
        assert_eq!(decoded, index);

        let empty = FlatIndex::new(1536);
        assert_eq!(FlatIndex::decode(&empty.encode()).unwrap(), empty);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(FlatIndex::decode(b"short").is_err());
        assert!(FlatIndex::decode(&[0u8; 32]).unwrap_err().contains("magic"));

        let mut truncated = index_with(&[&[1.0, 2.0]]).encode();
        truncated.pop();
        assert!(FlatIndex::decode(&truncated).is_err());
    }
}
