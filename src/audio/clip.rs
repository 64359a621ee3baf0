/// A finished recording, ready to be sent.
///
/// The bytes are the captured segments concatenated in arrival order. A clip may be
/// empty when recording was stopped before the device produced anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioClip {
    bytes: Vec<u8>,
    chunk_count: usize,
}

impl AudioClip {
    pub fn from_chunks(chunks: Vec<Vec<u8>>) -> Self {
        let chunk_count = chunks.len();
        Self {
            bytes: chunks.concat(),
            chunk_count,
        }
    }

    /// Wrap an already assembled clip (e.g. a file read in one go)
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let chunk_count = usize::from(!bytes.is_empty());
        Self { bytes, chunk_count }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of segments the clip was assembled from
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_are_concatenated_in_order() {
        let clip = AudioClip::from_chunks(vec![vec![1, 2], vec![], vec![3], vec![4, 5, 6]]);

        assert_eq!(clip.as_bytes(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(clip.chunk_count(), 4);
        assert_eq!(clip.len(), 6);
    }

    #[test]
    fn test_no_chunks_is_an_empty_clip() {
        let clip = AudioClip::from_chunks(Vec::new());

        assert!(clip.is_empty());
        assert_eq!(clip.chunk_count(), 0);
        assert_eq!(clip, AudioClip::default());
    }
}
