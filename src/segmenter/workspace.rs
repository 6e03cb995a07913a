//! Reusable extraction buffers.
//!
//! The filter passes always read the previous stage's output from `scratch`
//! while writing into `work`, so no pass observes pixels it is overwriting.
//! All three buffers are sized `W·H` at construction and never reallocate;
//! repeated extractions on the same segmenter are allocation-free.

/// Double-buffered byte grids plus the label map, owned by the segmenter.
pub(crate) struct Workspace {
    len: usize,
    work: Vec<u8>,
    scratch: Vec<u8>,
    labels: Vec<u16>,
}

impl Workspace {
    pub(crate) fn new(width: usize, height: usize) -> Self {
        let len = width * height;
        Self {
            len,
            work: vec![0; len],
            scratch: vec![0; len],
            labels: vec![0; len],
        }
    }

    /// Copy a fresh input into both grids.
    pub(crate) fn load(&mut self, gray: &[u8]) {
        self.work.copy_from_slice(gray);
        self.scratch.copy_from_slice(gray);
    }

    /// Snapshot the pass output so the next pass reads it from `scratch`.
    pub(crate) fn sync(&mut self) {
        self.scratch.copy_from_slice(&self.work);
    }

    /// Borrow the pass input and output simultaneously.
    pub(crate) fn split(&mut self) -> (&[u8], &mut [u8]) {
        (&self.scratch, &mut self.work)
    }

    pub(crate) fn work(&self) -> &[u8] {
        &self.work
    }

    pub(crate) fn work_mut(&mut self) -> &mut [u8] {
        &mut self.work
    }

    pub(crate) fn labels(&self) -> &[u16] {
        &self.labels
    }

    /// Split borrow for the labeling pass: binarized input plus label output.
    pub(crate) fn split_labels(&mut self) -> (&[u8], &mut [u16]) {
        (&self.work, &mut self.labels)
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_keep_their_length() {
        let mut ws = Workspace::new(7, 5);
        assert_eq!(ws.len(), 35);
        ws.load(&vec![9u8; 35]);
        ws.work_mut()[0] = 1;
        ws.sync();
        let (scratch, work) = ws.split();
        assert_eq!(scratch.len(), 35);
        assert_eq!(work.len(), 35);
        assert_eq!(scratch[0], 1);
    }
}
