//! Shadow buffer for rows fetched ahead of the displayed page.

/// Rows fetched ahead of the displayed page, waiting to be merged in.
///
/// Every authoritative fetch bumps the epoch and drops buffered rows; a
/// prefetch that started in an older epoch cannot append.
#[derive(Debug)]
pub struct PrefetchBuffer<T> {
    rows: Vec<T>,
    epoch: u64,
}

impl<T> Default for PrefetchBuffer<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            epoch: 0,
        }
    }
}

impl<T: Clone> PrefetchBuffer<T> {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Append `rows` if no authoritative fetch happened since `epoch`.
    pub fn append(&mut self, epoch: u64, rows: &[T]) -> bool {
        if epoch != self.epoch {
            return false;
        }
        self.rows.extend_from_slice(rows);
        true
    }

    /// Take the buffered rows, leaving the buffer empty.
    pub fn take(&mut self) -> Vec<T> {
        std::mem::take(&mut self.rows)
    }

    /// Drop buffered rows and invalidate in-flight prefetches.
    pub fn discard(&mut self) {
        self.rows.clear();
        self.epoch += 1;
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
