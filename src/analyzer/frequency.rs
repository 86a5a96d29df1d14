/// Occurrence counter over dense ids.
///
/// Ids are handed out by the interners in first-seen order, so ranking with a
/// stable sort on descending count breaks ties by first encounter.
#[derive(Debug, Default)]
pub struct FrequencyTable {
    counts: Vec<usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: usize) {
        if id >= self.counts.len() {
            self.counts.resize(id + 1, 0);
        }
        self.counts[id] += 1;
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// The `n` most frequent ids as `(id, count)`.
    pub fn top(&self, n: usize) -> Vec<(usize, usize)> {
        let mut ranked: Vec<(usize, usize)> = self
            .counts
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, count)| *count > 0)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_keep_first_seen_order() {
        let mut table = FrequencyTable::new();
        for id in [1, 0, 2, 0, 1, 3] {
            table.record(id);
        }

        assert_eq!(table.top(10), vec![(0, 2), (1, 2), (2, 1), (3, 1)]);
    }

    #[test]
    fn top_is_capped() {
        let mut table = FrequencyTable::new();
        for id in 0..50 {
            table.record(id);
        }
        assert_eq!(table.len(), 50);
        assert_eq!(table.top(20).len(), 20);
        assert!(table.top(0).is_empty());
    }
}
