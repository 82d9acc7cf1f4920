/// A batch of next-word prediction pairs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BigramBatch {
    /// Id of the preceding token for every pair.
    pub contexts: Vec<u32>,
    /// Id of the token to predict for every pair.
    pub targets: Vec<u32>,
}

impl BigramBatch {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Groups a stream of (context, target) pairs into batches of at most
/// `batch_size` pairs, pulling from the source only as batches are requested.
pub struct Batches<I> {
    pairs: I,
    batch_size: usize,
}

impl<I> Batches<I>
where
    I: Iterator<Item = (u32, u32)>,
{
    pub fn new(pairs: I, batch_size: usize) -> Self {
        Batches {
            pairs,
            batch_size: batch_size.max(1),
        }
    }
}

impl<I> Iterator for Batches<I>
where
    I: Iterator<Item = (u32, u32)>,
{
    type Item = BigramBatch;

    fn next(&mut self) -> Option<BigramBatch> {
        let mut batch = BigramBatch {
            contexts: Vec::with_capacity(self.batch_size),
            targets: Vec::with_capacity(self.batch_size),
        };
        for (context, target) in self.pairs.by_ref().take(self.batch_size) {
            batch.contexts.push(context);
            batch.targets.push(target);
        }
        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batches_split_with_remainder() {
        let pairs = (0..5u32).map(|i| (i, i + 10));
        let batches: Vec<_> = Batches::new(pairs, 2).collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].contexts, vec![0, 1]);
        assert_eq!(batches[0].targets, vec![10, 11]);
        assert_eq!(batches[2].len(), 1);
    }

    #[test]
    fn test_batches_empty_source() {
        let mut batches = Batches::new(std::iter::empty::<(u32, u32)>(), 4);
        assert!(batches.next().is_none());
    }

    #[test]
    fn test_batches_are_lazy() {
        let mut pulled = 0;
        let pairs = (0..100u32).inspect(|_| pulled += 1).map(|i| (i, i));
        let first = Batches::new(pairs, 3).next().unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(pulled, 3);
    }
}
