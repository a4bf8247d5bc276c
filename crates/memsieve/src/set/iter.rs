use std::iter::FusedIterator;

/// Lazy, ascending iterator over the members of a
/// [`CandidateSet`](super::CandidateSet) inside an inclusive address range.
///
/// For a complemented set this walks the gaps between the excluded
/// addresses, so it stays lazy even over the whole 64-bit space.
#[derive(Debug, Clone)]
pub struct Elements<'a> {
    explicit: &'a [u64],
    complemented: bool,
    cursor: Option<u64>,
    last: u64,
}

impl<'a> Elements<'a> {
    /// `explicit` must be sorted; it is trimmed to `[first, last]` here.
    pub(crate) fn new(explicit: &'a [u64], complemented: bool, first: u64, last: u64) -> Self {
        if first > last {
            return Self {
                explicit: &[],
                complemented,
                cursor: None,
                last,
            };
        }

        let lo = explicit.partition_point(|&a| a < first);
        let hi = explicit.partition_point(|&a| a <= last);
        Self {
            explicit: &explicit[lo..hi],
            complemented,
            cursor: Some(first),
            last,
        }
    }

    pub(crate) fn empty() -> Self {
        Self {
            explicit: &[],
            complemented: false,
            cursor: None,
            last: 0,
        }
    }

    fn step(&mut self, from: u64) {
        self.cursor = if from >= self.last {
            None
        } else {
            Some(from + 1)
        };
    }
}

impl Iterator for Elements<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if !self.complemented {
            let (&first, rest) = self.explicit.split_first()?;
            self.explicit = rest;
            return Some(first);
        }

        loop {
            let candidate = self.cursor?;
            self.step(candidate);
            match self.explicit.first() {
                Some(&excluded) if excluded == candidate => {
                    self.explicit = &self.explicit[1..];
                }
                _ => return Some(candidate),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if !self.complemented {
            return (self.explicit.len(), Some(self.explicit.len()));
        }
        match self.cursor {
            None => (0, Some(0)),
            Some(cursor) => {
                let span = (self.last - cursor).checked_add(1);
                let remaining = span
                    .and_then(|s| s.checked_sub(self.explicit.len() as u64))
                    .and_then(|r| usize::try_from(r).ok());
                (remaining.unwrap_or(usize::MAX), remaining)
            }
        }
    }
}

impl FusedIterator for Elements<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_range_trim() {
        let explicit = [1, 5, 9, 12];
        let all: Vec<_> = Elements::new(&explicit, false, 0, u64::MAX).collect();
        assert_eq!(all, vec![1, 5, 9, 12]);

        let some: Vec<_> = Elements::new(&explicit, false, 5, 11).collect();
        assert_eq!(some, vec![5, 9]);
    }

    #[test]
    fn test_complemented_walks_gaps() {
        let explicit = [0x1001, 0x1003];
        let members: Vec<_> = Elements::new(&explicit, true, 0x1000, 0x1004).collect();
        assert_eq!(members, vec![0x1000, 0x1002, 0x1004]);
    }

    #[test]
    fn test_complemented_at_top_of_address_space() {
        let explicit = [u64::MAX - 1];
        let members: Vec<_> = Elements::new(&explicit, true, u64::MAX - 2, u64::MAX).collect();
        assert_eq!(members, vec![u64::MAX - 2, u64::MAX]);
    }

    #[test]
    fn test_complemented_whole_space_is_lazy() {
        let explicit = [0, 2];
        let first: Vec<_> = Elements::new(&explicit, true, 0, u64::MAX).take(3).collect();
        assert_eq!(first, vec![1, 3, 4]);
    }

    #[test]
    fn test_empty_range() {
        assert_eq!(Elements::new(&[1, 2], true, 5, 4).count(), 0);
        assert_eq!(Elements::empty().count(), 0);
    }

    #[test]
    fn test_size_hint() {
        let explicit = [2, 3];
        let it = Elements::new(&explicit, true, 0, 9);
        assert_eq!(it.size_hint(), (8, Some(8)));
        assert_eq!(it.count(), 8);

        let it = Elements::new(&explicit, false, 0, 9);
        assert_eq!(it.size_hint(), (2, Some(2)));
    }
}
