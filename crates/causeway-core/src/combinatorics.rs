//! Deterministic subset enumeration.
//!
//! [`Combinations`] yields every size-`k` subset of `0..n` as ascending index
//! vectors in lexicographic order. The order depends only on `n` and `k`.

/// Lexicographic `k`-subsets of `0..n`.
///
/// `k == 0` yields the empty subset once. `k > n` yields nothing.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    k: usize,
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            k,
            indices: (0..k).collect(),
            started: false,
            done: k > n,
        }
    }

    /// Restart from the first subset.
    pub fn reset(&mut self) {
        *self = Self::new(self.n, self.k);
    }

    /// Number of subsets the iterator yields in total.
    pub fn total(&self) -> u128 {
        binomial(self.n, self.k)
    }

    fn advance(&mut self) -> bool {
        let (n, k) = (self.n, self.k);
        let Some(i) = (0..k).rev().find(|&i| self.indices[i] < n - k + i) else {
            return false;
        };
        self.indices[i] += 1;
        for j in (i + 1)..k {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        true
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
        } else if !self.advance() {
            self.done = true;
            return None;
        }
        Some(self.indices.clone())
    }
}

/// All `k`-subsets of `items`, in the order of [`Combinations`].
pub fn choose<T: Copy>(items: &[T], k: usize) -> impl Iterator<Item = Vec<T>> + '_ {
    Combinations::new(items.len(), k).map(move |idx| idx.iter().map(|&i| items[i]).collect())
}

/// Subsets of `items` of every size from `0` to `max_size`, smaller sizes first.
pub fn subsets_up_to<T: Copy>(items: &[T], max_size: usize) -> impl Iterator<Item = Vec<T>> + '_ {
    (0..=max_size.min(items.len())).flat_map(move |k| choose(items, k))
}

/// `C(n, k)`, saturating at `u128::MAX`.
pub fn binomial(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc.saturating_mul((n - i) as u128) / (i as u128 + 1);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicographic_order() {
        let all: Vec<_> = Combinations::new(4, 2).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
    }

    #[test]
    fn empty_subset_once() {
        let all: Vec<_> = Combinations::new(3, 0).collect();
        assert_eq!(all, vec![Vec::<usize>::new()]);
        assert_eq!(Combinations::new(0, 0).count(), 1);
    }

    #[test]
    fn oversized_is_empty() {
        assert_eq!(Combinations::new(2, 3).count(), 0);
        assert_eq!(binomial(2, 3), 0);
    }

    #[test]
    fn reset_restarts() {
        let mut c = Combinations::new(5, 3);
        let first = c.next();
        c.nth(3);
        c.reset();
        assert_eq!(c.next(), first);
        assert_eq!(c.count() + 1, 10);
    }

    #[test]
    fn choose_maps_items() {
        let items = ['a', 'b', 'c'];
        let got: Vec<_> = choose(&items, 2).collect();
        assert_eq!(got, vec![vec!['a', 'b'], vec!['a', 'c'], vec!['b', 'c']]);
        assert_eq!(subsets_up_to(&items, 5).count(), 8);
    }

    #[test]
    fn binomial_values() {
        assert_eq!(binomial(10, 3), 120);
        assert_eq!(binomial(52, 5), 2_598_960);
        assert_eq!(binomial(7, 0), 1);
    }
}
