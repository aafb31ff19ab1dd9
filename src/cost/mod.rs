//! Cardinality based cost model.
//!
//! The cost of a plan is the sum of the estimated output tuple counts of all of its nodes,
//! root included.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use derive_more::{Display, From, Into};

mod estimator;
pub use estimator::*;

/// Summed tuple counts. Addition saturates at `u64::MAX`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Display)]
pub struct Cost(u64);

impl Cost {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, rhs: Self) -> Self::Output {
        Cost(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Cost {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Cost {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Cost::default(), |acc, cost| acc + cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addition_saturates() {
        let mut cost = Cost::from(u64::MAX - 1);
        cost += Cost::from(5);
        assert_eq!(cost, Cost::from(u64::MAX));
        assert_eq!(Cost::from(u64::MAX) + Cost::from(1), Cost::from(u64::MAX));

        let total: Cost = [u64::MAX, u64::MAX, 3].into_iter().map(Cost::from).sum();
        assert_eq!(total.value(), u64::MAX);
        let total: Cost = [1, 2, 3].into_iter().map(Cost::from).sum();
        assert_eq!(total, Cost::from(6));
    }
}
