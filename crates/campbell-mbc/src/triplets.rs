//! Blade-periodicity classification.
//!
//! Rotating-frame signals come in groups of three, one per blade, whose
//! descriptions differ only in the blade number. This module finds those
//! groups and derives the permutation that moves them behind the
//! fixed-frame signals.

use campbell_lin::OperatingPoint;

use crate::config::BladeMatchers;
use crate::error::{Error, Result};
use crate::permutation::Permutation;

/// Number of blades the transform supports.
pub const NUM_BLADES: usize = 3;

/// Blade triplets of one descriptor list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BladeTriplets {
    len: usize,
    triplets: Vec<[usize; NUM_BLADES]>,
    permutation: Permutation,
}

impl BladeTriplets {
    /// A list of `len` signals with no rotating triplets.
    pub fn fixed(len: usize) -> Self {
        Self {
            len,
            triplets: Vec::new(),
            permutation: Permutation::identity(len),
        }
    }

    /// Build from known triplets over a list of `len` signals.
    ///
    /// Indices are zero-based. Triplets are sorted by first member. Returns
    /// `None` if a member is out of range or appears twice.
    pub fn from_triplets(len: usize, mut triplets: Vec<[usize; NUM_BLADES]>) -> Option<Self> {
        triplets.sort_by_key(|t| t[0]);

        let mut in_triplet = vec![false; len];
        for &i in triplets.iter().flatten() {
            *in_triplet.get_mut(i)? = true;
        }

        let order = (0..len)
            .filter(|&i| !in_triplet[i])
            .chain(triplets.iter().flatten().copied())
            .collect();

        Some(Self {
            len,
            triplets,
            permutation: Permutation::from_order(order)?,
        })
    }

    /// Total number of signals.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Triplets as zero-based indices, blade order preserved.
    pub fn triplets(&self) -> &[[usize; NUM_BLADES]] {
        &self.triplets
    }

    pub fn num_triplets(&self) -> usize {
        self.triplets.len()
    }

    /// Number of signals outside any triplet.
    pub fn num_fixed(&self) -> usize {
        self.len - NUM_BLADES * self.triplets.len()
    }

    /// Reordering into `[fixed | triplet 1 | triplet 2 | ...]`.
    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }
}

/// Group rotating-frame descriptors into blade triplets.
///
/// Descriptors are keyed by their description with the parenthesized part
/// and the blade label removed. Rotating descriptors with no blade label stay
/// in the fixed-frame block.
pub fn find_blade_triplets(
    descriptors: &[OperatingPoint],
    matchers: &BladeMatchers,
) -> Result<BladeTriplets> {
    let mut keyed: Vec<(String, &str, usize)> = descriptors
        .iter()
        .enumerate()
        .filter(|(_, op)| op.rotating)
        .filter_map(|(i, op)| match matchers.strip(&op.description) {
            Some(key) => Some((key, op.description.as_str(), i)),
            None => {
                log::warn!(
                    "rotating signal {} has no blade label, treating as fixed: {}",
                    op.index,
                    op.description
                );
                None
            }
        })
        .collect();

    keyed.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    for (key, _, i) in keyed {
        match groups.last_mut() {
            Some((current, members)) if *current == key => members.push(i),
            _ => groups.push((key, vec![i])),
        }
    }

    let triplets = groups
        .into_iter()
        .map(|(key, members)| {
            <[usize; NUM_BLADES]>::try_from(members.as_slice()).map_err(|_| {
                Error::TripletSize {
                    label: key.split_whitespace().collect::<Vec<_>>().join(" "),
                    count: members.len(),
                    rows: members.iter().map(|&i| descriptors[i].index).collect(),
                }
            })
        })
        .collect::<Result<Vec<_>>>()?;

    BladeTriplets::from_triplets(descriptors.len(), triplets).ok_or(Error::InvalidTriplets {
        len: descriptors.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(index: usize, rotating: bool, description: &str) -> OperatingPoint {
        OperatingPoint {
            index,
            value: 0.0,
            rotating,
            derivative_order: 2,
            description: description.to_string(),
        }
    }

    fn elastodyn_states() -> Vec<OperatingPoint> {
        vec![
            op(1, false, "ED Platform horizontal surge translation DOF, m"),
            op(2, true, "ED 1st flapwise bending-mode DOF of blade 1 (internal DOF index = DOF_BF(1,1)), m"),
            op(3, true, "ED 1st flapwise bending-mode DOF of blade 2 (internal DOF index = DOF_BF(2,1)), m"),
            op(4, true, "ED 1st flapwise bending-mode DOF of blade 3 (internal DOF index = DOF_BF(3,1)), m"),
            op(5, false, "ED Variable speed generator DOF (internal DOF index = DOF_GeAz), rad"),
            op(6, true, "ED 1st edgewise bending-mode DOF of blade 1 (internal DOF index = DOF_BE(1,1)), m"),
            op(7, true, "ED 1st edgewise bending-mode DOF of blade 2 (internal DOF index = DOF_BE(2,1)), m"),
            op(8, true, "ED 1st edgewise bending-mode DOF of blade 3 (internal DOF index = DOF_BE(3,1)), m"),
        ]
    }

    #[test]
    fn test_find_triplets() {
        let t = find_blade_triplets(&elastodyn_states(), &BladeMatchers::default()).unwrap();
        assert_eq!(t.triplets(), &[[1, 2, 3], [5, 6, 7]]);
        assert_eq!(t.num_fixed(), 2);
        assert_eq!(t.permutation().as_slice(), &[0, 4, 1, 2, 3, 5, 6, 7]);
    }

    #[test]
    fn test_triplets_sorted_by_first_member() {
        // Edgewise sorts before flapwise by description, but appears later.
        let mut states = elastodyn_states();
        states.swap(1, 5);
        states.swap(2, 6);
        states.swap(3, 7);
        let t = find_blade_triplets(&states, &BladeMatchers::default()).unwrap();
        assert_eq!(t.triplets(), &[[1, 2, 3], [5, 6, 7]]);
        assert!(states[1].description.contains("edgewise"));
    }

    #[test]
    fn test_blade_order_preserved() {
        let states = vec![
            op(1, true, "BD_3 x translation displacement, node 2, m"),
            op(2, true, "BD_1 x translation displacement, node 2, m"),
            op(3, true, "BD_2 x translation displacement, node 2, m"),
            op(4, true, "BD_1 x translation displacement, node 3, m"),
            op(5, true, "BD_2 x translation displacement, node 3, m"),
            op(6, true, "BD_3 x translation displacement, node 3, m"),
        ];
        let t = find_blade_triplets(&states, &BladeMatchers::default()).unwrap();
        assert_eq!(t.triplets(), &[[1, 2, 0], [3, 4, 5]]);
        assert_eq!(t.num_fixed(), 0);
        assert_eq!(t.permutation().as_slice(), &[1, 2, 0, 3, 4, 5]);
    }

    #[test]
    fn test_incomplete_triplet_is_error() {
        let mut states = elastodyn_states();
        states.remove(3);
        let err = find_blade_triplets(&states, &BladeMatchers::default()).unwrap_err();
        match err {
            Error::TripletSize { count, rows, .. } => {
                assert_eq!(count, 2);
                assert_eq!(rows, vec![2, 3]);
            }
            other => panic!("expected triplet size error, got {other:?}"),
        }
    }

    #[test]
    fn test_unlabeled_rotating_signal_stays_fixed() {
        let states = vec![
            op(1, true, "AD rotor induction state, -"),
            op(2, false, "ED Tower fore-aft DOF, m"),
        ];
        let t = find_blade_triplets(&states, &BladeMatchers::default()).unwrap();
        assert_eq!(t.num_triplets(), 0);
        assert_eq!(t.permutation(), &Permutation::identity(2));
    }

    #[test]
    fn test_permutation_is_bijection() {
        let t = find_blade_triplets(&elastodyn_states(), &BladeMatchers::default()).unwrap();
        let order = t.permutation().as_slice().to_vec();
        let n = order.len();
        assert!(Permutation::from_order(order.clone()).is_some());

        // Exactly 3 x #triplets entries follow the fixed block
        let tail = &order[t.num_fixed()..];
        assert_eq!(tail.len(), 3 * t.num_triplets());
        assert_eq!(n, t.len());
    }

    #[test]
    fn test_from_triplets_rejects_bad_members() {
        assert!(BladeTriplets::from_triplets(4, vec![[1, 2, 3]]).is_some());
        assert!(BladeTriplets::from_triplets(3, vec![[1, 2, 3]]).is_none());
        assert!(BladeTriplets::from_triplets(6, vec![[0, 1, 2], [2, 3, 4]]).is_none());
    }

    #[test]
    fn test_empty_list() {
        let t = find_blade_triplets(&[], &BladeMatchers::default()).unwrap();
        assert!(t.is_empty());
        assert!(t.permutation().is_empty());
    }
}
