//! Single-linkage archive truncation.
//!
//! Reduces a set of candidates to a target count while keeping its spread
//! in objective space:
//!
//! 1. Start with one singleton cluster per candidate
//! 2. Repeatedly merge the two clusters with the smallest single-linkage
//!    distance (minimum Euclidean distance between any two members)
//! 3. Keep the medoid of each remaining cluster: the member minimizing the
//!    sum of distances to the other members of its cluster
//!
//! # Complexity
//!
//! O(n²) memory for the distance matrix, O(n²) per merge and O(n³) for a
//! full reduction. Archive limits keep `n` small.
//!
//! # References
//!
//! - Bandyopadhyay, Saha, Maulik & Deb (2008), "A Simulated Annealing-Based
//!   Multiobjective Optimization Algorithm: AMOSA", Section III.B

use super::candidate::{euclidean, Candidate};

/// Groups objective vectors into `target` single-linkage clusters.
///
/// Returns the member indices of each cluster. When `target >= n` or
/// `n <= 1`, every point forms its own cluster. A `target` of zero is
/// treated as one.
///
/// Ties between equally distant cluster pairs go to the pair found first
/// in index order, so the result is deterministic.
///
/// # Example
///
/// ```
/// use u_amosa::pareto::clustering::single_linkage;
///
/// let points = vec![
///     vec![0.0, 0.0],
///     vec![0.1, 0.0],
///     vec![5.0, 5.0],
/// ];
/// let clusters = single_linkage(&points, 2);
/// assert_eq!(clusters, vec![vec![0, 1], vec![2]]);
/// ```
pub fn single_linkage(objectives: &[Vec<f64>], target: usize) -> Vec<Vec<usize>> {
    let n = objectives.len();
    let mut clusters: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
    if n <= 1 || target >= n {
        return clusters;
    }
    let target = target.max(1);

    // link[a][b] holds the single-linkage distance between live clusters a and b.
    let mut link = distance_matrix(objectives);
    let mut alive = vec![true; n];

    for _ in 0..(n - target) {
        let mut closest: Option<(usize, usize, f64)> = None;
        for a in (0..n).filter(|&a| alive[a]) {
            for b in ((a + 1)..n).filter(|&b| alive[b]) {
                let d = link[a][b];
                if closest.is_none_or(|(_, _, best)| d < best) {
                    closest = Some((a, b, d));
                }
            }
        }

        let Some((a, b, _)) = closest else {
            break;
        };

        let absorbed = std::mem::take(&mut clusters[b]);
        clusters[a].extend(absorbed);
        alive[b] = false;

        for k in (0..n).filter(|&k| alive[k] && k != a) {
            let d = link[a][k].min(link[b][k]);
            link[a][k] = d;
            link[k][a] = d;
        }
    }

    clusters
        .into_iter()
        .zip(alive)
        .filter_map(|(members, live)| live.then_some(members))
        .collect()
}

/// Index (into `members`) of the member with the smallest summed distance
/// to the other members. Ties go to the earliest member.
///
/// # Panics
///
/// Panics if `members` is empty.
pub fn medoid(objectives: &[Vec<f64>], members: &[usize]) -> usize {
    assert!(!members.is_empty(), "cluster must not be empty");

    let mut best = 0;
    let mut best_sum = f64::INFINITY;
    for (pos, &i) in members.iter().enumerate() {
        let sum: f64 = members
            .iter()
            .filter(|&&j| j != i)
            .map(|&j| euclidean(&objectives[i], &objectives[j]))
            .sum();
        if sum < best_sum {
            best_sum = sum;
            best = pos;
        }
    }
    best
}

/// Reduces `candidates` to at most `target` representatives.
///
/// The input is returned unchanged when `target >= len` or `len <= 1`.
/// Otherwise one medoid per single-linkage cluster is kept, in cluster
/// order.
pub fn reduce<D>(candidates: Vec<Candidate<D>>, target: usize) -> Vec<Candidate<D>> {
    let n = candidates.len();
    if n <= 1 || target >= n {
        return candidates;
    }

    let objectives: Vec<Vec<f64>> = candidates.iter().map(|c| c.objectives().to_vec()).collect();
    let clusters = single_linkage(&objectives, target);

    let mut slots: Vec<Option<Candidate<D>>> = candidates.into_iter().map(Some).collect();
    clusters
        .iter()
        .filter_map(|members| {
            let representative = members[medoid(&objectives, members)];
            slots[representative].take()
        })
        .collect()
}

fn distance_matrix(objectives: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = objectives.len();
    let mut dist = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = euclidean(&objectives[i], &objectives[j]);
            dist[i][j] = d;
            dist[j][i] = d;
        }
    }
    dist
}
