//! Hopcroft–Karp maximum matching on small bipartite graphs.
//!
//! The board comparator only needs the *size* of a maximum matching between
//! two sets of N columns, so vertices are plain indices: the left partition
//! is `0..left`, the right partition `0..right`, and `adj[u]` lists the
//! right vertices compatible with left vertex `u`.

use std::collections::VecDeque;

const UNMATCHED: usize = usize::MAX;
const INF: u32 = u32::MAX;

/// Size of a maximum matching in the bipartite graph `adj`.
///
/// Classical Hopcroft–Karp: a BFS from the unmatched left vertices builds a
/// level graph, then DFS extracts a maximal set of vertex-disjoint shortest
/// augmenting paths; repeat until no augmenting layering exists.
pub fn max_bipartite_matching(left: usize, right: usize, adj: &[Vec<usize>]) -> usize {
    debug_assert_eq!(adj.len(), left);

    let mut match_left = vec![UNMATCHED; left];
    let mut match_right = vec![UNMATCHED; right];
    let mut dist = vec![INF; left];
    let mut matching = 0;

    while layer(adj, &match_left, &match_right, &mut dist) {
        for u in 0..left {
            if match_left[u] == UNMATCHED
                && augment(u, adj, &mut match_left, &mut match_right, &mut dist)
            {
                matching += 1;
            }
        }
    }

    matching
}

/// BFS phase: assign levels to left vertices reachable along alternating
/// paths from the unmatched ones. Returns whether any augmenting path ends
/// in an unmatched right vertex.
fn layer(
    adj: &[Vec<usize>],
    match_left: &[usize],
    match_right: &[usize],
    dist: &mut [u32],
) -> bool {
    let mut queue = VecDeque::new();
    for (u, &m) in match_left.iter().enumerate() {
        if m == UNMATCHED {
            dist[u] = 0;
            queue.push_back(u);
        } else {
            dist[u] = INF;
        }
    }

    let mut found = false;
    while let Some(u) = queue.pop_front() {
        for &v in &adj[u] {
            match match_right[v] {
                UNMATCHED => found = true,
                w => {
                    if dist[w] == INF {
                        dist[w] = dist[u] + 1;
                        queue.push_back(w);
                    }
                }
            }
        }
    }
    found
}

/// DFS phase: extend one augmenting path from left vertex `u`, respecting
/// the BFS levels so paths stay shortest and vertex-disjoint.
fn augment(
    u: usize,
    adj: &[Vec<usize>],
    match_left: &mut [usize],
    match_right: &mut [usize],
    dist: &mut [u32],
) -> bool {
    for i in 0..adj[u].len() {
        let v = adj[u][i];
        let w = match_right[v];
        if w == UNMATCHED
            || (dist[w] == dist[u].wrapping_add(1)
                && augment(w, adj, match_left, match_right, dist))
        {
            match_left[u] = v;
            match_right[v] = u;
            return true;
        }
    }
    dist[u] = INF;
    false
}
