use std::collections::VecDeque;
use std::f64::consts::PI;

use super::types::Point;

/// Node-count threshold for the initial layout policy: below it the graph
/// gets a layered top-to-bottom layout for readability, at or above it a
/// breadth-first radial layout that stays usable on very large graphs.
pub const LAYERED_MAX_NODES: usize = 1000;

/// Extra ring spacing applied by the breadth-first radial layout.
pub const RADIAL_SPACING_FACTOR: f64 = 1.75;

const NODE_H_SPACING: f64 = 90.0;
const NODE_V_SPACING: f64 = 110.0;
const RING_SPACING: f64 = 120.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutKind {
	/// Directed, top-to-bottom ranking.
	Layered,
	/// Concentric rings by breadth-first depth.
	BreadthFirstRadial,
}

/// Pick the initial layout for a freshly loaded graph. Fixed policy, not
/// user-configurable.
pub fn choose(node_count: usize) -> LayoutKind {
	if node_count < LAYERED_MAX_NODES {
		LayoutKind::Layered
	} else {
		LayoutKind::BreadthFirstRadial
	}
}

/// Compute positions for `node_count` nodes connected by `edges` (pairs of
/// node indices, source to target).
pub fn compute(kind: LayoutKind, node_count: usize, edges: &[(usize, usize)]) -> Vec<Point> {
	match kind {
		LayoutKind::Layered => layered(node_count, edges),
		LayoutKind::BreadthFirstRadial => radial(node_count, edges),
	}
}

/// Breadth-first rank of every node, starting from in-degree-zero roots.
/// Nodes unreachable from any root (cycles) seed new traversals in index
/// order, so every node gets a rank.
fn ranks(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
	let mut in_degree = vec![0usize; node_count];
	let mut out: Vec<Vec<usize>> = vec![Vec::new(); node_count];
	for &(s, t) in edges {
		if s < node_count && t < node_count {
			out[s].push(t);
			in_degree[t] += 1;
		}
	}

	let mut rank = vec![usize::MAX; node_count];
	let mut queue = VecDeque::new();
	for (i, &d) in in_degree.iter().enumerate() {
		if d == 0 {
			rank[i] = 0;
			queue.push_back(i);
		}
	}

	let mut next_seed = 0;
	loop {
		while let Some(n) = queue.pop_front() {
			for &m in &out[n] {
				if rank[m] == usize::MAX {
					rank[m] = rank[n] + 1;
					queue.push_back(m);
				}
			}
		}
		match (next_seed..node_count).find(|&i| rank[i] == usize::MAX) {
			Some(seed) => {
				rank[seed] = 0;
				next_seed = seed + 1;
				queue.push_back(seed);
			}
			None => break,
		}
	}
	rank
}

fn layered(node_count: usize, edges: &[(usize, usize)]) -> Vec<Point> {
	let rank = ranks(node_count, edges);
	let max_rank = rank.iter().copied().max().unwrap_or(0);

	let mut rows: Vec<Vec<usize>> = vec![Vec::new(); max_rank + 1];
	for (i, &r) in rank.iter().enumerate() {
		rows[r].push(i);
	}

	let mut positions = vec![Point::default(); node_count];
	for (r, row) in rows.iter().enumerate() {
		let width = (row.len().saturating_sub(1)) as f64 * NODE_H_SPACING;
		for (col, &n) in row.iter().enumerate() {
			positions[n] = Point {
				x: col as f64 * NODE_H_SPACING - width / 2.0,
				y: r as f64 * NODE_V_SPACING,
			};
		}
	}
	positions
}

fn radial(node_count: usize, edges: &[(usize, usize)]) -> Vec<Point> {
	let rank = ranks(node_count, edges);
	let max_rank = rank.iter().copied().max().unwrap_or(0);

	let mut rings: Vec<Vec<usize>> = vec![Vec::new(); max_rank + 1];
	for (i, &r) in rank.iter().enumerate() {
		rings[r].push(i);
	}

	let mut positions = vec![Point::default(); node_count];
	for (r, ring) in rings.iter().enumerate() {
		// A lone root sits at the exact center; everything else spreads
		// evenly on its ring.
		let radius = if r == 0 && ring.len() == 1 {
			0.0
		} else {
			(r as f64 + 1.0).max(1.0) * RING_SPACING * RADIAL_SPACING_FACTOR
		};
		for (i, &n) in ring.iter().enumerate() {
			let angle = i as f64 * 2.0 * PI / ring.len() as f64;
			positions[n] = Point {
				x: radius * angle.cos(),
				y: radius * angle.sin(),
			};
		}
	}
	positions
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn policy_switches_at_the_node_threshold() {
		assert_eq!(choose(0), LayoutKind::Layered);
		assert_eq!(choose(999), LayoutKind::Layered);
		assert_eq!(choose(1000), LayoutKind::BreadthFirstRadial);
		assert_eq!(choose(5000), LayoutKind::BreadthFirstRadial);
	}

	#[test]
	fn layered_chain_descends_top_to_bottom() {
		let pos = compute(LayoutKind::Layered, 3, &[(0, 1), (1, 2)]);
		assert!(pos[0].y < pos[1].y);
		assert!(pos[1].y < pos[2].y);
	}

	#[test]
	fn layered_siblings_share_a_row() {
		let pos = compute(LayoutKind::Layered, 3, &[(0, 1), (0, 2)]);
		assert_eq!(pos[1].y, pos[2].y);
		assert_ne!(pos[1].x, pos[2].x);
	}

	#[test]
	fn cyclic_graph_still_ranks_every_node() {
		// no in-degree-zero root at all
		let pos = compute(LayoutKind::Layered, 3, &[(0, 1), (1, 2), (2, 0)]);
		assert_eq!(pos.len(), 3);
		assert!(pos[0].y < pos[1].y);
	}

	#[test]
	fn radial_root_is_centered_and_rings_grow() {
		let pos = compute(LayoutKind::BreadthFirstRadial, 4, &[(0, 1), (0, 2), (1, 3)]);
		let dist = |p: Point| (p.x * p.x + p.y * p.y).sqrt();
		assert_eq!(dist(pos[0]), 0.0);
		assert!(dist(pos[1]) > 0.0);
		assert!(dist(pos[3]) > dist(pos[1]));
	}
}
