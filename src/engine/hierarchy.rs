use std::collections::VecDeque;

/// Assigns each node a layer such that every edge points downwards.
///
/// Nodes without incoming edges start at level 0 and a node sits one level
/// below its deepest predecessor. Cycles are broken at the lowest-indexed
/// node not yet placed. Self loops and out-of-range endpoints are ignored.
pub fn assign_levels(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
	let mut outgoing = vec![Vec::new(); node_count];
	let mut indegree = vec![0usize; node_count];
	for &(from, to) in edges {
		if from == to || from >= node_count || to >= node_count {
			continue;
		}
		outgoing[from].push(to);
		indegree[to] += 1;
	}

	let mut levels = vec![0usize; node_count];
	let mut placed = vec![false; node_count];
	let mut queue: VecDeque<usize> = (0..node_count).filter(|&i| indegree[i] == 0).collect();
	let mut next_unplaced = 0;

	loop {
		while let Some(node) = queue.pop_front() {
			placed[node] = true;
			for &succ in &outgoing[node] {
				if placed[succ] {
					continue;
				}
				levels[succ] = levels[succ].max(levels[node] + 1);
				indegree[succ] -= 1;
				if indegree[succ] == 0 {
					queue.push_back(succ);
				}
			}
		}

		while next_unplaced < node_count && placed[next_unplaced] {
			next_unplaced += 1;
		}
		if next_unplaced == node_count {
			break;
		}
		indegree[next_unplaced] = 0;
		queue.push_back(next_unplaced);
	}

	levels
}

/// Lays levels out top to bottom, centring each row on x = 0.
pub fn level_positions(levels: &[usize], node_spacing: f64, level_separation: f64) -> Vec<(f64, f64)> {
	let depth = levels.iter().copied().max().map_or(0, |d| d + 1);
	let mut row_sizes = vec![0usize; depth];
	for &level in levels {
		row_sizes[level] += 1;
	}

	let mut row_cursor = vec![0usize; depth];
	levels
		.iter()
		.map(|&level| {
			let slot = row_cursor[level];
			row_cursor[level] += 1;
			let offset = slot as f64 - (row_sizes[level] as f64 - 1.0) / 2.0;
			(offset * node_spacing, level as f64 * level_separation)
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn chain_descends_one_level_per_edge() {
		assert_eq!(assign_levels(3, &[(0, 1), (1, 2)]), vec![0, 1, 2]);
	}

	#[test]
	fn node_sits_below_its_deepest_parent() {
		// main -> f -> g, main -> g
		assert_eq!(assign_levels(3, &[(0, 1), (1, 2), (0, 2)]), vec![0, 1, 2]);
		assert_eq!(
			assign_levels(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]),
			vec![0, 1, 1, 2]
		);
	}

	#[test]
	fn cycles_are_broken_without_panicking() {
		assert_eq!(assign_levels(3, &[(0, 1), (1, 2), (2, 0)]), vec![0, 1, 2]);
		// a recursive call hanging off an acyclic root
		let levels = assign_levels(4, &[(0, 1), (1, 2), (2, 1), (2, 3)]);
		assert_eq!(levels[0], 0);
		assert!(levels[3] > levels[2]);
	}

	#[test]
	fn self_loops_and_isolated_nodes_stay_on_top() {
		assert_eq!(assign_levels(3, &[(1, 1)]), vec![0, 0, 0]);
	}

	#[test]
	fn rows_are_centred_and_spaced() {
		let positions = level_positions(&[0, 1, 1], 100.0, 150.0);
		assert_eq!(positions, vec![(0.0, 0.0), (-50.0, 150.0), (50.0, 150.0)]);
	}

	#[test]
	fn empty_graph_has_no_positions() {
		assert!(assign_levels(0, &[]).is_empty());
		assert!(level_positions(&[], 100.0, 150.0).is_empty());
	}
}
