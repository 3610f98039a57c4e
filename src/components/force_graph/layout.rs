use std::f64::consts::PI;

use force_graph::SimulationParameters;

use crate::graph::{Layout, NodeKind, StyledNode};

const LEVEL_SEPARATION: f64 = 150.0;
const NODE_SPACING: f64 = 60.0;

/// Simulation tuning per layout.
pub fn parameters(layout: Layout) -> SimulationParameters {
	match layout {
		Layout::Force => SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.08,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.6,
		},
		Layout::Hierarchical => SimulationParameters {
			force_charge: 40.0,
			force_spring: 0.01,
			force_max: 30.0,
			node_speed: 1000.0,
			damping_factor: 0.91,
		},
		Layout::Circular => SimulationParameters {
			force_charge: 300.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 2000.0,
			damping_factor: 0.91,
		},
	}
}

/// Whether nodes stay where the layout put them until dragged.
pub fn pins_nodes(layout: Layout) -> bool {
	layout == Layout::Hierarchical
}

/// Starting coordinates for every node, in graph space around the origin.
pub fn initial_positions(layout: Layout, nodes: &[StyledNode]) -> Vec<(f32, f32)> {
	let n = nodes.len().max(1) as f64;
	match layout {
		Layout::Force => {
			let radius = 100.0 + 4.0 * n;
			ring(nodes.len(), radius)
		}
		Layout::Circular => {
			let radius = (n * NODE_SPACING / (2.0 * PI)).max(150.0);
			ring(nodes.len(), radius)
		}
		Layout::Hierarchical => {
			let users = nodes.iter().filter(|n| n.kind == NodeKind::User).count();
			let books = nodes.len() - users;
			let (mut ui, mut bi) = (0usize, 0usize);
			nodes
				.iter()
				.map(|node| {
					let (slot, count, level) = match node.kind {
						NodeKind::User => {
							ui += 1;
							(ui - 1, users, -0.5)
						}
						NodeKind::Book => {
							bi += 1;
							(bi - 1, books, 0.5)
						}
					};
					let x = (slot as f64 - (count as f64 - 1.0) / 2.0) * NODE_SPACING;
					(x as f32, (level * LEVEL_SEPARATION) as f32)
				})
				.collect()
		}
	}
}

fn ring(count: usize, radius: f64) -> Vec<(f32, f32)> {
	(0..count)
		.map(|i| {
			let angle = (i as f64) * 2.0 * PI / count as f64;
			((radius * angle.cos()) as f32, (radius * angle.sin()) as f32)
		})
		.collect()
}
