use std::collections::HashSet;

use common::{Cycle, error::Error};

/// Reconstructs the negative cycle behind a witness vertex.
///
/// The witness flagged by the detection pass may sit downstream of the cycle
/// rather than on it. Stepping back through `parents` exactly `num_vertices`
/// times is guaranteed to land inside the cycle; from there the parent walk
/// is followed until a vertex repeats, and the recorded loop is reversed into
/// forward (conversion) order and closed.
///
/// # Arguments
/// * `parents` - Parent vertex of each vertex, as left by the relaxation run.
/// * `witness` - Vertex still relaxable after `V - 1` passes.
/// * `num_vertices` - `V`, the number of vertices in the graph.
///
/// # Errors
/// Returns `Error::InvalidWitness` if the parent chain ends (or leaves the
/// vertex range) before the cycle is traced.
pub fn extract_cycle(
    parents: &[Option<usize>],
    witness: usize,
    num_vertices: usize,
) -> Result<Cycle, Error> {
    let step = |vertex: usize| -> Result<usize, Error> {
        parents
            .get(vertex)
            .copied()
            .flatten()
            .filter(|&p| p < num_vertices)
            .ok_or(Error::InvalidWitness { witness })
    };

    if witness >= num_vertices {
        return Err(Error::InvalidWitness { witness });
    }

    let mut on_cycle = witness;
    for _ in 0..num_vertices {
        on_cycle = step(on_cycle)?;
    }

    let mut visited = HashSet::with_capacity(num_vertices);
    let mut walk = Vec::with_capacity(num_vertices + 1);
    let mut current = on_cycle;
    while visited.insert(current) {
        walk.push(current);
        current = step(current)?;
    }

    // `current` is the first repeat; anything recorded before it is lead-in.
    let loop_start = walk
        .iter()
        .position(|&v| v == current)
        .ok_or(Error::InvalidWitness { witness })?;

    let mut vertices = walk.split_off(loop_start);
    vertices.reverse();
    vertices.push(vertices[0]);

    Cycle::from_closed_walk(vertices).map_err(|_| Error::InvalidWitness { witness })
}
