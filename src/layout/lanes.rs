use super::bifurcation::Bifurcation;

/// Signed lane per node: `+i` for the upper branch of the i-th bifurcation,
/// `-i` for its lower branch, 0 for the trunk. Later bifurcations overwrite
/// earlier ones; a convergence node returns to the trunk.
pub(crate) fn assign_lanes(node_count: usize, bifurcations: &[Bifurcation]) -> Vec<i32> {
    let mut lanes = vec![0i32; node_count];
    for (ordinal, bifurcation) in (1i32..).zip(bifurcations) {
        for &idx in &bifurcation.upper {
            lanes[idx] = ordinal;
        }
        for &idx in &bifurcation.lower {
            lanes[idx] = -ordinal;
        }
        if let Some(idx) = bifurcation.convergence {
            lanes[idx] = 0;
        }
    }
    lanes
}
