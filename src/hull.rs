use geo::algorithm::kernels::{Kernel, Orientation, RobustKernel};
use geo::Coord;

use crate::graph::NodeId;

/// Convex hull of a labelled point set (Andrew's monotone chain).
///
/// Points are sorted on `(x, y, id)` and coincident points collapse into
/// one, so the output is fully determined by the input set. The hull is
/// returned counter-clockwise starting at the lowest `x` (then lowest `y`)
/// vertex, without repeating the first vertex. Collinear points are left
/// out of the hull. Negative zero is read as zero, so `-0.0` and `0.0`
/// coordinates coincide.
///
/// Degenerate inputs give degenerate hulls: no points yield an empty
/// vector, one point yields itself, and two distinct or any number of
/// collinear points yield the two extreme points.
pub fn convex_hull<I>(points: I) -> Vec<Coord<f64>>
where
    I: IntoIterator<Item = (NodeId, Coord<f64>)>,
{
    let mut points = points
        .into_iter()
        .map(|(id, c)| (id, normalize_zero(c)))
        .collect::<Vec<_>>();
    points.sort_by(|(a_id, a), (b_id, b)| {
        a.x.total_cmp(&b.x)
            .then(a.y.total_cmp(&b.y))
            .then(a_id.cmp(b_id))
    });
    points.dedup_by(|(_, later), (_, kept)| later == kept);

    let coords = points.into_iter().map(|(_, c)| c).collect::<Vec<_>>();
    if coords.len() < 3 {
        return coords;
    }

    let mut lower: Vec<Coord<f64>> = Vec::with_capacity(coords.len());
    for &p in &coords {
        pop_non_left_turns(&mut lower, p);
        lower.push(p);
    }

    let mut upper: Vec<Coord<f64>> = Vec::with_capacity(coords.len());
    for &p in coords.iter().rev() {
        pop_non_left_turns(&mut upper, p);
        upper.push(p);
    }

    // Each chain ends where the other starts
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

// total_cmp orders -0.0 before 0.0; adding zero maps -0.0 to 0.0
fn normalize_zero(c: Coord<f64>) -> Coord<f64> {
    Coord {
        x: c.x + 0.0,
        y: c.y + 0.0,
    }
}

fn pop_non_left_turns(chain: &mut Vec<Coord<f64>>, next: Coord<f64>) {
    while chain.len() >= 2 {
        let a = chain[chain.len() - 2];
        let b = chain[chain.len() - 1];
        if RobustKernel::orient2d(a, b, next) == Orientation::CounterClockwise {
            break;
        }
        chain.pop();
    }
}
