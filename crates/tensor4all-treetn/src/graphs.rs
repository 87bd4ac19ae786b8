//! Named graph constructors for common topologies.

use crate::named_graph::Topology;

/// Path graph `0 - 1 - ... - (n-1)`.
pub fn path_graph(n: usize) -> Topology<usize> {
    let mut g = Topology::new();
    for v in 0..n {
        let _ = g.add_node(v, ());
    }
    for v in 1..n {
        let _ = g.add_edge(&(v - 1), &v, ());
    }
    g
}

/// Two-dimensional `nx × ny` grid with vertices `(x, y)`.
///
/// Contains cycles whenever both sides are larger than one.
pub fn grid_graph(nx: usize, ny: usize) -> Topology<(usize, usize)> {
    let mut g = Topology::new();
    for x in 0..nx {
        for y in 0..ny {
            let _ = g.add_node((x, y), ());
        }
    }
    for x in 0..nx {
        for y in 0..ny {
            if x + 1 < nx {
                let _ = g.add_edge(&(x, y), &(x + 1, y), ());
            }
            if y + 1 < ny {
                let _ = g.add_edge(&(x, y), &(x, y + 1), ());
            }
        }
    }
    g
}

/// Comb tree: a backbone `(x, 0)` for `x < nx`, with a tooth
/// `(x, 0) - (x, 1) - ... - (x, ny-1)` hanging from every backbone vertex.
pub fn comb_tree(nx: usize, ny: usize) -> Topology<(usize, usize)> {
    let mut g = Topology::new();
    for x in 0..nx {
        for y in 0..ny {
            let _ = g.add_node((x, y), ());
        }
    }
    for x in 0..nx {
        if x + 1 < nx && ny > 0 {
            let _ = g.add_edge(&(x, 0), &(x + 1, 0), ());
        }
        for y in 1..ny {
            let _ = g.add_edge(&(x, y - 1), &(x, y), ());
        }
    }
    g
}
