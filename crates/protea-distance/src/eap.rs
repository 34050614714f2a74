//! Shared double-buffered skeleton for the dynamic-programming kernels.
//!
//! The skeleton fills the cost matrix row by row using two row buffers and
//! two indices that narrow the reachable column band under a tightened
//! upper bound `ub`:
//!
//! - `next_start`: leftmost column of the current row still worth
//!   computing; every column left of it holds a value proven `> ub`;
//! - `prev_pp`: one past the last column of the previous row whose value
//!   was `<= ub` (the "previous pruning point").
//!
//! Within a row the computation advances through stages that differ in
//! which predecessors (diagonal, above, left) can contribute:
//! the first column (above only), columns before `prev_pp` while
//! `next_start` is still advancing (diagonal and above), columns before
//! `prev_pp` once a viable cell was found (all three), the column at
//! `prev_pp` (diagonal, or diagonal and left), and columns past `prev_pp`
//! (left only, stopping as soon as the pruning point stalls).
//!
//! An optional Sakoe-Chiba band (`|i − j| <= window`) is folded into the
//! same loop by capping each row's column range; a left border sentinel
//! keeps diagonal reads at the band edge correct.
//!
//! A kernel is a parameterization of this skeleton by three transition
//! cost closures and the cost of the first cell. The cost of each closure
//! call must be non-negative; closures are only invoked with `i >= 1` for
//! `diag`/`above`, `j >= 1` for `diag`/`left` (besides the diagonal-bound
//! walk, which uses the same index discipline).

/// Resolve the caller-facing cutoff sentinels into a concrete bound.
///
/// `NaN` means "no bound at all": resolved to `+INF` without seeding, so
/// neither pruning nor abandoning ever triggers. `+INF` means "prune but
/// never abandon the true value": resolved to the cost of walking the
/// matrix diagonal and then along the last column to the corner, which is
/// an upper bound of the true distance. Finite values pass through.
pub(crate) fn resolve_cutoff<D, A>(
    nblines: usize,
    nbcols: usize,
    init: f64,
    diag: &D,
    above: &A,
    cutoff: f64,
) -> f64
where
    D: Fn(usize, usize) -> f64,
    A: Fn(usize, usize) -> f64,
{
    if cutoff.is_nan() {
        f64::INFINITY
    } else if cutoff == f64::INFINITY {
        let mut bound = init;
        for k in 1..nbcols {
            bound += diag(k, k);
        }
        for i in nbcols..nblines {
            bound += above(i, nbcols - 1);
        }
        bound
    } else {
        cutoff
    }
}

/// Run the skeleton over a `nblines x nbcols` matrix.
///
/// Preconditions (enforced by the kernel wrappers): `1 <= nbcols <=
/// nblines`, `window <= nblines`, and `nblines - nbcols <= window`, so the
/// band always reaches the last column on the last row. `cutoff` must be
/// finite or `+INF` (sentinels already resolved).
///
/// Returns the exact corner value when it is `<= cutoff`, `+INF` otherwise.
#[allow(clippy::too_many_arguments)]
pub(crate) fn eap_dp<D, A, L>(
    nblines: usize,
    nbcols: usize,
    window: usize,
    init: f64,
    diag: D,
    above: A,
    left: L,
    cutoff: f64,
    buffer: &mut Vec<f64>,
) -> f64
where
    D: Fn(usize, usize) -> f64,
    A: Fn(usize, usize) -> f64,
    L: Fn(usize, usize) -> f64,
{
    const PINF: f64 = f64::INFINITY;
    debug_assert!(nbcols >= 1 && nbcols <= nblines);
    debug_assert!(window <= nblines && nblines - nbcols <= window);

    // Tightened bound: one ulp above the cutoff minus the cheapest
    // transition into the corner, so every in-row comparison is a plain <=.
    // Any partial alignment above `ub` needs at least that last transition
    // to finish and therefore ends above the cutoff; the corner cell itself
    // is the one exception, handled where it is computed.
    let last_align = if nblines >= 2 && nbcols >= 2 {
        let i = nblines - 1;
        let j = nbcols - 1;
        diag(i, j).min(above(i, j)).min(left(i, j))
    } else {
        0.0
    };
    let ub = if cutoff.is_finite() {
        cutoff.next_up() - last_align
    } else {
        PINF
    };

    // Two rows of `nbcols + 1` slots; slot 0 of each half is a +INF
    // sentinel so diagonal/left reads at column 0 fall out of bounds
    // harmlessly. `c` and `p` are the offsets of column 0 of the current
    // and previous row.
    let width = nbcols + 1;
    buffer.clear();
    buffer.resize(2 * width, 0.0);
    buffer[0] = PINF;
    buffer[width] = PINF;
    let (mut c, mut p) = (1usize, width + 1);

    let mut next_start = 0usize;
    let mut prev_pp;
    let mut j;
    let mut cost;

    // First row: only the left predecessor exists past the first cell.
    {
        cost = init;
        buffer[c] = cost;
        if cost <= ub {
            prev_pp = 1;
        } else {
            return PINF;
        }
        let jstop = (window + 1).min(nbcols);
        j = 1;
        while j < jstop {
            cost += left(0, j);
            buffer[c + j] = cost;
            if cost <= ub {
                prev_pp = j + 1;
            } else {
                break;
            }
            j += 1;
        }
    }

    for i in 1..nblines {
        std::mem::swap(&mut c, &mut p);
        let jstart = i.saturating_sub(window).max(next_start);
        let jstop = (i + window + 1).min(nbcols);
        if jstart >= jstop {
            // Everything left of the band end is proven > ub: no viable
            // path crosses this row.
            return PINF;
        }
        next_start = jstart;
        let mut curr_pp = next_start;
        j = next_start;
        // Left border of the band: diagonal reads from the next row land
        // here when the band edge advances.
        buffer[c + j - 1] = PINF;

        // Stage 0 (column 0 only): a single predecessor, above.
        if j == 0 {
            cost = buffer[p] + above(i, 0);
            buffer[c] = cost;
            if cost <= ub {
                curr_pp = 1;
            } else {
                next_start += 1;
            }
            j = 1;
        }
        // Stage 1: catching up to the previous pruning point while every
        // cell fails the bound; no left predecessor can exist yet.
        while j == next_start && j < prev_pp && j < jstop {
            cost = (buffer[p + j - 1] + diag(i, j)).min(buffer[p + j] + above(i, j));
            buffer[c + j] = cost;
            if cost <= ub {
                curr_pp = j + 1;
            } else {
                next_start += 1;
            }
            j += 1;
        }
        // Stage 2: before the previous pruning point with a viable cell
        // behind us: all three predecessors.
        while j < prev_pp && j < jstop {
            cost = (cost + left(i, j))
                .min(buffer[p + j - 1] + diag(i, j))
                .min(buffer[p + j] + above(i, j));
            buffer[c + j] = cost;
            if cost <= ub {
                curr_pp = j + 1;
            }
            j += 1;
        }
        // Stage 3: at the previous pruning point (the cell above is already
        // proven > ub).
        if j < jstop {
            if j == next_start {
                // Only the diagonal remains.
                cost = buffer[p + j - 1] + diag(i, j);
                buffer[c + j] = cost;
                if cost <= ub {
                    curr_pp = j + 1;
                } else {
                    // One valid cell left: on the last row and column the
                    // exact value still wins if it is within the original
                    // cutoff.
                    if i == nblines - 1 && j == nbcols - 1 && cost <= cutoff {
                        return cost;
                    }
                    return PINF;
                }
            } else {
                cost = (cost + left(i, j)).min(buffer[p + j - 1] + diag(i, j));
                buffer[c + j] = cost;
                if cost <= ub {
                    curr_pp = j + 1;
                }
            }
            j += 1;
        } else if j == next_start {
            // The whole row advanced the start: every cell is > ub. The
            // last one may still be on a viable path within the original
            // cutoff; keep only it for the next row.
            if cost > cutoff {
                return PINF;
            }
            next_start = jstop - 1;
        }
        // Stage 4: past the previous pruning point, reachable from the
        // left only; stop as soon as the pruning point stalls.
        while j == curr_pp && j < jstop {
            cost += left(i, j);
            buffer[c + j] = cost;
            if cost <= ub {
                curr_pp += 1;
            }
            j += 1;
        }

        prev_pp = curr_pp;
    }

    // The corner value is valid when the final row ran through the last
    // column and the value beats the original cutoff.
    if j == nbcols && cost <= cutoff {
        cost
    } else {
        PINF
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // DTW over univariate slices with squared differences: the simplest
    // full parameterization of the skeleton.
    fn dtw2(a: &[f64], b: &[f64], cutoff: f64) -> f64 {
        let (lines, cols) = if a.len() >= b.len() { (a, b) } else { (b, a) };
        let d = |i: usize, j: usize| {
            let diff = lines[i] - cols[j];
            diff * diff
        };
        let resolved = resolve_cutoff(lines.len(), cols.len(), d(0, 0), &d, &d, cutoff);
        eap_dp(
            lines.len(),
            cols.len(),
            lines.len(),
            d(0, 0),
            d,
            d,
            d,
            resolved,
            &mut Vec::new(),
        )
    }

    #[test]
    fn identity_is_zero() {
        assert_eq!(dtw2(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0, 4.0], f64::INFINITY), 0.0);
    }

    #[test]
    fn constant_offset_walks_the_diagonal() {
        assert_eq!(dtw2(&[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0], f64::INFINITY), 3.0);
    }

    #[test]
    fn hand_computed_two_by_two() {
        // C[0][0]=1, C[0][1]=1, C[1][0]=1, C[1][1]=1+1=2.
        assert_eq!(dtw2(&[0.0, 1.0], &[1.0, 0.0], f64::INFINITY), 2.0);
    }

    #[test]
    fn cutoff_below_value_abandons() {
        let v = dtw2(&[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0], f64::INFINITY);
        assert_eq!(dtw2(&[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0], v / 2.0), f64::INFINITY);
    }

    #[test]
    fn cutoff_at_value_returns_it() {
        let v = dtw2(&[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0], f64::INFINITY);
        assert_eq!(dtw2(&[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0], v), v);
    }

    #[test]
    fn nan_cutoff_means_no_bound() {
        let v = dtw2(&[1.0, 3.0, 2.0], &[2.0, 0.0, 2.0], f64::NAN);
        assert_eq!(v, dtw2(&[1.0, 3.0, 2.0], &[2.0, 0.0, 2.0], f64::INFINITY));
    }

    #[test]
    fn single_cell_matrix() {
        assert_eq!(dtw2(&[5.0], &[3.0], f64::INFINITY), 4.0);
        assert_eq!(dtw2(&[5.0], &[3.0], 3.9), f64::INFINITY);
    }
}
