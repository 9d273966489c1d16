//! MIMO channel-quality estimator (C10): from DRS channel estimates,
//! selects a beamforming codebook index for single-spatial-stream modes,
//! grounded on `phy/rx/rx_synced/mimo/estimator_mimo.cpp`.

pub type Complex = (f64, f64);

fn add(a: Complex, b: Complex) -> Complex {
    (a.0 + b.0, a.1 + b.1)
}

fn mul(a: Complex, b: Complex) -> Complex {
    (a.0 * b.0 - a.1 * b.1, a.0 * b.1 + a.1 * b.0)
}

fn scale(a: Complex, s: f64) -> Complex {
    (a.0 * s, a.1 * s)
}

fn abs(a: Complex) -> f64 {
    (a.0 * a.0 + a.1 * a.1).sqrt()
}

pub const WIDEBAND_CELLS: usize = 14;

/// One candidate precoding/combining matrix for a single spatial stream:
/// a per-TS weight vector plus the codebook's normalization factor.
#[derive(Debug, Clone)]
pub struct CodebookEntry {
    pub weights: Vec<Complex>, // length N_TS
    pub scaling_factor: f64,
}

/// Minimal single-spatial-stream codebook for `N_TS` in `{1, 2, 4}`,
/// covering the phase-rotation families used by DECT NR+ transmission
/// modes 3 and 7. A production build sources the full standard-defined
/// table; this subset is sufficient to exercise the selection algorithm.
pub fn codebook_single_stream(n_ts: usize) -> Vec<CodebookEntry> {
    if n_ts == 1 {
        return vec![CodebookEntry {
            weights: vec![(1.0, 0.0)],
            scaling_factor: 1.0,
        }];
    }

    let phases = [0.0, std::f64::consts::FRAC_PI_2, std::f64::consts::PI, -std::f64::consts::FRAC_PI_2];
    let scaling_factor = 1.0 / (n_ts as f64).sqrt();
    phases
        .iter()
        .map(|&phase| {
            let mut weights = vec![(1.0, 0.0); n_ts];
            for w in weights.iter_mut().skip(1) {
                *w = (phase.cos(), phase.sin());
            }
            CodebookEntry {
                weights,
                scaling_factor,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMetric {
    MaxMin,
    MaxSum,
    MinSpread,
}

fn score(metric: AggregationMetric, sums: &[f64]) -> f64 {
    match metric {
        AggregationMetric::MaxMin => sums.iter().cloned().fold(f64::INFINITY, f64::min),
        AggregationMetric::MaxSum => sums.iter().sum(),
        AggregationMetric::MinSpread => {
            let max = sums.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let min = sums.iter().cloned().fold(f64::INFINITY, f64::min);
            // Spread is minimized; invert so "higher score wins" stays uniform.
            -(max - min)
        }
    }
}

/// `h[rx][ts][cell]` channel estimates sampled onto `WIDEBAND_CELLS` wideband
/// cells per transmit stream.
#[derive(Debug, Clone)]
pub struct ChannelEstimate {
    pub n_rx: usize,
    pub n_ts: usize,
    pub h: Vec<Vec<Vec<Complex>>>, // [rx][ts][cell]
}

/// Selects the winning codebook index per spec §4.9. For `N_TS == 1` the
/// winner is always index 0.
pub fn select_codebook_index(
    estimate: &ChannelEstimate,
    codebook: &[CodebookEntry],
    metric: AggregationMetric,
) -> usize {
    if estimate.n_ts == 1 {
        return 0;
    }

    let mut best_idx = 0;
    let mut best_score = f64::NEG_INFINITY;

    for (idx, entry) in codebook.iter().enumerate() {
        let mut sums = Vec::with_capacity(estimate.n_rx);
        for rx in 0..estimate.n_rx {
            let mut sum_r: Complex = (0.0, 0.0);
            for ts in 0..estimate.n_ts {
                let mut cell_sum: Complex = (0.0, 0.0);
                for cell in 0..estimate.h[rx][ts].len() {
                    cell_sum = add(cell_sum, estimate.h[rx][ts][cell]);
                }
                sum_r = add(sum_r, mul(cell_sum, entry.weights[ts]));
            }
            sum_r = scale(sum_r, entry.scaling_factor);
            sums.push(abs(sum_r));
        }

        let s = score(metric, &sums);
        if s > best_score {
            best_score = s;
            best_idx = idx;
        }
    }

    best_idx
}

/// Swaps `(N_RX, N_TS)` to compute the reciprocal beamforming recommendation
/// for the far-end receiver.
pub fn select_reciprocal_codebook_index(
    estimate: &ChannelEstimate,
    codebook: &[CodebookEntry],
    metric: AggregationMetric,
) -> usize {
    let swapped = ChannelEstimate {
        n_rx: estimate.n_ts,
        n_ts: estimate.n_rx,
        h: (0..estimate.n_ts)
            .map(|ts| {
                (0..estimate.n_rx)
                    .map(|rx| estimate.h[rx][ts].clone())
                    .collect()
            })
            .collect(),
    };
    select_codebook_index(&swapped, codebook, metric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_stream_always_index_zero() {
        let estimate = ChannelEstimate {
            n_rx: 2,
            n_ts: 1,
            h: vec![vec![vec![(1.0, 0.0); WIDEBAND_CELLS]]; 2],
        };
        let codebook = codebook_single_stream(1);
        assert_eq!(
            select_codebook_index(&estimate, &codebook, AggregationMetric::MaxSum),
            0
        );
    }

    #[test]
    fn picks_aligned_phase_for_two_streams() {
        // Two TX streams, in-phase on RX0: the zero-phase codebook entry
        // should maximize the combined sum for a max-sum metric.
        let h = vec![vec![vec![(1.0, 0.0); WIDEBAND_CELLS], vec![(1.0, 0.0); WIDEBAND_CELLS]]];
        let estimate = ChannelEstimate { n_rx: 1, n_ts: 2, h };
        let codebook = codebook_single_stream(2);
        let idx = select_codebook_index(&estimate, &codebook, AggregationMetric::MaxSum);
        assert_eq!(codebook[idx].weights[1].0.round(), 1.0);
    }
}
