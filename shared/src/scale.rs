use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Which kind of scale the component builds from its palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleMode {
    Linear,
    Threshold,
}

/// A pure value→color mapping over a numeric domain.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorScale {
    /// Piecewise-linear gradient: the palette colors sit at evenly spaced
    /// stops across `[min, max]`, with channel-wise interpolation between
    /// neighbors. Out-of-domain values clamp to the endpoints.
    Linear { domain: (f64, f64), colors: Vec<Rgb> },
    /// Discrete buckets: `boundaries` carves the line into
    /// `boundaries.len() + 1` buckets, one palette color each. A value
    /// equal to a boundary falls into the upper bucket.
    Threshold { boundaries: Vec<f64>, colors: Vec<Rgb> },
}

impl ColorScale {
    /// Linear scale over `[min, max]`. Returns `None` for fewer than two
    /// colors; a non-increasing domain is accepted and degenerates to the
    /// first color (empty-dataset case).
    pub fn linear(domain: (f64, f64), colors: Vec<Rgb>) -> Option<Self> {
        if colors.len() < 2 {
            return None;
        }
        Some(Self::Linear { domain, colors })
    }

    /// Threshold scale. Requires one more color than boundaries and
    /// strictly increasing boundaries.
    pub fn threshold(boundaries: Vec<f64>, colors: Vec<Rgb>) -> Option<Self> {
        if colors.is_empty() || colors.len() != boundaries.len() + 1 {
            return None;
        }
        if !boundaries.windows(2).all(|w| w[0] < w[1]) {
            return None;
        }
        Some(Self::Threshold { boundaries, colors })
    }

    /// Build a scale of the given mode from a palette and a data domain.
    /// Threshold boundaries are evenly spaced interior cuts of the domain.
    pub fn for_mode(mode: ScaleMode, domain: (f64, f64), colors: Vec<Rgb>) -> Option<Self> {
        match mode {
            ScaleMode::Linear => Self::linear(domain, colors),
            ScaleMode::Threshold => {
                let (min, max) = domain;
                let cuts = colors.len().checked_sub(1)?;
                if cuts == 0 || max <= min {
                    // Degenerate domain: a single all-encompassing bucket.
                    return Self::threshold(Vec::new(), colors.into_iter().take(1).collect());
                }
                let span = max - min;
                let boundaries = (1..=cuts)
                    .map(|i| min + span * i as f64 / (cuts + 1) as f64)
                    .collect();
                Self::threshold(boundaries, colors)
            }
        }
    }

    /// Evaluate the scale at `value`.
    pub fn color_at(&self, value: f64) -> Rgb {
        match self {
            Self::Linear { domain, colors } => {
                let (min, max) = *domain;
                if !(max > min) || value.is_nan() {
                    return colors[0];
                }
                let t = ((value - min) / (max - min)).clamp(0.0, 1.0);
                let stops = self.stops();
                for window in stops.windows(2) {
                    let (left_pos, left_color) = window[0];
                    let (right_pos, right_color) = window[1];
                    if t >= left_pos && t <= right_pos {
                        let span = (right_pos - left_pos).max(f64::EPSILON);
                        return left_color.lerp(right_color, (t - left_pos) / span);
                    }
                }
                colors[colors.len() - 1]
            }
            Self::Threshold { boundaries, colors } => {
                let bucket = boundaries.iter().take_while(|b| value >= **b).count();
                colors[bucket.min(colors.len() - 1)]
            }
        }
    }

    /// Palette positions normalized to `[0, 1]`: one `(offset, color)` per
    /// palette color for linear scales, one per bucket for threshold.
    pub fn stops(&self) -> Vec<(f64, Rgb)> {
        match self {
            Self::Linear { colors, .. } => {
                let n = colors.len();
                colors
                    .iter()
                    .enumerate()
                    .map(|(i, &c)| (i as f64 / (n - 1).max(1) as f64, c))
                    .collect()
            }
            Self::Threshold { colors, .. } => {
                let n = colors.len();
                colors
                    .iter()
                    .enumerate()
                    .map(|(i, &c)| (i as f64 / n as f64, c))
                    .collect()
            }
        }
    }

    pub fn colors(&self) -> &[Rgb] {
        match self {
            Self::Linear { colors, .. } | Self::Threshold { colors, .. } => colors,
        }
    }
}
