use crate::color::Rgb;
use crate::scale::ColorScale;

/// One gradient stop for the legend's `<linearGradient>`, with `offset`
/// normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Rgb,
}

/// Stops rendering the scale as a horizontal gradient band. Linear scales
/// produce one smooth stop per palette color; threshold scales produce
/// doubled stops so each bucket is a hard-edged band of equal width.
pub fn gradient_stops(scale: &ColorScale) -> Vec<GradientStop> {
    match scale {
        ColorScale::Linear { .. } => scale
            .stops()
            .into_iter()
            .map(|(offset, color)| GradientStop { offset, color })
            .collect(),
        ColorScale::Threshold { colors, .. } => {
            let n = colors.len();
            let mut stops = Vec::with_capacity(n * 2);
            for (i, &color) in colors.iter().enumerate() {
                stops.push(GradientStop {
                    offset: i as f64 / n as f64,
                    color,
                });
                stops.push(GradientStop {
                    offset: (i + 1) as f64 / n as f64,
                    color,
                });
            }
            stops
        }
    }
}

/// Round tick values spanning `[min, max]`, aiming for roughly `count`
/// ticks with a step snapped to a 1/2/5 × 10^k grid.
pub fn ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() || max < min {
        return Vec::new();
    }
    if max == min {
        return vec![min];
    }

    let step = tick_step(min, max, count.max(1));
    if step <= 0.0 {
        return vec![min, max];
    }

    let start = (min / step).ceil();
    let stop = (max / step).floor();
    let mut out = Vec::new();
    let mut i = start;
    while i <= stop {
        out.push(i * step);
        i += 1.0;
    }
    out
}

fn tick_step(min: f64, max: f64, count: usize) -> f64 {
    let step0 = (max - min) / count as f64;
    let magnitude = 10f64.powf(step0.log10().floor());
    let err = step0 / magnitude;
    // Snap to the 1/2/5 grid, same breakpoints d3's axis uses.
    let factor = if err >= 50f64.sqrt() {
        10.0
    } else if err >= 10f64.sqrt() {
        5.0
    } else if err >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    magnitude * factor
}

/// Compact label for a tick value: integers without a decimal point,
/// everything else with up to two decimals.
pub fn tick_label(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        let s = format!("{value:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
