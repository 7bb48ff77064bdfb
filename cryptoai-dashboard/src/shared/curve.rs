//! Decorative pattern curves
//!
//! Each pattern gets a piecewise shape around the base price plus a little
//! uniform noise. The breakpoints are defined on a 50-step reference frame
//! and rescaled, so a curve keeps its shape at any point count.

use super::random::RandomSource;
use super::types::{CurvePoint, PatternKind};

/// Number of steps the piecewise breakpoints are tuned for
pub const REFERENCE_STEPS: f64 = 50.0;

/// Default resolution of the pattern canvases
pub const DEFAULT_CURVE_POINTS: usize = 50;

/// Default length of the card trend series
pub const DEFAULT_TREND_POINTS: usize = 25;

/// Synthesize a pattern curve around `base_price`
///
/// `None` (an unrecognised label) falls back to a generic noisy sinusoid, as
/// do the patterns without a dedicated shape.
pub fn synthesize_curve<R: RandomSource + ?Sized>(
    rng: &mut R,
    base_price: f64,
    pattern: Option<PatternKind>,
    point_count: usize,
    width: f64,
) -> Vec<CurvePoint> {
    if point_count == 0 {
        return Vec::new();
    }

    let n = point_count as f64;
    let b = base_price;

    (0..point_count)
        .map(|i| {
            let fraction = i as f64 / n;
            let s = i as f64 * REFERENCE_STEPS / n;

            let mut y = match pattern {
                Some(PatternKind::HeadAndShoulders) => {
                    let offset = if s < 15.0 {
                        (s * 0.4).sin() * b * 0.10
                    } else if s < 35.0 {
                        ((s - 15.0) * 0.3).sin() * b * 0.15
                    } else {
                        ((s - 35.0) * 0.4).sin() * b * 0.08
                    };
                    b + offset
                }
                Some(PatternKind::CupAndHandle) => {
                    let offset = if s < 30.0 {
                        -((s - 15.0) / 15.0).powi(2) * b * 0.10
                    } else if s < 45.0 {
                        -b * 0.02
                    } else {
                        (s - 45.0) * b * 0.01
                    };
                    b + offset
                }
                Some(PatternKind::AscendingTriangle) => {
                    let resistance = b * 1.05;
                    let support = b * (1.0 + fraction * 0.03);
                    support + (s * 0.3).sin() * (resistance - support) * 0.5
                }
                Some(PatternKind::DoubleBottom) => {
                    let offset = if s < 20.0 {
                        -(s * 0.3).sin() * b * 0.08
                    } else if s < 30.0 {
                        (s - 20.0) * b * 0.005
                    } else if s < 40.0 {
                        -((s - 30.0) * 0.3).sin() * b * 0.08
                    } else {
                        (s - 40.0) * b * 0.01
                    };
                    b + offset
                }
                Some(PatternKind::BullishFlag) => {
                    if s < 20.0 {
                        b + s * b * 0.01
                    } else if s < 40.0 {
                        b * 1.2 - (s - 20.0) * b * 0.005
                    } else {
                        b + (s - 40.0) * b * 0.015
                    }
                }
                _ => b + (s * 0.2).sin() * b * 0.05 + (rng.unit() - 0.5) * b * 0.02,
            };

            y += (rng.unit() - 0.5) * b * 0.01;

            CurvePoint {
                x: fraction * width,
                price: y.max(0.0),
            }
        })
        .collect()
}

/// Noisy series for the card mini charts, independent of the pattern curve
pub fn trend_series<R: RandomSource + ?Sized>(rng: &mut R, base_price: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|_| (base_price + (rng.unit() - 0.5) * base_price * 0.05).max(0.0))
        .collect()
}

/// Vertical extent of a curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveBounds {
    pub min: f64,
    pub max: f64,
}

impl CurveBounds {
    /// Bounds of the given points; flat or empty series get a unit-wide range
    pub fn of(points: &[CurvePoint]) -> Self {
        let (min, max) = points
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.price), hi.max(p.price)));

        if points.is_empty() {
            return Self { min: 0.0, max: 1.0 };
        }
        if max - min <= f64::EPSILON {
            let pad = (min.abs() * 0.01).max(1.0);
            return Self {
                min: min - pad,
                max: max + pad,
            };
        }
        Self { min, max }
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Bounds grown by `fraction` of the range on both sides
    pub fn padded(&self, fraction: f64) -> Self {
        let pad = self.range() * fraction;
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }
}

/// Annotation drawn on top of a pattern curve
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayShape {
    /// Straight segment between two (x, price) points
    Segment {
        from: (f64, f64),
        to: (f64, f64),
        dashed: bool,
    },
    /// Lower half of a circle, radius in x units
    HalfCircle {
        center: (f64, f64),
        radius: f64,
    },
    Label {
        at: (f64, f64),
        text: &'static str,
    },
}

/// Point at `fraction` of the series, clamped to the last point
fn point_at(points: &[CurvePoint], fraction: f64) -> Option<CurvePoint> {
    let last = points.len().checked_sub(1)?;
    let index = ((points.len() as f64 * fraction).round() as usize).min(last);
    points.get(index).copied()
}

/// Annotations for patterns that have one
pub fn pattern_overlay(points: &[CurvePoint], pattern: PatternKind, width: f64) -> Vec<OverlayShape> {
    if points.is_empty() {
        return Vec::new();
    }

    match pattern {
        PatternKind::HeadAndShoulders => {
            let (Some(left), Some(right), Some(head)) = (
                point_at(points, 0.2),
                point_at(points, 0.8),
                point_at(points, 0.5),
            ) else {
                return Vec::new();
            };
            vec![
                OverlayShape::Segment {
                    from: (left.x, left.price),
                    to: (right.x, left.price),
                    dashed: true,
                },
                OverlayShape::Label {
                    at: (head.x, head.price),
                    text: "Head",
                },
            ]
        }
        PatternKind::AscendingTriangle => {
            let bounds = CurveBounds::of(points);
            let resistance = bounds.max * 0.98;
            let first = points[0];
            vec![
                OverlayShape::Segment {
                    from: (0.0, resistance),
                    to: (width, resistance),
                    dashed: true,
                },
                OverlayShape::Segment {
                    from: (0.0, first.price),
                    to: (width, resistance),
                    dashed: true,
                },
            ]
        }
        PatternKind::CupAndHandle => match point_at(points, 0.3) {
            Some(rim) => vec![OverlayShape::HalfCircle {
                center: (width * 0.4, rim.price),
                radius: width * 0.2,
            }],
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::random::{FixedSequence, SystemRandom};

    /// u = 0.5 cancels every noise term
    fn neutral() -> FixedSequence {
        FixedSequence::constant(0.5)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_point_count_and_x_scaling() {
        let points = synthesize_curve(&mut neutral(), 100.0, None, 50, 360.0);
        assert_eq!(points.len(), 50);
        assert_eq!(points[0].x, 0.0);
        assert!(approx(points[25].x, 180.0));
        assert!(points.iter().all(|p| p.x < 360.0));

        assert!(synthesize_curve(&mut neutral(), 100.0, None, 0, 360.0).is_empty());
    }

    #[test]
    fn test_cup_and_handle_shape() {
        let points = synthesize_curve(&mut neutral(), 1_000.0, Some(PatternKind::CupAndHandle), 50, 50.0);
        // Cup rims and bottom
        assert!(approx(points[0].price, 900.0));
        assert!(approx(points[15].price, 1_000.0));
        // Handle is flat
        assert!(approx(points[30].price, 980.0));
        assert!(approx(points[44].price, 980.0));
        // Breakout rises linearly
        assert!(approx(points[49].price, 1_040.0));
    }

    #[test]
    fn test_bullish_flag_shape() {
        let points = synthesize_curve(&mut neutral(), 100.0, Some(PatternKind::BullishFlag), 50, 50.0);
        assert!(approx(points[10].price, 110.0));
        assert!(approx(points[20].price, 120.0));
        assert!(approx(points[30].price, 115.0));
        assert!(approx(points[45].price, 107.5));
    }

    #[test]
    fn test_ascending_triangle_starts_at_base() {
        let points = synthesize_curve(&mut neutral(), 200.0, Some(PatternKind::AscendingTriangle), 50, 50.0);
        assert!(approx(points[0].price, 200.0));
        // Never above resistance
        assert!(points.iter().all(|p| p.price <= 210.0 + 1e-9));
    }

    #[test]
    fn test_double_bottom_has_two_dips() {
        let points = synthesize_curve(&mut neutral(), 100.0, Some(PatternKind::DoubleBottom), 50, 50.0);
        assert!(points[5].price < 100.0);
        assert!(points[35].price < 100.0);
        assert!(approx(points[25].price, 102.5));
    }

    #[test]
    fn test_shape_survives_resolution_change() {
        let coarse = synthesize_curve(&mut neutral(), 100.0, Some(PatternKind::BullishFlag), 50, 50.0);
        let fine = synthesize_curve(&mut neutral(), 100.0, Some(PatternKind::BullishFlag), 100, 50.0);
        assert!(approx(coarse[20].price, fine[40].price));
    }

    #[test]
    fn test_noise_is_bounded() {
        let mut rng = SystemRandom::seeded(11);
        for pattern in [Some(PatternKind::CupAndHandle), Some(PatternKind::BullishFlag)] {
            let noisy = synthesize_curve(&mut rng, 1_000.0, pattern, 50, 100.0);
            let clean = synthesize_curve(&mut neutral(), 1_000.0, pattern, 50, 100.0);
            for (a, b) in noisy.iter().zip(clean.iter()) {
                assert!((a.price - b.price).abs() <= 1_000.0 * 0.01);
            }
        }
    }

    #[test]
    fn test_generic_shape_for_unshaped_patterns() {
        let generic = synthesize_curve(&mut neutral(), 100.0, None, 50, 50.0);
        let double_top = synthesize_curve(&mut neutral(), 100.0, Some(PatternKind::DoubleTop), 50, 50.0);
        assert_eq!(generic, double_top);
        assert!(approx(generic[0].price, 100.0));
    }

    #[test]
    fn test_trend_series_range() {
        let mut rng = SystemRandom::seeded(5);
        let series = trend_series(&mut rng, 4_000.0, 25);
        assert_eq!(series.len(), 25);
        assert!(series.iter().all(|p| (3_900.0..=4_100.0).contains(p)));
    }

    #[test]
    fn test_bounds_of_flat_series() {
        let points = vec![CurvePoint { x: 0.0, price: 50.0 }, CurvePoint { x: 1.0, price: 50.0 }];
        let bounds = CurveBounds::of(&points);
        assert!(bounds.range() > 0.0);
        assert!(bounds.min < 50.0 && bounds.max > 50.0);

        assert_eq!(CurveBounds::of(&[]), CurveBounds { min: 0.0, max: 1.0 });
    }

    #[test]
    fn test_head_and_shoulders_overlay() {
        let points = synthesize_curve(&mut neutral(), 100.0, Some(PatternKind::HeadAndShoulders), 50, 360.0);
        let overlay = pattern_overlay(&points, PatternKind::HeadAndShoulders, 360.0);
        assert_eq!(overlay.len(), 2);
        match &overlay[0] {
            OverlayShape::Segment { from, to, dashed } => {
                assert!(*dashed);
                assert_eq!(from.1, to.1);
                assert!(approx(from.0, points[10].x));
                assert!(approx(to.0, points[40].x));
            }
            other => panic!("unexpected shape {other:?}"),
        }
        assert!(pattern_overlay(&points, PatternKind::BearishFlag, 360.0).is_empty());
    }

    #[test]
    fn test_cup_overlay_is_centered() {
        let points = synthesize_curve(&mut neutral(), 100.0, Some(PatternKind::CupAndHandle), 50, 200.0);
        let overlay = pattern_overlay(&points, PatternKind::CupAndHandle, 200.0);
        assert_eq!(
            overlay,
            vec![OverlayShape::HalfCircle {
                center: (80.0, points[15].price),
                radius: 40.0,
            }]
        );
    }
}
