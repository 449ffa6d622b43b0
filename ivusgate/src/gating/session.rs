//! One-shot gating pipeline over a selected pullback range.
//!
//! Validates the operator's frame range against the contour report,
//! extracts the motion signals from the cropped frames, fuses the two
//! signal families into consensus curves and reconciles their scales.
//! The returned curves are what the host renders; marker editing on top
//! of that plot lives in [`crate::gating::markers`].

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Formatter;

use ivuscore::algorithm::correlation::interframe_correlation;
use ivuscore::algorithm::extrema::ExtremaMode;
use ivuscore::algorithm::fusion::{fuse, reconcile};
use ivuscore::algorithm::sharpness::spectral_blur_scores;
use ivuscore::algorithm::signal::{normalize, smooth};
use ivuscore::data::frame::PullbackFrame;
use ivuscore::data::range::FrameRange;

use crate::gating::config::GatingConfig;
use crate::gating::error::{GatingError, Result};
use crate::gating::markers::MarkerEditor;
use crate::gating::report::ContourReport;

/// Coarse pipeline progress, delivered to the host's status surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProgressStage {
    PreparingData,
    ExtractingSignals,
    FusingSignals,
    Ready,
}

impl fmt::Display for ProgressStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ProgressStage::PreparingData => write!(f, "preparing gating data"),
            ProgressStage::ExtractingSignals => write!(f, "extracting frame signals"),
            ProgressStage::FusingSignals => write!(f, "fusing signals"),
            ProgressStage::Ready => write!(f, "gating curves ready"),
        }
    }
}

/// Curves handed to the rendering collaborator, all aligned with
/// `frame_numbers` on the x axis.
///
/// `motion` and `geometry` are the two reconciled consensus curves; the
/// three geometry component curves are included for the operator's
/// reference plot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatingDisplay {
    pub frame_numbers: Vec<u32>,
    pub motion: Vec<f64>,
    pub geometry: Vec<f64>,
    pub shortest_distance: Vec<f64>,
    pub vector_angle: Vec<f64>,
    pub vector_length: Vec<f64>,
}

/// A single gating pass over one pullback.
///
/// The session owns its configuration and an optional progress observer;
/// all signal artifacts are recomputed from scratch on every [`run`]
/// (no incremental state).
///
/// [`run`]: GatingSession::run
pub struct GatingSession {
    config: GatingConfig,
    progress: Option<Box<dyn Fn(ProgressStage)>>,
}

impl GatingSession {
    pub fn new(config: GatingConfig) -> Self {
        GatingSession {
            config,
            progress: None,
        }
    }

    /// Registers an observer for coarse progress stages. The callback
    /// runs synchronously on the gating thread and must not block.
    pub fn with_progress(mut self, observer: impl Fn(ProgressStage) + 'static) -> Self {
        self.progress = Some(Box::new(observer));
        self
    }

    pub fn config(&self) -> &GatingConfig {
        &self.config
    }

    /// Marker editor for the gated range, with the selection radius from
    /// this session's configuration.
    pub fn marker_editor(&self, range: &FrameRange) -> MarkerEditor {
        MarkerEditor::for_range(range, self.config.sensitivity_divisor)
    }

    /// Runs the full pipeline for `range`.
    ///
    /// # Arguments
    ///
    /// * `frames` - the whole pullback, frame 1 first.
    /// * `report` - contour geometry rows from the report collaborator.
    /// * `range` - the intramural sub-range to gate.
    ///
    /// # Errors
    ///
    /// Precondition failures ([`GatingError::EmptyRange`],
    /// [`GatingError::RangeOutOfBounds`],
    /// [`GatingError::MissingContours`]) abort before any signal
    /// extraction; no partial state is produced.
    pub fn run(
        &self,
        frames: &[PullbackFrame],
        report: &ContourReport,
        range: FrameRange,
    ) -> Result<GatingDisplay> {
        self.stage(ProgressStage::PreparingData);

        if range.is_empty() {
            return Err(GatingError::EmptyRange {
                lower: range.lower,
                upper: range.upper,
            });
        }
        if range.upper > frames.len() {
            return Err(GatingError::RangeOutOfBounds {
                upper: range.upper,
                frame_count: frames.len(),
            });
        }
        let records = report.select_range(&range)?;

        let cropped: Vec<PullbackFrame> = frames[range.lower..range.upper]
            .iter()
            .map(|frame| frame.crop(&self.config.crop))
            .collect();

        self.stage(ProgressStage::ExtractingSignals);
        let correlation = normalize(&interframe_correlation(&cropped));
        let blurring = normalize(&spectral_blur_scores(&cropped));
        let shortest_distance =
            normalize(&records.iter().map(|r| r.shortest_distance).collect::<Vec<f64>>());
        let vector_angle =
            normalize(&records.iter().map(|r| r.vector_angle).collect::<Vec<f64>>());
        let vector_length =
            normalize(&records.iter().map(|r| r.vector_length).collect::<Vec<f64>>());

        let window = self.config.smoothing_window;
        let motion_inputs = vec![smooth(&correlation, window), smooth(&blurring, window)];
        let geometry_inputs = vec![
            smooth(&shortest_distance, window),
            smooth(&vector_angle, window),
            smooth(&vector_length, window),
        ];

        self.stage(ProgressStage::FusingSignals);
        let motion = fuse(&motion_inputs, self.config.motion_window, ExtremaMode::MaximaOnly);
        let geometry = fuse(&geometry_inputs, self.config.geometry_window, ExtremaMode::All);
        let (motion, geometry) = reconcile(&motion, &geometry);

        self.stage(ProgressStage::Ready);
        let mut components = geometry_inputs.into_iter();
        Ok(GatingDisplay {
            frame_numbers: range.frame_numbers(),
            motion,
            geometry,
            shortest_distance: components.next().unwrap_or_default(),
            vector_angle: components.next().unwrap_or_default(),
            vector_length: components.next().unwrap_or_default(),
        })
    }

    fn stage(&self, stage: ProgressStage) {
        debug!("{stage}");
        if let Some(observer) = &self.progress {
            observer(stage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use ivuscore::algorithm::extrema::local_maxima;
    use ivuscore::algorithm::fusion::fusion_weights;
    use ivuscore::data::frame::CropRegion;

    use crate::gating::report::ContourRecord;

    const FRAME_SIZE: usize = 24;
    const PERIOD: f64 = 10.0;

    fn test_config() -> GatingConfig {
        GatingConfig {
            // the synthetic frames are 24x24, keep a 20x20 center
            crop: CropRegion::new(2, 22, 2, 22),
            ..GatingConfig::default()
        }
    }

    /// Pullback whose frames mix a static low-frequency base with
    /// high-frequency detail whose amplitude beats at `PERIOD` frames,
    /// so correlation and sharpness both oscillate at the cardiac rate.
    fn synthetic_frames(n: usize) -> Vec<PullbackFrame> {
        (0..n)
            .map(|i| {
                let amplitude = 1.0 + 0.5 * (TAU * i as f64 / PERIOD).sin();
                let pixels = (0..FRAME_SIZE * FRAME_SIZE)
                    .map(|p| {
                        let row = (p / FRAME_SIZE) as f64;
                        let col = (p % FRAME_SIZE) as f64;
                        let base = (0.2 * row).sin() + (0.15 * col).cos();
                        let detail = if (p / FRAME_SIZE + p % FRAME_SIZE) % 2 == 0 {
                            1.0
                        } else {
                            -1.0
                        };
                        base + amplitude * 0.8 * detail
                    })
                    .collect();
                PullbackFrame::new(i as u32 + 1, FRAME_SIZE, FRAME_SIZE, pixels)
            })
            .collect()
    }

    /// Report whose geometry columns oscillate at `PERIOD` frames with
    /// per-column phase jitter: the distance column is nearly clean, the
    /// angle and length columns are noisy.
    fn jittered_report(n: usize) -> ContourReport {
        let mut rng = StdRng::seed_from_u64(7);
        let mut column = |scale: f64| -> Vec<f64> {
            (0..n)
                .map(|i| {
                    let jitter: f64 = rng.gen_range(-scale..=scale);
                    (TAU * (i as f64 + jitter) / PERIOD).sin()
                })
                .collect::<Vec<f64>>()
        };
        let distance = column(0.3);
        let angle = column(2.5);
        let length = column(3.0);

        ContourReport::new(
            (0..n)
                .map(|i| ContourRecord {
                    frame: i as u32 + 1,
                    shortest_distance: distance[i],
                    vector_angle: angle[i],
                    vector_length: length[i],
                })
                .collect(),
        )
    }

    #[test]
    fn test_missing_contours_abort_the_pass() {
        let frames = synthetic_frames(50);
        let records = (0..50)
            .filter(|&i| i != 11) // frame 12 has no contour
            .map(|i| ContourRecord {
                frame: i as u32 + 1,
                shortest_distance: 1.0,
                vector_angle: 1.0,
                vector_length: 1.0,
            })
            .collect();
        let report = ContourReport::new(records);

        let session = GatingSession::new(test_config());
        let error = session
            .run(&frames, &report, FrameRange::new(0, 50))
            .unwrap_err();
        match error {
            GatingError::MissingContours { frames } => assert_eq!(frames, vec![12]),
            other => panic!("expected MissingContours, got {other}"),
        }
    }

    #[test]
    fn test_range_validation() {
        let frames = synthetic_frames(10);
        let report = jittered_report(10);
        let session = GatingSession::new(test_config());

        assert!(matches!(
            session.run(&frames, &report, FrameRange::new(5, 5)),
            Err(GatingError::EmptyRange { .. })
        ));
        assert!(matches!(
            session.run(&frames, &report, FrameRange::new(0, 11)),
            Err(GatingError::RangeOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_progress_stages_in_order() {
        let frames = synthetic_frames(30);
        let report = jittered_report(30);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let session = GatingSession::new(test_config())
            .with_progress(move |stage| sink.borrow_mut().push(stage));

        session
            .run(&frames, &report, FrameRange::new(0, 30))
            .unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![
                ProgressStage::PreparingData,
                ProgressStage::ExtractingSignals,
                ProgressStage::FusingSignals,
                ProgressStage::Ready,
            ]
        );
    }

    #[test]
    fn test_end_to_end_gating() {
        let frames = synthetic_frames(100);
        let report = jittered_report(100);
        let session = GatingSession::new(test_config());

        let display = session
            .run(&frames, &report, FrameRange::new(0, 100))
            .unwrap();

        assert_eq!(display.frame_numbers.len(), 100);
        assert_eq!(display.frame_numbers[0], 1);
        assert_eq!(display.motion.len(), 100);
        assert_eq!(display.geometry.len(), 100);
        assert!(display.motion.iter().all(|v| v.is_finite()));
        assert!(display.geometry.iter().all(|v| v.is_finite()));

        // both consensus curves carry signal: non-constant, with
        // repeated interior maxima from the beating amplitude
        let motion_maxima = local_maxima(&display.motion);
        assert!(
            motion_maxima.len() >= 5,
            "expected oscillating motion consensus, got maxima {motion_maxima:?}"
        );
        let geometry_maxima = local_maxima(&display.geometry);
        assert!(
            geometry_maxima.len() >= 5,
            "expected oscillating geometry consensus, got maxima {geometry_maxima:?}"
        );

        // the least-jittered geometry column should carry the largest
        // fusion weight
        let components = vec![
            display.shortest_distance.clone(),
            display.vector_angle.clone(),
            display.vector_length.clone(),
        ];
        let weights = fusion_weights(
            &components,
            session.config().geometry_window,
            ExtremaMode::All,
        );
        let distance_weight = weights[0].expect("distance column should be weighted");
        for other in &weights[1..] {
            let other = other.expect("jittered columns still produce extrema");
            assert!(
                distance_weight > other,
                "distance weight {distance_weight} should dominate {other}"
            );
        }
    }

    #[test]
    fn test_marker_editor_uses_session_sensitivity() {
        let session = GatingSession::new(test_config());
        let mut editor = session.marker_editor(&FrameRange::new(0, 200));

        // 200 gated frames: radius 2, so a press 1.5 away selects
        editor.handle(crate::gating::markers::PointerEvent::ButtonDown { x: 100.0 });
        let action = editor.handle(crate::gating::markers::PointerEvent::ButtonDown { x: 101.5 });
        assert!(matches!(
            action,
            crate::gating::markers::MarkerAction::Selected { marker: 0, .. }
        ));
    }
}
