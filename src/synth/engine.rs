//! Per-editor synthesis engine.
//!
//! One engine instance serves one editor. It owns the only mutable state of
//! the pipeline: whether a cycle is in flight, the id of the last stroke it
//! handled and whether it has been disposed.
//!
//! A cycle moves `Idle → Analyzing → Idle`. A completion that arrives while
//! another cycle is analyzing is dropped, not queued, and its stroke stays
//! hand-drawn.

use std::cell::Cell;

use crate::errors::{ClassifierError, HostError};
use crate::label::ShapeLabel;
use crate::log::{debug, info, warn};
use crate::recognize::{RecognitionResult, Recognizer};
use crate::types::{Confidence, Point};

use super::host::{Binding, EditorHost, Terminal};
use super::shapes::{ShapeGeometry, ShapeKind};
use super::snap::{SnapMatch, closest_alignment, nearest_anchor};
use super::{ShapeId, SynthConfig, synthesize};

/// A freehand stroke the host just finished drawing
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedStroke {
    /// Id of the freehand shape holding the stroke
    pub id: ShapeId,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Analyzing,
}

/// Why a recognized stroke was left as drawn
#[derive(Debug)]
pub enum RejectReason {
    Unrecognized,
    BelowThreshold { label: ShapeLabel, confidence: Confidence },
    /// The label has no vector counterpart
    NoReplacement(ShapeLabel),
    Recognizer(ClassifierError),
    /// The host refused a command; everything since the mark was undone
    Host(HostError),
}

/// What the engine committed in place of a stroke
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    pub id: ShapeId,
    pub shape: ShapeKind,
    pub label: ShapeLabel,
    pub confidence: Confidence,
    pub bindings: Vec<Binding>,
    /// Neighbour the shape was nudged onto, if any
    pub aligned_to: Option<ShapeId>,
}

#[derive(Debug)]
pub enum StrokeOutcome {
    /// The stroke was replaced
    Accepted(Replacement),
    /// The stroke was kept
    Rejected(RejectReason),
    /// Another cycle was in flight
    Dropped,
    /// This stroke id was already handled
    Duplicate,
    /// The engine was disposed before the cycle could touch the host
    Cancelled,
}

impl StrokeOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, StrokeOutcome::Accepted(_))
    }
}

/// Holds the engine in `Analyzing` and returns it to `Idle` when dropped
struct AnalysisGuard<'a> {
    state: &'a Cell<EngineState>,
}

impl<'a> AnalysisGuard<'a> {
    fn enter(state: &'a Cell<EngineState>) -> Option<Self> {
        if state.get() == EngineState::Analyzing {
            return None;
        }
        state.set(EngineState::Analyzing);
        Some(Self { state })
    }
}

impl Drop for AnalysisGuard<'_> {
    fn drop(&mut self) {
        self.state.set(EngineState::Idle);
    }
}

/// A binding decided before the shape exists
struct PendingBinding {
    terminal: Terminal,
    snap: SnapMatch,
}

pub struct SynthesisEngine {
    config: SynthConfig,
    state: Cell<EngineState>,
    last_stroke: Cell<Option<ShapeId>>,
    disposed: Cell<bool>,
}

impl SynthesisEngine {
    pub fn new(config: SynthConfig) -> Self {
        Self {
            config,
            state: Cell::new(EngineState::Idle),
            last_stroke: Cell::new(None),
            disposed: Cell::new(false),
        }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state.get()
    }

    /// Stop all current and future cycles from mutating the host
    pub fn dispose(&self) {
        self.disposed.set(true);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Recognize `stroke` and, when confident enough, replace it on `host`.
    pub async fn complete_stroke<H, R>(&self, host: &H, stroke: &CompletedStroke, recognizer: &R) -> StrokeOutcome
    where
        H: EditorHost,
        R: Recognizer + ?Sized,
    {
        if self.disposed.get() {
            return StrokeOutcome::Cancelled;
        }
        if self.last_stroke.get() == Some(stroke.id) {
            debug!(stroke = %stroke.id, "stroke already processed");
            return StrokeOutcome::Duplicate;
        }
        let Some(_guard) = AnalysisGuard::enter(&self.state) else {
            debug!(stroke = %stroke.id, "analysis in flight, dropping stroke");
            return StrokeOutcome::Dropped;
        };

        // A failed recognition leaves the stroke open for a retry with another recognizer
        let result = match recognizer.recognize(&stroke.points).await {
            Ok(result) => result,
            Err(err) => {
                warn!(stroke = %stroke.id, %err, "recognition failed");
                return StrokeOutcome::Rejected(RejectReason::Recognizer(err));
            }
        };
        self.last_stroke.set(Some(stroke.id));
        if self.disposed.get() {
            debug!(stroke = %stroke.id, "engine disposed during analysis");
            return StrokeOutcome::Cancelled;
        }
        self.apply(host, stroke, &result)
    }

    /// Gate `result` and commit its replacement shape, synchronously.
    pub fn apply<H: EditorHost>(&self, host: &H, stroke: &CompletedStroke, result: &RecognitionResult) -> StrokeOutcome {
        if self.disposed.get() {
            return StrokeOutcome::Cancelled;
        }
        if result.is_unknown() {
            return StrokeOutcome::Rejected(RejectReason::Unrecognized);
        }
        if !result.confidence.exceeds(self.config.confidence_threshold) {
            debug!(label = %result.name, confidence = %result.confidence, "below confidence threshold");
            return StrokeOutcome::Rejected(RejectReason::BelowThreshold {
                label: result.name,
                confidence: result.confidence,
            });
        }
        let Some(mut shape) = synthesize(result.name, &stroke.points) else {
            return StrokeOutcome::Rejected(RejectReason::NoReplacement(result.name));
        };

        let zoom = host.zoom();
        let others = host.shapes();
        let mut pending = Vec::new();
        let mut aligned_to = None;

        if let Some((start, end)) = shape.endpoints_mut() {
            let radius = zoom.screen_to_page(self.config.snap_distance_px);
            for (terminal, endpoint) in [(Terminal::Start, start), (Terminal::End, end)] {
                if let Some(snap) = nearest_anchor(*endpoint, &others, stroke.id, radius) {
                    *endpoint = snap.position;
                    pending.push(PendingBinding { terminal, snap });
                }
            }
        } else {
            let radius = zoom.screen_to_page(self.config.align_distance_px);
            if let Some(alignment) = closest_alignment(&shape, &others, stroke.id, radius) {
                shape.translate(alignment.offset);
                aligned_to = Some(alignment.target);
            }
        }

        match commit(host, stroke.id, &shape, &pending) {
            Ok((id, bindings)) => {
                info!(stroke = %stroke.id, shape = %id, label = %result.name, bindings = bindings.len(), "stroke replaced");
                StrokeOutcome::Accepted(Replacement {
                    id,
                    shape,
                    label: result.name,
                    confidence: result.confidence,
                    bindings,
                    aligned_to,
                })
            }
            Err(err) => StrokeOutcome::Rejected(RejectReason::Host(err)),
        }
    }
}

impl Default for SynthesisEngine {
    fn default() -> Self {
        Self::new(SynthConfig::default())
    }
}

/// Create the shape and its bindings, then delete the original stroke. Any
/// failure rolls the host back to where it was.
fn commit<H: EditorHost>(
    host: &H,
    original: ShapeId,
    shape: &ShapeKind,
    pending: &[PendingBinding],
) -> Result<(ShapeId, Vec<Binding>), HostError> {
    let mark = host.mark();
    let attempt = || -> Result<(ShapeId, Vec<Binding>), HostError> {
        let id = host.create_shape(shape)?;
        let mut bindings = Vec::with_capacity(pending.len());
        for p in pending {
            let binding = Binding {
                from: id,
                to: p.snap.target,
                terminal: p.terminal,
                anchor: p.snap.anchor,
            };
            host.create_binding(&binding)?;
            bindings.push(binding);
        }
        host.delete_shape(original)?;
        Ok((id, bindings))
    };
    attempt().inspect_err(|err| {
        warn!(stroke = %original, %err, "shape creation failed, rolling back");
        host.bail_to_mark(mark);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_resets_state_on_drop() {
        let state = Cell::new(EngineState::Idle);
        {
            let _guard = AnalysisGuard::enter(&state).unwrap();
            assert_eq!(state.get(), EngineState::Analyzing);
            assert!(AnalysisGuard::enter(&state).is_none());
        }
        assert_eq!(state.get(), EngineState::Idle);
    }

    #[test]
    fn outcome_accepted_helper() {
        assert!(!StrokeOutcome::Dropped.is_accepted());
        assert!(!StrokeOutcome::Rejected(RejectReason::Unrecognized).is_accepted());
    }
}
