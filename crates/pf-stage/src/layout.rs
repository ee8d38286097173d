//! Queue-slot geometry reported to the presentation layer.

use pf_core::{Point3, StageKind};

use crate::{StageError, StageResult};

/// Where a stage's arrivals appear and where its queue slots lie.
///
/// Slot `i` sits `spacing * i` behind `queue_origin`, against the stage's
/// `forward` direction:
///
/// ```text
/// slot(i) = queue_origin - forward * spacing * i
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueueLayout {
    pub entry_point:  Point3,
    pub queue_origin: Point3,
    /// Unit vector the stage faces.
    pub forward:      Point3,
    pub spacing:      f32,
}

impl Default for QueueLayout {
    fn default() -> Self {
        Self {
            entry_point:  Point3::ORIGIN,
            queue_origin: Point3::ORIGIN,
            forward:      Point3::FORWARD,
            spacing:      1.5,
        }
    }
}

impl QueueLayout {
    /// Build a layout, normalising `forward`.
    ///
    /// Fails for a zero-length direction or a negative / non-finite spacing.
    pub fn new(
        stage:        StageKind,
        entry_point:  Point3,
        queue_origin: Point3,
        forward:      Point3,
        spacing:      f32,
    ) -> StageResult<Self> {
        let forward = forward.normalized().ok_or_else(|| StageError::InvalidLayout {
            stage,
            reason: "queue direction has zero length".into(),
        })?;
        if !spacing.is_finite() || spacing < 0.0 {
            return Err(StageError::InvalidLayout {
                stage,
                reason: format!("queue spacing must be a non-negative number, got {spacing}"),
            });
        }
        Ok(Self { entry_point, queue_origin, forward, spacing })
    }

    /// World position of queue place `place` (0 = head of the line).
    #[inline]
    pub fn slot(&self, place: usize) -> Point3 {
        self.queue_origin - self.forward * (self.spacing * place as f32)
    }
}
