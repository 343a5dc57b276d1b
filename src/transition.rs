use bevy::prelude::*;

/// Snapshot of everything the renderer needs from the camera: where it
/// stands, what it looks at, and its vertical field of view in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_deg: f32,
}

impl CameraPose {
    pub fn new(position: Vec3, target: Vec3, fov_deg: f32) -> Self {
        Self {
            position,
            target,
            fov_deg,
        }
    }
}

pub type Easing = fn(f32) -> f32;

/// Cubic ease-in-out. The exact curve matters for visual parity:
/// e(0) = 0, e(0.5) = 0.5, e(1) = 1, point-symmetric around t = 0.5.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Identifies one started flight; completion is reported against it so a
/// caller can tell its own flight apart from a superseding one.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FlightHandle(u64);

struct Flight {
    handle: FlightHandle,
    from: CameraPose,
    to: CameraPose,
    started_at: f32,
    duration: f32,
    easing: Easing,
}

/// Result of one `step`: the pose to apply this frame, and the handle of the
/// flight that just landed, if any. The handle is reported exactly once.
pub struct FlightStep {
    pub pose: CameraPose,
    pub completed: Option<FlightHandle>,
}

/// Drives timed interpolation of the camera between two poses. At most one
/// flight is active; starting a new one implicitly cancels the old one
/// without reporting its completion.
#[derive(Default)]
pub struct FlightEngine {
    active: Option<Flight>,
    next_handle: u64,
}

impl FlightEngine {
    pub fn start(
        &mut self,
        from: CameraPose,
        to: CameraPose,
        duration: f32,
        easing: Easing,
        now: f32,
    ) -> FlightHandle {
        let handle = FlightHandle(self.next_handle);
        self.next_handle += 1;
        self.active = Some(Flight {
            handle,
            from,
            to,
            started_at: now,
            duration: duration.max(f32::EPSILON),
            easing,
        });
        handle
    }

    /// Cancels the given flight if it is still the active one. Cancellation
    /// never produces a completion notification.
    pub fn cancel(&mut self, handle: FlightHandle) {
        if self.active.as_ref().map(|f| f.handle) == Some(handle) {
            self.active = None;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Advances the active flight to `now`. Position and FOV are lerped
    /// through the eased fraction; the look-at target snaps to the
    /// destination's target every frame, producing a tracking shot rather
    /// than a straight-line pan. Returns `None` when idle.
    pub fn step(&mut self, now: f32) -> Option<FlightStep> {
        let flight = self.active.as_ref()?;
        let t = ((now - flight.started_at) / flight.duration).clamp(0.0, 1.0);
        let e = (flight.easing)(t);

        let pose = CameraPose {
            position: flight.from.position.lerp(flight.to.position, e),
            target: flight.to.target,
            fov_deg: flight.from.fov_deg + (flight.to.fov_deg - flight.from.fov_deg) * e,
        };

        if t >= 1.0 {
            let handle = flight.handle;
            self.active = None;
            Some(FlightStep {
                pose,
                completed: Some(handle),
            })
        } else {
            Some(FlightStep {
                pose,
                completed: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn pose_a() -> CameraPose {
        CameraPose::new(Vec3::new(0.0, 4.0, 15.0), Vec3::ZERO, 65.0)
    }

    fn pose_b() -> CameraPose {
        CameraPose::new(Vec3::new(6.0, 0.0, 0.0), Vec3::new(6.0, 0.0, 0.0), 77.0)
    }

    #[test]
    fn easing_boundary_values() {
        assert!((ease_in_out_cubic(0.0) - 0.0).abs() < EPS);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < EPS);
        assert!((ease_in_out_cubic(1.0) - 1.0).abs() < EPS);
    }

    #[test]
    fn easing_is_point_symmetric() {
        for i in 0..=100 {
            let t = i as f32 / 100.0;
            let lhs = ease_in_out_cubic(t);
            let rhs = 1.0 - ease_in_out_cubic(1.0 - t);
            assert!((lhs - rhs).abs() < 1e-4, "asymmetry at t={t}");
        }
    }

    #[test]
    fn step_lerps_position_and_fov_through_eased_fraction() {
        let mut engine = FlightEngine::default();
        engine.start(pose_a(), pose_b(), 2.0, ease_in_out_cubic, 0.0);

        // Midpoint of an ease-in-out is exactly halfway.
        let step = engine.step(1.0).unwrap();
        let mid = pose_a().position.lerp(pose_b().position, 0.5);
        assert!((step.pose.position - mid).length() < EPS);
        assert!((step.pose.fov_deg - 71.0).abs() < EPS);
        assert!(step.completed.is_none());
    }

    #[test]
    fn look_at_snaps_to_destination_target_immediately() {
        let mut engine = FlightEngine::default();
        engine.start(pose_a(), pose_b(), 2.0, ease_in_out_cubic, 0.0);
        let step = engine.step(0.01).unwrap();
        assert!((step.pose.target - pose_b().target).length() < EPS);
    }

    #[test]
    fn completion_fires_exactly_once() {
        let mut engine = FlightEngine::default();
        let handle = engine.start(pose_a(), pose_b(), 1.0, ease_in_out_cubic, 0.0);

        let step = engine.step(1.5).unwrap();
        assert_eq!(step.completed, Some(handle));
        assert!((step.pose.position - pose_b().position).length() < EPS);

        // Engine is idle afterwards; no further frames are scheduled.
        assert!(!engine.is_active());
        assert!(engine.step(2.0).is_none());
    }

    #[test]
    fn starting_a_new_flight_cancels_the_old_without_completing_it() {
        let mut engine = FlightEngine::default();
        let first = engine.start(pose_a(), pose_b(), 1.0, ease_in_out_cubic, 0.0);
        let second = engine.start(pose_b(), pose_a(), 1.0, ease_in_out_cubic, 0.2);
        assert_ne!(first, second);

        let mut completions = Vec::new();
        for i in 1..=20 {
            if let Some(step) = engine.step(0.2 + i as f32 * 0.1) {
                if let Some(h) = step.completed {
                    completions.push(h);
                }
            }
        }
        assert_eq!(completions, vec![second]);
    }

    #[test]
    fn cancel_silences_the_active_flight() {
        let mut engine = FlightEngine::default();
        let handle = engine.start(pose_a(), pose_b(), 1.0, ease_in_out_cubic, 0.0);
        engine.cancel(handle);
        assert!(!engine.is_active());
        assert!(engine.step(5.0).is_none());
    }

    #[test]
    fn cancel_with_stale_handle_is_ignored() {
        let mut engine = FlightEngine::default();
        let first = engine.start(pose_a(), pose_b(), 1.0, ease_in_out_cubic, 0.0);
        let _second = engine.start(pose_b(), pose_a(), 1.0, ease_in_out_cubic, 0.0);
        engine.cancel(first);
        assert!(engine.is_active());
    }
}
