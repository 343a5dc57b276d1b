use bevy::prelude::*;

use crate::channel::SignalHub;
use crate::registry::{OrbitBody, SectionId};
use crate::transition::{ease_in_out_cubic, CameraPose, FlightEngine, FlightHandle};
use crate::MainCamera;

pub const APPROACH_SECS: f32 = 1.2;
pub const RETURN_SECS: f32 = 1.0;
/// Applied when no camera collaborator exists: the state transition still
/// happens after this short delay instead of stranding the session.
pub const FALLBACK_SECS: f32 = 0.1;

const FOV_WIDEN_DEG: f32 = 12.0;
const FOV_MAX_DEG: f32 = 85.0;
const PULLBACK_FACTOR: f32 = 1.6;
const PULLBACK_MIN: f32 = 0.8;

pub const HOME_POSITION: Vec3 = Vec3::new(0.0, 4.0, 15.0);

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum NavMode {
    #[default]
    Orbiting,
    Approaching,
    Interior,
    Returning,
}

/// Signals carried on the hub between the 3D layer and the overlay layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NavSignal {
    ActiveBodyChanged(Option<SectionId>),
    ExitRequested,
}

/// Where the approach flight parks: offset from the body along the line from
/// the camera, pulled back by a safety distance, with the FOV slightly
/// widened for the dive.
pub fn approach_pose(cam: &CameraPose, body: &OrbitBody, world_pos: Vec3) -> CameraPose {
    let dir = (world_pos - cam.position).normalize_or_zero();
    let pullback = (body.size * PULLBACK_FACTOR).max(PULLBACK_MIN);
    CameraPose {
        position: world_pos - dir * pullback,
        target: world_pos,
        fov_deg: (cam.fov_deg + FOV_WIDEN_DEG).min(FOV_MAX_DEG),
    }
}

/// The navigation session: one explicitly owned state machine per UI
/// surface. Holds the current mode, the active body, and the flight engine
/// that owns the camera while a transition is in flight.
pub struct NavMachine {
    mode: NavMode,
    active: Option<SectionId>,
    home: CameraPose,
    engine: FlightEngine,
    flight: Option<FlightHandle>,
    fallback_at: Option<f32>,
}

impl NavMachine {
    pub fn new(home: CameraPose) -> Self {
        Self {
            mode: NavMode::Orbiting,
            active: None,
            home,
            engine: FlightEngine::default(),
            flight: None,
            fallback_at: None,
        }
    }

    pub fn mode(&self) -> NavMode {
        self.mode
    }

    pub fn active_body(&self) -> Option<SectionId> {
        self.active
    }

    pub fn home(&self) -> CameraPose {
        self.home
    }

    /// The responsive layer re-targets home when the breakpoint changes.
    pub fn set_home(&mut self, home: CameraPose) {
        self.home = home;
    }

    /// User pick on a body. Accepted only while `Orbiting`; anywhere else it
    /// is an idempotent ignore, not an error. `camera` is `None` when the
    /// render collaborator is not ready yet, in which case the session still
    /// reaches `Interior` after a fixed short delay.
    pub fn pick(
        &mut self,
        body: &OrbitBody,
        world_pos: Vec3,
        camera: Option<CameraPose>,
        now: f32,
    ) {
        if self.mode != NavMode::Orbiting {
            debug!("pick({}) ignored while {:?}", body.id.key(), self.mode);
            return;
        }
        self.active = Some(body.id);
        self.mode = NavMode::Approaching;
        match camera {
            Some(cam) => {
                let to = approach_pose(&cam, body, world_pos);
                self.flight = Some(
                    self.engine
                        .start(cam, to, APPROACH_SECS, ease_in_out_cubic, now),
                );
            }
            None => {
                debug!("no camera collaborator; skipping approach animation");
                self.fallback_at = Some(now + FALLBACK_SECS);
            }
        }
        info!("approaching {}", body.id.key());
    }

    /// Leaves the interior view. All three triggers (overlay control, Escape,
    /// external signal) land here; calls outside `Interior` are idempotent
    /// ignores.
    pub fn exit(&mut self, camera: Option<CameraPose>, now: f32, hub: &SignalHub<NavSignal>) {
        if self.mode != NavMode::Interior {
            debug!("exit ignored while {:?}", self.mode);
            return;
        }
        // Published before the reverse flight even starts: the overlay clears
        // the moment intent-to-leave registers, not when the camera lands.
        hub.publish(&NavSignal::ActiveBodyChanged(None));
        self.mode = NavMode::Returning;
        match camera {
            Some(cam) => {
                self.flight = Some(self.engine.start(
                    cam,
                    self.home,
                    RETURN_SECS,
                    ease_in_out_cubic,
                    now,
                ));
            }
            None => {
                self.fallback_at = Some(now + FALLBACK_SECS);
            }
        }
        info!("returning to orbit");
    }

    /// Per-frame step. Returns the camera pose to apply this frame, or `None`
    /// while the engine is idle (free orbit or interior rest).
    pub fn tick(&mut self, now: f32, hub: &SignalHub<NavSignal>) -> Option<CameraPose> {
        if let Some(deadline) = self.fallback_at {
            if now >= deadline {
                self.fallback_at = None;
                self.finish_leg(hub);
            }
            return None;
        }
        let step = self.engine.step(now)?;
        if let Some(handle) = step.completed {
            if self.flight == Some(handle) {
                self.flight = None;
                self.finish_leg(hub);
            }
        }
        Some(step.pose)
    }

    fn finish_leg(&mut self, hub: &SignalHub<NavSignal>) {
        match self.mode {
            NavMode::Approaching => {
                self.mode = NavMode::Interior;
                hub.publish(&NavSignal::ActiveBodyChanged(self.active));
                info!(
                    "inside {}",
                    self.active.map(|s| s.key()).unwrap_or("<none>")
                );
            }
            NavMode::Returning => {
                self.active = None;
                self.mode = NavMode::Orbiting;
                info!("back in orbit");
            }
            _ => {}
        }
    }
}

#[derive(Resource)]
pub struct NavSession {
    pub machine: NavMachine,
}

#[derive(Resource, Default)]
pub struct NavHub(pub SignalHub<NavSignal>);

/// Within one frame: input handling first, then the camera step, then render.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum NavSet {
    Input,
    Camera,
}

pub struct NavPlugin;
impl Plugin for NavPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NavHub>()
            .insert_resource(NavSession {
                machine: NavMachine::new(CameraPose::new(HOME_POSITION, Vec3::ZERO, 65.0)),
            })
            .configure_sets(Update, (NavSet::Input, NavSet::Camera).chain())
            .add_systems(Update, drive_camera.in_set(NavSet::Camera));
    }
}

/// Reads the machine's per-frame pose and applies it to the main camera.
/// While a flight is active the engine owns the camera; when idle this is a
/// no-op and the orbit controls own it instead.
fn drive_camera(
    mut session: ResMut<NavSession>,
    hub: Res<NavHub>,
    time: Res<Time>,
    mut q_cam: Query<(&mut Transform, &mut Projection), With<MainCamera>>,
) {
    let now = time.elapsed_seconds();
    let Some(pose) = session.machine.tick(now, &hub.0) else {
        return;
    };
    let Ok((mut transform, mut projection)) = q_cam.get_single_mut() else {
        return;
    };
    *transform = Transform::from_translation(pose.position).looking_at(pose.target, Vec3::Y);
    if let Projection::Perspective(persp) = projection.as_mut() {
        persp.fov = pose.fov_deg.to_radians();
    }
}

/// Reads the live camera as a pose for the machine; `None` before the camera
/// exists, which routes picks through the fallback path.
pub fn camera_pose(
    q_cam: &Query<(&Transform, &Projection), With<MainCamera>>,
) -> Option<CameraPose> {
    let (transform, projection) = q_cam.get_single().ok()?;
    let fov_deg = match projection {
        Projection::Perspective(p) => p.fov.to_degrees(),
        _ => return None,
    };
    Some(CameraPose {
        position: transform.translation,
        // Orbit center; only used as the interpolation source, the flight
        // target snaps to the destination anyway.
        target: Vec3::ZERO,
        fov_deg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const EPS: f32 = 1e-3;

    fn home() -> CameraPose {
        CameraPose::new(HOME_POSITION, Vec3::ZERO, 65.0)
    }

    fn recording_hub() -> (
        SignalHub<NavSignal>,
        Arc<Mutex<Vec<NavSignal>>>,
        crate::channel::Subscription<NavSignal>,
    ) {
        let hub = SignalHub::default();
        let log: Arc<Mutex<Vec<NavSignal>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let sub = hub.subscribe(move |s: &NavSignal| sink.lock().unwrap().push(*s));
        (hub, log, sub)
    }

    fn projects_world_pos() -> Vec3 {
        Vec3::new(6.0, 0.0, 0.0)
    }

    #[test]
    fn approach_pose_pulls_back_along_the_sight_line() {
        let body = SectionId::Projects.body();
        let pose = approach_pose(&home(), &body, projects_world_pos());

        // size 0.4 * 1.6 = 0.64 loses to the 0.8 floor.
        let dir = (projects_world_pos() - HOME_POSITION).normalize();
        let expected = projects_world_pos() - dir * 0.8;
        assert!((pose.position - expected).length() < EPS);
        assert!((pose.target - projects_world_pos()).length() < EPS);
        assert!((pose.fov_deg - 77.0).abs() < EPS);
    }

    #[test]
    fn fov_widening_is_capped() {
        let cam = CameraPose::new(HOME_POSITION, Vec3::ZERO, 80.0);
        let body = SectionId::About.body();
        let pose = approach_pose(&cam, &body, Vec3::new(3.0, 0.0, 0.0));
        assert!((pose.fov_deg - 85.0).abs() < EPS);
    }

    #[test]
    fn pick_eventually_reaches_interior_with_one_emission() {
        let (hub, log, _sub) = recording_hub();
        let mut machine = NavMachine::new(home());
        let body = SectionId::Projects.body();

        machine.pick(&body, projects_world_pos(), Some(home()), 0.0);
        assert_eq!(machine.mode(), NavMode::Approaching);
        assert_eq!(machine.active_body(), Some(SectionId::Projects));
        assert!(log.lock().unwrap().is_empty());

        assert!(machine.tick(0.6, &hub).is_some());
        assert_eq!(machine.mode(), NavMode::Approaching);

        machine.tick(APPROACH_SECS + 0.05, &hub);
        assert_eq!(machine.mode(), NavMode::Interior);
        assert_eq!(
            *log.lock().unwrap(),
            vec![NavSignal::ActiveBodyChanged(Some(SectionId::Projects))]
        );

        // Idle afterwards, and no duplicate emission.
        assert!(machine.tick(APPROACH_SECS + 1.0, &hub).is_none());
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn picks_outside_orbiting_are_ignored() {
        let (hub, log, _sub) = recording_hub();
        let mut machine = NavMachine::new(home());
        let projects = SectionId::Projects.body();
        let contact = SectionId::Contact.body();

        machine.pick(&projects, projects_world_pos(), Some(home()), 0.0);

        // Approaching: second pick is a no-op.
        machine.pick(&contact, Vec3::new(7.5, 0.0, 0.0), Some(home()), 0.1);
        assert_eq!(machine.active_body(), Some(SectionId::Projects));

        machine.tick(APPROACH_SECS + 0.05, &hub);
        assert_eq!(machine.mode(), NavMode::Interior);

        // Interior: still a no-op.
        machine.pick(&contact, Vec3::new(7.5, 0.0, 0.0), Some(home()), 2.0);
        assert_eq!(machine.mode(), NavMode::Interior);
        assert_eq!(machine.active_body(), Some(SectionId::Projects));
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn exit_clears_overlay_before_the_reverse_flight_lands() {
        let (hub, log, _sub) = recording_hub();
        let mut machine = NavMachine::new(home());
        let body = SectionId::Projects.body();

        machine.pick(&body, projects_world_pos(), Some(home()), 0.0);
        machine.tick(APPROACH_SECS + 0.05, &hub);

        let inside = approach_pose(&home(), &body, projects_world_pos());
        machine.exit(Some(inside), 2.0, &hub);

        // The None emission happens at exit time, mid-Returning.
        assert_eq!(machine.mode(), NavMode::Returning);
        assert_eq!(
            log.lock().unwrap().last(),
            Some(&NavSignal::ActiveBodyChanged(None))
        );

        let pose = machine.tick(2.0 + RETURN_SECS + 0.05, &hub).unwrap();
        assert_eq!(machine.mode(), NavMode::Orbiting);
        assert_eq!(machine.active_body(), None);
        assert!((pose.position - HOME_POSITION).length() < EPS);
        assert!((pose.fov_deg - 65.0).abs() < EPS);
    }

    #[test]
    fn double_exit_is_idempotent() {
        let (hub, log, _sub) = recording_hub();
        let mut machine = NavMachine::new(home());
        let body = SectionId::Projects.body();

        machine.pick(&body, projects_world_pos(), Some(home()), 0.0);
        machine.tick(APPROACH_SECS + 0.05, &hub);

        let inside = approach_pose(&home(), &body, projects_world_pos());
        machine.exit(Some(inside), 2.0, &hub);
        machine.exit(Some(inside), 2.01, &hub);

        // Only one None emission, one Returning->Orbiting traversal.
        let nones = log
            .lock()
            .unwrap()
            .iter()
            .filter(|s| **s == NavSignal::ActiveBodyChanged(None))
            .count();
        assert_eq!(nones, 1);

        machine.tick(2.0 + RETURN_SECS + 0.05, &hub);
        assert_eq!(machine.mode(), NavMode::Orbiting);

        machine.exit(Some(home()), 4.0, &hub);
        assert_eq!(machine.mode(), NavMode::Orbiting);
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn fallback_reaches_interior_without_a_camera() {
        let (hub, log, _sub) = recording_hub();
        let mut machine = NavMachine::new(home());
        let body = SectionId::About.body();

        machine.pick(&body, Vec3::new(3.0, 0.0, 0.0), None, 0.0);
        assert_eq!(machine.mode(), NavMode::Approaching);

        assert!(machine.tick(FALLBACK_SECS * 0.5, &hub).is_none());
        assert_eq!(machine.mode(), NavMode::Approaching);

        machine.tick(FALLBACK_SECS + 0.01, &hub);
        assert_eq!(machine.mode(), NavMode::Interior);
        assert_eq!(
            *log.lock().unwrap(),
            vec![NavSignal::ActiveBodyChanged(Some(SectionId::About))]
        );

        machine.exit(None, 1.0, &hub);
        assert_eq!(machine.mode(), NavMode::Returning);
        machine.tick(1.0 + FALLBACK_SECS + 0.01, &hub);
        assert_eq!(machine.mode(), NavMode::Orbiting);
        assert_eq!(machine.active_body(), None);
    }

    #[test]
    fn full_projects_round_trip() {
        let (hub, _log, _sub) = recording_hub();
        let mut machine = NavMachine::new(home());
        let body = SectionId::Projects.body();

        machine.pick(&body, projects_world_pos(), Some(home()), 0.0);

        // Simulated frames at ~60 fps through both legs.
        let mut t = 0.0;
        while t < APPROACH_SECS + 0.1 {
            machine.tick(t, &hub);
            t += 1.0 / 60.0;
        }
        assert_eq!(machine.mode(), NavMode::Interior);
        assert_eq!(machine.active_body(), Some(SectionId::Projects));

        let inside = approach_pose(&home(), &body, projects_world_pos());
        machine.exit(Some(inside), t, &hub);
        let exit_at = t;
        let mut last_pose = None;
        while t < exit_at + RETURN_SECS + 0.1 {
            if let Some(pose) = machine.tick(t, &hub) {
                last_pose = Some(pose);
            }
            t += 1.0 / 60.0;
        }
        assert_eq!(machine.mode(), NavMode::Orbiting);
        let pose = last_pose.unwrap();
        assert!((pose.position - HOME_POSITION).length() < 1e-2);
    }
}
