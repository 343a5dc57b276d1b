use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::channel::Subscription;
use crate::nav::{camera_pose, NavHub, NavMode, NavSession, NavSet, NavSignal};
use crate::registry::SectionId;
use crate::scene::{Planet, ViewConfig};
use crate::ui::ViewSettings;
use crate::MainCamera;

const HOVER_SCALE: f32 = 1.2;
const ACTIVE_SCALE: f32 = 1.3;
const ORBIT_ROTATE_RATE: f32 = 0.005;
const ORBIT_PITCH_RANGE: (f32, f32) = (-0.5, 1.4);
const ORBIT_DISTANCE_RANGE: (f32, f32) = (8.0, 30.0);

pub struct InputPlugin;
impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HoveredBody>()
            .init_resource::<OrbitRig>()
            .add_systems(Startup, wire_exit_signal)
            .add_systems(
                Update,
                (hover_bodies, pick_on_click, exit_controls, orbit_controls)
                    .chain()
                    .in_set(NavSet::Input),
            )
            .add_systems(Update, (help_toggle, diagnostics_toggle));
    }
}

/// Body currently under the cursor, if any. The overlay layer reads this for
/// the name tooltip.
#[derive(Resource, Default)]
pub struct HoveredBody(pub Option<SectionId>);

/// Exit requests arriving over the hub (the overlay's close control) are
/// flagged here and drained next frame by `exit_controls`.
#[derive(Resource)]
struct ExitSignal {
    requested: Arc<AtomicBool>,
    _sub: Subscription<NavSignal>,
}

/// Spherical free-orbit rig around the sun. Re-derived from the live camera
/// whenever the machine hands control back, so a return flight lands without
/// a visible snap.
#[derive(Resource, Default)]
struct OrbitRig {
    yaw: f32,
    pitch: f32,
    distance: f32,
    synced: bool,
}

fn wire_exit_signal(mut commands: Commands, hub: Res<NavHub>) {
    let requested = Arc::new(AtomicBool::new(false));
    let flag = requested.clone();
    let sub = hub.0.subscribe(move |signal: &NavSignal| {
        if *signal == NavSignal::ExitRequested {
            flag.store(true, Ordering::SeqCst);
        }
    });
    commands.insert_resource(ExitSignal {
        requested,
        _sub: sub,
    });
}

fn cursor_ray(
    windows: &Query<&Window>,
    q_cam: &Query<(&Camera, &GlobalTransform), With<MainCamera>>,
) -> Option<Ray3d> {
    let window = windows.get_single().ok()?;
    let cursor = window.cursor_position()?;
    let (camera, transform) = q_cam.get_single().ok()?;
    camera.viewport_to_world(transform, cursor)
}

fn ray_hits_sphere(ray: Ray3d, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(*ray.direction);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t > 0.0).then_some(t)
}

fn hover_bodies(
    windows: Query<&Window>,
    q_cam: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut q_planets: Query<(&Planet, &GlobalTransform, &mut Transform)>,
    session: Res<NavSession>,
    view: Res<ViewConfig>,
    mut hovered: ResMut<HoveredBody>,
    mut contexts: EguiContexts,
) {
    hovered.0 = None;

    if session.machine.mode() == NavMode::Orbiting && !contexts.ctx_mut().wants_pointer_input() {
        if let Some(ray) = cursor_ray(&windows, &q_cam) {
            let scale = view.breakpoint.scene_scale();
            let mut nearest = f32::INFINITY;
            for (planet, global, _) in &q_planets {
                if let Some(t) = ray_hits_sphere(ray, global.translation(), planet.radius * scale)
                {
                    if t < nearest {
                        nearest = t;
                        hovered.0 = Some(planet.id);
                    }
                }
            }
        }
    }

    let active = session.machine.active_body();
    for (planet, _, mut transform) in &mut q_planets {
        let s = if active == Some(planet.id) {
            ACTIVE_SCALE
        } else if hovered.0 == Some(planet.id) {
            HOVER_SCALE
        } else {
            1.0
        };
        transform.scale = Vec3::splat(s);
    }
}

fn pick_on_click(
    buttons: Res<ButtonInput<MouseButton>>,
    hovered: Res<HoveredBody>,
    q_planets: Query<(&Planet, &GlobalTransform)>,
    q_pose: Query<(&Transform, &Projection), With<MainCamera>>,
    mut session: ResMut<NavSession>,
    time: Res<Time>,
    mut contexts: EguiContexts,
) {
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    if contexts.ctx_mut().wants_pointer_input() {
        return;
    }
    let Some(id) = hovered.0 else {
        return;
    };
    let Some((planet, global)) = q_planets.iter().find(|(p, _)| p.id == id) else {
        return;
    };
    session.machine.pick(
        &planet.id.body(),
        global.translation(),
        camera_pose(&q_pose),
        time.elapsed_seconds(),
    );
}

/// All three exit triggers converge here: Escape, a left click while inside,
/// and the overlay's close control arriving over the hub.
fn exit_controls(
    keys: Res<ButtonInput<KeyCode>>,
    buttons: Res<ButtonInput<MouseButton>>,
    signal: Option<Res<ExitSignal>>,
    q_pose: Query<(&Transform, &Projection), With<MainCamera>>,
    mut session: ResMut<NavSession>,
    hub: Res<NavHub>,
    time: Res<Time>,
    mut contexts: EguiContexts,
) {
    let signalled = signal
        .map(|s| s.requested.swap(false, Ordering::SeqCst))
        .unwrap_or(false);
    let clicked_through = session.machine.mode() == NavMode::Interior
        && buttons.just_pressed(MouseButton::Left)
        && !contexts.ctx_mut().wants_pointer_input();

    if keys.just_pressed(KeyCode::Escape) || signalled || clicked_through {
        session
            .machine
            .exit(camera_pose(&q_pose), time.elapsed_seconds(), &hub.0);
    }
}

fn orbit_controls(
    buttons: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut scroll: EventReader<MouseWheel>,
    mut rig: ResMut<OrbitRig>,
    session: Res<NavSession>,
    mut q_cam: Query<&mut Transform, With<MainCamera>>,
    mut contexts: EguiContexts,
) {
    if session.machine.mode() != NavMode::Orbiting {
        // Hand the camera to the flight engine; re-sync when it comes back.
        rig.synced = false;
        motion.clear();
        scroll.clear();
        return;
    }
    let Ok(mut transform) = q_cam.get_single_mut() else {
        return;
    };

    if !rig.synced {
        let offset = transform.translation;
        rig.distance = offset.length().clamp(ORBIT_DISTANCE_RANGE.0, ORBIT_DISTANCE_RANGE.1);
        rig.yaw = offset.x.atan2(offset.z);
        rig.pitch = (offset.y / offset.length().max(f32::EPSILON)).asin();
        rig.synced = true;
    }

    let over_ui = contexts.ctx_mut().wants_pointer_input();
    if buttons.pressed(MouseButton::Right) && !over_ui {
        for m in motion.read() {
            rig.yaw -= m.delta.x * ORBIT_ROTATE_RATE;
            rig.pitch = (rig.pitch + m.delta.y * ORBIT_ROTATE_RATE)
                .clamp(ORBIT_PITCH_RANGE.0, ORBIT_PITCH_RANGE.1);
        }
    } else {
        motion.clear();
    }
    if !over_ui {
        for ev in scroll.read() {
            rig.distance = (rig.distance - ev.y * 0.8)
                .clamp(ORBIT_DISTANCE_RANGE.0, ORBIT_DISTANCE_RANGE.1);
        }
    } else {
        scroll.clear();
    }

    let position = Vec3::new(
        rig.distance * rig.pitch.cos() * rig.yaw.sin(),
        rig.distance * rig.pitch.sin(),
        rig.distance * rig.pitch.cos() * rig.yaw.cos(),
    );
    *transform = Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y);
}

fn help_toggle(mut settings: ResMut<ViewSettings>, keys: Res<ButtonInput<KeyCode>>) {
    if keys.just_pressed(KeyCode::KeyH) {
        settings.show_help = !settings.show_help;
    }
}

fn diagnostics_toggle(mut settings: ResMut<ViewSettings>, keys: Res<ButtonInput<KeyCode>>) {
    if keys.just_pressed(KeyCode::F3) {
        settings.show_diagnostics = !settings.show_diagnostics;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_sphere_hit_and_miss() {
        let ray = Ray3d::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let t = ray_hits_sphere(ray, Vec3::ZERO, 1.0).unwrap();
        assert!((t - 9.0).abs() < 1e-4);

        assert!(ray_hits_sphere(ray, Vec3::new(5.0, 0.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn sphere_behind_the_ray_is_not_hit() {
        let ray = Ray3d::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z);
        assert!(ray_hits_sphere(ray, Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn grazing_ray_still_hits() {
        let ray = Ray3d::new(Vec3::new(0.99, 0.0, 10.0), Vec3::NEG_Z);
        assert!(ray_hits_sphere(ray, Vec3::ZERO, 1.0).is_some());
    }
}
