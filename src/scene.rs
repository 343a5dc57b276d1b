use bevy::prelude::*;
use rand::Rng;

use crate::nav::{NavMode, NavSession};
use crate::registry::SectionId;

/// Global slowdown applied to every decorative rate.
const SOLAR_SPEED: f32 = 0.5;
/// Tuning values below are per-frame at 60 fps; this folds them, together
/// with the global slowdown, into per-second rates.
const MOTION_RATE: f32 = 60.0 * SOLAR_SPEED;

const STAR_COUNT: usize = 1200;
const STAR_SHELL_RADIUS: f32 = 100.0;
const STAR_SHELL_DEPTH: f32 = 50.0;
const INTERIOR_RADIUS: f32 = 50.0;

/// Breakpoint classifier; body sizes, orbit radii, and the default FOV scale
/// with it. External parameter to the navigation core, never internal policy.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Breakpoint {
    Mobile,
    Tablet,
    #[default]
    Desktop,
}

impl Breakpoint {
    pub fn classify(window_width: f32) -> Self {
        if window_width < 640.0 {
            Breakpoint::Mobile
        } else if window_width < 1024.0 {
            Breakpoint::Tablet
        } else {
            Breakpoint::Desktop
        }
    }

    pub fn scene_scale(&self) -> f32 {
        match *self {
            Breakpoint::Mobile => 0.7,
            Breakpoint::Tablet => 0.85,
            Breakpoint::Desktop => 1.0,
        }
    }

    pub fn fov_deg(&self) -> f32 {
        match *self {
            Breakpoint::Mobile => 75.0,
            Breakpoint::Tablet => 70.0,
            Breakpoint::Desktop => 65.0,
        }
    }
}

#[derive(Resource, Default)]
pub struct ViewConfig {
    pub breakpoint: Breakpoint,
}

/// A pickable orbiting body. `radius` is the base (unscaled) visual size used
/// for ray tests and the approach pullback.
#[derive(Component)]
pub struct Planet {
    pub id: SectionId,
    pub radius: f32,
}

#[derive(Component)]
pub struct OrbitMotion {
    pub radius: f32,
    pub speed: f32,
    pub direction: f32,
    pub angle: f32,
}

#[derive(Component)]
pub struct Spin {
    pub rate: f32,
    pub direction: f32,
}

/// Root of the exterior scene (sun, planets, rings); uniformly scaled per
/// breakpoint and hidden while inside a planet.
#[derive(Component)]
pub struct OutsideRoot;

#[derive(Component)]
pub struct StarField;

#[derive(Component)]
pub struct InteriorSphere;

#[derive(Resource)]
struct StarMaterial(Handle<StandardMaterial>);

pub struct ScenePlugin;
impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ViewConfig>()
            .add_systems(Startup, setup_scene)
            .add_systems(
                Update,
                (
                    track_breakpoint,
                    orbit_motion,
                    spin_bodies,
                    rotate_starfield,
                    twinkle_stars,
                    sync_interior,
                ),
            );
    }
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 120.0,
    });

    let mut rng = rand::thread_rng();

    let root = commands
        .spawn((SpatialBundle::default(), OutsideRoot))
        .id();

    // Sun: emissive core plus two warm lights, bloom does the rest.
    let sun = commands
        .spawn(PbrBundle {
            mesh: meshes.add(Sphere::new(1.2)),
            material: materials.add(StandardMaterial {
                base_color: Color::srgb(1.0, 0.6, 0.1),
                emissive: LinearRgba::rgb(8.0, 3.2, 0.4),
                unlit: true,
                ..default()
            }),
            ..default()
        })
        .id();
    let key_light = commands
        .spawn(PointLightBundle {
            point_light: PointLight {
                color: Color::srgb(1.0, 0.4, 0.0),
                intensity: 3_000_000.0,
                range: 200.0,
                ..default()
            },
            ..default()
        })
        .id();
    let fill_light = commands
        .spawn(PointLightBundle {
            point_light: PointLight {
                color: Color::srgb(1.0, 0.67, 0.0),
                intensity: 2_000_000.0,
                range: 40.0,
                ..default()
            },
            ..default()
        })
        .id();
    commands.entity(root).push_children(&[sun, key_light, fill_light]);

    for id in SectionId::ALL {
        let body = id.body();
        let angle = rng.gen::<f32>() * std::f32::consts::TAU;

        let planet = commands
            .spawn((
                PbrBundle {
                    mesh: meshes.add(Sphere::new(body.size)),
                    material: materials.add(StandardMaterial {
                        base_color: id.color(),
                        emissive: LinearRgba::from(id.color()) * 0.05,
                        perceptual_roughness: 0.8,
                        metallic: 0.1,
                        ..default()
                    }),
                    transform: Transform::from_translation(Vec3::new(
                        body.orbit_radius * angle.cos(),
                        0.0,
                        body.orbit_radius * angle.sin(),
                    )),
                    ..default()
                },
                Planet {
                    id,
                    radius: body.size,
                },
                OrbitMotion {
                    radius: body.orbit_radius,
                    speed: body.orbit_speed,
                    direction: body.direction,
                    angle,
                },
                Spin {
                    rate: 0.01,
                    direction: body.direction,
                },
            ))
            .id();

        let ring = commands
            .spawn(PbrBundle {
                mesh: meshes.add(Torus {
                    minor_radius: 0.01,
                    major_radius: body.orbit_radius,
                }),
                material: materials.add(StandardMaterial {
                    base_color: Color::srgba(0.35, 0.35, 0.35, 0.35),
                    unlit: true,
                    alpha_mode: AlphaMode::Blend,
                    ..default()
                }),
                ..default()
            })
            .id();

        commands.entity(root).push_children(&[planet, ring]);
    }

    // Star shell: one shared mesh and material so the twinkle is a single
    // material write per frame.
    let star_mesh = meshes.add(Sphere::new(0.35));
    let star_material = materials.add(StandardMaterial {
        base_color: Color::srgba(1.0, 1.0, 1.0, 0.8),
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        ..default()
    });
    commands.insert_resource(StarMaterial(star_material.clone()));

    let field = commands
        .spawn((SpatialBundle::default(), StarField))
        .id();
    for _ in 0..STAR_COUNT {
        let r = STAR_SHELL_RADIUS + rng.gen::<f32>() * STAR_SHELL_DEPTH;
        let theta = rng.gen::<f32>() * std::f32::consts::TAU;
        let phi = (rng.gen::<f32>() * 2.0 - 1.0).acos();
        let pos = Vec3::new(
            r * phi.sin() * theta.cos(),
            r * phi.sin() * theta.sin(),
            r * phi.cos(),
        );
        let star = commands
            .spawn(PbrBundle {
                mesh: star_mesh.clone(),
                material: star_material.clone(),
                transform: Transform::from_translation(pos),
                ..default()
            })
            .id();
        commands.entity(field).add_child(star);
    }
}

/// Watches the window width and pushes breakpoint changes into the scene
/// scale and the machine's home pose.
fn track_breakpoint(
    windows: Query<&Window>,
    mut view: ResMut<ViewConfig>,
    mut session: ResMut<NavSession>,
    mut q_root: Query<&mut Transform, With<OutsideRoot>>,
    mut q_proj: Query<&mut Projection, With<crate::MainCamera>>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let breakpoint = Breakpoint::classify(window.width());
    if breakpoint == view.breakpoint {
        return;
    }
    view.breakpoint = breakpoint;

    let mut home = session.machine.home();
    home.fov_deg = breakpoint.fov_deg();
    session.machine.set_home(home);

    if let Ok(mut transform) = q_root.get_single_mut() {
        transform.scale = Vec3::splat(breakpoint.scene_scale());
    }
    // Apply the new default FOV immediately while in free orbit; transitions
    // pick it up through the home pose otherwise.
    if session.machine.mode() == NavMode::Orbiting {
        if let Ok(mut projection) = q_proj.get_single_mut() {
            if let Projection::Perspective(persp) = projection.as_mut() {
                persp.fov = breakpoint.fov_deg().to_radians();
            }
        }
    }
}

fn orbit_motion(time: Res<Time>, mut q: Query<(&mut OrbitMotion, &mut Transform)>) {
    let dt = time.delta_seconds();
    for (mut orbit, mut transform) in &mut q {
        orbit.angle += orbit.speed * orbit.direction * MOTION_RATE * dt;
        transform.translation = Vec3::new(
            orbit.radius * orbit.angle.cos(),
            0.0,
            orbit.radius * orbit.angle.sin(),
        );
    }
}

fn spin_bodies(time: Res<Time>, mut q: Query<(&Spin, &mut Transform)>) {
    let dt = time.delta_seconds();
    for (spin, mut transform) in &mut q {
        transform.rotate_y(spin.rate * spin.direction * MOTION_RATE * dt);
    }
}

fn rotate_starfield(time: Res<Time>, mut q: Query<&mut Transform, With<StarField>>) {
    let dt = time.delta_seconds();
    for mut transform in &mut q {
        transform.rotate_y(0.003 * MOTION_RATE * dt);
        transform.rotate_x(0.001 * MOTION_RATE * dt);
    }
}

fn twinkle_stars(
    time: Res<Time>,
    star: Option<Res<StarMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(star) = star else {
        return;
    };
    if let Some(material) = materials.get_mut(&star.0) {
        let alpha = 0.5 + (time.elapsed_seconds() * 0.5 * SOLAR_SPEED).sin() * 0.3;
        material.base_color.set_alpha(alpha);
    }
}

/// Keeps the rendered world in step with the machine: while `Interior`, the
/// exterior hides and a large back-face sphere with a soft center light
/// wraps the camera.
fn sync_interior(
    mut commands: Commands,
    session: Res<NavSession>,
    view: Res<ViewConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    q_interior: Query<Entity, With<InteriorSphere>>,
    mut q_exterior: Query<&mut Visibility, Or<(With<OutsideRoot>, With<StarField>)>>,
) {
    let inside = session.machine.mode() == NavMode::Interior;
    let spawned = !q_interior.is_empty();

    if inside && !spawned {
        let Some(id) = session.machine.active_body() else {
            return;
        };
        let color = id.color();
        commands
            .spawn((
                PbrBundle {
                    mesh: meshes.add(Sphere::new(INTERIOR_RADIUS * view.breakpoint.scene_scale())),
                    material: materials.add(StandardMaterial {
                        base_color: color,
                        emissive: LinearRgba::from(color) * 0.05,
                        perceptual_roughness: 0.9,
                        metallic: 0.0,
                        cull_mode: None,
                        double_sided: true,
                        ..default()
                    }),
                    ..default()
                },
                InteriorSphere,
                Spin {
                    rate: 0.002,
                    direction: 1.0,
                },
            ))
            .with_children(|parent| {
                parent.spawn(PointLightBundle {
                    point_light: PointLight {
                        color,
                        intensity: 1_500_000.0,
                        range: 60.0,
                        ..default()
                    },
                    ..default()
                });
            });
        for mut visibility in &mut q_exterior {
            *visibility = Visibility::Hidden;
        }
    } else if !inside && spawned {
        for entity in &q_interior {
            commands.entity(entity).despawn_recursive();
        }
        for mut visibility in &mut q_exterior {
            *visibility = Visibility::Inherited;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_thresholds() {
        assert_eq!(Breakpoint::classify(320.0), Breakpoint::Mobile);
        assert_eq!(Breakpoint::classify(639.9), Breakpoint::Mobile);
        assert_eq!(Breakpoint::classify(640.0), Breakpoint::Tablet);
        assert_eq!(Breakpoint::classify(1023.9), Breakpoint::Tablet);
        assert_eq!(Breakpoint::classify(1024.0), Breakpoint::Desktop);
        assert_eq!(Breakpoint::classify(1920.0), Breakpoint::Desktop);
    }

    #[test]
    fn narrower_screens_get_wider_fov_and_smaller_scene() {
        assert!(Breakpoint::Mobile.fov_deg() > Breakpoint::Desktop.fov_deg());
        assert!(Breakpoint::Mobile.scene_scale() < Breakpoint::Desktop.scene_scale());
        assert_eq!(Breakpoint::Desktop.scene_scale(), 1.0);
    }
}
