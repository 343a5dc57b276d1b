use std::sync::{Arc, Mutex};

use bevy::diagnostic::{DiagnosticsStore, EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPlugin};

use crate::channel::Subscription;
use crate::input::HoveredBody;
use crate::nav::{NavHub, NavSignal};
use crate::registry::{self, ContentBlock, SectionId};

pub struct UiPlugin;
impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .init_resource::<ViewSettings>()
            .add_systems(Startup, wire_overlay)
            .add_systems(Update, (overlay_ui, hover_tooltip, help_ui, diagnostics_ui));
    }
}

#[derive(Resource, Default)]
pub struct ViewSettings {
    pub show_help: bool,
    pub show_diagnostics: bool,
}

/// The overlay does not poll the machine; it holds whatever body the hub last
/// announced. Dropping the resource releases the subscription with it.
#[derive(Resource)]
struct OverlayState {
    active: Arc<Mutex<Option<SectionId>>>,
    _sub: Subscription<NavSignal>,
}

fn wire_overlay(mut commands: Commands, hub: Res<NavHub>) {
    let active: Arc<Mutex<Option<SectionId>>> = Arc::new(Mutex::new(None));
    let sink = active.clone();
    let sub = hub.0.subscribe(move |signal: &NavSignal| {
        if let NavSignal::ActiveBodyChanged(body) = signal {
            *sink.lock().unwrap() = *body;
        }
    });
    commands.insert_resource(OverlayState { active, _sub: sub });
}

fn overlay_ui(mut contexts: EguiContexts, overlay: Option<Res<OverlayState>>, hub: Res<NavHub>) {
    let Some(overlay) = overlay else {
        return;
    };
    let Some(id) = *overlay.active.lock().unwrap() else {
        return;
    };
    let section = registry::content(id);

    egui::Window::new(section.title)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .collapsible(false)
        .resizable(false)
        .min_width(420.0)
        .show(contexts.ctx_mut(), |ui| {
            egui::ScrollArea::vertical()
                .max_height(480.0)
                .show(ui, |ui| {
                    for block in section.blocks {
                        match block {
                            ContentBlock::Heading(text) => {
                                ui.add_space(8.0);
                                ui.heading(*text);
                            }
                            ContentBlock::Paragraph(text) => {
                                ui.label(*text);
                            }
                            ContentBlock::Bullet(text) => {
                                ui.label(format!("• {text}"));
                            }
                        }
                    }
                });
            ui.separator();
            if ui.button("Back to orbit (Esc)").clicked() {
                hub.0.publish(&NavSignal::ExitRequested);
            }
        });
}

fn hover_tooltip(mut contexts: EguiContexts, hovered: Res<HoveredBody>) {
    let Some(id) = hovered.0 else {
        return;
    };
    let ctx = contexts.ctx_mut();
    let Some(pos) = ctx.pointer_latest_pos() else {
        return;
    };
    egui::Area::new(egui::Id::new("body-tooltip"))
        .fixed_pos(pos + egui::vec2(14.0, 14.0))
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.label(id.display_name());
            });
        });
}

fn help_ui(mut contexts: EguiContexts, settings: Res<ViewSettings>) {
    if !settings.show_help {
        return;
    }
    egui::Window::new("Help").show(contexts.ctx_mut(), |ui| {
        ui.label("Left Mouse: Visit a planet");
        ui.label("Esc / Left Mouse (inside): Back to orbit");
        ui.label("Right Mouse: Rotate view (drag)");
        ui.label("Mouse Wheel: Zoom");
        ui.label("H: Toggle Help");
        ui.label("F3: Toggle Diagnostics");
    });
}

fn diagnostics_ui(
    mut contexts: EguiContexts,
    settings: Res<ViewSettings>,
    diagnostics: Res<DiagnosticsStore>,
) {
    if !settings.show_diagnostics {
        return;
    }
    egui::Window::new("Diagnostics").show(contexts.ctx_mut(), |ui| {
        if let Some(fps) = diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS) {
            if let Some(value) = fps.smoothed() {
                ui.label(format!("FPS: {:.1}", value));
            }
        }
        if let Some(entity_count) = diagnostics.get(&EntityCountDiagnosticsPlugin::ENTITY_COUNT) {
            if let Some(value) = entity_count.value() {
                ui.label(format!("Entities: {}", value));
            }
        }
    });
}
