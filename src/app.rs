//! The eframe frontend: renders the section, draws annotations, and
//! translates egui input into the controller's event vocabulary.
//!
//! Everything here is display plumbing; the annotation semantics live in
//! [`crate::controller`]. The frontend owns the view transform (pan with
//! the secondary button, zoom with the scroll wheel) and claims the
//! pointer from the controller while panning.

use eframe::egui::{
    self, Color32, ColorImage, PointerButton, Pos2, Rect, Sense, Stroke, TextureHandle,
    TextureOptions, Vec2, pos2, vec2,
};
use ndarray::Array2;

use crate::cli::Options;
use crate::controller::{AnnotationController, SessionRequest};
use crate::data::Section;
use crate::display::{DisplaySurface, InputEvent, Key, MouseButton};
use crate::export::{export_labels, labeled_output_path};
use crate::geometry::Point;
use crate::raster::rasterize;

/// Fill/stroke colors for classes 1-9.
const CLASS_COLORS: [Color32; 9] = [
    Color32::from_rgb(255, 200, 100), // 1 orange
    Color32::from_rgb(100, 150, 255), // 2 blue
    Color32::from_rgb(100, 255, 150), // 3 green
    Color32::from_rgb(255, 100, 200), // 4 pink
    Color32::from_rgb(200, 100, 255), // 5 purple
    Color32::from_rgb(255, 255, 100), // 6 yellow
    Color32::from_rgb(100, 255, 255), // 7 cyan
    Color32::from_rgb(255, 150, 100), // 8 coral
    Color32::from_rgb(220, 220, 220), // 9 gray
];

/// In-progress outline, after the original tool's dashed gray line with
/// blue x markers.
const OUTLINE_COLOR: Color32 = Color32::from_rgb(0x66, 0x66, 0x66);
const MARKER_COLOR: Color32 = Color32::from_rgb(0x20, 0x4a, 0x87);

fn class_color(class: u8) -> Color32 {
    CLASS_COLORS[(class as usize).clamp(1, 9) - 1]
}

/// Amplitude colormap: a blue-purple ramp over the normalized range.
fn amplitude_color(t: f32) -> [u8; 3] {
    const STOPS: [[u8; 3]; 5] = [
        [247, 252, 253],
        [191, 211, 230],
        [140, 150, 198],
        [136, 65, 157],
        [77, 0, 75],
    ];
    let x = t.clamp(0.0, 1.0) * (STOPS.len() - 1) as f32;
    let i = (x.floor() as usize).min(STOPS.len() - 2);
    let f = x - i as f32;
    let (a, b) = (STOPS[i], STOPS[i + 1]);
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * f) as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * f) as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * f) as u8,
    ]
}

/// Pan/zoom state mapping data coordinates onto the panel.
///
/// At zoom 1 with no offset the section fills the panel, stretched on both
/// axes independently (sections are much wider in traces than in samples).
#[derive(Debug, Clone, Copy)]
struct ViewTransform {
    offset: Vec2,
    zoom: f32,
}

impl ViewTransform {
    fn new() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }

    fn scale(&self, rect: Rect, cols: usize, rows: usize) -> Vec2 {
        vec2(
            rect.width() / cols as f32 * self.zoom,
            rect.height() / rows as f32 * self.zoom,
        )
    }

    /// Screen rectangle the section image occupies.
    fn image_rect(&self, rect: Rect, cols: usize, rows: usize) -> Rect {
        let scale = self.scale(rect, cols, rows);
        Rect::from_min_size(
            rect.min + self.offset,
            vec2(cols as f32 * scale.x, rows as f32 * scale.y),
        )
    }

    fn data_to_screen(&self, rect: Rect, cols: usize, rows: usize, p: Point) -> Pos2 {
        let scale = self.scale(rect, cols, rows);
        rect.min + self.offset + vec2(p.x as f32 * scale.x, p.y as f32 * scale.y)
    }

    fn screen_to_data(&self, rect: Rect, cols: usize, rows: usize, pos: Pos2) -> Point {
        let scale = self.scale(rect, cols, rows);
        let rel = pos - (rect.min + self.offset);
        Point::new((rel.x / scale.x) as f64, (rel.y / scale.y) as f64)
    }

    /// Zoom by `factor` keeping the point under `cursor` fixed.
    fn zoom_at(&mut self, rect: Rect, cursor: Pos2, factor: f32) {
        let new_zoom = (self.zoom * factor).clamp(0.2, 20.0);
        let ratio = new_zoom / self.zoom;
        let rel = cursor - (rect.min + self.offset);
        self.offset -= rel * (ratio - 1.0);
        self.zoom = new_zoom;
    }
}

/// Redraw sink backed by the egui context.
struct EguiSurface<'a> {
    ctx: &'a egui::Context,
}

impl DisplaySurface for EguiSurface<'_> {
    fn request_redraw(&mut self) {
        self.ctx.request_repaint();
    }
}

/// The labeling session window.
pub struct LabelmadeApp {
    options: Options,
    section: Section,
    /// `None` in compare mode: the session is view-only.
    controller: Option<AnnotationController>,
    /// Label grid shown as a translucent overlay (`--compare`).
    overlay: Option<Array2<u8>>,
    texture: Option<TextureHandle>,
    overlay_texture: Option<TextureHandle>,
    view: ViewTransform,
    status: String,
}

impl LabelmadeApp {
    pub fn new(options: Options, section: Section, overlay: Option<Array2<u8>>) -> Self {
        let (rows, cols) = section.shape();
        let controller = if overlay.is_none() {
            Some(AnnotationController::new(rows, cols, options.threshold))
        } else {
            None
        };
        let status = match &controller {
            Some(_) => "click to outline, enter to commit, w to write".to_string(),
            None => "compare mode: editing disabled".to_string(),
        };
        Self {
            options,
            section,
            controller,
            overlay,
            texture: None,
            overlay_texture: None,
            view: ViewTransform::new(),
            status,
        }
    }

    /// Build the section (and overlay) textures on first use.
    fn textures(&mut self, ctx: &egui::Context) -> (TextureHandle, Option<TextureHandle>) {
        let (rows, cols) = self.section.shape();

        let section = &self.section;
        let texture = self
            .texture
            .get_or_insert_with(|| {
                let mut rgb = Vec::with_capacity(rows * cols * 3);
                for r in 0..rows {
                    for c in 0..cols {
                        rgb.extend_from_slice(&amplitude_color(section.normalized(r, c)));
                    }
                }
                let image = ColorImage::from_rgb([cols, rows], &rgb);
                ctx.load_texture("section", image, TextureOptions::LINEAR)
            })
            .clone();

        if self.overlay_texture.is_none()
            && let Some(labels) = &self.overlay
        {
            let mut rgba = Vec::with_capacity(rows * cols * 4);
            for r in 0..rows {
                for c in 0..cols {
                    match labels[[r, c]] {
                        0 => rgba.extend_from_slice(&[0, 0, 0, 0]),
                        class => {
                            let color = class_color(class);
                            rgba.extend_from_slice(&[color.r(), color.g(), color.b(), 140]);
                        }
                    }
                }
            }
            let image = ColorImage::from_rgba_unmultiplied([cols, rows], &rgba);
            self.overlay_texture =
                Some(ctx.load_texture("compare-overlay", image, TextureOptions::NEAREST));
        }

        (texture, self.overlay_texture.clone())
    }

    /// Translate this frame's raw egui events into controller events.
    fn collect_events(&self, ui: &egui::Ui, rect: Rect) -> Vec<InputEvent> {
        let (rows, cols) = self.section.shape();
        let hover = ui
            .input(|i| i.pointer.hover_pos())
            .filter(|pos| rect.contains(*pos))
            .map(|pos| self.view.screen_to_data(rect, cols, rows, pos));

        let mut events = Vec::new();
        for event in ui.input(|i| i.events.clone()) {
            match event {
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    ..
                } => {
                    if !rect.contains(pos) {
                        continue;
                    }
                    let Some(button) = map_button(button) else {
                        continue;
                    };
                    let pos = self.view.screen_to_data(rect, cols, rows, pos);
                    events.push(if pressed {
                        InputEvent::PointerPressed { pos, button }
                    } else {
                        InputEvent::PointerReleased { pos, button }
                    });
                }
                egui::Event::Key {
                    key, pressed: true, ..
                } => {
                    if let Some(key) = map_key(key) {
                        events.push(InputEvent::KeyPressed { key, pos: hover });
                    }
                }
                _ => {}
            }
        }
        events
    }

    /// Rasterize the current annotations and write the labeled copy.
    fn export(&mut self) {
        let Some(controller) = &self.controller else {
            return;
        };
        let (rows, cols) = self.section.shape();
        let labels = rasterize(rows, cols, controller.annotations());
        let output = labeled_output_path(&self.options.input, &self.options.prefix);

        match export_labels(&self.options.input, &labels, &output) {
            Ok(path) => {
                self.status = format!("wrote {}", path.display());
            }
            Err(err) => {
                // Fatal to the export only; the session stays usable.
                log::error!("export failed: {err}");
                self.status = format!("export failed: {err}");
            }
        }
    }

    fn section_view(&mut self, ui: &mut egui::Ui) {
        let (rows, cols) = self.section.shape();
        let (texture, overlay_texture) = self.textures(ui.ctx());

        let (response, painter) =
            ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let rect = response.rect;

        // Pan with the secondary button; the pointer is claimed away from
        // drawing while the pan lasts.
        let panning = response.dragged_by(PointerButton::Secondary);
        if panning {
            self.view.offset += response.drag_delta();
        }
        if let Some(controller) = &mut self.controller {
            controller.set_blocked(panning);
        }

        // Zoom at the cursor with the scroll wheel.
        if let Some(pos) = response.hover_pos() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let factor = if scroll > 0.0 { 1.25 } else { 0.8 };
                self.view.zoom_at(rect, pos, factor);
            }
        }

        let image_rect = self.view.image_rect(rect, cols, rows);
        let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
        painter.image(texture.id(), image_rect, uv, Color32::WHITE);
        if let Some(overlay) = &overlay_texture {
            painter.image(overlay.id(), image_rect, uv, Color32::WHITE);
        }

        if self.controller.is_some() {
            let events = self.collect_events(ui, rect);
            let mut export_requested = false;
            let mut surface = EguiSurface { ctx: ui.ctx() };
            if let Some(controller) = &mut self.controller {
                for event in events {
                    if controller.handle_event(event, &mut surface)
                        == Some(SessionRequest::Export)
                    {
                        export_requested = true;
                    }
                }
            }
            if export_requested {
                self.export();
            }
        }

        self.draw_annotations(&painter, rect);
    }

    fn draw_annotations(&self, painter: &egui::Painter, rect: Rect) {
        let (rows, cols) = self.section.shape();
        let Some(controller) = &self.controller else {
            return;
        };

        for polygon in controller.annotations().iter() {
            let points: Vec<Pos2> = polygon
                .shape()
                .vertices()
                .iter()
                .map(|p| self.view.data_to_screen(rect, cols, rows, *p))
                .collect();
            let color = class_color(polygon.class());
            painter.add(egui::Shape::convex_polygon(
                points.clone(),
                color.gamma_multiply(0.35),
                Stroke::NONE,
            ));
            painter.add(egui::Shape::closed_line(points, Stroke::new(1.5, color)));
        }

        let outline: Vec<Pos2> = controller
            .outline()
            .iter()
            .map(|p| self.view.data_to_screen(rect, cols, rows, *p))
            .collect();
        if outline.len() >= 2 {
            painter.extend(egui::Shape::dashed_line(
                &outline,
                Stroke::new(1.0, OUTLINE_COLOR),
                6.0,
                4.0,
            ));
        }
        for p in outline {
            // An x marker per vertex.
            let d = 3.5;
            painter.line_segment(
                [pos2(p.x - d, p.y - d), pos2(p.x + d, p.y + d)],
                Stroke::new(2.0, MARKER_COLOR),
            );
            painter.line_segment(
                [pos2(p.x - d, p.y + d), pos2(p.x + d, p.y - d)],
                Stroke::new(2.0, MARKER_COLOR),
            );
        }
    }

    fn status_line(&self) -> String {
        match &self.controller {
            Some(controller) => format!(
                "class {} | {} polygon(s), {} outline vertices | {}",
                controller.current_class(),
                controller.annotations().len(),
                controller.outline().len(),
                self.status
            ),
            None => self.status.clone(),
        }
    }
}

impl eframe::App for LabelmadeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(self.status_line());
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.section_view(ui);
        });
    }
}

fn map_button(button: PointerButton) -> Option<MouseButton> {
    match button {
        PointerButton::Primary => Some(MouseButton::Primary),
        PointerButton::Secondary => Some(MouseButton::Secondary),
        PointerButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

fn map_key(key: egui::Key) -> Option<Key> {
    match key {
        egui::Key::Enter => Some(Key::Enter),
        egui::Key::Escape => Some(Key::Escape),
        egui::Key::Backspace => Some(Key::Backspace),
        egui::Key::D => Some(Key::Char('d')),
        egui::Key::U => Some(Key::Char('u')),
        egui::Key::W => Some(Key::Char('w')),
        egui::Key::Num1 => Some(Key::Digit(1)),
        egui::Key::Num2 => Some(Key::Digit(2)),
        egui::Key::Num3 => Some(Key::Digit(3)),
        egui::Key::Num4 => Some(Key::Digit(4)),
        egui::Key::Num5 => Some(Key::Digit(5)),
        egui::Key::Num6 => Some(Key::Digit(6)),
        egui::Key::Num7 => Some(Key::Digit(7)),
        egui::Key::Num8 => Some(Key::Digit(8)),
        egui::Key::Num9 => Some(Key::Digit(9)),
        _ => None,
    }
}

/// Open the session window and run until it is closed.
pub fn run(
    options: Options,
    section: Section,
    overlay: Option<Array2<u8>>,
) -> eframe::Result<()> {
    let title = format!("labelmade - {}", options.input.display());
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 750.0])
            .with_title(title),
        ..Default::default()
    };
    eframe::run_native(
        "labelmade",
        native_options,
        Box::new(move |_cc| Ok(Box::new(LabelmadeApp::new(options, section, overlay)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_colors_cover_all_labels() {
        for class in 1..=9u8 {
            // Distinct from the neighboring class.
            if class < 9 {
                assert_ne!(class_color(class), class_color(class + 1));
            }
        }
    }

    #[test]
    fn test_amplitude_color_endpoints() {
        assert_eq!(amplitude_color(0.0), [247, 252, 253]);
        assert_eq!(amplitude_color(1.0), [77, 0, 75]);
        // Out-of-range input clamps instead of indexing out of bounds.
        assert_eq!(amplitude_color(-1.0), amplitude_color(0.0));
        assert_eq!(amplitude_color(2.0), amplitude_color(1.0));
    }

    #[test]
    fn test_view_transform_round_trip() {
        let mut view = ViewTransform::new();
        let rect = Rect::from_min_size(pos2(10.0, 20.0), vec2(500.0, 300.0));

        view.offset = vec2(-40.0, 25.0);
        view.zoom_at(rect, pos2(200.0, 150.0), 1.25);

        let p = Point::new(123.0, 45.0);
        let screen = view.data_to_screen(rect, 400, 100, p);
        let back = view.screen_to_data(rect, 400, 100, screen);
        assert!((back.x - p.x).abs() < 1e-3);
        assert!((back.y - p.y).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_keeps_cursor_point_fixed() {
        let mut view = ViewTransform::new();
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        let cursor = pos2(300.0, 200.0);

        let before = view.screen_to_data(rect, 200, 100, cursor);
        view.zoom_at(rect, cursor, 1.25);
        let after = view.screen_to_data(rect, 200, 100, cursor);

        assert!((before.x - after.x).abs() < 1e-3);
        assert!((before.y - after.y).abs() < 1e-3);
    }
}
