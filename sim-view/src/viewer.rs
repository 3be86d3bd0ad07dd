//! Interactive forest viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Forest`] plus its noise
//! field and random source, and implements [`eframe::App`] to animate it
//! and paint the primitives it emits.

use eframe::App;
use glam::Vec2;
use grove_core::{
    config::Config,
    draw::{DrawPrimitive, Rgba},
    forest::Forest,
    noise_field::PerlinField,
};
use rand::{SeedableRng, rngs::StdRng};

const BACKGROUND: egui::Color32 = egui::Color32::from_gray(51);

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The simulation core: [`Forest`] and the [`PerlinField`] its wind is
///   sampled from.
/// - UI state (pan/zoom, run/pause, timing, the tree count text box).
/// - eframe/egui callbacks for drawing and user interaction.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true` and enough time has passed, call [`Viewer::step_once`].
/// 3. Paint the primitives from the latest step.
///
/// ### Fields
/// - `forest` - The trees being animated.
/// - `field` - Noise field driving every wind channel.
/// - `rng` - Random source for growth, leaf spawning and falling.
///
/// - `frame` - Number of simulation steps taken; the noise time is derived from it.
/// - `primitives` - What the last step asked to draw.
/// - `canvas` - Size of the drawing area the forest was laid out for.
///
/// - `running` - Whether the simulation is currently auto-advancing.
/// - `zoom` - Zoom factor for world-to-screen coordinate mapping.
/// - `pan` - Screen-space pan offset in pixels.
/// - `tree_count_input` - Contents of the tree count text box.
///
/// - `step_interval` - Target time step between automatic simulation steps (seconds).
/// - `last_step_time` - Time stamp of the last step (egui time).
/// - `last_step_dt` - Actual time delta between the last two steps (for display only).
pub struct Viewer {
    forest: Forest,
    field: PerlinField,
    rng: StdRng,

    frame: u64,
    primitives: Vec<DrawPrimitive>,
    canvas: Option<egui::Vec2>,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,
    tree_count_input: String,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
}

impl Viewer {
    /// Creates a viewer around a freshly planted forest.
    ///
    /// ### Parameters
    /// - `cfg` - Forest configuration (tree count, canvas size, leaf behaviour).
    /// - `seed` - Optional seed for reproducible runs; entropy is used otherwise.
    ///
    /// ### Returns
    /// A fully-initialized [`Viewer`] ready to be passed to `eframe::run_native`.
    pub fn new(cfg: Config, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let forest = Forest::new(cfg, &mut rng);

        Self {
            forest,
            field: PerlinField::new(cfg.noise_seed),
            rng,
            frame: 0,
            primitives: Vec::new(),
            canvas: None,
            running: true,
            zoom: 1.0,
            pan: egui::vec2(0.0, 0.0),
            tree_count_input: cfg.tree_count.to_string(),
            step_interval: 1.0 / 60.0,
            last_step_time: 0.0,
            last_step_dt: 0.0,
        }
    }

    /// Replants the forest with the current tree count and restarts time.
    ///
    /// The season settings and camera are kept.
    fn reset(&mut self) {
        let count = self.forest.config().tree_count;
        self.forest.regrow(count, &mut self.rng);
        self.frame = 0;
        self.primitives.clear();
    }

    /// Replants using whatever is typed in the tree count box. Unusable
    /// input falls back to the default count, which is written back.
    fn plant_from_input(&mut self) {
        let count = self.forest.regrow_from_input(&self.tree_count_input, &mut self.rng);
        self.tree_count_input = count.to_string();
        self.frame = 0;
        self.primitives.clear();
    }

    /// Advances the forest by a single frame and keeps its drawing.
    fn step_once(&mut self) {
        self.primitives = self.forest.advance(self.frame, &self.field, &mut self.rng);
        self.frame += 1;
    }

    /// Lays the forest out for a drawing area of `size` pixels.
    ///
    /// Trees are replanted when the area changes so they stand on the new
    /// bottom edge, like a sketch whose canvas matches the window.
    fn fit_to(&mut self, size: egui::Vec2) {
        if self.canvas == Some(size) || size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        self.canvas = Some(size);
        self.forest.resize(size.x / self.zoom, size.y / self.zoom);
        self.reset();
    }

    /// Converts a world-space position to screen-space.
    ///
    /// World coordinates are canvas pixels with y pointing down; they are
    /// scaled by `zoom` and offset by `pan` from the top-left of `rect`.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let origin = rect.left_top();
        egui::pos2(
            origin.x + p.x * self.zoom + self.pan.x,
            origin.y + p.y * self.zoom + self.pan.y,
        )
    }

    /// Converts a screen-space position back to world-space.
    ///
    /// This is the inverse of [`Viewer::world_to_screen`] (up to floating
    /// point rounding).
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let origin = rect.left_top();
        let x = (p.x - origin.x - self.pan.x) / self.zoom;
        let y = (p.y - origin.y - self.pan.y) / self.zoom;
        Vec2::new(x, y)
    }

    fn color32(c: Rgba) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
    }

    /// Helper to draw a labeled probability [`egui::DragValue`].
    ///
    /// ### Returns
    /// `true` if the user changed the value this frame.
    fn labeled_drag_probability(ui: &mut egui::Ui, label: &str, value: &mut f32) -> bool {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(
                egui::DragValue::new(value)
                    .range(0.0..=1.0)
                    .speed(0.0005)
                    .max_decimals(5),
            )
            .changed()
        })
        .inner
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.001..=1.0)
                        .speed(0.001),
                );

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.1..=10.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (timing, frame, tree/branch/leaf counts).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt target = {:.3} s", self.step_interval));
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                ui.label(format!("frame = {}", self.frame));
                ui.label(format!("trees = {}", self.forest.trees().len()));
                ui.label(format!(
                    "branches = {}",
                    self.forest
                        .trees()
                        .iter()
                        .map(|t| t.branch_count())
                        .sum::<usize>()
                ));
                ui.label(format!("leaves = {}", self.forest.leaf_count()));
            });
        });
    }

    /// Builds the right-hand panel: planting and season controls.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Forest");

                ui.separator();
                ui.horizontal(|ui| {
                    ui.label("trees:");
                    let response = ui.text_edit_singleline(&mut self.tree_count_input);
                    let submitted =
                        response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if ui.button("Plant").clicked() || submitted {
                        self.plant_from_input();
                    }
                });

                ui.separator();
                ui.label("Seasons");
                if ui.button("🍂 Autumn colors").clicked() {
                    self.forest.fast_aging();
                }
                if ui.button("🍃 Shed leaves").clicked() {
                    self.forest.shed_leaves();
                }
                if ui.button("❄ No new leaves").clicked() {
                    self.forest.suppress_spawning();
                }
                if ui.button("🌱 Reset seasons").clicked() {
                    self.forest.reset_seasons();
                }

                ui.separator();
                ui.label("Leaf rates (per frame)");
                let mut params = self.forest.config().tree;
                if Self::labeled_drag_probability(
                    ui,
                    "color change:",
                    &mut params.color_change_speed,
                ) {
                    self.forest.set_color_change_speed(params.color_change_speed);
                }
                if Self::labeled_drag_probability(ui, "drop:", &mut params.drop_leaf_rate) {
                    self.forest.set_drop_leaf_rate(params.drop_leaf_rate);
                }
                if Self::labeled_drag_probability(ui, "spawn:", &mut params.leaf_spawn_rate) {
                    self.forest.set_leaf_spawn_rate(params.leaf_spawn_rate);
                }
            });
    }

    /// Paints one primitive through the current camera.
    fn paint_primitive(&self, painter: &egui::Painter, rect: egui::Rect, primitive: &DrawPrimitive) {
        match *primitive {
            DrawPrimitive::Line {
                from,
                to,
                stroke_width,
                color,
            } => {
                let a = self.world_to_screen(from, rect);
                let b = self.world_to_screen(to, rect);
                let stroke = egui::Stroke::new(stroke_width * self.zoom, Self::color32(color));
                painter.line_segment([a, b], stroke);
            }
            DrawPrimitive::Circle {
                center,
                diameter,
                color,
            } => {
                let c = self.world_to_screen(center, rect);
                painter.circle_filled(c, diameter * 0.5 * self.zoom, Self::color32(color));
            }
        }
    }

    /// Builds the central panel where the forest is animated and drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(BACKGROUND))
            .show(ctx, |ui| {
                let response = ui.allocate_response(ui.available_size(), egui::Sense::drag());
                let rect = response.rect;
                self.fit_to(rect.size());

                // Pan with drag.
                if response.dragged() {
                    self.pan += response.drag_delta();
                }

                // Zoom around the mouse cursor.
                let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0 {
                    let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                    let world_before = self.screen_to_world(pointer_screen, rect);

                    let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                    self.zoom = (self.zoom * factor).clamp(0.1, 10.0);

                    let screen_after = self.world_to_screen(world_before, rect);
                    self.pan += pointer_screen - screen_after;
                }

                // Auto-run simulation if requested.
                if self.running {
                    let now = ctx.input(|i| i.time);
                    let elapsed = now - self.last_step_time;
                    if elapsed >= self.step_interval {
                        if self.last_step_time > 0.0 {
                            self.last_step_dt = elapsed;
                        }
                        self.step_once();
                        self.last_step_time = now;
                    }
                    ctx.request_repaint();
                }

                let painter = ui.painter_at(rect);
                for primitive in &self.primitives {
                    self.paint_primitive(&painter, rect, primitive);
                }
            });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    ///
    /// This method:
    /// - Renders the top control bar and status bar.
    /// - Renders the forest side panel.
    /// - Steps and draws the forest in the central view.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn test_rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::new(0.0, 0.0), egui::vec2(800.0, 600.0))
    }

    fn viewer() -> Viewer {
        let cfg = Config {
            min_iterations: 2,
            max_iterations: 3,
            ..Config::default()
        };
        Viewer::new(cfg, Some(7))
    }

    #[test]
    fn world_to_screen_and_back_is_roundtrip() {
        let mut viewer = viewer();
        // Use non-trivial zoom and pan to exercise the math.
        viewer.zoom = 2.0;
        viewer.pan = egui::vec2(15.0, -7.0);
        let rect = test_rect();

        let world_points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, -5.0),
            Vec2::new(-3.5, 8.25),
        ];

        let eps = 1e-5;

        for p in world_points {
            let screen = viewer.world_to_screen(p, rect);
            let back = viewer.screen_to_world(screen, rect);

            assert!(
                (back.x - p.x).abs() < eps && (back.y - p.y).abs() < eps,
                "roundtrip mismatch: p={:?}, back={:?}",
                p,
                back
            );
        }
    }

    #[test]
    fn step_once_advances_frame_and_collects_primitives() {
        let mut viewer = viewer();
        assert!(viewer.primitives.is_empty());

        viewer.step_once();
        viewer.step_once();

        assert_eq!(viewer.frame, 2);
        let branches: usize = viewer.forest.trees().iter().map(|t| t.branch_count()).sum();
        assert!(viewer.primitives.len() >= branches);
    }

    #[test]
    fn reset_restarts_time_and_keeps_tree_count() {
        let mut viewer = viewer();
        for _ in 0..5 {
            viewer.step_once();
        }

        viewer.reset();

        assert_eq!(viewer.frame, 0);
        assert!(viewer.primitives.is_empty());
        assert_eq!(viewer.forest.trees().len(), 2);
        assert_eq!(viewer.forest.leaf_count(), 0);
    }

    #[test]
    fn planting_garbage_falls_back_to_default_count() {
        let mut viewer = viewer();

        viewer.tree_count_input = "5".into();
        viewer.plant_from_input();
        assert_eq!(viewer.forest.trees().len(), 5);

        viewer.tree_count_input = "many".into();
        viewer.plant_from_input();
        assert_eq!(viewer.forest.trees().len(), 2);
        assert_eq!(viewer.tree_count_input, "2");
    }

    #[test]
    fn fitting_to_canvas_moves_trees_to_the_bottom_edge() {
        let mut viewer = viewer();
        viewer.fit_to(egui::vec2(640.0, 360.0));

        assert_eq!(viewer.forest.config().ground_height, 360.0);
        for tree in viewer.forest.trees() {
            assert_eq!(tree.root().begin.y, 360.0);
            assert!(tree.root().begin.x < 640.0);
        }

        // Same size again is a no-op.
        viewer.step_once();
        viewer.fit_to(egui::vec2(640.0, 360.0));
        assert_eq!(viewer.frame, 1);
    }
}
