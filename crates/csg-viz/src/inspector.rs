//! Viewer state for inspecting subtraction results.

use bsp_csg::{Mesh, SubtractReport};
use macroquad::prelude::*;

/// Which version of the last result is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Repaired,
    Raw,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Repaired => ViewMode::Raw,
            ViewMode::Raw => ViewMode::Repaired,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ViewMode::Repaired => "repaired",
            ViewMode::Raw => "raw",
        }
    }
}

/// Toggles and bookkeeping around the target's latest cut.
#[derive(Debug, Default)]
pub struct Inspector {
    mode: ViewMode,
    wireframe: bool,
    report: Option<SubtractReport>,
    status: String,
}

impl Inspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }

    pub fn toggle_wireframe(&mut self) {
        self.wireframe = !self.wireframe;
    }

    /// Remembers a committed cut and switches back to the repaired view.
    pub fn record(&mut self, report: SubtractReport) {
        self.status = format!(
            "cut: {} -> {} vertices, {} triangles",
            report.vertices_before, report.vertices_after, report.triangles_after
        );
        self.mode = ViewMode::Repaired;
        self.report = Some(report);
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// The mesh to draw for the target: its committed geometry, or the raw
    /// boolean output of the last cut in raw mode.
    pub fn displayed<'a>(&'a self, committed: &'a Mesh) -> &'a Mesh {
        match (self.mode, &self.report) {
            (ViewMode::Raw, Some(report)) => &report.raw,
            _ => committed,
        }
    }

    /// Handles the view toggles (Tab: raw/repaired, G: wireframe).
    pub fn update(&mut self) {
        if is_key_pressed(KeyCode::Tab) {
            self.toggle_mode();
        }
        if is_key_pressed(KeyCode::G) {
            self.toggle_wireframe();
        }
    }

    /// Draws the status overlay starting at `y_offset`.
    pub fn draw_ui(&self, displayed: &Mesh, y_offset: f32) {
        draw_text(
            &format!(
                "View: {} | {} vertices, {} triangles",
                self.mode.label(),
                displayed.vertex_count(),
                displayed.triangle_count()
            ),
            10.0,
            y_offset,
            18.0,
            WHITE,
        );
        draw_text(&self.status, 10.0, y_offset + 20.0, 18.0, YELLOW);
        draw_text(
            &format!(
                "[Tab] raw/repaired | [G] wireframe {}",
                if self.wireframe { "on" } else { "off" }
            ),
            10.0,
            y_offset + 40.0,
            16.0,
            DARKGRAY,
        );
    }
}
