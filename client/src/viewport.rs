//! Viewport controller.
//!
//! The camera is glued to the predicted local position: every frame the
//! offset is recomputed so the local actor sits at screen center. All
//! culling windows derive from here.

use tide_core::types::{WorldPosition, WorldRect};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub camera_offset_x: f64,
    pub camera_offset_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Viewport {
            camera_offset_x: 0.0,
            camera_offset_y: 0.0,
            width,
            height,
        }
    }

    /// Re-centers the camera on `focus` (the predicted local position).
    pub fn recenter(&mut self, focus: WorldPosition) {
        self.camera_offset_x = focus.x - self.width / 2.0;
        self.camera_offset_y = focus.y - self.height / 2.0;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        let center = self.center();
        self.width = width;
        self.height = height;
        self.recenter(center);
    }

    pub fn center(&self) -> WorldPosition {
        WorldPosition {
            x: self.camera_offset_x + self.width / 2.0,
            y: self.camera_offset_y + self.height / 2.0,
        }
    }

    /// World-space rectangle currently on screen.
    pub fn visible_rect(&self) -> WorldRect {
        WorldRect {
            min_x: self.camera_offset_x,
            min_y: self.camera_offset_y,
            max_x: self.camera_offset_x + self.width,
            max_y: self.camera_offset_y + self.height,
        }
    }

    /// The culling window: the visible rectangle grown by `margin` so
    /// entities slide in from off-screen instead of popping.
    pub fn cull_rect(&self, margin: f64) -> WorldRect {
        self.visible_rect().expanded(margin)
    }

    /// World to logical screen coordinates, for the drawing collaborator.
    pub fn world_to_screen(&self, pos: WorldPosition) -> (f64, f64) {
        (pos.x - self.camera_offset_x, pos.y - self.camera_offset_y)
    }
}
