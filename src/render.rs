//! Drawing the scene onto a host surface
//!
//! The engine only ever writes to the surface; it never reads pixels back.

use glam::Vec2;

use crate::config::Palette;
use crate::sequence::SequenceStage;
use crate::sim::{Arena, Ball, Paddle};

/// A 2D surface the host provides (canvas context, terminal buffer, test recorder)
pub trait RenderTarget {
    fn clear(&mut self);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: &str);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: &str);
    /// Current surface size in arena units
    fn size(&self) -> (f32, f32);
}

/// Read-only snapshot of everything the host draws
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    pub stage: SequenceStage,
    pub arena: Arena,
    pub ball: &'a Ball,
    pub paddle: Option<&'a Paddle>,
    /// Phrase prefix revealed so far
    pub revealed: &'a str,
    /// False once the text fade has finished
    pub text_visible: bool,
}

impl SceneView<'_> {
    /// Whether the playfield should be drawn at all
    pub fn shows_playfield(&self) -> bool {
        matches!(
            self.stage,
            SequenceStage::Running | SequenceStage::Resolved | SequenceStage::Lost
        )
    }

    pub fn ball_center(&self) -> Vec2 {
        self.ball.pos
    }
}

/// Draw one frame: background, paddle, ball
pub fn draw_scene(target: &mut impl RenderTarget, view: &SceneView<'_>, palette: &Palette) {
    target.clear();
    let (width, height) = target.size();
    if let Some(background) = &palette.background {
        target.fill_rect(0.0, 0.0, width, height, background);
    }
    if !view.shows_playfield() {
        return;
    }

    if let Some(paddle) = view.paddle {
        target.fill_rect(paddle.x, paddle.y, paddle.width, paddle.height, &palette.paddle);
    }
    let center = view.ball_center();
    target.fill_circle(center.x, center.y, view.ball.radius, &palette.ball);
}
