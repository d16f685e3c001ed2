//! Paddle input translation

use crate::sim::{Arena, Paddle};

/// Arrow key direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    Left,
    Right,
}

impl KeyDirection {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(KeyDirection::Left),
            "ArrowRight" => Some(KeyDirection::Right),
            _ => None,
        }
    }
}

/// A discrete control event from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    Key(KeyDirection),
    /// Horizontal wheel/trackpad delta (positive = content scrolls right)
    Wheel { delta_x: f32 },
    /// Viewport size change (orientation follows from the new aspect)
    Resize { width: f32, height: f32 },
}

/// Turns control events into paddle displacement
#[derive(Debug, Clone, Copy)]
pub struct InputAdapter {
    key_step: f32,
}

impl InputAdapter {
    pub fn new(key_step: f32) -> Self {
        Self { key_step }
    }

    /// Requested displacement for a movement event (before clamping)
    pub fn displacement(&self, event: ControlEvent) -> Option<f32> {
        match event {
            ControlEvent::Key(KeyDirection::Left) => Some(-self.key_step),
            ControlEvent::Key(KeyDirection::Right) => Some(self.key_step),
            // Trackpad swipes move the paddle against the scroll direction
            ControlEvent::Wheel { delta_x } if delta_x.is_finite() => Some(-delta_x),
            ControlEvent::Wheel { delta_x } => {
                log::warn!("Ignoring non-finite wheel delta {delta_x}");
                None
            }
            ControlEvent::Resize { .. } => None,
        }
    }

    /// Apply a movement event to the paddle; returns the displacement actually applied
    pub fn apply(&self, paddle: &mut Paddle, arena: &Arena, event: ControlEvent) -> f32 {
        let Some(delta) = self.displacement(event) else {
            return 0.0;
        };
        let before = paddle.x;
        paddle.set_x(before + delta, arena);
        paddle.x - before
    }

    /// Refit the paddle after the arena changed
    pub fn refit(&self, paddle: &mut Paddle, arena: &Arena) {
        paddle.fit(arena);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaddleConfig;

    fn setup() -> (Paddle, Arena) {
        let arena = Arena::new(500.0, 400.0);
        let config = PaddleConfig {
            width: 100.0,
            height: 10.0,
            bottom_margin: 50.0,
            ..PaddleConfig::default()
        };
        (Paddle::new(&config, &arena), arena)
    }

    #[test]
    fn test_key_steps_and_clamps() {
        let (mut paddle, arena) = setup();
        let input = InputAdapter::new(75.0);
        assert_eq!(paddle.x, 200.0);

        assert_eq!(input.apply(&mut paddle, &arena, ControlEvent::Key(KeyDirection::Left)), -75.0);
        assert_eq!(paddle.x, 125.0);

        input.apply(&mut paddle, &arena, ControlEvent::Key(KeyDirection::Left));
        let moved = input.apply(&mut paddle, &arena, ControlEvent::Key(KeyDirection::Left));
        assert_eq!(paddle.x, 0.0);
        assert_eq!(moved, -50.0);
        let moved = input.apply(&mut paddle, &arena, ControlEvent::Key(KeyDirection::Left));
        assert_eq!(moved, 0.0);

        for _ in 0..10 {
            input.apply(&mut paddle, &arena, ControlEvent::Key(KeyDirection::Right));
        }
        assert_eq!(paddle.x, 400.0);
    }

    #[test]
    fn test_wheel_is_inverted() {
        let (mut paddle, arena) = setup();
        let input = InputAdapter::new(20.0);
        input.apply(&mut paddle, &arena, ControlEvent::Wheel { delta_x: 30.0 });
        assert_eq!(paddle.x, 170.0);
        input.apply(&mut paddle, &arena, ControlEvent::Wheel { delta_x: -12.5 });
        assert_eq!(paddle.x, 182.5);

        let moved = input.apply(&mut paddle, &arena, ControlEvent::Wheel { delta_x: f32::NAN });
        assert_eq!(moved, 0.0);
        assert_eq!(paddle.x, 182.5);
    }

    #[test]
    fn test_refit_after_resize() {
        let (mut paddle, _) = setup();
        let input = InputAdapter::new(20.0);
        paddle.x = 380.0;
        let smaller = Arena::new(300.0, 600.0);
        input.refit(&mut paddle, &smaller);
        assert_eq!(paddle.x, 200.0);
        assert_eq!(paddle.y, 540.0);
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(KeyDirection::from_key("ArrowLeft"), Some(KeyDirection::Left));
        assert_eq!(KeyDirection::from_key("ArrowRight"), Some(KeyDirection::Right));
        assert_eq!(KeyDirection::from_key("a"), None);
    }
}
