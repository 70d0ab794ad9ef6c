use glam::Vec2;

/// Output boundary of the growth engine.
///
/// The engine calls a renderer only after a candidate has been
/// accepted; nothing the renderer does feeds back into growth
/// decisions, except the stroke endpoint returned by
/// [`Renderer::draw_stroke`], which the engine stores as the new
/// node's position so the drawn stroke and the tree stay in register.
pub trait Renderer {
    /// Stamps circles of `radius` along the segment from `from` to
    /// `to` and returns the final stamped point. The returned point may
    /// overshoot `to` by less than one stamp spacing.
    fn draw_stroke(&mut self, from: Vec2, to: Vec2, radius: f32) -> Vec2;

    /// Stamps a single circle; used for source nodes.
    fn draw_circle(&mut self, pos: Vec2, radius: f32);
}

/// Renderer that draws nothing and never snaps positions; for tests
/// and headless runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw_stroke(&mut self, _from: Vec2, to: Vec2, _radius: f32) -> Vec2 {
        to
    }

    fn draw_circle(&mut self, _pos: Vec2, _radius: f32) {}
}
