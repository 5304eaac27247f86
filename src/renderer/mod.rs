//! Scene rendering
//!
//! Pure reads of the session. The browser build paints through
//! `CanvasRenderer`; anything implementing `Renderer` can stand in for it.

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::{CanvasRenderer, SpriteSheet};

use glam::Vec2;

use crate::consts::AVATAR_SIZE;
use crate::sim::{Avatar, AvatarState, Ball, Session};

/// Avatar label font and offset from the avatar center
pub const LABEL_FONT: &str = "16px Arial";
pub const LABEL_OFFSET: Vec2 = Vec2::new(-20.0, 60.0);

/// Axis-aligned draw rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn centered(center: Vec2, w: f32, h: f32) -> Self {
        Self {
            x: center.x - w / 2.0,
            y: center.y - h / 2.0,
            w,
            h,
        }
    }
}

/// Which image to draw for an avatar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteKey {
    pub state: AvatarState,
    pub frame: usize,
}

/// Sprite for the avatar's current pose. A thrower with no frame yet shows
/// the first throw frame.
pub fn avatar_sprite(avatar: &Avatar) -> SpriteKey {
    match avatar.state {
        AvatarState::Throw => SpriteKey {
            state: AvatarState::Throw,
            frame: avatar.throw_frame.unwrap_or(0),
        },
        state => SpriteKey { state, frame: 0 },
    }
}

pub fn avatar_rect(avatar: &Avatar) -> Rect {
    Rect::centered(avatar.pos, AVATAR_SIZE, AVATAR_SIZE)
}

pub fn label_pos(avatar: &Avatar) -> Vec2 {
    avatar.pos + LABEL_OFFSET
}

pub fn ball_rect(ball: &Ball) -> Rect {
    Rect::centered(ball.pos, ball.radius * 2.0, ball.radius * 2.0)
}

/// Drawing surface
pub trait Renderer {
    fn clear(&mut self);
    fn draw_avatar(&mut self, avatar: &Avatar);
    fn draw_ball(&mut self, ball: &Ball);
}

/// Paint the full scene
pub fn redraw<R: Renderer + ?Sized>(renderer: &mut R, session: &Session) {
    renderer.clear();
    for avatar in &session.avatars {
        renderer.draw_avatar(avatar);
    }
    renderer.draw_ball(&session.ball);
}
