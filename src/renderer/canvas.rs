//! Canvas 2D renderer (WASM only)

use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::{LABEL_FONT, Rect, Renderer, avatar_rect, avatar_sprite, ball_rect, label_pos};
use crate::assets::state_index;
use crate::sim::{Avatar, Ball};

/// Loaded images, indexed like `AssetManifest`
pub struct SpriteSheet {
    pub avatars: [[Vec<HtmlImageElement>; 4]; 3],
    pub ball: HtmlImageElement,
}

pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
    sprites: SpriteSheet,
}

impl CanvasRenderer {
    pub fn new(canvas: &HtmlCanvasElement, sprites: SpriteSheet) -> Result<Self, JsValue> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        Ok(Self {
            ctx,
            width: canvas.width() as f64,
            height: canvas.height() as f64,
            sprites,
        })
    }

    fn draw_image(&self, img: &HtmlImageElement, rect: Rect) {
        if let Err(e) = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
            img,
            rect.x as f64,
            rect.y as f64,
            rect.w as f64,
            rect.h as f64,
        ) {
            log::warn!("drawImage failed: {:?}", e);
        }
    }
}

impl Renderer for CanvasRenderer {
    fn clear(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
    }

    fn draw_avatar(&mut self, avatar: &Avatar) {
        let key = avatar_sprite(avatar);
        let frames = &self.sprites.avatars[avatar.id.index()][state_index(key.state)];
        if let Some(img) = frames.get(key.frame).or_else(|| frames.first()) {
            self.draw_image(img, avatar_rect(avatar));
        }

        let label = label_pos(avatar);
        self.ctx.set_fill_style_str("black");
        self.ctx.set_font(LABEL_FONT);
        let _ = self
            .ctx
            .fill_text(avatar.id.name(), label.x as f64, label.y as f64);
    }

    fn draw_ball(&mut self, ball: &Ball) {
        self.draw_image(&self.sprites.ball, ball_rect(ball));
    }
}
