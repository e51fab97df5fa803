//! Canvas2D renderer
//!
//! Draws one frame from a `&GameState`. World-space drawing happens under a
//! camera translation; the out-of-bounds warning is drawn in screen space.

use std::f64::consts::TAU;

use glam::Vec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::shapes;
use super::starfield::{ShootingStar, Starfield};
use crate::consts::{PLAYER_HEIGHT, PLAYER_WIDTH};
use crate::sim::{
    BorderWarning, Collectible, CollectibleKind, CollectibleMotion, GamePhase, GameState, Obstacle,
    ObstacleKind, Particle, ParticleKind, Player,
};
use crate::ui;

const SPACE_COLOR: &str = "#0a0520";
const SPARK_COLOR: &str = "#ff6600";

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    starfield: Starfield,
    /// Device pixels per CSS pixel
    dpr: f64,
    mobile: bool,
}

impl CanvasRenderer {
    pub fn new(canvas: HtmlCanvasElement, seed: u64, mobile: bool) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let width = canvas.client_width().max(1) as f32;
        let height = canvas.client_height().max(1) as f32;
        let starfield = Starfield::new(seed, width, height);

        Ok(Self {
            canvas,
            ctx,
            starfield,
            dpr: 1.0,
            mobile,
        })
    }

    /// Resize the backing store to `width` x `height` CSS pixels
    pub fn resize(&mut self, width: f32, height: f32, dpr: f64) {
        self.dpr = dpr;
        self.canvas.set_width((f64::from(width) * dpr) as u32);
        self.canvas.set_height((f64::from(height) * dpr) as u32);
        log::debug!("Canvas resized to {width}x{height} @{dpr}x");
    }

    /// Advance background effects by one simulation tick
    pub fn step(&mut self, state: &GameState) {
        self.starfield.step_shooting_stars(
            state.camera.y,
            state.viewport.width,
            state.viewport.height,
        );
    }

    /// Draw a frame; `time` is the rAF timestamp in milliseconds
    pub fn render(&mut self, state: &GameState, time: f64) {
        if let Err(e) = self.draw(state, time) {
            log::warn!("Render error: {e:?}");
        }
    }

    fn draw(&mut self, state: &GameState, time: f64) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let width = f64::from(state.viewport.width);
        let height = f64::from(state.viewport.height);
        let camera_y = state.camera.y;

        ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0)?;
        ctx.set_fill_style_str(SPACE_COLOR);
        ctx.fill_rect(0.0, 0.0, width, height);

        self.starfield
            .recycle(camera_y, state.viewport.width, state.viewport.height);

        ctx.save();
        ctx.translate(0.0, -f64::from(camera_y))?;

        ctx.set_fill_style_str("white");
        for star in &self.starfield.stars {
            ctx.set_global_alpha(f64::from(star.alpha()));
            let size = f64::from(star.size);
            ctx.fill_rect(f64::from(star.pos.x), f64::from(star.pos.y), size, size);
        }
        ctx.set_global_alpha(1.0);
        for star in &self.starfield.shooting_stars {
            draw_shooting_star(ctx, star)?;
        }

        draw_moon(ctx, width / 2.0, f64::from(state.moon.y), f64::from(state.moon.size))?;
        for collectible in &state.collectibles {
            draw_collectible(ctx, collectible)?;
        }
        for obstacle in &state.obstacles {
            draw_obstacle(ctx, obstacle)?;
        }
        for particle in &state.particles {
            draw_particle(ctx, particle);
        }
        draw_tracers(ctx, state)?;
        if state.phase != GamePhase::Menu {
            draw_player(ctx, &state.player, time)?;
        }

        ctx.restore();

        if let Some(warning) = &state.hud.border_warning {
            if state.phase == GamePhase::Playing {
                self.draw_warning(state, warning)?;
            }
        }
        Ok(())
    }

    fn draw_warning(&self, state: &GameState, warning: &BorderWarning) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let width = f64::from(state.viewport.width);
        let height = f64::from(state.viewport.height);

        ctx.save();
        ctx.set_global_alpha(f64::from(shapes::warning_flash_alpha(state.below_border_ticks)));
        ctx.set_fill_style_str("#ff0000");
        ctx.fill_rect(0.0, 0.0, width, height);

        ctx.set_global_alpha(1.0);
        ctx.set_fill_style_str("#ffffff");
        ctx.set_text_align("center");

        let (headline, countdown) = ui::border_warning_text(warning);
        let (main_px, sub_px) =
            shapes::warning_font_sizes(self.mobile, state.viewport.width, warning.out_of_fuel);
        ctx.set_font(&format!("bold {main_px}px Orbitron, monospace"));
        ctx.fill_text(headline, width / 2.0, height / 2.0 - 40.0)?;
        ctx.set_font(&format!("bold {sub_px}px Orbitron, monospace"));
        ctx.fill_text(&countdown, width / 2.0, height / 2.0 + 20.0)?;

        ctx.restore();
        Ok(())
    }
}

fn circle(ctx: &CanvasRenderingContext2d, x: f64, y: f64, r: f64) -> Result<(), JsValue> {
    ctx.move_to(x + r, y);
    ctx.arc(x, y, r, 0.0, TAU)
}

fn draw_moon(ctx: &CanvasRenderingContext2d, x: f64, y: f64, size: f64) -> Result<(), JsValue> {
    ctx.set_fill_style_str("#dddddd");
    ctx.begin_path();
    circle(ctx, x, y, size)?;
    ctx.fill();

    // Craters
    ctx.set_fill_style_str("#aaaaaa");
    ctx.begin_path();
    circle(ctx, x - 50.0, y - 30.0, 25.0)?;
    circle(ctx, x + 60.0, y + 20.0, 20.0)?;
    circle(ctx, x - 20.0, y + 50.0, 30.0)?;
    ctx.fill();
    Ok(())
}

fn draw_collectible(ctx: &CanvasRenderingContext2d, collectible: &Collectible) -> Result<(), JsValue> {
    if collectible.collected {
        return Ok(());
    }
    let center = collectible.center();
    ctx.save();
    ctx.translate(f64::from(center.x), f64::from(center.y))?;

    match collectible.kind {
        CollectibleKind::Fuel => {
            let phase = match collectible.motion {
                CollectibleMotion::Static { bob_phase } => bob_phase,
                CollectibleMotion::Falling { wobble, .. } => wobble,
            };
            let pulse = f64::from(0.8 + 0.2 * (phase * 2.0).sin());

            ctx.set_shadow_color("#00ff88");
            ctx.set_shadow_blur(15.0);
            ctx.set_fill_style_str("#00ff88");
            ctx.fill_rect(-14.0 * pulse, -18.0, 28.0 * pulse, 36.0);
            ctx.set_shadow_blur(0.0);

            ctx.set_fill_style_str("#66ffaa");
            ctx.fill_rect(-10.0 * pulse, -15.0, 20.0 * pulse, 30.0);
            ctx.set_fill_style_str("#00cc66");
            ctx.fill_rect(-8.0 * pulse, -12.0, 16.0 * pulse, 24.0);

            // Gauge stripes
            ctx.set_fill_style_str("#ffffff");
            for i in 0..3 {
                ctx.fill_rect(-6.0 * pulse, -8.0 + f64::from(i) * 6.0, 12.0 * pulse, 2.0);
            }
        }
        CollectibleKind::Coin => {
            ctx.set_fill_style_str("#ffdd00");
            ctx.begin_path();
            circle(ctx, 0.0, 0.0, 15.0)?;
            ctx.fill();

            ctx.set_fill_style_str("#ffaa00");
            ctx.begin_path();
            circle(ctx, 0.0, 0.0, 10.0)?;
            ctx.fill();

            ctx.set_fill_style_str("#ffffff");
            ctx.set_font("bold 14px Arial");
            ctx.set_text_align("center");
            ctx.fill_text("$", 0.0, 4.0)?;
        }
    }

    ctx.restore();
    Ok(())
}

fn draw_obstacle(ctx: &CanvasRenderingContext2d, obstacle: &Obstacle) -> Result<(), JsValue> {
    // Trail sits behind the body, in world space
    if let ObstacleKind::Ricochet(ricochet) = &obstacle.kind {
        ctx.set_fill_style_str(SPARK_COLOR);
        for point in &ricochet.trail {
            let alpha = point.alpha();
            ctx.set_global_alpha(f64::from(alpha * 0.6));
            ctx.begin_path();
            circle(
                ctx,
                f64::from(point.pos.x),
                f64::from(point.pos.y),
                f64::from(point.size * alpha),
            )?;
            ctx.fill();
        }
        ctx.set_global_alpha(1.0);
    }

    let center = obstacle.center();
    ctx.save();
    ctx.translate(f64::from(center.x), f64::from(center.y))?;
    ctx.rotate(f64::from(obstacle.rotation))?;

    if let ObstacleKind::Ricochet(ricochet) = &obstacle.kind {
        ctx.set_shadow_color(SPARK_COLOR);
        ctx.set_shadow_blur(f64::from(10.0 + ricochet.glow * 20.0));
    }

    ctx.set_fill_style_str(shapes::asteroid_color(obstacle.size_class));
    ctx.begin_path();
    trace_polygon(ctx, &shapes::asteroid_outline(obstacle));
    ctx.fill();
    ctx.set_shadow_blur(0.0);

    ctx.set_fill_style_str("#2F1B14");
    ctx.begin_path();
    for (offset, radius) in shapes::asteroid_craters(obstacle) {
        circle(ctx, f64::from(offset.x), f64::from(offset.y), f64::from(radius))?;
    }
    ctx.fill();

    ctx.restore();
    Ok(())
}

fn trace_polygon(ctx: &CanvasRenderingContext2d, points: &[Vec2]) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    ctx.move_to(f64::from(first.x), f64::from(first.y));
    for p in rest {
        ctx.line_to(f64::from(p.x), f64::from(p.y));
    }
    ctx.close_path();
}

fn draw_particle(ctx: &CanvasRenderingContext2d, particle: &Particle) {
    let fade = particle.fade();
    let (color, max_size) = match particle.kind {
        ParticleKind::Exhaust => (shapes::exhaust_color(fade), 6.0),
        ParticleKind::Fuel => ("#00ff88", 8.0),
        ParticleKind::Spark => (SPARK_COLOR, 6.0),
    };
    let size = f64::from(fade * max_size);
    ctx.set_global_alpha(f64::from(fade));
    ctx.set_fill_style_str(color);
    ctx.fill_rect(
        f64::from(particle.pos.x) - size / 2.0,
        f64::from(particle.pos.y) - size / 2.0,
        size,
        size,
    );
    ctx.set_global_alpha(1.0);
}

fn draw_shooting_star(ctx: &CanvasRenderingContext2d, star: &ShootingStar) -> Result<(), JsValue> {
    if star.trail.len() < 2 {
        return Ok(());
    }
    let alpha = f64::from(star.alpha());
    let size = f64::from(star.size);

    ctx.set_line_width(size * 0.8);
    ctx.set_line_cap("round");
    let segments = star.trail.len() as f64;
    for (i, (from, to)) in star.trail.iter().zip(star.trail.iter().skip(1)).enumerate() {
        let fade = alpha * (1.0 - (i + 1) as f64 / segments) * 0.6;
        ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {fade:.3})"));
        ctx.begin_path();
        ctx.move_to(f64::from(from.x), f64::from(from.y));
        ctx.line_to(f64::from(to.x), f64::from(to.y));
        ctx.stroke();
    }

    let (x, y) = (f64::from(star.pos.x), f64::from(star.pos.y));
    ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {:.3})", alpha * 0.4));
    ctx.begin_path();
    circle(ctx, x, y, size * 1.5)?;
    ctx.fill();
    ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {:.3})", alpha * 0.6));
    ctx.begin_path();
    circle(ctx, x, y, size * 0.4)?;
    ctx.fill();
    Ok(())
}

fn draw_tracers(ctx: &CanvasRenderingContext2d, state: &GameState) -> Result<(), JsValue> {
    for tracer in &state.tracers {
        ctx.set_fill_style_str(&shapes::tracer_color(tracer));
        ctx.begin_path();
        circle(
            ctx,
            f64::from(tracer.pos.x),
            f64::from(tracer.pos.y),
            f64::from(tracer.size * tracer.alpha()),
        )?;
        ctx.fill();
    }
    Ok(())
}

fn draw_player(ctx: &CanvasRenderingContext2d, player: &Player, time: f64) -> Result<(), JsValue> {
    let x = f64::from(player.pos.x);
    let y = f64::from(player.pos.y);

    // Body
    ctx.set_fill_style_str("#00ddaa");
    ctx.fill_rect(x, y, f64::from(PLAYER_WIDTH), f64::from(PLAYER_HEIGHT));

    // Eyes
    ctx.set_fill_style_str("white");
    ctx.begin_path();
    circle(ctx, x + 12.0, y + 15.0, 6.0)?;
    circle(ctx, x + 28.0, y + 15.0, 6.0)?;
    ctx.fill();
    ctx.set_fill_style_str("black");
    ctx.begin_path();
    circle(ctx, x + 13.0, y + 15.0, 3.0)?;
    circle(ctx, x + 27.0, y + 15.0, 3.0)?;
    ctx.fill();

    // Jetpack
    ctx.set_fill_style_str("#ff6600");
    ctx.fill_rect(x + 5.0, y + 35.0, 10.0, 12.0);
    ctx.fill_rect(x + 25.0, y + 35.0, 10.0, 12.0);

    if player.is_burning() {
        let flame = 15.0 + 5.0 * (time * 0.05).sin();
        ctx.set_fill_style_str("#ffaa00");
        ctx.fill_rect(x + 7.0, y + 47.0, 6.0, flame);
        ctx.fill_rect(x + 27.0, y + 47.0, 6.0, flame);
        ctx.set_fill_style_str("#ffff00");
        ctx.fill_rect(x + 9.0, y + 47.0, 2.0, flame * 0.7);
        ctx.fill_rect(x + 29.0, y + 47.0, 2.0, flame * 0.7);
    }

    // Antennas
    ctx.set_stroke_style_str("#00ddaa");
    ctx.set_line_width(2.0);
    ctx.begin_path();
    ctx.move_to(x + 15.0, y);
    ctx.line_to(x + 15.0, y - 8.0);
    ctx.move_to(x + 25.0, y);
    ctx.line_to(x + 25.0, y - 8.0);
    ctx.stroke();

    ctx.set_fill_style_str("#00ffcc");
    ctx.begin_path();
    circle(ctx, x + 15.0, y - 10.0, 3.0)?;
    circle(ctx, x + 25.0, y - 10.0, 3.0)?;
    ctx.fill();
    Ok(())
}
