//! Shape and colour generation for 2D primitives

use std::f32::consts::TAU;

use glam::Vec2;

use crate::sim::{Obstacle, SizeClass, Tracer};

/// Body colour for each asteroid size class
pub fn asteroid_color(size_class: SizeClass) -> &'static str {
    match size_class {
        SizeClass::Small => "#A0522D",
        SizeClass::Medium => "#B8860B",
        SizeClass::Large => "#8B4513",
    }
}

/// Outline of an asteroid, relative to its center and before rotation
///
/// The per-vertex variation is seeded from the crater seed, so an asteroid
/// keeps the same silhouette every frame.
pub fn asteroid_outline(obstacle: &Obstacle) -> Vec<Vec2> {
    let shape = &obstacle.shape;
    let radius = Vec2::new(
        obstacle.size.x / 2.0,
        obstacle.size.y / 2.0 * shape.aspect,
    );
    let points = shape.points.max(3);

    (0..points)
        .map(|i| {
            let angle = i as f32 / points as f32 * TAU + shape.offset;
            let variation = 0.7 + (i as f32 * 2.3 + shape.crater_seed).sin() * shape.variation;
            Vec2::new(angle.cos(), angle.sin()) * radius * variation
        })
        .collect()
}

/// Crater offsets and radii for an asteroid, relative to its center
pub fn asteroid_craters(obstacle: &Obstacle) -> Vec<(Vec2, f32)> {
    let shape = &obstacle.shape;
    let extent = obstacle.size.min_element() / 2.0;
    let count = (shape.crater_density * 3.0).round().max(1.0) as u32;

    (0..count)
        .map(|i| {
            let seed = shape.crater_seed + i as f32 * 17.3;
            let angle = seed.sin() * TAU;
            let dist = (seed * 0.37).cos().abs() * extent * 0.5;
            let radius = extent * (0.12 + 0.08 * (seed * 1.7).sin().abs());
            (Vec2::new(angle.cos(), angle.sin()) * dist, radius)
        })
        .collect()
}

/// Glow colour of a tracer core, `hsla()` CSS syntax
pub fn tracer_color(tracer: &Tracer) -> String {
    let lightness = 50.0 + tracer.intensity * 30.0;
    format!(
        "hsla({:.0}, 100%, {:.0}%, {:.3})",
        tracer.hue,
        lightness,
        tracer.alpha()
    )
}

/// Exhaust particles cool from yellow-orange to red-orange
pub fn exhaust_color(fade: f32) -> &'static str {
    if fade > 0.5 { "#ffaa00" } else { "#ff6600" }
}

/// Font sizes (headline, countdown) for the warning overlay
pub fn warning_font_sizes(mobile: bool, viewport_width: f32, out_of_fuel: bool) -> (u32, u32) {
    let (main, sub, small) = if !mobile {
        (48, 32, 28)
    } else if viewport_width < 400.0 {
        (28, 18, 16)
    } else {
        (36, 24, 20)
    };
    (main, if out_of_fuel { small } else { sub })
}

/// Alpha of the flashing red overlay for a given warning tick
pub fn warning_flash_alpha(below_border_ticks: u32) -> f32 {
    0.3 + 0.2 * (below_border_ticks as f32 * 0.3).sin()
}
