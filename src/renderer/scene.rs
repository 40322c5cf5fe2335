//! Builds the frame's triangle list from game state
//!
//! Requesting the visible neighborhood here is what lazily generates cells
//! as the map scrolls.

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors};
use super::view::MapView;
use crate::sim::GameState;

/// Marker radius in pixels
const PLAYER_RADIUS: f32 = 7.0;
/// Gap between adjacent cache squares
const CELL_INSET: f32 = 1.5;

/// Layers toggled by settings
#[derive(Debug, Clone, Copy)]
pub struct SceneOptions {
    pub show_trail: bool,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self { show_trail: true }
    }
}

/// Fill color for a cache holding `coins` out of a nominal `max`
pub fn cache_color(coins: usize, max: u32) -> [f32; 4] {
    if coins == 0 {
        return colors::CACHE_EMPTY;
    }
    // Brighter with more coins; caches can exceed max once players drop coins
    let t = (coins as f32 / max.max(1) as f32).min(1.0);
    let [r, g, b, _] = colors::CACHE_FULL;
    [r, g, b, 0.45 + 0.55 * t]
}

/// All vertices for one frame, in logical screen pixels
pub fn build(state: &mut GameState, view: &MapView, options: SceneOptions) -> Vec<Vertex> {
    let tile = state.rules.tile_degrees;
    let max_coins = state.rules.max_coins;
    let mut vertices = Vec::new();

    // Caches
    for cell in state.visible_caches() {
        let (min, max) = view.cell_rect(cell, tile);
        if !view.is_on_screen(min, max) {
            continue;
        }
        let inset = Vec2::splat(CELL_INSET);
        let coins = state.board.get(cell).map_or(0, |c| c.coins.len());
        vertices.extend(shapes::rect(min + inset, max - inset, cache_color(coins, max_coins)));
        if state.opened == Some(cell) {
            vertices.extend(shapes::rect_outline(min, max, 2.0, colors::CACHE_OPENED));
        }
    }

    // Visibility boundary
    let bounds = state.visible_bounds();
    let min = view.to_screen(bounds.south_west);
    let max = view.to_screen(bounds.north_east);
    vertices.extend(shapes::rect_outline(
        Vec2::new(min.x, max.y),
        Vec2::new(max.x, min.y),
        2.0,
        colors::VISIBILITY,
    ));

    // Movement history
    if options.show_trail {
        let points: Vec<Vec2> = state.trail.iter().map(|p| view.to_screen(*p)).collect();
        vertices.extend(shapes::polyline(&points, 3.0, colors::TRAIL));
    }

    // Player marker
    let marker = view.to_screen(state.position);
    vertices.extend(shapes::ring(
        marker,
        PLAYER_RADIUS,
        PLAYER_RADIUS + 2.0,
        colors::PLAYER_RING,
        24,
    ));
    vertices.extend(shapes::circle(marker, PLAYER_RADIUS, colors::PLAYER, 24));

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Rules;
    use crate::sim::{Command, Direction, apply};

    fn setup(probability: f64) -> (GameState, MapView) {
        let rules = Rules {
            spawn_probability: probability,
            neighborhood_size: 2,
            ..Rules::default()
        };
        let state = GameState::new(rules.clone());
        let view = MapView::new(state.position, 20.0, rules.tile_degrees, Vec2::new(400.0, 400.0));
        (state, view)
    }

    /// Vertices for visibility outline + marker ring + marker circle
    const FIXED: usize = 24 + 24 * 6 + 24 * 3;

    #[test]
    fn test_empty_world_draws_marker_and_bounds() {
        let (mut state, view) = setup(0.0);
        let v = build(&mut state, &view, SceneOptions::default());
        assert_eq!(v.len(), FIXED);
        // Rendering requested the whole neighborhood
        assert_eq!(state.board.len(), 25);
    }

    #[test]
    fn test_every_cell_drawn_when_all_present() {
        let (mut state, view) = setup(1.0);
        let v = build(&mut state, &view, SceneOptions::default());
        let caches = state.visible_caches().len();
        assert_eq!(v.len(), FIXED + caches * 6);
    }

    #[test]
    fn test_opened_cache_is_outlined() {
        let (mut state, view) = setup(1.0);
        let cell = state.player_cell();
        apply(&mut state, &Command::Open(cell)).unwrap();
        let v = build(&mut state, &view, SceneOptions { show_trail: false });
        assert!(v.iter().any(|vx| vx.color == colors::CACHE_OPENED));
    }

    #[test]
    fn test_trail_toggle() {
        let (mut state, view) = setup(0.0);
        apply(&mut state, &Command::Move(Direction::East)).unwrap();
        let with = build(&mut state, &view, SceneOptions { show_trail: true }).len();
        let without = build(&mut state, &view, SceneOptions { show_trail: false }).len();
        assert_eq!(with - without, 6);
    }

    #[test]
    fn test_cache_color() {
        assert_eq!(cache_color(0, 10), colors::CACHE_EMPTY);
        assert_eq!(cache_color(10, 10)[3], 1.0);
        assert_eq!(cache_color(50, 10)[3], 1.0);
        assert!(cache_color(1, 10)[3] < cache_color(5, 10)[3]);
    }
}
