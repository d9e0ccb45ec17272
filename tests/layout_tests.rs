mod common;

use common::{assert_close, sample_meta};
use msdf_text_bench::layout::SPACE_ADVANCE;
use msdf_text_bench::utils::{Bounds, Position, Size};
use msdf_text_bench::GlyphLayoutEngine;

fn square_surface() -> Size {
    Size::new(1000.0, 1000.0)
}

#[test]
fn single_glyph_places_quad_at_pen_and_advances() {
    let meta = sample_meta();
    let engine = GlyphLayoutEngine::new(&meta, square_surface());

    let layout = engine.layout("A", 100.0, Position::default());

    assert_eq!(layout.commands.len(), 1);
    let cmd = layout.commands[0];
    assert_close(cmd.size_in_units.width, 0.1);
    assert_close(cmd.size_in_units.height, 0.1);
    assert_eq!(cmd.pen_offset, Position::new(0.0, 0.0));
    assert_eq!(cmd.plane, Bounds::new(0.0, 0.0, 0.5, 0.7));
    assert_close(layout.pen.x, 0.06);
    assert_close(layout.pen.y, 0.0);
}

#[test]
fn atlas_rect_is_normalized_by_atlas_size() {
    let meta = sample_meta();
    let engine = GlyphLayoutEngine::new(&meta, square_surface());

    let layout = engine.layout("B", 100.0, Position::default());
    let rect = layout.commands[0].atlas_rect;

    assert_close(rect.left, 0.2);
    assert_close(rect.bottom, 0.0);
    assert_close(rect.right, 0.4);
    assert_close(rect.top, 0.6);
}

#[test]
fn space_uses_fixed_advance_and_emits_nothing() {
    let meta = sample_meta();
    let engine = GlyphLayoutEngine::new(&meta, square_surface());

    // The atlas carries its own space glyph with a different advance.
    let layout = engine.layout(" ", 100.0, Position::default());

    assert!(layout.commands.is_empty());
    assert_close(layout.pen.x, 0.1 * SPACE_ADVANCE);
    assert_close(layout.pen.x, 0.05);
}

#[test]
fn pen_advance_is_sum_of_glyph_advances() {
    let meta = sample_meta();
    let engine = GlyphLayoutEngine::new(&meta, Size::new(800.0, 600.0));
    let units = 40.0 / 800.0;

    let layout = engine.layout("AB A\tB", 40.0, Position::default());

    let expected = units * (0.6 + 0.55 + SPACE_ADVANCE + 0.6 + 1.0 + 0.55);
    assert_close(layout.pen.x, expected);
    assert_eq!(layout.commands.len(), 4);
}

#[test]
fn glyphs_are_placed_left_to_right() {
    let meta = sample_meta();
    let engine = GlyphLayoutEngine::new(&meta, square_surface());

    let layout = engine.layout("AB", 100.0, Position::new(0.25, 0.5));

    let xs: Vec<f32> = layout.commands.iter().map(|c| c.pen_offset.x).collect();
    assert_close(xs[0], 0.25);
    assert_close(xs[1], 0.31);
    assert!(layout.commands.iter().all(|c| c.pen_offset.y == 0.5));
}

#[test]
fn missing_glyph_is_skipped_without_advance() {
    let meta = sample_meta();
    let engine = GlyphLayoutEngine::new(&meta, square_surface());

    let layout = engine.layout("AzA", 100.0, Position::default());

    assert_eq!(layout.commands.len(), 2);
    assert_close(layout.commands[1].pen_offset.x, 0.06);
    assert_close(layout.pen.x, 0.12);
}

#[test]
fn glyph_without_bounds_only_advances() {
    let meta = sample_meta();
    let engine = GlyphLayoutEngine::new(&meta, square_surface());

    let layout = engine.layout("\tA", 100.0, Position::default());

    assert_eq!(layout.commands.len(), 1);
    assert_close(layout.commands[0].pen_offset.x, 0.1);
}

#[test]
fn astral_plane_characters_resolve_to_one_glyph() {
    let meta = sample_meta();
    let engine = GlyphLayoutEngine::new(&meta, square_surface());

    let layout = engine.layout("\u{1F600}", 100.0, Position::default());

    assert_eq!(layout.commands.len(), 1);
    assert_close(layout.commands[0].atlas_rect.left, 0.4);
    assert_close(layout.commands[0].atlas_rect.top, 1.0);
    assert_close(layout.pen.x, 0.1);
}

#[test]
fn layout_is_deterministic() {
    let meta = sample_meta();
    let engine = GlyphLayoutEngine::new(&meta, Size::new(1280.0, 720.0));

    let first = engine.layout("BAA B\u{1F600}", 73.5, Position::new(0.1, 0.3));
    let second = engine.layout("BAA B\u{1F600}", 73.5, Position::new(0.1, 0.3));

    assert_eq!(first, second);
    assert_eq!(first.pen.x.to_bits(), second.pen.x.to_bits());
}

#[test]
fn runs_chain_through_returned_pen() {
    let meta = sample_meta();
    let engine = GlyphLayoutEngine::new(&meta, square_surface());

    let head = engine.layout("AB", 64.0, Position::default());
    let tail = engine.layout(" BA", 64.0, head.pen);
    let whole = engine.layout("AB BA", 64.0, Position::default());

    let mut chained = head.commands.clone();
    chained.extend(tail.commands);
    assert_eq!(chained, whole.commands);
    assert_eq!(tail.pen, whole.pen);
}

#[test]
fn empty_surface_yields_no_commands() {
    let meta = sample_meta();
    let engine = GlyphLayoutEngine::new(&meta, Size::new(0.0, 600.0));

    let pen = Position::new(0.2, 0.4);
    let layout = engine.layout("AB", 100.0, pen);

    assert!(layout.commands.is_empty());
    assert_eq!(layout.pen, pen);
}

#[test]
fn empty_text_leaves_pen_in_place() {
    let meta = sample_meta();
    let engine = GlyphLayoutEngine::new(&meta, square_surface());

    let layout = engine.layout("", 100.0, Position::new(0.3, 0.3));

    assert!(layout.commands.is_empty());
    assert_eq!(layout.pen, Position::new(0.3, 0.3));
}

#[test]
fn stacked_runs_step_down_by_font_height() {
    let meta = sample_meta();
    let engine = GlyphLayoutEngine::new(&meta, Size::new(1000.0, 500.0));

    let runs = engine.layout_stacked("AB", &[100.0, 50.0], 1.2, Position::default());

    assert_eq!(runs.len(), 2);
    let first_y = runs[0].commands[0].pen_offset.y;
    let second_y = runs[1].commands[0].pen_offset.y;
    assert_close(first_y, 0.2 * 1.2);
    assert_close(second_y, 0.2 * 1.2 + 0.1 * 1.2);
    assert!(runs.iter().all(|run| run.commands[0].pen_offset.x == 0.0));
}

#[test]
fn measure_matches_layout_pen() {
    let meta = sample_meta();
    let engine = GlyphLayoutEngine::new(&meta, square_surface());

    let width = engine.measure("AB A", 100.0);

    assert_close(width, 0.06 + 0.055 + 0.05 + 0.06);
}

#[test]
fn draw_command_maps_onto_glyph_uniform() {
    let meta = sample_meta();
    let engine = GlyphLayoutEngine::new(&meta, Size::new(500.0, 250.0));

    let layout = engine.layout("A", 50.0, Position::new(0.1, 0.8));
    let uniform = layout.commands[0].to_uniform([4.0, 0.1, 0.0, 0.0]);

    assert_close(uniform.glyph_size[0], 0.1);
    assert_close(uniform.glyph_size[1], 0.2);
    assert_eq!(uniform.glyph_offset, [0.1, 0.8]);
    assert_eq!(uniform.glyph_plane, [0.0, 0.0, 0.5, 0.7]);
    assert_eq!(uniform.style_params, [4.0, 0.1, 0.0, 0.0]);
    assert_eq!(std::mem::size_of_val(&uniform), 64);
}
