use pixcart::{Engine, EngineConfig, MapRegion, SpriteParams, Surface};

fn engine_with_sprites() -> Engine {
    let mut e = Engine::default();
    // sprite 1: one lit pixel in its top-left corner
    e.sset(8, 0, 9).unwrap();
    // sprite 2: full row of color 12
    for x in 16..24 {
        e.sset(x, 0, 12).unwrap();
    }
    e
}

#[test]
fn sprite_indices_wrap_past_the_sheet() {
    let mut e = engine_with_sprites();
    let count = e.sheet().sprite_count();
    e.spr(1 + count, 0, 0);
    e.spr(1 + 3 * count, 20, 0);
    assert_eq!(e.pget(0, 0), 9);
    assert_eq!(e.pget(20, 0), 9);
}

#[test]
fn horizontal_flip_mirrors_about_the_sprite() {
    let mut e = engine_with_sprites();
    e.spr_ex(
        1,
        10,
        10,
        SpriteParams {
            flip_x: true,
            ..Default::default()
        },
    );
    assert_eq!(e.pget(17, 10), 9);
    assert_eq!(e.pget(10, 10), 0);

    e.cls();
    e.spr_ex(
        1,
        10,
        10,
        SpriteParams {
            flip_x: true,
            flip_y: true,
            ..Default::default()
        },
    );
    assert_eq!(e.pget(17, 17), 9);
}

#[test]
fn multi_cell_sprites_cover_neighbours() {
    let mut e = engine_with_sprites();
    e.spr_ex(
        1,
        0,
        0,
        SpriteParams {
            w: 2,
            ..Default::default()
        },
    );
    assert_eq!(e.pget(0, 0), 9);
    assert_eq!(e.pget(8, 0), 12);
    assert_eq!(e.pget(15, 0), 12);
}

#[test]
fn map_cache_reconciles_only_what_changed() {
    let mut e = engine_with_sprites();
    assert_eq!(e.refresh_map_cache(), 128 * 32);
    assert_eq!(e.refresh_map_cache(), 0);

    e.mset(3, 3, 1).unwrap();
    e.mset(3, 3, 1).unwrap();
    e.mset(4, 3, 2).unwrap();
    assert_eq!(e.refresh_map_cache(), 2);
    assert_eq!(e.refresh_map_cache(), 0);

    // sheet write invalidates only the cells showing that sprite
    e.sset(9, 0, 3).unwrap();
    assert_eq!(e.refresh_map_cache(), 1);

    e.palt(0, false);
    assert_eq!(e.refresh_map_cache(), 128 * 32);
    e.palt(0, false);
    assert_eq!(e.refresh_map_cache(), 0);
}

#[test]
fn layer_zero_blits_the_cached_region() {
    let mut e = engine_with_sprites();
    e.mset(10, 2, 1).unwrap();
    e.map(10, 2, 40, 50, 1, 1, 0);
    assert_eq!(e.pget(40, 50), 9);
    assert!(!e.tilemap().is_all_dirty());
    assert_eq!(e.tilemap().dirty_count(), 0);
}

#[test]
fn nonzero_layer_draws_only_matching_cells() {
    let mut e = engine_with_sprites();
    e.mset(1, 0, 1).unwrap();
    e.mset(2, 0, 2).unwrap();
    e.mset(6, 0, 2).unwrap();
    e.fset(1, 0b01);
    e.fset(2, 0b11);

    let region = MapRegion {
        cel_x: 1,
        cel_y: 0,
        sx: 0,
        sy: 0,
        cel_w: 8,
        cel_h: 1,
    };
    assert_eq!(e.map_region(region, 0b10), 2);
    assert_eq!(e.pget(0, 0), 0);
    assert_eq!(e.pget(8, 0), 12);
    assert_eq!(e.pget(40, 0), 12);

    e.cls();
    assert_eq!(e.map_region(region, 0b01), 3);
    assert_eq!(e.pget(0, 0), 9);
}

#[test]
fn palette_indices_wrap_at_draw_time() {
    let mut e = Engine::default();
    e.sset(8, 0, 16 + 3).unwrap();
    e.spr(1, 0, 0);
    assert_eq!(e.sget(8, 0), 19);
    assert_eq!(e.pget(0, 0), 3);
}

#[test]
fn transparent_index_leaves_the_screen_untouched() {
    let mut e = Engine::default();
    e.rectfill(0, 0, 7, 7, Some(5));
    e.spr(0, 0, 0);
    assert_eq!(e.pget(3, 3), 5);

    e.palt(0, false);
    e.spr(0, 0, 0);
    assert_eq!(e.pget(3, 3), 0);
    assert_eq!(e.screen().pixel(3, 3), Some([0, 0, 0, 255]));
}

#[test]
fn camera_and_clip_apply_to_draws() {
    let mut e = engine_with_sprites();
    e.camera(4, 2);
    e.spr(1, 0, 0);
    assert_eq!(e.pget(4, 2), 9);

    e.camera(0, 0);
    e.cls();
    e.clip(0, 0, 4, 4);
    e.rectfill(0, 0, 20, 20, Some(8));
    assert_eq!(e.pget(3, 3), 8);
    assert_eq!(e.pget(4, 4), 0);
    e.clip_reset();
    e.rectfill(0, 0, 20, 20, Some(8));
    assert_eq!(e.pget(10, 10), 8);
}

#[test]
fn print_uses_the_built_in_font() {
    let mut e = Engine::default();
    e.print("a", 0, 0, Some(7));
    // top row of A is three pixels wide
    assert_eq!(e.pget(0, 0), 7);
    assert_eq!(e.pget(2, 0), 7);
    assert_eq!(e.pget(3, 0), 0);
}

#[test]
fn resizes_reset_the_sheet_and_layers() {
    let mut e = engine_with_sprites();
    e.ssset(8);
    assert_eq!(e.ssget(), 8);
    assert_eq!(e.sheet().sprite_count(), 64);
    assert_eq!(e.sget(8, 0), 0);
    assert_eq!(e.flags().len(), 64);

    e.set_width(160);
    e.set_height(90);
    assert_eq!(e.screen().bitmap().width(), 160);
    assert_eq!(e.screen().bitmap().height(), 90);
}

#[test]
fn layers_are_independent_canvases() {
    let mut e = Engine::new(&EngineConfig {
        layers: 2,
        ..Default::default()
    });
    e.canvas(1).unwrap();
    e.pset(0, 0, 8);
    e.canvas(0).unwrap();
    assert_eq!(e.pget(0, 0), 0);
    assert_eq!(e.screens()[1].pixel(0, 0), Some(pixcart::rgb_to_rgba(0xFF004D)));
}

#[test]
fn draws_past_the_right_and_bottom_edges_are_clipped() {
    let mut e = Engine::default();
    e.rectfill(200, 127, 210, 127, Some(8));
    e.rectfill(0, 200, 127, 210, Some(8));
    e.rect(120, 120, 300, 300, Some(8));
    e.print("hello", 126, 124, Some(7));
    e.print("hello", 500, 500, Some(7));
    e.spr(1, 127, 127);
    e.map(0, 0, 127, 127, 4, 4, 0);
    assert_eq!(e.pget(120, 127), 8);
    assert_eq!(e.pget(127, 120), 8);
    assert_eq!(e.pget(126, 124), 7);
}

#[test]
fn map_cells_past_the_cache_edge_do_not_fail() {
    let mut e = Engine::default();
    e.mset(127, 31, 1).unwrap();
    e.sset(8, 0, 9).unwrap();
    e.map(127, 31, 0, 0, 4, 4, 0);
    assert_eq!(e.pget(0, 0), 9);
}

#[test]
fn oversized_surfaces_are_refused() {
    // 128 map cells of 1024 px would not fit in one bitmap
    let mut e = Engine::new(&EngineConfig {
        cell_width: 1024,
        cell_height: 1,
        ..Default::default()
    });
    assert_eq!((e.cellwidth(), e.cellheight()), (8, 8));
    assert_eq!(e.map_cache_bitmap().width(), 128 * 8);

    e.sset(8, 0, 9).unwrap();
    e.set_cell_size(512, 1);
    e.ssset(10_000);
    e.set_width(70_000);
    assert_eq!(e.cellwidth(), 8);
    assert_eq!(e.ssget(), 16);
    assert_eq!(e.width(), 128);
    assert_eq!(e.sget(8, 0), 9);

    e.set_cell_size(511, 1);
    assert_eq!(e.cellwidth(), 511);
    assert_eq!(e.map_cache_bitmap().width(), 128 * 511);
    e.mset(100, 0, 1).unwrap();
    e.map(100, 0, 0, 0, 1, 1, 0);
}
