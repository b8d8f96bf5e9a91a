use pixcart::{CartError, CartridgeData, Engine, EngineConfig};
use std::fs;
use std::path::PathBuf;

fn temp_dir() -> PathBuf {
    let mut p = std::env::temp_dir();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    p.push(format!("pixcart_cart_{}_{}", std::process::id(), nanos));
    fs::create_dir_all(&p).unwrap();
    p
}

fn scribble(e: &mut Engine) {
    for i in 0..40 {
        e.sset(i * 3 % 128, i * 7 % 128, (i as u32) % 23).unwrap();
        e.mset(i * 5 % 128, i % 32, 1000 + i as u32).unwrap();
    }
    e.fset(3, 0b1010_0001);
    e.fset(255, 0xFF);
    e.palset(4, 0x123456);
}

fn assert_same_stores(a: &Engine, b: &Engine) {
    assert_eq!(a.sheet().width(), b.sheet().width());
    for y in 0..a.sheet().height() as i32 {
        for x in 0..a.sheet().width() as i32 {
            assert_eq!(a.sget(x, y), b.sget(x, y), "sheet pixel ({x}, {y})");
        }
    }
    for y in 0..a.tilemap().height() as i32 {
        for x in 0..a.tilemap().width() as i32 {
            assert_eq!(a.mget(x, y), b.mget(x, y), "map cell ({x}, {y})");
        }
    }
    for n in 0..a.sheet().sprite_count() {
        assert_eq!(a.fget(n), b.fget(n));
    }
    assert_eq!(a.palette().colors(), b.palette().colors());
}

#[test]
fn save_then_load_reproduces_every_store() {
    let mut a = Engine::default();
    scribble(&mut a);

    let json = a.save().to_json_string().unwrap();
    let data = CartridgeData::from_json_str(&json).unwrap();
    assert_eq!(data.version, Some(4));

    let mut b = Engine::default();
    b.load(&data).unwrap();
    assert_same_stores(&a, &b);
}

#[test]
fn load_applies_cell_size_before_sprites() {
    let mut a = Engine::new(&EngineConfig {
        cell_width: 4,
        cell_height: 6,
        ..Default::default()
    });
    scribble_small(&mut a);

    let mut b = Engine::default();
    b.sset(0, 0, 9).unwrap();
    b.load(&a.save()).unwrap();
    assert_eq!((b.cellwidth(), b.cellheight()), (4, 6));
    assert_eq!(b.sheet().width(), 64);
    assert_same_stores(&a, &b);
}

fn scribble_small(e: &mut Engine) {
    e.sset(63, 95, 5).unwrap();
    e.sset(1, 2, 3).unwrap();
    e.mset(127, 31, 77).unwrap();
    e.fset(17, 4);
}

#[test]
fn loaded_cart_renders_from_fresh_caches() {
    let mut a = Engine::default();
    a.sset(8, 0, 9).unwrap();
    a.mset(0, 0, 1).unwrap();

    let mut b = Engine::default();
    b.refresh_map_cache();
    b.load(&a.save()).unwrap();
    b.map(0, 0, 0, 0, 1, 1, 0);
    assert_eq!(b.pget(0, 0), 9);
}

#[test]
fn mismatched_lengths_are_malformed() {
    let e = Engine::default();

    let mut short_map = e.save();
    short_map.map.pop();
    let mut b = Engine::default();
    assert!(matches!(b.load(&short_map), Err(CartError::MalformedCartridge(_))));

    let mut few_flags = e.save();
    few_flags.flags.truncate(10);
    assert!(matches!(b.load(&few_flags), Err(CartError::MalformedCartridge(_))));

    let mut no_palette = e.save();
    no_palette.palette.clear();
    assert!(matches!(b.load(&no_palette), Err(CartError::MalformedCartridge(_))));

    let mut zero_cell = e.save();
    zero_cell.cellheight = Some(0);
    assert!(matches!(b.load(&zero_cell), Err(CartError::MalformedCartridge(_))));
}

#[test]
fn file_round_trip_and_errors() {
    let dir = temp_dir();
    let path = dir.join("cart.json");

    let mut a = Engine::default();
    scribble(&mut a);
    let mut data = a.save();
    data.code = Some("function _draw() end".into());
    data.save_to_file(&path).unwrap();

    let back = CartridgeData::load_from_file(&path).unwrap();
    assert_eq!(back, data);

    let missing = CartridgeData::load_from_file(dir.join("missing.json")).unwrap_err();
    assert!(matches!(missing, CartError::Io { .. }));

    let bad = dir.join("bad.json");
    fs::write(&bad, "{ \"map\": [1, 2,").unwrap();
    let err = CartridgeData::load_from_file(&bad).unwrap_err();
    assert!(matches!(err, CartError::Json { path: Some(_), .. }));

    let err = data.save_to_file(dir.join("cart.txt")).unwrap_err();
    assert!(matches!(err, CartError::UnsupportedFormat(_)));
}

#[test]
fn carts_with_sfx_and_code_load() {
    let e = Engine::default();
    let mut value: serde_json::Value = serde_json::from_str(&e.save().to_json_string().unwrap()).unwrap();
    value["sfx"] = serde_json::json!([{ "speed": 16, "notes": [] }]);
    value["code"] = serde_json::json!("");

    let data = CartridgeData::from_json_str(&value.to_string()).unwrap();
    let mut b = Engine::default();
    b.load(&data).unwrap();
    assert_eq!(data.code.as_deref(), Some(""));
}
