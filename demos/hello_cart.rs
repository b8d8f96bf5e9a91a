use macroquad::prelude::*;
use pixcart::{
    run_window, Cartridge, Engine, EngineConfig, SpriteParams, BTN_DOWN, BTN_LEFT,
    BTN_RIGHT, BTN_UP,
};

fn window_conf() -> Conf {
    Conf {
        window_title: "hello cart".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

fn setup_logging() {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::util::SubscriberInitExt;

    // `init` also installs the `log` bridge, so engine logs show up here
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .compact()
        .finish()
        .init();
}

#[derive(Default)]
struct Hello {
    x: i32,
    y: i32,
    facing_left: bool,
}

impl Cartridge for Hello {
    fn init(&mut self, e: &mut Engine) -> anyhow::Result<()> {
        // sprite 1: a ring, sprite 2: a checker tile flagged for layer 1
        for i in 0..8 {
            e.sset(8 + i, 0, 8)?;
            e.sset(8 + i, 7, 8)?;
            e.sset(8, i, 8)?;
            e.sset(15, i, 10)?;
        }
        for y in 0..8 {
            for x in 0..8 {
                e.sset(16 + x, y, if (x + y) % 2 == 0 { 5 } else { 6 })?;
            }
        }
        e.fset(2, 0b1);
        for x in 0..16 {
            e.mset(x, 15, 2)?;
        }
        self.x = 60;
        self.y = 60;
        Ok(())
    }

    fn update(&mut self, e: &mut Engine) -> anyhow::Result<()> {
        if e.btn(BTN_LEFT) {
            self.x -= 1;
            self.facing_left = true;
        }
        if e.btn(BTN_RIGHT) {
            self.x += 1;
            self.facing_left = false;
        }
        if e.btn(BTN_UP) {
            self.y -= 1;
        }
        if e.btn(BTN_DOWN) {
            self.y += 1;
        }
        Ok(())
    }

    fn draw(&mut self, e: &mut Engine) -> anyhow::Result<()> {
        e.cls();
        e.rectfill(0, 0, 127, 127, Some(1));
        e.map(0, 0, 0, 0, 16, 16, 0);
        e.spr_ex(
            1,
            self.x,
            self.y,
            SpriteParams {
                flip_x: self.facing_left,
                ..Default::default()
            },
        );
        e.print("hello cart", 2, 2, Some(7));
        let (mx, my) = (e.mousex(), e.mousey());
        e.rect(mx - 1, my - 1, mx + 1, my + 1, Some(11));
        Ok(())
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    setup_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let txt = std::fs::read_to_string(&path).expect("Failed to read config");
            EngineConfig::from_json_str(&txt).expect("Failed to parse config")
        }
        None => EngineConfig::default(),
    };

    // saved carts round-trip through the same format
    let snapshot = Engine::new(&config).save();
    println!(
        "empty cart is {} bytes",
        snapshot.to_json_string().map(|s| s.len()).unwrap_or(0)
    );

    run_window(Hello::default(), config).await;
}
