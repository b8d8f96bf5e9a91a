//! Cartridge lifecycle and the fixed-step frame loop.

use crate::cart::CartridgeData;
use crate::engine::Engine;
use crate::error::CartError;

/// Milliseconds per `update` step (30 Hz).
pub const UPDATE_STEP_MS: f64 = 33.0;
/// Milliseconds per `fixed_update` step (60 Hz).
pub const FIXED_STEP_MS: f64 = 16.0;
/// Longest frame the loop will catch up on.
pub const MAX_FRAME_MS: f64 = 250.0;

/// Game code. Every hook is optional; an error returned from a hook is
/// logged and the loop carries on.
#[allow(unused_variables)]
pub trait Cartridge {
    /// Called by [`Runtime::run`].
    fn init(&mut self, engine: &mut Engine) -> anyhow::Result<()> {
        Ok(())
    }

    /// 30 Hz step.
    fn update(&mut self, engine: &mut Engine) -> anyhow::Result<()> {
        Ok(())
    }

    /// 60 Hz step.
    fn fixed_update(&mut self, engine: &mut Engine) -> anyhow::Result<()> {
        Ok(())
    }

    /// Once per frame, after the steps.
    fn draw(&mut self, engine: &mut Engine) -> anyhow::Result<()> {
        Ok(())
    }

    /// After cartridge data has been loaded into the engine.
    fn load(&mut self, engine: &mut Engine) -> anyhow::Result<()> {
        Ok(())
    }

    /// Before a running cart is stopped or restarted.
    fn teardown(&mut self, engine: &mut Engine) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Clock {
    last_ms: Option<f64>,
    start_ms: Option<f64>,
    acc_update: f64,
    acc_fixed: f64,
    t_update: f64,
    t_fixed: f64,
    time_ms: f64,
    alpha: f64,
}

/// Drives a [`Cartridge`] against an [`Engine`].
pub struct Runtime<C: Cartridge> {
    engine: Engine,
    cart: C,
    running: bool,
    clock: Clock,
    hook_errors: usize,
}

impl<C: Cartridge> Runtime<C> {
    /// Runtime that has not started yet.
    pub fn new(engine: Engine, cart: C) -> Self {
        Self {
            engine,
            cart,
            running: false,
            clock: Clock::default(),
            hook_errors: 0,
        }
    }

    /// The console state.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The console state, mutable.
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// The running cartridge.
    pub fn cartridge(&self) -> &C {
        &self.cart
    }

    /// False once `kill` was called.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of hook calls that returned an error so far.
    pub fn hook_errors(&self) -> usize {
        self.hook_errors
    }

    fn report(&mut self, hook: &str, result: anyhow::Result<()>) {
        if let Err(err) = result {
            self.hook_errors += 1;
            log::error!("cartridge `{hook}` failed: {err:#}");
        }
    }

    /// (Re)starts the cartridge: a running cart is torn down first, the
    /// clock restarts, then `init` runs.
    pub fn run(&mut self) {
        if self.running {
            self.kill();
        }
        self.clock.start_ms = None;
        self.running = true;
        let result = self.cart.init(&mut self.engine);
        self.report("init", result);
    }

    /// Stops the loop after the current frame.
    pub fn kill(&mut self) {
        self.running = false;
        let result = self.cart.teardown(&mut self.engine);
        self.report("teardown", result);
    }

    /// Loads `data` into the engine, then calls the cart's `load` hook.
    /// Malformed data is returned to the caller and the hook is skipped.
    pub fn load_cartridge(&mut self, data: &CartridgeData) -> Result<(), CartError> {
        self.engine.load(data)?;
        let result = self.cart.load(&mut self.engine);
        self.report("load", result);
        Ok(())
    }

    /// Seconds since the cart started, or the simulated step time while a
    /// step is running.
    pub fn time(&self) -> f64 {
        self.clock.time_ms / 1000.0
    }

    /// How far between the last two steps the current frame lies, `0.0..1.0`.
    pub fn alpha(&self) -> f64 {
        self.clock.alpha
    }

    /// One display frame at timestamp `now_ms`: catches up the 30 Hz and
    /// 60 Hz steps, then draws.
    pub fn frame(&mut self, now_ms: f64) {
        if let Some(last) = self.clock.last_ms {
            let frame_ms = (now_ms - last).clamp(0.0, MAX_FRAME_MS);

            self.clock.acc_update += frame_ms;
            while self.clock.acc_update >= UPDATE_STEP_MS {
                self.clock.time_ms = self.clock.t_update;
                self.clock.t_update += UPDATE_STEP_MS;
                self.clock.acc_update -= UPDATE_STEP_MS;
                self.clock.alpha = self.clock.acc_update / UPDATE_STEP_MS;
                if self.running {
                    let result = self.cart.update(&mut self.engine);
                    self.report("update", result);
                }
            }

            self.clock.acc_fixed += frame_ms;
            while self.clock.acc_fixed >= FIXED_STEP_MS {
                self.clock.time_ms = self.clock.t_fixed;
                self.clock.t_fixed += FIXED_STEP_MS;
                self.clock.acc_fixed -= FIXED_STEP_MS;
                self.clock.alpha = self.clock.acc_fixed / FIXED_STEP_MS;
                if self.running {
                    let result = self.cart.fixed_update(&mut self.engine);
                    self.report("fixed_update", result);
                }
            }
        }

        let start = *self.clock.start_ms.get_or_insert(now_ms);
        self.clock.time_ms = now_ms - start;
        if self.running {
            let result = self.cart.draw(&mut self.engine);
            self.report("draw", result);
        }
        self.clock.last_ms = Some(now_ms);
    }
}
