// ==================== Imports ====================
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

#[macro_use]
mod browser;
mod assets;
mod background;
mod debug;
pub mod engine;
mod game;
pub mod params;
mod sprite;
mod ui;
pub mod world;

use engine::GameLoop;
use game::SpaceInvaders;
use params::Params;

// ==================== Main Functions ====================
/// Main entry for Webassembly module, shipped tuning
/// - sizes the canvas
/// - loads every asset
/// - starts the game loop
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    start(Params::default())
}

/// Same as `main_js`, with a (partial) parameter object from the page.
/// Missing fields keep their defaults, `undefined` / `null` means no override.
#[wasm_bindgen]
pub fn main_js_with_params(overrides: JsValue) -> Result<(), JsValue> {
    let params = if overrides.is_undefined() || overrides.is_null() {
        Params::default()
    } else {
        serde_wasm_bindgen::from_value::<Params>(overrides)?
    };
    start(params)
}

fn start(params: Params) -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();

    let canvas = browser::canvas().map_err(|err| JsValue::from_str(&format!("{:#}", err)))?;
    canvas.set_width(params.canvas.width as u32);
    canvas.set_height(params.canvas.height as u32);

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    let game = SpaceInvaders::new(Rc::new(params));
    browser::spawn_local(async move {
        if let Err(err) = GameLoop::start(game).await {
            error!("Could not start game loop : {:#?}", err);
        }
    });

    Ok(())
}
