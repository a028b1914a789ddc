use crate::browser;
use anyhow::{anyhow, Error, Result};
// web assembly is a single threaded environment, so Rc RefCell > Mutex
use async_trait::async_trait;
use futures::channel::oneshot::channel;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{
    // unchecked_ref (unsafe) cast from Javascript type to Rust type
    // - we control the closure creation and specify the expected type
    JsCast,
    JsValue,
};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlAudioElement, HtmlImageElement, Response};

use self::input::InputState;

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    fn update(&mut self, input: &InputState);
    fn draw(&self, renderer: &Renderer);
}

// length of a frame in milliseconds
const FRAME_SIZE: f32 = 1.0 / 60.0 * 1000.0;
/// Simulation step handed to `Game::update`, in seconds.
pub const FRAME_SECONDS: f32 = FRAME_SIZE / 1000.0;

pub struct GameLoop {
    last_frame: f64,
    accumulated_delta: f32,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let mut game = game.initialize().await?;
        let mut input_receiver = input::prepare_input()?;
        let mut input = InputState::default();
        let mut game_loop = GameLoop {
            last_frame: browser::now()?,
            accumulated_delta: 0.0,
        };
        let renderer = Renderer::new()?;
        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            game_loop.accumulated_delta += (perf - game_loop.last_frame) as f32;
            while game_loop.accumulated_delta > FRAME_SIZE {
                input.begin_frame();
                input::process_input(&mut input, &mut input_receiver);
                game.update(&input);
                game_loop.accumulated_delta -= FRAME_SIZE;
            }
            game_loop.last_frame = perf;
            game.draw(&renderer);
            if let Some(callback) = f.borrow().as_ref() {
                let _ = browser::request_animation_frame(callback);
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(())
    }
}

// ==================== Geometry ====================
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Size { width, height }
    }

    pub fn scaled(self, factor: f32) -> Self {
        Size {
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

/// Axis aligned box, `position` is the top left corner
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    pub fn from_center(center: Point, size: Size) -> Self {
        Rect {
            position: Point {
                x: center.x - size.width / 2.0,
                y: center.y - size.height / 2.0,
            },
            size,
        }
    }

    pub fn left(&self) -> f32 {
        self.position.x
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.width
    }

    pub fn top(&self) -> f32 {
        self.position.y
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.height
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.position.x + self.size.width / 2.0,
            y: self.position.y + self.size.height / 2.0,
        }
    }

    /// Strict overlap, touching edges don't count
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn css(&self) -> String {
        format!("rgb({}, {}, {})", self.0, self.1, self.2)
    }
}

// ==================== Rendering ====================
pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn new() -> Result<Self> {
        let context = browser::context()?;
        // pixel art, keep the nearest neighbour look when scaling sprites up
        context.set_image_smoothing_enabled(false);
        Ok(Renderer { context })
    }

    pub fn clear(&self, rect: &Rect) {
        self.context.clear_rect(
            rect.position.x.into(),
            rect.position.y.into(),
            rect.size.width.into(),
            rect.size.height.into(),
        );
    }

    pub fn fill_rect(&self, rect: &Rect, color: Rgb, alpha: f32) {
        self.context.set_global_alpha(alpha.clamp(0.0, 1.0).into());
        self.context.set_fill_style_str(&color.css());
        self.context.fill_rect(
            rect.position.x.into(),
            rect.position.y.into(),
            rect.size.width.into(),
            rect.size.height.into(),
        );
        self.context.set_global_alpha(1.0);
    }

    pub fn draw_image(
        &self,
        image: &HtmlImageElement,
        frame: &Rect,
        destination: &Rect,
        alpha: f32,
    ) {
        self.context.set_global_alpha(alpha.clamp(0.0, 1.0).into());
        let drawn = self
            .context
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                frame.position.x.into(),
                frame.position.y.into(),
                frame.size.width.into(),
                frame.size.height.into(),
                destination.position.x.into(),
                destination.position.y.into(),
                destination.size.width.into(),
                destination.size.height.into(),
            );
        self.context.set_global_alpha(1.0);
        if let Err(err) = drawn {
            error!("[engine.rs::draw_image] {:#?}", err);
        }
    }

    pub fn draw_text(&self, text: &str, center: Point, size: f32, color: Rgb) {
        self.context.set_font(&format!("{}px monospace", size));
        self.context.set_text_align("center");
        self.context.set_text_baseline("middle");
        self.context.set_fill_style_str(&color.css());
        if let Err(err) = self
            .context
            .fill_text(text, center.x.into(), center.y.into())
        {
            error!("[engine.rs::draw_text] {:#?}", err);
        }
    }

    #[cfg(debug_assertions)]
    fn stroke_rect(&self, rect: &Rect, color: Rgb) {
        self.context.set_stroke_style_str(&color.css());
        self.context.stroke_rect(
            rect.position.x.into(),
            rect.position.y.into(),
            rect.size.width.into(),
            rect.size.height.into(),
        );
    }
}

#[cfg(debug_assertions)]
pub trait DebugDraw {
    fn draw_debug(&self, renderer: &Renderer);
}

#[cfg(debug_assertions)]
impl DebugDraw for Rect {
    fn draw_debug(&self, renderer: &Renderer) {
        renderer.stroke_rect(self, Rgb(255, 0, 255));
    }
}

/// Image sliced into a `columns x rows` grid of equally sized frames
pub struct SpriteSheet {
    image: HtmlImageElement,
    columns: u32,
    rows: u32,
}

impl SpriteSheet {
    pub fn new(image: HtmlImageElement, columns: u32, rows: u32) -> Self {
        SpriteSheet {
            image,
            columns: columns.max(1),
            rows: rows.max(1),
        }
    }

    pub fn frame_size(&self) -> Size {
        Size {
            width: self.image.natural_width() as f32 / self.columns as f32,
            height: self.image.natural_height() as f32 / self.rows as f32,
        }
    }

    pub fn draw(&self, renderer: &Renderer, frame: u32, destination: &Rect, alpha: f32) {
        let source = frame_rect(frame, self.columns, self.rows, self.frame_size());
        renderer.draw_image(&self.image, &source, destination, alpha);
    }
}

/// Source rectangle of `frame` inside a sheet, frames run left to right then
/// top to bottom and wrap past the last cell
pub fn frame_rect(frame: u32, columns: u32, rows: u32, frame_size: Size) -> Rect {
    let columns = columns.max(1);
    let index = frame % (columns * rows.max(1));
    Rect {
        position: Point {
            x: (index % columns) as f32 * frame_size.width,
            y: (index / columns) as f32 * frame_size.height,
        },
        size: frame_size,
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::create_html_image_element()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();
    let source_name = source.to_string();

    let success_callback = browser::closure_once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let error_callback = browser::closure_once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!(
                "[engine.rs::load_image] Error loading image {}: {:#?}",
                source_name,
                err
            )));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callback alive until image is loaded or errors
    success_callback.forget();
    error_callback.forget();

    // ?? - Result<Result<(), Error>, oneshot::Canceled>
    // - first ? yields the channel result
    // - second ? yields the image load result
    rx.await??;

    Ok(image)
}

// ==================== Audio ====================
#[derive(Clone)]
pub struct Sound {
    element: HtmlAudioElement,
}

impl Sound {
    /// Fire and forget, each call plays on its own copy of the element so
    /// rapid effects can overlap
    pub fn play(&self, volume: f32) -> Result<()> {
        let voice = self
            .element
            .clone_node()
            .map_err(|err| anyhow!("Could not clone audio element : {:#?}", err))?
            .dyn_into::<HtmlAudioElement>()
            .map_err(|node| anyhow!("Error converting {:#?} to HtmlAudioElement", node))?;
        voice.set_volume(volume.clamp(0.0, 1.0).into());
        voice
            .play()
            .map_err(|err| anyhow!("Could not play sound : {:#?}", err))?;
        Ok(())
    }

    pub fn play_looping(&self, volume: f32) -> Result<()> {
        self.element.set_loop(true);
        self.element.set_current_time(0.0);
        self.element.set_volume(volume.clamp(0.0, 1.0).into());
        self.element
            .play()
            .map_err(|err| anyhow!("Could not play music : {:#?}", err))?;
        Ok(())
    }

    pub fn stop(&self) -> Result<()> {
        self.element
            .pause()
            .map_err(|err| anyhow!("Could not stop audio : {:#?}", err))?;
        self.element.set_current_time(0.0);
        Ok(())
    }
}

/// Resolves once the audio file is known to exist, the element itself then
/// streams it from the browser cache
pub async fn load_sound(source: &str) -> Result<Sound> {
    let response: Response = JsFuture::from(browser::window()?.fetch_with_str(source))
        .await
        .map_err(|err| anyhow!("error fetching {} : {:#?}", source, err))?
        .dyn_into()
        .map_err(|element| anyhow!("error converting [{:#?}] to Response", element))?;
    if !response.ok() {
        return Err(anyhow!(
            "[engine.rs::load_sound] {} responded with status {}",
            source,
            response.status()
        ));
    }
    let element = browser::create_html_audio_element(source)?;
    element.set_preload("auto");
    Ok(Sound { element })
}

// ==================== Input ====================
pub mod input {
    use super::Point;
    use crate::browser;
    use anyhow::{anyhow, Result};
    use futures::channel::mpsc::{unbounded, UnboundedReceiver};
    use std::collections::HashSet;
    use wasm_bindgen::JsCast;
    use web_sys::{Event, EventTarget, KeyboardEvent, MouseEvent, TouchEvent};

    pub const KEY_RESTART: &str = "KeyR";
    pub const KEY_DEBUG_RESTART: &str = "Digit1";
    pub const KEY_DEBUG_BOSS: &str = "Digit2";

    #[derive(Debug, Clone, PartialEq)]
    pub enum InputEvent {
        PointerMove(Point),
        PointerDown(Point),
        TouchStart(Point),
        TouchMove(Point),
        KeyDown(String),
        KeyUp(String),
    }

    /// Input gathered for one simulation step
    /// - `aim` : last pointer / finger position seen this step
    /// - `pressed` : a click or touch started this step
    #[derive(Debug, Default)]
    pub struct InputState {
        aim: Option<Point>,
        pressed: bool,
        keys_down: HashSet<String>,
        keys_pressed: HashSet<String>,
    }

    impl InputState {
        pub fn begin_frame(&mut self) {
            self.aim = None;
            self.pressed = false;
            self.keys_pressed.clear();
        }

        pub fn apply(&mut self, event: InputEvent) {
            match event {
                InputEvent::PointerMove(point) | InputEvent::TouchMove(point) => {
                    self.aim = Some(point);
                }
                InputEvent::PointerDown(point) | InputEvent::TouchStart(point) => {
                    self.aim = Some(point);
                    self.pressed = true;
                }
                InputEvent::KeyDown(code) => {
                    // held keys auto-repeat keydown, only the first one counts
                    if self.keys_down.insert(code.clone()) {
                        self.keys_pressed.insert(code);
                    }
                }
                InputEvent::KeyUp(code) => {
                    self.keys_down.remove(&code);
                }
            }
        }

        pub fn aim(&self) -> Option<Point> {
            self.aim
        }

        pub fn pressed(&self) -> bool {
            self.pressed
        }

        pub fn is_down(&self, code: &str) -> bool {
            self.keys_down.contains(code)
        }

        pub fn was_pressed(&self, code: &str) -> bool {
            self.keys_pressed.contains(code)
        }
    }

    pub fn process_input(state: &mut InputState, receiver: &mut UnboundedReceiver<InputEvent>) {
        loop {
            match receiver.try_next() {
                Ok(None) => break,
                Err(_err) => break,
                Ok(Some(event)) => state.apply(event),
            }
        }
    }

    pub fn prepare_input() -> Result<UnboundedReceiver<InputEvent>> {
        let (sender, receiver) = unbounded();
        let canvas = browser::canvas()?;
        let window = browser::window()?;

        let move_sender = sender.clone();
        let move_canvas = canvas.clone();
        listen(&canvas, "mousemove", move |event: MouseEvent| {
            let (x, y) = browser::canvas_point(
                &move_canvas,
                event.client_x().into(),
                event.client_y().into(),
            );
            let _ = move_sender.unbounded_send(InputEvent::PointerMove(Point { x, y }));
        })?;

        let down_sender = sender.clone();
        let down_canvas = canvas.clone();
        listen(&canvas, "mousedown", move |event: MouseEvent| {
            let (x, y) = browser::canvas_point(
                &down_canvas,
                event.client_x().into(),
                event.client_y().into(),
            );
            let _ = down_sender.unbounded_send(InputEvent::PointerDown(Point { x, y }));
        })?;

        let start_sender = sender.clone();
        let start_canvas = canvas.clone();
        listen(&canvas, "touchstart", move |event: TouchEvent| {
            // keep the page from scrolling / zooming under the finger
            event.prevent_default();
            if let Some(touch) = event.touches().get(0) {
                let (x, y) = browser::canvas_point(
                    &start_canvas,
                    touch.client_x().into(),
                    touch.client_y().into(),
                );
                let _ = start_sender.unbounded_send(InputEvent::TouchStart(Point { x, y }));
            }
        })?;

        let touch_move_sender = sender.clone();
        let touch_move_canvas = canvas.clone();
        listen(&canvas, "touchmove", move |event: TouchEvent| {
            event.prevent_default();
            if let Some(touch) = event.touches().get(0) {
                let (x, y) = browser::canvas_point(
                    &touch_move_canvas,
                    touch.client_x().into(),
                    touch.client_y().into(),
                );
                let _ = touch_move_sender.unbounded_send(InputEvent::TouchMove(Point { x, y }));
            }
        })?;

        let keydown_sender = sender.clone();
        listen(&window, "keydown", move |event: KeyboardEvent| {
            let _ = keydown_sender.unbounded_send(InputEvent::KeyDown(event.code()));
        })?;

        let keyup_sender = sender;
        listen(&window, "keyup", move |event: KeyboardEvent| {
            let _ = keyup_sender.unbounded_send(InputEvent::KeyUp(event.code()));
        })?;

        Ok(receiver)
    }

    fn listen<E>(
        target: &EventTarget,
        name: &str,
        mut handler: impl FnMut(E) + 'static,
    ) -> Result<()>
    where
        E: JsCast + 'static,
    {
        let closure = browser::closure_wrap(Box::new(move |event: Event| {
            if let Ok(event) = event.dyn_into::<E>() {
                handler(event);
            }
        }) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
            .map_err(|err| anyhow!("Could not listen to {} : {:#?}", name, err))?;
        // listeners live as long as the page
        closure.forget();
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn held_key_only_counts_as_pressed_once() {
            let mut state = InputState::default();
            state.apply(InputEvent::KeyDown(KEY_RESTART.to_string()));
            assert!(state.was_pressed(KEY_RESTART));

            state.begin_frame();
            state.apply(InputEvent::KeyDown(KEY_RESTART.to_string()));
            assert!(!state.was_pressed(KEY_RESTART));
            assert!(state.is_down(KEY_RESTART));

            state.apply(InputEvent::KeyUp(KEY_RESTART.to_string()));
            state.begin_frame();
            state.apply(InputEvent::KeyDown(KEY_RESTART.to_string()));
            assert!(state.was_pressed(KEY_RESTART));
        }

        #[test]
        fn aim_keeps_the_latest_position_of_the_step() {
            let mut state = InputState::default();
            state.apply(InputEvent::PointerMove(Point::new(10.0, 20.0)));
            state.apply(InputEvent::TouchMove(Point::new(30.0, 40.0)));
            assert_eq!(state.aim(), Some(Point::new(30.0, 40.0)));
            assert!(!state.pressed());

            state.apply(InputEvent::TouchStart(Point::new(5.0, 6.0)));
            assert!(state.pressed());

            state.begin_frame();
            assert_eq!(state.aim(), None);
            assert!(!state.pressed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rects_touching_at_an_edge_do_not_intersect() {
        let a = Rect::new(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        let b = Rect::new(Point::new(10.0, 0.0), Size::new(10.0, 10.0));
        let c = Rect::new(Point::new(9.0, 9.0), Size::new(10.0, 10.0));
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
        assert!(c.intersects(&b));
    }

    #[test]
    fn from_center_puts_the_center_back() {
        let rect = Rect::from_center(Point::new(50.0, 60.0), Size::new(20.0, 10.0));
        assert_eq!(rect.position, Point::new(40.0, 55.0));
        assert_eq!(rect.center(), Point::new(50.0, 60.0));
    }

    #[test]
    fn frames_are_sliced_row_major_and_wrap() {
        let size = Size::new(32.0, 16.0);
        assert_eq!(frame_rect(0, 4, 2, size).position, Point::new(0.0, 0.0));
        assert_eq!(frame_rect(5, 4, 2, size).position, Point::new(32.0, 16.0));
        assert_eq!(frame_rect(8, 4, 2, size).position, Point::new(0.0, 0.0));
    }
}
