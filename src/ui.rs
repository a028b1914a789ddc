use crate::engine::{Point, Rect, Renderer, Rgb, Size};

pub const RESTART_HINT: &str = "Press R to restart";

const TITLE_SIZE: f32 = 48.0;
const HINT_SIZE: f32 = 18.0;
const LABEL_SIZE: f32 = 14.0;

/// Background plus a left anchored fill that shrinks with `ratio`
#[derive(Debug, Clone, PartialEq)]
pub struct HealthBar {
    center: Point,
    size: Size,
    ratio: f32,
    hidden: bool,
    background: Rgb,
    fill: Rgb,
    /// optional caption drawn under the bar
    label: Option<String>,
}

impl HealthBar {
    pub fn new(center: Point, size: Size, background: Rgb, fill: Rgb) -> Self {
        HealthBar {
            center,
            size,
            ratio: 1.0,
            hidden: false,
            background,
            fill,
            label: None,
        }
    }

    /// Sits under the ship and follows it, at least 28 px wide
    pub fn for_player(ship_size: Size) -> Self {
        let width = (ship_size.width * 0.95).round().max(28.0);
        HealthBar::new(
            Point::default(),
            Size::new(width, 6.0),
            Rgb(35, 35, 35),
            Rgb(90, 255, 140),
        )
    }

    /// Top of the screen, 62 % of its width, starts hidden
    pub fn for_boss(screen_width: f32) -> Self {
        let mut bar = HealthBar::new(
            Point::new(screen_width / 2.0, 18.0),
            Size::new((screen_width * 0.62).floor(), 10.0),
            Rgb(40, 40, 40),
            Rgb(255, 80, 80),
        );
        bar.hidden = true;
        bar
    }

    /// Distance between the ship's centre and the bar's centre
    pub fn player_offset(ship_size: Size) -> f32 {
        ship_size.height / 2.0 + 10.0
    }

    pub fn set_ratio(&mut self, ratio: f32) {
        self.ratio = ratio.clamp(0.0, 1.0);
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn set_center(&mut self, center: Point) {
        self.center = center;
    }

    pub fn set_label(&mut self, label: String) {
        self.label = Some(label);
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn background_rect(&self) -> Rect {
        Rect::from_center(self.center, self.size)
    }

    pub fn fill_rect(&self) -> Rect {
        let background = self.background_rect();
        Rect::new(
            background.position,
            Size::new(self.size.width * self.ratio, self.size.height),
        )
    }

    pub fn draw(&self, renderer: &Renderer) {
        if self.hidden {
            return;
        }
        renderer.fill_rect(&self.background_rect(), self.background, 1.0);
        renderer.fill_rect(&self.fill_rect(), self.fill, 1.0);
        if let Some(label) = &self.label {
            let position = Point::new(self.center.x, self.center.y + LABEL_SIZE);
            renderer.draw_text(label, position, LABEL_SIZE, Rgb(255, 220, 220));
        }
    }
}

/// End of run message, shown once the closing animation is over
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Banner {
    GameOver,
    Victory,
}

impl Banner {
    pub fn title(&self) -> &'static str {
        match self {
            Banner::GameOver => "GAME OVER",
            Banner::Victory => "YOU WIN!",
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            Banner::GameOver => Rgb(255, 0, 0),
            Banner::Victory => Rgb(0, 255, 0),
        }
    }

    pub fn draw(&self, renderer: &Renderer, screen: Size) {
        let center = Point::new(screen.width / 2.0, screen.height / 2.0);
        renderer.draw_text(self.title(), center, TITLE_SIZE, self.color());
        renderer.draw_text(
            RESTART_HINT,
            Point::new(center.x, center.y + TITLE_SIZE),
            HINT_SIZE,
            Rgb(255, 255, 255),
        );
    }
}
