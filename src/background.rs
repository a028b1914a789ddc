//! Star field and scenery behind the playfield.
//!
//! Everything here is screen space. Each layer keeps a `base` anchor and is
//! drawn at `base - offset * factor`, where `offset` is how far the ship sits
//! from its spawn point. Stars wrap around horizontally so the field never
//! runs dry, the moon and earth only shift.
use crate::engine::{Point, Rgb, Size};
use crate::params::{pick, star_sprite_name, AnimatedStarParams, ImageParams, Params, StarColor};
use crate::sprite::{Animation, Clip};
use crate::world::Layout;
use rand::seq::SliceRandom;
use rand::Rng;
use std::rc::Rc;

/// Keeps stars away from the edges of the band and of their grid cell
const GRID_PAD: f32 = 8.0;
/// Shooting stars start and end this far outside the screen
const SHOOTING_STAR_OVERSCAN: f32 = 40.0;

const Z_STATIC_BG: i32 = -1000;
const Z_STATIC_STAR: i32 = -950;
const Z_ANIMATED_STAR: i32 = -900;
const Z_EXPLODING_STAR: i32 = -880;
const Z_SHOOTING_STAR: i32 = -870;
const Z_MOON: i32 = -860;
const Z_EARTH: i32 = -850;

/// Horizontal wrap bounds and the vertical band a star lives in
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Wrap {
    pub margin: f32,
    pub pad: f32,
    pub max_y: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Parallax {
    pub base: Point,
    pub factor: f32,
    pub factor_y: f32,
    pub wrap: Option<Wrap>,
}

impl Parallax {
    pub fn new(base: Point, factor: f32) -> Self {
        Parallax {
            base,
            factor,
            factor_y: factor,
            wrap: None,
        }
    }

    pub fn with_factor_y(mut self, factor_y: f32) -> Self {
        self.factor_y = factor_y;
        self
    }

    pub fn wrapping(mut self, wrap: Wrap) -> Self {
        self.wrap = Some(wrap);
        self
    }
}

/// Screen position of a layer for the given ship offset.
///
/// Wrapping layers look at where they *would* be drawn first and move their
/// base a whole `width + 2 * margin` step when that falls outside
/// `[-margin, width + margin]`, so the star reappears on the far side on the
/// same frame it leaves. The base Y is kept inside `[pad, max_y - pad]`.
pub fn apply_parallax(layer: &mut Parallax, offset: Point, width: f32) -> Point {
    if let Some(wrap) = layer.wrap {
        let span = width + 2.0 * wrap.margin;
        let projected_x = layer.base.x - offset.x * layer.factor;
        if projected_x < -wrap.margin {
            layer.base.x += span;
        }
        if projected_x > width + wrap.margin {
            layer.base.x -= span;
        }

        let top = wrap.pad;
        let bottom = (wrap.max_y - wrap.pad).max(wrap.pad);
        if layer.base.y < top {
            layer.base.y = bottom;
        }
        if layer.base.y > bottom {
            layer.base.y = top;
        }
    }
    Point::new(
        layer.base.x - offset.x * layer.factor,
        layer.base.y - offset.y * layer.factor_y,
    )
}

#[derive(Debug, Clone, PartialEq)]
pub enum StarLook {
    /// plain filled square
    Square { size: f32, color: Rgb },
    /// frame of a loaded sprite sheet, drawn at `scale`
    Sprite {
        sheet: String,
        animation: Animation,
        scale: f32,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StarKind {
    Static,
    Animated,
    Exploding,
    Shooting,
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Travel {
    from: Point,
    to: Point,
    duration: f32,
    elapsed: f32,
}

#[derive(Debug, Clone)]
pub struct Star {
    pub kind: StarKind,
    pub position: Point,
    pub opacity: f32,
    pub look: StarLook,
    pub z: i32,
    parallax: Parallax,
    /// seconds left for transient stars
    lifetime: Option<f32>,
    travel: Option<Travel>,
}

/// Single image layer: static backdrop, moon, earth
#[derive(Debug, Clone)]
pub struct Decor {
    pub name: String,
    /// centre of the image
    pub position: Point,
    pub size: Size,
    pub z: i32,
    parallax: Parallax,
}

impl Decor {
    fn new(image: &ImageParams, center: Point, scale: f32, z: i32, parallax: Parallax) -> Self {
        Decor {
            name: image.name.clone(),
            position: center,
            size: Size::new(image.width, image.height).scaled(scale),
            z,
            parallax,
        }
    }
}

pub enum Drawable<'a> {
    Decor(&'a Decor),
    Star(&'a Star),
}

impl Drawable<'_> {
    fn z(&self) -> i32 {
        match self {
            Drawable::Decor(decor) => decor.z,
            Drawable::Star(star) => star.z,
        }
    }
}

pub struct Background {
    params: Rc<Params>,
    width: f32,
    height: f32,
    star_max_y: f32,
    decor: Vec<Decor>,
    stars: Vec<Star>,
    /// every cell centre of the star grid, exploding stars reuse them
    grid: Vec<Point>,
    exploding_in: f32,
    shooting_in: f32,
}

impl Background {
    pub fn new<R: Rng + ?Sized>(params: Rc<Params>, layout: &Layout, rng: &mut R) -> Self {
        let config = &params.background;
        let stars = &config.stars;
        let mut background = Background {
            params: params.clone(),
            width: layout.width,
            height: layout.height,
            star_max_y: layout.star_max_y,
            decor: Vec::new(),
            stars: Vec::new(),
            grid: Vec::new(),
            exploding_in: pick(rng, stars.exploding_star_interval_range),
            shooting_in: pick(rng, stars.shooting_star_interval_range),
        };

        background.add_scenery(layout);

        background.grid = build_grid(layout.width, layout.star_max_y, stars.grid_cell_size_px);
        let mut pool = background.grid.clone();
        pool.shuffle(rng);

        let reserved = stars.twinkling_star_count + stars.pulsing_star_count;
        let static_count = stars
            .static_star_count
            .min(pool.len().saturating_sub(reserved));
        for _ in 0..static_count {
            let position = background.take_grid_position(&mut pool, rng);
            background.add_static_star(position, rng);
        }

        // round robin so every colour shows up even with few stars
        let colors = stars.colors.clone();
        if !colors.is_empty() {
            for index in 0..stars.twinkling_star_count {
                let color = colors[index % colors.len()];
                let position = background.take_grid_position(&mut pool, rng);
                let twinkling = &params.background.stars.twinkling;
                background.add_animated_star(twinkling, color, position, rng);
            }
            for index in 0..stars.pulsing_star_count {
                let color = colors[(index + 1) % colors.len()];
                let position = background.take_grid_position(&mut pool, rng);
                let pulsing = &params.background.stars.pulsing;
                background.add_animated_star(pulsing, color, position, rng);
            }
        }

        // one right away so the sky doesn't start still
        background.spawn_exploding_star(rng);
        background
    }

    fn add_scenery(&mut self, layout: &Layout) {
        let config = &self.params.background;
        let parallax = &config.parallax;

        let backdrop_scale = (layout.width / config.static_bg.width)
            .max(layout.height / config.static_bg.height);
        let center = Point::new(layout.width / 2.0, layout.height / 2.0);
        self.decor.push(Decor::new(
            &config.static_bg,
            center,
            backdrop_scale,
            Z_STATIC_BG,
            Parallax::new(center, parallax.static_bg).with_factor_y(0.0),
        ));

        let moon_scale = 2.0 * (layout.width / 375.0);
        let moon_center = Point::new(55.0, 125.0);
        self.decor.push(Decor::new(
            &config.moon,
            moon_center,
            moon_scale,
            Z_MOON,
            Parallax::new(moon_center, parallax.moon).with_factor_y(parallax.moon_y),
        ));

        if config.show_earth {
            // bottom anchored
            let earth_center = Point::new(
                layout.width / 2.0,
                layout.height - layout.earth_height / 2.0,
            );
            self.decor.push(Decor::new(
                &config.earth,
                earth_center,
                layout.earth_scale,
                Z_EARTH,
                Parallax::new(earth_center, parallax.earth).with_factor_y(0.0),
            ));
        }
    }

    fn star_wrap(&self) -> Wrap {
        Wrap {
            margin: self.params.background.parallax.wrap_margin,
            pad: GRID_PAD,
            max_y: self.star_max_y,
        }
    }

    fn band_right(&self) -> f32 {
        (self.width - GRID_PAD).max(GRID_PAD)
    }

    fn band_bottom(&self) -> f32 {
        (self.star_max_y - GRID_PAD).max(GRID_PAD)
    }

    fn jitter<R: Rng + ?Sized>(&self, cell_center: Point, rng: &mut R) -> Point {
        let cell = self.params.background.stars.grid_cell_size_px;
        let max_jitter = (cell / 2.0 - GRID_PAD).max(0.0);
        Point::new(
            (cell_center.x + pick(rng, [-max_jitter, max_jitter]))
                .clamp(GRID_PAD, self.band_right()),
            (cell_center.y + pick(rng, [-max_jitter, max_jitter]))
                .clamp(GRID_PAD, self.band_bottom()),
        )
    }

    /// Next cell from the shuffled pool, or anywhere in the band once the
    /// pool is used up
    fn take_grid_position<R: Rng + ?Sized>(&self, pool: &mut Vec<Point>, rng: &mut R) -> Point {
        match pool.pop() {
            Some(cell_center) => self.jitter(cell_center, rng),
            None => Point::new(
                pick(rng, [GRID_PAD, self.band_right()]),
                pick(rng, [GRID_PAD, self.band_bottom()]),
            ),
        }
    }

    fn random_color<R: Rng + ?Sized>(&self, rng: &mut R) -> StarColor {
        self.params
            .background
            .stars
            .colors
            .choose(rng)
            .copied()
            .unwrap_or(StarColor::Blue)
    }

    fn add_static_star<R: Rng + ?Sized>(&mut self, position: Point, rng: &mut R) {
        let stars = &self.params.background.stars;
        let look = StarLook::Square {
            size: pick(rng, stars.static_star_size_range),
            color: self.random_color(rng).tint(),
        };
        let factor = self.params.background.parallax.stars.fixed;
        let parallax = Parallax::new(position, factor).wrapping(self.star_wrap());
        self.stars.push(Star {
            kind: StarKind::Static,
            position,
            opacity: pick(rng, [0.5, 0.95]),
            look,
            z: Z_STATIC_STAR,
            parallax,
            lifetime: None,
            travel: None,
        });
    }

    fn add_animated_star<R: Rng + ?Sized>(
        &mut self,
        kind: &AnimatedStarParams,
        color: StarColor,
        position: Point,
        rng: &mut R,
    ) {
        let stars = &self.params.background.stars;
        let frames = kind.frames.max(1);
        let animation = Animation::new(Clip::new(frames, kind.speed, true))
            .with_delay(
                pick(rng, stars.animated_star_start_delay_range),
                rng.gen_range(0..frames),
            )
            .with_speed_factor(1.0 + pick(rng, [-kind.speed_variance, kind.speed_variance]));
        let factor = self.params.background.parallax.stars.animated;
        let parallax = Parallax::new(position, factor).wrapping(self.star_wrap());
        self.stars.push(Star {
            kind: StarKind::Animated,
            position,
            opacity: pick(rng, [0.65, 1.0]),
            look: StarLook::Sprite {
                sheet: star_sprite_name(&kind.file_prefix, color),
                animation,
                scale: stars.star_scale,
            },
            z: Z_ANIMATED_STAR,
            parallax,
            lifetime: None,
            travel: None,
        });
    }

    /// Lands on a random grid cell, plays once, then removes itself after the
    /// clip length plus a small margin
    fn spawn_exploding_star<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let position = match self.grid.choose(rng) {
            Some(cell_center) => self.jitter(*cell_center, rng),
            None => self.take_grid_position(&mut Vec::new(), rng),
        };
        let color = self.random_color(rng);
        let stars = &self.params.background.stars;
        let kind = &stars.exploding;
        let clip = Clip::new(kind.frames, kind.speed, false);
        let animation = Animation::new(clip)
            .with_speed_factor(1.0 + pick(rng, [-kind.speed_variance, kind.speed_variance]));
        let factor = self.params.background.parallax.stars.exploding;
        let parallax = Parallax::new(position, factor).wrapping(self.star_wrap());
        self.stars.push(Star {
            kind: StarKind::Exploding,
            position,
            opacity: pick(rng, [0.85, 1.0]),
            look: StarLook::Sprite {
                sheet: star_sprite_name(&kind.file_prefix, color),
                animation,
                scale: stars.star_scale,
            },
            z: Z_EXPLODING_STAR,
            parallax,
            lifetime: Some(clip.duration() + 0.05),
            travel: None,
        });
    }

    /// Crosses the screen from a random side, drifting down a little
    fn spawn_shooting_star<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let shooting = &self.params.background.stars.shooting;
        let from_left = rng.gen_bool(0.5);
        let (start_x, end_x) = if from_left {
            (-SHOOTING_STAR_OVERSCAN, self.width + SHOOTING_STAR_OVERSCAN)
        } else {
            (self.width + SHOOTING_STAR_OVERSCAN, -SHOOTING_STAR_OVERSCAN)
        };
        let start_y = pick(rng, [0.08 * self.height, 0.55 * self.star_max_y]);
        let end_y = start_y + pick(rng, [40.0, 120.0]);
        let from = Point::new(start_x, start_y);
        let travel = Travel {
            from,
            to: Point::new(end_x, end_y),
            duration: pick(rng, shooting.travel_time_range),
            elapsed: 0.0,
        };
        self.stars.push(Star {
            kind: StarKind::Shooting,
            position: from,
            opacity: 0.95,
            look: StarLook::Sprite {
                sheet: shooting.name.clone(),
                animation: Animation::new(Clip::new(shooting.frames, shooting.speed, true)),
                scale: self.params.background.stars.star_scale,
            },
            z: Z_SHOOTING_STAR,
            parallax: Parallax::new(from, self.params.background.parallax.stars.shooting),
            lifetime: None,
            travel: Some(travel),
        });
    }

    /// One frame. `offset` is the ship's distance from its spawn point,
    /// `active` is false once the run is over: the sky freezes in place, no
    /// new transient stars spawn and shooting stars are dropped.
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, offset: Point, active: bool, rng: &mut R) {
        for star in self.stars.iter_mut() {
            if let StarLook::Sprite { animation, .. } = &mut star.look {
                animation.update(dt);
            }
            if let Some(lifetime) = star.lifetime.as_mut() {
                *lifetime -= dt;
            }
        }
        self.stars
            .retain(|star| star.lifetime.map_or(true, |lifetime| lifetime > 0.0));

        if !active {
            self.stars.retain(|star| star.kind != StarKind::Shooting);
            return;
        }

        let stars = &self.params.background.stars;
        let exploding_range = stars.exploding_star_interval_range;
        let shooting_range = stars.shooting_star_interval_range;
        self.exploding_in -= dt;
        if self.exploding_in <= 0.0 {
            self.spawn_exploding_star(rng);
            self.exploding_in = pick(rng, exploding_range);
        }
        self.shooting_in -= dt;
        if self.shooting_in <= 0.0 {
            self.spawn_shooting_star(rng);
            self.shooting_in = pick(rng, shooting_range);
        }

        let mut arrived = false;
        for star in self.stars.iter_mut() {
            if let Some(travel) = star.travel.as_mut() {
                travel.elapsed += dt;
                let progress = if travel.duration > 0.0 {
                    (travel.elapsed / travel.duration).min(1.0)
                } else {
                    1.0
                };
                star.parallax.base = Point::new(
                    travel.from.x + (travel.to.x - travel.from.x) * progress,
                    travel.from.y + (travel.to.y - travel.from.y) * progress,
                );
                if progress >= 1.0 {
                    star.lifetime = Some(0.0);
                    arrived = true;
                }
            }
            star.position = apply_parallax(&mut star.parallax, offset, self.width);
        }
        if arrived {
            self.stars
                .retain(|star| star.lifetime.map_or(true, |lifetime| lifetime > 0.0));
        }

        for decor in self.decor.iter_mut() {
            decor.position = apply_parallax(&mut decor.parallax, offset, self.width);
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn count(&self, kind: StarKind) -> usize {
        self.stars.iter().filter(|star| star.kind == kind).count()
    }

    /// Scenery and stars, back to front
    pub fn drawables(&self) -> Vec<Drawable<'_>> {
        let mut drawables: Vec<Drawable> = self
            .decor
            .iter()
            .map(Drawable::Decor)
            .chain(self.stars.iter().map(Drawable::Star))
            .collect();
        drawables.sort_by_key(|drawable| drawable.z());
        drawables
    }
}

/// Centres of the `cell` sized grid over `[0, width] x [0, max_y]`, skipping
/// cells that would sit below the band
pub fn build_grid(width: f32, max_y: f32, cell: f32) -> Vec<Point> {
    let cell = cell.max(1.0);
    let cols = (((width - 1.0) / cell).floor() as i32 + 1).max(1);
    let rows = (((max_y - 1.0) / cell).floor() as i32 + 1).max(1);
    let right = (width - GRID_PAD).max(GRID_PAD);
    let bottom = (max_y - GRID_PAD).max(GRID_PAD);
    let mut cells = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            let x = col as f32 * cell + cell / 2.0;
            let y = row as f32 * cell + cell / 2.0;
            if y > max_y - GRID_PAD {
                continue;
            }
            cells.push(Point::new(x.clamp(GRID_PAD, right), y.clamp(GRID_PAD, bottom)));
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    fn background() -> (Background, StdRng) {
        background_with(Params::default())
    }

    fn background_with(params: Params) -> (Background, StdRng) {
        let params = Rc::new(params);
        let layout = Layout::new(&params);
        let mut rng = StdRng::seed_from_u64(11);
        let background = Background::new(params, &layout, &mut rng);
        (background, rng)
    }

    fn crowded(twinkling: usize, pulsing: usize, fixed: usize) -> Params {
        let mut params = Params::default();
        let stars = &mut params.background.stars;
        stars.twinkling_star_count = twinkling;
        stars.pulsing_star_count = pulsing;
        stars.static_star_count = fixed;
        params
    }

    #[test]
    fn grid_skips_cells_below_the_band() {
        let cells = build_grid(375.0, 667.0, 64.0);
        // 6 columns, the 11th row would be centred at 672
        assert_eq!(cells.len(), 60);
        assert!(cells.iter().all(|cell| cell.y <= 659.0 && cell.x <= 367.0));
    }

    #[test]
    fn animated_stars_get_reserved_cells() {
        let (background, _) = background();
        assert_eq!(background.count(StarKind::Animated), 12);
        // 60 cells, 12 reserved
        assert_eq!(background.count(StarKind::Static), 48);
        assert_eq!(background.count(StarKind::Exploding), 1);
        assert!(background.stars().iter().all(|star| {
            star.position.x >= GRID_PAD && star.position.x <= 375.0 - GRID_PAD
        }));
    }

    #[test]
    fn animated_colours_round_robin() {
        let (background, _) = background();
        let sheets: Vec<&str> = background
            .stars()
            .iter()
            .filter(|star| star.kind == StarKind::Animated)
            .filter_map(|star| match &star.look {
                StarLook::Sprite { sheet, .. } => Some(sheet.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(sheets[0], "twinkling-star-blue");
        assert_eq!(sheets[4], "twinkling-star-blue");
        assert_eq!(sheets[6], "pulsing-star-green");
    }

    #[test]
    fn wrap_checks_the_projection_before_moving_the_base() {
        let wrap = Wrap {
            margin: 80.0,
            pad: 8.0,
            max_y: 667.0,
        };
        let mut layer = Parallax::new(Point::new(10.0, 100.0), 1.0).wrapping(wrap);
        let position = apply_parallax(&mut layer, Point::new(95.0, 0.0), 375.0);
        // projected at -85, re-anchored one span (375 + 160) to the right
        assert_relative_eq!(layer.base.x, 545.0);
        assert_relative_eq!(position.x, 450.0);
    }

    #[test]
    fn projected_stars_stay_inside_the_margins() {
        let width = 375.0;
        let margin = 80.0;
        let span = width + 2.0 * margin;
        let wrap = Wrap {
            margin,
            pad: 8.0,
            max_y: 667.0,
        };
        let mut layers: Vec<Parallax> = (0..8)
            .map(|index| Parallax::new(Point::new(index as f32 * 50.0, 100.0), 3.0).wrapping(wrap))
            .collect();
        let mut previous: Vec<Option<f32>> = vec![None; layers.len()];
        // ship sweeping its full range back and forth at 5 px per frame
        let mut x = 20.0f32;
        let mut direction = 1.0;
        for _ in 0..2000 {
            x += 5.0 * direction;
            if x >= 355.0 || x <= 20.0 {
                direction = -direction;
            }
            let offset = Point::new(x - width / 2.0, 0.0);
            for (layer, last) in layers.iter_mut().zip(previous.iter_mut()) {
                let position = apply_parallax(layer, offset, width);
                assert!(position.x >= -margin && position.x <= width + margin);
                if let Some(last) = *last {
                    let jump = (position.x - last).abs();
                    assert!(jump <= 15.0 + 1e-3 || (jump - span).abs() <= 15.0 + 1e-3);
                }
                *last = Some(position.x);
            }
        }
    }

    #[test]
    fn exploding_stars_expire_and_respawn() {
        let (mut background, mut rng) = background();
        let mut seen_after_first_expired = 0;
        for frame in 0..60 * 6 {
            background.update(1.0 / 60.0, Point::default(), true, &mut rng);
            let exploding = background.count(StarKind::Exploding);
            // spawns are at least 0.9 s apart and each lives 24 / 18 + 0.05 s
            assert!(exploding <= 2, "{}", exploding);
            if frame > 90 {
                seen_after_first_expired = seen_after_first_expired.max(exploding);
            }
        }
        assert!(seen_after_first_expired >= 1);
    }

    #[test]
    fn finished_runs_drop_shooting_stars_and_stop_spawning() {
        let (mut background, mut rng) = background();
        for _ in 0..60 * 4 {
            background.update(1.0 / 60.0, Point::default(), true, &mut rng);
        }
        let before: Vec<Point> = background.stars().iter().map(|star| star.position).collect();
        background.update(1.0 / 60.0, Point::new(100.0, 0.0), false, &mut rng);
        assert_eq!(background.count(StarKind::Shooting), 0);
        for _ in 0..60 * 3 {
            background.update(1.0 / 60.0, Point::new(100.0, 0.0), false, &mut rng);
        }
        assert_eq!(background.count(StarKind::Exploding), 0);
        // parallax is frozen too
        let static_star = background
            .stars()
            .iter()
            .find(|star| star.kind == StarKind::Static)
            .map(|star| star.position);
        assert!(static_star.map_or(false, |position| before.contains(&position)));
    }

    #[test]
    fn static_stars_only_get_the_unreserved_cells() {
        // 60 cells, 50 reserved
        let (background, _) = background_with(crowded(30, 20, 90));
        assert_eq!(background.count(StarKind::Animated), 50);
        assert_eq!(background.count(StarKind::Static), 10);
    }

    #[test]
    fn exhausted_grid_places_stars_anywhere_in_the_band() {
        let (background, _) = background_with(crowded(50, 50, 100));
        assert_eq!(background.count(StarKind::Static), 0);
        assert_eq!(background.count(StarKind::Animated), 100);
        let (right, bottom) = (background.band_right(), background.band_bottom());
        for star in background.stars() {
            let Point { x, y } = star.position;
            assert!(x >= GRID_PAD && x <= right, "{:?}", star.position);
            assert!(y >= GRID_PAD && y <= bottom, "{:?}", star.position);
        }
    }

    #[test]
    fn stars_leaving_the_band_vertically_reanchor() {
        let wrap = Wrap {
            margin: 80.0,
            pad: 8.0,
            max_y: 300.0,
        };
        let mut below = Parallax::new(Point::new(100.0, 400.0), 1.0).wrapping(wrap);
        let position = apply_parallax(&mut below, Point::default(), 375.0);
        assert_relative_eq!(below.base.y, 8.0);
        assert_relative_eq!(position.y, 8.0);

        let mut above = Parallax::new(Point::new(100.0, 2.0), 1.0).wrapping(wrap);
        apply_parallax(&mut above, Point::default(), 375.0);
        assert_relative_eq!(above.base.y, 292.0);
    }

    #[test]
    fn shooting_stars_cross_and_remove_themselves() {
        let (mut background, mut rng) = background();
        background.shooting_in = f32::MAX;
        background.spawn_shooting_star(&mut rng);
        let shooting = |background: &Background| {
            background
                .stars()
                .iter()
                .find(|star| star.kind == StarKind::Shooting)
                .map(|star| star.position)
        };
        let start = shooting(&background);
        assert!(start.is_some());

        background.update(DT, Point::default(), true, &mut rng);
        assert_ne!(shooting(&background), start);

        // longest crossing is 1.1 s
        for _ in 0..70 {
            background.update(DT, Point::default(), true, &mut rng);
        }
        assert_eq!(background.count(StarKind::Shooting), 0);
    }

    #[test]
    fn shooting_stars_only_spawn_while_the_run_is_live() {
        let mut params = Params::default();
        params.background.stars.shooting_star_interval_range = [0.1, 0.1];
        let (mut background, mut rng) = background_with(params);
        for _ in 0..120 {
            background.update(DT, Point::default(), false, &mut rng);
            assert_eq!(background.count(StarKind::Shooting), 0);
        }

        for _ in 0..7 {
            background.update(DT, Point::default(), true, &mut rng);
        }
        assert_eq!(background.count(StarKind::Shooting), 1);
    }
}
