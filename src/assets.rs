// Asset manifest + concurrent loading
//
// Every image, sprite sheet and sound the scene needs is known up front from
// `Params`, so loading is one batch:
//
//   Params ──► manifest() ──► [AssetEntry] ──► load_assets(loader) ──► Assets
//                                                  │
//                                                  └─ first failure aborts,
//                                                     logs + shows a message
use crate::engine::{self, Point, Renderer, Rgb, Size, Sound};
use crate::params::{
    star_sprite_name, AnimatedStarParams, ImageParams, Params, SheetParams, SoundParams,
};
use anyhow::{Context, Error, Result};
use async_trait::async_trait;
use futures::future::try_join_all;
use std::collections::HashMap;
use web_sys::HtmlImageElement;

pub const LOAD_ERROR_MESSAGE: &str = "Failed to load assets. Please refresh.";

#[derive(Debug, Clone, PartialEq)]
pub enum AssetKind {
    Image,
    /// `columns x rows` grid of equal frames, timing comes from `Params`
    Sheet { columns: u32, rows: u32 },
    Sound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetEntry {
    pub name: String,
    pub url: String,
    pub kind: AssetKind,
}

impl AssetEntry {
    fn image(image: &ImageParams) -> Self {
        AssetEntry {
            name: image.name.clone(),
            url: image.url.clone(),
            kind: AssetKind::Image,
        }
    }

    fn sheet(sheet: &SheetParams) -> Self {
        AssetEntry {
            name: sheet.name.clone(),
            url: sheet.url.clone(),
            kind: AssetKind::Sheet {
                columns: sheet.slice_x,
                rows: sheet.slice_y,
            },
        }
    }

    fn sound(sound: &SoundParams) -> Self {
        AssetEntry {
            name: sound.name.clone(),
            url: sound.url.clone(),
            kind: AssetKind::Sound,
        }
    }

    /// One sheet per colour, "twinkling-star-blue" from "twinkling-star-blue.png"
    fn star_sheets(params: &Params, kind: &AnimatedStarParams) -> Vec<Self> {
        params
            .background
            .stars
            .colors
            .iter()
            .map(|color| {
                let name = star_sprite_name(&kind.file_prefix, *color);
                AssetEntry {
                    url: format!("{}.png", name),
                    name,
                    kind: AssetKind::Sheet {
                        columns: kind.frames,
                        rows: 1,
                    },
                }
            })
            .collect()
    }
}

/// Everything the scene draws or plays, derived from the parameters
pub fn manifest(params: &Params) -> Vec<AssetEntry> {
    let background = &params.background;
    let stars = &background.stars;
    let mut entries = vec![
        AssetEntry::image(&background.static_bg),
        AssetEntry::image(&background.moon),
    ];
    if background.show_earth {
        entries.push(AssetEntry::image(&background.earth));
    }

    if !params.music.url.is_empty() {
        entries.push(AssetEntry::sound(&params.music));
    }
    entries.extend(params.sounds.all().into_iter().map(AssetEntry::sound));

    entries.extend(AssetEntry::star_sheets(params, &stars.twinkling));
    entries.extend(AssetEntry::star_sheets(params, &stars.pulsing));
    entries.extend(AssetEntry::star_sheets(params, &stars.exploding));
    let shooting = &stars.shooting;
    entries.push(AssetEntry {
        name: shooting.name.clone(),
        url: shooting.url.clone(),
        kind: AssetKind::Sheet {
            columns: shooting.frames,
            rows: 1,
        },
    });

    let sheets = &params.player.sprite_sheets;
    entries.push(AssetEntry::sheet(&sheets.idle));
    entries.push(AssetEntry::sheet(&sheets.moving));
    entries.push(AssetEntry::sheet(&sheets.damage));
    entries.push(AssetEntry::sheet(&sheets.death));
    let bullet = &params.player.bullet_sprite;
    entries.push(AssetEntry {
        name: bullet.name.clone(),
        url: bullet.url.clone(),
        kind: AssetKind::Image,
    });

    entries.push(AssetEntry::sheet(&params.enemy.sprite_sheet));
    entries.push(AssetEntry::sheet(&params.enemy.death_sprite_sheet));
    entries
}

/// Loading seam, the browser fetches real elements, tests hand back fakes
#[async_trait(?Send)]
pub trait AssetLoader {
    type Image;
    type Sound;

    async fn load_image(&self, url: &str) -> Result<Self::Image>;
    async fn load_sound(&self, url: &str) -> Result<Self::Sound>;
    fn show_load_error(&self, message: &str);

    fn log_error(&self, err: &Error) {
        error!("[assets.rs::load_assets] {:#?}", err);
    }
}

pub struct Sheet<I> {
    pub image: I,
    pub columns: u32,
    pub rows: u32,
}

pub struct Assets<I, S> {
    pub images: HashMap<String, I>,
    pub sheets: HashMap<String, Sheet<I>>,
    pub sounds: HashMap<String, S>,
}

impl<I, S> Assets<I, S> {
    pub fn len(&self) -> usize {
        self.images.len() + self.sheets.len() + self.sounds.len()
    }
}

enum Loaded<I, S> {
    Image(I),
    Sound(S),
}

/// Loads the whole manifest concurrently. Nothing is kept on failure: the
/// error is logged, the message shown and the error handed back.
pub async fn load_assets<L: AssetLoader>(
    loader: &L,
    entries: &[AssetEntry],
) -> Result<Assets<L::Image, L::Sound>> {
    let loads = entries.iter().map(|entry| async move {
        let loaded = match entry.kind {
            AssetKind::Sound => Loaded::Sound(loader.load_sound(&entry.url).await?),
            AssetKind::Image | AssetKind::Sheet { .. } => {
                Loaded::Image(loader.load_image(&entry.url).await?)
            }
        };
        Ok::<_, Error>((entry, loaded))
    });

    let loaded = match try_join_all(loads).await {
        Ok(loaded) => loaded,
        Err(err) => {
            loader.log_error(&err);
            loader.show_load_error(LOAD_ERROR_MESSAGE);
            return Err(err).context("Could not load the asset manifest");
        }
    };

    let mut assets = Assets {
        images: HashMap::new(),
        sheets: HashMap::new(),
        sounds: HashMap::new(),
    };
    for (entry, loaded) in loaded {
        let name = entry.name.clone();
        match (loaded, &entry.kind) {
            (Loaded::Sound(sound), _) => {
                assets.sounds.insert(name, sound);
            }
            (Loaded::Image(image), AssetKind::Sheet { columns, rows }) => {
                assets.sheets.insert(
                    name,
                    Sheet {
                        image,
                        columns: *columns,
                        rows: *rows,
                    },
                );
            }
            (Loaded::Image(image), _) => {
                assets.images.insert(name, image);
            }
        }
    }
    Ok(assets)
}

// ==================== Browser ====================
pub struct BrowserLoader {
    pub screen: Size,
}

#[async_trait(?Send)]
impl AssetLoader for BrowserLoader {
    type Image = HtmlImageElement;
    type Sound = Sound;

    async fn load_image(&self, url: &str) -> Result<HtmlImageElement> {
        engine::load_image(url)
            .await
            .with_context(|| format!("Failed to load image from : {}", url))
    }

    async fn load_sound(&self, url: &str) -> Result<Sound> {
        engine::load_sound(url)
            .await
            .with_context(|| format!("Failed to load sound from : {}", url))
    }

    fn show_load_error(&self, message: &str) {
        match Renderer::new() {
            Ok(renderer) => renderer.draw_text(
                message,
                Point::new(self.screen.width / 2.0, self.screen.height / 2.0),
                24.0,
                Rgb(255, 80, 80),
            ),
            Err(err) => error!("[assets.rs::show_load_error] {:#?}", err),
        }
    }
}
