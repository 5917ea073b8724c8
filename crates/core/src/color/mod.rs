//! Textual color specifications.
//!
//! Controls never talk to hardware in terms of palette indices or sysex
//! payloads. Instead they hand the collaborator a short string such as
//! `"red@2 flash"`, `"#00ff00"` or `"on;blue"`, which is parsed into a
//! [`Color`] here and then mapped onto whatever the device understands.
//!
//! Grammar: one or two `;`-separated chunks. Each chunk is a color token
//! followed by space-separated flags (`flash`, `fade`). The second chunk
//! becomes the alternate color the first one flashes with.

mod support;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Result, SurfaceError};

pub use support::ColorSupport;

/// Highest channel value a surface accepts.
pub const CHANNEL_MAX: u8 = 127;

/// RGB triple with every channel in `0..=127`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// How a color flashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flash {
    /// Blink between the base color and off.
    Blink,
    /// Alternate between the base color and another one.
    Alternate(Box<Color>),
}

/// Structured form of a color specification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub rgb: Option<Rgb>,
    pub name: Option<String>,
    /// Device-specific brightness step; not range checked.
    pub intensity: Option<i32>,
    pub flash: Option<Flash>,
    pub fade: bool,
}

impl Color {
    /// Parses a color specification string.
    ///
    /// Triple channels must be integers. Values outside `0..=255` are clamped
    /// into it before the triple is scaled, so the resulting channels always
    /// lie in `0..=127`.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut chunks = spec.split(';');
        let mut words = chunks.next().unwrap_or_default().split_whitespace();
        let token = words
            .next()
            .ok_or_else(|| SurfaceError::parse(spec, "missing color"))?;

        let mut color = parse_token(spec, token)?;
        apply_flags(&mut color, words);

        // Anything after the second chunk is ignored.
        if let Some(chunk) = chunks.next() {
            let mut words = chunk.split_whitespace().peekable();
            match words.peek().copied().filter(|token| !is_flag(token)) {
                Some(token) => {
                    let alternate = parse_token(spec, token)?;
                    color.flash = Some(Flash::Alternate(Box::new(alternate)));
                }
                None => apply_flags(&mut color, words),
            }
        }

        Ok(color)
    }

    /// Creates a plain named color.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Creates a plain RGB color.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            rgb: Some(Rgb::new(r, g, b)),
            ..Self::default()
        }
    }

    pub fn is_flashing(&self) -> bool {
        self.flash.is_some()
    }

    /// Alternate color for [`Flash::Alternate`], if any.
    pub fn flash_color(&self) -> Option<&Color> {
        match &self.flash {
            Some(Flash::Alternate(color)) => Some(color),
            _ => None,
        }
    }

    fn write_token(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(Rgb { r, g, b }) = self.rgb {
            write!(f, "{r},{g},{b}")
        } else if let Some(name) = &self.name {
            f.write_str(name)?;
            match self.intensity {
                Some(intensity) => write!(f, "@{intensity}"),
                None => Ok(()),
            }
        } else {
            Ok(())
        }
    }
}

impl FromStr for Color {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Writes the canonical specification string, which parses back to `self`.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_token(f)?;
        if self.flash == Some(Flash::Blink) {
            f.write_str(" flash")?;
        }
        if self.fade {
            f.write_str(" fade")?;
        }
        if let Some(alternate) = self.flash_color() {
            f.write_str(";")?;
            alternate.write_token(f)?;
        }
        Ok(())
    }
}

fn is_flag(word: &str) -> bool {
    matches!(word, "flash" | "fade")
}

fn apply_flags<'a>(color: &mut Color, flags: impl Iterator<Item = &'a str>) {
    for flag in flags {
        match flag {
            "flash" => color.flash = Some(Flash::Blink),
            "fade" => color.fade = true,
            _ => {}
        }
    }
}

fn parse_token(spec: &str, token: &str) -> Result<Color> {
    if let Some(hex) = token.strip_prefix('#') {
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(SurfaceError::parse(spec, "hex colors must be #RRGGBB"));
        }
        let channel = |at: usize| {
            u8::from_str_radix(&hex[at..at + 2], 16)
                .map(|value| rescale(value.into()))
                .map_err(|err| SurfaceError::parse(spec, err.to_string()))
        };
        return Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?));
    }

    if token.contains(',') {
        let channels = token
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<i64>()
                    .map(|value| value.clamp(0, 255) as u16)
                    .map_err(|_| {
                        SurfaceError::parse(spec, format!("`{part}` is not a channel value"))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        let [r, g, b] = channels[..] else {
            return Err(SurfaceError::parse(spec, "expected three channels"));
        };

        // Triples are taken as 0-127 unless a channel gives away 0-255.
        let wide = channels.iter().any(|value| *value > u16::from(CHANNEL_MAX));
        let scale = |value: u16| if wide { rescale(value) } else { value as u8 };
        return Ok(Color::rgb(scale(r), scale(g), scale(b)));
    }

    match token.split_once('@') {
        Some((name, intensity)) => {
            let intensity = intensity.parse::<i32>().map_err(|_| {
                SurfaceError::parse(spec, format!("`{intensity}` is not an intensity"))
            })?;
            Ok(Color {
                intensity: Some(intensity),
                ..Color::named(name)
            })
        }
        None => Ok(Color::named(token)),
    }
}

fn rescale(value: u16) -> u8 {
    (value * u16::from(CHANNEL_MAX) / 255) as u8
}
