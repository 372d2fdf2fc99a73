// Random series colors drawn from the plasma colormap
use super::series::Color;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Anchor points of matplotlib's "plasma" map at 0, 0.25, 0.5, 0.75 and 1.
const PLASMA: [Color; 5] = [
    Color::rgb(13, 8, 135),
    Color::rgb(126, 3, 168),
    Color::rgb(204, 71, 120),
    Color::rgb(248, 149, 64),
    Color::rgb(240, 249, 33),
];

/// Sample the colormap at `t` in [0, 1].
pub fn plasma(t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let scaled = t * (PLASMA.len() - 1) as f64;
    let lo = (scaled.floor() as usize).min(PLASMA.len() - 2);
    let frac = scaled - lo as f64;
    let (a, b) = (PLASMA[lo], PLASMA[lo + 1]);
    let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    Color::rgb(lerp(a.r, b.r), lerp(a.g, b.g), lerp(a.b, b.b))
}

/// Hands out colors at random along the colormap. Repeated draws may collide.
#[derive(Debug)]
pub struct ColorPicker {
    rng: StdRng,
}

impl ColorPicker {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    #[cfg(test)]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_color(&mut self) -> Color {
        plasma(self.rng.gen_range(0.0..=1.0))
    }
}

impl Default for ColorPicker {
    fn default() -> Self {
        Self::new()
    }
}
