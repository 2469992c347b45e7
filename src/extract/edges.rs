//! Canny-style edge detection on grayscale rasters.

use image::GrayImage;

/// Lower hysteresis threshold on the L1 gradient magnitude.
pub const LOW_THRESHOLD: f64 = 50.0;
/// Upper hysteresis threshold on the L1 gradient magnitude.
pub const HIGH_THRESHOLD: f64 = 150.0;

/// tan(22.5 deg) and tan(67.5 deg), the sector bounds for gradient direction.
const TAN_22_5: f64 = 0.414_213_562_373_095_1;
const TAN_67_5: f64 = 2.414_213_562_373_095;

/// Binary edge raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMap {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
}

impl EdgeMap {
    pub fn new(width: usize, height: usize) -> Self {
        EdgeMap {
            width,
            height,
            pixels: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether `(x, y)` is an edge pixel; out-of-bounds coordinates never are.
    pub fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        self.pixels[y as usize * self.width + x as usize]
    }

    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        self.pixels[y * self.width + x] = value;
    }

    pub fn count(&self) -> usize {
        self.pixels.iter().filter(|p| **p).count()
    }
}

/// Gradient field of a grayscale image, computed with 3x3 Sobel kernels.
struct Gradient {
    width: usize,
    height: usize,
    gx: Vec<f64>,
    gy: Vec<f64>,
    magnitude: Vec<f64>,
}

impl Gradient {
    fn of(image: &GrayImage) -> Self {
        let (w, h) = (image.width() as i64, image.height() as i64);
        // replicate the border
        let px = |x: i64, y: i64| -> f64 {
            let x = x.clamp(0, w - 1) as u32;
            let y = y.clamp(0, h - 1) as u32;
            f64::from(image.get_pixel(x, y).0[0])
        };

        let len = (w * h) as usize;
        let mut gx = Vec::with_capacity(len);
        let mut gy = Vec::with_capacity(len);
        let mut magnitude = Vec::with_capacity(len);
        for y in 0..h {
            for x in 0..w {
                let dx = (px(x + 1, y - 1) + 2.0 * px(x + 1, y) + px(x + 1, y + 1))
                    - (px(x - 1, y - 1) + 2.0 * px(x - 1, y) + px(x - 1, y + 1));
                let dy = (px(x - 1, y + 1) + 2.0 * px(x, y + 1) + px(x + 1, y + 1))
                    - (px(x - 1, y - 1) + 2.0 * px(x, y - 1) + px(x + 1, y - 1));
                gx.push(dx);
                gy.push(dy);
                magnitude.push(dx.abs() + dy.abs());
            }
        }

        Gradient {
            width: w as usize,
            height: h as usize,
            gx,
            gy,
            magnitude,
        }
    }

    fn mag(&self, x: i64, y: i64) -> f64 {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return 0.0;
        }
        self.magnitude[y as usize * self.width + x as usize]
    }

    /// Whether `(x, y)` is a local maximum across the gradient direction.
    fn is_ridge(&self, x: usize, y: usize) -> bool {
        let i = y * self.width + x;
        let (m, dx, dy) = (self.magnitude[i], self.gx[i], self.gy[i]);
        let (ax, ay) = (dx.abs(), dy.abs());
        let (x, y) = (x as i64, y as i64);

        let (before, after) = if ay <= ax * TAN_22_5 {
            (self.mag(x - 1, y), self.mag(x + 1, y))
        } else if ay >= ax * TAN_67_5 {
            (self.mag(x, y - 1), self.mag(x, y + 1))
        } else if dx * dy > 0.0 {
            (self.mag(x - 1, y - 1), self.mag(x + 1, y + 1))
        } else {
            (self.mag(x + 1, y - 1), self.mag(x - 1, y + 1))
        };

        m > before && m >= after
    }
}

/// Detects edges: Sobel gradient, non-maximum suppression, then hysteresis.
///
/// Ridge pixels above `high` seed edges; ridge pixels above `low` are kept
/// only when 8-connected to a seed.
pub fn canny(image: &GrayImage, low: f64, high: f64) -> EdgeMap {
    let (w, h) = (image.width() as usize, image.height() as usize);
    let mut edges = EdgeMap::new(w, h);
    if w == 0 || h == 0 {
        return edges;
    }

    let gradient = Gradient::of(image);
    let mut candidate = vec![false; w * h];
    let mut stack = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let m = gradient.magnitude[y * w + x];
            if m <= low || !gradient.is_ridge(x, y) {
                continue;
            }
            candidate[y * w + x] = true;
            if m > high {
                edges.set(x, y, true);
                stack.push((x, y));
            }
        }
    }

    while let Some((x, y)) = stack.pop() {
        for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                if candidate[ny * w + nx] && !edges.get(nx as i64, ny as i64) {
                    edges.set(nx, ny, true);
                    stack.push((nx, ny));
                }
            }
        }
    }

    edges
}
