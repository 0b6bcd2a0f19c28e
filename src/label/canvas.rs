use image::RgbaImage;

/// Paint target the label draws into.
pub trait Canvas {
    /// Current container size in pixels.
    fn size(&self) -> (u32, u32);

    /// Draws `image` with its top-left corner at `(x, y)`, clipping anything
    /// outside the canvas.
    fn draw_image(&mut self, x: i32, y: i32, image: &RgbaImage);
}

/// Owned CPU framebuffer in softbuffer's `0RGB` layout.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    /// Resizes the buffer, discarding its contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![0; width as usize * height as usize];
    }

    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

impl Canvas for PixelCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn draw_image(&mut self, x: i32, y: i32, image: &RgbaImage) {
        let (img_w, img_h) = image.dimensions();
        let x0 = i64::from(x).max(0);
        let y0 = i64::from(y).max(0);
        let x1 = (i64::from(x) + i64::from(img_w)).min(i64::from(self.width));
        let y1 = (i64::from(y) + i64::from(img_h)).min(i64::from(self.height));
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let stride = self.width as usize;
        for dy in y0..y1 {
            let sy = (dy - i64::from(y)) as u32;
            let row = dy as usize * stride;
            for dx in x0..x1 {
                let sx = (dx - i64::from(x)) as u32;
                let [r, g, b, a] = image.get_pixel(sx, sy).0;
                let dst = &mut self.pixels[row + dx as usize];
                *dst = blend_over(*dst, [r, g, b], a);
            }
        }
    }
}

fn blend_over(dst: u32, src: [u8; 3], alpha: u8) -> u32 {
    match alpha {
        255 => pack(src[0], src[1], src[2]),
        0 => dst,
        _ => {
            let a = u32::from(alpha);
            let mix = |s: u8, d: u32| -> u8 { ((u32::from(s) * a + d * (255 - a)) / 255) as u8 };
            pack(
                mix(src[0], (dst >> 16) & 0xff),
                mix(src[1], (dst >> 8) & 0xff),
                mix(src[2], dst & 0xff),
            )
        }
    }
}

fn pack(r: u8, g: u8, b: u8) -> u32 {
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}
