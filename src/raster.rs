/*
 *  raster.rs
 *
 *  spectramon - spectral scan waterfall
 *
 *  Runtime-sized RGB framebuffer with additive accumulate-blending.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

use crate::constants::BLEND_RADIUS;

/// One frame's pixel buffer. Created per frame by the render loop and
/// handed to the presenter; implements `DrawTarget` so gridlines and
/// labels come from embedded-graphics primitives, while the data path
/// uses [`blend_block`](Raster::blend_block) directly.
#[derive(Debug, Clone)]
pub struct Raster {
    buf: Vec<Rgb888>,
    w: usize,
    h: usize,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![Rgb888::BLACK; w * h], w, h }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Immutable raw access for the presenter blit.
    pub fn as_slice(&self) -> &[Rgb888] { &self.buf }

    pub fn clear_color(&mut self, color: Rgb888) {
        self.buf.fill(color);
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 {
            let (x, y) = (x as usize, y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb888> {
        self.idx(x, y).map(|i| self.buf[i])
    }

    /// Would a full blend block centered here fit on the raster?
    /// All-or-nothing: partially clipped blocks are not drawn at all.
    #[inline]
    fn block_in_bounds(&self, x: i32, y: i32) -> bool {
        if x - BLEND_RADIUS < 0 || x + BLEND_RADIUS >= self.w as i32 {
            return false;
        }
        if y - BLEND_RADIUS < 0 || y + BLEND_RADIUS >= self.h as i32 {
            return false;
        }
        true
    }

    #[inline]
    fn blend_px(&mut self, i: usize, color: Rgb888, opacity: u8) {
        let px = self.buf[i];
        let add = |c: u8, a: u8| -> u8 {
            let v = c as u32 + (a as u32 * opacity as u32) / 255;
            v.min(255) as u8
        };
        self.buf[i] = Rgb888::new(
            add(px.r(), color.r()),
            add(px.g(), color.g()),
            add(px.b(), color.b()),
        );
    }

    /// Accumulate-blend a 2R x 2R block centered at (x, y): per channel
    /// `c' = min(255, c + color_c * opacity / 255)`. Returns false (and
    /// draws nothing) when the block would not fit entirely on-raster.
    pub fn blend_block(&mut self, x: i32, y: i32, color: Rgb888, opacity: u8) -> bool {
        if !self.block_in_bounds(x, y) {
            return false;
        }
        for y1 in (y - BLEND_RADIUS)..(y + BLEND_RADIUS) {
            let base = y1 as usize * self.w;
            for x1 in (x - BLEND_RADIUS)..(x + BLEND_RADIUS) {
                self.blend_px(base + x1 as usize, color, opacity);
            }
        }
        true
    }
}

impl OriginDimensions for Raster {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl DrawTarget for Raster {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p.x, p.y) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clear_color(color);
        Ok(())
    }

    // no fill_contiguous fast path: the trait default routes every fill
    // through draw_iter, which clips per pixel and cannot wrap rows at
    // the raster edge
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_filled_rect_clips_at_negative_origin() {
        let mut raster = Raster::new(16, 16);
        Rectangle::new(Point::new(-2, -2), Size::new(5, 5))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::WHITE))
            .draw(&mut raster)
            .ok();

        // only the on-raster overlap is painted, in place
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(raster.pixel(x, y), Some(Rgb888::WHITE));
            }
        }
        assert_eq!(raster.pixel(3, 0), Some(Rgb888::BLACK));
        assert_eq!(raster.pixel(0, 3), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_filled_rect_does_not_wrap_at_right_edge() {
        let mut raster = Raster::new(16, 16);
        Rectangle::new(Point::new(14, 5), Size::new(4, 1))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::WHITE))
            .draw(&mut raster)
            .ok();

        assert_eq!(raster.pixel(14, 5), Some(Rgb888::WHITE));
        assert_eq!(raster.pixel(15, 5), Some(Rgb888::WHITE));
        // overflow is dropped, not carried onto the next row
        assert_eq!(raster.pixel(0, 6), Some(Rgb888::BLACK));
        assert_eq!(raster.pixel(1, 6), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_blend_brightens_affected_block() {
        let mut raster = Raster::new(32, 32);
        assert!(raster.blend_block(16, 16, Rgb888::new(0, 0, 255), 64));

        for y in (16 - BLEND_RADIUS)..(16 + BLEND_RADIUS) {
            for x in (16 - BLEND_RADIUS)..(16 + BLEND_RADIUS) {
                let px = raster.pixel(x, y).unwrap();
                assert!(px.b() > 0, "pixel ({},{}) not brightened", x, y);
            }
        }
        // a pixel just outside the block stays black
        assert_eq!(raster.pixel(16 + BLEND_RADIUS, 16), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_blend_accumulates_and_saturates() {
        let mut raster = Raster::new(16, 16);
        raster.blend_block(8, 8, Rgb888::new(0, 0, 255), 64);
        let once = raster.pixel(8, 8).unwrap().b();
        raster.blend_block(8, 8, Rgb888::new(0, 0, 255), 64);
        let twice = raster.pixel(8, 8).unwrap().b();
        assert!(twice > once);

        for _ in 0..10 {
            raster.blend_block(8, 8, Rgb888::new(0, 0, 255), 255);
        }
        assert_eq!(raster.pixel(8, 8).unwrap().b(), 255);
    }

    #[test]
    fn test_partially_clipped_block_draws_nothing() {
        let mut raster = Raster::new(16, 16);
        assert!(!raster.blend_block(0, 8, Rgb888::new(255, 0, 0), 128));
        assert!(!raster.blend_block(8, 15, Rgb888::new(255, 0, 0), 128));
        assert!(!raster.blend_block(-5, -5, Rgb888::new(255, 0, 0), 128));

        assert!(raster.as_slice().iter().all(|px| *px == Rgb888::BLACK));
    }
}
