//! Object-fit placement of images inside element boxes.
//!
//! Placement is computed as an explicit source rectangle (in image pixels)
//! mapped onto a destination rectangle (in template pixels).

use stayframe_core::{ObjectFit, Rect};

/// Source crop and destination box for one image draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Region of the image to sample, in image pixels.
    pub source: Rect,
    /// Where that region lands, in template pixels.
    pub dest: Rect,
}

impl Placement {
    /// Transform mapping image pixels into template space so that
    /// `source` lands on `dest`.
    #[must_use]
    pub fn image_transform(&self) -> tiny_skia::Transform {
        let sx = self.dest.width / self.source.width;
        let sy = self.dest.height / self.source.height;
        tiny_skia::Transform::from_row(
            sx,
            0.0,
            0.0,
            sy,
            self.dest.x - self.source.x * sx,
            self.dest.y - self.source.y * sy,
        )
    }
}

/// Place an `image_width` x `image_height` image into `dest`.
///
/// `cover` center-crops the longer axis of the image so it fills `dest`;
/// `contain` shrinks the destination to the image aspect and centers it;
/// every other mode stretches the whole image over `dest`.
///
/// Returns `None` when either box is empty.
#[must_use]
pub fn place(fit: ObjectFit, image_width: f32, image_height: f32, dest: Rect) -> Option<Placement> {
    if !(image_width > 0.0 && image_height > 0.0 && dest.is_positive()) {
        return None;
    }
    let full = Rect::new(0.0, 0.0, image_width, image_height);
    let image_ratio = image_width / image_height;
    let dest_ratio = dest.width / dest.height;

    let placement = match fit {
        ObjectFit::Cover => {
            let source = if image_ratio > dest_ratio {
                let width = image_height * dest_ratio;
                Rect::new((image_width - width) / 2.0, 0.0, width, image_height)
            } else {
                let height = image_width / dest_ratio;
                Rect::new(0.0, (image_height - height) / 2.0, image_width, height)
            };
            Placement { source, dest }
        }
        ObjectFit::Contain => {
            let boxed = if image_ratio > dest_ratio {
                let height = dest.width / image_ratio;
                Rect::new(
                    dest.x,
                    dest.y + (dest.height - height) / 2.0,
                    dest.width,
                    height,
                )
            } else {
                let width = dest.height * image_ratio;
                Rect::new(
                    dest.x + (dest.width - width) / 2.0,
                    dest.y,
                    width,
                    dest.height,
                )
            };
            Placement {
                source: full,
                dest: boxed,
            }
        }
        ObjectFit::Fill | ObjectFit::None | ObjectFit::ScaleDown => Placement {
            source: full,
            dest,
        },
    };
    Some(placement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_cover_crops_wide_image() {
        let p = place(ObjectFit::Cover, 400.0, 100.0, Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        assert!(approx(p.source.x, 150.0));
        assert!(approx(p.source.width, 100.0));
        assert!(approx(p.source.height, 100.0));
        assert_eq!(p.dest, Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_cover_crops_tall_image() {
        let p = place(ObjectFit::Cover, 100.0, 300.0, Rect::new(10.0, 10.0, 200.0, 100.0)).unwrap();
        assert!(approx(p.source.width, 100.0));
        assert!(approx(p.source.height, 50.0));
        assert!(approx(p.source.y, 125.0));
    }

    #[test]
    fn test_contain_letterboxes() {
        let p = place(ObjectFit::Contain, 200.0, 100.0, Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        assert!(approx(p.dest.height, 50.0));
        assert!(approx(p.dest.y, 25.0));
        let p = place(ObjectFit::Contain, 100.0, 200.0, Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        assert!(approx(p.dest.width, 50.0));
        assert!(approx(p.dest.x, 25.0));
    }

    #[test]
    fn test_other_modes_stretch() {
        let dest = Rect::new(5.0, 5.0, 30.0, 90.0);
        for fit in [ObjectFit::Fill, ObjectFit::None, ObjectFit::ScaleDown] {
            let p = place(fit, 64.0, 64.0, dest).unwrap();
            assert_eq!(p.dest, dest);
            assert_eq!(p.source, Rect::new(0.0, 0.0, 64.0, 64.0));
        }
    }

    #[test]
    fn test_empty_boxes() {
        assert!(place(ObjectFit::Cover, 0.0, 10.0, Rect::new(0.0, 0.0, 1.0, 1.0)).is_none());
        assert!(place(ObjectFit::Cover, 10.0, 10.0, Rect::new(0.0, 0.0, 0.0, 1.0)).is_none());
    }

    #[test]
    fn test_transform_maps_source_onto_dest() {
        let p = place(ObjectFit::Cover, 400.0, 100.0, Rect::new(20.0, 30.0, 100.0, 100.0)).unwrap();
        let mut corners = [
            tiny_skia::Point::from_xy(p.source.x, p.source.y),
            tiny_skia::Point::from_xy(p.source.right(), p.source.bottom()),
        ];
        p.image_transform().map_points(&mut corners);
        assert!(approx(corners[0].x, 20.0) && approx(corners[0].y, 30.0));
        assert!(approx(corners[1].x, 120.0) && approx(corners[1].y, 130.0));
    }

    proptest! {
        #[test]
        fn prop_cover_fills_and_stays_inside_image(
            iw in 1.0f32..4000.0,
            ih in 1.0f32..4000.0,
            dw in 1.0f32..2000.0,
            dh in 1.0f32..2000.0,
        ) {
            let dest = Rect::new(0.0, 0.0, dw, dh);
            let p = place(ObjectFit::Cover, iw, ih, dest).unwrap();
            prop_assert_eq!(p.dest, dest);
            prop_assert!(p.source.x >= -1e-2 && p.source.y >= -1e-2);
            prop_assert!(p.source.right() <= iw * 1.0001 + 1e-2);
            prop_assert!(p.source.bottom() <= ih * 1.0001 + 1e-2);
            // Only one axis is cropped.
            prop_assert!(
                (p.source.width - iw).abs() < iw * 1e-3 + 1e-3
                    || (p.source.height - ih).abs() < ih * 1e-3 + 1e-3
            );
        }
    }
}
