use super::{Rect, XYXY};
use crate::{common::*, Transform};

/// Bounding box in position+size (x, y, width, height) format.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XYWH<T> {
    pub(crate) x: T,
    pub(crate) y: T,
    pub(crate) w: T,
    pub(crate) h: T,
}

impl<T> XYWH<T> {
    pub fn try_cast<V>(self) -> Option<XYWH<V>>
    where
        T: ToPrimitive,
        V: NumCast,
    {
        Some(XYWH {
            x: V::from(self.x)?,
            y: V::from(self.y)?,
            w: V::from(self.w)?,
            h: V::from(self.h)?,
        })
    }

    pub fn cast<V>(self) -> XYWH<V>
    where
        T: ToPrimitive,
        V: NumCast,
    {
        self.try_cast().unwrap()
    }
}

impl<T> XYWH<T>
where
    T: Copy + Num,
{
    pub fn transform(&self, transform: &Transform<T>) -> Self {
        XYWH {
            x: transform.map_x(self.x),
            y: transform.map_y(self.y),
            w: transform.scale_w(self.w),
            h: transform.scale_h(self.h),
        }
    }

    /// Mirror about the vertical axis of a frame of the given width.
    pub fn hflip(&self, frame_w: T) -> Self {
        XYWH {
            x: frame_w - self.x - self.w,
            y: self.y,
            w: self.w,
            h: self.h,
        }
    }

    /// Mirror about the horizontal axis of a frame of the given height.
    pub fn vflip(&self, frame_h: T) -> Self {
        XYWH {
            x: self.x,
            y: frame_h - self.y - self.h,
            w: self.w,
            h: self.h,
        }
    }
}

impl<T> Rect for XYWH<T>
where
    T: Copy + Num + PartialOrd,
{
    type Type = T;

    fn xmin(&self) -> Self::Type {
        self.x
    }

    fn ymin(&self) -> Self::Type {
        self.y
    }

    fn xmax(&self) -> Self::Type {
        self.x + self.w
    }

    fn ymax(&self) -> Self::Type {
        self.y + self.h
    }

    fn h(&self) -> Self::Type {
        self.h
    }

    fn w(&self) -> Self::Type {
        self.w
    }

    fn try_from_xyxy(xyxy: [Self::Type; 4]) -> Result<Self> {
        let [xmin, ymin, xmax, ymax] = xyxy;
        let w = xmax - xmin;
        let h = ymax - ymin;
        let zero = T::zero();
        ensure!(
            w >= zero && h >= zero,
            "box width and height must be non-negative"
        );

        Ok(Self {
            x: xmin,
            y: ymin,
            w,
            h,
        })
    }

    fn try_from_xywh(xywh: [Self::Type; 4]) -> Result<Self> {
        let [x, y, w, h] = xywh;
        let zero = T::zero();
        ensure!(
            w >= zero && h >= zero,
            "box width and height must be non-negative"
        );

        Ok(Self { x, y, w, h })
    }
}

impl<T> From<XYXY<T>> for XYWH<T>
where
    T: Copy + Num,
{
    fn from(from: XYXY<T>) -> Self {
        Self::from(&from)
    }
}

impl<T> From<&XYXY<T>> for XYWH<T>
where
    T: Copy + Num,
{
    fn from(from: &XYXY<T>) -> Self {
        let XYXY {
            xmin,
            ymin,
            xmax,
            ymax,
            ..
        } = *from;
        Self {
            x: xmin,
            y: ymin,
            w: xmax - xmin,
            h: ymax - ymin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RectNum;

    #[test]
    fn position_size_corner_round_trip() {
        let cases = [
            [0.0, 0.0, 0.0, 0.0],
            [10.0, 20.0, 30.0, 40.0],
            [100.5, 200.25, 50.125, 75.0625],
            [3.0, 7.0, 0.5, 11.25],
        ];

        for xywh in cases {
            let orig = XYWH::from_xywh(xywh);
            let corner = orig.to_xyxy();
            let back = corner.to_xywh();
            assert_eq!(orig, back);
            assert_eq!(back.xywh(), xywh);
        }
    }

    #[test]
    fn position_size_flips() {
        let rect = XYWH::from_xywh([10.0, 20.0, 30.0, 40.0]);

        let hflipped = rect.hflip(100.0);
        assert_eq!(hflipped.xywh(), [60.0, 20.0, 30.0, 40.0]);
        assert_eq!(hflipped.hflip(100.0), rect);

        let vflipped = rect.vflip(100.0);
        assert_eq!(vflipped.xywh(), [10.0, 40.0, 30.0, 40.0]);
        assert_eq!(vflipped.vflip(100.0), rect);
    }
}
