use super::{XYWH, XYXY};
use crate::common::*;

/// An axis-aligned scale-then-shift mapping between two pixel frames.
///
/// A point maps as `(x, y) -> (x * sx + tx, y * sy + ty)`. Boxes map corner
/// by corner, so axis alignment is preserved and the position+size and
/// corner forms transform consistently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transform<T> {
    sx: T,
    sy: T,
    tx: T,
    ty: T,
}

impl<T> Transform<T>
where
    T: Copy + Num,
{
    pub fn identity() -> Self {
        Self {
            sx: T::one(),
            sy: T::one(),
            tx: T::zero(),
            ty: T::zero(),
        }
    }

    pub(crate) fn map_x(&self, x: T) -> T {
        x * self.sx + self.tx
    }

    pub(crate) fn map_y(&self, y: T) -> T {
        y * self.sy + self.ty
    }

    pub(crate) fn scale_w(&self, w: T) -> T {
        w * self.sx
    }

    pub(crate) fn scale_h(&self, h: T) -> T {
        h * self.sy
    }

    /// Undoes this mapping. Exact for scalar types with exact division.
    pub fn inverse(&self) -> Self {
        let sx = T::one() / self.sx;
        let sy = T::one() / self.sy;
        Self {
            sx,
            sy,
            tx: T::zero() - self.tx * sx,
            ty: T::zero() - self.ty * sy,
        }
    }
}

impl<T> Transform<T>
where
    T: Copy + Num + PartialOrd,
{
    /// The mapping induced by resizing a `[height, width]` frame to another,
    /// both anchored at the origin.
    pub fn from_resize(src_hw: [T; 2], tgt_hw: [T; 2]) -> Result<Self> {
        let [src_h, src_w] = src_hw;
        let [tgt_h, tgt_w] = tgt_hw;
        let zero = T::zero();
        ensure!(
            src_h > zero && src_w > zero,
            "the source frame must have positive extents"
        );
        ensure!(
            tgt_h >= zero && tgt_w >= zero,
            "the target frame must have non-negative extents"
        );

        Ok(Self {
            sx: tgt_w / src_w,
            sy: tgt_h / src_h,
            tx: zero,
            ty: zero,
        })
    }
}

impl<T> Transform<T> {
    pub fn try_cast<V>(self) -> Option<Transform<V>>
    where
        T: ToPrimitive,
        V: NumCast,
    {
        Some(Transform {
            sx: V::from(self.sx)?,
            sy: V::from(self.sy)?,
            tx: V::from(self.tx)?,
            ty: V::from(self.ty)?,
        })
    }

    pub fn cast<V>(self) -> Transform<V>
    where
        T: ToPrimitive,
        V: NumCast,
    {
        self.try_cast().unwrap()
    }
}

impl<T> Mul<&XYXY<T>> for &Transform<T>
where
    T: Copy + Num,
{
    type Output = XYXY<T>;

    fn mul(self, rhs: &XYXY<T>) -> Self::Output {
        rhs.transform(self)
    }
}

impl<T> Mul<&XYWH<T>> for &Transform<T>
where
    T: Copy + Num,
{
    type Output = XYWH<T>;

    fn mul(self, rhs: &XYWH<T>) -> Self::Output {
        rhs.transform(self)
    }
}

/// Composition: `(lhs * rhs)` applies `rhs` first.
impl<T> Mul<&Transform<T>> for &Transform<T>
where
    T: Copy + Num,
{
    type Output = Transform<T>;

    fn mul(self, rhs: &Transform<T>) -> Self::Output {
        Transform {
            sx: self.sx * rhs.sx,
            sy: self.sy * rhs.sy,
            tx: self.map_x(rhs.tx),
            ty: self.map_y(rhs.ty),
        }
    }
}
