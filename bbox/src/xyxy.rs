use super::{Rect, XYWH};
use crate::{common::*, Transform};

/// Bounding box in corner (xmin, ymin, xmax, ymax) format.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XYXY<T> {
    pub(crate) xmin: T,
    pub(crate) ymin: T,
    pub(crate) xmax: T,
    pub(crate) ymax: T,
}

impl<T> XYXY<T> {
    pub fn try_cast<V>(self) -> Option<XYXY<V>>
    where
        T: ToPrimitive,
        V: NumCast,
    {
        Some(XYXY {
            xmin: V::from(self.xmin)?,
            ymin: V::from(self.ymin)?,
            xmax: V::from(self.xmax)?,
            ymax: V::from(self.ymax)?,
        })
    }

    pub fn cast<V>(self) -> XYXY<V>
    where
        T: ToPrimitive,
        V: NumCast,
    {
        self.try_cast().unwrap()
    }
}

impl<T> XYXY<T>
where
    T: Copy + Num,
{
    pub fn transform(&self, transform: &Transform<T>) -> Self {
        XYXY {
            xmin: transform.map_x(self.xmin),
            ymin: transform.map_y(self.ymin),
            xmax: transform.map_x(self.xmax),
            ymax: transform.map_y(self.ymax),
        }
    }
}

impl<T> Rect for XYXY<T>
where
    T: Copy + Num + PartialOrd,
{
    type Type = T;

    fn xmin(&self) -> Self::Type {
        self.xmin
    }

    fn ymin(&self) -> Self::Type {
        self.ymin
    }

    fn xmax(&self) -> Self::Type {
        self.xmax
    }

    fn ymax(&self) -> Self::Type {
        self.ymax
    }

    fn h(&self) -> Self::Type {
        self.ymax - self.ymin
    }

    fn w(&self) -> Self::Type {
        self.xmax - self.xmin
    }

    fn try_from_xyxy(xyxy: [Self::Type; 4]) -> Result<Self> {
        let [xmin, ymin, xmax, ymax] = xyxy;
        ensure!(
            xmax >= xmin && ymax >= ymin,
            "xmax >= xmin and ymax >= ymin must hold"
        );

        Ok(Self {
            xmin,
            ymin,
            xmax,
            ymax,
        })
    }

    fn try_from_xywh(xywh: [Self::Type; 4]) -> Result<Self> {
        let [x, y, w, h] = xywh;
        let xmax = x + w;
        let ymax = y + h;
        Self::try_from_xyxy([x, y, xmax, ymax])
    }
}

impl<T> From<XYWH<T>> for XYXY<T>
where
    T: Copy + Num,
{
    fn from(from: XYWH<T>) -> Self {
        Self::from(&from)
    }
}

impl<T> From<&XYWH<T>> for XYXY<T>
where
    T: Copy + Num,
{
    fn from(from: &XYWH<T>) -> Self {
        let XYWH { x, y, w, h, .. } = *from;
        Self {
            xmin: x,
            ymin: y,
            xmax: x + w,
            ymax: y + h,
        }
    }
}
