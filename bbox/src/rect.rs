use super::{XYWH, XYXY};
use crate::common::*;

/// The generic rectangle.
pub trait Rect {
    type Type;

    fn xmin(&self) -> Self::Type;
    fn ymin(&self) -> Self::Type;
    fn xmax(&self) -> Self::Type;
    fn ymax(&self) -> Self::Type;
    fn h(&self) -> Self::Type;
    fn w(&self) -> Self::Type;

    fn try_from_xyxy(xyxy: [Self::Type; 4]) -> Result<Self>
    where
        Self: Sized;

    fn try_from_xywh(xywh: [Self::Type; 4]) -> Result<Self>
    where
        Self: Sized;
}

pub trait RectNum: Rect
where
    Self::Type: Num + PartialOrd,
{
    fn from_xyxy(xyxy: [Self::Type; 4]) -> Self
    where
        Self: Sized,
    {
        Self::try_from_xyxy(xyxy).unwrap()
    }

    fn from_xywh(xywh: [Self::Type; 4]) -> Self
    where
        Self: Sized,
    {
        Self::try_from_xywh(xywh).unwrap()
    }

    fn xyxy(&self) -> [Self::Type; 4] {
        [self.xmin(), self.ymin(), self.xmax(), self.ymax()]
    }

    fn xywh(&self) -> [Self::Type; 4] {
        [self.xmin(), self.ymin(), self.w(), self.h()]
    }

    fn to_xyxy(&self) -> XYXY<Self::Type> {
        XYXY {
            xmin: self.xmin(),
            ymin: self.ymin(),
            xmax: self.xmax(),
            ymax: self.ymax(),
        }
    }

    fn to_xywh(&self) -> XYWH<Self::Type> {
        XYWH {
            x: self.xmin(),
            y: self.ymin(),
            w: self.w(),
            h: self.h(),
        }
    }

    fn area(&self) -> <Self::Type as Mul<Self::Type>>::Output
    where
        Self::Type: Mul<Self::Type>,
    {
        self.h() * self.w()
    }
}

impl<T> RectNum for T
where
    T: Rect,
    T::Type: Num + PartialOrd,
{
}
