use crate::{common::*, rect::Rect, XYWH};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XYWH_<T> {
    pub x: T,
    pub y: T,
    pub w: T,
    pub h: T,
}

impl<T> TryFrom<XYWH_<T>> for XYWH<T>
where
    T: Copy + Num + PartialOrd,
{
    type Error = anyhow::Error;

    fn try_from(from: XYWH_<T>) -> Result<Self, Self::Error> {
        Self::try_from(&from)
    }
}

impl<T> TryFrom<&XYWH_<T>> for XYWH<T>
where
    T: Copy + Num + PartialOrd,
{
    type Error = anyhow::Error;

    fn try_from(from: &XYWH_<T>) -> Result<Self, Self::Error> {
        let XYWH_ { x, y, w, h } = *from;
        Self::try_from_xywh([x, y, w, h])
    }
}
