use crate::{common::*, rect::Rect, XYXY};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XYXY_<T> {
    pub xmin: T,
    pub ymin: T,
    pub xmax: T,
    pub ymax: T,
}

impl<T> TryFrom<XYXY_<T>> for XYXY<T>
where
    T: Copy + Num + PartialOrd,
{
    type Error = anyhow::Error;

    fn try_from(from: XYXY_<T>) -> Result<Self, Self::Error> {
        Self::try_from(&from)
    }
}

impl<T> TryFrom<&XYXY_<T>> for XYXY<T>
where
    T: Copy + Num + PartialOrd,
{
    type Error = anyhow::Error;

    fn try_from(from: &XYXY_<T>) -> Result<Self, Self::Error> {
        let XYXY_ {
            xmin,
            ymin,
            xmax,
            ymax,
        } = *from;
        Self::try_from_xyxy([xmin, ymin, xmax, ymax])
    }
}
