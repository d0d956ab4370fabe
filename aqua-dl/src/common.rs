//! Common imports from external crates.

pub use anyhow::{bail, ensure, format_err, Context, Result};
pub use bbox::{prelude::*, XYWH, XYWH_, XYXY, XYXY_};
pub use chrono::Local;
pub use image::{imageops, imageops::FilterType, Rgb, RgbImage};
pub use indexmap::{IndexMap, IndexSet};
pub use itertools::{izip, Itertools};
pub use log::{debug, error, info, warn};
pub use ndarray::Array3;
pub use noisy_float::prelude::*;
pub use once_cell::sync::Lazy;
pub use rand::{prelude::*, rngs::StdRng};
pub use semver::{Version, VersionReq};
pub use serde::{
    de::Error as DeserializeError, Deserialize, Deserializer, Serialize, Serializer,
};
pub use std::{
    borrow::Borrow,
    cmp,
    collections::{HashMap, HashSet},
    fmt,
    fmt::Debug,
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
    thread,
    time::Instant,
};
