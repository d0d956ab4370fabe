use crate::{common::*, dataset::Detection};
use imageproc::{
    drawing::{draw_hollow_rect_mut, draw_text_mut},
    rect::Rect as PixelRect,
};
use rusttype::{Font, Scale};

const TEXT_SCALE: f32 = 16.0;

/// Initializer of [BoxPainter].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoxPainterInit {
    /// A truetype font file for label text. Without one, boxes are drawn
    /// bare.
    pub font_file: Option<PathBuf>,
    /// Stroke and text color. RGB green when unset.
    pub color: Option<[u8; 3]>,
}

impl BoxPainterInit {
    pub fn build(self) -> Result<BoxPainter> {
        let Self { font_file, color } = self;

        let font = match font_file {
            Some(path) => {
                let data = fs::read(&path)
                    .with_context(|| format!("cannot read font file '{}'", path.display()))?;
                let font = Font::try_from_vec(data).ok_or_else(|| {
                    format_err!("font file '{}' is not a usable truetype font", path.display())
                })?;
                Some(font)
            }
            None => None,
        };
        if font.is_none() {
            warn!("no font configured, detections are painted without label text");
        }

        Ok(BoxPainter {
            font,
            color: Rgb(color.unwrap_or([0, 255, 0])),
        })
    }
}

/// Draws detection boxes and category names onto a frame in place.
pub struct BoxPainter {
    font: Option<Font<'static>>,
    color: Rgb<u8>,
}

impl BoxPainter {
    /// Paints every detection entry. The category name is written above the
    /// box's top-left corner, clamped to the canvas.
    pub fn paint(
        &self,
        image: &mut RgbImage,
        detection: &Detection,
        names: &IndexMap<u64, String>,
    ) -> Result<()> {
        for (rect, &label) in izip!(&detection.boxes, &detection.labels) {
            let corner: XYXY<i32> = rect.clone().try_cast().ok_or_else(|| {
                format_err!("box {:?} does not fit into pixel coordinates", rect)
            })?;
            let [xmin, ymin, xmax, ymax] = corner.xyxy();
            let w = (xmax - xmin).max(1) as u32;
            let h = (ymax - ymin).max(1) as u32;

            draw_hollow_rect_mut(image, PixelRect::at(xmin, ymin).of_size(w, h), self.color);

            if let Some(font) = &self.font {
                let text = names
                    .get(&label)
                    .cloned()
                    .unwrap_or_else(|| label.to_string());
                let x = xmin.max(0);
                let y = (ymin - TEXT_SCALE as i32).max(0);
                draw_text_mut(
                    image,
                    self.color,
                    x,
                    y,
                    Scale::uniform(TEXT_SCALE),
                    font,
                    &text,
                );
            }
        }

        Ok(())
    }
}
