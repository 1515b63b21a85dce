use std::{path::Path, time::Duration};

use image::{
    codecs::{gif::GifDecoder, webp::WebPDecoder},
    error::{ParameterError, ParameterErrorKind},
    imageops::{self, FilterType},
    AnimationDecoder, DynamicImage, Frames, ImageFormat, ImageReader, RgbaImage,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::{DEFAULT_FRAME_DELAY, FRAME_SIZE};

/// Why an image could not be turned into a [`FrameSequence`].
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file does not exist or cannot be read.
    #[error("cannot read image file")]
    Path(#[source] std::io::Error),
    /// The file exists but is not a decodable image.
    #[error("cannot decode image")]
    Decode(#[source] image::ImageError),
}

/// All frames of an image, decoded once at startup and resized to
/// [`FRAME_SIZE`]², together with the single playback delay shared by
/// every frame.
///
/// Static images yield a sequence of length one. The sequence is never
/// empty and is immutable after loading.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    frames: Vec<RgbaImage>,
    delay: Duration,
}

impl FrameSequence {
    /// Decodes the image at `path` into a prepared frame sequence.
    ///
    /// Animated GIF and WebP sources contribute every embedded frame; the
    /// first frame's delay becomes the global playback delay. All other
    /// formats decode to a single frame with the default delay.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Path`] if the file cannot be opened or read and
    /// [`LoadError::Decode`] if its contents are not a decodable image.
    #[tracing::instrument(level = "debug")]
    pub fn load<P>(path: P) -> Result<Self, LoadError>
    where
        P: AsRef<Path> + std::fmt::Debug,
    {
        let reader = ImageReader::open(&path)
            .map_err(LoadError::Path)?
            .with_guessed_format()
            .map_err(LoadError::Path)?;

        let sequence = match reader.format() {
            Some(ImageFormat::Gif) => {
                let decoder = GifDecoder::new(reader.into_inner()).map_err(LoadError::Decode)?;
                Self::from_animation(decoder.into_frames())?
            }
            Some(ImageFormat::WebP) => {
                let decoder = WebPDecoder::new(reader.into_inner()).map_err(LoadError::Decode)?;
                if decoder.has_animation() {
                    Self::from_animation(decoder.into_frames())?
                } else {
                    let still = DynamicImage::from_decoder(decoder).map_err(LoadError::Decode)?;
                    Self::from_still(&still)
                }
            }
            _ => {
                let still = reader.decode().map_err(LoadError::Decode)?;
                Self::from_still(&still)
            }
        };

        info!(
            "Loaded {} frame(s) with a delay of {:?}",
            sequence.len(),
            sequence.delay()
        );
        Ok(sequence)
    }

    #[tracing::instrument(level = "trace", skip(frames))]
    fn from_animation(frames: Frames<'_>) -> Result<Self, LoadError> {
        let mut delay = None;
        let mut resized = Vec::new();
        for frame in frames {
            let frame = frame.map_err(LoadError::Decode)?;
            delay.get_or_insert_with(|| Duration::from(frame.delay()));
            resized.push(resize_to_target(&frame.into_buffer()));
        }
        debug!("Decoded {} animation frame(s)", resized.len());

        if resized.is_empty() {
            return Err(LoadError::Decode(image::ImageError::Parameter(
                ParameterError::from_kind(ParameterErrorKind::Generic(
                    "animation contains no frames".to_string(),
                )),
            )));
        }

        // A zero delay means the source carried no usable timing metadata.
        let delay = match delay {
            Some(delay) if !delay.is_zero() => delay,
            _ => DEFAULT_FRAME_DELAY,
        };

        Ok(Self {
            frames: resized,
            delay,
        })
    }

    #[tracing::instrument(level = "trace", skip(still))]
    fn from_still(still: &DynamicImage) -> Self {
        Self {
            frames: vec![resize_to_target(&still.to_rgba8())],
            delay: DEFAULT_FRAME_DELAY,
        }
    }

    /// Number of frames. Always at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`; present to satisfy the usual `len`/`is_empty` pairing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The single playback delay shared by all frames.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// The frame at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`Self::len`].
    #[must_use]
    pub fn frame(&self, index: usize) -> &RgbaImage {
        &self.frames[index]
    }

    #[cfg(test)]
    pub(crate) fn from_parts(frames: Vec<RgbaImage>, delay: Duration) -> Self {
        assert!(!frames.is_empty());
        Self { frames, delay }
    }
}

fn resize_to_target(frame: &RgbaImage) -> RgbaImage {
    imageops::resize(frame, FRAME_SIZE, FRAME_SIZE, FilterType::Nearest)
}
