//! Embedding raster images as PDF image XObjects.
//!
//! JPEG data is passed through untouched (`DCTDecode`) when its colour space
//! maps directly onto a PDF one. Everything else is decoded and stored as
//! Flate-compressed samples, with any alpha channel in a soft mask.

use image::codecs::jpeg::JpegDecoder;
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageFormat};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use std::io::Cursor;
use std::path::Path;

use crate::config::FitMode;
use crate::error::{PageCatError, Result};
use crate::filetype::FileKind;
use crate::merge::draw::{A4_HEIGHT, A4_WIDTH, DrawConfig};

/// An image ready to be placed on a page.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// The image XObject.
    pub xobject: Stream,
    /// Soft mask carrying the alpha channel.
    pub smask: Option<Stream>,
}

/// Decode an image of `kind` into an embeddable XObject.
///
/// Blocking; call it from `spawn_blocking`.
///
/// # Errors
///
/// Returns [`PageCatError::ImageDecode`] when the data cannot be decoded or
/// `kind` is not an image kind.
pub fn prepare_image(kind: FileKind, bytes: &[u8], origin: &Path) -> Result<EmbeddedImage> {
    match kind {
        FileKind::Jpeg => prepare_jpeg(bytes, origin),
        FileKind::Png => prepare_png(bytes, origin),
        other => Err(PageCatError::image_decode(
            origin.to_path_buf(),
            format!("{other} is not an embeddable image"),
        )),
    }
}

fn prepare_jpeg(bytes: &[u8], origin: &Path) -> Result<EmbeddedImage> {
    let decode_err =
        |err: image::ImageError| PageCatError::image_decode(origin.to_path_buf(), err.to_string());

    let decoder = JpegDecoder::new(Cursor::new(bytes)).map_err(decode_err)?;
    let (width, height) = decoder.dimensions();

    let color_space = match decoder.original_color_type() {
        ExtendedColorType::L8 => "DeviceGray",
        ExtendedColorType::Rgb8 => "DeviceRGB",
        // CMYK and friends are converted rather than passed through.
        _ => {
            let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
                .map_err(decode_err)?;
            return flate_image(&decoded);
        }
    };

    let dict = image_dictionary(width, height, color_space);
    let mut xobject = Stream::new(dict, bytes.to_vec()).with_compression(false);
    xobject.dict.set("Filter", "DCTDecode");

    Ok(EmbeddedImage {
        width,
        height,
        xobject,
        smask: None,
    })
}

fn prepare_png(bytes: &[u8], origin: &Path) -> Result<EmbeddedImage> {
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|err| PageCatError::image_decode(origin.to_path_buf(), err.to_string()))?;

    flate_image(&decoded)
}

fn flate_image(decoded: &DynamicImage) -> Result<EmbeddedImage> {
    let (width, height) = (decoded.width(), decoded.height());
    let color = decoded.color();

    let (samples, color_space) = if color.has_color() {
        (decoded.to_rgb8().into_raw(), "DeviceRGB")
    } else {
        (decoded.to_luma8().into_raw(), "DeviceGray")
    };

    let mut xobject = Stream::new(image_dictionary(width, height, color_space), samples);
    xobject.compress()?;

    let smask = if color.has_alpha() {
        let alpha: Vec<u8> = decoded.to_rgba8().pixels().map(|p| p[3]).collect();
        let mut mask = Stream::new(image_dictionary(width, height, "DeviceGray"), alpha);
        mask.compress()?;
        Some(mask)
    } else {
        None
    };

    Ok(EmbeddedImage {
        width,
        height,
        xobject,
        smask,
    })
}

fn image_dictionary(width: u32, height: u32, color_space: &str) -> Dictionary {
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => Object::Name(color_space.as_bytes().to_vec()),
        "BitsPerComponent" => 8,
    }
}

/// Add a new A4 page showing `image` to `doc`, parented to `pages_id`.
///
/// Returns the id of the page object; the caller links it into the page tree.
///
/// # Errors
///
/// Returns an error if the page content cannot be encoded.
pub fn add_image_page(
    doc: &mut Document,
    pages_id: ObjectId,
    image: EmbeddedImage,
    fit: FitMode,
) -> Result<ObjectId> {
    let draw = DrawConfig::on_a4((image.width as f32, image.height as f32), fit);

    let mut xobject = image.xobject;
    if let Some(mask) = image.smask {
        let mask_id = doc.add_object(mask);
        xobject.dict.set("SMask", mask_id);
    }
    let image_id = doc.add_object(xobject);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    draw.width.into(),
                    0.into(),
                    0.into(),
                    draw.height.into(),
                    draw.x.into(),
                    draw.y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), A4_WIDTH.into(), A4_HEIGHT.into()],
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
        "Contents" => content_id,
    });

    Ok(page_id)
}
