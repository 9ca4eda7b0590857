use std::io::Cursor;

use super::*;

fn encode_png(img: image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_keeps_straight_alpha_and_bytes() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100, 50, 200, 128]).unwrap();
    let png = encode_png(img);

    let src = SourceImage::decode(png.clone()).unwrap();
    assert_eq!((src.width(), src.height()), (1, 1));
    assert_eq!(src.rgba().as_raw().as_slice(), &[100, 50, 200, 128]);
    assert_eq!(src.encoded(), png.as_slice());
}

#[test]
fn decode_garbage_is_a_decode_error() {
    let err = SourceImage::decode(b"definitely not an image".to_vec()).unwrap_err();
    assert!(matches!(err, SampleError::Decode(_)));
}

#[test]
fn from_rgba_rejects_empty_buffers() {
    let err = SourceImage::from_rgba(image::RgbaImage::new(0, 4)).unwrap_err();
    assert!(matches!(err, SampleError::NoPixels));
}

#[test]
fn premultiply_then_unpremultiply_is_close() {
    let mut px = vec![100u8, 50, 200, 128, 9, 9, 9, 0, 1, 2, 3, 255];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(
        &px[..4],
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128
        ]
    );
    assert_eq!(&px[4..8], &[0, 0, 0, 0]);
    assert_eq!(&px[8..], &[1, 2, 3, 255]);

    unpremultiply_rgba8_in_place(&mut px);
    for (got, want) in px[..3].iter().zip([100u8, 50, 200]) {
        assert!(got.abs_diff(want) <= 1, "{got} vs {want}");
    }
}
