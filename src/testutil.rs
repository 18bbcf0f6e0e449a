use std::path::Path;

pub fn gradient_rgb(width: u32, height: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            data.push(((x * 255) / width.max(1)) as u8);
            data.push(((y * 255) / height.max(1)) as u8);
            data.push((((x + y) * 127) / (width + height).max(1)) as u8);
        }
    }
    data
}

pub fn webp_lossless_rgb(rgb: &[u8], width: u32, height: u32) -> Vec<u8> {
    assert_eq!(rgb.len(), (width * height * 3) as usize);
    let mut output: *mut u8 = std::ptr::null_mut();
    let size = unsafe {
        libwebp_sys::WebPEncodeLosslessRGB(
            rgb.as_ptr(),
            width as i32,
            height as i32,
            (width * 3) as i32,
            &mut output,
        )
    };
    take_output(output, size)
}

pub fn webp_lossless_rgba(rgba: &[u8], width: u32, height: u32) -> Vec<u8> {
    assert_eq!(rgba.len(), (width * height * 4) as usize);
    let mut output: *mut u8 = std::ptr::null_mut();
    let size = unsafe {
        libwebp_sys::WebPEncodeLosslessRGBA(
            rgba.as_ptr(),
            width as i32,
            height as i32,
            (width * 4) as i32,
            &mut output,
        )
    };
    take_output(output, size)
}

fn take_output(output: *mut u8, size: usize) -> Vec<u8> {
    assert!(size > 0 && !output.is_null(), "libwebp encode failed");
    unsafe {
        let vec = std::slice::from_raw_parts(output, size).to_vec();
        libwebp_sys::WebPFree(output as *mut _);
        vec
    }
}

/// Grava um WebP opaco 4x4 em `path`.
pub fn write_webp(path: &Path) {
    let webp = webp_lossless_rgb(&gradient_rgb(4, 4), 4, 4);
    std::fs::write(path, webp).unwrap();
}
