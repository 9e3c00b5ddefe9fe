//! Test fixtures shared by the integration tests

#![allow(dead_code)]

use image::{DynamicImage, GrayImage, Luma};

pub const CODE: &str = "4006381333931";

const L_CODES: [&str; 10] = [
    "0001101", "0011001", "0010011", "0111101", "0100011", "0110001", "0101111", "0111011",
    "0110111", "0001011",
];

const PARITY: [&str; 10] = [
    "LLLLLL", "LLGLGG", "LLGGLG", "LLGGGL", "LGLLGG", "LGGLLG", "LGGGLL", "LGLGLG", "LGLGGL",
    "LGGLGL",
];

fn r_code(digit: usize) -> String {
    L_CODES[digit]
        .chars()
        .map(|c| if c == '0' { '1' } else { '0' })
        .collect()
}

fn g_code(digit: usize) -> String {
    r_code(digit).chars().rev().collect()
}

/// Module pattern for a 13-digit EAN code (95 modules, 1 = bar)
fn ean13_modules(code: &str) -> String {
    let digits: Vec<usize> = code
        .chars()
        .map(|c| c.to_digit(10).unwrap() as usize)
        .collect();
    let parity = PARITY[digits[0]];

    let mut modules = String::from("101");
    for (digit, kind) in digits[1..7].iter().zip(parity.chars()) {
        match kind {
            'L' => modules.push_str(L_CODES[*digit]),
            _ => modules.push_str(&g_code(*digit)),
        }
    }
    modules.push_str("01010");
    for digit in &digits[7..] {
        modules.push_str(&r_code(*digit));
    }
    modules.push_str("101");
    modules
}

pub fn render_ean13(code: &str) -> DynamicImage {
    const MODULE_PX: u32 = 3;
    const QUIET_MODULES: u32 = 12;
    const HEIGHT: u32 = 80;

    let modules = ean13_modules(code);
    assert_eq!(modules.len(), 95);
    let width = (modules.len() as u32 + 2 * QUIET_MODULES) * MODULE_PX;

    let mut img = GrayImage::from_pixel(width, HEIGHT, Luma([255]));
    for (i, module) in modules.chars().enumerate() {
        if module != '1' {
            continue;
        }
        let x0 = (QUIET_MODULES + i as u32) * MODULE_PX;
        for x in x0..x0 + MODULE_PX {
            for y in 0..HEIGHT {
                img.put_pixel(x, y, Luma([0]));
            }
        }
    }
    DynamicImage::ImageLuma8(img)
}

/// A white image with nothing to decode
pub fn blank() -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(120, 80, Luma([255])))
}

