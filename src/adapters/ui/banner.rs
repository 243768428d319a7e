//! ASCII banner with gradient (FLOCK).

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Deep teal (#0f766e).
const DEEP_TEAL: (u8, u8, u8) = (0x0f, 0x76, 0x6e);
/// Warm amber (#f59e0b).
const WARM_AMBER: (u8, u8, u8) = (0xf5, 0x9e, 0x0b);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Prints the welcome banner: "FLOCK" in figlet ASCII with a gradient from
/// deep teal to warm amber, then version.
pub fn print_welcome() {
    let mut out = stdout();
    let Ok(font) = FIGfont::standard() else {
        return;
    };
    let Some(figure) = font.convert("FLOCK") else {
        return;
    };
    let art = figure.to_string();
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(DEEP_TEAL, WARM_AMBER, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: WARM_AMBER.0,
        g: WARM_AMBER.1,
        b: WARM_AMBER.2,
    }));
    let _ = out.execute(Print(format!("flock-assign v{}\r\n", version)));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}
