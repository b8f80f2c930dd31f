//! Terminal output formatting.

use colored::{ColoredString, Colorize};
use genzfact_core::{AnalysisReport, Badge, BadgeFormatter};

/// Print an analysis report with coloured badges.
pub fn print_report(report: &AnalysisReport, formatter: &BadgeFormatter) {
    println!();
    println!("{}", "─".repeat(60).dimmed());
    println!("{}", "Analysis Report".cyan().bold());
    println!();
    println!("{}", colorize_badges(&report.raw_text, formatter));
    println!();
    println!(
        "{}",
        format!("{} badge(s) · {} ms", report.badges.len(), report.elapsed_ms).dimmed()
    );
}

/// Replace each `Badge: <word>` with a coloured label.
pub fn colorize_badges(text: &str, formatter: &BadgeFormatter) -> String {
    formatter
        .replace_with(text, |badge| {
            format!("Badge: {}", badge_label(badge, formatter.palette().color(badge)))
        })
        .text
}

/// Badge label on its palette colour, or a named colour when the palette
/// entry is not a `#RRGGBB` value.
pub fn badge_label(badge: Badge, hex: &str) -> ColoredString {
    let label = format!(" {} ", badge.label()).bold();
    let fg = |s: ColoredString| match badge {
        Badge::Mislead => s.black(),
        _ => s.white(),
    };

    match parse_hex(hex) {
        Some((r, g, b)) => fg(label.on_truecolor(r, g, b)),
        None => match badge {
            Badge::True => label.on_green().white(),
            Badge::False => label.on_red().white(),
            Badge::Mislead => label.on_yellow().black(),
            Badge::Unverified => label.on_blue().white(),
        },
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
