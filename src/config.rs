use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use cross_xdg::BaseDirs;
use nu_ansi_term::Color;

const THEME_FILE: &str = "labtest.toml";

/// Colors used for report lines. Overridable from the `[colors]` table of
/// `labtest.toml` in the XDG config home.
#[derive(Debug, Clone, PartialEq)]
pub struct Colors {
    pub pass: Color,
    pub fail: Color,
    pub header: Color,

    // summary columns
    pub passed: Color,
    pub failed: Color,
    pub total: Color,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            pass: Color::Green,
            fail: Color::Red,
            header: Color::Yellow,
            passed: Color::Green,
            failed: Color::Red,
            total: Color::Cyan,
        }
    }
}

impl Colors {
    /// Slot for a `[colors]` key, or `None` for keys this tool doesn't use.
    fn slot(&mut self, key: &str) -> Option<&mut Color> {
        Some(match key {
            "pass" => &mut self.pass,
            "fail" => &mut self.fail,
            "header" => &mut self.header,
            "passed" => &mut self.passed,
            "failed" => &mut self.failed,
            "total" => &mut self.total,
            _ => return None,
        })
    }
}

const NAMED: &[(&str, Color)] = &[
    ("black", Color::Black),
    ("red", Color::Red),
    ("green", Color::Green),
    ("yellow", Color::Yellow),
    ("blue", Color::Blue),
    ("magenta", Color::Purple),
    ("purple", Color::Purple),
    ("cyan", Color::Cyan),
    ("white", Color::White),
    ("gray", Color::DarkGray),
    ("grey", Color::DarkGray),
    ("lightred", Color::LightRed),
    ("lightgreen", Color::LightGreen),
    ("lightyellow", Color::LightYellow),
    ("lightblue", Color::LightBlue),
    ("lightcyan", Color::LightCyan),
];

static THEME: OnceLock<Colors> = OnceLock::new();

/// The report theme, read from disk on first use.
pub fn colors() -> &'static Colors {
    THEME.get_or_init(|| {
        theme_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .map(|text| theme_from_str(&text))
            .unwrap_or_default()
    })
}

fn theme_path() -> Option<PathBuf> {
    let dirs = BaseDirs::new().ok()?;
    let path = PathBuf::from(dirs.config_home()).join(THEME_FILE);
    tracing::debug!(path = %path.display(), "looking for theme");
    Some(path)
}

/// `#rrggbb`, or a color name; `light_blue` and `LightBlue` both work.
fn color_value(raw: &str) -> Option<Color> {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix('#') {
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let rgb = u32::from_str_radix(hex, 16).ok()?;
        let [_, r, g, b] = rgb.to_be_bytes();
        return Some(Color::Rgb(r, g, b));
    }

    let name: String = raw
        .chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    NAMED.iter().find(|(n, _)| *n == name).map(|(_, c)| *c)
}

/// Apply the `[colors]` table of a theme file over the defaults. The format is
/// a TOML subset: section headers, `#` comments and `key = value` lines with
/// optionally quoted values. Anything unrecognized is skipped.
fn theme_from_str(text: &str) -> Colors {
    let mut theme = Colors::default();
    let mut section = String::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = name.trim().to_string();
            continue;
        }
        if section != "colors" {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"');
        match (theme.slot(key.trim()), color_value(value)) {
            (Some(slot), Some(color)) => *slot = color,
            _ => tracing::debug!(key = key.trim(), value, "ignoring theme entry"),
        }
    }

    theme
}
