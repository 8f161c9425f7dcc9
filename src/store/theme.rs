use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }
}

/// A missing file means the default; a file that exists but cannot be
/// read or parsed is an error the caller can surface before degrading.
pub fn load_theme(path: &Path) -> Result<Theme> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Theme::default()),
        Err(err) => {
            return Err(anyhow::Error::new(err)
                .context(format!("read theme file {}", path.display())))
        }
    };
    Theme::parse(&content)
        .ok_or_else(|| anyhow::anyhow!("unrecognized theme {:?}", content.trim()))
}

pub fn save_theme(path: &Path, theme: Theme) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create data dir {}", parent.display()))?;
    }
    fs::write(path, theme.label())
        .with_context(|| format!("write theme file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_between_themes() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }

    #[test]
    fn roundtrips_through_file() {
        let dir = std::env::temp_dir().join("verox-theme-test");
        let path = dir.join("theme");
        save_theme(&path, Theme::Light).unwrap();
        assert_eq!(load_theme(&path).unwrap(), Theme::Light);
        save_theme(&path, Theme::Dark).unwrap();
        assert_eq!(load_theme(&path).unwrap(), Theme::Dark);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_the_default() {
        let theme = load_theme(Path::new("/nonexistent/verox/theme")).unwrap();
        assert_eq!(theme, Theme::Dark);
    }

    #[test]
    fn garbage_file_is_an_error() {
        let dir = std::env::temp_dir().join("verox-theme-garbage");
        let path = dir.join("theme");
        let _ = fs::create_dir_all(&dir);
        fs::write(&path, "solarized").unwrap();
        let err = load_theme(&path).unwrap_err();
        assert!(err.to_string().contains("solarized"));
        let _ = fs::remove_dir_all(&dir);
    }
}
