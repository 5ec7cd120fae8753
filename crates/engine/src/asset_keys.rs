use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetKeyError {
    #[error("asset key must not be empty")]
    Empty,
    #[error("asset key '{key}' must be relative")]
    Absolute { key: String },
    #[error("asset key '{key}' must use '/' separators")]
    Backslash { key: String },
    #[error("asset key '{key}' must not step outside the asset root")]
    ParentTraversal { key: String },
    #[error(
        "asset key '{key}' contains '{character}'; use lowercase letters, digits, '_', '-' or '/'"
    )]
    InvalidCharacter { key: String, character: char },
}

/// Keys name files under `assets/` without extension, e.g. `player/up` or
/// `tiles/library`. They are joined onto the asset root, so anything that
/// could escape it is rejected.
pub fn validate_asset_key(key: &str) -> Result<(), AssetKeyError> {
    if key.is_empty() {
        return Err(AssetKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(AssetKeyError::Absolute {
            key: key.to_string(),
        });
    }
    if key.contains('\\') {
        return Err(AssetKeyError::Backslash {
            key: key.to_string(),
        });
    }
    if key.split('/').any(|segment| segment == ".." || segment.is_empty()) {
        return Err(AssetKeyError::ParentTraversal {
            key: key.to_string(),
        });
    }
    let allowed = |ch: &char| {
        ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '-' | '/')
    };
    if let Some(character) = key.chars().find(|ch| !allowed(ch)) {
        return Err(AssetKeyError::InvalidCharacter {
            key: key.to_string(),
            character,
        });
    }
    Ok(())
}

/// Derives a key from a file name found in map data: `Library Tiles.png`
/// becomes `{prefix}/library_tiles`.
pub fn key_from_file_stem(prefix: &str, file_name: &str) -> Option<String> {
    let stem = std::path::Path::new(file_name).file_stem()?.to_str()?;
    let normalized: String = stem
        .chars()
        .map(|ch| match ch {
            ' ' | '.' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect();
    let key = format!("{prefix}/{normalized}");
    validate_asset_key(&key).ok().map(|_| key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_nested_lowercase_keys() {
        for key in ["player/up", "tiles/library_floor", "ui/button-1"] {
            assert!(validate_asset_key(key).is_ok(), "key={key}");
        }
    }

    #[test]
    fn rejects_keys_that_escape_or_use_odd_characters() {
        for key in ["", "/abs", "a/../b", "..", r"a\b", "Player", "a.png", "a//b"] {
            assert!(validate_asset_key(key).is_err(), "key={key}");
        }
    }

    #[test]
    fn file_stems_become_prefixed_keys() {
        assert_eq!(
            key_from_file_stem("tiles", "../images/Library Tiles.png").as_deref(),
            Some("tiles/library_tiles")
        );
        assert_eq!(key_from_file_stem("tiles", "weird#name.png"), None);
    }
}
