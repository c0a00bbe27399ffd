/// How the configured provider key is shown in the admin console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyStatus {
    pub display: String,
    pub is_set: bool,
    /// Every configured key is an override; there is no built-in key.
    pub is_override: bool,
}

impl ApiKeyStatus {
    pub fn of(key: Option<&str>) -> Self {
        match key.filter(|k| !k.is_empty()) {
            Some(k) => Self {
                display: mask(k),
                is_set: true,
                is_override: true,
            },
            None => Self {
                display: "Not Configured".to_string(),
                is_set: false,
                is_override: false,
            },
        }
    }
}

/// `abcd...wxyz` for keys longer than eight characters.
pub fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "Key is too short to mask".to_string()
    }
}
