use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use clap::ValueEnum;
use cross_xdg::BaseDirs;

use crate::interpreter::EofBehavior;

pub const DEFAULT_PROGRAM_CAPACITY: usize = 65_535;
pub const DEFAULT_TAPE_CAPACITY: usize = 65_535;
pub const DEFAULT_OUTPUT_CAPACITY: usize = 8_192;

/// Capacities and run limits for one interpreter run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub program_capacity: usize,
    pub tape_capacity: usize,
    /// Size of the debug-mode output buffer.
    pub output_capacity: usize,
    pub max_steps: Option<usize>,
    pub eof: EofBehavior,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            program_capacity: DEFAULT_PROGRAM_CAPACITY,
            tape_capacity: DEFAULT_TAPE_CAPACITY,
            output_capacity: DEFAULT_OUTPUT_CAPACITY,
            max_steps: None,
            eof: EofBehavior::Zero,
        }
    }
}

impl Config {
    /// Defaults, overlaid by the config file, overlaid by the environment.
    /// CLI flags are applied on top by the caller.
    pub fn load() -> Self {
        let mut cfg = Self::default();
        if let Some(content) = config_path().and_then(|p| {
            tracing::debug!(path = %p.display(), "reading config file");
            fs::read_to_string(p).ok()
        }) {
            cfg.apply_toml(&content);
        }
        cfg.apply_env(|key| std::env::var(key).ok());
        cfg
    }

    /// Apply keys from the `[interpreter]` section of a TOML document.
    ///
    /// Only flat `key = value` pairs are understood; values may be quoted.
    pub fn apply_toml(&mut self, content: &str) {
        let mut in_section = false;
        let mut map: HashMap<String, String> = HashMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') && line.ends_with(']') {
                in_section = line[1..line.len() - 1].trim() == "interpreter";
                continue;
            }
            if !in_section {
                continue;
            }
            if let Some((key, raw)) = line.split_once('=') {
                let raw = raw.trim();
                let val = raw
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(raw);
                map.insert(key.trim().to_string(), val.to_string());
            }
        }

        self.apply(|key| map.get(key).cloned(), |name| name);
    }

    /// Apply `BF_*` environment variables, looked up through `var`.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.apply(var, env_key);
    }

    fn apply<F, K>(&mut self, lookup: F, key: K)
    where
        F: Fn(&str) -> Option<String>,
        K: Fn(&'static str) -> &'static str,
    {
        let cfg = self;

        macro_rules! set_size {
            ($field:ident, $name:literal) => {
                if let Some(v) = lookup(key($name)) {
                    match v.trim().parse::<usize>() {
                        Ok(n) => cfg.$field = n,
                        Err(_) => tracing::warn!(key = key($name), value = %v, "ignoring invalid size"),
                    }
                }
            };
        }

        set_size!(program_capacity, "program_size");
        set_size!(tape_capacity, "tape_size");
        set_size!(output_capacity, "output_size");

        if let Some(v) = lookup(key("max_steps")) {
            match v.trim().parse::<usize>() {
                Ok(n) => cfg.max_steps = Some(n),
                Err(_) => tracing::warn!(key = key("max_steps"), value = %v, "ignoring invalid step limit"),
            }
        }

        if let Some(v) = lookup(key("eof")) {
            match EofBehavior::from_str(v.trim(), true) {
                Ok(eof) => cfg.eof = eof,
                Err(_) => tracing::warn!(key = key("eof"), value = %v, "ignoring unknown EOF behavior"),
            }
        }
    }
}

fn env_key(name: &'static str) -> &'static str {
    match name {
        "program_size" => "BF_PROGRAM_SIZE",
        "tape_size" => "BF_TAPE_SIZE",
        "output_size" => "BF_OUTPUT_SIZE",
        "max_steps" => "BF_MAX_STEPS",
        "eof" => "BF_EOF",
        other => other,
    }
}

/// `$BF_CONFIG`, else `bf.toml` under the XDG config home.
fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("BF_CONFIG") {
        return Some(PathBuf::from(path));
    }

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("bf.toml");
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_section_overrides_defaults() {
        let mut cfg = Config::default();
        cfg.apply_toml(
            r#"
# unrelated section
[colors]
tape_size = 1

[interpreter]
tape_size = 300
max_steps = "1000"
eof = "255"
"#,
        );
        assert_eq!(cfg.tape_capacity, 300);
        assert_eq!(cfg.max_steps, Some(1000));
        assert_eq!(cfg.eof, EofBehavior::Max);
        assert_eq!(cfg.program_capacity, DEFAULT_PROGRAM_CAPACITY);
    }

    #[test]
    fn invalid_values_are_ignored() {
        let mut cfg = Config::default();
        cfg.apply_toml("[interpreter]\nprogram_size = lots\neof = sometimes\n");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn env_uses_prefixed_names() {
        let mut cfg = Config::default();
        cfg.apply_env(|key| match key {
            "BF_TAPE_SIZE" => Some("16".to_string()),
            "BF_EOF" => Some("unchanged".to_string()),
            _ => None,
        });
        assert_eq!(cfg.tape_capacity, 16);
        assert_eq!(cfg.eof, EofBehavior::Unchanged);
        assert_eq!(cfg.max_steps, None);
    }
}
