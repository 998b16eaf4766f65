use std::fs;
use std::path::{MAIN_SEPARATOR, Path};

/// Result of a Tab press
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// Replacement line, if the input could be extended
    pub line: Option<String>,
    /// Matching directory names when there is more than one
    pub candidates: Vec<String>,
}

/// Complete the last component of `input` against directory names on disk
pub fn complete_dir(input: &str) -> Completion {
    let ends_with_sep = input.ends_with('/') || input.ends_with(MAIN_SEPARATOR);

    let prefix = if input.is_empty() || ends_with_sep {
        ""
    } else {
        match Path::new(input).file_name().and_then(|n| n.to_str()) {
            Some(name) if input.ends_with(name) => name,
            _ => return Completion::default(),
        }
    };

    let base = &input[..input.len() - prefix.len()];
    let dir = if base.is_empty() { Path::new(".") } else { Path::new(base) };

    let mut names: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_owned))
            .filter(|name| name.starts_with(prefix))
            .collect(),
        Err(_) => return Completion::default(),
    };
    names.sort();

    match names.as_slice() {
        [] => Completion::default(),
        [only] => Completion {
            line: Some(format!("{}{}{}", base, only, MAIN_SEPARATOR)),
            candidates: Vec::new(),
        },
        many => {
            let common = common_prefix(many);
            let line = (common.len() > prefix.len()).then(|| format!("{}{}", base, common));
            Completion {
                line,
                candidates: many.to_vec(),
            }
        }
    }
}

fn common_prefix(names: &[String]) -> String {
    let Some((first, rest)) = names.split_first() else {
        return String::new();
    };

    let mut len = first.len();
    for name in rest {
        len = first
            .char_indices()
            .zip(name.chars())
            .take_while(|((_, a), b)| a == b)
            .map(|((i, a), _)| i + a.len_utf8())
            .last()
            .unwrap_or(0)
            .min(len);
    }
    first[..len].to_string()
}
