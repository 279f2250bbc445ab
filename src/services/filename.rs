use std::sync::OnceLock;

use regex::Regex;

pub const MAX_FILENAME_LEN: usize = 100;

const REJECTED_EXTENSIONS: &[&str] = &[
    "7z", "bz2", "doc", "docx", "exe", "gz", "pdf", "rar", "tar", "xz", "zip",
];

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("static regex"))
}

/// Checks the name of a dataset file. Returns the user-facing message on
/// failure.
pub fn validate_filename(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("file name is empty".into());
    }

    if name.chars().count() > MAX_FILENAME_LEN {
        return Err(format!(
            "file name must be at most {MAX_FILENAME_LEN} characters"
        ));
    }

    if !name_re().is_match(name) || name.contains("..") {
        return Err(
            "file name may only contain letters, digits, '.', '_' and '-' and must start with a letter or digit"
                .into(),
        );
    }

    if let Some((_, ext)) = name.rsplit_once('.') {
        let ext = ext.to_ascii_lowercase();
        if REJECTED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(format!("'.{ext}' files are not plain text"));
        }
    }

    Ok(())
}
