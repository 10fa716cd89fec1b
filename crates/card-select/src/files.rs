const SIZE_UNITS: &[&str] = &["Bytes", "KB", "MB", "GB"];

/// Human-readable size with at most one decimal, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < SIZE_UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, SIZE_UNITS[unit])
    } else {
        format!("{rounded:.1} {}", SIZE_UNITS[unit])
    }
}

pub fn file_icon(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "pdf" | "txt" | "rtf" => "📄",
        "doc" | "docx" => "📝",
        "xls" | "xlsx" | "ppt" | "pptx" => "📊",
        "zip" | "rar" | "7z" => "📦",
        "jpg" | "jpeg" | "png" | "gif" | "svg" => "🖼️",
        "mp3" | "wav" => "🎵",
        "mp4" | "avi" | "mov" => "🎬",
        _ => "📎",
    }
}

/// Lowercased extension after the last dot, if the name has one.
pub fn file_extension(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn base_name(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => stem,
        _ => name,
    }
}

pub fn with_extension(base: &str, extension: Option<&str>) -> String {
    match extension {
        Some(ext) if !ext.is_empty() => format!("{base}.{ext}"),
        _ => base.to_string(),
    }
}
