//! Human-readable error descriptions and structured JSON error formatting.

/// Map an eyre::Report to a human-readable explanation with likely causes
/// and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use weigher_core::error::ReaderError;

    // Typed matches first
    if let Some(re) = err.downcast_ref::<ReaderError>() {
        return match re {
            ReaderError::Source(msg) => format!(
                "What happened: The byte source failed ({msg}).\nLikely causes: The scale was unplugged, the USB adapter dropped, or the port was claimed by another process.\nHow to fix: Check the cable and port, then start a new run; the reader does not reconnect on its own."
            ),
            ReaderError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See README for a sample."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("opening serial device") || lower.contains("open serial port") {
        return "What happened: The serial device could not be opened.\nLikely causes: Wrong device path, missing permissions (dialout group), or the scale is not connected.\nHow to fix: Check port.device in the config or pass --port, and verify the device exists.".to_string();
    }

    if lower.contains("opening replay capture") || lower.contains("replay file") {
        return "What happened: The replay capture file could not be used.\nLikely causes: The path is wrong or the file has no lines.\nHow to fix: Point --replay at a capture with one record per line.".to_string();
    }

    if lower.contains("parse config") || lower.contains("read config") {
        return format!(
            "What happened: The config file could not be loaded.\nLikely causes: Bad TOML syntax or an unknown key.\nHow to fix: Fix the file named in the error, or delete it to run with defaults. Original: {msg}"
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use weigher_core::error::ReaderError;
    use serde_json::json;

    let reason = match err.downcast_ref::<ReaderError>() {
        Some(ReaderError::Source(_)) => "SourceFailure",
        Some(ReaderError::Config(_)) => "InvalidConfig",
        None => "Error",
    };
    json!({ "reason": reason, "message": humanize(err) }).to_string()
}
