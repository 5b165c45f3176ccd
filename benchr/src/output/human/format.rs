pub(crate) fn format_bytes(b: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    const GB: u64 = 1024 * 1024 * 1024;

    if b >= GB {
        return format!("{:.2}GB", (b as f64) / (GB as f64));
    }
    if b >= MB {
        return format!("{:.2}MB", (b as f64) / (MB as f64));
    }
    if b >= KB {
        return format!("{:.2}KB", (b as f64) / (KB as f64));
    }

    format!("{b}B")
}
