//! SMBIOS value decoding shared by the firmware probes

/// Placeholder strings vendors leave in unset SMBIOS fields
const PLACEHOLDERS: [&str; 8] = [
    "",
    "not specified",
    "not applicable",
    "to be filled by o.e.m.",
    "default string",
    "system serial number",
    "none",
    "unknown",
];

/// Trimmed field value, or `None` for empty and placeholder strings
pub fn clean(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('\0').trim();
    if PLACEHOLDERS.contains(&trimmed.to_ascii_lowercase().as_str()) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a size such as "16 GB", "8192 MB" or "16GB" into bytes
pub fn parse_size(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(raw.len());
    let (number, unit) = raw.split_at(split);
    let number: f64 = number.parse().ok()?;
    let multiplier: u64 = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" | "BYTES" => 1,
        "KB" | "KIB" => 1 << 10,
        "MB" | "MIB" => 1 << 20,
        "GB" | "GIB" => 1 << 30,
        "TB" | "TIB" => 1 << 40,
        _ => return None,
    };
    Some((number * multiplier as f64) as u64)
}

/// Parse "3200 MT/s" or "2667 MHz" into a number
pub fn parse_speed(raw: &str) -> Option<u64> {
    let number = raw.split_whitespace().next()?;
    number.parse().ok().filter(|speed| *speed > 0)
}

/// Memory device form factor (SMBIOS type 17, CIM `FormFactor`)
pub fn form_factor(code: u64) -> Option<&'static str> {
    let name = match code {
        1 => "Other",
        2 => "SIP",
        3 => "DIP",
        4 => "ZIP",
        5 => "SOJ",
        6 => "Proprietary",
        7 => "SIMM",
        8 => "DIMM",
        9 => "TSOP",
        10 => "PGA",
        11 => "RIMM",
        12 => "SODIMM",
        13 => "SRIMM",
        14 => "SMD",
        15 => "SSMP",
        16 => "QFP",
        17 => "TQFP",
        18 => "SOIC",
        19 => "LCC",
        20 => "PLCC",
        21 => "BGA",
        22 => "FPBGA",
        23 => "LGA",
        _ => return None,
    };
    Some(name)
}

/// Memory device type (SMBIOS type 17 byte 0x12, CIM `SMBIOSMemoryType`)
pub fn memory_type(code: u64) -> Option<&'static str> {
    let name = match code {
        0x01 => "Other",
        0x03 => "DRAM",
        0x04 => "EDRAM",
        0x05 => "VRAM",
        0x06 => "SRAM",
        0x07 => "RAM",
        0x08 => "ROM",
        0x09 => "Flash",
        0x0F => "SDRAM",
        0x12 => "DDR",
        0x13 => "DDR2",
        0x14 => "DDR2 FB-DIMM",
        0x18 => "DDR3",
        0x19 => "FBD2",
        0x1A => "DDR4",
        0x1B => "LPDDR",
        0x1C => "LPDDR2",
        0x1D => "LPDDR3",
        0x1E => "LPDDR4",
        0x1F => "Logical non-volatile device",
        0x20 => "HBM",
        0x21 => "HBM2",
        0x22 => "DDR5",
        0x23 => "LPDDR5",
        0x24 => "HBM3",
        _ => return None,
    };
    Some(name)
}
