// services/generator.rs
use chrono::Utc;
use rand::RngCore;

const MAC_PLACEHOLDER: &str = "DEVICE";

fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode_upper(buf)
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn now_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// `WIFI-{PACKAGE}-{millis}-{8 hex chars}`
pub fn generate_reference(package_type: &str) -> String {
    format!(
        "WIFI-{}-{}-{}",
        package_type.to_ascii_uppercase(),
        now_millis(),
        random_hex(4)
    )
}

/// Voucher used as both hotspot username and password:
/// `{PACKAGE}-{macShort}-{millis base36}{6 hex chars}`
pub fn generate_voucher_code(package_type: &str, mac_address: Option<&str>) -> String {
    format!(
        "{}-{}-{}{}",
        package_type.to_ascii_uppercase(),
        mac_short(mac_address),
        to_base36(now_millis()),
        random_hex(3)
    )
}

/// Six hex characters taken from the device half of the MAC.
///
/// Router template placeholders like `$(mac)` count as missing.
pub fn mac_short(mac_address: Option<&str>) -> String {
    let mac = match mac_address {
        Some(mac) if !mac.contains("$(") => mac,
        _ => return MAC_PLACEHOLDER.to_string(),
    };

    let normalized: String = mac
        .chars()
        .filter(|c| c.is_ascii_hexdigit())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    match normalized.len() {
        0 => MAC_PLACEHOLDER.to_string(),
        len if len >= 12 => normalized[6..12].to_string(),
        len if len >= 6 => normalized[len - 6..].to_string(),
        _ => format!("{:0>6}", normalized),
    }
}
