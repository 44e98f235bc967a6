pub mod collect;
pub mod keyfile;
pub mod random;

use seedmix_core::encoding::base64_encode;

/// Map `-v` count to a default log filter.
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Initialize env_logger. `RUST_LOG` wins over `-v`.
pub fn init_logging(verbose: u8) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(verbose)))
        .format_timestamp(None)
        .init();
}

/// Render bytes as text. Unknown formats fall back to hex.
pub fn encode(data: &[u8], format: &str) -> String {
    match format {
        "base64" => base64_encode(data),
        "hex" => hex::encode(data),
        _ => {
            log::warn!("unknown output format '{format}', using hex");
            hex::encode(data)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_levels() {
        assert_eq!(log_filter(0), "warn");
        assert_eq!(log_filter(1), "info");
        assert_eq!(log_filter(2), "debug");
        assert_eq!(log_filter(9), "debug");
    }

    #[test]
    fn test_encode_formats() {
        assert_eq!(encode(&[0xde, 0xad], "hex"), "dead");
        assert_eq!(encode(b"fo", "base64"), "Zm8=");
    }

    #[test]
    fn test_encode_unknown_defaults_hex() {
        assert_eq!(encode(&[0x01], "HEX"), "01"); // case-sensitive
        assert_eq!(encode(&[0x01], ""), "01");
    }
}
