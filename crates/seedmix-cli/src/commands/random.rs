use std::io::Write;

use seedmix_core::{CryptoRandom, EntropySink, Result};

pub fn run(n_bytes: usize, format: &str, mix: Option<&str>, stats: bool) -> Result<()> {
    let pool = CryptoRandom::new()?;
    if let Some(path) = mix {
        let data = std::fs::read(path)?;
        log::info!("mixing {} bytes from {path} into the pool", data.len());
        pool.add_entropy(&data);
    }

    let data = pool.get_random_bytes(n_bytes)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        "raw" => out.write_all(&data)?,
        _ => writeln!(out, "{}", super::encode(&data, format))?,
    }
    out.flush()?;

    if stats {
        eprintln!("{}", serde_json::to_string_pretty(&pool.stats())?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_with_mix_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"extra entropy").unwrap();
        run(16, "hex", Some(f.path().to_str().unwrap()), true).unwrap();
    }

    #[test]
    fn test_run_missing_mix_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope");
        assert!(run(8, "hex", Some(path.to_str().unwrap()), false).is_err());
    }
}
