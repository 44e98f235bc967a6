use seedmix_core::{CryptoRandom, Error, KeyFile, Result};

pub fn create(path: &str, entropy_hex: Option<&str>) -> Result<()> {
    let entropy = entropy_hex.map(decode_entropy).transpose()?;
    let rng = CryptoRandom::new()?;
    let kf = KeyFile::create(path, entropy.as_deref(), &rng)?;
    println!("Key file written: {}", kf.path().display());
    println!("  Format:      {}", kf.format());
    println!("  Fingerprint: {}", kf.fingerprint());
    Ok(())
}

pub fn show(path: &str, json: bool) -> Result<()> {
    let kf = KeyFile::load(path)?;
    if json {
        let v = serde_json::json!({
            "path": kf.path().display().to_string(),
            "format": kf.format(),
            "fingerprint": kf.fingerprint(),
        });
        println!("{}", serde_json::to_string_pretty(&v)?);
    } else {
        println!("Path:        {}", kf.path().display());
        println!("Format:      {}", kf.format());
        println!("Fingerprint: {}", kf.fingerprint());
    }
    Ok(())
}

/// Parse `--entropy` hex. Whitespace is ignored so digests can be pasted
/// straight from `seedmix collect` output.
fn decode_entropy(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(Error::KeyFile("--entropy is empty".to_string()));
    }
    hex::decode(&compact).map_err(|e| Error::KeyFile(format!("--entropy: {e}")))
}
