use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use seedmix_core::{
    CollectConfig, CollectionReport, CryptoRandom, KeyFile, ReaderSource, Result, parse_seed,
};

pub struct CollectCommandConfig<'a> {
    pub input: Option<&'a str>,
    pub text: Option<&'a str>,
    pub seed: Option<&'a str>,
    pub max_samples: Option<usize>,
    pub format: &'a str,
    pub keyfile: Option<&'a str>,
    pub config_path: Option<&'a str>,
    pub no_pool: bool,
}

pub fn run(cfg: CollectCommandConfig<'_>) -> Result<()> {
    let output = collect(&cfg)?;
    println!("{output}");
    Ok(())
}

/// Run a collection and return what `run` prints.
fn collect(cfg: &CollectCommandConfig<'_>) -> Result<String> {
    let config = resolve_config(cfg)?;
    let mut source = ReaderSource::new(open_input(cfg.input)?);

    let mut acc = config.open_accumulator()?;
    let fed = acc.absorb(&mut source, config.max_samples)?;
    if let Err(e) = source.finish() {
        acc.cancel();
        return Err(e);
    }
    log::info!(
        "fed {fed} samples (~{} bits estimated)",
        acc.estimated_bits()
    );

    // Feeding the pool only matters for the key file drawn from it.
    let pool = config
        .keyfile
        .as_ref()
        .map(|_| CryptoRandom::new())
        .transpose()?;
    if pool.is_none() && config.feed_pool {
        log::debug!("no key file requested, skipping the random pool");
    }
    let fed_pool = config.feed_pool && pool.is_some();

    let text = config.text.as_deref();
    let digest = match &pool {
        Some(rng) if fed_pool => acc.finalize_into(text, rng)?,
        _ => acc.finalize(text)?,
    };

    let keyfile = match config.keyfile.as_ref().zip(pool.as_ref()) {
        Some((path, rng)) => {
            let kf = KeyFile::create(path, Some(digest.as_slice()), rng)?;
            eprintln!(
                "Key file written: {} (fingerprint {})",
                kf.path().display(),
                kf.fingerprint()
            );
            Some(kf)
        }
        None => None,
    };

    if cfg.format == "json" {
        let mut report = CollectionReport::new(acc.summary()).with_digest(digest.as_slice());
        report.fed_pool = fed_pool;
        report.keyfile = keyfile.map(|kf| kf.path().display().to_string());
        return report.to_json();
    }
    Ok(super::encode(digest.as_slice(), cfg.format))
}

/// Config file first, then command-line overrides.
fn resolve_config(cfg: &CollectCommandConfig<'_>) -> Result<CollectConfig> {
    let mut config = match cfg.config_path {
        Some(path) => CollectConfig::from_path(path)?,
        None => CollectConfig::default(),
    };
    if let Some(seed) = cfg.seed {
        parse_seed(seed)?;
        config.seed = Some(seed.to_string());
    }
    if let Some(text) = cfg.text {
        config.text = Some(text.to_string());
    }
    if cfg.max_samples.is_some() {
        config.max_samples = cfg.max_samples;
    }
    if let Some(path) = cfg.keyfile {
        config.keyfile = Some(PathBuf::from(path));
    }
    if cfg.no_pool {
        config.feed_pool = false;
    }
    Ok(config)
}

fn open_input(input: Option<&str>) -> Result<Box<dyn BufRead>> {
    match input {
        Some(path) if path != "-" => Ok(Box::new(BufReader::new(File::open(path)?))),
        _ => Ok(Box::new(std::io::stdin().lock())),
    }
}
