mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Bm25, Config, Prf, Search, Service};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}

	validate_bm25(&cfg.bm25)?;
	validate_prf(&cfg.prf)?;

	if cfg.search.hits == 0 {
		return Err(Error::Validation {
			message: "search.hits must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

pub fn validate_prf(prf: &Prf) -> Result<()> {
	if prf.field.trim().is_empty() {
		return Err(Error::Validation { message: "prf.field must be non-empty.".to_string() });
	}
	if prf.fb_docs == 0 {
		return Err(Error::Validation {
			message: "prf.fb_docs must be greater than zero.".to_string(),
		});
	}
	if prf.fb_terms == 0 {
		return Err(Error::Validation {
			message: "prf.fb_terms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn validate_bm25(bm25: &Bm25) -> Result<()> {
	if !bm25.k1.is_finite() {
		return Err(Error::Validation { message: "bm25.k1 must be a finite number.".to_string() });
	}
	if bm25.k1 < 0.0 {
		return Err(Error::Validation { message: "bm25.k1 must be zero or greater.".to_string() });
	}
	if !bm25.b.is_finite() {
		return Err(Error::Validation { message: "bm25.b must be a finite number.".to_string() });
	}
	if !(0.0..=1.0).contains(&bm25.b) {
		return Err(Error::Validation {
			message: "bm25.b must be in the range 0.0-1.0.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let field = cfg.prf.field.trim();

	if field.len() != cfg.prf.field.len() {
		cfg.prf.field = field.to_string();
	}

	let log_level = cfg.service.log_level.trim();

	if log_level.len() != cfg.service.log_level.len() {
		cfg.service.log_level = log_level.to_string();
	}
}
