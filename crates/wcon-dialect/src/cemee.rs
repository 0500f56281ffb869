//! CeMEE Multi-Worm Tracker samples published on Zenodo.
//!
//! A sample is one zipped WCON file inside a tarball attached to a Zenodo
//! record (see <https://zenodo.org/record/4074963>). [`CemeeSample`]
//! describes where a sample lives and checks that the description is usable
//! before anything is fetched or extracted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::zenodo::file_download_url;

const ZIP_EXTENSION: &str = ".zip";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Missing `{0}`")]
    Missing(&'static str),
    #[error("Expected sample_zip_file_name to be a zip file name, got {0:?}")]
    NotAZip(String),
}

/// Where a CeMEE sample can be found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CemeeSample {
    pub zenodo_id: Option<u64>,
    /// Archive attached to the Zenodo record.
    pub zenodo_file_name: Option<String>,
    /// Zipped WCON file inside the archive, named after the strain and a
    /// timestamp, e.g. `LSJ2_20190705_105444.wcon.zip`.
    pub sample_zip_file_name: Option<String>,
    /// Zenodo instance; the public site when absent.
    pub zenodo_base_url: Option<String>,
}

/// A [`CemeeSample`] with every required field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSample<'a> {
    pub zenodo_id: u64,
    pub zenodo_file_name: &'a str,
    pub sample_zip_file_name: &'a str,
    pub zenodo_base_url: Option<&'a str>,
}

impl CemeeSample {
    /// Checks required fields in a fixed order and reports the first problem.
    ///
    /// # Errors
    ///
    /// [`SourceError::Missing`] names the first absent field;
    /// [`SourceError::NotAZip`] is returned when the sample file name does
    /// not end in `.zip`.
    pub fn validate(&self) -> Result<ValidSample<'_>, SourceError> {
        let zenodo_id = self.zenodo_id.ok_or(SourceError::Missing("zenodo_id"))?;
        let zenodo_file_name = non_empty(&self.zenodo_file_name)
            .ok_or(SourceError::Missing("zenodo_file_name"))?;
        let sample_zip_file_name = non_empty(&self.sample_zip_file_name)
            .ok_or(SourceError::Missing("sample_zip_file_name"))?;
        if !sample_zip_file_name.ends_with(ZIP_EXTENSION)
            || sample_zip_file_name.len() == ZIP_EXTENSION.len()
        {
            return Err(SourceError::NotAZip(sample_zip_file_name.to_string()));
        }
        Ok(ValidSample {
            zenodo_id,
            zenodo_file_name,
            sample_zip_file_name,
            zenodo_base_url: non_empty(&self.zenodo_base_url),
        })
    }

    /// Name of the WCON file inside the sample zip, which is also the name
    /// given to the repaired output.
    ///
    /// # Errors
    ///
    /// Same as [`CemeeSample::validate`].
    pub fn wcon_file_name(&self) -> Result<&str, SourceError> {
        self.validate().map(|sample| sample.wcon_file_name())
    }

    /// # Errors
    ///
    /// Same as [`CemeeSample::validate`].
    pub fn download_url(&self) -> Result<String, SourceError> {
        self.validate().map(|sample| sample.download_url())
    }
}

impl<'a> ValidSample<'a> {
    pub fn wcon_file_name(&self) -> &'a str {
        let name = self.sample_zip_file_name;
        &name[..name.len() - ZIP_EXTENSION.len()]
    }

    pub fn download_url(&self) -> String {
        file_download_url(self.zenodo_base_url, self.zenodo_id, self.zenodo_file_name)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CemeeSample {
        CemeeSample {
            zenodo_id: Some(1010101),
            zenodo_file_name: Some("zenodo_fname".to_string()),
            sample_zip_file_name: Some("LSJ2_20190705_105444.wcon.zip".to_string()),
            zenodo_base_url: None,
        }
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let empty = CemeeSample::default();
        assert_eq!(empty.validate().unwrap_err().to_string(), "Missing `zenodo_id`");

        let s = CemeeSample { zenodo_id: Some(1), ..CemeeSample::default() };
        assert_eq!(s.validate().unwrap_err(), SourceError::Missing("zenodo_file_name"));

        let s = CemeeSample {
            zenodo_id: Some(1),
            zenodo_file_name: Some("zenodo_fname".to_string()),
            ..CemeeSample::default()
        };
        assert_eq!(s.validate().unwrap_err(), SourceError::Missing("sample_zip_file_name"));
    }

    #[test]
    fn test_sample_must_be_zip() {
        let s = CemeeSample {
            sample_zip_file_name: Some("blah.txt".to_string()),
            ..sample()
        };
        let err = s.validate().unwrap_err();
        assert_eq!(err, SourceError::NotAZip("blah.txt".to_string()));
        assert!(err.to_string().contains("sample_zip_file_name to be a zip"));

        let s = CemeeSample {
            sample_zip_file_name: Some(".zip".to_string()),
            ..sample()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_wcon_file_name() {
        assert_eq!(sample().wcon_file_name().unwrap(), "LSJ2_20190705_105444.wcon");
    }

    #[test]
    fn test_download_url() {
        assert_eq!(
            sample().download_url().unwrap(),
            "https://zenodo.org/record/1010101/files/zenodo_fname?download=1"
        );
    }
}
