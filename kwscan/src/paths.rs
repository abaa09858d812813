//! Serde helpers that carry paths through JSON without loss.
//!
//! A path that is valid UTF-8 is written as a plain string. Any other path is written as
//! the array of its raw OS bytes, so file names a worker process is handed come back
//! byte-for-byte identical to the ones the driver sent.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

struct WirePath<'a>(&'a Path);

impl Serialize for WirePath<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.to_str() {
            Some(text) => serializer.serialize_str(text),
            None => serialize_raw(self.0, serializer),
        }
    }
}

#[cfg(unix)]
fn serialize_raw<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    use std::os::unix::ffi::OsStrExt;
    serializer.collect_seq(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn serialize_raw<S: Serializer>(path: &Path, _serializer: S) -> Result<S::Ok, S::Error> {
    Err(serde::ser::Error::custom(format!(
        "path is not valid unicode: {}",
        path.display()
    )))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Encoded {
    Text(String),
    Raw(Vec<u8>),
}

struct OwnedPath(PathBuf);

impl<'de> Deserialize<'de> for OwnedPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Encoded::deserialize(deserializer)? {
            Encoded::Text(text) => Ok(OwnedPath(PathBuf::from(text))),
            Encoded::Raw(bytes) => path_from_raw(bytes).map(OwnedPath),
        }
    }
}

#[cfg(unix)]
fn path_from_raw<E: de::Error>(bytes: Vec<u8>) -> Result<PathBuf, E> {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;
    Ok(PathBuf::from(OsString::from_vec(bytes)))
}

#[cfg(not(unix))]
fn path_from_raw<E: de::Error>(bytes: Vec<u8>) -> Result<PathBuf, E> {
    String::from_utf8(bytes)
        .map(PathBuf::from)
        .map_err(|e| E::custom(format!("path is not valid unicode: {}", e)))
}

/// `#[serde(with = "crate::paths::list")]` for `Vec<PathBuf>`.
pub mod list {
    use super::*;

    pub fn serialize<S: Serializer>(paths: &[PathBuf], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(paths.iter().map(|p| WirePath(p.as_path())))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<PathBuf>, D::Error> {
        let paths = Vec::<OwnedPath>::deserialize(deserializer)?;
        Ok(paths.into_iter().map(|p| p.0).collect())
    }
}

/// `#[serde(with = "crate::paths::map")]` for `BTreeMap<String, Vec<PathBuf>>`.
pub mod map {
    use super::*;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<String, Vec<PathBuf>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(map.iter().map(|(keyword, paths)| {
            let paths: Vec<WirePath<'_>> = paths.iter().map(|p| WirePath(p.as_path())).collect();
            (keyword, paths)
        }))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Vec<PathBuf>>, D::Error> {
        let map = BTreeMap::<String, Vec<OwnedPath>>::deserialize(deserializer)?;
        Ok(map
            .into_iter()
            .map(|(keyword, paths)| (keyword, paths.into_iter().map(|p| p.0).collect()))
            .collect())
    }
}
