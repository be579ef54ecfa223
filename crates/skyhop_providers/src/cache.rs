use std::{
    hash::{Hash, Hasher},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use fxhash::FxHasher64;
use serde::{Serialize, de::DeserializeOwned};
use skyhop_core::config::DirectionsBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    DrivingTime,
    DrivingRoute,
}

fn hash_points<H, P>(points: &[P], hasher: &mut H)
where
    H: Hasher,
    for<'a> &'a P: Into<geo_types::Point>,
{
    points.len().hash(hasher);
    for point in points {
        let point = point.into();
        hasher.write_u64(point.x().to_bits());
        hasher.write_u64(point.y().to_bits());
    }
}

pub fn get_filename<P>(points: &[P], backend: DirectionsBackend, kind: LookupKind) -> String
where
    for<'a> &'a P: Into<geo_types::Point>,
{
    let mut hasher = FxHasher64::default();

    hash_points(points, &mut hasher);
    backend.hash(&mut hasher);
    kind.hash(&mut hasher);

    let hash = hasher.finish();
    format!("{:016x}.json", hash)
}

/// JSON files named after a hash of the looked-up points.
pub struct FileCache {
    folder: PathBuf,
}

impl FileCache {
    pub fn new(folder: impl Into<PathBuf>) -> Result<Self, anyhow::Error> {
        let folder = folder.into();

        if !folder.is_dir() {
            return Err(anyhow::anyhow!(format!(
                "Path {} is not a directory",
                folder.display()
            )));
        }

        Ok(Self { folder })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn get<P, T>(
        &self,
        points: &[P],
        backend: DirectionsBackend,
        kind: LookupKind,
    ) -> Result<Option<T>, anyhow::Error>
    where
        for<'a> &'a P: Into<geo_types::Point>,
        T: DeserializeOwned,
    {
        let file_path = self.folder.join(get_filename(points, backend, kind));

        if !file_path.is_file() {
            return Ok(None);
        }

        let file = std::fs::File::open(file_path)?;
        let value: T = serde_json::from_reader(file)?;

        Ok(Some(value))
    }

    pub fn put<P, T>(
        &self,
        points: &[P],
        backend: DirectionsBackend,
        kind: LookupKind,
        value: &T,
    ) -> Result<(), anyhow::Error>
    where
        for<'a> &'a P: Into<geo_types::Point>,
        T: Serialize,
    {
        let filename = get_filename(points, backend, kind);

        let file = std::fs::File::create(self.folder.join(filename))?;
        let mut writer = BufWriter::with_capacity(64 * 1024, file);
        serde_json::to_writer(&mut writer, value)?;
        writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use skyhop_core::location::Location;

    use super::*;

    fn points() -> Vec<Location> {
        vec![
            Location::new("Mumbai", 19.076, 72.8777).unwrap(),
            Location::new("Delhi", 28.7041, 77.1025).unwrap(),
        ]
    }

    #[test]
    fn filename_depends_on_points_backend_and_kind() {
        let points = points();
        let reversed: Vec<Location> = points.iter().rev().cloned().collect();

        let base = get_filename(&points, DirectionsBackend::GraphHopper, LookupKind::DrivingTime);
        assert_eq!(
            base,
            get_filename(&points, DirectionsBackend::GraphHopper, LookupKind::DrivingTime)
        );
        assert_ne!(
            base,
            get_filename(&reversed, DirectionsBackend::GraphHopper, LookupKind::DrivingTime)
        );
        assert_ne!(
            base,
            get_filename(&points, DirectionsBackend::Osrm, LookupKind::DrivingTime)
        );
        assert_ne!(
            base,
            get_filename(&points, DirectionsBackend::GraphHopper, LookupKind::DrivingRoute)
        );
        assert!(base.ends_with(".json"));
    }

    #[test]
    fn stores_and_reads_back() {
        let folder = std::env::temp_dir().join(format!("skyhop-cache-{}", std::process::id()));
        std::fs::create_dir_all(&folder).unwrap();
        let cache = FileCache::new(&folder).unwrap();
        let points = points();

        let missing: Option<f64> = cache
            .get(&points, DirectionsBackend::Osrm, LookupKind::DrivingTime)
            .unwrap();
        assert_eq!(missing, None);

        cache
            .put(&points, DirectionsBackend::Osrm, LookupKind::DrivingTime, &72_000.5)
            .unwrap();
        let cached: Option<f64> = cache
            .get(&points, DirectionsBackend::Osrm, LookupKind::DrivingTime)
            .unwrap();
        assert_eq!(cached, Some(72_000.5));

        std::fs::remove_dir_all(folder).unwrap();
    }

    #[test]
    fn rejects_missing_folder() {
        assert!(FileCache::new("/definitely/not/a/skyhop/folder").is_err());
    }
}
