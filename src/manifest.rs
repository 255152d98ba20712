use std::{fs, io, path::Path};

use serde_json::{Map, Value};

use crate::{error::ManifestError, project::ProjectName};

/// Rewrite `name` and `figdata.id` of the manifest at `path` to the project
/// name. Every other key is written back untouched, with two space
/// indentation. Returns the written document
pub fn customize_manifest(path: &Path, name: &ProjectName) -> Result<Value, ManifestError> {
    tracing::info!("customizing {:?}", path);

    let buf = fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ManifestError::ManifestMissing {
            path: path.to_path_buf(),
        },
        _ => ManifestError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let malformed = |reason: String| ManifestError::ManifestMalformed {
        path: path.to_path_buf(),
        reason,
    };
    let mut manifest: Value =
        serde_json::from_slice(&buf).map_err(|e| malformed(e.to_string()))?;

    let root = manifest
        .as_object_mut()
        .ok_or_else(|| malformed("top level value is not an object".to_string()))?;
    root.insert("name".to_string(), Value::from(name.as_str()));

    let figdata: &mut Map<String, Value> = root
        .get_mut("figdata")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| malformed("missing the `figdata` object".to_string()))?;
    figdata.insert("id".to_string(), Value::from(name.as_str()));

    let out = serde_json::to_string_pretty(&manifest).map_err(|e| malformed(e.to_string()))?;
    fs::write(path, out).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("wrote {:?}", path);
    Ok(manifest)
}
