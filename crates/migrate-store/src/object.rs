//! Object references and file naming

use std::fmt;
use std::path::{Path, PathBuf};

use migrate_model::DocumentKind;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

const OBJECT_REF_SEP: char = '-';

/// Extension of a stored object file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileExt {
    /// `.json` document
    Json,
    /// `.touched` marker
    Touched,
}

impl FileExt {
    /// Extension including the leading dot
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => ".json",
            Self::Touched => ".touched",
        }
    }

    fn split(name: &str) -> Result<(&str, Self), StoreError> {
        // extension is everything from the last dot, like a file path extension
        let dot = name.rfind('.').unwrap_or(name.len());
        let (base, ext) = name.split_at(dot);
        let ext = match ext {
            ".json" => Self::Json,
            ".touched" => Self::Touched,
            other => return Err(StoreError::InvalidExtension(other.to_string())),
        };
        Ok((base, ext))
    }
}

/// Parsed `<type>-<id>.<ext>` file name
///
/// The type is kept as text; [`ObjectRef::from_file`] validates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectFileName<'a> {
    /// Object type part
    pub kind: &'a str,
    /// Object ID part, may itself contain `-`
    pub id: &'a str,
    /// File extension
    pub ext: FileExt,
}

/// Parse an object file name
///
/// # Errors
/// Returns error if the extension is neither `.json` nor `.touched`, or
/// the base name has no `-` separator
pub fn parse_object_file_name(name: &str) -> Result<ObjectFileName<'_>, StoreError> {
    let (base, ext) = FileExt::split(name)?;
    let (kind, id) = base
        .split_once(OBJECT_REF_SEP)
        .ok_or_else(|| StoreError::InvalidFileName(name.to_string()))?;
    Ok(ObjectFileName { kind, id, ext })
}

/// Path of an object document relative to the store root
#[must_use]
pub fn object_file_path(org_id: i64, kind: DocumentKind, id: &str) -> PathBuf {
    Path::new(&org_id.to_string()).join(format!("{kind}{OBJECT_REF_SEP}{id}{}", FileExt::Json.as_str()))
}

/// Identity of a remote object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    /// Organisation ID
    pub org_id: i64,
    /// Object kind
    pub kind: DocumentKind,
    /// Object ID (numeric for monitors)
    pub id: String,
}

impl ObjectRef {
    /// Create a reference
    pub fn new(org_id: i64, kind: DocumentKind, id: impl Into<String>) -> Self {
        Self {
            org_id,
            kind,
            id: id.into(),
        }
    }

    /// Build from an org folder name and an object file name
    ///
    /// # Errors
    /// Returns error if the folder is not numeric, the file name does not
    /// parse, the ID is empty or the type is unknown
    pub fn from_file(folder: &str, name: &str) -> Result<Self, StoreError> {
        let org_id = folder.parse::<i64>().map_err(|source| StoreError::InvalidOrg {
            folder: folder.to_string(),
            source,
        })?;

        let file = parse_object_file_name(name)?;
        if file.id.is_empty() {
            return Err(StoreError::InvalidObjectId(file.id.to_string()));
        }
        let kind = file.kind.parse::<DocumentKind>()?;

        Ok(Self::new(org_id, kind, file.id))
    }

    /// Path of the JSON document relative to the store root
    #[must_use]
    pub fn relative_path(&self) -> PathBuf {
        object_file_path(self.org_id, self.kind, &self.id)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "org: {}, type: {}, id: {}", self.org_id, self.kind, self.id)
    }
}

/// One entry of an input reference file
///
/// A zero monitor ID or empty dashboard ID counts as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedRef {
    /// Organisation ID
    #[serde(rename = "ORG_ID")]
    pub org_id: i64,

    /// Monitor ID
    #[serde(rename = "MONITOR_ID", default, skip_serializing_if = "Option::is_none")]
    pub monitor_id: Option<i64>,

    /// Dashboard ID
    #[serde(rename = "DASHBOARD_ID", default, skip_serializing_if = "Option::is_none")]
    pub dashboard_id: Option<String>,
}

impl SerializedRef {
    /// Reference to a monitor
    #[must_use]
    pub fn monitor(org_id: i64, monitor_id: i64) -> Self {
        Self {
            org_id,
            monitor_id: Some(monitor_id),
            dashboard_id: None,
        }
    }

    /// Reference to a dashboard
    pub fn dashboard(org_id: i64, dashboard_id: impl Into<String>) -> Self {
        Self {
            org_id,
            monitor_id: None,
            dashboard_id: Some(dashboard_id.into()),
        }
    }
}

impl fmt::Display for SerializedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{OrgID:{}", self.org_id)?;
        if let Some(id) = self.monitor_id {
            write!(f, " MonitorID:{id}")?;
        }
        if let Some(id) = &self.dashboard_id {
            write!(f, " DashboardID:{id}")?;
        }
        f.write_str("}")
    }
}

impl TryFrom<&SerializedRef> for ObjectRef {
    type Error = StoreError;

    fn try_from(r: &SerializedRef) -> Result<Self, Self::Error> {
        match (r.monitor_id, r.dashboard_id.as_deref()) {
            (Some(id), _) if id != 0 => Ok(Self::new(r.org_id, DocumentKind::Monitor, id.to_string())),
            (_, Some(id)) if !id.is_empty() => Ok(Self::new(r.org_id, DocumentKind::Dashboard, id)),
            _ => Err(StoreError::InvalidInputRef(r.to_string())),
        }
    }
}

/// Read an input reference file (a JSON array of [`SerializedRef`])
///
/// # Errors
/// Returns error if the file cannot be read or is not a valid ref list
pub async fn read_input_refs(path: impl AsRef<Path>) -> Result<Vec<SerializedRef>, StoreError> {
    let path = path.as_ref();
    let content = tokio::fs::read(path)
        .await
        .map_err(|e| StoreError::io_error(path, e))?;
    serde_json::from_slice(&content).map_err(|source| StoreError::InputFile {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_splits_on_first_separator() {
        let file = parse_object_file_name("dashboard-abc-def-ghi.json").unwrap();
        assert_eq!(
            file,
            ObjectFileName {
                kind: "dashboard",
                id: "abc-def-ghi",
                ext: FileExt::Json
            }
        );

        let file = parse_object_file_name("monitor-42.touched").unwrap();
        assert_eq!(file.ext, FileExt::Touched);
        assert_eq!(file.id, "42");
    }

    #[test]
    fn parse_rejects_other_extensions() {
        assert!(matches!(
            parse_object_file_name("monitor-42.yaml"),
            Err(StoreError::InvalidExtension(ext)) if ext == ".yaml"
        ));
        assert!(matches!(
            parse_object_file_name("README"),
            Err(StoreError::InvalidExtension(ext)) if ext.is_empty()
        ));
    }

    #[test]
    fn parse_requires_separator() {
        assert!(matches!(
            parse_object_file_name("monitor.json"),
            Err(StoreError::InvalidFileName(_))
        ));
    }

    #[test]
    fn object_ref_from_file() {
        let r = ObjectRef::from_file("1234", "monitor-42.touched").unwrap();
        assert_eq!(r, ObjectRef::new(1234, DocumentKind::Monitor, "42"));
        assert_eq!(r.relative_path(), Path::new("1234").join("monitor-42.json"));
    }

    #[test]
    fn object_ref_rejects_bad_parts() {
        assert!(matches!(
            ObjectRef::from_file("org", "monitor-42.json"),
            Err(StoreError::InvalidOrg { .. })
        ));
        assert!(matches!(
            ObjectRef::from_file("1", "monitor-.json"),
            Err(StoreError::InvalidObjectId(_))
        ));
        assert!(matches!(
            ObjectRef::from_file("1", "notebook-3.json"),
            Err(StoreError::Model(_))
        ));
    }

    #[test]
    fn input_refs_convert() {
        let refs: Vec<SerializedRef> = serde_json::from_str(
            r#"[{"ORG_ID": 1, "MONITOR_ID": 42}, {"ORG_ID": 2, "DASHBOARD_ID": "abc-def"}, {"ORG_ID": 3}]"#,
        )
        .unwrap();

        assert_eq!(
            ObjectRef::try_from(&refs[0]).unwrap(),
            ObjectRef::new(1, DocumentKind::Monitor, "42")
        );
        assert_eq!(
            ObjectRef::try_from(&refs[1]).unwrap(),
            ObjectRef::new(2, DocumentKind::Dashboard, "abc-def")
        );
        let err = ObjectRef::try_from(&refs[2]).unwrap_err();
        assert_eq!(err.to_string(), "invalid input ref: {OrgID:3}");
    }

    #[test]
    fn zero_monitor_id_falls_back_to_dashboard() {
        let r = SerializedRef {
            org_id: 1,
            monitor_id: Some(0),
            dashboard_id: Some("x".into()),
        };
        assert_eq!(ObjectRef::try_from(&r).unwrap().kind, DocumentKind::Dashboard);
    }

    #[tokio::test]
    async fn read_refs_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitors.json");
        tokio::fs::write(&path, r#"[{"ORG_ID": 7, "MONITOR_ID": 1}]"#).await.unwrap();

        let refs = read_input_refs(&path).await.unwrap();
        assert_eq!(refs, vec![SerializedRef::monitor(7, 1)]);

        tokio::fs::write(&path, "not json").await.unwrap();
        assert!(matches!(
            read_input_refs(&path).await,
            Err(StoreError::InputFile { .. })
        ));
    }
}
