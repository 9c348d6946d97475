//! DID catalog - names and data layouts of data identifiers
//!
//! The catalog feeds the `dataIdentifier` mapping and the per-DID data
//! layouts of ReadDataByIdentifier and WriteDataByIdentifier. It starts from
//! the standard ISO 14229-1 identification DIDs and can be extended from YAML
//! files; every entry is registered through [`DidCatalogBuilder`], which
//! rejects duplicate DIDs and names.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{format_did, parse_did, DefinitionError, DefinitionResult};
use crate::layout::Layout;
use crate::record::{DataRecord, LinearFormula, Mapping};
use crate::service_id::standard_did;

/// Name of the 16-bit data identifier record
pub const DATA_IDENTIFIER_RECORD: &str = "dataIdentifier";

/// Name of the raw data record used for DIDs without a catalog entry
pub const UNKNOWN_DATA_RECORD: &str = "dataRecord";

/// Largest DID payload a single linear record can scale
const MAX_LINEAR_BYTES: usize = 8;

/// How the bytes after a DID are laid out
#[derive(Debug, Clone, PartialEq)]
pub enum DidData {
    /// Raw bytes; `None` means any non-zero length
    Raw { length: Option<usize> },
    /// ASCII text; `None` means any non-zero length
    Text { length: Option<usize> },
    /// Big-endian unsigned integer scaled by a linear formula
    Linear {
        length: usize,
        factor: f64,
        offset: f64,
        unit: Option<String>,
    },
}

impl DidData {
    fn validate(&self, did: u16) -> DefinitionResult<()> {
        let invalid = |reason: String| DefinitionError::InvalidDidData { did, reason };
        match self {
            DidData::Raw { length: Some(0) } | DidData::Text { length: Some(0) } => {
                Err(invalid("length must be at least one byte".to_string()))
            }
            DidData::Linear { length, .. } if *length == 0 || *length > MAX_LINEAR_BYTES => {
                Err(invalid(format!(
                    "linear data must be 1..={} bytes, got {}",
                    MAX_LINEAR_BYTES, length
                )))
            }
            DidData::Linear { factor, .. } if *factor == 0.0 || !factor.is_finite() => {
                Err(invalid(format!("invalid factor {}", factor)))
            }
            _ => Ok(()),
        }
    }

    /// Records that follow the DID
    fn layout(&self, name: &str) -> Layout {
        let record = match self {
            DidData::Raw { length: None } => DataRecord::raw(name, 8).with_occurrences(1, 0),
            DidData::Raw { length: Some(n) } if *n <= MAX_LINEAR_BYTES => {
                DataRecord::raw(name, *n as u32 * 8)
            }
            DidData::Raw { length: Some(n) } => DataRecord::raw(name, 8).with_occurrences(*n, *n),
            DidData::Text { length: None } => DataRecord::text(name).with_occurrences(1, 0),
            DidData::Text { length: Some(n) } => DataRecord::text(name).with_occurrences(*n, *n),
            DidData::Linear {
                length,
                factor,
                offset,
                unit,
            } => {
                let record =
                    DataRecord::linear(
                        name,
                        *length as u32 * 8,
                        LinearFormula::new(*factor, *offset),
                    );
                match unit {
                    Some(unit) => record.with_unit(unit.clone()),
                    None => record,
                }
            }
        };
        vec![record.into()]
    }
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq)]
pub struct DidEntry {
    did: u16,
    name: String,
    data: DidData,
}

impl DidEntry {
    pub fn did(&self) -> u16 {
        self.did
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &DidData {
        &self.data
    }

    /// Records that follow this DID in a ReadDataByIdentifier response or a
    /// WriteDataByIdentifier request
    pub fn data_layout(&self) -> Layout {
        self.data.layout(&self.name)
    }
}

/// Metadata of a catalog file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Immutable DID catalog
#[derive(Debug, Clone, Default)]
pub struct DidCatalog {
    entries: BTreeMap<u16, DidEntry>,
    name_index: HashMap<String, u16>,
    meta: CatalogMeta,
}

impl DidCatalog {
    pub fn builder() -> DidCatalogBuilder {
        DidCatalogBuilder::default()
    }

    /// Catalog of the standard identification DIDs
    pub fn standard() -> Self {
        DidCatalogBuilder::standard().build()
    }

    /// Standard catalog extended with the DIDs of a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> DefinitionResult<Self> {
        Ok(DidCatalogBuilder::standard().load_file(path)?.build())
    }

    pub fn get(&self, did: u16) -> Option<&DidEntry> {
        self.entries.get(&did)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&DidEntry> {
        self.name_index.get(name).and_then(|did| self.entries.get(did))
    }

    /// Resolve an identifier - tries the DID name first, then hex format
    pub fn resolve_did(&self, identifier: &str) -> Option<u16> {
        if let Some(&did) = self.name_index.get(identifier) {
            return Some(did);
        }
        parse_did(identifier).ok()
    }

    pub fn contains(&self, did: u16) -> bool {
        self.entries.contains_key(&did)
    }

    /// Entries ordered by DID
    pub fn iter(&self) -> impl Iterator<Item = &DidEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn meta(&self) -> &CatalogMeta {
        &self.meta
    }

    /// Record for the 16-bit DID; unknown DIDs decode to their raw value
    pub fn data_identifier_record(&self) -> DataRecord {
        DataRecord::mapped(
            DATA_IDENTIFIER_RECORD,
            16,
            Mapping::pass_through(self.iter().map(|e| (e.did as u64, e.name.clone()))),
        )
    }

    /// Per-DID data layouts, keyed by DID
    ///
    /// Unknown DIDs fall back to `dataRecord`, a run of raw bytes.
    pub fn data_layouts(&self) -> impl Iterator<Item = (u64, Layout)> + '_ {
        self.iter().map(|e| (e.did as u64, e.data_layout()))
    }

    /// Layout used for DIDs missing from the catalog
    pub fn unknown_data_layout(&self) -> Layout {
        vec![DataRecord::raw(UNKNOWN_DATA_RECORD, 8)
            .with_occurrences(0, 0)
            .into()]
    }
}

/// Builder for [`DidCatalog`]
#[derive(Debug, Default)]
pub struct DidCatalogBuilder {
    entries: BTreeMap<u16, DidEntry>,
    names: HashSet<String>,
    meta: CatalogMeta,
}

/// Standard identification DIDs: (did, name, data)
const STANDARD_DIDS: &[(u16, &str, StandardData)] = &[
    (standard_did::BOOT_SOFTWARE_ID, "bootSoftwareIdentification", StandardData::Bytes),
    (
        standard_did::APPLICATION_SOFTWARE_ID,
        "applicationSoftwareIdentification",
        StandardData::Bytes,
    ),
    (standard_did::APPLICATION_DATA_ID, "applicationDataIdentification", StandardData::Bytes),
    (standard_did::BOOT_SOFTWARE_FINGERPRINT, "bootSoftwareFingerprint", StandardData::Bytes),
    (standard_did::APP_SOFTWARE_FINGERPRINT, "applicationSoftwareFingerprint", StandardData::Bytes),
    (standard_did::APP_DATA_FINGERPRINT, "applicationDataFingerprint", StandardData::Bytes),
    (
        standard_did::ACTIVE_DIAGNOSTIC_SESSION,
        "activeDiagnosticSession",
        StandardData::FixedBytes(1),
    ),
    (standard_did::SPARE_PART_NUMBER, "vehicleManufacturerSparePartNumber", StandardData::Text),
    (standard_did::ECU_SOFTWARE_NUMBER, "vehicleManufacturerECUSoftwareNumber", StandardData::Text),
    (
        standard_did::ECU_SOFTWARE_VERSION,
        "vehicleManufacturerECUSoftwareVersionNumber",
        StandardData::Text,
    ),
    (standard_did::SYSTEM_SUPPLIER_ID, "systemSupplierIdentifier", StandardData::Text),
    (standard_did::ECU_MANUFACTURING_DATE, "ECUManufacturingDate", StandardData::FixedBytes(3)),
    (standard_did::ECU_SERIAL_NUMBER, "ECUSerialNumber", StandardData::Text),
    (standard_did::VIN, "VIN", StandardData::FixedText(17)),
    (standard_did::ECU_HARDWARE_NUMBER, "vehicleManufacturerECUHardwareNumber", StandardData::Text),
    (standard_did::SUPPLIER_HW_NUMBER, "systemSupplierECUHardwareNumber", StandardData::Text),
    (
        standard_did::SUPPLIER_HW_VERSION,
        "systemSupplierECUHardwareVersionNumber",
        StandardData::Text,
    ),
    (standard_did::SUPPLIER_SW_NUMBER, "systemSupplierECUSoftwareNumber", StandardData::Text),
    (
        standard_did::SUPPLIER_SW_VERSION,
        "systemSupplierECUSoftwareVersionNumber",
        StandardData::Text,
    ),
    (standard_did::SYSTEM_NAME, "systemNameOrEngineType", StandardData::Text),
    (standard_did::TESTER_SERIAL_NUMBER, "repairShopCodeOrTesterSerialNumber", StandardData::Text),
    (standard_did::PROGRAMMING_DATE, "programmingDate", StandardData::FixedBytes(3)),
    (standard_did::ODX_FILE, "ODXFileDataIdentifier", StandardData::Text),
];

#[derive(Debug, Clone, Copy)]
enum StandardData {
    Bytes,
    FixedBytes(usize),
    Text,
    FixedText(usize),
}

impl From<StandardData> for DidData {
    fn from(data: StandardData) -> Self {
        match data {
            StandardData::Bytes => DidData::Raw { length: None },
            StandardData::FixedBytes(n) => DidData::Raw { length: Some(n) },
            StandardData::Text => DidData::Text { length: None },
            StandardData::FixedText(n) => DidData::Text { length: Some(n) },
        }
    }
}

impl DidCatalogBuilder {
    /// Builder pre-filled with the standard identification DIDs
    pub fn standard() -> Self {
        let mut builder = Self::default();
        for &(did, name, data) in STANDARD_DIDS {
            builder.insert(did, name.to_string(), data.into());
        }
        builder
    }

    pub fn with_meta(mut self, meta: CatalogMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Register a DID; duplicate DIDs or names are rejected
    pub fn add(
        mut self,
        did: u16,
        name: impl Into<String>,
        data: DidData,
    ) -> DefinitionResult<Self> {
        let name = name.into();
        if self.entries.contains_key(&did) {
            return Err(DefinitionError::DuplicateEntry {
                kind: "DID",
                key: format!("0x{}", format_did(did)),
            });
        }
        if self.names.contains(&name) {
            return Err(DefinitionError::DuplicateEntry {
                kind: "DID name",
                key: name,
            });
        }
        data.validate(did)?;
        self.insert(did, name, data);
        Ok(self)
    }

    /// Register all DIDs of a YAML catalog file
    pub fn load_file(self, path: impl AsRef<Path>) -> DefinitionResult<Self> {
        let content = std::fs::read_to_string(path)?;
        self.load_yaml(&content)
    }

    /// Register all DIDs of a YAML catalog string
    pub fn load_yaml(mut self, yaml: &str) -> DefinitionResult<Self> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        if let Some(meta) = file.meta {
            self.meta = meta;
        }
        let mut count = 0usize;
        for (did_str, entry) in file.dids.unwrap_or_default() {
            let did = parse_did(&did_str)?;
            let data = entry.data(did)?;
            self = self.add(did, entry.name, data)?;
            count += 1;
        }
        debug!(
            catalog = self.meta.name.as_deref().unwrap_or("<unnamed>"),
            count, "Loaded DID catalog entries"
        );
        Ok(self)
    }

    pub fn build(self) -> DidCatalog {
        let name_index = self
            .entries
            .values()
            .map(|e| (e.name.clone(), e.did))
            .collect();
        DidCatalog {
            entries: self.entries,
            name_index,
            meta: self.meta,
        }
    }

    fn insert(&mut self, did: u16, name: String, data: DidData) {
        self.names.insert(name.clone());
        self.entries.insert(did, DidEntry { did, name, data });
    }
}

/// YAML file structure
#[derive(Debug, Deserialize)]
struct CatalogFile {
    meta: Option<CatalogMeta>,
    dids: Option<BTreeMap<String, CatalogFileEntry>>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum DataKind {
    #[default]
    Raw,
    Text,
    Linear,
}

#[derive(Debug, Deserialize)]
struct CatalogFileEntry {
    name: String,
    #[serde(rename = "type", default)]
    kind: DataKind,
    /// Length in bytes
    length: Option<usize>,
    factor: Option<f64>,
    offset: Option<f64>,
    unit: Option<String>,
}

impl CatalogFileEntry {
    fn data(&self, did: u16) -> DefinitionResult<DidData> {
        match self.kind {
            DataKind::Raw => Ok(DidData::Raw {
                length: self.length,
            }),
            DataKind::Text => Ok(DidData::Text {
                length: self.length,
            }),
            DataKind::Linear => Ok(DidData::Linear {
                length: self.length.ok_or_else(|| DefinitionError::InvalidDidData {
                    did,
                    reason: "linear data needs a length".to_string(),
                })?,
                factor: self.factor.unwrap_or(1.0),
                offset: self.offset.unwrap_or(0.0),
                unit: self.unit.clone(),
            }),
        }
    }
}
