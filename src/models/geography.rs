//! ONS statistical geography rows and output selection.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;

use crate::error::{GeoError, Result};

/// Which frame a UK geography lookup returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputGeog {
    /// LSOA code and name
    Lsoa,
    /// MSOA code and name
    Msoa,
    /// Local authority code and name
    La,
    /// LSOA, MSOA and LA together
    #[default]
    Overview,
    /// Every intersecting (LSOA, polygon) pair including geometry
    Raw,
}

impl OutputGeog {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputGeog::Lsoa => "lsoa",
            OutputGeog::Msoa => "msoa",
            OutputGeog::La => "la",
            OutputGeog::Overview => "overview",
            OutputGeog::Raw => "raw",
        }
    }
}

impl FromStr for OutputGeog {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lsoa" => Ok(OutputGeog::Lsoa),
            "msoa" => Ok(OutputGeog::Msoa),
            "la" => Ok(OutputGeog::La),
            "overview" => Ok(OutputGeog::Overview),
            "raw" => Ok(OutputGeog::Raw),
            _ => Err(GeoError::UnknownOutputGeog(s.to_string())),
        }
    }
}

impl std::fmt::Display for OutputGeog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One LSOA with its parent MSOA and local authority from the lookup table.
///
/// Names and parent codes are empty when the LSOA has no lookup row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LsoaRecord {
    #[serde(rename = "LSOA21CD")]
    pub lsoa_code: String,
    #[serde(rename = "LSOA21NM")]
    pub lsoa_name: String,
    #[serde(rename = "MSOA21CD")]
    pub msoa_code: String,
    #[serde(rename = "MSOA21NM")]
    pub msoa_name: String,
    #[serde(rename = "LAD22CD")]
    pub lad_code: String,
    #[serde(rename = "LAD22NM")]
    pub lad_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LsoaRow {
    pub input_location: String,
    #[serde(rename = "LSOA21CD")]
    pub lsoa_code: String,
    #[serde(rename = "LSOA21NM")]
    pub lsoa_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MsoaRow {
    pub input_location: String,
    #[serde(rename = "MSOA21CD")]
    pub msoa_code: String,
    #[serde(rename = "MSOA21NM")]
    pub msoa_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaRow {
    pub input_location: String,
    #[serde(rename = "LAD22CD")]
    pub lad_code: String,
    #[serde(rename = "LAD22NM")]
    pub lad_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverviewRow {
    pub input_location: String,
    #[serde(rename = "LAD22CD")]
    pub lad_code: String,
    #[serde(rename = "LAD22NM")]
    pub lad_name: String,
    #[serde(rename = "MSOA21CD")]
    pub msoa_code: String,
    #[serde(rename = "MSOA21NM")]
    pub msoa_name: String,
    #[serde(rename = "LSOA21CD")]
    pub lsoa_code: String,
    #[serde(rename = "LSOA21NM")]
    pub lsoa_name: String,
}

/// One intersecting (LSOA, boundary polygon) pair from the spatial join
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawJoinRow {
    pub input_location: String,
    #[serde(rename = "LSOA21CD")]
    pub lsoa_code: String,
    #[serde(rename = "LSOA21NM")]
    pub lsoa_name: String,
    #[serde(rename = "MSOA21CD")]
    pub msoa_code: String,
    #[serde(rename = "MSOA21NM")]
    pub msoa_name: String,
    #[serde(rename = "LAD22CD")]
    pub lad_code: String,
    #[serde(rename = "LAD22NM")]
    pub lad_name: String,
    /// Position of the matched polygon in the clustered boundary
    pub index_right: usize,
    /// Geohash cell of the matched polygon
    pub geohash: String,
    /// LSOA geometry as a GeoJSON geometry object
    pub geometry: String,
}

/// Result of a UK geography lookup, shaped by [`OutputGeog`]
#[derive(Debug, Clone, PartialEq)]
pub enum GeographyTable {
    Lsoa(Vec<LsoaRow>),
    Msoa(Vec<MsoaRow>),
    La(Vec<LaRow>),
    Overview(Vec<OverviewRow>),
    Raw(Vec<RawJoinRow>),
}

impl GeographyTable {
    pub fn empty(output: OutputGeog) -> Self {
        match output {
            OutputGeog::Lsoa => GeographyTable::Lsoa(Vec::new()),
            OutputGeog::Msoa => GeographyTable::Msoa(Vec::new()),
            OutputGeog::La => GeographyTable::La(Vec::new()),
            OutputGeog::Overview => GeographyTable::Overview(Vec::new()),
            OutputGeog::Raw => GeographyTable::Raw(Vec::new()),
        }
    }

    pub fn output_geog(&self) -> OutputGeog {
        match self {
            GeographyTable::Lsoa(_) => OutputGeog::Lsoa,
            GeographyTable::Msoa(_) => OutputGeog::Msoa,
            GeographyTable::La(_) => OutputGeog::La,
            GeographyTable::Overview(_) => OutputGeog::Overview,
            GeographyTable::Raw(_) => OutputGeog::Raw,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            GeographyTable::Lsoa(rows) => rows.len(),
            GeographyTable::Msoa(rows) => rows.len(),
            GeographyTable::La(rows) => rows.len(),
            GeographyTable::Overview(rows) => rows.len(),
            GeographyTable::Raw(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append rows of another table of the same kind.
    ///
    /// Tables of a different kind are ignored.
    pub fn extend(&mut self, other: GeographyTable) {
        match (self, other) {
            (GeographyTable::Lsoa(a), GeographyTable::Lsoa(b)) => a.extend(b),
            (GeographyTable::Msoa(a), GeographyTable::Msoa(b)) => a.extend(b),
            (GeographyTable::La(a), GeographyTable::La(b)) => a.extend(b),
            (GeographyTable::Overview(a), GeographyTable::Overview(b)) => a.extend(b),
            (GeographyTable::Raw(a), GeographyTable::Raw(b)) => a.extend(b),
            (this, other) => tracing::warn!(
                "Ignoring {} rows: cannot append {} table to {} table",
                other.len(),
                other.output_geog(),
                this.output_geog()
            ),
        }
    }

    /// Write the table as CSV with a header row
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        match self {
            GeographyTable::Lsoa(rows) => write_rows(&mut csv_writer, rows)?,
            GeographyTable::Msoa(rows) => write_rows(&mut csv_writer, rows)?,
            GeographyTable::La(rows) => write_rows(&mut csv_writer, rows)?,
            GeographyTable::Overview(rows) => write_rows(&mut csv_writer, rows)?,
            GeographyTable::Raw(rows) => write_rows(&mut csv_writer, rows)?,
        }
        csv_writer.flush()?;
        Ok(())
    }
}

fn write_rows<W: Write, T: Serialize>(writer: &mut csv::Writer<W>, rows: &[T]) -> Result<()> {
    for row in rows {
        writer.serialize(row)?;
    }
    Ok(())
}
