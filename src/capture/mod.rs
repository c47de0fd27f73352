//! Raw force-plate captures
//!
//! A capture is a column-major table of 19 named channels sampled at
//! 1000 Hz: a time column plus, for each of the two plate sensors, three
//! force components, three centre-of-pressure coordinates and three torque
//! components.

mod validation;

pub use validation::validate;

use crate::error::InputError;

/// Name of the time column (seconds)
pub const TIME_COLUMN: &str = "time";

/// Force/position components recorded per sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Vx,
    Vy,
    Vz,
    Px,
    Py,
    Pz,
}

impl Channel {
    pub const ALL: [Channel; 6] = [
        Channel::Vx,
        Channel::Vy,
        Channel::Vz,
        Channel::Px,
        Channel::Py,
        Channel::Pz,
    ];

    fn slot(self) -> usize {
        match self {
            Channel::Vx => 0,
            Channel::Vy => 1,
            Channel::Vz => 2,
            Channel::Px => 3,
            Channel::Py => 4,
            Channel::Pz => 5,
        }
    }
}

const SENSOR1_CHANNELS: [&str; 6] = [
    "ground_force1_vx",
    "ground_force1_vy",
    "ground_force1_vz",
    "ground_force1_px",
    "ground_force1_py",
    "ground_force1_pz",
];

const SENSOR2_CHANNELS: [&str; 6] = [
    "ground_force2_vx",
    "ground_force2_vy",
    "ground_force2_vz",
    "ground_force2_px",
    "ground_force2_py",
    "ground_force2_pz",
];

const SENSOR1_TORQUES: [&str; 3] = ["ground_torque1_x", "ground_torque1_y", "ground_torque1_z"];
const SENSOR2_TORQUES: [&str; 3] = ["ground_torque2_x", "ground_torque2_y", "ground_torque2_z"];

/// One of the two plate sensors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensor {
    One,
    Two,
}

impl Sensor {
    pub const ALL: [Sensor; 2] = [Sensor::One, Sensor::Two];

    pub fn column(self, channel: Channel) -> &'static str {
        match self {
            Sensor::One => SENSOR1_CHANNELS[channel.slot()],
            Sensor::Two => SENSOR2_CHANNELS[channel.slot()],
        }
    }

    pub fn torque_columns(self) -> [&'static str; 3] {
        match self {
            Sensor::One => SENSOR1_TORQUES,
            Sensor::Two => SENSOR2_TORQUES,
        }
    }

    /// Foot standing on this sensor
    pub fn foot(self) -> Foot {
        match self {
            Sensor::One => Foot::Right,
            Sensor::Two => Foot::Left,
        }
    }
}

/// Foot side, wired to a sensor by the plate installation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Foot {
    Left,
    Right,
}

impl Foot {
    pub fn sensor(self) -> Sensor {
        match self {
            Foot::Right => Sensor::One,
            Foot::Left => Sensor::Two,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Foot::Left => "left",
            Foot::Right => "right",
        }
    }
}

/// Column order written by the plate exporter
pub fn raw_column_names() -> Vec<&'static str> {
    let mut names = vec![TIME_COLUMN];
    for sensor in Sensor::ALL {
        names.extend(Channel::ALL.iter().map(|channel| sensor.column(*channel)));
        names.extend(sensor.torque_columns());
    }
    names
}

/// Columns that must be present for segmentation and metrics
pub fn required_column_names() -> Vec<&'static str> {
    let mut names = vec![TIME_COLUMN];
    for sensor in Sensor::ALL {
        names.extend(
            Channel::ALL
                .iter()
                .filter(|channel| **channel != Channel::Py)
                .map(|channel| sensor.column(*channel)),
        );
    }
    names
}

/// Column-major table of named `f64` channels
///
/// Missing cells are stored as NaN and rejected by [`validate`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl RawTable {
    /// Build a table, rejecting columns of unequal length
    pub fn new(names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self, InputError> {
        if names.len() != columns.len() {
            return Err(InputError::ColumnCount {
                expected: names.len(),
                found: columns.len(),
            });
        }
        if let Some(first) = columns.first() {
            let expected = first.len();
            for (name, column) in names.iter().zip(&columns) {
                if column.len() != expected {
                    return Err(InputError::RaggedColumns {
                        column: name.clone(),
                        expected,
                        found: column.len(),
                    });
                }
            }
        }
        Ok(Self { names, columns })
    }

    pub fn from_columns<I, S>(columns: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let (names, columns): (Vec<String>, Vec<Vec<f64>>) = columns
            .into_iter()
            .map(|(name, values)| (name.into(), values))
            .unzip();
        Self::new(names, columns)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.position(name).map(|idx| self.columns[idx].as_slice())
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Vec<f64>> {
        let idx = self.position(name)?;
        Some(&mut self.columns[idx])
    }

    /// Fetch a column or report it as missing
    pub fn require(&self, name: &str) -> Result<&[f64], InputError> {
        self.column(name).ok_or_else(|| InputError::MissingColumn {
            name: name.to_string(),
        })
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Vec<f64>> {
        let idx = self.position(name)?;
        self.names.remove(idx);
        Some(self.columns.remove(idx))
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.position(from) {
            Some(idx) => {
                self.names[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Keep the first `rows` rows of every column
    pub fn truncate(&mut self, rows: usize) {
        for column in &mut self.columns {
            column.truncate(rows);
        }
    }

    /// Values of one row in column order
    pub fn row(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.row_count() {
            return None;
        }
        Some(self.columns.iter().map(|column| column[index]).collect())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate == name)
    }
}
